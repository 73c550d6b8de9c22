//! # Code Generators
//!
//! Both pipelines end here: a [`SlipRecord`](crate::slip::SlipRecord) or an
//! ordered list of [`CanvasElement`](crate::canvas::CanvasElement)s is
//! turned into an IR [`Module`](crate::ir::Module) and emitted as jsPDF
//! source.
//!
//! ```
//! use pickslip::generate::{slip_code, CodegenOptions};
//! use pickslip::slip;
//!
//! let record = slip::parse("Company: Acme");
//! let js = slip_code(&record, &CodegenOptions::default());
//! assert!(js.contains("export function createPickingSlipPDF(data = {}) {"));
//! assert!(js.contains("data.companyName || 'Acme'"));
//! ```

pub mod slip;
pub mod visual;

pub use slip::{slip_code, slip_module, SLIP_FUNCTION_NAME};
pub use visual::{visual_code, visual_module, EMPTY_CANVAS_CODE, VISUAL_FUNCTION_NAME};

use serde::{Deserialize, Serialize};

use crate::ir::{DeclStyle, ExportStyle, Import};

/// Options shared by both generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodegenOptions {
    /// `function` declaration or `const` arrow function.
    pub template: DeclStyle,
    pub export_type: ExportStyle,
    /// Name of the generated function; each pipeline has its own default.
    pub function_name: Option<String>,
    pub include_imports: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            template: DeclStyle::Function,
            export_type: ExportStyle::Export,
            function_name: None,
            include_imports: true,
        }
    }
}

impl CodegenOptions {
    /// The configured function name reduced to JS identifier characters
    /// (`A-Z a-z 0-9 _ $`), or `fallback` when nothing usable remains.
    pub fn name_or(&self, fallback: &str) -> String {
        let mut name: String = self
            .function_name
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
            .collect();
        if name.is_empty() {
            return fallback.to_string();
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert(0, '_');
        }
        name
    }
}

fn jspdf_import() -> Import {
    Import::Named {
        names: vec!["jsPDF".into()],
        from: "jspdf".into(),
    }
}

fn autotable_import() -> Import {
    Import::SideEffect("jspdf-autotable".into())
}

/// Canvas pixels to millimeters, rounded half-up like `Math.round`.
pub fn px_to_mm(px: f64) -> f64 {
    (px * crate::canvas::PX_TO_MM + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults_from_empty_json() {
        let opts: CodegenOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, CodegenOptions::default());
        assert!(opts.include_imports);
    }

    #[test]
    fn test_options_camel_case() {
        let opts: CodegenOptions = serde_json::from_str(
            r#"{"template":"arrow","exportType":"default","functionName":"make","includeImports":false}"#,
        )
        .unwrap();
        assert_eq!(opts.template, DeclStyle::Arrow);
        assert_eq!(opts.export_type, ExportStyle::Default);
        assert_eq!(opts.name_or("x"), "make");
        assert!(!opts.include_imports);
    }

    #[test]
    fn test_blank_name_falls_back() {
        let opts = CodegenOptions {
            function_name: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(opts.name_or("createVisualTemplate"), "createVisualTemplate");
    }

    #[test]
    fn test_name_reduced_to_identifier() {
        let named = |n: &str| CodegenOptions {
            function_name: Some(n.into()),
            ..Default::default()
        };
        assert_eq!(named("bad\"name").name_or("x"), "badname");
        assert_eq!(named(" make Slip\r\n").name_or("x"), "makeSlip");
        assert_eq!(named("$slip_2").name_or("x"), "$slip_2");
        assert_eq!(named("2slip").name_or("x"), "_2slip");
        assert_eq!(named("\"; alert(1); //").name_or("x"), "alert1");
        assert_eq!(named("\";/").name_or("fallback"), "fallback");
    }

    #[test]
    fn test_px_to_mm_rounds_half_up() {
        assert_eq!(px_to_mm(20.0), 10.0);
        assert_eq!(px_to_mm(25.0), 13.0);
        assert_eq!(px_to_mm(27.0), 14.0);
        assert_eq!(px_to_mm(-3.0), -1.0);
        assert_eq!(px_to_mm(0.0), 0.0);
    }
}
