//! # IR Statements
//!
//! This module defines the intermediate representation for generated jsPDF
//! programs. A program is a sequence of statements (`Op`) that can be
//! inspected in tests and compiled to JavaScript source.
//!
//! ## Design Philosophy
//!
//! ```text
//! Generators → IR (inspectable) → Codegen → JavaScript text
//! ```
//!
//! Each op is one jsPDF call or one small control structure. Values are
//! [`Expr`]s so a statement can read `data.field || 'literal'` instead of a
//! bare literal.

use serde::{Deserialize, Serialize};

/// A JavaScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Single-quoted string literal.
    Str(String),
    /// Numeric literal.
    Num(f64),
    /// Bare identifier (`finalY`, `qrDataUrl`).
    Ident(String),
    /// `ident + n` (or `ident - n` for negative offsets).
    Offset(String, f64),
    /// `data.key || fallback`: reads the caller's data with a default.
    DataOr { key: String, fallback: Box<Expr> },
    /// Inline array literal.
    Array(Vec<Expr>),
    /// Verbatim source text.
    Raw(String),
}

impl Expr {
    pub fn str(s: impl Into<String>) -> Self {
        Expr::Str(s.into())
    }

    pub fn num(n: impl Into<f64>) -> Self {
        Expr::Num(n.into())
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn offset(name: impl Into<String>, by: impl Into<f64>) -> Self {
        Expr::Offset(name.into(), by.into())
    }

    pub fn raw(src: impl Into<String>) -> Self {
        Expr::Raw(src.into())
    }

    /// `data.key || 'literal'`
    pub fn data_or(key: impl Into<String>, literal: impl Into<String>) -> Self {
        Expr::DataOr {
            key: key.into(),
            fallback: Box::new(Expr::Str(literal.into())),
        }
    }

    /// Inline array of string literals (`['a', 'b']`).
    pub fn strings<S: AsRef<str>>(items: &[S]) -> Self {
        Expr::Array(items.iter().map(|s| Expr::str(s.as_ref())).collect())
    }
}

/// RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Parse `#rrggbb` (the `#` is optional). Anything else is black.
    pub fn from_hex(hex: &str) -> Rgb {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Rgb::BLACK;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        match (channel(0), channel(2), channel(4)) {
            (Ok(r), Ok(g), Ok(b)) => Rgb(r, g, b),
            _ => Rgb::BLACK,
        }
    }
}

/// Helvetica style variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
}

impl FontStyle {
    pub fn name(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Bold => "bold",
        }
    }
}

/// Horizontal alignment option of `doc.text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Center,
}

impl TextAlign {
    pub fn name(self) -> &'static str {
        match self {
            TextAlign::Center => "center",
        }
    }
}

/// Format hint passed to `doc.addImage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn name(self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
        }
    }
}

/// Options of a `doc.autoTable` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoTable {
    pub start_y: Expr,
    /// Left margin in mm; the plugin default when absent.
    pub margin_left: Option<Expr>,
    pub head: Expr,
    pub body: Expr,
    pub head_fill: Rgb,
    /// Fixed column widths in mm, each with an optional trailing comment.
    pub column_widths: Vec<(u32, Option<String>)>,
}

/// IR statements: the "bytecode" of a generated jsPDF program.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// `// text`
    Comment(String),
    /// Empty line.
    Blank,
    /// `const doc = new jsPDF({...})` for A4 portrait in millimeters.
    NewDocument,
    /// `doc.setFont('helvetica'[, style])`
    SetFont(Option<FontStyle>),
    /// `doc.setFontSize(n)`
    SetFontSize(f64),
    /// `doc.setTextColor(r, g, b)`
    SetTextColor(Rgb),
    /// `doc.text(value, x, y[, { align }])`
    Text {
        value: Expr,
        x: Expr,
        y: Expr,
        align: Option<TextAlign>,
    },
    /// `doc.rect(x, y, w, h)`
    Rect {
        x: Expr,
        y: Expr,
        width: Expr,
        height: Expr,
    },
    /// `const name = value;`
    Const { name: String, value: Expr },
    /// `const name = [data.key ||] [ ...rows ];` spread over several lines.
    ConstRows {
        name: String,
        data_key: Option<String>,
        rows: Vec<Vec<String>>,
    },
    /// Header row plus one row per `data.items` entry, built with `forEach`.
    ItemRows {
        name: String,
        header: Vec<String>,
        fields: Vec<String>,
    },
    /// `const name = await QRCode.toDataURL(value, { width, margin: 1 })`
    QrDataUrl { name: String, value: Expr, width: f64 },
    /// Render `value` with JsBarcode onto a fresh canvas; `name` holds the data URL.
    BarcodeDataUrl {
        name: String,
        value: Expr,
        format: String,
    },
    /// `doc.addImage(source, format, x, y, w, h)`
    AddImage {
        source: Expr,
        format: ImageFormat,
        x: Expr,
        y: Expr,
        width: Expr,
        height: Expr,
    },
    /// `doc.autoTable({...})`
    AutoTable(AutoTable),
    /// `const name = doc.lastAutoTable ? doc.lastAutoTable.finalY + gap : fallback;`
    LastTableY { name: String, gap: f64, fallback: f64 },
    /// `if (condition) { body }`
    If { condition: String, body: Vec<Op> },
    /// `try { body } catch (error) { console.error(message, error); fallback }`
    Try {
        body: Vec<Op>,
        error_message: String,
        fallback: Vec<Op>,
    },
    /// `return doc;`
    Return,
}

/// Declaration form of the generated function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeclStyle {
    /// `function name(data = {}) { ... }`
    #[default]
    Function,
    /// `const name = (data = {}) => { ... };`
    Arrow,
}

/// How the generated function is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportStyle {
    /// Named export.
    #[default]
    Export,
    /// Default export.
    Default,
    /// Not exported.
    None,
}

/// An import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// `import { a, b } from 'module';`
    Named { names: Vec<String>, from: String },
    /// `import Name from 'module';`
    Default { name: String, from: String },
    /// `import 'module';`
    SideEffect(String),
}

/// The generated function.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub style: DeclStyle,
    pub export: ExportStyle,
    pub is_async: bool,
    pub body: Vec<Op>,
}

/// A complete generated source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub imports: Vec<Import>,
    pub function: Function,
    /// Lines of the trailing usage comment, without the `// ` prefix.
    pub usage: Vec<String>,
}

impl Module {
    /// All top-level and nested ops, depth first.
    pub fn ops(&self) -> Vec<&Op> {
        fn walk<'a>(ops: &'a [Op], out: &mut Vec<&'a Op>) {
            for op in ops {
                out.push(op);
                match op {
                    Op::If { body, .. } => walk(body, out),
                    Op::Try { body, fallback, .. } => {
                        walk(body, out);
                        walk(fallback, out);
                    }
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.function.body, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex("#3b82f6"), Rgb(59, 130, 246));
        assert_eq!(Rgb::from_hex("FF0000"), Rgb(255, 0, 0));
        assert_eq!(Rgb::from_hex("#fff"), Rgb::BLACK);
        assert_eq!(Rgb::from_hex("#gg0000"), Rgb::BLACK);
    }

    #[test]
    fn test_ops_walks_nested_blocks() {
        let module = Module {
            imports: vec![],
            function: Function {
                name: "f".into(),
                style: DeclStyle::Function,
                export: ExportStyle::None,
                is_async: false,
                body: vec![
                    Op::If {
                        condition: "x".into(),
                        body: vec![Op::Blank],
                    },
                    Op::Try {
                        body: vec![Op::Return],
                        error_message: "e".into(),
                        fallback: vec![Op::Comment("c".into())],
                    },
                ],
            },
            usage: vec![],
        };
        assert_eq!(module.ops().len(), 5);
    }

    #[test]
    fn test_style_serde_names() {
        assert_eq!(serde_json::to_string(&DeclStyle::Arrow).unwrap(), "\"arrow\"");
        assert_eq!(serde_json::to_string(&ExportStyle::None).unwrap(), "\"none\"");
        let style: FontStyle = serde_json::from_str("\"bold\"").unwrap();
        assert_eq!(style, FontStyle::Bold);
    }
}
