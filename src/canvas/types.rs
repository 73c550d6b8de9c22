//! Element struct types for the visual builder.
//!
//! All types derive `Serialize + Deserialize` so the same values travel
//! through the canvas API, the generator and the renderer unchanged.
//!
//! Each element type implements [`ElementMeta`] to declare its display
//! label, editor default and starting frame.

use serde::{Deserialize, Serialize};

use super::ElementId;
use crate::error::PickslipError;
use crate::ir::FontStyle;

/// Metadata that every element struct must provide.
///
/// Adding an element type means implementing this trait and adding one
/// line to `define_elements!`; the exhaustive matches do the rest.
pub trait ElementMeta: Sized {
    /// Human-readable display label (e.g. "QR Code").
    fn label() -> &'static str;

    /// Starter value for the editor, with sample content so a new element
    /// is visible immediately.
    fn editor_default() -> Self;

    /// Starting position and size in canvas pixels.
    fn editor_frame() -> Frame;
}

/// Position and size in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextElement {
    pub content: String,
    /// Point size.
    pub font_size: f64,
    pub font_weight: FontStyle,
    /// `#rrggbb`
    pub color: String,
}

impl Default for TextElement {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_size: 12.0,
            font_weight: FontStyle::Normal,
            color: "#000000".into(),
        }
    }
}

impl ElementMeta for TextElement {
    fn label() -> &'static str { "Text" }
    fn editor_default() -> Self {
        Self { content: "Text".into(), ..Default::default() }
    }
    fn editor_frame() -> Frame { Frame::new(20.0, 30.0, 100.0, 20.0) }
}

/// Square QR code. Width and height always equal `size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrCodeElement {
    pub content: String,
    pub size: f64,
}

impl Default for QrCodeElement {
    fn default() -> Self {
        Self {
            content: String::new(),
            size: 50.0,
        }
    }
}

impl ElementMeta for QrCodeElement {
    fn label() -> &'static str { "QR Code" }
    fn editor_default() -> Self {
        Self { content: "https://example.com".into(), ..Default::default() }
    }
    fn editor_frame() -> Frame { Frame::new(20.0, 50.0, 50.0, 50.0) }
}

/// 1D barcode symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BarcodeFormat {
    #[default]
    Code128,
    Code39,
    Ean13,
    Ean8,
    Upc,
}

impl BarcodeFormat {
    /// Format name as JsBarcode spells it.
    pub fn name(self) -> &'static str {
        match self {
            BarcodeFormat::Code128 => "CODE128",
            BarcodeFormat::Code39 => "CODE39",
            BarcodeFormat::Ean13 => "EAN13",
            BarcodeFormat::Ean8 => "EAN8",
            BarcodeFormat::Upc => "UPC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BarcodeElement {
    pub content: String,
    pub format: BarcodeFormat,
}

impl ElementMeta for BarcodeElement {
    fn label() -> &'static str { "Barcode" }
    fn editor_default() -> Self {
        Self { content: "1234567890".into(), ..Default::default() }
    }
    fn editor_frame() -> Frame { Frame::new(20.0, 120.0, 100.0, 30.0) }
}

/// Bitmap image. `src` is a data URL, an http(s) URL or a file path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageElement {
    pub src: String,
}

impl ElementMeta for ImageElement {
    fn label() -> &'static str { "Image" }
    fn editor_default() -> Self { Self::default() }
    fn editor_frame() -> Frame { Frame::new(20.0, 100.0, 80.0, 60.0) }
}

/// Grid table with a header row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableElement {
    /// Grid rows, header included.
    pub rows: u32,
    pub cols: u32,
    pub headers: Vec<String>,
    pub data: Vec<Vec<String>>,
}

impl Default for TableElement {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            headers: Vec::new(),
            data: Vec::new(),
        }
    }
}

impl ElementMeta for TableElement {
    fn label() -> &'static str { "Table" }
    fn editor_default() -> Self {
        let row = |r: u32| (1..=3).map(|c| format!("Row {} Col {}", r, c)).collect();
        Self {
            headers: (1..=3).map(|c| format!("Header {}", c)).collect(),
            data: vec![row(1), row(2)],
            ..Default::default()
        }
    }
    fn editor_frame() -> Frame { Frame::new(20.0, 150.0, 160.0, 80.0) }
}

/// Largest table grid side, in rows or columns.
pub const MAX_TABLE_SIDE: usize = 100;

impl TableElement {
    /// Grid dimensions: large enough for the declared size and the content,
    /// each side capped at [`MAX_TABLE_SIDE`].
    pub fn grid(&self) -> (usize, usize) {
        let rows = (self.rows as usize).max(1 + self.data.len());
        let widest = self.data.iter().map(Vec::len).max().unwrap_or(0);
        let cols = (self.cols as usize).max(self.headers.len()).max(widest).max(1);
        (rows.min(MAX_TABLE_SIDE), cols.min(MAX_TABLE_SIDE))
    }

    /// Cell text at `(row, col)`; row 0 is the header row.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        let cell = if row == 0 {
            self.headers.get(col)
        } else {
            self.data.get(row - 1).and_then(|r| r.get(col))
        };
        cell.map(String::as_str).unwrap_or("")
    }
}

/// Define the ElementKind enum and its dispatch methods from a single list.
macro_rules! define_elements {
    ($($variant:ident($inner:ty) = $tag:literal),+ $(,)?) => {
        /// Type-specific part of a canvas element.
        ///
        /// Serialized with a `"type"` tag, e.g.
        /// `{"type": "qrcode", "content": "...", "size": 50}`.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type")]
        pub enum ElementKind {
            $(#[serde(rename = $tag)] $variant($inner),)+
        }

        impl ElementKind {
            /// Serialized type tag.
            pub fn type_name(&self) -> &'static str {
                match self { $(ElementKind::$variant(_) => $tag,)+ }
            }

            /// Human-readable display label (from [`ElementMeta::label`]).
            pub fn label(&self) -> &'static str {
                match self { $(ElementKind::$variant(_) => <$inner>::label(),)+ }
            }

            /// Editor defaults for every element type, in menu order.
            pub fn all_editor_defaults() -> Vec<(Self, Frame)> {
                vec![$((ElementKind::$variant(<$inner>::editor_default()), <$inner>::editor_frame()),)+]
            }
        }
    };
}

define_elements! {
    Text(TextElement) = "text",
    QrCode(QrCodeElement) = "qrcode",
    Barcode(BarcodeElement) = "barcode",
    Image(ImageElement) = "image",
    Table(TableElement) = "table",
}

/// One positioned, typed object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasElement {
    #[serde(default)]
    pub id: ElementId,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl CanvasElement {
    pub fn new(id: ElementId, frame: Frame, kind: ElementKind) -> Self {
        Self {
            id,
            x: frame.x,
            y: frame.y,
            width: frame.width,
            height: frame.height,
            kind,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn frame(&self) -> Frame {
        Frame::new(self.x, self.y, self.width, self.height)
    }

    /// Suffix naming this element's `data.*` fields in generated code.
    pub fn field_suffix(&self) -> String {
        self.id.suffix()
    }
}

/// Element type metadata for the editor.
#[derive(Debug, Clone, Serialize)]
pub struct ElementTypeMeta {
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub label: &'static str,
    pub frame: Frame,
    pub defaults: ElementKind,
}

/// Every element type with its label and editor defaults.
pub fn element_types() -> Vec<ElementTypeMeta> {
    ElementKind::all_editor_defaults()
        .into_iter()
        .map(|(kind, frame)| ElementTypeMeta {
            type_name: kind.type_name(),
            label: kind.label(),
            frame,
            defaults: kind,
        })
        .collect()
}

/// Create an element with editor defaults by type name.
///
/// Returns `None` for unknown type names.
pub fn default_element(type_name: &str, id: ElementId) -> Option<CanvasElement> {
    ElementKind::all_editor_defaults()
        .into_iter()
        .find(|(kind, _)| kind.type_name() == type_name)
        .map(|(kind, frame)| CanvasElement::new(id, frame, kind))
}

/// Typed partial update of an element.
///
/// Every field is optional; fields that the element's type does not carry
/// are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontStyle>,
    pub color: Option<String>,
    pub size: Option<f64>,
    pub format: Option<BarcodeFormat>,
    pub src: Option<String>,
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    pub headers: Option<Vec<String>>,
    pub data: Option<Vec<Vec<String>>>,
}

impl ElementPatch {
    /// Move to `(x, y)`.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Apply to `element`. Nothing changes when any field is rejected.
    pub fn apply(&self, element: &mut CanvasElement) -> Result<(), PickslipError> {
        self.check(&element.kind)?;

        set(&mut element.x, &self.x);
        set(&mut element.y, &self.y);

        match &mut element.kind {
            ElementKind::QrCode(qr) => {
                // Any of size/width/height resizes the square
                if let Some(size) = self.size.or(self.width).or(self.height) {
                    qr.size = size;
                }
                element.width = qr.size;
                element.height = qr.size;
                set(&mut qr.content, &self.content);
            }
            kind => {
                set(&mut element.width, &self.width);
                set(&mut element.height, &self.height);
                match kind {
                    ElementKind::Text(text) => {
                        set(&mut text.content, &self.content);
                        set(&mut text.font_size, &self.font_size);
                        set(&mut text.font_weight, &self.font_weight);
                        set(&mut text.color, &self.color);
                    }
                    ElementKind::Barcode(barcode) => {
                        set(&mut barcode.content, &self.content);
                        set(&mut barcode.format, &self.format);
                    }
                    ElementKind::Image(image) => set(&mut image.src, &self.src),
                    ElementKind::Table(table) => {
                        set(&mut table.rows, &self.rows);
                        set(&mut table.cols, &self.cols);
                        set(&mut table.headers, &self.headers);
                        set(&mut table.data, &self.data);
                    }
                    ElementKind::QrCode(_) => {}
                }
            }
        }
        Ok(())
    }

    fn check(&self, kind: &ElementKind) -> Result<(), PickslipError> {
        let (text, qr, barcode, image, table) = match kind {
            ElementKind::Text(_) => (true, false, false, false, false),
            ElementKind::QrCode(_) => (false, true, false, false, false),
            ElementKind::Barcode(_) => (false, false, true, false, false),
            ElementKind::Image(_) => (false, false, false, true, false),
            ElementKind::Table(_) => (false, false, false, false, true),
        };
        let fields = [
            ("content", self.content.is_some(), text || qr || barcode),
            ("fontSize", self.font_size.is_some(), text),
            ("fontWeight", self.font_weight.is_some(), text),
            ("color", self.color.is_some(), text),
            ("size", self.size.is_some(), qr),
            ("format", self.format.is_some(), barcode),
            ("src", self.src.is_some(), image),
            ("rows", self.rows.is_some(), table),
            ("cols", self.cols.is_some(), table),
            ("headers", self.headers.is_some(), table),
            ("data", self.data.is_some(), table),
        ];
        if let Some((name, _, _)) = fields.iter().find(|(_, present, allowed)| *present && !allowed) {
            return Err(PickslipError::InvalidInput(format!(
                "{} elements have no {} field",
                kind.type_name(),
                name
            )));
        }

        for (name, value) in [("rows", self.rows), ("cols", self.cols)] {
            if let Some(n) = value
                && n as usize > MAX_TABLE_SIDE
            {
                return Err(PickslipError::InvalidInput(format!(
                    "table {} must be at most {}, got {}",
                    name, MAX_TABLE_SIDE, n
                )));
            }
        }
        Ok(())
    }
}

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}
