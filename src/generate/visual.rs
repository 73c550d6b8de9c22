//! Visual pipeline generator: canvas elements → async jsPDF function.
//!
//! Each element becomes a numbered block of ops. Element values are read
//! from `data.<field><suffix>` where the suffix is the last three digits of
//! the element id, falling back to the value set in the editor.

use super::{autotable_import, jspdf_import, px_to_mm, CodegenOptions};
use crate::canvas::{
    BarcodeElement, CanvasElement, ElementKind, ImageElement, QrCodeElement, TableElement,
    TextElement,
};
use crate::ir::{
    js_string, AutoTable, Expr, Function, ImageFormat, Import, Module, Op, Rgb,
};

/// Function name used when the options name none.
pub const VISUAL_FUNCTION_NAME: &str = "createVisualTemplate";

/// Output for a canvas with no elements.
pub const EMPTY_CANVAS_CODE: &str = "// Add elements to generate jsPDF code here";

/// Header fill of canvas tables.
pub const TABLE_HEAD_FILL: Rgb = Rgb(41, 128, 185);

const DEFAULT_TEXT: &str = "Text";
const DEFAULT_QR: &str = "https://example.com";
const DEFAULT_BARCODE: &str = "1234567890";
const PLACEHOLDER_IMAGE: &str = "data:image/png;base64,iVBORw0KGgo...";

/// Generate the jsPDF program for an element list.
pub fn visual_code(elements: &[CanvasElement], opts: &CodegenOptions) -> String {
    match visual_module(elements, opts) {
        Some(module) => module.to_source(),
        None => EMPTY_CANVAS_CODE.to_string(),
    }
}

/// Build the IR for an element list; `None` when the list is empty.
pub fn visual_module(elements: &[CanvasElement], opts: &CodegenOptions) -> Option<Module> {
    if elements.is_empty() {
        return None;
    }
    let name = opts.name_or(VISUAL_FUNCTION_NAME);

    let mut body = vec![
        Op::NewDocument,
        Op::Blank,
        Op::Comment("Base font".into()),
        Op::SetFont(None),
        Op::Blank,
    ];

    for (i, element) in elements.iter().enumerate() {
        body.push(Op::Comment(format!(
            "Element {}: {}",
            i + 1,
            element.type_name()
        )));
        emit_element(&mut body, element);
        body.push(Op::Blank);
    }
    body.push(Op::Return);

    Some(Module {
        imports: if opts.include_imports {
            imports(elements)
        } else {
            Vec::new()
        },
        function: Function {
            name: name.clone(),
            style: opts.template,
            export: opts.export_type,
            is_async: true,
            body,
        },
        usage: usage_example(&name, elements),
    })
}

fn imports(elements: &[CanvasElement]) -> Vec<Import> {
    let has = |tag: &str| elements.iter().any(|e| e.type_name() == tag);

    let mut imports = vec![jspdf_import()];
    if has("qrcode") {
        imports.push(Import::Default {
            name: "QRCode".into(),
            from: "qrcode".into(),
        });
    }
    if has("barcode") {
        imports.push(Import::Default {
            name: "JsBarcode".into(),
            from: "jsbarcode".into(),
        });
    }
    if has("table") {
        imports.push(autotable_import());
    }
    imports
}

/// Element geometry converted to page millimeters.
struct MmFrame {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl MmFrame {
    fn of(element: &CanvasElement) -> Self {
        Self {
            x: px_to_mm(element.x),
            y: px_to_mm(element.y),
            width: px_to_mm(element.width),
            height: px_to_mm(element.height),
        }
    }

    /// `doc.rect` over the frame plus a label near its top-left corner.
    fn placeholder(&self, label: &str) -> Vec<Op> {
        vec![
            Op::Comment("Draw a placeholder instead".into()),
            Op::Rect {
                x: Expr::num(self.x),
                y: Expr::num(self.y),
                width: Expr::num(self.width),
                height: Expr::num(self.height),
            },
            Op::Text {
                value: Expr::str(label),
                x: Expr::num(self.x + 5.0),
                y: Expr::num(self.y + 10.0),
                align: None,
            },
        ]
    }

    fn add_image(&self, source: Expr, format: ImageFormat) -> Op {
        Op::AddImage {
            source,
            format,
            x: Expr::num(self.x),
            y: Expr::num(self.y),
            width: Expr::num(self.width),
            height: Expr::num(self.height),
        }
    }
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

fn emit_element(body: &mut Vec<Op>, element: &CanvasElement) {
    let sfx = element.field_suffix();
    let frame = MmFrame::of(element);

    match &element.kind {
        ElementKind::Text(text) => emit_text(body, text, &sfx, &frame),
        ElementKind::QrCode(qr) => emit_qr(body, qr, &sfx, &frame),
        ElementKind::Barcode(barcode) => emit_barcode(body, barcode, &sfx, &frame),
        ElementKind::Image(image) => emit_image(body, image, &sfx, &frame),
        ElementKind::Table(table) => emit_table(body, table, &sfx, &frame),
    }
}

fn emit_text(body: &mut Vec<Op>, text: &TextElement, sfx: &str, frame: &MmFrame) {
    body.push(Op::SetFontSize(text.font_size));
    body.push(Op::SetFont(Some(text.font_weight)));
    if !text.color.is_empty() && !text.color.eq_ignore_ascii_case("#000000") {
        body.push(Op::SetTextColor(Rgb::from_hex(&text.color)));
    }
    body.push(Op::Text {
        value: Expr::data_or(
            format!("text{}", sfx),
            or_default(&text.content, DEFAULT_TEXT),
        ),
        x: Expr::num(frame.x),
        y: Expr::num(frame.y),
        align: None,
    });
}

fn emit_qr(body: &mut Vec<Op>, qr: &QrCodeElement, sfx: &str, frame: &MmFrame) {
    let side = px_to_mm(qr.size);
    let square = MmFrame {
        x: frame.x,
        y: frame.y,
        width: side,
        height: side,
    };
    body.push(Op::Try {
        body: vec![
            Op::QrDataUrl {
                name: "qrDataUrl".into(),
                value: Expr::data_or(
                    format!("qrData{}", sfx),
                    or_default(&qr.content, DEFAULT_QR),
                ),
                width: qr.size * 2.0,
            },
            square.add_image(Expr::ident("qrDataUrl"), ImageFormat::Png),
        ],
        error_message: "QR code generation failed".into(),
        fallback: square.placeholder("QR Code"),
    });
}

fn emit_barcode(body: &mut Vec<Op>, barcode: &BarcodeElement, sfx: &str, frame: &MmFrame) {
    body.push(Op::Try {
        body: vec![
            Op::BarcodeDataUrl {
                name: "barcodeDataUrl".into(),
                value: Expr::data_or(
                    format!("barcodeData{}", sfx),
                    or_default(&barcode.content, DEFAULT_BARCODE),
                ),
                format: barcode.format.name().into(),
            },
            frame.add_image(Expr::ident("barcodeDataUrl"), ImageFormat::Png),
        ],
        error_message: "Barcode generation failed".into(),
        fallback: frame.placeholder("Barcode"),
    });
}

/// `PNG` for PNG data URLs and `.png` paths, `JPEG` otherwise.
pub fn image_format_hint(src: &str) -> ImageFormat {
    let lower = src.to_ascii_lowercase();
    if lower.starts_with("data:") {
        return if lower.starts_with("data:image/png") {
            ImageFormat::Png
        } else {
            ImageFormat::Jpeg
        };
    }
    let path = lower.split(['?', '#']).next().unwrap_or("");
    if path.ends_with(".png") {
        ImageFormat::Png
    } else {
        ImageFormat::Jpeg
    }
}

fn emit_image(body: &mut Vec<Op>, image: &ImageElement, sfx: &str, frame: &MmFrame) {
    let src = or_default(&image.src, PLACEHOLDER_IMAGE);
    let mut attempt = Vec::new();
    if !src.starts_with("data:") {
        attempt.push(Op::Comment(format!("Image URL: {}", src)));
    }
    attempt.push(Op::Const {
        name: "imageUrl".into(),
        value: Expr::data_or(format!("imageUrl{}", sfx), src),
    });
    attempt.push(frame.add_image(Expr::ident("imageUrl"), image_format_hint(src)));

    body.push(Op::Try {
        body: attempt,
        error_message: "Adding image failed".into(),
        fallback: frame.placeholder("Image"),
    });
}

fn emit_table(body: &mut Vec<Op>, table: &TableElement, sfx: &str, frame: &MmFrame) {
    let name = format!("tableData{}", sfx);
    body.push(Op::ConstRows {
        name: name.clone(),
        data_key: Some(name.clone()),
        rows: table.data.clone(),
    });
    body.push(Op::Blank);
    body.push(Op::AutoTable(AutoTable {
        start_y: Expr::num(frame.y),
        margin_left: Some(Expr::num(frame.x)),
        head: Expr::Array(vec![Expr::strings(&table.headers)]),
        body: Expr::ident(name),
        head_fill: TABLE_HEAD_FILL,
        column_widths: Vec::new(),
    }));
}

fn usage_example(name: &str, elements: &[CanvasElement]) -> Vec<String> {
    let mut lines = vec![
        "Usage example:".to_string(),
        format!("const doc = await {}({{", name),
    ];

    for element in elements {
        let sfx = element.field_suffix();
        let mut field = |key: &str, value: &str| {
            lines.push(format!("  {}{}: {},", key, sfx, js_string(value)));
        };
        match &element.kind {
            ElementKind::Text(text) => field("text", or_default(&text.content, "Your text")),
            ElementKind::QrCode(qr) => field("qrData", or_default(&qr.content, DEFAULT_QR)),
            ElementKind::Barcode(barcode) => {
                field("barcodeData", or_default(&barcode.content, DEFAULT_BARCODE))
            }
            ElementKind::Image(image) => field(
                "imageUrl",
                or_default(&image.src, "https://example.com/image.jpg"),
            ),
            ElementKind::Table(table) => {
                lines.push(format!("  tableData{}: [", sfx));
                let last = table.data.len().saturating_sub(1);
                for (i, row) in table.data.iter().enumerate() {
                    let sep = if i == last { "" } else { "," };
                    lines.push(format!("    {}{}", Expr::strings(row).to_js(), sep));
                }
                lines.push("  ],".to_string());
            }
        }
    }

    lines.push("});".to_string());
    lines.push("doc.save('visual-template.pdf');".to_string());
    lines
}
