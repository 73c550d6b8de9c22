//! # Pipeline Tests
//!
//! End-to-end runs of both pipelines through the public API: text to record
//! to code and PDF, and canvas edits to code and PDF.

use chrono::{Local, TimeZone};
use pickslip::canvas::{Canvas, CanvasElement, ElementPatch, Point, PointerEvent};
use pickslip::generate::{self, CodegenOptions};
use pickslip::ir::{DeclStyle, ExportStyle};
use pickslip::render::{self, image_source::ResolvedImages};
use pickslip::slip::{self, SlipRecord};
use pretty_assertions::assert_eq;

const SLIP: &str = "\
Company: Acme Corp
Address: 1 Main St
Phone: 555-0100
Order Number: ORD-42
Customer Name: Jane Doe
- Product Code: A1, Product Name: Widget, Quantity: 2, Location: L1, Note: fragile
- Product Code: B2, Product Name: Gadget, Quantity: 1, Location: L2, Note: none
Picker: Kim
Inspector: Lee
";

#[test]
fn slip_text_to_code() {
    let record = slip::parse(SLIP);
    assert_eq!(record.items.len(), 2);
    assert_eq!(record.company_name.as_deref(), Some("Acme Corp"));

    let code = generate::slip_code(&record, &CodegenOptions::default());
    assert!(code.starts_with("import { jsPDF } from 'jspdf';\nimport 'jspdf-autotable';"));
    assert!(code.contains("data.companyName || 'Acme Corp'"));
    assert!(code.contains("data.orderNumber || 'ORD-42'"));
    assert!(code.contains("const tableData = ["));
    assert!(code.contains("data.picker || 'Kim'"));
    assert!(code.contains("  return doc;\n}"));
}

#[test]
fn slip_code_respects_options() {
    let record = slip::parse("Company: Acme");
    let opts = CodegenOptions {
        template: DeclStyle::Arrow,
        export_type: ExportStyle::None,
        function_name: Some("makeSlip".into()),
        include_imports: false,
    };
    let code = generate::slip_code(&record, &opts);
    assert!(code.starts_with("const makeSlip = (data = {}) => {"));
    assert!(!code.contains("import "));
    assert!(!code.contains("createPickingSlipPDF"));
}

#[test]
fn slip_text_round_trips_through_record_text() {
    let record = slip::parse(SLIP);
    assert_eq!(slip::parse(&record.to_text()), record);
}

#[test]
fn sample_text_parses_fully() {
    let now = Local.with_ymd_and_hms(2026, 10, 19, 14, 5, 9).unwrap();
    let record = slip::parse(&slip::sample_text(now));
    assert_eq!(record.items.len(), 3);
    assert_eq!(record.items[0].code.as_deref(), Some("LF001"));
    assert_eq!(record.picker.as_deref(), Some("Kim Picker"));
    // Dates are not parser-recognized
    assert_eq!(record.order_date, None);
    assert_eq!(record.shipment_time, None);
}

#[test]
fn slip_record_renders_pdf() {
    let pdf = render::slip::render_slip(&slip::parse(SLIP)).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let empty = render::slip::render_slip(&SlipRecord::default()).unwrap();
    assert!(empty.starts_with(b"%PDF"));
}

#[test]
fn canvas_edit_to_code_and_pdf() {
    let mut canvas = Canvas::new();
    let text = canvas.add("text").unwrap();
    let qr = canvas.add("qrcode").unwrap();
    canvas.add("table").unwrap();

    canvas
        .update(
            text,
            &ElementPatch {
                content: Some("Ship to".into()),
                color: Some("#ff0000".into()),
                ..Default::default()
            },
        )
        .unwrap();

    canvas.pointer(PointerEvent::Down {
        element: qr,
        at: Point::new(30.0, 60.0),
        on_controls: false,
    });
    canvas.pointer(PointerEvent::Move {
        at: Point::new(110.0, 260.0),
    });
    canvas.pointer(PointerEvent::Up);
    let moved = canvas.element(qr).unwrap();
    assert_eq!((moved.x, moved.y), (100.0, 250.0));

    let code = canvas.code();
    assert!(code.contains("export async function createVisualTemplate(data = {}) {"));
    assert!(code.contains("import QRCode from 'qrcode';"));
    assert!(code.contains("import 'jspdf-autotable';"));
    assert!(code.contains("doc.setTextColor(255, 0, 0);"));
    assert!(code.contains(&format!("data.text{} || 'Ship to'", text.suffix())));
    assert!(code.contains("doc.addImage(qrDataUrl, 'PNG', 50, 125, 25, 25);"));

    let pdf = render::visual::render_elements(canvas.elements(), &ResolvedImages::new()).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn elements_from_json() {
    let json = r##"[
        {"id": 1700000000000123, "x": 40, "y": 60, "width": 100, "height": 20,
         "type": "text", "content": "Hello", "fontSize": 16, "fontWeight": "bold"},
        {"id": 1700000000000456, "x": 40, "y": 200, "width": 120, "height": 40,
         "type": "barcode", "content": "ABC-1", "format": "CODE39"}
    ]"##;
    let elements: Vec<CanvasElement> = serde_json::from_str(json).unwrap();
    let code = generate::visual_code(&elements, &CodegenOptions::default());

    assert!(code.contains("// Element 1: text"));
    assert!(code.contains("doc.setFontSize(16);"));
    assert!(code.contains("doc.text(data.text123 || 'Hello', 20, 30);"));
    assert!(code.contains("// Element 2: barcode"));
    assert!(code.contains("data.barcodeData456 || 'ABC-1'"));
    assert!(code.contains("format: 'CODE39',"));
    assert!(!code.contains("setTextColor"));
}

#[test]
fn empty_canvas_is_placeholder_comment() {
    assert_eq!(
        generate::visual_code(&[], &CodegenOptions::default()),
        "// Add elements to generate jsPDF code here"
    );
}
