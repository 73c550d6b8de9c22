//! Text pipeline generator: `SlipRecord` → jsPDF picking slip function.
//!
//! Every value block reads `data.<field> || '<parsed literal>'`, so the
//! generated function reproduces the parsed slip when called without
//! arguments and accepts fresh data when called with them.

use chrono::{DateTime, Local};

use super::{autotable_import, jspdf_import, CodegenOptions};
use crate::ir::{
    js_string, AutoTable, Expr, FontStyle, Function, Module, Op, Rgb, TextAlign,
};
use crate::slip::{self, ItemField, SlipField, SlipRecord};

/// Function name used when the options name none.
pub const SLIP_FUNCTION_NAME: &str = "createPickingSlipPDF";

/// Header fill of the product table.
pub const TABLE_HEAD_FILL: Rgb = Rgb(59, 130, 246);

/// Product table column widths in mm.
pub const COLUMN_WIDTHS: [u32; 5] = [25, 50, 20, 25, 30];

/// Top of the product table in mm.
pub const TABLE_START_Y: f64 = 130.0;

/// Gap between the product table and the personnel block in mm.
pub const PERSONNEL_GAP: f64 = 15.0;

/// Personnel block position when no table was drawn.
pub const PERSONNEL_FALLBACK_Y: f64 = 180.0;

const LABEL_X: f64 = 20.0;
const VALUE_X: f64 = 60.0;

/// Rows used by the generated code when the slip text had no item lines.
const SAMPLE_ROWS: [[&str; 5]; 2] = [
    ["LF001", "Sample Product 1", "1", "A-01-01", "Note"],
    ["LF002", "Sample Product 2", "2", "A-02-03", "Note"],
];

/// Generate the jsPDF program for a record.
pub fn slip_code(record: &SlipRecord, opts: &CodegenOptions) -> String {
    slip_module(record, opts, Local::now()).to_source()
}

/// Build the IR for a record. `now` fills the usage example's shipment time
/// when the record has none.
pub fn slip_module(record: &SlipRecord, opts: &CodegenOptions, now: DateTime<Local>) -> Module {
    let name = opts.name_or(SLIP_FUNCTION_NAME);

    let imports = if opts.include_imports {
        vec![jspdf_import(), autotable_import()]
    } else {
        Vec::new()
    };

    let mut body = vec![
        Op::NewDocument,
        Op::Blank,
        Op::Comment("Base font".into()),
        Op::SetFont(None),
        Op::SetFontSize(12.0),
        Op::Blank,
        Op::Comment("Title".into()),
        Op::SetFontSize(18.0),
        Op::SetFont(Some(FontStyle::Bold)),
        Op::Text {
            value: Expr::str(record.title()),
            x: Expr::num(105),
            y: Expr::num(20),
            align: Some(TextAlign::Center),
        },
        Op::Blank,
    ];

    if record.has_company_info() {
        body.push(Op::Comment("Company information".into()));
        body.push(Op::SetFontSize(12.0));
        body.push(Op::SetFont(Some(FontStyle::Normal)));
        for (field, y) in [
            (SlipField::CompanyName, 35),
            (SlipField::CompanyAddress, 45),
            (SlipField::CompanyPhone, 55),
        ] {
            emit_field(&mut body, record, field, Expr::num(y));
        }
    }

    body.extend([
        Op::Comment("Order information".into()),
        Op::SetFontSize(14.0),
        Op::SetFont(Some(FontStyle::Bold)),
        Op::Text {
            value: Expr::str("Order Information"),
            x: Expr::num(LABEL_X),
            y: Expr::num(75),
            align: None,
        },
        Op::Blank,
        Op::SetFontSize(12.0),
        Op::SetFont(Some(FontStyle::Normal)),
    ]);
    for (field, y) in [
        (SlipField::OrderNumber, 90),
        (SlipField::OrderDate, 100),
        (SlipField::CustomerName, 110),
    ] {
        emit_field(&mut body, record, field, Expr::num(y));
    }

    emit_item_table(&mut body, record);

    body.extend([
        Op::Comment("Personnel".into()),
        Op::LastTableY {
            name: "finalY".into(),
            gap: PERSONNEL_GAP,
            fallback: PERSONNEL_FALLBACK_Y,
        },
        Op::Blank,
        Op::SetFontSize(12.0),
        Op::SetFont(Some(FontStyle::Normal)),
    ]);
    for (field, offset) in [
        (SlipField::Picker, 0),
        (SlipField::Inspector, 10),
        (SlipField::ShipmentTime, 20),
    ] {
        let y = if offset == 0 {
            Expr::ident("finalY")
        } else {
            Expr::offset("finalY", offset)
        };
        emit_field(&mut body, record, field, y);
    }

    body.push(Op::Return);

    Module {
        imports,
        function: Function {
            name: name.clone(),
            style: opts.template,
            export: opts.export_type,
            is_async: false,
            body,
        },
        usage: usage_example(&name, record, now),
    }
}

/// Label and `data.<field> || '<literal>'` value, only when the field is set.
fn emit_field(body: &mut Vec<Op>, record: &SlipRecord, field: SlipField, y: Expr) {
    let Some(value) = record.value(field) else {
        return;
    };
    body.push(Op::Text {
        value: Expr::str(format!("{}:", field.label())),
        x: Expr::num(LABEL_X),
        y: y.clone(),
        align: None,
    });
    body.push(Op::Text {
        value: Expr::data_or(field.js_name(), value),
        x: Expr::num(VALUE_X),
        y,
        align: None,
    });
    body.push(Op::Blank);
}

fn header_row() -> Vec<String> {
    ItemField::ALL.iter().map(|f| f.label().to_string()).collect()
}

fn emit_item_table(body: &mut Vec<Op>, record: &SlipRecord) {
    if record.items.is_empty() {
        body.push(Op::Comment(
            "Default product table (no items were parsed)".into(),
        ));
        body.push(Op::ConstRows {
            name: "defaultItems".into(),
            data_key: None,
            rows: SAMPLE_ROWS
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        });
        body.push(Op::Blank);
        body.push(Op::AutoTable(AutoTable {
            start_y: Expr::num(TABLE_START_Y),
            margin_left: None,
            head: Expr::Array(vec![Expr::strings(&header_row())]),
            body: Expr::raw("data.items || defaultItems"),
            head_fill: TABLE_HEAD_FILL,
            column_widths: COLUMN_WIDTHS.iter().map(|w| (*w, None)).collect(),
        }));
        body.push(Op::Blank);
        return;
    }

    let table = vec![
        Op::ItemRows {
            name: "tableData".into(),
            header: header_row(),
            fields: ItemField::ALL.iter().map(|f| f.js_name().to_string()).collect(),
        },
        Op::Blank,
        Op::AutoTable(AutoTable {
            start_y: Expr::num(TABLE_START_Y),
            margin_left: None,
            head: Expr::raw("[tableData[0]]"),
            body: Expr::raw("tableData.slice(1)"),
            head_fill: TABLE_HEAD_FILL,
            column_widths: COLUMN_WIDTHS
                .iter()
                .zip(ItemField::ALL)
                .map(|(w, f)| (*w, Some(f.label().to_string())))
                .collect(),
        }),
    ];

    body.push(Op::Comment("Product table".into()));
    body.push(Op::If {
        condition: "data.items && data.items.length > 0".into(),
        body: table,
    });
    body.push(Op::Blank);
}

fn usage_example(name: &str, record: &SlipRecord, now: DateTime<Local>) -> Vec<String> {
    let field = |f: SlipField, fallback: &str| {
        format!(
            "  {}: {},",
            f.js_name(),
            js_string(record.value(f).unwrap_or(fallback))
        )
    };
    let shipment = slip::us_datetime(now);

    vec![
        "Usage example:".into(),
        format!("const doc = {}({{", name),
        field(SlipField::CompanyName, "Your Company"),
        field(SlipField::CompanyAddress, "Your Address"),
        field(SlipField::CompanyPhone, "Your Phone"),
        field(SlipField::OrderNumber, "ORD-12345"),
        field(SlipField::CustomerName, "Customer Name"),
        "  items: [".into(),
        "    { code: 'ITEM001', name: 'Product 1', quantity: '1', location: 'A-01', note: 'Note' }"
            .into(),
        "  ],".into(),
        field(SlipField::Picker, "Picker Name"),
        field(SlipField::Inspector, "Inspector Name"),
        format!(
            "  shipmentTime: {}",
            js_string(record.value(SlipField::ShipmentTime).unwrap_or(&shipment))
        ),
        "});".into(),
        "doc.save('picking-slip.pdf');".into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DeclStyle, ExportStyle};
    use crate::slip::parse;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 4, 15, 6, 7).unwrap()
    }

    fn texts(module: &Module) -> Vec<String> {
        module
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Text { value, .. } => Some(value.to_js()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_record_has_title_headings_and_return() {
        let module = slip_module(&SlipRecord::default(), &CodegenOptions::default(), fixed_now());
        assert_eq!(
            texts(&module),
            vec!["'Picking Slip'", "'Order Information'"]
        );
        assert_eq!(module.function.body.last(), Some(&Op::Return));
        assert!(
            !module
                .ops()
                .iter()
                .any(|op| matches!(op, Op::Comment(c) if c == "Company information"))
        );
    }

    #[test]
    fn test_company_block_only_for_present_fields() {
        let record = parse("Company: Acme\nPhone: 555");
        let module = slip_module(&record, &CodegenOptions::default(), fixed_now());
        let texts = texts(&module);
        assert!(texts.contains(&"'Company:'".to_string()));
        assert!(texts.contains(&"data.companyName || 'Acme'".to_string()));
        assert!(texts.contains(&"data.companyPhone || '555'".to_string()));
        assert!(!texts.contains(&"'Address:'".to_string()));
    }

    #[test]
    fn test_empty_value_counts_as_absent() {
        let record = parse("Picker:\nInspector: Lee");
        let js = slip_module(&record, &CodegenOptions::default(), fixed_now()).to_source();
        assert!(!js.contains("'Picker:'"));
        assert!(js.contains("doc.text('Inspector:', 20, finalY + 10);"));
        assert!(js.contains("doc.text(data.inspector || 'Lee', 60, finalY + 10);"));
        // Usage example falls back to the placeholder
        assert!(js.contains("//   picker: 'Picker Name',"));
    }

    #[test]
    fn test_items_emit_guarded_table() {
        let record = parse("- Product Code: A1, Product Name: Widget");
        let module = slip_module(&record, &CodegenOptions::default(), fixed_now());
        let guard = module.function.body.iter().find_map(|op| match op {
            Op::If { condition, body } => Some((condition.clone(), body.len())),
            _ => None,
        });
        assert_eq!(
            guard,
            Some(("data.items && data.items.length > 0".to_string(), 3))
        );

        let js = module.to_source();
        assert!(js.contains("    data.items.forEach(item => {\n"));
        assert!(js.contains("        4: { cellWidth: 30 } // Note\n"));
        assert!(!js.contains("defaultItems"));
    }

    #[test]
    fn test_no_items_emit_sample_table() {
        let js = slip_module(&SlipRecord::default(), &CodegenOptions::default(), fixed_now())
            .to_source();
        assert!(js.contains("  const defaultItems = [\n    ['LF001', 'Sample Product 1', '1', 'A-01-01', 'Note'],\n"));
        assert!(js.contains("    body: data.items || defaultItems,\n"));
        assert!(js.contains("      0: { cellWidth: 25 },\n"));
        assert!(!js.contains("forEach"));
    }

    #[test]
    fn test_personnel_block_follows_table() {
        let js = slip_module(&parse("Picker: Kim"), &CodegenOptions::default(), fixed_now())
            .to_source();
        assert!(js.contains(
            "  const finalY = doc.lastAutoTable ? doc.lastAutoTable.finalY + 15 : 180;\n"
        ));
        assert!(js.contains("  doc.text(data.picker || 'Kim', 60, finalY);\n"));
    }

    #[test]
    fn test_full_program_shape() {
        let record = parse("Company: Acme\nOrder Number: ORD-1");
        let js = slip_module(&record, &CodegenOptions::default(), fixed_now()).to_source();

        let expected_head = "\
import { jsPDF } from 'jspdf';
import 'jspdf-autotable';

export function createPickingSlipPDF(data = {}) {
  const doc = new jsPDF({
    orientation: 'portrait',
    unit: 'mm',
    format: 'a4'
  });

  // Base font
  doc.setFont('helvetica');
  doc.setFontSize(12);

  // Title
  doc.setFontSize(18);
  doc.setFont('helvetica', 'bold');
  doc.text('Picking Slip', 105, 20, { align: 'center' });

  // Company information
  doc.setFontSize(12);
  doc.setFont('helvetica', 'normal');
  doc.text('Company:', 20, 35);
  doc.text(data.companyName || 'Acme', 60, 35);

  // Order information
  doc.setFontSize(14);
  doc.setFont('helvetica', 'bold');
  doc.text('Order Information', 20, 75);

  doc.setFontSize(12);
  doc.setFont('helvetica', 'normal');
  doc.text('Order Number:', 20, 90);
  doc.text(data.orderNumber || 'ORD-1', 60, 90);

";
        assert_eq!(&js[..expected_head.len()], expected_head);

        let expected_tail = "\
  return doc;
}

// Usage example:
// const doc = createPickingSlipPDF({
//   companyName: 'Acme',
//   companyAddress: 'Your Address',
//   companyPhone: 'Your Phone',
//   orderNumber: 'ORD-1',
//   customerName: 'Customer Name',
//   items: [
//     { code: 'ITEM001', name: 'Product 1', quantity: '1', location: 'A-01', note: 'Note' }
//   ],
//   picker: 'Picker Name',
//   inspector: 'Inspector Name',
//   shipmentTime: '3/4/2026, 3:06:07 PM'
// });
// doc.save('picking-slip.pdf');";
        assert!(js.ends_with(expected_tail), "{}", js);
    }

    #[test]
    fn test_options_shape_declaration() {
        let record = SlipRecord::default();
        let opts = CodegenOptions {
            template: DeclStyle::Arrow,
            export_type: ExportStyle::None,
            function_name: Some("buildSlip".into()),
            include_imports: false,
        };
        let js = slip_module(&record, &opts, fixed_now()).to_source();
        assert!(js.starts_with("const buildSlip = (data = {}) => {\n"));
        assert!(js.contains("  return doc;\n};\n\n// Usage example:\n// const doc = buildSlip({"));
    }

    #[test]
    fn test_literals_are_escaped() {
        let record = parse("Customer Name: O'Brien");
        let js = slip_code(&record, &CodegenOptions::default());
        assert!(js.contains("data.customerName || 'O\\'Brien'"));
        assert!(js.contains("//   customerName: 'O\\'Brien',"));
    }

    #[test]
    fn test_custom_title() {
        let record = SlipRecord {
            title: Some("Packing List".into()),
            ..Default::default()
        };
        let module = slip_module(&record, &CodegenOptions::default(), fixed_now());
        assert_eq!(texts(&module)[0], "'Packing List'");
    }
}
