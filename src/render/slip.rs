//! Picking slip PDF.
//!
//! Same layout as the generated jsPDF program. Fields the record lacks are
//! drawn with sample values so a preview is never blank.

use chrono::{DateTime, Local};

use super::{fit_text, Page};
use crate::error::PickslipError;
use crate::generate;
use crate::ir::{FontStyle, Rgb};
use crate::slip::{self, ItemField, SlipField, SlipRecord};

/// Left margin of the product table (the autoTable default of 40 pt).
const TABLE_LEFT: f64 = 14.0;
const ROW_HEIGHT: f64 = 10.0;
const CELL_PADDING: f64 = 3.0;
const TABLE_FONT_PT: f64 = 10.0;
const GRID_COLOR: Rgb = Rgb(200, 200, 200);

const LABEL_X: f64 = 20.0;
const VALUE_X: f64 = 60.0;

/// Render a record as PDF bytes.
pub fn render_slip(record: &SlipRecord) -> Result<Vec<u8>, PickslipError> {
    render_slip_at(record, Local::now())
}

/// Render with `now` supplying the sample order number and dates.
pub fn render_slip_at(record: &SlipRecord, now: DateTime<Local>) -> Result<Vec<u8>, PickslipError> {
    let mut page = Page::a4(record.title())?;
    page.set_text_color(Rgb::BLACK);

    page.text_centered(record.title(), 18.0, FontStyle::Bold, 105.0, 20.0);

    let sample = |field: SlipField| -> String {
        match field {
            SlipField::CompanyName => "Line Friends Co., Ltd.".into(),
            SlipField::CompanyAddress => "123 Teheran-ro, Gangnam-gu, Seoul, South Korea".into(),
            SlipField::CompanyPhone => "+82-2-1234-5678".into(),
            SlipField::OrderNumber => format!("ORD-{}", now.timestamp_millis()),
            SlipField::OrderDate => slip::us_date(now),
            SlipField::CustomerName => "John Smith".into(),
            SlipField::Picker => "Kim Picker".into(),
            SlipField::Inspector => "Lee Inspector".into(),
            SlipField::ShipmentTime => slip::us_datetime(now),
        }
    };
    let field = |page: &Page, field: SlipField, y: f64| {
        let value = record
            .value(field)
            .map(str::to_string)
            .unwrap_or_else(|| sample(field));
        page.text(&format!("{}:", field.label()), 12.0, FontStyle::Normal, LABEL_X, y);
        page.text(&value, 12.0, FontStyle::Normal, VALUE_X, y);
    };

    field(&page, SlipField::CompanyName, 35.0);
    field(&page, SlipField::CompanyAddress, 45.0);
    field(&page, SlipField::CompanyPhone, 55.0);

    page.text("Order Information", 14.0, FontStyle::Bold, LABEL_X, 75.0);
    field(&page, SlipField::OrderNumber, 90.0);
    field(&page, SlipField::OrderDate, 100.0);
    field(&page, SlipField::CustomerName, 110.0);

    let final_y = match draw_items(&mut page, record) {
        Some(table_bottom) => table_bottom + generate::slip::PERSONNEL_GAP,
        None => generate::slip::PERSONNEL_FALLBACK_Y,
    };

    field(&page, SlipField::Picker, final_y);
    field(&page, SlipField::Inspector, final_y + 10.0);
    field(&page, SlipField::ShipmentTime, final_y + 20.0);

    tracing::debug!(
        title = record.title(),
        items = record.items.len(),
        "Rendered picking slip"
    );
    page.finish()
}

/// Draw the product table; returns its bottom edge, or `None` without items.
fn draw_items(page: &mut Page, record: &SlipRecord) -> Option<f64> {
    if record.items.is_empty() {
        return None;
    }
    let widths = generate::slip::COLUMN_WIDTHS.map(f64::from);
    let table_width: f64 = widths.iter().sum();
    let mut y = generate::slip::TABLE_START_Y;

    // Header
    page.fill_rect(TABLE_LEFT, y, table_width, ROW_HEIGHT, generate::slip::TABLE_HEAD_FILL);
    page.set_text_color(Rgb::WHITE);
    let headers = ItemField::ALL.map(ItemField::label);
    draw_row(page, &headers, &widths, y, FontStyle::Bold);
    page.set_text_color(Rgb::BLACK);
    y += ROW_HEIGHT;

    for item in &record.items {
        draw_row(page, &item.cells(), &widths, y, FontStyle::Normal);
        y += ROW_HEIGHT;
    }

    // Grid lines
    let top = generate::slip::TABLE_START_Y;
    page.set_stroke(GRID_COLOR, 0.3);
    let mut x = TABLE_LEFT;
    page.line(x, top, x, y);
    for w in widths {
        x += w;
        page.line(x, top, x, y);
    }
    let mut row_y = top;
    while row_y <= y + f64::EPSILON {
        page.line(TABLE_LEFT, row_y, TABLE_LEFT + table_width, row_y);
        row_y += ROW_HEIGHT;
    }
    page.set_stroke(Rgb::BLACK, 0.5);

    Some(y)
}

fn draw_row(page: &Page, cells: &[&str], widths: &[f64], top: f64, style: FontStyle) {
    let baseline = top + ROW_HEIGHT / 2.0 + 1.3;
    let mut x = TABLE_LEFT;
    for (cell, width) in cells.iter().zip(widths) {
        let text = fit_text(cell, width - 2.0 * CELL_PADDING, TABLE_FONT_PT, style);
        page.text(&text, TABLE_FONT_PT, style, x + CELL_PADDING, baseline);
        x += width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slip::parse;

    #[test]
    fn test_empty_record_renders() {
        let bytes = render_slip(&SlipRecord::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_record_with_items_renders() {
        let record = parse(&slip::sample_text(Local::now()));
        let with_items = render_slip(&record).unwrap();
        assert!(with_items.starts_with(b"%PDF"));

        let without_items = render_slip(&SlipRecord {
            items: vec![],
            ..record
        })
        .unwrap();
        assert!(with_items.len() > without_items.len());
    }
}
