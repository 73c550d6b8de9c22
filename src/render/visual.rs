//! Canvas elements → PDF.
//!
//! Elements are drawn in paint order at half their canvas coordinates
//! (2 px per mm). An element that cannot be drawn is replaced by a
//! rectangle with a label; the document as a whole never fails because of
//! one element.

use image::DynamicImage;

use super::barcode;
use super::image_source::ResolvedImages;
use super::{fit_text, Page};
use crate::canvas::{
    BarcodeElement, CanvasElement, ElementKind, QrCodeElement, TableElement, TextElement,
    PX_TO_MM,
};
use crate::error::PickslipError;
use crate::ir::{FontStyle, Rgb};

const LABEL_PT: f64 = 12.0;
const TABLE_PT: f64 = 10.0;
/// Height reserved under the bars for the human-readable value.
const BARCODE_TEXT_MM: f64 = 4.0;
const BARCODE_TEXT_PT: f64 = 8.0;

/// Render elements to PDF bytes. `images` holds the decoded bitmap for each
/// image element that could be resolved, keyed by element index.
pub fn render_elements(
    elements: &[CanvasElement],
    images: &ResolvedImages,
) -> Result<Vec<u8>, PickslipError> {
    let mut page = Page::a4("Visual Template")?;

    for (index, element) in elements.iter().enumerate() {
        let frame = PageBox::of(element);
        let drawn = match &element.kind {
            ElementKind::Text(text) => {
                draw_text(&mut page, text, &frame);
                Ok(())
            }
            ElementKind::QrCode(qr) => draw_qr(&page, qr, &frame),
            ElementKind::Barcode(code) => draw_barcode(&page, code, &frame),
            ElementKind::Image(_) => match images.get(&index) {
                Some(bitmap) => {
                    draw_image(&page, bitmap, &frame);
                    Ok(())
                }
                None => Err(PickslipError::Image("image not resolved".into())),
            },
            ElementKind::Table(table) => {
                draw_table(&page, table, &frame);
                Ok(())
            }
        };

        if let Err(e) = drawn {
            tracing::warn!(
                element = %element.id,
                kind = element.type_name(),
                error = %e,
                "Drawing placeholder"
            );
            draw_placeholder(&mut page, element, &frame);
        }
    }

    tracing::debug!(elements = elements.len(), "Rendered visual template");
    page.finish()
}

/// Element frame in page millimeters.
struct PageBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl PageBox {
    fn of(element: &CanvasElement) -> Self {
        Self {
            x: element.x * PX_TO_MM,
            y: element.y * PX_TO_MM,
            width: element.width * PX_TO_MM,
            height: element.height * PX_TO_MM,
        }
    }
}

fn draw_text(page: &mut Page, text: &TextElement, frame: &PageBox) {
    page.set_text_color(Rgb::from_hex(&text.color));
    page.text(&text.content, text.font_size, text.font_weight, frame.x, frame.y);
}

fn draw_qr(page: &Page, qr: &QrCodeElement, frame: &PageBox) -> Result<(), PickslipError> {
    // Rasterized at twice the canvas size, like the browser preview
    let bitmap = barcode::qr_image(&qr.content, (qr.size * 2.0).max(1.0) as u32)?;
    let side = qr.size * PX_TO_MM;
    page.image(&DynamicImage::ImageLuma8(bitmap), frame.x, frame.y, side, side);
    Ok(())
}

fn draw_barcode(page: &Page, code: &BarcodeElement, frame: &PageBox) -> Result<(), PickslipError> {
    let modules = barcode::encode(code.format, &code.content)?;
    if modules.is_empty() {
        return Err(PickslipError::Barcode("empty encoding".into()));
    }

    let module_width = frame.width / modules.len() as f64;
    let with_text = frame.height > BARCODE_TEXT_MM * 2.0;
    let bar_height = if with_text {
        frame.height - BARCODE_TEXT_MM
    } else {
        frame.height
    };

    for (start, len) in barcode::bar_runs(&modules) {
        page.fill_rect(
            frame.x + start as f64 * module_width,
            frame.y,
            len as f64 * module_width,
            bar_height,
            Rgb::BLACK,
        );
    }
    if with_text {
        page.text_centered(
            &code.content,
            BARCODE_TEXT_PT,
            FontStyle::Normal,
            frame.x + frame.width / 2.0,
            frame.y + frame.height - 0.8,
        );
    }
    Ok(())
}

fn draw_image(page: &Page, bitmap: &DynamicImage, frame: &PageBox) {
    page.image(bitmap, frame.x, frame.y, frame.width, frame.height);
}

fn draw_table(page: &Page, table: &TableElement, frame: &PageBox) {
    let (rows, cols) = table.grid();
    let cell_w = frame.width / cols as f64;
    let cell_h = frame.height / rows as f64;

    for row in 0..rows {
        let style = if row == 0 {
            FontStyle::Bold
        } else {
            FontStyle::Normal
        };
        for col in 0..cols {
            let x = frame.x + col as f64 * cell_w;
            let y = frame.y + row as f64 * cell_h;
            page.rect(x, y, cell_w, cell_h);
            let text = fit_text(table.cell(row, col), cell_w - 3.0, TABLE_PT, style);
            if !text.is_empty() && text != "..." {
                page.text(&text, TABLE_PT, style, x + 2.0, y + 5.0);
            }
        }
    }
}

fn draw_placeholder(page: &mut Page, element: &CanvasElement, frame: &PageBox) {
    let (width, height) = match &element.kind {
        ElementKind::QrCode(qr) => (qr.size * PX_TO_MM, qr.size * PX_TO_MM),
        _ => (frame.width, frame.height),
    };
    page.set_text_color(Rgb::BLACK);
    page.rect(frame.x, frame.y, width, height);
    page.text(
        placeholder_label(&element.kind),
        LABEL_PT,
        FontStyle::Normal,
        frame.x + 5.0,
        frame.y + 10.0,
    );
}

/// Label drawn inside an element's placeholder.
pub fn placeholder_label(kind: &ElementKind) -> &'static str {
    match kind {
        ElementKind::QrCode(_) => "QR Code",
        ElementKind::Barcode(_) => "Barcode",
        ElementKind::Image(_) => "Image",
        ElementKind::Text(_) => "Text",
        ElementKind::Table(_) => "Table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{default_element, BarcodeFormat, ElementId};
    use image::{GrayImage, Luma};

    fn all_defaults() -> Vec<CanvasElement> {
        ["text", "qrcode", "barcode", "image", "table"]
            .iter()
            .enumerate()
            .map(|(i, t)| default_element(t, ElementId(i as u64 + 1)).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_list_renders_blank_page() {
        let bytes = render_elements(&[], &ResolvedImages::new()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_all_element_types_render() {
        let elements = all_defaults();
        let mut images = ResolvedImages::new();
        images.insert(
            3,
            DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 6, Luma([128]))),
        );
        let bytes = render_elements(&elements, &images).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_failures_become_placeholders() {
        let mut barcode = default_element("barcode", ElementId(1)).unwrap();
        if let ElementKind::Barcode(b) = &mut barcode.kind {
            b.format = BarcodeFormat::Ean8;
            b.content = "not digits".into();
        }
        let image = default_element("image", ElementId(2)).unwrap();

        // Unencodable barcode and unresolved image still yield a document
        let bytes = render_elements(&[barcode, image], &ResolvedImages::new()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_huge_qr_size_renders() {
        let elements: Vec<CanvasElement> = serde_json::from_str(
            r#"[{"type": "qrcode", "content": "x", "size": 1000000, "width": 50, "height": 50}]"#,
        )
        .unwrap();
        let bytes = render_elements(&elements, &ResolvedImages::new()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_huge_table_renders() {
        let elements: Vec<CanvasElement> = serde_json::from_str(
            r#"[{"type": "table", "rows": 4294967295, "cols": 4294967295, "width": 300, "height": 200}]"#,
        )
        .unwrap();
        let bytes = render_elements(&elements, &ResolvedImages::new()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_placeholder_labels() {
        let qr = default_element("qrcode", ElementId(1)).unwrap();
        assert_eq!(placeholder_label(&qr.kind), "QR Code");
        let img = default_element("image", ElementId(1)).unwrap();
        assert_eq!(placeholder_label(&img.kind), "Image");
    }
}
