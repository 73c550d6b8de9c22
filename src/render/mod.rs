//! # PDF Rendering
//!
//! Server-side rendering of both pipelines into A4 PDF bytes with printpdf.
//!
//! Positions follow jsPDF conventions: millimeters from the top-left corner
//! of the page, text placed at its baseline. [`Page`] converts to PDF's
//! bottom-left origin.
//!
//! ## Modules
//!
//! - [`slip`]: picking slip from a [`SlipRecord`](crate::slip::SlipRecord)
//! - [`visual`]: canvas elements
//! - [`barcode`]: 1D barcode and QR code encoding
//! - [`image_source`]: fetching and decoding image `src` values

pub mod barcode;
pub mod image_source;
pub mod slip;
pub mod visual;

use std::io::BufWriter;

use image::DynamicImage;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point,
    Polygon, Px,
};

use crate::error::PickslipError;
use crate::ir::{FontStyle, Rgb};

/// A4 width in mm.
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// A4 height in mm.
pub const PAGE_HEIGHT_MM: f64 = 297.0;

const PT_PER_MM: f64 = 72.0 / 25.4;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

/// Approximate rendered width of `text` in mm.
///
/// Bold glyphs are treated as 5% wider than regular ones.
pub fn text_width_mm(text: &str, size_pt: f64, style: FontStyle) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize] as u32,
            _ => 556,
        })
        .sum();
    let factor = if style == FontStyle::Bold { 1.05 } else { 1.0 };
    units as f64 / 1000.0 * size_pt * factor / PT_PER_MM
}

/// Longest prefix of `text` that fits in `max_mm`, with `...` when cut.
pub fn fit_text(text: &str, max_mm: f64, size_pt: f64, style: FontStyle) -> String {
    if text_width_mm(text, size_pt, style) <= max_mm {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        out.push(c);
        if text_width_mm(&format!("{}...", out), size_pt, style) > max_mm {
            out.pop();
            break;
        }
    }
    format!("{}...", out.trim_end())
}

fn pdf_color(rgb: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        rgb.0 as f32 / 255.0,
        rgb.1 as f32 / 255.0,
        rgb.2 as f32 / 255.0,
        None,
    ))
}

/// One A4 page with Helvetica loaded, drawn in top-left millimeters.
pub struct Page {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    text_color: Rgb,
}

impl Page {
    pub fn a4(title: &str) -> Result<Self, PickslipError> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM as f32),
            Mm(PAGE_HEIGHT_MM as f32),
            "Layer 1",
        );
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PickslipError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PickslipError::Pdf(e.to_string()))?;

        let page = Self {
            doc,
            layer,
            regular,
            bold,
            text_color: Rgb::BLACK,
        };
        page.layer.set_outline_thickness(0.5);
        page.layer.set_outline_color(pdf_color(Rgb::BLACK));
        page.layer.set_fill_color(pdf_color(Rgb::BLACK));
        Ok(page)
    }

    fn point(x: f64, y: f64) -> Point {
        Point::new(Mm(x as f32), Mm((PAGE_HEIGHT_MM - y) as f32))
    }

    /// Color of subsequent text.
    pub fn set_text_color(&mut self, rgb: Rgb) {
        self.text_color = rgb;
        self.layer.set_fill_color(pdf_color(rgb));
    }

    /// Draw `text` with its baseline starting at `(x, y)`.
    pub fn text(&self, text: &str, size_pt: f64, style: FontStyle, x: f64, y: f64) {
        let font = match style {
            FontStyle::Normal => &self.regular,
            FontStyle::Bold => &self.bold,
        };
        self.layer.use_text(
            text,
            size_pt as f32,
            Mm(x as f32),
            Mm((PAGE_HEIGHT_MM - y) as f32),
            font,
        );
    }

    /// Draw `text` horizontally centered on `center_x`.
    pub fn text_centered(&self, text: &str, size_pt: f64, style: FontStyle, center_x: f64, y: f64) {
        let width = text_width_mm(text, size_pt, style);
        self.text(text, size_pt, style, center_x - width / 2.0, y);
    }

    /// Stroke a rectangle outline.
    pub fn rect(&self, x: f64, y: f64, width: f64, height: f64) {
        self.layer.add_line(Line {
            points: vec![
                (Self::point(x, y), false),
                (Self::point(x + width, y), false),
                (Self::point(x + width, y + height), false),
                (Self::point(x, y + height), false),
            ],
            is_closed: true,
        });
    }

    /// Stroke a line segment.
    pub fn line(&self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.layer.add_line(Line {
            points: vec![(Self::point(x1, y1), false), (Self::point(x2, y2), false)],
            is_closed: false,
        });
    }

    /// Fill a rectangle. The text color is restored afterwards.
    pub fn fill_rect(&self, x: f64, y: f64, width: f64, height: f64, rgb: Rgb) {
        self.layer.set_fill_color(pdf_color(rgb));
        self.layer.add_polygon(Polygon {
            rings: vec![vec![
                (Self::point(x, y), false),
                (Self::point(x + width, y), false),
                (Self::point(x + width, y + height), false),
                (Self::point(x, y + height), false),
            ]],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
        self.layer.set_fill_color(pdf_color(self.text_color));
    }

    /// Outline color and width (in points) of subsequent strokes.
    pub fn set_stroke(&self, rgb: Rgb, width_pt: f64) {
        self.layer.set_outline_color(pdf_color(rgb));
        self.layer.set_outline_thickness(width_pt as f32);
    }

    /// Place a bitmap stretched over the given box.
    ///
    /// Transparent pixels are composited against white.
    pub fn image(&self, source: &DynamicImage, x: f64, y: f64, width: f64, height: f64) {
        let rgba = source.to_rgba8();
        let (width_px, height_px) = rgba.dimensions();
        if width_px == 0 || height_px == 0 || width <= 0.0 || height <= 0.0 {
            return;
        }

        let mut raw = Vec::with_capacity((width_px * height_px * 3) as usize);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = a as f32 / 255.0;
            for channel in [r, g, b] {
                raw.push((channel as f32 * alpha + 255.0 * (1.0 - alpha)) as u8);
            }
        }

        let image = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: raw,
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // DPI fixes the width; scale_y stretches the height to the box
        let dpi = width_px as f64 / (width / 25.4);
        let natural_height = height_px as f64 / dpi * 25.4;
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x as f32)),
                translate_y: Some(Mm((PAGE_HEIGHT_MM - y - height) as f32)),
                dpi: Some(dpi as f32),
                scale_y: Some((height / natural_height) as f32),
                ..Default::default()
            },
        );
    }

    /// Serialize the document.
    pub fn finish(self) -> Result<Vec<u8>, PickslipError> {
        let mut writer = BufWriter::new(Vec::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| PickslipError::Pdf(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| PickslipError::Pdf(e.to_string()))
    }
}
