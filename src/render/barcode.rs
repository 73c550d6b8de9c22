//! Barcode and QR code encoding for PDF rendering.
//!
//! Uses the barcoders crate for the 1D symbologies and the qrcode crate for
//! QR codes.

use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::ean8::EAN8;
use image::{GrayImage, Luma};
use qrcode::QrCode;

use crate::canvas::BarcodeFormat;
use crate::error::PickslipError;

/// Encode `data` as barcode modules: `true` = bar, `false` = space.
pub fn encode(format: BarcodeFormat, data: &str) -> Result<Vec<bool>, PickslipError> {
    let modules = match format {
        BarcodeFormat::Code128 => {
            // Character set B covers upper and lower case, digits and punctuation
            Code128::new(format!("\u{0181}{}", data))
                .map(|b| b.encode())
                .map_err(|e| reject(format, data, e))?
        }
        BarcodeFormat::Code39 => Code39::new(data)
            .map(|b| b.encode())
            .map_err(|e| reject(format, data, e))?,
        BarcodeFormat::Ean13 => EAN13::new(payload(data, 12)?)
            .map(|b| b.encode())
            .map_err(|e| reject(format, data, e))?,
        BarcodeFormat::Ean8 => EAN8::new(payload(data, 7)?)
            .map(|b| b.encode())
            .map_err(|e| reject(format, data, e))?,
        // UPC-A is EAN-13 with a leading zero
        BarcodeFormat::Upc => EAN13::new(format!("0{}", payload(data, 11)?))
            .map(|b| b.encode())
            .map_err(|e| reject(format, data, e))?,
    };
    Ok(modules.into_iter().map(|m| m == 1).collect())
}

/// Digits without the check digit. Accepts the data with or without it.
fn payload(data: &str, len: usize) -> Result<String, PickslipError> {
    if !data.chars().all(|c| c.is_ascii_digit()) || !(len..=len + 1).contains(&data.len()) {
        return Err(PickslipError::Barcode(format!(
            "expected {} or {} digits, got {:?}",
            len,
            len + 1,
            data
        )));
    }
    Ok(data[..len].to_string())
}

fn reject(format: BarcodeFormat, data: &str, err: impl std::fmt::Display) -> PickslipError {
    PickslipError::Barcode(format!("{} cannot encode {:?}: {}", format.name(), data, err))
}

/// Largest requested QR bitmap side. The PDF scales the bitmap to the
/// element frame, so larger rasters add no detail.
pub const MAX_QR_PX: u32 = 2048;

/// Render `content` as a QR code bitmap, at least `min_px` pixels square
/// (capped at [`MAX_QR_PX`]), with a one-module quiet zone.
pub fn qr_image(content: &str, min_px: u32) -> Result<GrayImage, PickslipError> {
    let min_px = min_px.min(MAX_QR_PX);
    let code = QrCode::new(content.as_bytes())
        .map_err(|e| PickslipError::QrCode(format!("Failed to encode {:?}: {}", content, e)))?;

    let modules = code.width() as u32;
    let quiet = 1;
    let total = modules + 2 * quiet;
    let scale = min_px.div_ceil(total).max(1);

    let colors = code.to_colors();
    let mut image = GrayImage::from_pixel(total * scale, total * scale, Luma([255]));
    for (i, color) in colors.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let mx = i as u32 % modules + quiet;
        let my = i as u32 / modules + quiet;
        for dy in 0..scale {
            for dx in 0..scale {
                image.put_pixel(mx * scale + dx, my * scale + dy, Luma([0]));
            }
        }
    }
    Ok(image)
}

/// Runs of consecutive bars as `(start, length)` in modules.
pub fn bar_runs(modules: &[bool]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &bar) in modules.iter().enumerate() {
        match (bar, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, modules.len() - s));
    }
    runs
}
