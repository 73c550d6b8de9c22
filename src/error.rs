//! # Error Types
//!
//! This module defines error types used throughout the pickslip library.

use thiserror::Error;

use crate::canvas::ElementId;

/// Main error type for pickslip operations
#[derive(Debug, Error)]
pub enum PickslipError {
    /// PDF assembly or serialization failed
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Image could not be fetched or decoded
    #[error("Image error: {0}")]
    Image(String),

    /// Barcode data rejected by the encoder
    #[error("Barcode error: {0}")]
    Barcode(String),

    /// QR code data rejected by the encoder
    #[error("QR code error: {0}")]
    QrCode(String),

    /// No element with this id on the canvas
    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),

    /// No canvas session or preview with this id
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// Request or file content that cannot be used
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network-level errors (binding, serving)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
