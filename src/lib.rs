//! # pickslip - Picking Slip Designer Library
//!
//! pickslip turns warehouse picking slips into PDFs and into reusable jsPDF
//! source code. It provides two pipelines:
//!
//! - **Text pipeline**: loosely structured slip text is parsed into a
//!   [`SlipRecord`](slip::SlipRecord), rendered as a PDF preview, and emitted
//!   as a `createPickingSlipPDF(data)` function.
//! - **Visual pipeline**: positioned text, QR code, barcode, image and table
//!   elements on a [`Canvas`](canvas::Canvas) are rendered as a PDF and
//!   emitted as an async `createVisualTemplate(data)` function.
//!
//! ## Quick Start
//!
//! ```
//! use pickslip::{generate, render, slip};
//!
//! let record = slip::parse("\
//! Company: Acme Corp
//! Order Number: ORD-1
//! - Product Code: A1, Product Name: Widget, Quantity: 2, Location: L1, Note: fragile
//! ");
//! assert_eq!(record.items.len(), 1);
//!
//! let js = generate::slip_code(&record, &generate::CodegenOptions::default());
//! assert!(js.contains("createPickingSlipPDF"));
//!
//! let pdf = render::slip::render_slip(&record)?;
//! assert!(pdf.starts_with(b"%PDF"));
//! # Ok::<(), pickslip::PickslipError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`slip`] | Slip record model and text parser |
//! | [`canvas`] | Visual builder elements and drag state |
//! | [`ir`] | jsPDF program IR and JavaScript emitter |
//! | [`generate`] | Record/elements to IR |
//! | [`render`] | Server-side PDF rendering |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod canvas;
pub mod error;
pub mod generate;
pub mod ir;
pub mod render;
pub mod server;
pub mod slip;

// Re-exports for convenience
pub use error::PickslipError;
