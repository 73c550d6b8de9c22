//! # Intermediate Representation (IR)
//!
//! Generators do not write JavaScript directly. They build a [`Module`]: a
//! list of imports, one function declaration whose body is a `Vec<Op>`, and
//! a trailing usage comment. Codegen turns the module into source text.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ Generators  │ ──► │     IR      │ ──► │   Codegen    │
//! │ (slip, viz) │     │  (Vec<Op>)  │     │ (JavaScript) │
//! └─────────────┘     └─────────────┘     └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use pickslip::ir::{DeclStyle, ExportStyle, Expr, Function, Module, Op};
//!
//! let module = Module {
//!     imports: vec![],
//!     function: Function {
//!         name: "hello".into(),
//!         style: DeclStyle::Function,
//!         export: ExportStyle::Export,
//!         is_async: false,
//!         body: vec![
//!             Op::NewDocument,
//!             Op::Text {
//!                 value: Expr::str("Hello"),
//!                 x: Expr::num(20),
//!                 y: Expr::num(20),
//!                 align: None,
//!             },
//!             Op::Return,
//!         ],
//!     },
//!     usage: vec![],
//! };
//!
//! let js = module.to_source();
//! assert!(js.starts_with("export function hello(data = {}) {"));
//! assert!(js.contains("doc.text('Hello', 20, 20);"));
//! ```

mod codegen;
mod ops;

// Re-export the ops types (codegen adds methods to Module via impl)
pub use codegen::{js_number, js_string};
pub use ops::*;
