pub mod pdf;

pub use pdf::{InvoiceRenderer, PdfRenderer, RenderError};
