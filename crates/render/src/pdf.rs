//! Invoice artifact rendering.
//!
//! Invoices are rendered from an embedded Tera HTML template and converted
//! to PDF with wkhtmltopdf when it is on PATH. Without the converter (or
//! when conversion fails) the HTML itself is persisted, so a session always
//! ends with a downloadable artifact.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{info, warn};

use tally_core::domain::invoice::Invoice;

/// Register custom Tera filters used by the invoice template.
///
/// - `money`: 2-decimal rounding, e.g. `amount | money`
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("money", tera_money_filter);
}

fn tera_money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let num = match value {
        tera::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        tera::Value::Null => 0.0,
        _ => 0.0,
    };
    Ok(tera::Value::String(format!("{num:.2}")))
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The seam the conversation controller renders through.
#[async_trait]
pub trait InvoiceRenderer: Send + Sync {
    /// Persist a document for the invoice and return its path.
    async fn render(&self, invoice: &Invoice) -> Result<PathBuf, RenderError>;
}

pub struct PdfRenderer {
    tera: Tera,
    wkhtmltopdf_path: Option<String>,
    output_dir: PathBuf,
    currency_symbol: String,
}

impl PdfRenderer {
    /// Create a renderer writing into `output_dir`, detecting wkhtmltopdf on
    /// PATH.
    pub fn new(output_dir: impl Into<PathBuf>, currency_symbol: impl Into<String>) -> Self {
        let wkhtmltopdf_path =
            which::which("wkhtmltopdf").ok().map(|p| p.to_string_lossy().to_string());

        match &wkhtmltopdf_path {
            Some(path) => info!(path = %path, "wkhtmltopdf found"),
            None => {
                warn!("wkhtmltopdf not found in PATH - invoices will be persisted as HTML")
            }
        }

        Self::with_converter(output_dir, currency_symbol, wkhtmltopdf_path)
    }

    /// Create a renderer that always persists HTML, for hosts known to lack
    /// the converter.
    pub fn html_only(output_dir: impl Into<PathBuf>, currency_symbol: impl Into<String>) -> Self {
        Self::with_converter(output_dir, currency_symbol, None)
    }

    fn with_converter(
        output_dir: impl Into<PathBuf>,
        currency_symbol: impl Into<String>,
        wkhtmltopdf_path: Option<String>,
    ) -> Self {
        let mut tera = Tera::default();
        register_template_filters(&mut tera);
        tera.add_raw_template(
            "invoice.html.tera",
            include_str!("../templates/invoice.html.tera"),
        )
        .expect("embedded invoice template must parse");

        Self {
            tera,
            wkhtmltopdf_path,
            output_dir: output_dir.into(),
            currency_symbol: currency_symbol.into(),
        }
    }

    fn build_context(&self, invoice: &Invoice) -> Context {
        let lines: Vec<serde_json::Value> = invoice
            .lines
            .iter()
            .map(|line| {
                serde_json::json!({
                    "name": line.product_name,
                    "quantity": line.quantity,
                    "rate": line.rate.to_f64().unwrap_or(0.0),
                    "total": line.total.to_f64().unwrap_or(0.0),
                })
            })
            .collect();

        let mut context = Context::new();
        context.insert("invoice_id", &invoice.id.0);
        context.insert("issued_at", &invoice.issued_at.format("%Y-%m-%d %H:%M:%S").to_string());
        context.insert("customer_name", &invoice.customer.name);
        context.insert("customer_phone", invoice.customer.phone.as_deref().unwrap_or("N/A"));
        context.insert("customer_email", invoice.customer.email.as_deref().unwrap_or("N/A"));
        context.insert("lines", &lines);
        context.insert("grand_total", &invoice.grand_total.to_f64().unwrap_or(0.0));
        context.insert("currency", &self.currency_symbol);
        context
    }

    async fn convert_html_to_pdf(
        &self,
        html: &str,
        wkhtmltopdf_path: &str,
        pdf_path: &Path,
    ) -> Result<(), RenderError> {
        let html_path =
            std::env::temp_dir().join(format!("tally_invoice_{}.html", uuid::Uuid::new_v4()));
        tokio::fs::write(&html_path, html).await?;

        let output = Command::new(wkhtmltopdf_path)
            .arg("--quiet")
            .arg(&html_path)
            .arg(pdf_path)
            .output()
            .await;

        let _ = tokio::fs::remove_file(&html_path).await;

        let output = output?;
        if !output.status.success() {
            return Err(RenderError::Conversion(format!(
                "wkhtmltopdf exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl InvoiceRenderer for PdfRenderer {
    async fn render(&self, invoice: &Invoice) -> Result<PathBuf, RenderError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let html = self
            .tera
            .render("invoice.html.tera", &self.build_context(invoice))
            .map_err(|e| RenderError::Template(e.to_string()))?;

        // Ids are second-granular, so a same-second render lands on the same
        // path and overwrites the earlier artifact.
        if let Some(ref wkhtmltopdf) = self.wkhtmltopdf_path {
            let pdf_path = self.output_dir.join(format!("{}.pdf", invoice.id));
            match self.convert_html_to_pdf(&html, wkhtmltopdf, &pdf_path).await {
                Ok(()) => {
                    info!(invoice_id = %invoice.id, path = %pdf_path.display(), "invoice rendered");
                    return Ok(pdf_path);
                }
                Err(e) => {
                    warn!(error = %e, "PDF conversion failed, falling back to HTML");
                }
            }
        }

        let html_path = self.output_dir.join(format!("{}.html", invoice.id));
        tokio::fs::write(&html_path, html).await?;
        info!(invoice_id = %invoice.id, path = %html_path.display(), "invoice rendered");
        Ok(html_path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tempfile::TempDir;
    use uuid::Uuid;

    use tally_core::domain::customer::{Customer, CustomerId};
    use tally_core::domain::invoice::{Invoice, LineItem};

    use super::{InvoiceRenderer, PdfRenderer};

    fn invoice_fixture(phone: Option<&str>) -> Invoice {
        let customer = Customer {
            id: CustomerId(Uuid::new_v4()),
            name: "Hrishita Sharma".to_string(),
            phone: phone.map(|p| p.to_string()),
            email: None,
        };
        let lines = vec![
            LineItem {
                product_name: "Augmentin 625".to_string(),
                quantity: 2,
                rate: Decimal::new(20400, 2),
                total: Decimal::new(40800, 2),
            },
            LineItem {
                product_name: "Crocin Advance".to_string(),
                quantity: 3,
                rate: Decimal::new(3000, 2),
                total: Decimal::new(9000, 2),
            },
        ];
        let issued_at = Utc.with_ymd_and_hms(2026, 3, 15, 9, 41, 7).unwrap();
        Invoice::issue(&customer, lines, issued_at)
    }

    #[tokio::test]
    async fn html_fallback_persists_named_artifact() {
        let dir = TempDir::new().expect("tempdir");
        let renderer = PdfRenderer::html_only(dir.path(), "₹");

        let path = renderer.render(&invoice_fixture(Some("+91 98200 11223"))).await.expect("render");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("INV-20260315094107.html"));

        let html = std::fs::read_to_string(&path).expect("artifact");
        assert!(html.contains("INV-20260315094107"));
        assert!(html.contains("Hrishita Sharma"));
        assert!(html.contains("+91 98200 11223"));
        assert!(html.contains("Augmentin 625"));
        assert!(html.contains("₹204.00"));
        assert!(html.contains("₹498.00"), "grand total should be rendered");
    }

    #[tokio::test]
    async fn missing_contact_fields_render_as_na() {
        let dir = TempDir::new().expect("tempdir");
        let renderer = PdfRenderer::html_only(dir.path(), "₹");

        let path = renderer.render(&invoice_fixture(None)).await.expect("render");
        let html = std::fs::read_to_string(&path).expect("artifact");
        assert!(html.contains("N/A"));
    }

    #[tokio::test]
    async fn same_second_renders_overwrite_the_artifact() {
        let dir = TempDir::new().expect("tempdir");
        let renderer = PdfRenderer::html_only(dir.path(), "₹");

        let first = renderer.render(&invoice_fixture(None)).await.expect("first render");
        let second = renderer.render(&invoice_fixture(None)).await.expect("second render");
        assert_eq!(first, second, "same-second invoices share an id and a path");

        let artifacts = std::fs::read_dir(dir.path()).expect("read dir").count();
        assert_eq!(artifacts, 1);
    }
}
