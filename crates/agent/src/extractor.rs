//! Free text -> structured intent, with a deliberately permissive contract.
//!
//! The model is asked for JSON only, but it cannot be forced; output that
//! fails to parse degrades to a conversational reply instead of an error, so
//! malformed completions never crash a turn.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::llm::LlmClient;

/// Tagged extraction result: small talk or a billing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extraction {
    Reply(String),
    Billing(BillingIntent),
}

/// Billing fields as the model emits them: comma-separated, order-aligned
/// lists still in string form. Quantities stay raw here; parsing them is the
/// calculator's job and its failure is fatal for the turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillingIntent {
    pub customer_name: String,
    pub product_names: String,
    pub quantities: String,
    pub unit_type: String,
}

pub struct IntentExtractor {
    client: Arc<dyn LlmClient>,
}

impl IntentExtractor {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub async fn extract(&self, user_text: &str) -> Result<Extraction> {
        let raw = self.client.complete(&build_prompt(user_text)).await?;
        parse_extraction(&raw)
    }
}

fn build_prompt(user_text: &str) -> String {
    format!(
        r#"You are a billing assistant that turns chat messages into invoice data.

Rules:
1. If the message is a casual greeting or small talk (e.g. "hi", "hello", "how are you?"), respond with a friendly message in JSON like:
{{
  "reply": "Hi there! How can I help you today?"
}}

2. If the message is a billing request like:
"I bought 2 strips of Augmentin and 3 Crocin for Hrishita", return:
{{
  "customer_name": "Hrishita",
  "product_names": "Augmentin, Crocin",
  "quantities": "2, 3",
  "unit_type": "strip"
}}
Respond ONLY with JSON.
User Input:
"""{user_text}"""
"#
    )
}

/// Parse a completion into an [`Extraction`].
///
/// Invalid JSON and non-object JSON fall back to a reply of the raw text. A
/// JSON object that is neither a reply nor a complete billing shape is an
/// error (caught at the turn boundary).
pub fn parse_extraction(raw: &str) -> Result<Extraction> {
    let trimmed = raw.trim();
    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => return Ok(Extraction::Reply(trimmed.to_string())),
    };

    let Some(object) = value.as_object() else {
        return Ok(Extraction::Reply(trimmed.to_string()));
    };

    if let Some(reply) = object.get("reply").and_then(Value::as_str) {
        return Ok(Extraction::Reply(reply.to_string()));
    }

    let customer_name = string_field(object, "customer_name")?;
    let product_names = string_field(object, "product_names")?;
    let quantities = lenient_string_field(object, "quantities")?;
    let unit_type =
        object.get("unit_type").and_then(Value::as_str).unwrap_or("unit").to_string();

    Ok(Extraction::Billing(BillingIntent {
        customer_name,
        product_names,
        quantities,
        unit_type,
    }))
}

fn string_field(object: &serde_json::Map<String, Value>, name: &str) -> Result<String> {
    object
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("model output is missing `{name}`"))
}

// The model sometimes emits a bare number for a single quantity.
fn lenient_string_field(object: &serde_json::Map<String, Value>, name: &str) -> Result<String> {
    match object.get(name) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Number(value)) => Ok(value.to_string()),
        _ => Err(anyhow!("model output is missing `{name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_extraction, BillingIntent, Extraction};

    #[test]
    fn reply_object_becomes_reply() {
        let extraction =
            parse_extraction(r#"{"reply": "Hi there! How can I help?"}"#).expect("parse");
        assert_eq!(extraction, Extraction::Reply("Hi there! How can I help?".to_string()));
    }

    #[test]
    fn billing_object_becomes_intent_with_default_unit_type() {
        let extraction = parse_extraction(
            r#"{"customer_name": "Hrishita", "product_names": "Augmentin, Crocin", "quantities": "2, 3"}"#,
        )
        .expect("parse");
        assert_eq!(
            extraction,
            Extraction::Billing(BillingIntent {
                customer_name: "Hrishita".to_string(),
                product_names: "Augmentin, Crocin".to_string(),
                quantities: "2, 3".to_string(),
                unit_type: "unit".to_string(),
            })
        );
    }

    #[test]
    fn numeric_quantities_are_stringified() {
        let extraction = parse_extraction(
            r#"{"customer_name": "Aarav", "product_names": "Dolo", "quantities": 4, "unit_type": "strip"}"#,
        )
        .expect("parse");
        match extraction {
            Extraction::Billing(intent) => {
                assert_eq!(intent.quantities, "4");
                assert_eq!(intent.unit_type, "strip");
            }
            other => panic!("expected billing intent, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_falls_back_to_reply_of_raw_text() {
        let extraction =
            parse_extraction("Sorry, I can only help with billing.").expect("parse");
        assert_eq!(
            extraction,
            Extraction::Reply("Sorry, I can only help with billing.".to_string())
        );
    }

    #[test]
    fn non_object_json_falls_back_to_reply() {
        let extraction = parse_extraction(r#"["not", "an", "object"]"#).expect("parse");
        assert_eq!(extraction, Extraction::Reply(r#"["not", "an", "object"]"#.to_string()));
    }

    #[test]
    fn object_with_neither_shape_is_an_error() {
        let error = parse_extraction(r#"{"customer_name": "Hrishita"}"#).expect_err("reject");
        assert!(error.to_string().contains("product_names"));
    }
}
