//! The turn controller.
//!
//! Two states only: idle, and awaiting a customer selection. Every failure
//! inside a turn is converted to a bot-visible error message at the turn
//! boundary; the session itself never dies, and a pending selection (with
//! its retained input) survives errors so the user can retry.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use tracing::{info, warn};

use tally_core::domain::customer::Customer;
use tally_core::domain::invoice::Invoice;
use tally_core::pricing::{build_line_items, parse_quantities};
use tally_core::resolution::{resolve_customer, split_product_names, CustomerResolution};
use tally_db::repositories::{CustomerRepository, ProductRepository};
use tally_render::InvoiceRenderer;

use crate::conversation::{Conversation, PendingSelection};
use crate::extractor::{BillingIntent, Extraction, IntentExtractor};
use crate::llm::LlmClient;

pub struct AgentRuntime {
    extractor: IntentExtractor,
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    renderer: Arc<dyn InvoiceRenderer>,
    currency_symbol: String,
}

enum TurnOutcome {
    Reply(String),
    AwaitSelection { candidates: Vec<String> },
    NotFound,
    Invoiced { invoice: Invoice, artifact: PathBuf },
}

impl AgentRuntime {
    pub fn new(
        client: Arc<dyn LlmClient>,
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
        renderer: Arc<dyn InvoiceRenderer>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            extractor: IntentExtractor::new(client),
            customers,
            products,
            renderer,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Process one user turn, appending the user's input and every response
    /// turn to the conversation.
    pub async fn handle_turn(&self, conversation: &mut Conversation, input: &str) {
        conversation.push_user(input);

        if conversation.is_awaiting_selection() {
            self.handle_selection_turn(conversation, input).await;
        } else {
            self.handle_message_turn(conversation, input).await;
        }
    }

    async fn handle_message_turn(&self, conversation: &mut Conversation, input: &str) {
        match self.process_message(input).await {
            Ok(TurnOutcome::Reply(text)) => {
                info!(event_name = "agent.turn.reply", "conversational turn");
                conversation.push_bot(text);
            }
            Ok(TurnOutcome::AwaitSelection { candidates }) => {
                info!(
                    event_name = "agent.turn.ambiguous",
                    candidate_count = candidates.len(),
                    "customer ambiguity, awaiting selection"
                );
                conversation.push_bot(selection_prompt(&candidates));
                conversation.pending = Some(PendingSelection {
                    candidates,
                    retained_input: input.to_string(),
                });
            }
            Ok(TurnOutcome::NotFound) => {
                info!(event_name = "agent.turn.customer_not_found", "customer not found");
                conversation.push_bot(
                    "Customer not found in the database. Please check the name or add the \
                     customer first.",
                );
            }
            Ok(TurnOutcome::Invoiced { invoice, artifact }) => {
                info!(
                    event_name = "agent.turn.invoiced",
                    invoice_id = %invoice.id,
                    line_count = invoice.lines.len(),
                    "invoice rendered"
                );
                conversation.push_bot(self.invoice_summary(&invoice));
                conversation.push_artifact(artifact);
            }
            Err(error) => {
                warn!(event_name = "agent.turn.failed", error = %error, "turn failed");
                conversation.push_bot(format!("Error: {error}"));
            }
        }
    }

    async fn handle_selection_turn(&self, conversation: &mut Conversation, input: &str) {
        let pending = conversation.pending.clone().expect("selection turn requires pending");

        let Some(chosen) = pending.match_selection(input) else {
            conversation.push_bot(selection_prompt(&pending.candidates));
            return;
        };
        let chosen = chosen.to_string();

        match self.process_selection(&chosen, &pending.retained_input).await {
            Ok((invoice, artifact)) => {
                info!(
                    event_name = "agent.turn.disambiguated",
                    invoice_id = %invoice.id,
                    "selection resolved and invoice rendered"
                );
                conversation.push_bot(self.invoice_summary(&invoice));
                conversation.push_artifact(artifact);
                conversation.pending = None;
            }
            // Keep the pending selection so the user can retry.
            Err(error) => {
                warn!(event_name = "agent.turn.failed", error = %error, "selection turn failed");
                conversation.push_bot(format!("Error: {error}"));
            }
        }
    }

    async fn process_message(&self, input: &str) -> Result<TurnOutcome> {
        let intent = match self.extractor.extract(input).await? {
            Extraction::Reply(text) => return Ok(TurnOutcome::Reply(text)),
            Extraction::Billing(intent) => intent,
        };

        let matches = self.customers.search_by_name(&intent.customer_name).await?;
        match resolve_customer(matches) {
            CustomerResolution::NotFound => Ok(TurnOutcome::NotFound),
            CustomerResolution::Ambiguous(candidates) => {
                Ok(TurnOutcome::AwaitSelection { candidates })
            }
            CustomerResolution::Resolved(customer) => {
                let (invoice, artifact) = self.build_invoice(&customer, &intent).await?;
                Ok(TurnOutcome::Invoiced { invoice, artifact })
            }
        }
    }

    /// Re-extract the retained input (only the customer was ambiguous) and
    /// bill the explicitly chosen customer.
    async fn process_selection(
        &self,
        chosen: &str,
        retained_input: &str,
    ) -> Result<(Invoice, PathBuf)> {
        let intent = match self.extractor.extract(retained_input).await? {
            Extraction::Billing(intent) => intent,
            Extraction::Reply(_) => {
                bail!("could not recover billing details from the original request")
            }
        };

        let customer = self
            .customers
            .find_by_exact_name(chosen)
            .await?
            .ok_or_else(|| anyhow!("selected customer `{chosen}` no longer resolves"))?;

        self.build_invoice(&customer, &intent).await
    }

    async fn build_invoice(
        &self,
        customer: &Customer,
        intent: &BillingIntent,
    ) -> Result<(Invoice, PathBuf)> {
        let names = split_product_names(&intent.product_names);
        let mut products = Vec::with_capacity(names.len());
        for name in &names {
            products.push(self.products.search_first_by_name(name).await?);
        }

        let quantities = parse_quantities(&intent.quantities)?;
        let lines = build_line_items(&products, &quantities, &intent.unit_type);

        let invoice = Invoice::issue(customer, lines, Utc::now());
        let artifact = self.renderer.render(&invoice).await?;
        Ok((invoice, artifact))
    }

    fn invoice_summary(&self, invoice: &Invoice) -> String {
        let sym = &self.currency_symbol;
        let mut summary = format!("Invoice for {}:\n", invoice.customer.name);
        for line in &invoice.lines {
            summary.push_str(&format!(
                "{} x{} @ {sym}{:.2} = {sym}{:.2}\n",
                line.product_name, line.quantity, line.rate, line.total
            ));
        }
        summary.push_str(&format!(
            "Grand total: {sym}{:.2}\nYour invoice is ready to download.",
            invoice.grand_total
        ));
        summary
    }
}

fn selection_prompt(candidates: &[String]) -> String {
    let mut prompt = "I found multiple matching customers. Please pick one:\n".to_string();
    for (index, name) in candidates.iter().enumerate() {
        prompt.push_str(&format!("  {}. {}\n", index + 1, name));
    }
    prompt.push_str("Reply with the number or the full name.");
    prompt
}
