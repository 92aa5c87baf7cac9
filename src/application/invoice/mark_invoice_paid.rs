use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::identity::Actor;
use crate::domain::invoice::{Amount, InvoiceError, LedgerService};

#[derive(Debug)]
pub struct MarkInvoicePaidCommand {
  pub actor: Actor,
  pub invoice_id: Uuid,
  pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct MarkInvoicePaidResponse {
  pub invoice_id: Uuid,
  pub payment_id: Uuid,
  pub status: String,
  pub paid_amount: Decimal,
  pub paid_at: DateTime<Utc>,
}

pub struct MarkInvoicePaidUseCase {
  ledger: Arc<LedgerService>,
}

impl MarkInvoicePaidUseCase {
  pub fn new(ledger: Arc<LedgerService>) -> Self {
    Self { ledger }
  }

  pub async fn execute(
    &self,
    command: MarkInvoicePaidCommand,
  ) -> Result<MarkInvoicePaidResponse, InvoiceError> {
    let amount = Amount::new(command.amount)?;

    let (invoice, payment) = self
      .ledger
      .mark_paid(&command.actor, command.invoice_id, amount)
      .await?;

    Ok(MarkInvoicePaidResponse {
      invoice_id: invoice.id,
      payment_id: payment.id,
      status: invoice.status.as_str().to_string(),
      paid_amount: payment.amount.value(),
      paid_at: payment.paid_at,
    })
  }
}
