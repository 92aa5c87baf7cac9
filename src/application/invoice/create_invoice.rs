use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::line_items::{LineItemInputDto, into_snapshots};
use crate::domain::identity::Actor;
use crate::domain::invoice::{InvoiceData, InvoiceError, LedgerService};

#[derive(Debug)]
pub struct CreateInvoiceCommand {
  pub actor: Actor,
  pub customer_id: Uuid,
  pub invoice_date: NaiveDate,
  pub line_items: Vec<LineItemInputDto>,
}

#[derive(Debug, Serialize)]
pub struct CreateInvoiceResponse {
  pub invoice_id: Uuid,
  pub invoice_number: String,
  pub invoice_date: NaiveDate,
  pub due_date: NaiveDate,
  pub total_amount: Decimal,
  pub status: String,
  pub created_at: DateTime<Utc>,
}

pub struct CreateInvoiceUseCase {
  ledger: Arc<LedgerService>,
}

impl CreateInvoiceUseCase {
  pub fn new(ledger: Arc<LedgerService>) -> Self {
    Self { ledger }
  }

  pub async fn execute(
    &self,
    command: CreateInvoiceCommand,
  ) -> Result<CreateInvoiceResponse, InvoiceError> {
    let items = into_snapshots(command.line_items)?;

    let invoice_data = InvoiceData {
      customer_id: command.customer_id,
      invoice_date: command.invoice_date,
      items,
    };

    let (invoice, _line_items) = self
      .ledger
      .create_invoice(&command.actor, invoice_data)
      .await?;

    Ok(CreateInvoiceResponse {
      invoice_id: invoice.id,
      invoice_number: invoice.invoice_number.into_inner(),
      invoice_date: invoice.invoice_date,
      due_date: invoice.due_date,
      total_amount: invoice.total_amount.value(),
      status: invoice.status.as_str().to_string(),
      created_at: invoice.created_at,
    })
  }
}
