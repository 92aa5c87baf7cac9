use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::identity::Actor;
use crate::domain::invoice::{Invoice, InvoiceError, InvoiceStatus, LedgerService};

#[derive(Debug)]
pub struct ListInvoicesCommand {
  pub actor: Actor,
  pub status_filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceListItemDto {
  pub id: Uuid,
  pub invoice_number: String,
  pub business_id: Uuid,
  pub customer_id: Uuid,
  pub invoice_date: NaiveDate,
  pub due_date: NaiveDate,
  pub total_amount: Decimal,
  pub paid_amount: Decimal,
  pub status: String,
  pub created_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceListItemDto {
  fn from(i: Invoice) -> Self {
    Self {
      id: i.id,
      invoice_number: i.invoice_number.into_inner(),
      business_id: i.business_id,
      customer_id: i.customer_id,
      invoice_date: i.invoice_date,
      due_date: i.due_date,
      total_amount: i.total_amount.value(),
      paid_amount: i.paid_amount.value(),
      status: i.status.as_str().to_string(),
      created_at: i.created_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
  pub invoices: Vec<InvoiceListItemDto>,
}

pub struct ListInvoicesUseCase {
  ledger: Arc<LedgerService>,
}

impl ListInvoicesUseCase {
  pub fn new(ledger: Arc<LedgerService>) -> Self {
    Self { ledger }
  }

  pub async fn execute(
    &self,
    command: ListInvoicesCommand,
  ) -> Result<ListInvoicesResponse, InvoiceError> {
    let status_filter = command
      .status_filter
      .as_deref()
      .map(InvoiceStatus::from_str)
      .transpose()?;

    let invoices = self
      .ledger
      .list_invoices(&command.actor, status_filter)
      .await?;

    Ok(ListInvoicesResponse {
      invoices: invoices.into_iter().map(InvoiceListItemDto::from).collect(),
    })
  }
}
