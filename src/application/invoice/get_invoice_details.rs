use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::line_items::InvoiceLineItemDto;
use crate::domain::identity::Actor;
use crate::domain::invoice::{InvoiceError, LedgerService};

#[derive(Debug)]
pub struct GetInvoiceDetailsCommand {
  pub actor: Actor,
  pub invoice_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PaymentDto {
  pub id: Uuid,
  pub amount: Decimal,
  pub recorded_by: Uuid,
  pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceTotalsDto {
  pub total: Decimal,
  pub paid: Decimal,
  pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct InvoiceDetailsResponse {
  pub id: Uuid,
  pub business_id: Uuid,
  pub customer_id: Uuid,
  pub invoice_number: String,
  pub invoice_date: NaiveDate,
  pub due_date: NaiveDate,
  pub payment_terms_days: i32,
  pub payment_terms: String,
  pub status: String,
  pub revision: i64,
  pub line_items: Vec<InvoiceLineItemDto>,
  pub payments: Vec<PaymentDto>,
  pub totals: InvoiceTotalsDto,
  pub paid_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

pub struct GetInvoiceDetailsUseCase {
  ledger: Arc<LedgerService>,
}

impl GetInvoiceDetailsUseCase {
  pub fn new(ledger: Arc<LedgerService>) -> Self {
    Self { ledger }
  }

  pub async fn execute(
    &self,
    command: GetInvoiceDetailsCommand,
  ) -> Result<InvoiceDetailsResponse, InvoiceError> {
    let details = self
      .ledger
      .get_invoice(&command.actor, command.invoice_id)
      .await?;
    let invoice = details.invoice;

    Ok(InvoiceDetailsResponse {
      id: invoice.id,
      business_id: invoice.business_id,
      customer_id: invoice.customer_id,
      invoice_number: invoice.invoice_number.into_inner(),
      invoice_date: invoice.invoice_date,
      due_date: invoice.due_date,
      payment_terms_days: invoice.payment_terms.days(),
      payment_terms: invoice.payment_terms.to_string(),
      status: invoice.status.as_str().to_string(),
      revision: invoice.revision,
      line_items: details
        .line_items
        .iter()
        .map(InvoiceLineItemDto::try_from)
        .collect::<Result<_, _>>()?,
      payments: details
        .payments
        .into_iter()
        .map(|p| PaymentDto {
          id: p.id,
          amount: p.amount.value(),
          recorded_by: p.recorded_by,
          paid_at: p.paid_at,
        })
        .collect(),
      totals: InvoiceTotalsDto {
        total: details.totals.total.value(),
        paid: details.totals.paid.value(),
        balance: details.totals.balance.value(),
      },
      paid_at: invoice.paid_at,
      created_at: invoice.created_at,
      updated_at: invoice.updated_at,
    })
  }
}
