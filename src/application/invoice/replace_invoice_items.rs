use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::line_items::{InvoiceLineItemDto, LineItemInputDto, into_snapshots};
use crate::domain::identity::Actor;
use crate::domain::invoice::{InvoiceError, LedgerService};

#[derive(Debug)]
pub struct ReplaceInvoiceItemsCommand {
  pub actor: Actor,
  pub invoice_id: Uuid,
  pub line_items: Vec<LineItemInputDto>,
}

#[derive(Debug, Serialize)]
pub struct ReplaceInvoiceItemsResponse {
  pub invoice_id: Uuid,
  pub revision: i64,
  pub total_amount: Decimal,
  pub line_items: Vec<InvoiceLineItemDto>,
  pub updated_at: DateTime<Utc>,
}

pub struct ReplaceInvoiceItemsUseCase {
  ledger: Arc<LedgerService>,
}

impl ReplaceInvoiceItemsUseCase {
  pub fn new(ledger: Arc<LedgerService>) -> Self {
    Self { ledger }
  }

  pub async fn execute(
    &self,
    command: ReplaceInvoiceItemsCommand,
  ) -> Result<ReplaceInvoiceItemsResponse, InvoiceError> {
    let items = into_snapshots(command.line_items)?;

    let (invoice, line_items) = self
      .ledger
      .replace_items(&command.actor, command.invoice_id, items)
      .await?;

    Ok(ReplaceInvoiceItemsResponse {
      invoice_id: invoice.id,
      revision: invoice.revision,
      total_amount: invoice.total_amount.value(),
      line_items: line_items
        .iter()
        .map(InvoiceLineItemDto::try_from)
        .collect::<Result<_, _>>()?,
      updated_at: invoice.updated_at,
    })
  }
}
