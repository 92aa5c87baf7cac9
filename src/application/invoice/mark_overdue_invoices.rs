use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::list_invoices::InvoiceListItemDto;
use crate::domain::identity::Actor;
use crate::domain::invoice::{InvoiceError, LedgerService};

#[derive(Debug)]
pub struct MarkOverdueInvoicesCommand {
  pub actor: Actor,
  /// Defaults to today (UTC)
  pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct MarkOverdueInvoicesResponse {
  pub as_of: NaiveDate,
  pub invoices: Vec<InvoiceListItemDto>,
}

pub struct MarkOverdueInvoicesUseCase {
  ledger: Arc<LedgerService>,
}

impl MarkOverdueInvoicesUseCase {
  pub fn new(ledger: Arc<LedgerService>) -> Self {
    Self { ledger }
  }

  pub async fn execute(
    &self,
    command: MarkOverdueInvoicesCommand,
  ) -> Result<MarkOverdueInvoicesResponse, InvoiceError> {
    let as_of = command.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let invoices = self.ledger.mark_overdue(&command.actor, as_of).await?;

    Ok(MarkOverdueInvoicesResponse {
      as_of,
      invoices: invoices.into_iter().map(InvoiceListItemDto::from).collect(),
    })
  }
}
