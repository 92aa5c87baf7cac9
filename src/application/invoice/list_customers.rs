use serde::Serialize;
use std::sync::Arc;

use super::register_customer::CustomerDto;
use crate::domain::identity::Actor;
use crate::domain::invoice::{InvoiceError, LedgerService};

#[derive(Debug)]
pub struct ListCustomersCommand {
  pub actor: Actor,
}

#[derive(Debug, Serialize)]
pub struct ListCustomersResponse {
  pub customers: Vec<CustomerDto>,
}

pub struct ListCustomersUseCase {
  ledger: Arc<LedgerService>,
}

impl ListCustomersUseCase {
  pub fn new(ledger: Arc<LedgerService>) -> Self {
    Self { ledger }
  }

  pub async fn execute(
    &self,
    command: ListCustomersCommand,
  ) -> Result<ListCustomersResponse, InvoiceError> {
    let customers = self.ledger.list_customers(&command.actor).await?;

    Ok(ListCustomersResponse {
      customers: customers.into_iter().map(CustomerDto::from).collect(),
    })
  }
}
