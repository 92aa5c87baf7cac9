use std::sync::Arc;
use uuid::Uuid;

use super::register_customer::CustomerDto;
use crate::domain::identity::Actor;
use crate::domain::invoice::{InvoiceError, LedgerService, PaymentTerms};

/// Changes the terms used for the customer's future invoices
#[derive(Debug)]
pub struct UpdatePaymentTermsCommand {
  pub actor: Actor,
  pub customer_id: Uuid,
  pub payment_terms_days: i32,
}

pub struct UpdatePaymentTermsUseCase {
  ledger: Arc<LedgerService>,
}

impl UpdatePaymentTermsUseCase {
  pub fn new(ledger: Arc<LedgerService>) -> Self {
    Self { ledger }
  }

  pub async fn execute(
    &self,
    command: UpdatePaymentTermsCommand,
  ) -> Result<CustomerDto, InvoiceError> {
    let payment_terms = PaymentTerms::new(command.payment_terms_days)?;

    let account = self
      .ledger
      .update_payment_terms(&command.actor, command.customer_id, payment_terms)
      .await?;

    Ok(account.into())
  }
}
