use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::identity::Actor;
use crate::domain::invoice::{
  CustomerAccount, CustomerName, CustomerRegistration, InvoiceError, LedgerService, PaymentTerms,
};

#[derive(Debug)]
pub struct RegisterCustomerCommand {
  pub actor: Actor,
  pub customer_id: Uuid,
  pub display_name: String,
  pub email: Option<String>,
  pub payment_terms_days: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CustomerDto {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub display_name: String,
  pub email: Option<String>,
  pub payment_terms_days: i32,
  pub payment_terms: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<CustomerAccount> for CustomerDto {
  fn from(account: CustomerAccount) -> Self {
    Self {
      id: account.id,
      customer_id: account.customer_id,
      display_name: account.display_name.into_inner(),
      email: account.email,
      payment_terms_days: account.payment_terms.days(),
      payment_terms: account.payment_terms.to_string(),
      created_at: account.created_at,
      updated_at: account.updated_at,
    }
  }
}

pub struct RegisterCustomerUseCase {
  ledger: Arc<LedgerService>,
}

impl RegisterCustomerUseCase {
  pub fn new(ledger: Arc<LedgerService>) -> Self {
    Self { ledger }
  }

  pub async fn execute(&self, command: RegisterCustomerCommand) -> Result<CustomerDto, InvoiceError> {
    let registration = CustomerRegistration {
      customer_id: command.customer_id,
      display_name: CustomerName::new(command.display_name)?,
      email: command.email.filter(|e| !e.trim().is_empty()),
      payment_terms: command.payment_terms_days.map(PaymentTerms::new).transpose()?,
    };

    let account = self
      .ledger
      .register_customer(&command.actor, registration)
      .await?;

    Ok(account.into())
  }
}
