//! In-memory storage implementing every port.
//!
//! All state sits behind one async mutex, so each port call observes and
//! mutates a consistent snapshot. Guarded writes follow the same rules as the
//! postgres repositories.

mod customer_account_repository;
mod edit_request_repository;
mod identity_provider;
mod invoice_repository;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::edit_request::EditRequest;
use crate::domain::errors::RepositoryError;
use crate::domain::identity::Role;
use crate::domain::invoice::{
  CustomerAccount, Invoice, InvoiceStatus, ItemReplacement, LineItem, Payment,
};

#[derive(Debug, Default)]
struct State {
  profiles: HashMap<Uuid, Role>,
  customer_accounts: HashMap<Uuid, CustomerAccount>,
  sequences: HashMap<Uuid, i64>,
  invoices: HashMap<Uuid, Invoice>,
  line_items: HashMap<Uuid, Vec<LineItem>>,
  payments: HashMap<Uuid, Vec<Payment>>,
  edit_requests: HashMap<Uuid, EditRequest>,
}

impl State {
  fn invoice(&self, id: Uuid) -> Result<&Invoice, RepositoryError> {
    self.invoices.get(&id).ok_or(RepositoryError::NotFound)
  }

  fn check_replacement(&self, replacement: &ItemReplacement) -> Result<(), RepositoryError> {
    let stored = self.invoice(replacement.invoice.id)?;
    if stored.status == InvoiceStatus::Paid {
      return Err(RepositoryError::Conflict(format!(
        "Invoice {} is already paid",
        stored.id
      )));
    }
    if stored.revision != replacement.expected_revision {
      return Err(RepositoryError::Conflict(format!(
        "Invoice {} is at revision {}, expected {}",
        stored.id, stored.revision, replacement.expected_revision
      )));
    }
    Ok(())
  }

  fn apply_replacement(&mut self, replacement: &ItemReplacement) {
    let invoice = &replacement.invoice;
    self
      .line_items
      .insert(invoice.id, replacement.items.clone());
    self.invoices.insert(invoice.id, invoice.clone());
  }

  fn check_pending(&self, request: &EditRequest) -> Result<(), RepositoryError> {
    let stored = self
      .edit_requests
      .get(&request.id)
      .ok_or(RepositoryError::NotFound)?;
    if !stored.is_pending() {
      return Err(RepositoryError::Conflict(format!(
        "Edit request {} was already {}",
        stored.id, stored.status
      )));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  state: Arc<Mutex<State>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes `user_id` known to the identity provider with `role`
  pub async fn register_profile(&self, user_id: Uuid, role: Role) {
    let mut state = self.state.lock().await;
    state.profiles.insert(user_id, role);
  }
}

/// Newest first, by creation time
fn newest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
  rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
  rows
}
