use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::entities::{CustomerAccount, Invoice, ItemReplacement, LineItem, Payment};
use super::value_objects::InvoiceStatus;
use crate::domain::errors::RepositoryError;

#[async_trait]
pub trait CustomerAccountRepository: Send + Sync {
  /// Fails with [`RepositoryError::Duplicate`] if the business already registered the customer
  async fn create(&self, account: CustomerAccount) -> Result<CustomerAccount, RepositoryError>;
  async fn update(&self, account: CustomerAccount) -> Result<CustomerAccount, RepositoryError>;
  async fn find(
    &self,
    business_id: Uuid,
    customer_id: Uuid,
  ) -> Result<Option<CustomerAccount>, RepositoryError>;
  async fn find_by_business(
    &self,
    business_id: Uuid,
  ) -> Result<Vec<CustomerAccount>, RepositoryError>;
}

/// Storage for invoices, their line items and payments.
///
/// Every mutating method is all-or-nothing. Guarded writes return
/// [`RepositoryError::Conflict`] without touching anything when the stored
/// invoice no longer matches what the caller read.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  /// Next value of the business's invoice number sequence (starts at 1)
  async fn next_sequence(&self, business_id: Uuid) -> Result<i64, RepositoryError>;

  /// Inserts the invoice and all its items in one unit
  async fn create(&self, invoice: &Invoice, items: &[LineItem]) -> Result<(), RepositoryError>;

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, RepositoryError>;

  /// Items ordered by `line_order`
  async fn find_items(&self, invoice_id: Uuid) -> Result<Vec<LineItem>, RepositoryError>;

  async fn find_payments(&self, invoice_id: Uuid) -> Result<Vec<Payment>, RepositoryError>;

  /// Newest first
  async fn find_by_business(
    &self,
    business_id: Uuid,
    status: Option<InvoiceStatus>,
  ) -> Result<Vec<Invoice>, RepositoryError>;

  /// Newest first
  async fn find_by_customer(
    &self,
    customer_id: Uuid,
    status: Option<InvoiceStatus>,
  ) -> Result<Vec<Invoice>, RepositoryError>;

  /// `sent` invoices of the business whose due date is before `current_date`
  async fn find_overdue(
    &self,
    business_id: Uuid,
    current_date: NaiveDate,
  ) -> Result<Vec<Invoice>, RepositoryError>;

  /// Stores the paid invoice and its payment; conflicts if already paid
  async fn record_payment(&self, invoice: &Invoice, payment: &Payment)
  -> Result<(), RepositoryError>;

  /// Stores `invoice.status`; conflicts unless the stored status is `expected`
  async fn update_status(
    &self,
    invoice: &Invoice,
    expected: InvoiceStatus,
  ) -> Result<(), RepositoryError>;

  /// Deletes the current items, inserts the new ones and stores the new total
  /// and revision; conflicts if the invoice is paid or its revision moved on
  async fn replace_items(&self, replacement: &ItemReplacement) -> Result<(), RepositoryError>;
}
