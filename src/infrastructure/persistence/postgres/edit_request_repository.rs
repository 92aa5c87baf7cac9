use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use super::corrupt;
use super::invoice_repository::{apply_replacement, lock_invoice};
use crate::domain::edit_request::{
  EditRequest, EditRequestRepository, EditRequestStatus, RequestMessage,
};
use crate::domain::errors::RepositoryError;
use crate::domain::invoice::{InvoiceStatus, ItemReplacement, ItemSnapshot};

#[derive(Debug, FromRow)]
struct EditRequestRow {
  id: Uuid,
  invoice_id: Uuid,
  business_id: Uuid,
  requester_id: Uuid,
  original_items: Json<Vec<ItemSnapshot>>,
  requested_items: Json<Vec<ItemSnapshot>>,
  message: Option<String>,
  status: String,
  base_revision: i64,
  created_at: DateTime<Utc>,
  reviewed_at: Option<DateTime<Utc>>,
  reviewed_by: Option<Uuid>,
}

impl TryFrom<EditRequestRow> for EditRequest {
  type Error = RepositoryError;

  fn try_from(row: EditRequestRow) -> Result<Self, Self::Error> {
    Ok(EditRequest {
      id: row.id,
      invoice_id: row.invoice_id,
      business_id: row.business_id,
      requester_id: row.requester_id,
      original_items: row.original_items.0,
      requested_items: row.requested_items.0,
      message: row
        .message
        .map(RequestMessage::new)
        .transpose()
        .map_err(corrupt)?,
      status: EditRequestStatus::from_str(&row.status).map_err(corrupt)?,
      base_revision: row.base_revision,
      created_at: row.created_at,
      reviewed_at: row.reviewed_at,
      reviewed_by: row.reviewed_by,
    })
  }
}

pub struct PostgresEditRequestRepository {
  pool: PgPool,
}

impl PostgresEditRequestRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl EditRequestRepository for PostgresEditRequestRepository {
  async fn create(&self, request: &EditRequest) -> Result<(), RepositoryError> {
    let mut tx = self.pool.begin().await?;

    // Holding the invoice row keeps payments and corrections out until commit
    let (revision, status) = lock_invoice(&mut tx, request.invoice_id).await?;
    if status == InvoiceStatus::Paid {
      return Err(RepositoryError::Conflict(format!(
        "Invoice {} is already paid",
        request.invoice_id
      )));
    }
    if revision != request.base_revision {
      return Err(RepositoryError::Conflict(format!(
        "Invoice {} is at revision {}, the request was drafted against {}",
        request.invoice_id, revision, request.base_revision
      )));
    }

    sqlx::query(
      r#"
            INSERT INTO edit_requests (
                id, invoice_id, business_id, requester_id, original_items,
                requested_items, message, status, base_revision, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
    )
    .bind(request.id)
    .bind(request.invoice_id)
    .bind(request.business_id)
    .bind(request.requester_id)
    .bind(Json(&request.original_items))
    .bind(Json(&request.requested_items))
    .bind(request.message.as_ref().map(|m| m.value()))
    .bind(request.status.as_str())
    .bind(request.base_revision)
    .bind(request.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<EditRequest>, RepositoryError> {
    let row = sqlx::query_as::<_, EditRequestRow>(
      r#"
            SELECT id, invoice_id, business_id, requester_id, original_items, requested_items,
                   message, status, base_revision, created_at, reviewed_at, reviewed_by
            FROM edit_requests
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(EditRequest::try_from).transpose()
  }

  async fn find_by_invoice(&self, invoice_id: Uuid) -> Result<Vec<EditRequest>, RepositoryError> {
    let rows = sqlx::query_as::<_, EditRequestRow>(
      r#"
            SELECT id, invoice_id, business_id, requester_id, original_items, requested_items,
                   message, status, base_revision, created_at, reviewed_at, reviewed_by
            FROM edit_requests
            WHERE invoice_id = $1
            ORDER BY created_at DESC
            "#,
    )
    .bind(invoice_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(EditRequest::try_from).collect()
  }

  async fn find_by_requester(
    &self,
    requester_id: Uuid,
  ) -> Result<Vec<EditRequest>, RepositoryError> {
    let rows = sqlx::query_as::<_, EditRequestRow>(
      r#"
            SELECT id, invoice_id, business_id, requester_id, original_items, requested_items,
                   message, status, base_revision, created_at, reviewed_at, reviewed_by
            FROM edit_requests
            WHERE requester_id = $1
            ORDER BY created_at DESC
            "#,
    )
    .bind(requester_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(EditRequest::try_from).collect()
  }

  async fn find_pending_by_business(
    &self,
    business_id: Uuid,
  ) -> Result<Vec<EditRequest>, RepositoryError> {
    let rows = sqlx::query_as::<_, EditRequestRow>(
      r#"
            SELECT id, invoice_id, business_id, requester_id, original_items, requested_items,
                   message, status, base_revision, created_at, reviewed_at, reviewed_by
            FROM edit_requests
            WHERE business_id = $1 AND status = 'pending'
            ORDER BY created_at ASC
            "#,
    )
    .bind(business_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(EditRequest::try_from).collect()
  }

  async fn approve(
    &self,
    request: &EditRequest,
    replacement: &ItemReplacement,
  ) -> Result<(), RepositoryError> {
    let mut tx = self.pool.begin().await?;

    // Request row first, then the invoice row inside apply_replacement
    let result = sqlx::query(
      r#"
            UPDATE edit_requests
            SET status = $2, reviewed_at = $3, reviewed_by = $4
            WHERE id = $1 AND status = 'pending'
            "#,
    )
    .bind(request.id)
    .bind(request.status.as_str())
    .bind(request.reviewed_at)
    .bind(request.reviewed_by)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
      return Err(RepositoryError::Conflict(format!(
        "Edit request {} is no longer pending",
        request.id
      )));
    }

    apply_replacement(&mut tx, replacement).await?;

    tx.commit().await?;
    Ok(())
  }

  async fn reject(&self, request: &EditRequest) -> Result<(), RepositoryError> {
    let result = sqlx::query(
      r#"
            UPDATE edit_requests
            SET status = $2, reviewed_at = $3, reviewed_by = $4
            WHERE id = $1 AND status = 'pending'
            "#,
    )
    .bind(request.id)
    .bind(request.status.as_str())
    .bind(request.reviewed_at)
    .bind(request.reviewed_by)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(RepositoryError::Conflict(format!(
        "Edit request {} is no longer pending",
        request.id
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use super::super::PostgresInvoiceRepository;
  use super::super::test_support::setup_test_db;
  use crate::domain::invoice::{
    Amount, Invoice, InvoiceNumber, InvoiceRepository, InvoiceStatus, ItemName, PaymentTerms,
    Quantity,
  };
  use chrono::NaiveDate;
  use rust_decimal::Decimal;
  use rust_decimal_macros::dec;

  fn widget(quantity: Decimal) -> ItemSnapshot {
    ItemSnapshot::new(
      ItemName::new("Widget".to_string()).unwrap(),
      Quantity::new(quantity).unwrap(),
      Amount::new(dec!(10)).unwrap(),
    )
  }

  async fn seed(pool: &PgPool) -> (Invoice, EditRequest) {
    let invoices = PostgresInvoiceRepository::new(pool.clone());
    let (invoice, items) = Invoice::issue(
      Uuid::new_v4(),
      Uuid::new_v4(),
      InvoiceNumber::from_sequence("INV", 1).unwrap(),
      NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
      PaymentTerms::default(),
      &[widget(dec!(2))],
    )
    .unwrap();
    invoices.create(&invoice, &items).await.unwrap();

    let request = EditRequest::new(
      &invoice,
      invoice.customer_id,
      vec![widget(dec!(2))],
      vec![widget(dec!(3))],
      Some(RequestMessage::new("We received three".to_string()).unwrap()),
    );
    (invoice, request)
  }

  fn replacement_for(invoice: &Invoice, items: &[ItemSnapshot]) -> ItemReplacement {
    let mut updated = invoice.clone();
    let line_items = updated.replace_items(items).unwrap();
    ItemReplacement {
      invoice: updated,
      items: line_items,
      expected_revision: invoice.revision,
    }
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_snapshots_round_trip() {
    let (pool, _container) = setup_test_db().await;
    let (_, request) = seed(&pool).await;
    let repo = PostgresEditRequestRepository::new(pool);

    repo.create(&request).await.unwrap();
    let found = repo.find_by_id(request.id).await.unwrap().unwrap();
    assert_eq!(found.original_items, request.original_items);
    assert_eq!(found.requested_items, request.requested_items);
    assert_eq!(found.message, request.message);
    assert!(found.is_pending());
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_approve_commits_request_and_items_together() {
    let (pool, _container) = setup_test_db().await;
    let (invoice, mut request) = seed(&pool).await;
    let repo = PostgresEditRequestRepository::new(pool.clone());
    let invoices = PostgresInvoiceRepository::new(pool);
    repo.create(&request).await.unwrap();

    request.approve(invoice.business_id).unwrap();
    let replacement = replacement_for(&invoice, &request.requested_items);
    repo.approve(&request, &replacement).await.unwrap();

    let stored = repo.find_by_id(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EditRequestStatus::Approved);
    let stored_invoice = invoices.find_by_id(invoice.id).await.unwrap().unwrap();
    assert_eq!(stored_invoice.total_amount.value(), dec!(30));

    // Second approval of the same request changes nothing
    let err = repo.approve(&request, &replacement).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    let err = repo.reject(&request).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_failed_ledger_write_keeps_request_pending() {
    let (pool, _container) = setup_test_db().await;
    let (mut invoice, mut request) = seed(&pool).await;
    let repo = PostgresEditRequestRepository::new(pool.clone());
    let invoices = PostgresInvoiceRepository::new(pool);
    repo.create(&request).await.unwrap();

    let replacement = replacement_for(&invoice, &request.requested_items);
    let payment = invoice
      .mark_paid(Amount::new(dec!(20)).unwrap(), invoice.business_id)
      .unwrap();
    invoices.record_payment(&invoice, &payment).await.unwrap();

    request.approve(invoice.business_id).unwrap();
    let err = repo.approve(&request, &replacement).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let stored = repo.find_by_id(request.id).await.unwrap().unwrap();
    assert!(stored.is_pending());
    let stored_invoice = invoices.find_by_id(invoice.id).await.unwrap().unwrap();
    assert_eq!(stored_invoice.status, InvoiceStatus::Paid);
    assert_eq!(stored_invoice.total_amount.value(), dec!(20));
    assert_eq!(invoices.find_items(invoice.id).await.unwrap().len(), 1);
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_create_refuses_paid_or_changed_invoice() {
    let (pool, _container) = setup_test_db().await;
    let (mut invoice, request) = seed(&pool).await;
    let repo = PostgresEditRequestRepository::new(pool.clone());
    let invoices = PostgresInvoiceRepository::new(pool);

    let replacement = replacement_for(&invoice, &[widget(dec!(5))]);
    invoices.replace_items(&replacement).await.unwrap();

    let err = repo.create(&request).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    invoice = replacement.invoice;
    let payment = invoice
      .mark_paid(Amount::new(dec!(50)).unwrap(), invoice.business_id)
      .unwrap();
    invoices.record_payment(&invoice, &payment).await.unwrap();

    let fresh = EditRequest::new(
      &invoice,
      invoice.customer_id,
      vec![widget(dec!(5))],
      vec![widget(dec!(3))],
      None,
    );
    let err = repo.create(&fresh).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert!(repo.find_by_invoice(invoice.id).await.unwrap().is_empty());
  }
}
