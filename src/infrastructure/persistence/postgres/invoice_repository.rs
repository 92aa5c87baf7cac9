use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use super::corrupt;
use crate::domain::errors::RepositoryError;
use crate::domain::invoice::{
  Amount, Invoice, InvoiceNumber, InvoiceRepository, InvoiceStatus, ItemName, ItemReplacement,
  LineItem, Payment, PaymentTerms, Quantity,
};

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: Uuid,
  business_id: Uuid,
  customer_id: Uuid,
  invoice_number: String,
  invoice_date: NaiveDate,
  due_date: NaiveDate,
  payment_terms_days: i32,
  total_amount: Decimal,
  paid_amount: Decimal,
  status: String,
  revision: i64,
  paid_at: Option<DateTime<Utc>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
  type Error = RepositoryError;

  fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
    Ok(Invoice {
      id: row.id,
      business_id: row.business_id,
      customer_id: row.customer_id,
      invoice_number: InvoiceNumber::new(row.invoice_number).map_err(corrupt)?,
      invoice_date: row.invoice_date,
      due_date: row.due_date,
      payment_terms: PaymentTerms::new(row.payment_terms_days).map_err(corrupt)?,
      total_amount: Amount::new(row.total_amount).map_err(corrupt)?,
      paid_amount: Amount::new(row.paid_amount).map_err(corrupt)?,
      status: InvoiceStatus::from_str(&row.status).map_err(corrupt)?,
      revision: row.revision,
      paid_at: row.paid_at,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct LineItemRow {
  id: Uuid,
  invoice_id: Uuid,
  name: String,
  quantity: Decimal,
  unit_price: Decimal,
  line_order: i32,
}

impl TryFrom<LineItemRow> for LineItem {
  type Error = RepositoryError;

  fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
    Ok(LineItem {
      id: row.id,
      invoice_id: row.invoice_id,
      name: ItemName::new(row.name).map_err(corrupt)?,
      quantity: Quantity::new(row.quantity).map_err(corrupt)?,
      unit_price: Amount::new(row.unit_price).map_err(corrupt)?,
      line_order: row.line_order,
    })
  }
}

#[derive(Debug, FromRow)]
struct PaymentRow {
  id: Uuid,
  invoice_id: Uuid,
  amount: Decimal,
  recorded_by: Uuid,
  paid_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
  type Error = RepositoryError;

  fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
    Ok(Payment {
      id: row.id,
      invoice_id: row.invoice_id,
      amount: Amount::new(row.amount).map_err(corrupt)?,
      recorded_by: row.recorded_by,
      paid_at: row.paid_at,
    })
  }
}

pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

async fn insert_items(conn: &mut PgConnection, items: &[LineItem]) -> Result<(), RepositoryError> {
  for item in items {
    sqlx::query(
      r#"
            INSERT INTO invoice_line_items (id, invoice_id, name, quantity, unit_price, line_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
    )
    .bind(item.id)
    .bind(item.invoice_id)
    .bind(item.name.value())
    .bind(item.quantity.value())
    .bind(item.unit_price.value())
    .bind(item.line_order)
    .execute(&mut *conn)
    .await?;
  }
  Ok(())
}

/// Locks the invoice row until the transaction ends, returning its revision and status
pub(super) async fn lock_invoice(
  conn: &mut PgConnection,
  invoice_id: Uuid,
) -> Result<(i64, InvoiceStatus), RepositoryError> {
  let current: Option<(i64, String)> =
    sqlx::query_as("SELECT revision, status FROM invoices WHERE id = $1 FOR UPDATE")
      .bind(invoice_id)
      .fetch_optional(&mut *conn)
      .await?;

  let (revision, status) = current.ok_or(RepositoryError::NotFound)?;
  Ok((revision, InvoiceStatus::from_str(&status).map_err(corrupt)?))
}

/// Applies an item replacement on an open transaction.
///
/// Locks the invoice row, checks it is unpaid and still at
/// `expected_revision`, then swaps the items and stores the new total and
/// revision. Shared with the edit-request repository so an approval commits
/// together with its ledger write.
pub(super) async fn apply_replacement(
  conn: &mut PgConnection,
  replacement: &ItemReplacement,
) -> Result<(), RepositoryError> {
  let invoice = &replacement.invoice;

  let (revision, status) = lock_invoice(conn, invoice.id).await?;
  if status == InvoiceStatus::Paid {
    return Err(RepositoryError::Conflict(format!(
      "Invoice {} is already paid",
      invoice.id
    )));
  }
  if revision != replacement.expected_revision {
    return Err(RepositoryError::Conflict(format!(
      "Invoice {} is at revision {}, expected {}",
      invoice.id, revision, replacement.expected_revision
    )));
  }

  sqlx::query("DELETE FROM invoice_line_items WHERE invoice_id = $1")
    .bind(invoice.id)
    .execute(&mut *conn)
    .await?;

  insert_items(conn, &replacement.items).await?;

  sqlx::query(
    r#"
        UPDATE invoices
        SET total_amount = $2, revision = $3, updated_at = $4
        WHERE id = $1
        "#,
  )
  .bind(invoice.id)
  .bind(invoice.total_amount.value())
  .bind(invoice.revision)
  .bind(invoice.updated_at)
  .execute(&mut *conn)
  .await?;

  Ok(())
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn next_sequence(&self, business_id: Uuid) -> Result<i64, RepositoryError> {
    let sequence: i64 = sqlx::query_scalar(
      r#"
            INSERT INTO invoice_sequences (business_id, last_value)
            VALUES ($1, 1)
            ON CONFLICT (business_id)
            DO UPDATE SET last_value = invoice_sequences.last_value + 1
            RETURNING last_value
            "#,
    )
    .bind(business_id)
    .fetch_one(&self.pool)
    .await?;

    Ok(sequence)
  }

  async fn create(&self, invoice: &Invoice, items: &[LineItem]) -> Result<(), RepositoryError> {
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      r#"
            INSERT INTO invoices (
                id, business_id, customer_id, invoice_number, invoice_date, due_date,
                payment_terms_days, total_amount, paid_amount, status, revision,
                paid_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
    )
    .bind(invoice.id)
    .bind(invoice.business_id)
    .bind(invoice.customer_id)
    .bind(invoice.invoice_number.value())
    .bind(invoice.invoice_date)
    .bind(invoice.due_date)
    .bind(invoice.payment_terms.days())
    .bind(invoice.total_amount.value())
    .bind(invoice.paid_amount.value())
    .bind(invoice.status.as_str())
    .bind(invoice.revision)
    .bind(invoice.paid_at)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .execute(&mut *tx)
    .await?;

    insert_items(&mut tx, items).await?;

    tx.commit().await?;
    Ok(())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, RepositoryError> {
    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, business_id, customer_id, invoice_number, invoice_date, due_date,
                   payment_terms_days, total_amount, paid_amount, status, revision,
                   paid_at, created_at, updated_at
            FROM invoices
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(Invoice::try_from).transpose()
  }

  async fn find_items(&self, invoice_id: Uuid) -> Result<Vec<LineItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, LineItemRow>(
      r#"
            SELECT id, invoice_id, name, quantity, unit_price, line_order
            FROM invoice_line_items
            WHERE invoice_id = $1
            ORDER BY line_order ASC
            "#,
    )
    .bind(invoice_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(LineItem::try_from).collect()
  }

  async fn find_payments(&self, invoice_id: Uuid) -> Result<Vec<Payment>, RepositoryError> {
    let rows = sqlx::query_as::<_, PaymentRow>(
      r#"
            SELECT id, invoice_id, amount, recorded_by, paid_at
            FROM payments
            WHERE invoice_id = $1
            ORDER BY paid_at ASC
            "#,
    )
    .bind(invoice_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(Payment::try_from).collect()
  }

  async fn find_by_business(
    &self,
    business_id: Uuid,
    status: Option<InvoiceStatus>,
  ) -> Result<Vec<Invoice>, RepositoryError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, business_id, customer_id, invoice_number, invoice_date, due_date,
                   payment_terms_days, total_amount, paid_amount, status, revision,
                   paid_at, created_at, updated_at
            FROM invoices
            WHERE business_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
    )
    .bind(business_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(Invoice::try_from).collect()
  }

  async fn find_by_customer(
    &self,
    customer_id: Uuid,
    status: Option<InvoiceStatus>,
  ) -> Result<Vec<Invoice>, RepositoryError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, business_id, customer_id, invoice_number, invoice_date, due_date,
                   payment_terms_days, total_amount, paid_amount, status, revision,
                   paid_at, created_at, updated_at
            FROM invoices
            WHERE customer_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
    )
    .bind(customer_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(Invoice::try_from).collect()
  }

  async fn find_overdue(
    &self,
    business_id: Uuid,
    current_date: NaiveDate,
  ) -> Result<Vec<Invoice>, RepositoryError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, business_id, customer_id, invoice_number, invoice_date, due_date,
                   payment_terms_days, total_amount, paid_amount, status, revision,
                   paid_at, created_at, updated_at
            FROM invoices
            WHERE business_id = $1 AND status = 'sent' AND due_date < $2
            ORDER BY due_date ASC
            "#,
    )
    .bind(business_id)
    .bind(current_date)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(Invoice::try_from).collect()
  }

  async fn record_payment(
    &self,
    invoice: &Invoice,
    payment: &Payment,
  ) -> Result<(), RepositoryError> {
    let mut tx = self.pool.begin().await?;

    let result = sqlx::query(
      r#"
            UPDATE invoices
            SET status = $2, paid_amount = $3, paid_at = $4, updated_at = $5
            WHERE id = $1 AND status <> 'paid'
            "#,
    )
    .bind(invoice.id)
    .bind(invoice.status.as_str())
    .bind(invoice.paid_amount.value())
    .bind(invoice.paid_at)
    .bind(invoice.updated_at)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
      return Err(RepositoryError::Conflict(format!(
        "Invoice {} is already paid or no longer exists",
        invoice.id
      )));
    }

    sqlx::query(
      r#"
            INSERT INTO payments (id, invoice_id, amount, recorded_by, paid_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
    )
    .bind(payment.id)
    .bind(payment.invoice_id)
    .bind(payment.amount.value())
    .bind(payment.recorded_by)
    .bind(payment.paid_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
  }

  async fn update_status(
    &self,
    invoice: &Invoice,
    expected: InvoiceStatus,
  ) -> Result<(), RepositoryError> {
    let result = sqlx::query(
      r#"
            UPDATE invoices
            SET status = $2, updated_at = $3
            WHERE id = $1 AND status = $4
            "#,
    )
    .bind(invoice.id)
    .bind(invoice.status.as_str())
    .bind(invoice.updated_at)
    .bind(expected.as_str())
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(RepositoryError::Conflict(format!(
        "Invoice {} is no longer {}",
        invoice.id, expected
      )));
    }
    Ok(())
  }

  async fn replace_items(&self, replacement: &ItemReplacement) -> Result<(), RepositoryError> {
    let mut tx = self.pool.begin().await?;
    apply_replacement(&mut tx, replacement).await?;
    tx.commit().await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use super::super::test_support::setup_test_db;
  use crate::domain::invoice::ItemSnapshot;
  use rust_decimal_macros::dec;

  fn issue(business_id: Uuid, sequence: i64) -> (Invoice, Vec<LineItem>) {
    Invoice::issue(
      business_id,
      Uuid::new_v4(),
      InvoiceNumber::from_sequence("INV", sequence).unwrap(),
      NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
      PaymentTerms::default(),
      &[
        ItemSnapshot::new(
          ItemName::new("Widget".to_string()).unwrap(),
          Quantity::new(dec!(2)).unwrap(),
          Amount::new(dec!(10)).unwrap(),
        ),
        ItemSnapshot::new(
          ItemName::new("Bolt".to_string()).unwrap(),
          Quantity::new(dec!(4)).unwrap(),
          Amount::new(dec!(0.25)).unwrap(),
        ),
      ],
    )
    .unwrap()
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_create_and_find_invoice() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresInvoiceRepository::new(pool);
    let business_id = Uuid::new_v4();

    assert_eq!(repo.next_sequence(business_id).await.unwrap(), 1);
    assert_eq!(repo.next_sequence(business_id).await.unwrap(), 2);

    let (invoice, items) = issue(business_id, 1);
    repo.create(&invoice, &items).await.unwrap();

    let found = repo.find_by_id(invoice.id).await.unwrap().unwrap();
    assert_eq!(found.invoice_number, invoice.invoice_number);
    assert_eq!(found.total_amount.value(), dec!(21));
    assert_eq!(found.status, InvoiceStatus::Sent);

    let stored_items = repo.find_items(invoice.id).await.unwrap();
    assert_eq!(stored_items.len(), 2);
    assert_eq!(stored_items[0].name.value(), "Widget");
    assert_eq!(stored_items[1].line_order, 2);

    let listed = repo
      .find_by_business(business_id, Some(InvoiceStatus::Sent))
      .await
      .unwrap();
    assert_eq!(listed.len(), 1);
    let none = repo
      .find_by_business(business_id, Some(InvoiceStatus::Paid))
      .await
      .unwrap();
    assert!(none.is_empty());
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_record_payment_once() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresInvoiceRepository::new(pool);

    let (mut invoice, items) = issue(Uuid::new_v4(), 1);
    repo.create(&invoice, &items).await.unwrap();

    let payment = invoice
      .mark_paid(Amount::new(dec!(21)).unwrap(), invoice.business_id)
      .unwrap();
    repo.record_payment(&invoice, &payment).await.unwrap();

    let err = repo.record_payment(&invoice, &payment).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(repo.find_payments(invoice.id).await.unwrap().len(), 1);

    let stored = repo.find_by_id(invoice.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvoiceStatus::Paid);
    assert_eq!(stored.paid_amount.value(), dec!(21));
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_replace_items_is_guarded_by_revision() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresInvoiceRepository::new(pool);

    let (invoice, items) = issue(Uuid::new_v4(), 1);
    repo.create(&invoice, &items).await.unwrap();

    let mut updated = invoice.clone();
    let new_items = updated
      .replace_items(&[ItemSnapshot::new(
        ItemName::new("Widget".to_string()).unwrap(),
        Quantity::new(dec!(3)).unwrap(),
        Amount::new(dec!(10)).unwrap(),
      )])
      .unwrap();
    let replacement = ItemReplacement {
      invoice: updated,
      items: new_items,
      expected_revision: invoice.revision,
    };

    repo.replace_items(&replacement).await.unwrap();
    let err = repo.replace_items(&replacement).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let stored = repo.find_by_id(invoice.id).await.unwrap().unwrap();
    assert_eq!(stored.revision, 2);
    assert_eq!(stored.total_amount.value(), dec!(30));
    let stored_items = repo.find_items(invoice.id).await.unwrap();
    assert_eq!(stored_items.len(), 1);
    assert_eq!(stored_items[0].quantity.value(), dec!(3));
  }
}
