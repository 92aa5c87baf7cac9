use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::corrupt;
use crate::domain::errors::RepositoryError;
use crate::domain::invoice::{CustomerAccount, CustomerAccountRepository, CustomerName, PaymentTerms};

#[derive(Debug, FromRow)]
struct CustomerAccountRow {
  id: Uuid,
  business_id: Uuid,
  customer_id: Uuid,
  display_name: String,
  email: Option<String>,
  payment_terms_days: i32,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerAccountRow> for CustomerAccount {
  type Error = RepositoryError;

  fn try_from(row: CustomerAccountRow) -> Result<Self, Self::Error> {
    Ok(CustomerAccount {
      id: row.id,
      business_id: row.business_id,
      customer_id: row.customer_id,
      display_name: CustomerName::new(row.display_name).map_err(corrupt)?,
      email: row.email,
      payment_terms: PaymentTerms::new(row.payment_terms_days).map_err(corrupt)?,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

pub struct PostgresCustomerAccountRepository {
  pool: PgPool,
}

impl PostgresCustomerAccountRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CustomerAccountRepository for PostgresCustomerAccountRepository {
  async fn create(&self, account: CustomerAccount) -> Result<CustomerAccount, RepositoryError> {
    let row = sqlx::query_as::<_, CustomerAccountRow>(
      r#"
            INSERT INTO customer_accounts (
                id, business_id, customer_id, display_name, email,
                payment_terms_days, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, business_id, customer_id, display_name, email,
                      payment_terms_days, created_at, updated_at
            "#,
    )
    .bind(account.id)
    .bind(account.business_id)
    .bind(account.customer_id)
    .bind(account.display_name.value())
    .bind(&account.email)
    .bind(account.payment_terms.days())
    .bind(account.created_at)
    .bind(account.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn update(&self, account: CustomerAccount) -> Result<CustomerAccount, RepositoryError> {
    let row = sqlx::query_as::<_, CustomerAccountRow>(
      r#"
            UPDATE customer_accounts
            SET display_name = $2, email = $3, payment_terms_days = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, business_id, customer_id, display_name, email,
                      payment_terms_days, created_at, updated_at
            "#,
    )
    .bind(account.id)
    .bind(account.display_name.value())
    .bind(&account.email)
    .bind(account.payment_terms.days())
    .bind(account.updated_at)
    .fetch_optional(&self.pool)
    .await?;

    row.ok_or(RepositoryError::NotFound)?.try_into()
  }

  async fn find(
    &self,
    business_id: Uuid,
    customer_id: Uuid,
  ) -> Result<Option<CustomerAccount>, RepositoryError> {
    let row = sqlx::query_as::<_, CustomerAccountRow>(
      r#"
            SELECT id, business_id, customer_id, display_name, email,
                   payment_terms_days, created_at, updated_at
            FROM customer_accounts
            WHERE business_id = $1 AND customer_id = $2
            "#,
    )
    .bind(business_id)
    .bind(customer_id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(CustomerAccount::try_from).transpose()
  }

  async fn find_by_business(
    &self,
    business_id: Uuid,
  ) -> Result<Vec<CustomerAccount>, RepositoryError> {
    let rows = sqlx::query_as::<_, CustomerAccountRow>(
      r#"
            SELECT id, business_id, customer_id, display_name, email,
                   payment_terms_days, created_at, updated_at
            FROM customer_accounts
            WHERE business_id = $1
            ORDER BY display_name ASC
            "#,
    )
    .bind(business_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(CustomerAccount::try_from).collect()
  }
}
