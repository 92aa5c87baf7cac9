pub mod customer_account_repository;
pub mod edit_request_repository;
pub mod identity_provider;
pub mod invoice_repository;

pub use customer_account_repository::PostgresCustomerAccountRepository;
pub use edit_request_repository::PostgresEditRequestRepository;
pub use identity_provider::PostgresIdentityProvider;
pub use invoice_repository::PostgresInvoiceRepository;

use crate::domain::errors::RepositoryError;

/// A stored row that no longer passes domain validation
fn corrupt(error: impl std::fmt::Display) -> RepositoryError {
  RepositoryError::Corrupt(error.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
  use sqlx::PgPool;
  use sqlx::postgres::PgPoolOptions;
  use testcontainers::ImageExt;
  use testcontainers_modules::postgres::Postgres;
  use testcontainers_modules::testcontainers::{ContainerAsync, runners::AsyncRunner};

  pub async fn setup_test_db() -> (PgPool, ContainerAsync<Postgres>) {
    let container = Postgres::default()
      .with_tag("16-alpine")
      .start()
      .await
      .expect("Failed to start postgres container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
      .get_host_port_ipv4(5432)
      .await
      .expect("Failed to get port");
    let database_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPoolOptions::new()
      .max_connections(5)
      .connect(&database_url)
      .await
      .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
      .run(&pool)
      .await
      .expect("Failed to run migrations");

    (pool, container)
  }
}
