use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use billdesk::{
  adapters::http::{ApiUseCases, RequestIdMiddleware, configure_api_routes, health_check},
  domain::edit_request::{EditRequestRepository, EditRequestService},
  domain::events::EventPublisher,
  domain::identity::IdentityProvider,
  domain::invoice::{CustomerAccountRepository, InvoiceRepository, LedgerService},
  infrastructure::{
    config::{Config, DatabaseConfig, ProfileSeed, RedisConfig},
    notifications::{BroadcastEventPublisher, RedisEventPublisher},
    persistence::{
      memory::MemoryStore,
      postgres::{
        PostgresCustomerAccountRepository, PostgresEditRequestRepository,
        PostgresIdentityProvider, PostgresInvoiceRepository,
      },
    },
  },
};

/// Storage ports backing the services
struct Storage {
  invoices: Arc<dyn InvoiceRepository>,
  customers: Arc<dyn CustomerAccountRepository>,
  edit_requests: Arc<dyn EditRequestRepository>,
  identity: Arc<dyn IdentityProvider>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "billdesk=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting billdesk");

  let config = Config::load().context("Failed to load configuration")?;
  tracing::info!("Configuration loaded successfully");

  let storage = match &config.database {
    Some(database) => postgres_storage(database).await?,
    None => memory_storage(&config.profiles).await,
  };

  let publisher: Arc<dyn EventPublisher> = match &config.redis {
    Some(redis) => Arc::new(redis_publisher(redis).await?),
    None => Arc::new(in_process_publisher()),
  };

  let ledger_settings = config
    .ledger
    .settings()
    .context("Invalid [ledger] configuration")?;

  let ledger = Arc::new(LedgerService::new(
    storage.invoices,
    storage.customers,
    publisher.clone(),
    ledger_settings,
  ));
  let workflow = Arc::new(EditRequestService::new(
    ledger.clone(),
    storage.edit_requests,
    publisher,
    config.workflow.stale_request_policy,
  ));
  tracing::info!(
    "Edit request stale policy: {:?}",
    config.workflow.stale_request_policy
  );

  let use_cases = ApiUseCases::new(ledger, workflow);
  let identity = storage.identity;

  let server_host = config.server.host.clone();
  let server_port = config.server.port;
  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  HttpServer::new(move || {
    let use_cases = use_cases.clone();
    let identity = identity.clone();
    App::new()
      .wrap(RequestIdMiddleware::new())
      .wrap(Logger::default())
      .route("/health", web::get().to(health_check))
      .service(
        web::scope("/api/v1").configure(|cfg| configure_api_routes(cfg, &use_cases, identity)),
      )
  })
  .bind((server_host.as_str(), server_port))
  .with_context(|| format!("Failed to bind {}:{}", server_host, server_port))?
  .run()
  .await
  .context("HTTP server failed")
}

async fn postgres_storage(database: &DatabaseConfig) -> anyhow::Result<Storage> {
  tracing::info!("Connecting to database: {}", database.url);

  let pool = tokio::time::timeout(
    Duration::from_secs(database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(database.max_connections)
      .acquire_timeout(Duration::from_secs(database.acquire_timeout_seconds))
      .connect(&database.url),
  )
  .await
  .map_err(|_| {
    tracing::error!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      database.connect_timeout_seconds
    );
    anyhow::anyhow!(
      "Database connection timed out after {} seconds",
      database.connect_timeout_seconds
    )
  })?
  .with_context(|| format!("Could not connect to database at {}", database.url))?;

  tracing::info!("Database connection pool created");

  tracing::info!("Running database migrations");
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .context("Failed to run database migrations")?;
  tracing::info!("Database migrations completed");

  Ok(Storage {
    invoices: Arc::new(PostgresInvoiceRepository::new(pool.clone())),
    customers: Arc::new(PostgresCustomerAccountRepository::new(pool.clone())),
    edit_requests: Arc::new(PostgresEditRequestRepository::new(pool.clone())),
    identity: Arc::new(PostgresIdentityProvider::new(pool)),
  })
}

async fn memory_storage(profiles: &[ProfileSeed]) -> Storage {
  tracing::warn!("No [database] configured, keeping all data in memory");

  let store = MemoryStore::new();
  for profile in profiles {
    store.register_profile(profile.user_id, profile.role).await;
  }
  tracing::info!("Seeded {} profiles", profiles.len());

  Storage {
    invoices: Arc::new(store.clone()),
    customers: Arc::new(store.clone()),
    edit_requests: Arc::new(store.clone()),
    identity: Arc::new(store),
  }
}

async fn redis_publisher(redis: &RedisConfig) -> anyhow::Result<RedisEventPublisher> {
  tracing::info!("Connecting to Redis: {}", redis.url);

  let client = redis::Client::open(redis.url.clone()).context("Invalid Redis URL")?;

  let connection = tokio::time::timeout(
    Duration::from_secs(redis.connect_timeout_seconds),
    client.get_connection_manager(),
  )
  .await
  .map_err(|_| {
    tracing::error!(
      "Redis connection timed out after {} seconds. Is Redis running?",
      redis.connect_timeout_seconds
    );
    anyhow::anyhow!(
      "Redis connection timed out after {} seconds",
      redis.connect_timeout_seconds
    )
  })?
  .with_context(|| format!("Could not connect to Redis at {}", redis.url))?;

  tracing::info!("Publishing billing events to Redis channel {}", redis.channel);
  Ok(RedisEventPublisher::new(connection, redis.channel.clone()))
}

/// Broadcast publisher with a subscriber that logs every event
fn in_process_publisher() -> BroadcastEventPublisher {
  let publisher = BroadcastEventPublisher::new(256);
  let mut events = publisher.subscribe();

  tokio::spawn(async move {
    loop {
      match events.recv().await {
        Ok(event) => tracing::debug!(
          kind = event.name(),
          invoice_id = %event.invoice_id,
          "Billing event"
        ),
        Err(RecvError::Lagged(skipped)) => {
          tracing::warn!("Event log subscriber lagged, skipped {} events", skipped)
        }
        Err(RecvError::Closed) => break,
      }
    }
  });

  publisher
}
