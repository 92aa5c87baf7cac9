pub mod customers;
pub mod edit_requests;
pub mod invoices;

use actix_web::HttpRequest;

use crate::{
  adapters::http::{errors::ApiError, middleware::ActorExt},
  domain::identity::Actor,
};

/// Actor resolved by `ActorMiddleware`
pub fn get_actor(req: &HttpRequest) -> Result<Actor, ApiError> {
  req.actor().ok_or_else(|| {
    tracing::warn!(
      "get_actor: actor not found in request extensions for path {}",
      req.path()
    );
    ApiError::Unauthenticated("Caller identity not resolved".to_string())
  })
}

pub async fn health_check() -> &'static str {
  "OK"
}
