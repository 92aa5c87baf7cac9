use actix_web::{
  Error, HttpMessage, ResponseError,
  body::EitherBody,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
  future::{Ready, ready},
  rc::Rc,
  sync::Arc,
};
use uuid::Uuid;

use crate::{
  adapters::http::errors::ApiError,
  domain::identity::{Actor, IdentityProvider},
};

/// Header carrying the id of the user the auth gateway already verified
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Middleware that resolves the calling user into an [`Actor`]
///
/// This middleware:
/// 1. Reads the user id from the `X-User-Id` header
/// 2. Resolves the user's role through the [`IdentityProvider`]
/// 3. Attaches the [`Actor`] to request extensions for downstream handlers
/// 4. Returns 401 Unauthorized if the header is missing, malformed or unknown
///
/// # Example
///
/// ```no_run
/// use actix_web::{App, web};
/// use std::sync::Arc;
/// # use billdesk::domain::identity::IdentityProvider;
/// # use billdesk::adapters::http::middleware::actor::ActorMiddleware;
///
/// # fn example(identity: Arc<dyn IdentityProvider>) {
/// let app = App::new().service(
///   web::scope("/api/v1")
///     .wrap(ActorMiddleware::new(identity))
///     .route("/ping", web::get().to(|| async { "pong" })),
/// );
/// # }
/// ```
pub struct ActorMiddleware {
  identity: Arc<dyn IdentityProvider>,
}

impl ActorMiddleware {
  pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
    Self { identity }
  }
}

impl<S, B> Transform<S, ServiceRequest> for ActorMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Transform = ActorMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(ActorMiddlewareService {
      service: Rc::new(service),
      identity: self.identity.clone(),
    }))
  }
}

pub struct ActorMiddlewareService<S> {
  service: Rc<S>,
  identity: Arc<dyn IdentityProvider>,
}

impl<S, B> Service<ServiceRequest> for ActorMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);
    let identity = self.identity.clone();

    Box::pin(async move {
      let resolved = match extract_user_id(&req) {
        Ok(user_id) => identity.actor_for(user_id).await.map_err(ApiError::from),
        Err(e) => Err(e),
      };

      let actor = match resolved {
        Ok(actor) => actor,
        Err(e) => {
          tracing::warn!("Rejected request to {}: {}", req.path(), e);
          let (request, _) = req.into_parts();
          let response = e.error_response().map_into_right_body();
          return Ok(ServiceResponse::new(request, response));
        }
      };

      req.extensions_mut().insert(actor);

      let res = service.call(req).await?;
      Ok(res.map_into_left_body())
    })
  }
}

fn extract_user_id(req: &ServiceRequest) -> Result<Uuid, ApiError> {
  let raw = req
    .headers()
    .get(USER_ID_HEADER)
    .and_then(|h| h.to_str().ok())
    .ok_or_else(|| ApiError::Unauthenticated(format!("Missing {} header", USER_ID_HEADER)))?;

  Uuid::parse_str(raw.trim())
    .map_err(|_| ApiError::Unauthenticated(format!("Malformed {} header", USER_ID_HEADER)))
}

/// Extension trait to read the resolved actor from a request
pub trait ActorExt {
  /// Returns None when the request did not pass through [`ActorMiddleware`]
  fn actor(&self) -> Option<Actor>;
}

impl ActorExt for actix_web::HttpRequest {
  fn actor(&self) -> Option<Actor> {
    self.extensions().get::<Actor>().copied()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::identity::Role;
  use crate::infrastructure::persistence::memory::MemoryStore;
  use actix_web::{
    App, HttpRequest, HttpResponse,
    http::StatusCode,
    test::{self, TestRequest},
    web,
  };

  async fn whoami(req: HttpRequest) -> HttpResponse {
    match req.actor() {
      Some(actor) => HttpResponse::Ok().body(actor.role.to_string()),
      None => HttpResponse::InternalServerError().finish(),
    }
  }

  #[test]
  fn test_extract_user_id_valid() {
    let id = Uuid::new_v4();
    let req = TestRequest::default()
      .insert_header((USER_ID_HEADER, id.to_string()))
      .to_srv_request();

    assert_eq!(extract_user_id(&req).unwrap(), id);
  }

  #[test]
  fn test_extract_user_id_missing_or_malformed() {
    let req = TestRequest::default().to_srv_request();
    assert!(extract_user_id(&req).is_err());

    let req = TestRequest::default()
      .insert_header((USER_ID_HEADER, "not-a-uuid"))
      .to_srv_request();
    assert!(extract_user_id(&req).is_err());
  }

  #[actix_web::test]
  async fn test_actor_middleware_resolves_role() {
    let store = MemoryStore::new();
    let business_id = Uuid::new_v4();
    store.register_profile(business_id, Role::Business).await;

    let app = test::init_service(
      App::new()
        .wrap(ActorMiddleware::new(Arc::new(store)))
        .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = TestRequest::get()
      .uri("/whoami")
      .insert_header((USER_ID_HEADER, business_id.to_string()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, "business");
  }

  #[actix_web::test]
  async fn test_actor_middleware_rejects_unknown_user() {
    let app = test::init_service(
      App::new()
        .wrap(ActorMiddleware::new(Arc::new(MemoryStore::new())))
        .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = TestRequest::get()
      .uri("/whoami")
      .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::get().uri("/whoami").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }
}
