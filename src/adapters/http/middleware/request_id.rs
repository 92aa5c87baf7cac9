use actix_web::{
  Error, HttpMessage,
  body::MessageBody,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
  http::header::{HeaderName, HeaderValue},
};
use futures_util::future::LocalBoxFuture;
use std::{
  fmt,
  future::{Ready, ready},
  rc::Rc,
};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags every request with an id and echoes it in the `X-Request-ID` header.
///
/// An id already set by the auth gateway is kept when it parses as a UUID, so
/// gateway and service logs can be correlated; otherwise a fresh v4 id is
/// generated. Handlers read it through [`RequestIdExt`].
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware;

impl RequestIdMiddleware {
  pub fn new() -> Self {
    Self
  }
}

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: MessageBody + 'static,
{
  type Response = ServiceResponse<B>;
  type Error = Error;
  type Transform = RequestIdMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(RequestIdMiddlewareService {
      service: Rc::new(service),
    }))
  }
}

pub struct RequestIdMiddlewareService<S> {
  service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: MessageBody + 'static,
{
  type Response = ServiceResponse<B>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);

    Box::pin(async move {
      let request_id = incoming_request_id(&req).unwrap_or_default();
      req.extensions_mut().insert(request_id);

      tracing::debug!(request_id = %request_id, "{} {}", req.method(), req.path());

      let mut res = service.call(req).await?;

      if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        res
          .headers_mut()
          .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
      }

      Ok(res)
    })
  }
}

fn incoming_request_id(req: &ServiceRequest) -> Option<RequestId> {
  req
    .headers()
    .get(REQUEST_ID_HEADER)
    .and_then(|h| h.to_str().ok())
    .and_then(|s| Uuid::parse_str(s.trim()).ok())
    .map(RequestId)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
  pub fn new() -> Self {
    Self(Uuid::new_v4())
  }

  pub fn value(&self) -> Uuid {
    self.0
  }
}

impl Default for RequestId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for RequestId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Extension trait to read the request id from a request
pub trait RequestIdExt {
  /// None when [`RequestIdMiddleware`] is not installed
  fn request_id(&self) -> Option<RequestId>;
}

impl RequestIdExt for actix_web::HttpRequest {
  fn request_id(&self) -> Option<RequestId> {
    self.extensions().get::<RequestId>().copied()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::{
    App, HttpResponse,
    test::{self, TestRequest},
    web,
  };

  async fn echo_id(req: actix_web::HttpRequest) -> HttpResponse {
    match req.request_id() {
      Some(id) => HttpResponse::Ok().body(id.to_string()),
      None => HttpResponse::InternalServerError().finish(),
    }
  }

  #[actix_web::test]
  async fn test_request_id_is_generated() {
    let app = test::init_service(
      App::new()
        .wrap(RequestIdMiddleware::new())
        .route("/", web::get().to(echo_id)),
    )
    .await;

    let req = TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    let header = resp
      .headers()
      .get("x-request-id")
      .unwrap()
      .to_str()
      .unwrap()
      .to_string();
    assert!(Uuid::parse_str(&header).is_ok());

    let body = test::read_body(resp).await;
    assert_eq!(body, header.as_str());
  }

  #[actix_web::test]
  async fn test_gateway_request_id_is_kept() {
    let app = test::init_service(
      App::new()
        .wrap(RequestIdMiddleware::new())
        .route("/", web::get().to(echo_id)),
    )
    .await;

    let gateway_id = Uuid::new_v4();
    let req = TestRequest::get()
      .uri("/")
      .insert_header(("X-Request-ID", gateway_id.to_string()))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
      resp.headers().get("x-request-id").unwrap().to_str().unwrap(),
      gateway_id.to_string()
    );
  }

  #[test]
  fn test_request_ids_are_unique() {
    assert_ne!(RequestId::new().value(), RequestId::new().value());
  }
}
