pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use dtos::ErrorResponse;
pub use errors::ApiError;
pub use handlers::health_check;
pub use middleware::{
  ActorExt, ActorMiddleware, RequestId, RequestIdExt, RequestIdMiddleware, USER_ID_HEADER,
};
pub use routes::{
  ApiUseCases, configure_api_routes, configure_customer_routes, configure_edit_request_routes,
  configure_invoice_routes,
};
