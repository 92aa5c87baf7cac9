use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::get_actor;
use crate::{
  adapters::http::{
    dtos::{RegisterCustomerRequest, UpdatePaymentTermsRequest},
    errors::ApiError,
  },
  application::invoice::{
    ListCustomersCommand, ListCustomersUseCase, RegisterCustomerCommand, RegisterCustomerUseCase,
    UpdatePaymentTermsCommand, UpdatePaymentTermsUseCase,
  },
};

/// Register a customer with the calling business
/// POST /api/v1/customers
pub async fn register_customer_handler(
  request: web::Json<RegisterCustomerRequest>,
  use_case: web::Data<Arc<RegisterCustomerUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;
  let actor = get_actor(&http_req)?;
  let request = request.into_inner();

  let customer = use_case
    .execute(RegisterCustomerCommand {
      actor,
      customer_id: request.customer_id,
      display_name: request.display_name,
      email: request.email,
      payment_terms_days: request.payment_terms_days,
    })
    .await?;

  Ok(HttpResponse::Created().json(customer))
}

/// GET /api/v1/customers
pub async fn list_customers_handler(
  use_case: web::Data<Arc<ListCustomersUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = get_actor(&http_req)?;

  let response = use_case.execute(ListCustomersCommand { actor }).await?;

  Ok(HttpResponse::Ok().json(response))
}

/// Change the terms used for the customer's future invoices
/// PUT /api/v1/customers/{customer_id}/payment-terms
pub async fn update_payment_terms_handler(
  customer_id: web::Path<Uuid>,
  request: web::Json<UpdatePaymentTermsRequest>,
  use_case: web::Data<Arc<UpdatePaymentTermsUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;
  let actor = get_actor(&http_req)?;

  let customer = use_case
    .execute(UpdatePaymentTermsCommand {
      actor,
      customer_id: customer_id.into_inner(),
      payment_terms_days: request.payment_terms_days,
    })
    .await?;

  Ok(HttpResponse::Ok().json(customer))
}
