use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::get_actor;
use crate::{
  adapters::http::{
    dtos::{SubmitEditRequestRequest, into_line_item_inputs},
    errors::ApiError,
  },
  application::edit_request::{
    EditRequestScope, GetEditRequestCommand, GetEditRequestUseCase, ListEditRequestsCommand,
    ListEditRequestsUseCase, ReviewDecision, ReviewEditRequestCommand, ReviewEditRequestUseCase,
    SubmitEditRequestCommand, SubmitEditRequestUseCase,
  },
};

/// Customer proposes new line items for one of their invoices
/// POST /api/v1/invoices/{id}/edit-requests
pub async fn submit_edit_request_handler(
  invoice_id: web::Path<Uuid>,
  request: web::Json<SubmitEditRequestRequest>,
  use_case: web::Data<Arc<SubmitEditRequestUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;
  let actor = get_actor(&http_req)?;
  let request = request.into_inner();

  let edit_request = use_case
    .execute(SubmitEditRequestCommand {
      actor,
      invoice_id: invoice_id.into_inner(),
      requested_items: into_line_item_inputs(request.requested_items),
      message: request.message,
    })
    .await?;

  Ok(HttpResponse::Created().json(edit_request))
}

/// GET /api/v1/invoices/{id}/edit-requests
pub async fn list_invoice_edit_requests_handler(
  invoice_id: web::Path<Uuid>,
  use_case: web::Data<Arc<ListEditRequestsUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  list(
    &use_case,
    &http_req,
    EditRequestScope::Invoice(invoice_id.into_inner()),
  )
  .await
}

/// Requests the calling customer submitted
/// GET /api/v1/edit-requests/mine
pub async fn list_my_edit_requests_handler(
  use_case: web::Data<Arc<ListEditRequestsUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  list(&use_case, &http_req, EditRequestScope::Mine).await
}

/// Requests awaiting the calling business's review, oldest first
/// GET /api/v1/edit-requests/pending
pub async fn list_pending_edit_requests_handler(
  use_case: web::Data<Arc<ListEditRequestsUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  list(&use_case, &http_req, EditRequestScope::Pending).await
}

async fn list(
  use_case: &ListEditRequestsUseCase,
  http_req: &HttpRequest,
  scope: EditRequestScope,
) -> Result<HttpResponse, ApiError> {
  let actor = get_actor(http_req)?;

  let response = use_case
    .execute(ListEditRequestsCommand { actor, scope })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

/// GET /api/v1/edit-requests/{id}
pub async fn get_edit_request_handler(
  request_id: web::Path<Uuid>,
  use_case: web::Data<Arc<GetEditRequestUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = get_actor(&http_req)?;

  let edit_request = use_case
    .execute(GetEditRequestCommand {
      actor,
      request_id: request_id.into_inner(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(edit_request))
}

/// POST /api/v1/edit-requests/{id}/approve
pub async fn approve_edit_request_handler(
  request_id: web::Path<Uuid>,
  use_case: web::Data<Arc<ReviewEditRequestUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  review(&use_case, &http_req, request_id.into_inner(), ReviewDecision::Approve).await
}

/// POST /api/v1/edit-requests/{id}/reject
pub async fn reject_edit_request_handler(
  request_id: web::Path<Uuid>,
  use_case: web::Data<Arc<ReviewEditRequestUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  review(&use_case, &http_req, request_id.into_inner(), ReviewDecision::Reject).await
}

async fn review(
  use_case: &ReviewEditRequestUseCase,
  http_req: &HttpRequest,
  request_id: Uuid,
  decision: ReviewDecision,
) -> Result<HttpResponse, ApiError> {
  let actor = get_actor(http_req)?;

  let response = use_case
    .execute(ReviewEditRequestCommand {
      actor,
      request_id,
      decision,
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}
