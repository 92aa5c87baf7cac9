use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::get_actor;
use crate::{
  adapters::http::{
    dtos::{
      CreateInvoiceRequest, ListInvoicesQuery, MarkOverdueRequest, MarkPaidRequest,
      ReplaceItemsRequest, into_line_item_inputs,
    },
    errors::ApiError,
  },
  application::invoice::{
    CreateInvoiceCommand, CreateInvoiceUseCase, GetInvoiceDetailsCommand, GetInvoiceDetailsUseCase,
    ListInvoicesCommand, ListInvoicesUseCase, MarkInvoicePaidCommand, MarkInvoicePaidUseCase,
    MarkOverdueInvoicesCommand, MarkOverdueInvoicesUseCase, ReplaceInvoiceItemsCommand,
    ReplaceInvoiceItemsUseCase,
  },
};

/// Issue a new invoice
/// POST /api/v1/invoices
pub async fn create_invoice_handler(
  request: web::Json<CreateInvoiceRequest>,
  use_case: web::Data<Arc<CreateInvoiceUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;
  let actor = get_actor(&http_req)?;
  let request = request.into_inner();

  let response = use_case
    .execute(CreateInvoiceCommand {
      actor,
      customer_id: request.customer_id,
      invoice_date: request.invoice_date,
      line_items: into_line_item_inputs(request.line_items),
    })
    .await?;

  Ok(HttpResponse::Created().json(response))
}

/// Invoices issued by (business) or addressed to (customer) the caller
/// GET /api/v1/invoices?status=sent
pub async fn list_invoices_handler(
  query: web::Query<ListInvoicesQuery>,
  use_case: web::Data<Arc<ListInvoicesUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = get_actor(&http_req)?;

  let response = use_case
    .execute(ListInvoicesCommand {
      actor,
      status_filter: query.into_inner().status,
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

/// GET /api/v1/invoices/{id}
pub async fn get_invoice_handler(
  invoice_id: web::Path<Uuid>,
  use_case: web::Data<Arc<GetInvoiceDetailsUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = get_actor(&http_req)?;

  let response = use_case
    .execute(GetInvoiceDetailsCommand {
      actor,
      invoice_id: invoice_id.into_inner(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

/// Direct correction of an invoice's items by its business
/// PUT /api/v1/invoices/{id}/items
pub async fn replace_items_handler(
  invoice_id: web::Path<Uuid>,
  request: web::Json<ReplaceItemsRequest>,
  use_case: web::Data<Arc<ReplaceInvoiceItemsUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;
  let actor = get_actor(&http_req)?;

  let response = use_case
    .execute(ReplaceInvoiceItemsCommand {
      actor,
      invoice_id: invoice_id.into_inner(),
      line_items: into_line_item_inputs(request.into_inner().line_items),
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/invoices/{id}/payment
pub async fn mark_paid_handler(
  invoice_id: web::Path<Uuid>,
  request: web::Json<MarkPaidRequest>,
  use_case: web::Data<Arc<MarkInvoicePaidUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = get_actor(&http_req)?;

  let response = use_case
    .execute(MarkInvoicePaidCommand {
      actor,
      invoice_id: invoice_id.into_inner(),
      amount: request.amount,
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

/// Move the caller's sent invoices past their due date to overdue
/// POST /api/v1/invoices/mark-overdue
pub async fn mark_overdue_handler(
  request: Option<web::Json<MarkOverdueRequest>>,
  use_case: web::Data<Arc<MarkOverdueInvoicesUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = get_actor(&http_req)?;
  let as_of = request.and_then(|r| r.into_inner().as_of);

  let response = use_case
    .execute(MarkOverdueInvoicesCommand { actor, as_of })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}
