use actix_web::web;
use std::sync::Arc;

use crate::application::edit_request::{
  GetEditRequestUseCase, ListEditRequestsUseCase, ReviewEditRequestUseCase,
  SubmitEditRequestUseCase,
};
use crate::application::invoice::{
  CreateInvoiceUseCase, GetInvoiceDetailsUseCase, ListCustomersUseCase, ListInvoicesUseCase,
  MarkInvoicePaidUseCase, MarkOverdueInvoicesUseCase, RegisterCustomerUseCase,
  ReplaceInvoiceItemsUseCase, UpdatePaymentTermsUseCase,
};
use crate::domain::edit_request::EditRequestService;
use crate::domain::identity::IdentityProvider;
use crate::domain::invoice::LedgerService;

use super::handlers::customers::{
  list_customers_handler, register_customer_handler, update_payment_terms_handler,
};
use super::handlers::edit_requests::{
  approve_edit_request_handler, get_edit_request_handler, list_invoice_edit_requests_handler,
  list_my_edit_requests_handler, list_pending_edit_requests_handler, reject_edit_request_handler,
  submit_edit_request_handler,
};
use super::handlers::invoices::{
  create_invoice_handler, get_invoice_handler, list_invoices_handler, mark_overdue_handler,
  mark_paid_handler, replace_items_handler,
};
use super::middleware::ActorMiddleware;

/// Every use case the JSON API serves, built once at startup
#[derive(Clone)]
pub struct ApiUseCases {
  pub register_customer: Arc<RegisterCustomerUseCase>,
  pub list_customers: Arc<ListCustomersUseCase>,
  pub update_payment_terms: Arc<UpdatePaymentTermsUseCase>,
  pub create_invoice: Arc<CreateInvoiceUseCase>,
  pub list_invoices: Arc<ListInvoicesUseCase>,
  pub get_invoice: Arc<GetInvoiceDetailsUseCase>,
  pub replace_items: Arc<ReplaceInvoiceItemsUseCase>,
  pub mark_paid: Arc<MarkInvoicePaidUseCase>,
  pub mark_overdue: Arc<MarkOverdueInvoicesUseCase>,
  pub submit_edit_request: Arc<SubmitEditRequestUseCase>,
  pub list_edit_requests: Arc<ListEditRequestsUseCase>,
  pub get_edit_request: Arc<GetEditRequestUseCase>,
  pub review_edit_request: Arc<ReviewEditRequestUseCase>,
}

impl ApiUseCases {
  pub fn new(ledger: Arc<LedgerService>, workflow: Arc<EditRequestService>) -> Self {
    Self {
      register_customer: Arc::new(RegisterCustomerUseCase::new(ledger.clone())),
      list_customers: Arc::new(ListCustomersUseCase::new(ledger.clone())),
      update_payment_terms: Arc::new(UpdatePaymentTermsUseCase::new(ledger.clone())),
      create_invoice: Arc::new(CreateInvoiceUseCase::new(ledger.clone())),
      list_invoices: Arc::new(ListInvoicesUseCase::new(ledger.clone())),
      get_invoice: Arc::new(GetInvoiceDetailsUseCase::new(ledger.clone())),
      replace_items: Arc::new(ReplaceInvoiceItemsUseCase::new(ledger.clone())),
      mark_paid: Arc::new(MarkInvoicePaidUseCase::new(ledger.clone())),
      mark_overdue: Arc::new(MarkOverdueInvoicesUseCase::new(ledger)),
      submit_edit_request: Arc::new(SubmitEditRequestUseCase::new(workflow.clone())),
      list_edit_requests: Arc::new(ListEditRequestsUseCase::new(workflow.clone())),
      get_edit_request: Arc::new(GetEditRequestUseCase::new(workflow.clone())),
      review_edit_request: Arc::new(ReviewEditRequestUseCase::new(workflow)),
    }
  }
}

/// Mounts the whole JSON API (customers, invoices, edit requests) behind
/// [`ActorMiddleware`].
///
/// # Example
///
/// ```no_run
/// use actix_web::{App, web};
/// use std::sync::Arc;
/// # use billdesk::domain::identity::IdentityProvider;
/// # use billdesk::adapters::http::routes::{ApiUseCases, configure_api_routes};
///
/// # fn example(use_cases: ApiUseCases, identity: Arc<dyn IdentityProvider>) {
/// let app = App::new().service(
///   web::scope("/api/v1").configure(|cfg| configure_api_routes(cfg, &use_cases, identity)),
/// );
/// # }
/// ```
pub fn configure_api_routes(
  cfg: &mut web::ServiceConfig,
  use_cases: &ApiUseCases,
  identity: Arc<dyn IdentityProvider>,
) {
  cfg.service(
    web::scope("")
      .wrap(ActorMiddleware::new(identity))
      .service(web::scope("/customers").configure(|cfg| {
        configure_customer_routes(
          cfg,
          use_cases.register_customer.clone(),
          use_cases.list_customers.clone(),
          use_cases.update_payment_terms.clone(),
        )
      }))
      .service(web::scope("/invoices").configure(|cfg| {
        configure_invoice_routes(
          cfg,
          use_cases.create_invoice.clone(),
          use_cases.list_invoices.clone(),
          use_cases.get_invoice.clone(),
          use_cases.replace_items.clone(),
          use_cases.mark_paid.clone(),
          use_cases.mark_overdue.clone(),
          use_cases.submit_edit_request.clone(),
          use_cases.list_edit_requests.clone(),
        )
      }))
      .service(web::scope("/edit-requests").configure(|cfg| {
        configure_edit_request_routes(
          cfg,
          use_cases.list_edit_requests.clone(),
          use_cases.get_edit_request.clone(),
          use_cases.review_edit_request.clone(),
        )
      })),
  );
}

/// Configure customer routes
///
/// # Routes
///
/// - POST / - Register a customer with the calling business
/// - GET / - List the business's customers
/// - PUT /{customer_id}/payment-terms - Change terms for future invoices
pub fn configure_customer_routes(
  cfg: &mut web::ServiceConfig,
  register_use_case: Arc<RegisterCustomerUseCase>,
  list_use_case: Arc<ListCustomersUseCase>,
  update_terms_use_case: Arc<UpdatePaymentTermsUseCase>,
) {
  cfg
    .app_data(web::Data::new(register_use_case))
    .app_data(web::Data::new(list_use_case))
    .app_data(web::Data::new(update_terms_use_case))
    .route("", web::post().to(register_customer_handler))
    .route("", web::get().to(list_customers_handler))
    .route(
      "/{customer_id}/payment-terms",
      web::put().to(update_payment_terms_handler),
    );
}

/// Configure invoice routes
///
/// # Routes
///
/// - POST / - Issue an invoice
/// - GET / - List invoices (`?status=sent|paid|overdue`)
/// - POST /mark-overdue - Move past-due invoices to overdue
/// - GET /{id} - Invoice with items, payments and totals
/// - PUT /{id}/items - Replace all line items
/// - POST /{id}/payment - Mark the invoice paid
/// - POST /{id}/edit-requests - Submit an edit request
/// - GET /{id}/edit-requests - Edit requests of the invoice
#[allow(clippy::too_many_arguments)]
pub fn configure_invoice_routes(
  cfg: &mut web::ServiceConfig,
  create_use_case: Arc<CreateInvoiceUseCase>,
  list_use_case: Arc<ListInvoicesUseCase>,
  get_use_case: Arc<GetInvoiceDetailsUseCase>,
  replace_items_use_case: Arc<ReplaceInvoiceItemsUseCase>,
  mark_paid_use_case: Arc<MarkInvoicePaidUseCase>,
  mark_overdue_use_case: Arc<MarkOverdueInvoicesUseCase>,
  submit_request_use_case: Arc<SubmitEditRequestUseCase>,
  list_requests_use_case: Arc<ListEditRequestsUseCase>,
) {
  cfg
    .app_data(web::Data::new(create_use_case))
    .app_data(web::Data::new(list_use_case))
    .app_data(web::Data::new(get_use_case))
    .app_data(web::Data::new(replace_items_use_case))
    .app_data(web::Data::new(mark_paid_use_case))
    .app_data(web::Data::new(mark_overdue_use_case))
    .app_data(web::Data::new(submit_request_use_case))
    .app_data(web::Data::new(list_requests_use_case))
    .route("", web::post().to(create_invoice_handler))
    .route("", web::get().to(list_invoices_handler))
    .route("/mark-overdue", web::post().to(mark_overdue_handler))
    .route("/{id}", web::get().to(get_invoice_handler))
    .route("/{id}/items", web::put().to(replace_items_handler))
    .route("/{id}/payment", web::post().to(mark_paid_handler))
    .route(
      "/{id}/edit-requests",
      web::post().to(submit_edit_request_handler),
    )
    .route(
      "/{id}/edit-requests",
      web::get().to(list_invoice_edit_requests_handler),
    );
}

/// Configure edit request routes
///
/// # Routes
///
/// - GET /mine - Requests the calling customer submitted
/// - GET /pending - Requests awaiting the calling business's review
/// - GET /{id} - One request
/// - POST /{id}/approve - Approve and apply the requested items
/// - POST /{id}/reject - Reject without touching the invoice
pub fn configure_edit_request_routes(
  cfg: &mut web::ServiceConfig,
  list_use_case: Arc<ListEditRequestsUseCase>,
  get_use_case: Arc<GetEditRequestUseCase>,
  review_use_case: Arc<ReviewEditRequestUseCase>,
) {
  // Literal segments go before /{id}
  cfg
    .app_data(web::Data::new(list_use_case))
    .app_data(web::Data::new(get_use_case))
    .app_data(web::Data::new(review_use_case))
    .route("/mine", web::get().to(list_my_edit_requests_handler))
    .route("/pending", web::get().to(list_pending_edit_requests_handler))
    .route("/{id}", web::get().to(get_edit_request_handler))
    .route("/{id}/approve", web::post().to(approve_edit_request_handler))
    .route("/{id}/reject", web::post().to(reject_edit_request_handler));
}
