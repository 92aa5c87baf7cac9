use std::sync::Arc;
use uuid::Uuid;

use super::entities::EditRequest;
use super::errors::EditRequestError;
use super::ports::EditRequestRepository;
use super::value_objects::{RequestMessage, StaleRequestPolicy};
use crate::domain::errors::RepositoryError;
use crate::domain::events::{BillingEvent, BillingEventKind, EventPublisher, publish_committed};
use crate::domain::identity::Actor;
use crate::domain::invoice::services::{require_issuer, require_party};
use crate::domain::invoice::{Invoice, ItemSnapshot, LedgerService, items_total};

/// Edit request submission data
pub struct RequestSubmission {
  pub invoice_id: Uuid,
  pub requested_items: Vec<ItemSnapshot>,
  pub message: Option<RequestMessage>,
}

/// Proposal/approval state machine for customer edits of invoice items.
///
/// Depends on the ledger for invoice reads and for computing the replacement
/// an approval applies. The request's status change and the ledger write are
/// stored together by [`EditRequestRepository::approve`].
pub struct EditRequestService {
  ledger: Arc<LedgerService>,
  request_repo: Arc<dyn EditRequestRepository>,
  publisher: Arc<dyn EventPublisher>,
  policy: StaleRequestPolicy,
}

impl EditRequestService {
  pub fn new(
    ledger: Arc<LedgerService>,
    request_repo: Arc<dyn EditRequestRepository>,
    publisher: Arc<dyn EventPublisher>,
    policy: StaleRequestPolicy,
  ) -> Self {
    Self {
      ledger,
      request_repo,
      publisher,
      policy,
    }
  }

  pub fn policy(&self) -> StaleRequestPolicy {
    self.policy
  }

  pub async fn submit(
    &self,
    actor: &Actor,
    submission: RequestSubmission,
  ) -> Result<EditRequest, EditRequestError> {
    if submission.requested_items.is_empty() {
      return Err(EditRequestError::NoRequestedItems);
    }
    // An approval must be able to apply the items as a new total
    items_total(&submission.requested_items)?;

    let invoice = self.ledger.load_invoice(submission.invoice_id).await?;
    if !actor.is_customer() || !invoice.addressed_to(actor.user_id) {
      return Err(EditRequestError::PermissionDenied(
        "Only the invoice's customer can request edits".to_string(),
      ));
    }
    if !invoice.is_editable() {
      return Err(EditRequestError::InvalidState(format!(
        "Invoice {} is {} and can no longer be edited",
        invoice.invoice_number, invoice.status
      )));
    }

    let original_items = self.ledger.current_items(invoice.id).await?;
    let request = EditRequest::new(
      &invoice,
      actor.user_id,
      original_items,
      submission.requested_items,
      submission.message,
    );

    self
      .request_repo
      .create(&request)
      .await
      .map_err(conflict_as_invalid_state)?;

    tracing::info!(
      request_id = %request.id,
      invoice_id = %invoice.id,
      base_revision = request.base_revision,
      "Edit request submitted"
    );

    publish_committed(
      self.publisher.as_ref(),
      BillingEvent::for_invoice(
        &invoice,
        BillingEventKind::EditRequestSubmitted {
          request_id: request.id,
        },
      ),
    )
    .await;

    Ok(request)
  }

  /// Approves a pending request, replacing the invoice's items with the
  /// requested ones.
  ///
  /// On any failure the request stays pending and the invoice is untouched.
  pub async fn approve(
    &self,
    actor: &Actor,
    request_id: Uuid,
  ) -> Result<(EditRequest, Invoice), EditRequestError> {
    let mut request = self.load_request(request_id).await?;
    let invoice = self.ledger.load_invoice(request.invoice_id).await?;
    require_issuer(actor, &invoice)?;

    request.approve(actor.user_id).map_err(|e| {
      tracing::warn!(request_id = %request_id, "Refused to approve edit request: {}", e);
      EditRequestError::from(e)
    })?;

    if self.policy == StaleRequestPolicy::RejectStale && request.is_stale_against(&invoice) {
      tracing::warn!(
        request_id = %request_id,
        base_revision = request.base_revision,
        current_revision = invoice.revision,
        "Refused to approve stale edit request"
      );
      return Err(EditRequestError::InvalidState(format!(
        "Invoice changed since the request was submitted (revision {} is now {})",
        request.base_revision, invoice.revision
      )));
    }

    let replacement = self
      .ledger
      .prepare_replacement(&invoice, &request.requested_items)?;

    self
      .request_repo
      .approve(&request, &replacement)
      .await
      .map_err(conflict_as_invalid_state)?;

    tracing::info!(
      request_id = %request_id,
      invoice_id = %invoice.id,
      revision = replacement.invoice.revision,
      total = %replacement.invoice.total_amount,
      "Edit request approved"
    );

    publish_committed(
      self.publisher.as_ref(),
      BillingEvent::for_invoice(
        &replacement.invoice,
        BillingEventKind::EditRequestApproved {
          request_id,
          revision: replacement.invoice.revision,
          total_amount: replacement.invoice.total_amount.value(),
        },
      ),
    )
    .await;

    Ok((request, replacement.invoice))
  }

  pub async fn reject(
    &self,
    actor: &Actor,
    request_id: Uuid,
  ) -> Result<EditRequest, EditRequestError> {
    let mut request = self.load_request(request_id).await?;
    let invoice = self.ledger.load_invoice(request.invoice_id).await?;
    require_issuer(actor, &invoice)?;

    request.reject(actor.user_id).map_err(|e| {
      tracing::warn!(request_id = %request_id, "Refused to reject edit request: {}", e);
      EditRequestError::from(e)
    })?;

    self
      .request_repo
      .reject(&request)
      .await
      .map_err(conflict_as_invalid_state)?;

    tracing::info!(request_id = %request_id, invoice_id = %invoice.id, "Edit request rejected");

    publish_committed(
      self.publisher.as_ref(),
      BillingEvent::for_invoice(
        &invoice,
        BillingEventKind::EditRequestRejected { request_id },
      ),
    )
    .await;

    Ok(request)
  }

  pub async fn get(&self, actor: &Actor, request_id: Uuid) -> Result<EditRequest, EditRequestError> {
    let request = self.load_request(request_id).await?;

    let allowed = if actor.is_business() {
      request.business_id == actor.user_id
    } else {
      request.requester_id == actor.user_id
    };
    if !allowed {
      return Err(EditRequestError::PermissionDenied(
        "Edit request does not belong to this user".to_string(),
      ));
    }

    Ok(request)
  }

  pub async fn list_for_invoice(
    &self,
    actor: &Actor,
    invoice_id: Uuid,
  ) -> Result<Vec<EditRequest>, EditRequestError> {
    let invoice = self.ledger.load_invoice(invoice_id).await?;
    require_party(actor, &invoice)?;

    Ok(self.request_repo.find_by_invoice(invoice_id).await?)
  }

  /// Requests the customer submitted, across all invoices
  pub async fn list_mine(&self, actor: &Actor) -> Result<Vec<EditRequest>, EditRequestError> {
    if !actor.is_customer() {
      return Err(EditRequestError::PermissionDenied(
        "Only customers submit edit requests".to_string(),
      ));
    }
    Ok(self.request_repo.find_by_requester(actor.user_id).await?)
  }

  /// Requests awaiting the business's review
  pub async fn list_pending(&self, actor: &Actor) -> Result<Vec<EditRequest>, EditRequestError> {
    if !actor.is_business() {
      return Err(EditRequestError::PermissionDenied(
        "Only businesses review edit requests".to_string(),
      ));
    }
    Ok(
      self
        .request_repo
        .find_pending_by_business(actor.user_id)
        .await?,
    )
  }

  async fn load_request(&self, request_id: Uuid) -> Result<EditRequest, EditRequestError> {
    self
      .request_repo
      .find_by_id(request_id)
      .await?
      .ok_or(EditRequestError::RequestNotFound(request_id))
  }
}

fn conflict_as_invalid_state(error: RepositoryError) -> EditRequestError {
  match error {
    RepositoryError::Conflict(reason) => EditRequestError::InvalidState(reason),
    other => EditRequestError::Repository(other),
  }
}
