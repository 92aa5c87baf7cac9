use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::get_edit_request::EditRequestDto;
use crate::domain::edit_request::{EditRequestError, EditRequestService};
use crate::domain::identity::Actor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
  Approve,
  Reject,
}

#[derive(Debug)]
pub struct ReviewEditRequestCommand {
  pub actor: Actor,
  pub request_id: Uuid,
  pub decision: ReviewDecision,
}

/// Invoice state after an approval
#[derive(Debug, Serialize)]
pub struct ReviewedInvoiceDto {
  pub invoice_id: Uuid,
  pub revision: i64,
  pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ReviewEditRequestResponse {
  pub request: EditRequestDto,
  /// Present only when the request was approved
  #[serde(skip_serializing_if = "Option::is_none")]
  pub invoice: Option<ReviewedInvoiceDto>,
}

pub struct ReviewEditRequestUseCase {
  workflow: Arc<EditRequestService>,
}

impl ReviewEditRequestUseCase {
  pub fn new(workflow: Arc<EditRequestService>) -> Self {
    Self { workflow }
  }

  pub async fn execute(
    &self,
    command: ReviewEditRequestCommand,
  ) -> Result<ReviewEditRequestResponse, EditRequestError> {
    match command.decision {
      ReviewDecision::Approve => {
        let (request, invoice) = self
          .workflow
          .approve(&command.actor, command.request_id)
          .await?;
        Ok(ReviewEditRequestResponse {
          request: request.try_into()?,
          invoice: Some(ReviewedInvoiceDto {
            invoice_id: invoice.id,
            revision: invoice.revision,
            total_amount: invoice.total_amount.value(),
          }),
        })
      }
      ReviewDecision::Reject => {
        let request = self
          .workflow
          .reject(&command.actor, command.request_id)
          .await?;
        Ok(ReviewEditRequestResponse {
          request: request.try_into()?,
          invoice: None,
        })
      }
    }
  }
}
