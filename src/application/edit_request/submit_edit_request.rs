use std::sync::Arc;
use uuid::Uuid;

use super::get_edit_request::EditRequestDto;
use crate::application::invoice::{LineItemInputDto, into_snapshots};
use crate::domain::edit_request::{
  EditRequestError, EditRequestService, RequestMessage, RequestSubmission,
};
use crate::domain::identity::Actor;

#[derive(Debug)]
pub struct SubmitEditRequestCommand {
  pub actor: Actor,
  pub invoice_id: Uuid,
  pub requested_items: Vec<LineItemInputDto>,
  pub message: Option<String>,
}

pub struct SubmitEditRequestUseCase {
  workflow: Arc<EditRequestService>,
}

impl SubmitEditRequestUseCase {
  pub fn new(workflow: Arc<EditRequestService>) -> Self {
    Self { workflow }
  }

  pub async fn execute(
    &self,
    command: SubmitEditRequestCommand,
  ) -> Result<EditRequestDto, EditRequestError> {
    let requested_items = into_snapshots(command.requested_items)?;
    let message = command
      .message
      .filter(|m| !m.trim().is_empty())
      .map(RequestMessage::new)
      .transpose()?;

    let request = self
      .workflow
      .submit(
        &command.actor,
        RequestSubmission {
          invoice_id: command.invoice_id,
          requested_items,
          message,
        },
      )
      .await?;

    Ok(request.try_into()?)
  }
}
