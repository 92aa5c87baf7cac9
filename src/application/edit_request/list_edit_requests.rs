use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::get_edit_request::EditRequestDto;
use crate::domain::edit_request::{EditRequestError, EditRequestService};
use crate::domain::identity::Actor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditRequestScope {
  /// All requests on one invoice, visible to either party
  Invoice(Uuid),
  /// Requests the acting customer submitted
  Mine,
  /// Requests awaiting the acting business's review
  Pending,
}

#[derive(Debug)]
pub struct ListEditRequestsCommand {
  pub actor: Actor,
  pub scope: EditRequestScope,
}

#[derive(Debug, Serialize)]
pub struct ListEditRequestsResponse {
  pub edit_requests: Vec<EditRequestDto>,
}

pub struct ListEditRequestsUseCase {
  workflow: Arc<EditRequestService>,
}

impl ListEditRequestsUseCase {
  pub fn new(workflow: Arc<EditRequestService>) -> Self {
    Self { workflow }
  }

  pub async fn execute(
    &self,
    command: ListEditRequestsCommand,
  ) -> Result<ListEditRequestsResponse, EditRequestError> {
    let requests = match command.scope {
      EditRequestScope::Invoice(invoice_id) => {
        self
          .workflow
          .list_for_invoice(&command.actor, invoice_id)
          .await?
      }
      EditRequestScope::Mine => self.workflow.list_mine(&command.actor).await?,
      EditRequestScope::Pending => self.workflow.list_pending(&command.actor).await?,
    };

    Ok(ListEditRequestsResponse {
      edit_requests: requests
        .into_iter()
        .map(EditRequestDto::try_from)
        .collect::<Result<_, _>>()?,
    })
  }
}
