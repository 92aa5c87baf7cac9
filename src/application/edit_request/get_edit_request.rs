use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::invoice::ItemSnapshotDto;
use crate::domain::edit_request::{EditRequest, EditRequestError, EditRequestService};
use crate::domain::identity::Actor;
use crate::domain::invoice::{ItemSnapshot, ValueObjectError};

#[derive(Debug)]
pub struct GetEditRequestCommand {
  pub actor: Actor,
  pub request_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct EditRequestDto {
  pub id: Uuid,
  pub invoice_id: Uuid,
  pub business_id: Uuid,
  pub requester_id: Uuid,
  pub original_items: Vec<ItemSnapshotDto>,
  pub requested_items: Vec<ItemSnapshotDto>,
  pub message: Option<String>,
  pub status: String,
  pub base_revision: i64,
  pub created_at: DateTime<Utc>,
  pub reviewed_at: Option<DateTime<Utc>>,
  pub reviewed_by: Option<Uuid>,
}

impl TryFrom<EditRequest> for EditRequestDto {
  type Error = ValueObjectError;

  fn try_from(request: EditRequest) -> Result<Self, Self::Error> {
    Ok(Self {
      id: request.id,
      invoice_id: request.invoice_id,
      business_id: request.business_id,
      requester_id: request.requester_id,
      original_items: snapshot_dtos(&request.original_items)?,
      requested_items: snapshot_dtos(&request.requested_items)?,
      message: request.message.map(String::from),
      status: request.status.as_str().to_string(),
      base_revision: request.base_revision,
      created_at: request.created_at,
      reviewed_at: request.reviewed_at,
      reviewed_by: request.reviewed_by,
    })
  }
}

fn snapshot_dtos(items: &[ItemSnapshot]) -> Result<Vec<ItemSnapshotDto>, ValueObjectError> {
  items.iter().map(ItemSnapshotDto::try_from).collect()
}

pub struct GetEditRequestUseCase {
  workflow: Arc<EditRequestService>,
}

impl GetEditRequestUseCase {
  pub fn new(workflow: Arc<EditRequestService>) -> Self {
    Self { workflow }
  }

  pub async fn execute(
    &self,
    command: GetEditRequestCommand,
  ) -> Result<EditRequestDto, EditRequestError> {
    let request = self
      .workflow
      .get(&command.actor, command.request_id)
      .await?;
    Ok(request.try_into()?)
  }
}
