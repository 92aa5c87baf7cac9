use async_trait::async_trait;
use uuid::Uuid;

use super::entities::EditRequest;
use crate::domain::errors::RepositoryError;
use crate::domain::invoice::ItemReplacement;

#[async_trait]
pub trait EditRequestRepository: Send + Sync {
  /// Stores a new pending request.
  ///
  /// Checked under the same lock that guards item replacements and payments:
  /// conflicts, writing nothing, if the invoice is paid or no longer at
  /// `request.base_revision`, so `original_items` always match that revision.
  async fn create(&self, request: &EditRequest) -> Result<(), RepositoryError>;

  async fn find_by_id(&self, id: Uuid) -> Result<Option<EditRequest>, RepositoryError>;

  /// Newest first
  async fn find_by_invoice(&self, invoice_id: Uuid) -> Result<Vec<EditRequest>, RepositoryError>;

  /// Newest first
  async fn find_by_requester(
    &self,
    requester_id: Uuid,
  ) -> Result<Vec<EditRequest>, RepositoryError>;

  /// Pending requests on the business's invoices, oldest first
  async fn find_pending_by_business(
    &self,
    business_id: Uuid,
  ) -> Result<Vec<EditRequest>, RepositoryError>;

  /// Stores the approved request and applies `replacement` as one unit.
  ///
  /// Conflicts, writing nothing, if the stored request is no longer pending
  /// or the invoice no longer matches `replacement.expected_revision` or is
  /// paid.
  async fn approve(
    &self,
    request: &EditRequest,
    replacement: &ItemReplacement,
  ) -> Result<(), RepositoryError>;

  /// Stores the rejected request; conflicts if it is no longer pending
  async fn reject(&self, request: &EditRequest) -> Result<(), RepositoryError>;
}
