use async_trait::async_trait;
use uuid::Uuid;

use super::{MemoryStore, newest_first};
use crate::domain::edit_request::{EditRequest, EditRequestRepository};
use crate::domain::errors::RepositoryError;
use crate::domain::invoice::{InvoiceStatus, ItemReplacement};

#[async_trait]
impl EditRequestRepository for MemoryStore {
  async fn create(&self, request: &EditRequest) -> Result<(), RepositoryError> {
    let mut state = self.state.lock().await;
    let invoice = state.invoice(request.invoice_id)?;
    if invoice.status == InvoiceStatus::Paid {
      return Err(RepositoryError::Conflict(format!(
        "Invoice {} is already paid",
        invoice.id
      )));
    }
    if invoice.revision != request.base_revision {
      return Err(RepositoryError::Conflict(format!(
        "Invoice {} is at revision {}, the request was drafted against {}",
        invoice.id, invoice.revision, request.base_revision
      )));
    }
    if state.edit_requests.contains_key(&request.id) {
      return Err(RepositoryError::Duplicate(format!(
        "edit request {} already exists",
        request.id
      )));
    }

    state.edit_requests.insert(request.id, request.clone());
    Ok(())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<EditRequest>, RepositoryError> {
    let state = self.state.lock().await;
    Ok(state.edit_requests.get(&id).cloned())
  }

  async fn find_by_invoice(&self, invoice_id: Uuid) -> Result<Vec<EditRequest>, RepositoryError> {
    let state = self.state.lock().await;
    let requests: Vec<EditRequest> = state
      .edit_requests
      .values()
      .filter(|r| r.invoice_id == invoice_id)
      .cloned()
      .collect();
    Ok(newest_first(requests, |r| r.created_at))
  }

  async fn find_by_requester(
    &self,
    requester_id: Uuid,
  ) -> Result<Vec<EditRequest>, RepositoryError> {
    let state = self.state.lock().await;
    let requests: Vec<EditRequest> = state
      .edit_requests
      .values()
      .filter(|r| r.requester_id == requester_id)
      .cloned()
      .collect();
    Ok(newest_first(requests, |r| r.created_at))
  }

  async fn find_pending_by_business(
    &self,
    business_id: Uuid,
  ) -> Result<Vec<EditRequest>, RepositoryError> {
    let state = self.state.lock().await;
    let mut requests: Vec<EditRequest> = state
      .edit_requests
      .values()
      .filter(|r| r.business_id == business_id && r.is_pending())
      .cloned()
      .collect();
    requests.sort_by_key(|r| r.created_at);
    Ok(requests)
  }

  async fn approve(
    &self,
    request: &EditRequest,
    replacement: &ItemReplacement,
  ) -> Result<(), RepositoryError> {
    let mut state = self.state.lock().await;
    state.check_pending(request)?;
    state.check_replacement(replacement)?;

    state.apply_replacement(replacement);
    state.edit_requests.insert(request.id, request.clone());
    Ok(())
  }

  async fn reject(&self, request: &EditRequest) -> Result<(), RepositoryError> {
    let mut state = self.state.lock().await;
    state.check_pending(request)?;

    state.edit_requests.insert(request.id, request.clone());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::{
    Amount, Invoice, InvoiceNumber, InvoiceRepository, ItemName, ItemSnapshot, PaymentTerms,
    Quantity,
  };
  use chrono::NaiveDate;
  use rust_decimal_macros::dec;

  fn widgets(quantity: rust_decimal::Decimal) -> Vec<ItemSnapshot> {
    vec![ItemSnapshot::new(
      ItemName::new("Widget".to_string()).unwrap(),
      Quantity::new(quantity).unwrap(),
      Amount::new(dec!(10)).unwrap(),
    )]
  }

  async fn stored_invoice(store: &MemoryStore) -> Invoice {
    let (invoice, items) = Invoice::issue(
      Uuid::new_v4(),
      Uuid::new_v4(),
      InvoiceNumber::from_sequence("INV", 1).unwrap(),
      NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
      PaymentTerms::default(),
      &widgets(dec!(2)),
    )
    .unwrap();
    InvoiceRepository::create(store, &invoice, &items).await.unwrap();
    invoice
  }

  fn draft(invoice: &Invoice) -> EditRequest {
    EditRequest::new(
      invoice,
      invoice.customer_id,
      widgets(dec!(2)),
      widgets(dec!(3)),
      None,
    )
  }

  #[tokio::test]
  async fn test_create_refuses_paid_invoice() {
    let store = MemoryStore::new();
    let invoice = stored_invoice(&store).await;
    let request = draft(&invoice);

    let mut paid = invoice.clone();
    let payment = paid
      .mark_paid(Amount::new(dec!(20)).unwrap(), invoice.business_id)
      .unwrap();
    store.record_payment(&paid, &payment).await.unwrap();

    let err = EditRequestRepository::create(&store, &request)
      .await
      .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert!(store.find_by_invoice(invoice.id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_create_refuses_request_drafted_against_older_revision() {
    let store = MemoryStore::new();
    let invoice = stored_invoice(&store).await;
    let request = draft(&invoice);

    let mut corrected = invoice.clone();
    let items = corrected.replace_items(&widgets(dec!(5))).unwrap();
    store
      .replace_items(&ItemReplacement {
        invoice: corrected,
        items,
        expected_revision: invoice.revision,
      })
      .await
      .unwrap();

    let err = EditRequestRepository::create(&store, &request)
      .await
      .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert!(store.find_by_invoice(invoice.id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_create_stores_pending_request() {
    let store = MemoryStore::new();
    let invoice = stored_invoice(&store).await;
    let request = draft(&invoice);

    EditRequestRepository::create(&store, &request).await.unwrap();

    let stored = EditRequestRepository::find_by_id(&store, request.id)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(stored, request);
    assert_eq!(
      store.find_pending_by_business(invoice.business_id).await.unwrap().len(),
      1
    );
  }
}
