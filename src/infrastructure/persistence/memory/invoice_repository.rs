use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::{MemoryStore, newest_first};
use crate::domain::errors::RepositoryError;
use crate::domain::invoice::{
  Invoice, InvoiceRepository, InvoiceStatus, ItemReplacement, LineItem, Payment,
};

#[async_trait]
impl InvoiceRepository for MemoryStore {
  async fn next_sequence(&self, business_id: Uuid) -> Result<i64, RepositoryError> {
    let mut state = self.state.lock().await;
    let sequence = state.sequences.entry(business_id).or_insert(0);
    *sequence += 1;
    Ok(*sequence)
  }

  async fn create(&self, invoice: &Invoice, items: &[LineItem]) -> Result<(), RepositoryError> {
    let mut state = self.state.lock().await;
    let duplicate_number = state.invoices.values().any(|i| {
      i.business_id == invoice.business_id && i.invoice_number == invoice.invoice_number
    });
    if duplicate_number || state.invoices.contains_key(&invoice.id) {
      return Err(RepositoryError::Duplicate(format!(
        "invoice {} already exists",
        invoice.invoice_number
      )));
    }

    state.invoices.insert(invoice.id, invoice.clone());
    state.line_items.insert(invoice.id, items.to_vec());
    Ok(())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, RepositoryError> {
    let state = self.state.lock().await;
    Ok(state.invoices.get(&id).cloned())
  }

  async fn find_items(&self, invoice_id: Uuid) -> Result<Vec<LineItem>, RepositoryError> {
    let state = self.state.lock().await;
    let mut items = state
      .line_items
      .get(&invoice_id)
      .cloned()
      .unwrap_or_default();
    items.sort_by_key(|item| item.line_order);
    Ok(items)
  }

  async fn find_payments(&self, invoice_id: Uuid) -> Result<Vec<Payment>, RepositoryError> {
    let state = self.state.lock().await;
    Ok(
      state
        .payments
        .get(&invoice_id)
        .cloned()
        .unwrap_or_default(),
    )
  }

  async fn find_by_business(
    &self,
    business_id: Uuid,
    status: Option<InvoiceStatus>,
  ) -> Result<Vec<Invoice>, RepositoryError> {
    let state = self.state.lock().await;
    let invoices: Vec<Invoice> = state
      .invoices
      .values()
      .filter(|i| i.business_id == business_id)
      .filter(|i| status.is_none_or(|s| i.status == s))
      .cloned()
      .collect();
    Ok(newest_first(invoices, |i| i.created_at))
  }

  async fn find_by_customer(
    &self,
    customer_id: Uuid,
    status: Option<InvoiceStatus>,
  ) -> Result<Vec<Invoice>, RepositoryError> {
    let state = self.state.lock().await;
    let invoices: Vec<Invoice> = state
      .invoices
      .values()
      .filter(|i| i.customer_id == customer_id)
      .filter(|i| status.is_none_or(|s| i.status == s))
      .cloned()
      .collect();
    Ok(newest_first(invoices, |i| i.created_at))
  }

  async fn find_overdue(
    &self,
    business_id: Uuid,
    current_date: NaiveDate,
  ) -> Result<Vec<Invoice>, RepositoryError> {
    let state = self.state.lock().await;
    let mut invoices: Vec<Invoice> = state
      .invoices
      .values()
      .filter(|i| i.business_id == business_id && i.is_overdue(current_date))
      .cloned()
      .collect();
    invoices.sort_by_key(|i| i.due_date);
    Ok(invoices)
  }

  async fn record_payment(
    &self,
    invoice: &Invoice,
    payment: &Payment,
  ) -> Result<(), RepositoryError> {
    let mut state = self.state.lock().await;
    let stored = state.invoice(invoice.id)?;
    if stored.status == InvoiceStatus::Paid {
      return Err(RepositoryError::Conflict(format!(
        "Invoice {} is already paid",
        invoice.id
      )));
    }

    let stored = state
      .invoices
      .get_mut(&invoice.id)
      .ok_or(RepositoryError::NotFound)?;
    stored.status = invoice.status;
    stored.paid_amount = invoice.paid_amount;
    stored.paid_at = invoice.paid_at;
    stored.updated_at = invoice.updated_at;
    state
      .payments
      .entry(invoice.id)
      .or_default()
      .push(payment.clone());
    Ok(())
  }

  async fn update_status(
    &self,
    invoice: &Invoice,
    expected: InvoiceStatus,
  ) -> Result<(), RepositoryError> {
    let mut state = self.state.lock().await;
    let stored = state.invoice(invoice.id)?;
    if stored.status != expected {
      return Err(RepositoryError::Conflict(format!(
        "Invoice {} is {}, expected {}",
        invoice.id, stored.status, expected
      )));
    }

    let stored = state
      .invoices
      .get_mut(&invoice.id)
      .ok_or(RepositoryError::NotFound)?;
    stored.status = invoice.status;
    stored.updated_at = invoice.updated_at;
    Ok(())
  }

  async fn replace_items(&self, replacement: &ItemReplacement) -> Result<(), RepositoryError> {
    let mut state = self.state.lock().await;
    state.check_replacement(replacement)?;
    state.apply_replacement(replacement);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::{Amount, InvoiceNumber, ItemName, ItemSnapshot, PaymentTerms, Quantity};
  use rust_decimal_macros::dec;

  fn issue(business_id: Uuid) -> (Invoice, Vec<LineItem>) {
    Invoice::issue(
      business_id,
      Uuid::new_v4(),
      InvoiceNumber::from_sequence("INV", 1).unwrap(),
      NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
      PaymentTerms::default(),
      &[ItemSnapshot::new(
        ItemName::new("Widget".to_string()).unwrap(),
        Quantity::new(dec!(2)).unwrap(),
        Amount::new(dec!(10)).unwrap(),
      )],
    )
    .unwrap()
  }

  #[tokio::test]
  async fn test_sequences_are_per_business() {
    let store = MemoryStore::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    assert_eq!(store.next_sequence(a).await.unwrap(), 1);
    assert_eq!(store.next_sequence(a).await.unwrap(), 2);
    assert_eq!(store.next_sequence(b).await.unwrap(), 1);
  }

  #[tokio::test]
  async fn test_duplicate_invoice_number_is_refused() {
    let store = MemoryStore::new();
    let business_id = Uuid::new_v4();
    let (first, items) = issue(business_id);
    let (second, _) = issue(business_id);

    store.create(&first, &items).await.unwrap();
    let err = store.create(&second, &[]).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Duplicate(_)));
  }

  #[tokio::test]
  async fn test_payment_is_recorded_once() {
    let store = MemoryStore::new();
    let (mut invoice, items) = issue(Uuid::new_v4());
    store.create(&invoice, &items).await.unwrap();

    let payment = invoice
      .mark_paid(Amount::new(dec!(20)).unwrap(), invoice.business_id)
      .unwrap();
    store.record_payment(&invoice, &payment).await.unwrap();

    let err = store.record_payment(&invoice, &payment).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(store.find_payments(invoice.id).await.unwrap().len(), 1);

    let err = store
      .update_status(&invoice, InvoiceStatus::Sent)
      .await
      .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
  }

  #[tokio::test]
  async fn test_payment_after_replacement_keeps_new_total() {
    let store = MemoryStore::new();
    let (invoice, items) = issue(Uuid::new_v4());
    store.create(&invoice, &items).await.unwrap();

    // Payment computed from the invoice as it was before the items changed
    let mut paid = invoice.clone();
    let payment = paid
      .mark_paid(Amount::new(dec!(20)).unwrap(), invoice.business_id)
      .unwrap();

    let mut corrected = invoice.clone();
    let new_items = corrected
      .replace_items(&[ItemSnapshot::new(
        ItemName::new("Widget".to_string()).unwrap(),
        Quantity::new(dec!(5)).unwrap(),
        Amount::new(dec!(10)).unwrap(),
      )])
      .unwrap();
    store
      .replace_items(&ItemReplacement {
        invoice: corrected,
        items: new_items,
        expected_revision: invoice.revision,
      })
      .await
      .unwrap();

    store.record_payment(&paid, &payment).await.unwrap();

    let stored = store.find_by_id(invoice.id).await.unwrap().unwrap();
    let stored_items = store.find_items(invoice.id).await.unwrap();
    let items_sum = stored_items
      .iter()
      .map(|item| item.total_price().unwrap().value())
      .sum::<rust_decimal::Decimal>();

    assert_eq!(stored.status, InvoiceStatus::Paid);
    assert_eq!(stored.paid_amount.value(), dec!(20));
    assert_eq!(stored.revision, 2);
    assert_eq!(stored.total_amount.value(), dec!(50));
    assert_eq!(stored.total_amount.value(), items_sum);
  }
}
