use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use super::entities::{
  CustomerAccount, Invoice, InvoiceDetails, InvoiceTotals, ItemReplacement, ItemSnapshot,
  LineItem, Payment,
};
use super::errors::InvoiceError;
use super::ports::{CustomerAccountRepository, InvoiceRepository};
use super::value_objects::{Amount, CustomerName, InvoiceNumber, InvoiceStatus, PaymentTerms};
use crate::domain::errors::RepositoryError;
use crate::domain::events::{BillingEvent, BillingEventKind, EventPublisher, publish_committed};
use crate::domain::identity::Actor;

/// Invoice creation data
pub struct InvoiceData {
  pub customer_id: Uuid,
  pub invoice_date: NaiveDate,
  pub items: Vec<ItemSnapshot>,
}

/// Customer registration data
pub struct CustomerRegistration {
  pub customer_id: Uuid,
  pub display_name: CustomerName,
  pub email: Option<String>,
  /// Falls back to the ledger's default terms
  pub payment_terms: Option<PaymentTerms>,
}

#[derive(Debug, Clone)]
pub struct LedgerSettings {
  pub default_payment_terms: PaymentTerms,
  pub invoice_number_prefix: String,
}

impl Default for LedgerSettings {
  fn default() -> Self {
    Self {
      default_payment_terms: PaymentTerms::default(),
      invoice_number_prefix: "INV".to_string(),
    }
  }
}

/// Owns invoices and their line items: totals, numbering, payment status.
///
/// Totals are computed here and nowhere else.
pub struct LedgerService {
  invoice_repo: Arc<dyn InvoiceRepository>,
  customer_repo: Arc<dyn CustomerAccountRepository>,
  publisher: Arc<dyn EventPublisher>,
  settings: LedgerSettings,
}

impl LedgerService {
  pub fn new(
    invoice_repo: Arc<dyn InvoiceRepository>,
    customer_repo: Arc<dyn CustomerAccountRepository>,
    publisher: Arc<dyn EventPublisher>,
    settings: LedgerSettings,
  ) -> Self {
    Self {
      invoice_repo,
      customer_repo,
      publisher,
      settings,
    }
  }

  // Customer operations
  pub async fn register_customer(
    &self,
    actor: &Actor,
    registration: CustomerRegistration,
  ) -> Result<CustomerAccount, InvoiceError> {
    require_business(actor)?;

    if registration.customer_id == actor.user_id {
      return Err(InvoiceError::InvalidState(
        "A business cannot register itself as a customer".to_string(),
      ));
    }

    let account = CustomerAccount::new(
      actor.user_id,
      registration.customer_id,
      registration.display_name,
      registration.email,
      registration
        .payment_terms
        .unwrap_or(self.settings.default_payment_terms),
    );

    let created = self
      .customer_repo
      .create(account)
      .await
      .map_err(|e| match e {
        RepositoryError::Duplicate(_) => {
          InvoiceError::CustomerAlreadyRegistered(registration.customer_id)
        }
        other => InvoiceError::Repository(other),
      })?;

    tracing::info!(
      business_id = %created.business_id,
      customer_id = %created.customer_id,
      "Registered customer"
    );
    Ok(created)
  }

  pub async fn update_payment_terms(
    &self,
    actor: &Actor,
    customer_id: Uuid,
    payment_terms: PaymentTerms,
  ) -> Result<CustomerAccount, InvoiceError> {
    require_business(actor)?;

    let mut account = self
      .customer_repo
      .find(actor.user_id, customer_id)
      .await?
      .ok_or(InvoiceError::CustomerNotRegistered {
        business_id: actor.user_id,
        customer_id,
      })?;

    account.change_payment_terms(payment_terms);
    Ok(self.customer_repo.update(account).await?)
  }

  pub async fn list_customers(&self, actor: &Actor) -> Result<Vec<CustomerAccount>, InvoiceError> {
    require_business(actor)?;
    Ok(self.customer_repo.find_by_business(actor.user_id).await?)
  }

  // Invoice operations
  pub async fn create_invoice(
    &self,
    actor: &Actor,
    data: InvoiceData,
  ) -> Result<(Invoice, Vec<LineItem>), InvoiceError> {
    require_business(actor)?;

    if data.items.is_empty() {
      return Err(InvoiceError::NoLineItems);
    }

    let payment_terms = self
      .customer_repo
      .find(actor.user_id, data.customer_id)
      .await?
      .map(|account| account.payment_terms)
      .unwrap_or(self.settings.default_payment_terms);

    let sequence = self.invoice_repo.next_sequence(actor.user_id).await?;
    let invoice_number =
      InvoiceNumber::from_sequence(&self.settings.invoice_number_prefix, sequence)?;

    let (invoice, items) = Invoice::issue(
      actor.user_id,
      data.customer_id,
      invoice_number,
      data.invoice_date,
      payment_terms,
      &data.items,
    )?;

    self.invoice_repo.create(&invoice, &items).await?;

    tracing::info!(
      invoice_id = %invoice.id,
      invoice_number = %invoice.invoice_number,
      total = %invoice.total_amount,
      "Created invoice"
    );

    publish_committed(
      self.publisher.as_ref(),
      BillingEvent::for_invoice(
        &invoice,
        BillingEventKind::InvoiceCreated {
          invoice_number: invoice.invoice_number.to_string(),
          total_amount: invoice.total_amount.value(),
        },
      ),
    )
    .await;

    Ok((invoice, items))
  }

  /// Marks the invoice paid and records the payment.
  ///
  /// A second call is refused with an invalid-state error and changes nothing.
  pub async fn mark_paid(
    &self,
    actor: &Actor,
    invoice_id: Uuid,
    amount: Amount,
  ) -> Result<(Invoice, Payment), InvoiceError> {
    require_business(actor)?;

    let mut invoice = self.load_invoice(invoice_id).await?;
    require_issuer(actor, &invoice)?;

    let payment = invoice.mark_paid(amount, actor.user_id).map_err(|e| {
      tracing::warn!(invoice_id = %invoice_id, "Refused to mark invoice paid: {}", e);
      InvoiceError::from(e)
    })?;

    self.invoice_repo.record_payment(&invoice, &payment).await?;

    tracing::info!(invoice_id = %invoice.id, amount = %amount, "Invoice marked paid");

    publish_committed(
      self.publisher.as_ref(),
      BillingEvent::for_invoice(
        &invoice,
        BillingEventKind::InvoicePaid {
          amount: amount.value(),
        },
      ),
    )
    .await;

    Ok((invoice, payment))
  }

  /// Direct correction of an invoice's items by the issuing business
  pub async fn replace_items(
    &self,
    actor: &Actor,
    invoice_id: Uuid,
    items: Vec<ItemSnapshot>,
  ) -> Result<(Invoice, Vec<LineItem>), InvoiceError> {
    require_business(actor)?;

    let invoice = self.load_invoice(invoice_id).await?;
    require_issuer(actor, &invoice)?;

    let replacement = self.prepare_replacement(&invoice, &items)?;
    self.invoice_repo.replace_items(&replacement).await?;

    tracing::info!(
      invoice_id = %invoice_id,
      revision = replacement.invoice.revision,
      total = %replacement.invoice.total_amount,
      "Replaced invoice items"
    );

    publish_committed(
      self.publisher.as_ref(),
      BillingEvent::for_invoice(
        &replacement.invoice,
        BillingEventKind::InvoiceItemsReplaced {
          revision: replacement.invoice.revision,
          total_amount: replacement.invoice.total_amount.value(),
        },
      ),
    )
    .await;

    Ok((replacement.invoice, replacement.items))
  }

  /// Computes the item swap for `invoice` without writing anything.
  ///
  /// The result is written by [`InvoiceRepository::replace_items`], or by the
  /// edit-request store together with the request's status change.
  pub fn prepare_replacement(
    &self,
    invoice: &Invoice,
    items: &[ItemSnapshot],
  ) -> Result<ItemReplacement, InvoiceError> {
    let mut updated = invoice.clone();
    let line_items = updated.replace_items(items)?;

    Ok(ItemReplacement {
      invoice: updated,
      items: line_items,
      expected_revision: invoice.revision,
    })
  }

  /// Moves the business's `sent` invoices that are past due to `overdue`.
  ///
  /// Invoices that change concurrently (paid in the meantime) are skipped.
  pub async fn mark_overdue(
    &self,
    actor: &Actor,
    current_date: NaiveDate,
  ) -> Result<Vec<Invoice>, InvoiceError> {
    require_business(actor)?;

    let candidates = self
      .invoice_repo
      .find_overdue(actor.user_id, current_date)
      .await?;

    let mut updated_invoices = Vec::new();
    for mut invoice in candidates {
      if !invoice.is_overdue(current_date) {
        continue;
      }
      invoice.change_status(InvoiceStatus::Overdue)?;

      match self
        .invoice_repo
        .update_status(&invoice, InvoiceStatus::Sent)
        .await
      {
        Ok(()) => {}
        Err(RepositoryError::Conflict(reason)) => {
          tracing::warn!(invoice_id = %invoice.id, "Skipped overdue marking: {}", reason);
          continue;
        }
        Err(e) => return Err(e.into()),
      }

      publish_committed(
        self.publisher.as_ref(),
        BillingEvent::for_invoice(
          &invoice,
          BillingEventKind::InvoiceOverdue {
            due_date: invoice.due_date,
          },
        ),
      )
      .await;
      updated_invoices.push(invoice);
    }

    tracing::info!(
      business_id = %actor.user_id,
      count = updated_invoices.len(),
      "Marked invoices overdue"
    );
    Ok(updated_invoices)
  }

  pub async fn get_invoice(
    &self,
    actor: &Actor,
    invoice_id: Uuid,
  ) -> Result<InvoiceDetails, InvoiceError> {
    let invoice = self.load_invoice(invoice_id).await?;
    require_party(actor, &invoice)?;

    let line_items = self.invoice_repo.find_items(invoice_id).await?;
    let payments = self.invoice_repo.find_payments(invoice_id).await?;
    let totals = InvoiceTotals::calculate(&line_items, invoice.paid_amount)?;

    tracing::debug!(invoice_id = %invoice_id, items = line_items.len(), "Loaded invoice");

    Ok(InvoiceDetails {
      invoice,
      line_items,
      payments,
      totals,
    })
  }

  /// Businesses see the invoices they issued, customers the ones addressed to them
  pub async fn list_invoices(
    &self,
    actor: &Actor,
    status_filter: Option<InvoiceStatus>,
  ) -> Result<Vec<Invoice>, InvoiceError> {
    let invoices = if actor.is_business() {
      self
        .invoice_repo
        .find_by_business(actor.user_id, status_filter)
        .await?
    } else {
      self
        .invoice_repo
        .find_by_customer(actor.user_id, status_filter)
        .await?
    };
    Ok(invoices)
  }

  pub async fn load_invoice(&self, invoice_id: Uuid) -> Result<Invoice, InvoiceError> {
    self
      .invoice_repo
      .find_by_id(invoice_id)
      .await?
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))
  }

  /// Current items of the invoice, detached from it
  pub async fn current_items(&self, invoice_id: Uuid) -> Result<Vec<ItemSnapshot>, InvoiceError> {
    let items = self.invoice_repo.find_items(invoice_id).await?;
    Ok(items.iter().map(LineItem::snapshot).collect())
  }
}

fn require_business(actor: &Actor) -> Result<(), InvoiceError> {
  if !actor.is_business() {
    return Err(InvoiceError::PermissionDenied(
      "Only businesses can perform this operation".to_string(),
    ));
  }
  Ok(())
}

/// The actor must be the business that issued the invoice
pub fn require_issuer(actor: &Actor, invoice: &Invoice) -> Result<(), InvoiceError> {
  if !actor.is_business() || !invoice.issued_by(actor.user_id) {
    return Err(InvoiceError::PermissionDenied(
      "Invoice was not issued by this business".to_string(),
    ));
  }
  Ok(())
}

/// The actor must be either party to the invoice
pub fn require_party(actor: &Actor, invoice: &Invoice) -> Result<(), InvoiceError> {
  let allowed = if actor.is_business() {
    invoice.issued_by(actor.user_id)
  } else {
    invoice.addressed_to(actor.user_id)
  };

  if !allowed {
    return Err(InvoiceError::PermissionDenied(
      "Invoice does not belong to this user".to_string(),
    ));
  }
  Ok(())
}
