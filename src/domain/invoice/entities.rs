use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::InvoiceEntityError;
use super::value_objects::{
  Amount, CustomerName, InvoiceNumber, InvoiceStatus, ItemName, PaymentTerms, Quantity,
  ValueObjectError,
};

// Item Snapshot - the value part of a line item, detached from any invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
  pub name: ItemName,
  pub quantity: Quantity,
  pub unit_price: Amount,
}

impl ItemSnapshot {
  pub fn new(name: ItemName, quantity: Quantity, unit_price: Amount) -> Self {
    Self {
      name,
      quantity,
      unit_price,
    }
  }

  pub fn total_price(&self) -> Result<Amount, ValueObjectError> {
    self.unit_price.checked_multiply(&self.quantity)
  }
}

/// Sum of `quantity * unit_price` over `items`
pub fn items_total(items: &[ItemSnapshot]) -> Result<Amount, ValueObjectError> {
  items.iter().try_fold(Amount::zero(), |acc, item| {
    acc.checked_add(&item.total_price()?)
  })
}

fn due_date_for(
  invoice_date: NaiveDate,
  payment_terms: PaymentTerms,
) -> Result<NaiveDate, ValueObjectError> {
  invoice_date
    .checked_add_signed(Duration::days(payment_terms.days() as i64))
    .ok_or_else(|| {
      ValueObjectError::InvalidDate(format!(
        "Due date for {} with {} is out of range",
        invoice_date, payment_terms
      ))
    })
}

// Customer Account - a customer registered with a business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAccount {
  pub id: Uuid,
  pub business_id: Uuid,
  pub customer_id: Uuid,
  pub display_name: CustomerName,
  pub email: Option<String>,
  pub payment_terms: PaymentTerms,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl CustomerAccount {
  pub fn new(
    business_id: Uuid,
    customer_id: Uuid,
    display_name: CustomerName,
    email: Option<String>,
    payment_terms: PaymentTerms,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      business_id,
      customer_id,
      display_name,
      email,
      payment_terms,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn change_payment_terms(&mut self, payment_terms: PaymentTerms) {
    self.payment_terms = payment_terms;
    self.updated_at = Utc::now();
  }
}

// Invoice - billing document issued by a business to a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: Uuid,
  pub business_id: Uuid,
  pub customer_id: Uuid,
  pub invoice_number: InvoiceNumber,
  pub invoice_date: NaiveDate,
  pub due_date: NaiveDate,
  pub payment_terms: PaymentTerms,
  pub total_amount: Amount,
  pub paid_amount: Amount,
  pub status: InvoiceStatus,
  /// Bumped on every item replacement; used as the optimistic concurrency token
  pub revision: i64,
  pub paid_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Invoice {
  /// Issues a new invoice in `sent` status together with its line items
  pub fn issue(
    business_id: Uuid,
    customer_id: Uuid,
    invoice_number: InvoiceNumber,
    invoice_date: NaiveDate,
    payment_terms: PaymentTerms,
    items: &[ItemSnapshot],
  ) -> Result<(Self, Vec<LineItem>), InvoiceEntityError> {
    if items.is_empty() {
      return Err(InvoiceEntityError::NoLineItems);
    }

    let due_date = due_date_for(invoice_date, payment_terms)?;
    let total_amount = items_total(items)?;

    let now = Utc::now();
    let invoice = Self {
      id: Uuid::new_v4(),
      business_id,
      customer_id,
      invoice_number,
      invoice_date,
      due_date,
      payment_terms,
      total_amount,
      paid_amount: Amount::zero(),
      status: InvoiceStatus::Sent,
      revision: 1,
      paid_at: None,
      created_at: now,
      updated_at: now,
    };
    let line_items = LineItem::from_snapshots(invoice.id, items);

    Ok((invoice, line_items))
  }

  /// Swaps the whole item set, recomputing the total and bumping the revision
  pub fn replace_items(
    &mut self,
    items: &[ItemSnapshot],
  ) -> Result<Vec<LineItem>, InvoiceEntityError> {
    if !self.is_editable() {
      return Err(InvoiceEntityError::NotEditable {
        status: self.status,
      });
    }
    if items.is_empty() {
      return Err(InvoiceEntityError::NoLineItems);
    }

    self.total_amount = items_total(items)?;
    self.revision += 1;
    self.updated_at = Utc::now();

    Ok(LineItem::from_snapshots(self.id, items))
  }

  pub fn mark_paid(
    &mut self,
    amount: Amount,
    recorded_by: Uuid,
  ) -> Result<Payment, InvoiceEntityError> {
    self.change_status(InvoiceStatus::Paid)?;

    let payment = Payment::new(self.id, amount, recorded_by);
    self.paid_amount = amount;
    self.paid_at = Some(payment.paid_at);
    Ok(payment)
  }

  pub fn change_status(&mut self, new_status: InvoiceStatus) -> Result<(), InvoiceEntityError> {
    if !self.status.can_transition_to(new_status) {
      return Err(InvoiceEntityError::InvalidStatusTransition {
        from: self.status,
        to: new_status,
      });
    }

    self.status = new_status;
    self.updated_at = Utc::now();
    Ok(())
  }

  pub fn is_editable(&self) -> bool {
    self.status.is_editable()
  }

  pub fn is_overdue(&self, current_date: NaiveDate) -> bool {
    self.status == InvoiceStatus::Sent && self.due_date < current_date
  }

  pub fn issued_by(&self, user_id: Uuid) -> bool {
    self.business_id == user_id
  }

  pub fn addressed_to(&self, user_id: Uuid) -> bool {
    self.customer_id == user_id
  }
}

// Invoice Line Item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
  pub id: Uuid,
  pub invoice_id: Uuid,
  pub name: ItemName,
  pub quantity: Quantity,
  pub unit_price: Amount,
  pub line_order: i32,
}

impl LineItem {
  pub fn new(
    invoice_id: Uuid,
    name: ItemName,
    quantity: Quantity,
    unit_price: Amount,
    line_order: i32,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      invoice_id,
      name,
      quantity,
      unit_price,
      line_order,
    }
  }

  fn from_snapshots(invoice_id: Uuid, items: &[ItemSnapshot]) -> Vec<Self> {
    items
      .iter()
      .enumerate()
      .map(|(i, item)| {
        Self::new(
          invoice_id,
          item.name.clone(),
          item.quantity,
          item.unit_price,
          (i + 1) as i32,
        )
      })
      .collect()
  }

  pub fn total_price(&self) -> Result<Amount, ValueObjectError> {
    self.unit_price.checked_multiply(&self.quantity)
  }

  pub fn snapshot(&self) -> ItemSnapshot {
    ItemSnapshot::new(self.name.clone(), self.quantity, self.unit_price)
  }
}

// Payment - recorded once, when the invoice is marked paid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
  pub id: Uuid,
  pub invoice_id: Uuid,
  pub amount: Amount,
  pub recorded_by: Uuid,
  pub paid_at: DateTime<Utc>,
}

impl Payment {
  pub fn new(invoice_id: Uuid, amount: Amount, recorded_by: Uuid) -> Self {
    Self {
      id: Uuid::new_v4(),
      invoice_id,
      amount,
      recorded_by,
      paid_at: Utc::now(),
    }
  }
}

/// A fully computed item swap, ready to be written as one unit.
///
/// `invoice` already carries the new total and revision; storage applies it
/// only while the stored revision still equals `expected_revision`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemReplacement {
  pub invoice: Invoice,
  pub items: Vec<LineItem>,
  pub expected_revision: i64,
}

// Invoice Totals - calculated, not persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
  pub total: Amount,
  pub paid: Amount,
  pub balance: Amount,
}

impl InvoiceTotals {
  pub fn calculate(line_items: &[LineItem], paid: Amount) -> Result<Self, ValueObjectError> {
    let total = line_items.iter().try_fold(Amount::zero(), |acc, item| {
      acc.checked_add(&item.total_price()?)
    })?;

    Ok(Self {
      total,
      paid,
      balance: total.saturating_sub(&paid),
    })
  }
}

/// Everything a reader needs to render one invoice
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDetails {
  pub invoice: Invoice,
  pub line_items: Vec<LineItem>,
  pub payments: Vec<Payment>,
  pub totals: InvoiceTotals,
}
