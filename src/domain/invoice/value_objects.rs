use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid invoice number: {0}")]
  InvalidInvoiceNumber(String),
  #[error("Invalid amount: {0}")]
  InvalidAmount(String),
  #[error("Invalid item name: {0}")]
  InvalidItemName(String),
  #[error("Invalid quantity: {0}")]
  InvalidQuantity(String),
  #[error("Invalid payment terms: {0}")]
  InvalidPaymentTerms(String),
  #[error("Invalid invoice status: {0}")]
  InvalidStatus(String),
  #[error("Invalid customer name: {0}")]
  InvalidCustomerName(String),
  #[error("Invalid request message: {0}")]
  InvalidMessage(String),
  #[error("Invalid date: {0}")]
  InvalidDate(String),
}

/// Largest magnitude a `NUMERIC(19,4)` column holds, exclusive: 10^15
fn numeric_upper_bound() -> Decimal {
  Decimal::from(1_000_000_000_000_000i64)
}

/// Drops trailing zeros only when they push the scale past 4, so `10.00000` is accepted
fn fit_scale(value: Decimal) -> Decimal {
  if value.scale() > 4 {
    value.normalize()
  } else {
    value
  }
}

// Invoice Number - assigned from a per-business sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 100 {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot exceed 100 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  /// Formats `sequence` as `{prefix}-{sequence:06}`, e.g. `INV-000042`
  pub fn from_sequence(prefix: &str, sequence: i64) -> Result<Self, ValueObjectError> {
    if sequence <= 0 {
      return Err(ValueObjectError::InvalidInvoiceNumber(format!(
        "Sequence must be positive, got {}",
        sequence
      )));
    }
    Self::new(format!("{}-{:06}", prefix.trim(), sequence))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Invoice Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
  Sent,
  Paid,
  Overdue,
}

impl InvoiceStatus {
  pub fn can_transition_to(&self, new_status: InvoiceStatus) -> bool {
    matches!(
      (self, new_status),
      (InvoiceStatus::Sent, InvoiceStatus::Paid)
        | (InvoiceStatus::Sent, InvoiceStatus::Overdue)
        | (InvoiceStatus::Overdue, InvoiceStatus::Paid)
    )
  }

  /// Paid invoices are immutable; everything else may have its items replaced
  pub fn is_editable(&self) -> bool {
    !matches!(self, InvoiceStatus::Paid)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Sent => "sent",
      InvoiceStatus::Paid => "paid",
      InvoiceStatus::Overdue => "overdue",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "sent" => Ok(InvoiceStatus::Sent),
      "paid" => Ok(InvoiceStatus::Paid),
      "overdue" => Ok(InvoiceStatus::Overdue),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown status: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for InvoiceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// Amount - non-negative monetary value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    let value = fit_scale(value);
    if value.is_sign_negative() && !value.is_zero() {
      return Err(ValueObjectError::InvalidAmount(
        "Amount cannot be negative".to_string(),
      ));
    }
    if value.scale() > 4 {
      return Err(ValueObjectError::InvalidAmount(
        "Amount cannot have more than 4 decimal places".to_string(),
      ));
    }
    if value >= numeric_upper_bound() {
      return Err(ValueObjectError::InvalidAmount(format!(
        "Amount must be less than {}",
        numeric_upper_bound()
      )));
    }
    Ok(Self(value))
  }

  pub fn zero() -> Self {
    Self(Decimal::ZERO)
  }

  pub fn value(&self) -> Decimal {
    self.0
  }

  pub fn checked_add(&self, other: &Amount) -> Result<Amount, ValueObjectError> {
    let sum = self
      .0
      .checked_add(other.0)
      .ok_or_else(|| ValueObjectError::InvalidAmount("Sum is out of range".to_string()))?;
    Amount::new(sum)
  }

  /// Balance left after subtracting `other`, floored at zero
  pub fn saturating_sub(&self, other: &Amount) -> Amount {
    Amount((self.0 - other.0).max(Decimal::ZERO))
  }

  /// Line total, rounded to the 4 decimal places an amount can hold
  pub fn checked_multiply(&self, quantity: &Quantity) -> Result<Amount, ValueObjectError> {
    let product = self
      .0
      .checked_mul(quantity.value())
      .ok_or_else(|| ValueObjectError::InvalidAmount("Line total is out of range".to_string()))?;
    Amount::new(product.round_dp(4))
  }
}

impl TryFrom<Decimal> for Amount {
  type Error = ValueObjectError;

  fn try_from(value: Decimal) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<Amount> for Decimal {
  fn from(amount: Amount) -> Self {
    amount.0
  }
}

impl fmt::Display for Amount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:.2}", self.0)
  }
}

// Quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

impl Quantity {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    let value = fit_scale(value);
    if value.is_sign_negative() && !value.is_zero() {
      return Err(ValueObjectError::InvalidQuantity(
        "Quantity cannot be negative".to_string(),
      ));
    }
    // Max 4 decimal places
    if value.scale() > 4 {
      return Err(ValueObjectError::InvalidQuantity(
        "Quantity cannot have more than 4 decimal places".to_string(),
      ));
    }
    if value >= numeric_upper_bound() {
      return Err(ValueObjectError::InvalidQuantity(format!(
        "Quantity must be less than {}",
        numeric_upper_bound()
      )));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

impl TryFrom<Decimal> for Quantity {
  type Error = ValueObjectError;

  fn try_from(value: Decimal) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<Quantity> for Decimal {
  fn from(quantity: Quantity) -> Self {
    quantity.0
  }
}

// Payment Terms - days between invoice date and due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct PaymentTerms(i32);

impl PaymentTerms {
  pub const DEFAULT_DAYS: i32 = 30;
  const MAX_DAYS: i32 = 3650;

  pub fn new(days: i32) -> Result<Self, ValueObjectError> {
    if days < 0 {
      return Err(ValueObjectError::InvalidPaymentTerms(
        "Payment terms must be non-negative".to_string(),
      ));
    }
    if days > Self::MAX_DAYS {
      return Err(ValueObjectError::InvalidPaymentTerms(format!(
        "Payment terms cannot exceed {} days",
        Self::MAX_DAYS
      )));
    }
    Ok(Self(days))
  }

  pub fn days(&self) -> i32 {
    self.0
  }
}

impl Default for PaymentTerms {
  fn default() -> Self {
    Self(Self::DEFAULT_DAYS)
  }
}

impl TryFrom<i32> for PaymentTerms {
  type Error = ValueObjectError;

  fn try_from(days: i32) -> Result<Self, Self::Error> {
    Self::new(days)
  }
}

impl From<PaymentTerms> for i32 {
  fn from(terms: PaymentTerms) -> Self {
    terms.0
  }
}

impl fmt::Display for PaymentTerms {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.0 {
      0 => write!(f, "Due on Receipt"),
      days => write!(f, "Net {}", days),
    }
  }
}

// Item Name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

impl ItemName {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidItemName(
        "Item name cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 255 {
      return Err(ValueObjectError::InvalidItemName(
        "Item name cannot exceed 255 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

impl TryFrom<String> for ItemName {
  type Error = ValueObjectError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<ItemName> for String {
  fn from(name: ItemName) -> Self {
    name.0
  }
}

// Customer Name - how a business labels one of its customers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerName(String);

impl CustomerName {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidCustomerName(
        "Customer name cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 255 {
      return Err(ValueObjectError::InvalidCustomerName(
        "Customer name cannot exceed 255 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_invoice_number() {
    assert!(InvoiceNumber::new("INV-001".to_string()).is_ok());
    assert!(InvoiceNumber::new("   ".to_string()).is_err());
    assert_eq!(
      InvoiceNumber::from_sequence("INV", 42).unwrap().value(),
      "INV-000042"
    );
    assert_eq!(
      InvoiceNumber::from_sequence("ACME", 1234567).unwrap().to_string(),
      "ACME-1234567"
    );
    assert!(InvoiceNumber::from_sequence("INV", 0).is_err());
  }

  #[test]
  fn test_invoice_status_transitions() {
    assert!(InvoiceStatus::Sent.can_transition_to(InvoiceStatus::Paid));
    assert!(InvoiceStatus::Sent.can_transition_to(InvoiceStatus::Overdue));
    assert!(InvoiceStatus::Overdue.can_transition_to(InvoiceStatus::Paid));

    assert!(!InvoiceStatus::Paid.can_transition_to(InvoiceStatus::Paid));
    assert!(!InvoiceStatus::Paid.can_transition_to(InvoiceStatus::Sent));
    assert!(!InvoiceStatus::Overdue.can_transition_to(InvoiceStatus::Sent));

    assert!(InvoiceStatus::Overdue.is_editable());
    assert!(!InvoiceStatus::Paid.is_editable());
  }

  #[test]
  fn test_invoice_status_parsing() {
    assert_eq!(InvoiceStatus::from_str("PAID").unwrap(), InvoiceStatus::Paid);
    assert!(InvoiceStatus::from_str("draft").is_err());
  }

  #[test]
  fn test_amount() {
    assert_eq!(Amount::new(dec!(100.50)).unwrap().value(), dec!(100.50));
    assert!(Amount::new(dec!(0)).is_ok());
    assert!(Amount::new(dec!(-10)).is_err());
    assert!(Amount::new(dec!(1.00001)).is_err());
    assert_eq!(Amount::new(dec!(12.5)).unwrap().to_string(), "12.50");
  }

  #[test]
  fn test_amount_arithmetic() {
    let price = Amount::new(dec!(10)).unwrap();
    let quantity = Quantity::new(dec!(2.5)).unwrap();
    assert_eq!(price.checked_multiply(&quantity).unwrap().value(), dec!(25));
    assert_eq!(price.checked_add(&price).unwrap().value(), dec!(20));
    assert_eq!(
      price.saturating_sub(&Amount::new(dec!(15)).unwrap()),
      Amount::zero()
    );
  }

  #[test]
  fn test_amount_deserialization_is_validated() {
    let ok: Amount = serde_json::from_str("\"12.50\"").unwrap();
    assert_eq!(ok.value(), dec!(12.50));
    assert!(serde_json::from_str::<Amount>("\"-1\"").is_err());
  }

  #[test]
  fn test_quantity() {
    assert!(Quantity::new(dec!(1)).is_ok());
    assert!(Quantity::new(dec!(0)).is_ok());
    assert!(Quantity::new(dec!(-1)).is_err());
    assert!(Quantity::new(dec!(1.12345)).is_err()); // Too many decimals
    assert_eq!(Quantity::new(dec!(2.50000)).unwrap().value(), dec!(2.5));
    assert!(Quantity::new(dec!(1000000000000000)).is_err());
  }

  #[test]
  fn test_amount_trailing_zeros_beyond_scale_are_accepted() {
    let amount = Amount::new(dec!(10.00000)).unwrap();
    assert_eq!(amount.value(), dec!(10));
    assert!(amount.value().scale() <= 4);
    assert_eq!(Amount::new(dec!(10.50)).unwrap().value().scale(), 2);
  }

  #[test]
  fn test_amount_is_bounded_by_column_range() {
    assert!(Amount::new(dec!(999999999999999.9999)).is_ok());
    assert!(Amount::new(dec!(1000000000000000)).is_err());
    assert!(Amount::new(Decimal::MAX).is_err());
    assert!(serde_json::from_str::<Amount>("\"1000000000000000\"").is_err());
  }

  #[test]
  fn test_amount_arithmetic_reports_overflow() {
    let large = Amount::new(dec!(999999999999999)).unwrap();
    let one = Amount::new(dec!(1)).unwrap();
    assert!(large.checked_add(&one).is_err());
    assert!(large.checked_multiply(&Quantity::new(dec!(2)).unwrap()).is_err());

    let huge_quantity = Quantity::new(dec!(999999999999999)).unwrap();
    assert!(matches!(
      large.checked_multiply(&huge_quantity),
      Err(ValueObjectError::InvalidAmount(_))
    ));
  }

  #[test]
  fn test_payment_terms() {
    assert_eq!(PaymentTerms::default().days(), 30);
    assert_eq!(PaymentTerms::new(45).unwrap().days(), 45);
    assert!(PaymentTerms::new(-1).is_err());
    assert!(PaymentTerms::new(5000).is_err());
    assert_eq!(PaymentTerms::new(0).unwrap().to_string(), "Due on Receipt");
    assert_eq!(PaymentTerms::new(15).unwrap().to_string(), "Net 15");
  }

  #[test]
  fn test_item_name() {
    assert_eq!(
      ItemName::new("  Widget ".to_string()).unwrap().value(),
      "Widget"
    );
    assert!(ItemName::new("".to_string()).is_err());
    assert!(ItemName::new("x".repeat(256)).is_err());
  }

  #[test]
  fn test_customer_name() {
    assert!(CustomerName::new("Acme Corp".to_string()).is_ok());
    assert!(CustomerName::new(" ".to_string()).is_err());
  }
}
