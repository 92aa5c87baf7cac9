use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::invoice::{Amount, ItemName, ItemSnapshot, LineItem, Quantity, ValueObjectError};

/// A line item as supplied by a caller, not yet validated
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInputDto {
  pub name: String,
  pub quantity: Decimal,
  pub unit_price: Decimal,
}

impl LineItemInputDto {
  pub fn into_snapshot(self) -> Result<ItemSnapshot, ValueObjectError> {
    Ok(ItemSnapshot::new(
      ItemName::new(self.name)?,
      Quantity::new(self.quantity)?,
      Amount::new(self.unit_price)?,
    ))
  }
}

/// Validates every item, failing on the first invalid one
pub fn into_snapshots(items: Vec<LineItemInputDto>) -> Result<Vec<ItemSnapshot>, ValueObjectError> {
  items.into_iter().map(LineItemInputDto::into_snapshot).collect()
}

/// Item values without identity: edit request snapshots and replacement results
#[derive(Debug, Clone, Serialize)]
pub struct ItemSnapshotDto {
  pub name: String,
  pub quantity: Decimal,
  pub unit_price: Decimal,
  pub total_price: Decimal,
}

impl TryFrom<&ItemSnapshot> for ItemSnapshotDto {
  type Error = ValueObjectError;

  fn try_from(item: &ItemSnapshot) -> Result<Self, Self::Error> {
    Ok(Self {
      name: item.name.value().to_string(),
      quantity: item.quantity.value(),
      unit_price: item.unit_price.value(),
      total_price: item.total_price()?.value(),
    })
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceLineItemDto {
  pub id: Uuid,
  pub name: String,
  pub quantity: Decimal,
  pub unit_price: Decimal,
  pub total_price: Decimal,
  pub line_order: i32,
}

impl TryFrom<&LineItem> for InvoiceLineItemDto {
  type Error = ValueObjectError;

  fn try_from(item: &LineItem) -> Result<Self, Self::Error> {
    Ok(Self {
      id: item.id,
      name: item.name.value().to_string(),
      quantity: item.quantity.value(),
      unit_price: item.unit_price.value(),
      total_price: item.total_price()?.value(),
      line_order: item.line_order,
    })
  }
}
