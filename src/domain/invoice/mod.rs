pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{
  CustomerAccount, Invoice, InvoiceDetails, InvoiceTotals, ItemReplacement, ItemSnapshot, LineItem,
  Payment, items_total,
};
pub use errors::{InvoiceEntityError, InvoiceError};
pub use ports::{CustomerAccountRepository, InvoiceRepository};
pub use services::{CustomerRegistration, InvoiceData, LedgerService, LedgerSettings};
pub use value_objects::{
  Amount, CustomerName, InvoiceNumber, InvoiceStatus, ItemName, PaymentTerms, Quantity,
  ValueObjectError,
};
