pub mod create_invoice;
pub mod get_invoice_details;
pub mod line_items;
pub mod list_customers;
pub mod list_invoices;
pub mod mark_invoice_paid;
pub mod mark_overdue_invoices;
pub mod register_customer;
pub mod replace_invoice_items;
pub mod update_payment_terms;

pub use create_invoice::{CreateInvoiceCommand, CreateInvoiceResponse, CreateInvoiceUseCase};
pub use get_invoice_details::{
  GetInvoiceDetailsCommand, GetInvoiceDetailsUseCase, InvoiceDetailsResponse, InvoiceTotalsDto,
  PaymentDto,
};
pub use line_items::{InvoiceLineItemDto, ItemSnapshotDto, LineItemInputDto, into_snapshots};
pub use list_customers::{ListCustomersCommand, ListCustomersResponse, ListCustomersUseCase};
pub use list_invoices::{
  InvoiceListItemDto, ListInvoicesCommand, ListInvoicesResponse, ListInvoicesUseCase,
};
pub use mark_invoice_paid::{
  MarkInvoicePaidCommand, MarkInvoicePaidResponse, MarkInvoicePaidUseCase,
};
pub use mark_overdue_invoices::{
  MarkOverdueInvoicesCommand, MarkOverdueInvoicesResponse, MarkOverdueInvoicesUseCase,
};
pub use register_customer::{CustomerDto, RegisterCustomerCommand, RegisterCustomerUseCase};
pub use replace_invoice_items::{
  ReplaceInvoiceItemsCommand, ReplaceInvoiceItemsResponse, ReplaceInvoiceItemsUseCase,
};
pub use update_payment_terms::{UpdatePaymentTermsCommand, UpdatePaymentTermsUseCase};
