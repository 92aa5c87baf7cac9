//! billdesk: invoice ledger and customer edit-request workflow.
//!
//! Businesses issue invoices to their customers and mark them paid; customers
//! propose line-item changes that a business approves or rejects. The crate is
//! laid out in four layers:
//!
//! - [`domain`]: entities, value objects, ports and the two core services
//!   ([`domain::invoice::LedgerService`] and
//!   [`domain::edit_request::EditRequestService`])
//! - [`application`]: use cases translating primitive commands into service calls
//! - [`infrastructure`]: configuration, postgres/memory storage, event publishers
//! - [`adapters`]: the JSON HTTP API

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;
