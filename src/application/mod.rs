//! Application layer
//!
//! Use cases translate primitive commands coming from the adapters into calls
//! on the ledger and edit-request services, and shape the results into
//! serialisable response DTOs.

pub mod edit_request;
pub mod invoice;
