pub mod edit_request;
pub mod errors;
pub mod events;
pub mod identity;
pub mod invoice;

pub use errors::{ErrorKind, RepositoryError};
