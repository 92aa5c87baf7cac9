pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::EditRequest;
pub use errors::{EditRequestEntityError, EditRequestError};
pub use ports::EditRequestRepository;
pub use services::{EditRequestService, RequestSubmission};
pub use value_objects::{EditRequestStatus, RequestMessage, StaleRequestPolicy};
