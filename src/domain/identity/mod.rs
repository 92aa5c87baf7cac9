pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::{Actor, Role};
pub use errors::IdentityError;
pub use ports::IdentityProvider;
