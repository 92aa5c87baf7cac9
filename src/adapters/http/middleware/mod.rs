pub mod actor;
pub mod request_id;

pub use actor::{ActorExt, ActorMiddleware, USER_ID_HEADER};
pub use request_id::{RequestId, RequestIdExt, RequestIdMiddleware};
