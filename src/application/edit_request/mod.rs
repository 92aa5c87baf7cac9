pub mod get_edit_request;
pub mod list_edit_requests;
pub mod review_edit_request;
pub mod submit_edit_request;

pub use get_edit_request::{EditRequestDto, GetEditRequestCommand, GetEditRequestUseCase};
pub use list_edit_requests::{
  EditRequestScope, ListEditRequestsCommand, ListEditRequestsResponse, ListEditRequestsUseCase,
};
pub use review_edit_request::{
  ReviewDecision, ReviewEditRequestCommand, ReviewEditRequestResponse, ReviewEditRequestUseCase,
  ReviewedInvoiceDto,
};
pub use submit_edit_request::{SubmitEditRequestCommand, SubmitEditRequestUseCase};
