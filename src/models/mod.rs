pub mod request;
pub mod response;

pub use request::UploadedFile;
pub use response::{ErrorResponse, ExtractReply, ExtractResponse};
