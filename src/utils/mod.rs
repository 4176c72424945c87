pub mod error;

pub use error::{ApiError, ApiResult, ErrorResponse, MISSING_FIELDS_MESSAGE};
