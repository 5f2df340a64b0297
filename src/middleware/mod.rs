pub mod auth;
pub mod response;

pub use auth::require_api_key;
pub use response::{ApiResponse, ApiResult};
