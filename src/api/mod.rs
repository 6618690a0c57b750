pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpMessageSource;
pub use traits::MessageSource;
pub use types::ApiError;
