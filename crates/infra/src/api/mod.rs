//! Request building and response classification

pub mod executor;
pub mod request;

pub use executor::RequestExecutor;
pub use request::{BodyEncoding, RequestOptions};
