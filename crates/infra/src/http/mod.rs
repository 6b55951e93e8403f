//! HTTP transport abstraction and its reqwest implementation

pub mod client;
pub mod transport;

pub use client::{ReqwestTransport, ReqwestTransportBuilder};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, RequestBody, TransportError};
