use crate::domain::model::FormValue;
use crate::utils::error::Result;
use async_trait::async_trait;

/// A POST request with multipart form semantics. An empty `form` means no body.
#[derive(Debug)]
pub struct TransportRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, FormValue)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Request/response capability used to reach the optimization service.
///
/// Implementations own any streams handed to them in the form and must release them once the
/// request completes. An `Err` means the service could not be reached at all; HTTP error
/// statuses are returned as responses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse>;
}

