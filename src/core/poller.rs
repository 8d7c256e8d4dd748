use crate::config::ClientConfig;
use crate::domain::model::ServiceResponse;
use crate::domain::ports::{Transport, TransportRequest};

/// Single bounded-wait query against the result endpoint of a job.
///
/// The service holds the connection for up to `timeout_seconds`. A second `processing` reply
/// is returned to the caller as-is; there is no retry loop.
pub struct ResultPoller<'a, T: Transport> {
    config: &'a ClientConfig,
    transport: &'a T,
}

impl<'a, T: Transport> ResultPoller<'a, T> {
    pub fn new(config: &'a ClientConfig, transport: &'a T) -> Self {
        Self { config, transport }
    }

    pub async fn fetch_result(&self, process_id: &str, timeout_seconds: u64) -> ServiceResponse {
        let url = match self.config.result_url(process_id, timeout_seconds) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot build result URL for {}: {}", process_id, e);
                return ServiceResponse::error(format!("Request failed: {}", e));
            }
        };

        tracing::info!(
            "⏳ Waiting up to {}s for result of process {}",
            timeout_seconds,
            process_id
        );
        let request = TransportRequest {
            url: url.to_string(),
            headers: self.config.headers(),
            form: Vec::new(),
        };

        crate::core::client::deliver(self.transport.post(request).await)
    }
}
