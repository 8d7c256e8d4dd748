use crate::adapters::http::ReqwestTransport;
use crate::config::ClientConfig;
use crate::core::poller::ResultPoller;
use crate::core::request::RequestBuilder;
use crate::domain::model::{OptimizationOptions, Resource, ServiceResponse, SubmissionPayload};
use crate::domain::ports::{Transport, TransportRequest, TransportResponse};
use crate::utils::error::{MegaOptimError, Result};
use crate::utils::validation::Validate;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Turns the outcome of a transport call into the response handed to the caller.
pub(crate) fn deliver(outcome: Result<TransportResponse>) -> ServiceResponse {
    match outcome {
        Ok(response) => {
            if !(200..300).contains(&response.status) {
                tracing::debug!("Service answered with HTTP {}", response.status);
            }
            ServiceResponse::parse(&response.body)
        }
        Err(e) => {
            tracing::warn!("❌ Request to MegaOptim failed: {}", e);
            ServiceResponse::error(format!("Request failed: {}", e))
        }
    }
}

/// Client for the MegaOptim optimization API.
///
/// Cheap to clone; clones share the configuration and transport. Concurrent calls are
/// independent of each other.
pub struct MegaOptim<T: Transport = ReqwestTransport> {
    config: Arc<ClientConfig>,
    transport: Arc<T>,
}

impl<T: Transport> Clone for MegaOptim<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl MegaOptim<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = match config.http_timeout() {
            Some(timeout) => ReqwestTransport::with_timeout(timeout)?,
            None => ReqwestTransport::new(),
        };
        Self::with_transport(config, transport)
    }

    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::new(api_key))
    }
}

impl<T: Transport> MegaOptim<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submits `resource` and, when the service answers `processing` and no `callback_url`
    /// was given, waits once on the result endpoint for up to `timeout_seconds`.
    ///
    /// `Err` is only returned for problems detected before anything is sent. Network and
    /// parse failures come back as `ServiceResponse::Error`.
    pub async fn optimize(
        &self,
        resource: impl Into<Resource>,
        options: &OptimizationOptions,
        timeout_seconds: u64,
    ) -> Result<ServiceResponse> {
        let payload = RequestBuilder::build(resource.into(), options)?;
        Ok(self.submit_and_follow(payload, timeout_seconds).await)
    }

    /// Callback form of [`optimize`](Self::optimize).
    ///
    /// The resource is validated before this returns, so an invalid resource is reported
    /// here and nothing is sent. The network part runs on a spawned task which calls
    /// `callback` exactly once. Must be called from within a Tokio runtime.
    pub fn optimize_with<F>(
        &self,
        resource: impl Into<Resource>,
        options: &OptimizationOptions,
        timeout_seconds: u64,
        callback: F,
    ) -> Result<JoinHandle<()>>
    where
        T: 'static,
        F: FnOnce(ServiceResponse) + Send + 'static,
    {
        let handle =
            tokio::runtime::Handle::try_current().map_err(|e| MegaOptimError::ConfigError {
                message: format!("optimize_with requires a Tokio runtime: {}", e),
            })?;
        let payload = RequestBuilder::build(resource.into(), options)?;
        let client = self.clone();

        Ok(handle.spawn(async move {
            let response = client.submit_and_follow(payload, timeout_seconds).await;
            callback(response);
        }))
    }

    /// Waits once on the result endpoint of an already submitted job.
    pub async fn fetch_result(&self, process_id: &str, timeout_seconds: u64) -> ServiceResponse {
        ResultPoller::new(&self.config, self.transport.as_ref())
            .fetch_result(process_id, timeout_seconds)
            .await
    }

    async fn submit_and_follow(
        &self,
        payload: SubmissionPayload,
        timeout_seconds: u64,
    ) -> ServiceResponse {
        let follow_up = !payload.options.has_callback_url();

        match self.submit(payload).await {
            ServiceResponse::Processing { process_id } if follow_up => {
                tracing::debug!("Process {} still running, polling once", process_id);
                self.fetch_result(&process_id, timeout_seconds).await
            }
            response => response,
        }
    }

    async fn submit(&self, payload: SubmissionPayload) -> ServiceResponse {
        let url = match self.config.optimize_url() {
            Ok(url) => url,
            Err(e) => return ServiceResponse::error(format!("Request failed: {}", e)),
        };

        tracing::info!(
            "📤 Submitting '{}' request with {} image(s)",
            payload.submission_type(),
            payload.resource.len()
        );
        let request = TransportRequest {
            url: url.to_string(),
            headers: self.config.headers(),
            form: payload.into_fields(),
        };

        let response = deliver(self.transport.post(request).await);
        tracing::info!("📥 Service status: {}", response.status());
        response
    }
}
