use crate::domain::model::{FormValue, ImageStream};
use crate::domain::ports::{Transport, TransportRequest, TransportResponse};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use tokio::io::AsyncReadExt;

const DEFAULT_FILE_NAME: &str = "image";

/// `Transport` backed by a shared `reqwest::Client`, sending multipart form bodies.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn stream_part(stream: ImageStream) -> Result<Part> {
        let file_name = stream
            .file_name()
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        // 讀完整個內容，讓 part 帶有已知長度
        let mut bytes = Vec::new();
        stream.into_reader().read_to_end(&mut bytes).await?;

        tracing::debug!("Attaching {} ({} bytes)", file_name, bytes.len());
        Ok(Part::bytes(bytes).file_name(file_name))
    }

    async fn build_form(fields: Vec<(String, FormValue)>) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in fields {
            form = match value {
                FormValue::Text(text) => form.text(name, text),
                FormValue::Stream(stream) => form.part(name, Self::stream_part(stream).await?),
            };
        }
        Ok(form)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse> {
        let TransportRequest { url, headers, form } = request;

        let mut builder = self.client.post(&url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !form.is_empty() {
            builder = builder.multipart(Self::build_form(form).await?);
        }

        tracing::debug!("POST {}", url);
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        let body = response.bytes().await?.to_vec();
        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}
