pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::http::ReqwestTransport;
pub use config::{toml_config::TomlConfig, ClientConfig};
pub use core::{
    client::MegaOptim,
    request::{RequestBuilder, MAX_BATCH_SIZE},
    resolver::{classify_batch, classify_single},
};
pub use domain::model::{
    FormValue, ImageStream, OptimizationOptions, OptimizedImage, ResolvedResource, Resource,
    ResourceItem, ServiceResponse, SubmissionPayload, SubmissionType,
};
pub use domain::ports::{Transport, TransportRequest, TransportResponse};
pub use utils::error::{MegaOptimError, Result};
pub use utils::validation::{is_valid_file_path, is_valid_url};
