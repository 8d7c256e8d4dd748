use crate::config::toml_config::TomlConfig;
use crate::config::{ClientConfig, API_KEY_ENV};
use crate::domain::model::{OptimizationOptions, Resource, ResourceItem};
use crate::utils::error::{MegaOptimError, Result};
use crate::utils::logger::Verbosity;
use crate::utils::validation::{is_valid_file_path, validate_range};
use clap::Parser;
use std::path::PathBuf;

/// Longest wait the result endpoint accepts.
pub const MAX_TIMEOUT_SECONDS: u64 = 3600;

#[derive(Debug, Clone, Parser)]
#[command(name = "megaoptim")]
#[command(about = "Optimize images with the MegaOptim API")]
pub struct CliArgs {
    /// Image URLs or local paths (up to 5)
    #[arg(required = true)]
    pub resources: Vec<String>,

    #[arg(long, help = "API key (defaults to $MEGAOPTIM_API_KEY or the config file)")]
    pub api_key: Option<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "intelligent, ultra, lossy or lossless")]
    pub compression: Option<String>,

    #[arg(long)]
    pub keep_exif: Option<bool>,

    #[arg(long)]
    pub cmyktorgb: Option<bool>,

    #[arg(long)]
    pub max_width: Option<u32>,

    #[arg(long)]
    pub max_height: Option<u32>,

    #[arg(long, help = "Let the service notify this URL instead of waiting for the result")]
    pub callback_url: Option<String>,

    #[arg(long = "option", value_name = "KEY=VALUE", help = "Extra API parameter, repeatable")]
    pub extra_options: Vec<String>,

    #[arg(long, default_value = "300", help = "Seconds to wait for the result")]
    pub timeout: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, short, help = "Only log warnings and errors")]
    pub quiet: bool,
}

impl CliArgs {
    fn file_config(&self) -> Result<TomlConfig> {
        match &self.config {
            Some(path) => TomlConfig::from_file(path),
            None => Ok(TomlConfig::default()),
        }
    }

    /// Flag > environment > config file.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let file = self.file_config()?;
        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok());
        file.client_config(api_key)
    }

    /// Config-file options overlaid with command-line flags.
    pub fn options(&self) -> Result<OptimizationOptions> {
        let mut options = self.file_config()?.options;

        if let Some(compression) = &self.compression {
            options = options.compression(compression.clone());
        }
        if let Some(keep) = self.keep_exif {
            options = options.keep_exif(keep);
        }
        if let Some(convert) = self.cmyktorgb {
            options = options.cmyk_to_rgb(convert);
        }
        if let Some(width) = self.max_width {
            options = options.max_width(width);
        }
        if let Some(height) = self.max_height {
            options = options.max_height(height);
        }
        if let Some(url) = &self.callback_url {
            options = options.callback_url(url.clone());
        }
        for pair in &self.extra_options {
            let (key, value) =
                pair.split_once('=')
                    .ok_or_else(|| MegaOptimError::InvalidConfigValueError {
                        field: "option".to_string(),
                        value: pair.clone(),
                        reason: "Expected KEY=VALUE".to_string(),
                    })?;
            options = options.set(key.trim(), value.trim());
        }

        Ok(options)
    }

    /// Arguments naming an existing file are sent as files even if they look like a URL.
    pub fn resource(&self) -> Resource {
        let items: Vec<ResourceItem> = self
            .resources
            .iter()
            .map(|arg| {
                if is_valid_file_path(arg) {
                    ResourceItem::Path(PathBuf::from(arg))
                } else {
                    ResourceItem::Text(arg.clone())
                }
            })
            .collect();

        match <[ResourceItem; 1]>::try_from(items) {
            Ok([single]) => Resource::Single(single),
            Err(items) => Resource::Batch(items),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    pub fn validate_timeout(&self) -> Result<()> {
        validate_range("timeout", self.timeout, 0, MAX_TIMEOUT_SECONDS)
    }
}
