use crate::utils::error::{MegaOptimError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use url::Url;

/// Optional scheme, optional `www.`, a host containing at least one dot, a 2-6 letter TLD and
/// an optional path/query tail of RFC 3986 characters. Anchored on both ends, and the host
/// never contains `/`, so a local path such as `images/photo.jpg` is not a URL.
static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?i:https?://)?(?i:www\.)?",
        r"[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z]{2,6}\b",
        r"[-a-zA-Z0-9@:%_+.~#?&/=!$'()*,;\[\]]*$",
    ))
    .expect("URL shape pattern is valid")
});

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Shape check only, no network access.
pub fn is_valid_url(candidate: &str) -> bool {
    !candidate.is_empty() && URL_SHAPE.is_match(candidate)
}

/// True when the path points at an existing filesystem entry right now.
pub fn is_valid_file_path(candidate: impl AsRef<Path>) -> bool {
    let path = candidate.as_ref();
    !path.as_os_str().is_empty() && path.exists()
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(MegaOptimError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(MegaOptimError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(MegaOptimError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| MegaOptimError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MegaOptimError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MegaOptimError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
