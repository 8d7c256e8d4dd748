use crate::config::ClientConfig;
use crate::domain::model::OptimizationOptions;
use crate::utils::error::Result;
use crate::utils::validation::{validate_required_field, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Layout of a `megaoptim.toml` file.
///
/// ```toml
/// [client]
/// api_key = "${MEGAOPTIM_API_KEY}"
/// http_timeout_seconds = 120
///
/// [options]
/// compression = "lossy"
/// keep_exif = "0"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub options: OptimizationOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub http_timeout_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${MEGAOPTIM_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Builds a validated client configuration. `api_key_override` wins over the file.
    pub fn client_config(&self, api_key_override: Option<String>) -> Result<ClientConfig> {
        let api_key = api_key_override.or_else(|| self.client.api_key.clone());
        let api_key = validate_required_field("client.api_key", &api_key)?;

        let mut config = ClientConfig::new(api_key.clone());
        if let Some(base_url) = &self.client.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(user_agent) = &self.client.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        if let Some(seconds) = self.client.http_timeout_seconds {
            config = config.with_http_timeout(seconds);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::MegaOptimError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_file() {
        let config = TomlConfig::from_toml_str(
            r#"
[client]
api_key = "abc"
base_url = "http://localhost:8080/v1"
http_timeout_seconds = 30

[options]
compression = "lossy"
webp = "1"
"#,
        )
        .unwrap();

        assert_eq!(config.options.get("compression"), Some("lossy"));
        assert_eq!(config.options.get("webp"), Some("1"));

        let client = config.client_config(None).unwrap();
        assert_eq!(client.api_key, "abc");
        assert_eq!(client.base_url, "http://localhost:8080/v1/");
        assert_eq!(client.http_timeout_seconds, Some(30));
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("MEGAOPTIM_TEST_TOML_KEY", "from-env");
        let config = TomlConfig::from_toml_str(
            r#"
[client]
api_key = "${MEGAOPTIM_TEST_TOML_KEY}"
"#,
        )
        .unwrap();
        assert_eq!(config.client.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_missing_api_key() {
        let config = TomlConfig::from_toml_str("[options]\ncompression = \"lossless\"\n").unwrap();
        assert!(matches!(
            config.client_config(None),
            Err(MegaOptimError::MissingConfigError { .. })
        ));
        assert!(config.client_config(Some("cli-key".to_string())).is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[client]\napi_key = \"file-key\"").unwrap();
        let config = TomlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.client.api_key.as_deref(), Some("file-key"));
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            TomlConfig::from_toml_str("[client\napi_key ="),
            Err(MegaOptimError::TomlError(_))
        ));
    }
}
