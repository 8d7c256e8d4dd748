use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;

/// Message delivered when a response body cannot be understood.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse JSON response.";

/// Owned byte stream for an image that is not addressed by URL.
pub struct ImageStream {
    file_name: Option<String>,
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl ImageStream {
    pub fn new(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            file_name: None,
            reader: Box::new(reader),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Opens a read stream over a local file, named after the file.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let stream = Self::new(tokio::fs::File::from_std(file));
        Ok(match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => stream.with_file_name(name),
            None => stream,
        })
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        self.reader
    }
}

impl fmt::Debug for ImageStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageStream")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// One caller-supplied image reference.
#[derive(Debug)]
pub enum ResourceItem {
    /// A string that may be a URL or a local path; URL shape wins.
    Text(String),
    Path(PathBuf),
    Stream(ImageStream),
}

impl From<&str> for ResourceItem {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ResourceItem {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<PathBuf> for ResourceItem {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for ResourceItem {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<ImageStream> for ResourceItem {
    fn from(value: ImageStream) -> Self {
        Self::Stream(value)
    }
}

#[derive(Debug)]
pub enum Resource {
    Single(ResourceItem),
    Batch(Vec<ResourceItem>),
}

impl From<ResourceItem> for Resource {
    fn from(value: ResourceItem) -> Self {
        Self::Single(value)
    }
}

macro_rules! single_resource_from {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Resource {
                fn from(value: $source) -> Self {
                    Self::Single(value.into())
                }
            }
        )*
    };
}

single_resource_from!(&str, String, PathBuf, &Path, ImageStream);

impl<T: Into<ResourceItem>> From<Vec<T>> for Resource {
    fn from(values: Vec<T>) -> Self {
        Self::Batch(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionType {
    Url,
    File,
    Urls,
    Files,
}

impl SubmissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::File => "file",
            Self::Urls => "urls",
            Self::Files => "files",
        }
    }
}

impl fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource after classification, ready to be placed on the wire.
#[derive(Debug)]
pub enum ResolvedResource {
    SingleUrl(String),
    SingleFile(ImageStream),
    UrlBatch(Vec<String>),
    FileBatch(Vec<ImageStream>),
}

impl ResolvedResource {
    pub fn submission_type(&self) -> SubmissionType {
        match self {
            Self::SingleUrl(_) => SubmissionType::Url,
            Self::SingleFile(_) => SubmissionType::File,
            Self::UrlBatch(_) => SubmissionType::Urls,
            Self::FileBatch(_) => SubmissionType::Files,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::SingleUrl(_) | Self::SingleFile(_) => 1,
            Self::UrlBatch(urls) => urls.len(),
            Self::FileBatch(files) => files.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub const OPTION_COMPRESSION: &str = "compression";
pub const OPTION_KEEP_EXIF: &str = "keep_exif";
pub const OPTION_CMYK_TO_RGB: &str = "cmyktorgb";
pub const OPTION_MAX_WIDTH: &str = "max_width";
pub const OPTION_MAX_HEIGHT: &str = "max_height";
pub const OPTION_CALLBACK_URL: &str = "callback_url";

pub const DEFAULT_OPTIONS: [(&str, &str); 5] = [
    (OPTION_COMPRESSION, "intelligent"),
    (OPTION_KEEP_EXIF, "1"),
    (OPTION_CMYK_TO_RGB, "1"),
    (OPTION_MAX_WIDTH, "0"),
    (OPTION_MAX_HEIGHT, "0"),
];

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Optimization parameters sent alongside the resource. Unknown keys pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptimizationOptions {
    values: BTreeMap<String, String>,
}

impl OptimizationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn compression(self, level: impl Into<String>) -> Self {
        self.set(OPTION_COMPRESSION, level)
    }

    pub fn keep_exif(self, keep: bool) -> Self {
        self.set(OPTION_KEEP_EXIF, flag(keep))
    }

    pub fn cmyk_to_rgb(self, convert: bool) -> Self {
        self.set(OPTION_CMYK_TO_RGB, flag(convert))
    }

    pub fn max_width(self, width: u32) -> Self {
        self.set(OPTION_MAX_WIDTH, width.to_string())
    }

    pub fn max_height(self, height: u32) -> Self {
        self.set(OPTION_MAX_HEIGHT, height.to_string())
    }

    pub fn callback_url(self, url: impl Into<String>) -> Self {
        self.set(OPTION_CALLBACK_URL, url)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn has_callback_url(&self) -> bool {
        self.contains_key(OPTION_CALLBACK_URL)
    }

    /// Returns a copy with documented defaults filled in for absent keys only.
    pub fn with_defaults(&self) -> Self {
        let mut merged = self.clone();
        for (key, value) in DEFAULT_OPTIONS {
            merged
                .values
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OptimizationOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Value of a multipart form field.
#[derive(Debug)]
pub enum FormValue {
    Text(String),
    Stream(ImageStream),
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Stream(_) => None,
        }
    }
}

/// Merged options plus the classified resource; the complete body of a submission.
#[derive(Debug)]
pub struct SubmissionPayload {
    pub options: OptimizationOptions,
    pub resource: ResolvedResource,
}

impl SubmissionPayload {
    pub fn submission_type(&self) -> SubmissionType {
        self.resource.submission_type()
    }

    /// Flattens into wire fields: options, `type`, then `url`/`file` or `url1..`/`file1..`.
    pub fn into_fields(self) -> Vec<(String, FormValue)> {
        let submission_type = self.submission_type();
        let mut fields: Vec<(String, FormValue)> = self
            .options
            .iter()
            .filter(|(key, _)| *key != "type")
            .map(|(key, value)| (key.to_string(), FormValue::Text(value.to_string())))
            .collect();
        fields.push((
            "type".to_string(),
            FormValue::Text(submission_type.as_str().to_string()),
        ));

        match self.resource {
            ResolvedResource::SingleUrl(url) => {
                fields.push(("url".to_string(), FormValue::Text(url)));
            }
            ResolvedResource::SingleFile(stream) => {
                fields.push(("file".to_string(), FormValue::Stream(stream)));
            }
            ResolvedResource::UrlBatch(urls) => {
                for (index, url) in urls.into_iter().enumerate() {
                    fields.push((format!("url{}", index + 1), FormValue::Text(url)));
                }
            }
            ResolvedResource::FileBatch(streams) => {
                for (index, stream) in streams.into_iter().enumerate() {
                    fields.push((format!("file{}", index + 1), FormValue::Stream(stream)));
                }
            }
        }

        fields
    }
}

fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedImage {
    #[serde(deserialize_with = "number_or_string")]
    pub saved_percent: f64,
    pub url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawResult {
    Keyed(BTreeMap<String, OptimizedImage>),
    Listed(Vec<OptimizedImage>),
}

impl From<RawResult> for BTreeMap<String, OptimizedImage> {
    fn from(raw: RawResult) -> Self {
        match raw {
            RawResult::Keyed(map) => map,
            RawResult::Listed(list) => list
                .into_iter()
                .enumerate()
                .map(|(index, image)| (index.to_string(), image))
                .collect(),
        }
    }
}

/// Reply from the optimize or result endpoint, classified by `status`.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceResponse {
    Processing {
        process_id: String,
    },
    Ok {
        result: BTreeMap<String, OptimizedImage>,
    },
    Error {
        errors: Vec<String>,
    },
    /// Any status this client does not recognise, kept verbatim.
    Other {
        status: String,
        body: serde_json::Value,
    },
}

impl ServiceResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            errors: vec![message.into()],
        }
    }

    pub fn parse_failure() -> Self {
        Self::error(PARSE_FAILURE_MESSAGE)
    }

    /// Parses a raw body. Anything that is not a JSON object with a string `status`, or whose
    /// known status lacks its required fields, becomes the parse-failure error response.
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) => Self::from_value(value).unwrap_or_else(|reason| {
                tracing::warn!("Unexpected response shape: {}", reason);
                Self::parse_failure()
            }),
            Err(e) => {
                tracing::warn!("Response body is not JSON: {}", e);
                Self::parse_failure()
            }
        }
    }

    fn from_value(value: serde_json::Value) -> std::result::Result<Self, String> {
        let status = value
            .get("status")
            .and_then(|s| s.as_str())
            .ok_or_else(|| "missing string field 'status'".to_string())?
            .to_string();

        match status.as_str() {
            "processing" => {
                let process_id = match value.get("process_id") {
                    Some(serde_json::Value::String(id)) => id.clone(),
                    Some(serde_json::Value::Number(id)) => id.to_string(),
                    _ => return Err("processing response without 'process_id'".to_string()),
                };
                Ok(Self::Processing { process_id })
            }
            "ok" => {
                let result = match value.get("result") {
                    Some(serde_json::Value::Null) | None => BTreeMap::new(),
                    Some(raw) => RawResult::deserialize(raw)
                        .map_err(|e| format!("invalid 'result': {}", e))?
                        .into(),
                };
                Ok(Self::Ok { result })
            }
            "error" => {
                let errors = match value.get("errors") {
                    Some(serde_json::Value::Array(items)) => items
                        .iter()
                        .map(|item| match item {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                    Some(serde_json::Value::String(s)) => vec![s.clone()],
                    _ => Vec::new(),
                };
                Ok(Self::Error { errors })
            }
            _ => Ok(Self::Other {
                status,
                body: value,
            }),
        }
    }

    pub fn status(&self) -> &str {
        match self {
            Self::Processing { .. } => "processing",
            Self::Ok { .. } => "ok",
            Self::Error { .. } => "error",
            Self::Other { status, .. } => status,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing { .. })
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn process_id(&self) -> Option<&str> {
        match self {
            Self::Processing { process_id } => Some(process_id),
            _ => None,
        }
    }
}
