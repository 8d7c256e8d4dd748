//! Classification of caller resources into wire-ready shapes.

use crate::domain::model::{ImageStream, Resource, ResolvedResource, ResourceItem};
use crate::utils::error::{MegaOptimError, Result};
use crate::utils::validation::{is_valid_file_path, is_valid_url};

impl ResourceItem {
    pub fn is_valid_url(&self) -> bool {
        match self {
            Self::Text(text) => is_valid_url(text),
            Self::Path(_) | Self::Stream(_) => false,
        }
    }

    /// Streams always qualify; strings and paths must exist on disk at call time.
    pub fn is_valid_file_path(&self) -> bool {
        match self {
            Self::Text(text) => is_valid_file_path(text),
            Self::Path(path) => is_valid_file_path(path),
            Self::Stream(_) => true,
        }
    }

    fn into_url(self) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Path(_) | Self::Stream(_) => Err(MegaOptimError::invalid_resource()),
        }
    }

    fn into_stream(self) -> Result<ImageStream> {
        match self {
            Self::Text(text) => Ok(ImageStream::open(text)?),
            Self::Path(path) => Ok(ImageStream::open(path)?),
            Self::Stream(stream) => Ok(stream),
        }
    }
}

/// URL check first, then file check.
pub fn classify_single(item: ResourceItem) -> Result<ResolvedResource> {
    if item.is_valid_url() {
        return Ok(ResolvedResource::SingleUrl(item.into_url()?));
    }
    if item.is_valid_file_path() {
        return Ok(ResolvedResource::SingleFile(item.into_stream()?));
    }
    Err(MegaOptimError::invalid_resource())
}

/// All-URL batches win over all-file batches; mixed batches are rejected.
///
/// Length is not bounded here, see `RequestBuilder::build`.
pub fn classify_batch(items: Vec<ResourceItem>) -> Result<ResolvedResource> {
    if items.is_empty() {
        return Err(MegaOptimError::EmptyBatch);
    }

    if items.iter().all(ResourceItem::is_valid_url) {
        let urls = items
            .into_iter()
            .map(ResourceItem::into_url)
            .collect::<Result<Vec<_>>>()?;
        return Ok(ResolvedResource::UrlBatch(urls));
    }

    if items.iter().all(ResourceItem::is_valid_file_path) {
        let streams = items
            .into_iter()
            .map(ResourceItem::into_stream)
            .collect::<Result<Vec<_>>>()?;
        return Ok(ResolvedResource::FileBatch(streams));
    }

    Err(MegaOptimError::invalid_resource())
}

pub fn resolve(resource: Resource) -> Result<ResolvedResource> {
    match resource {
        Resource::Single(item) => classify_single(item),
        Resource::Batch(items) => classify_batch(items),
    }
}
