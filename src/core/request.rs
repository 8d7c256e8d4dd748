use crate::core::resolver;
use crate::domain::model::{OptimizationOptions, Resource, SubmissionPayload};
use crate::utils::error::{MegaOptimError, Result};

/// Positional slots the service defines for batches (`url1..url5`, `file1..file5`).
pub const MAX_BATCH_SIZE: usize = 5;

pub struct RequestBuilder;

impl RequestBuilder {
    /// Merges defaults into a copy of `options` and classifies `resource`.
    ///
    /// Fails before anything is sent if the resource is unusable or the batch has more items
    /// than there are positional slots.
    pub fn build(resource: Resource, options: &OptimizationOptions) -> Result<SubmissionPayload> {
        if let Resource::Batch(items) = &resource {
            if items.len() > MAX_BATCH_SIZE {
                return Err(MegaOptimError::BatchTooLarge {
                    count: items.len(),
                    max: MAX_BATCH_SIZE,
                });
            }
        }

        let resolved = resolver::resolve(resource)?;
        tracing::debug!(
            "Resolved resource as '{}' with {} item(s)",
            resolved.submission_type(),
            resolved.len()
        );

        Ok(SubmissionPayload {
            options: options.with_defaults(),
            resource: resolved,
        })
    }
}
