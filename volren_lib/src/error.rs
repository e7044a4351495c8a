use thiserror::Error;

/// Fatal initialization errors.
///
/// Every variant aborts session setup; there are no retries. Once a
/// [`Renderer`](crate::render::Renderer) has been constructed, no per-frame
/// error path exists.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The output surface or its off-screen targets could not be acquired.
    #[error("rendering context unavailable: {reason}")]
    ContextUnavailable { reason: String },

    /// A render pass failed validation while being built.
    /// Carries the diagnostic text verbatim.
    #[error("pipeline build failed: {reason}")]
    PipelineBuild { reason: String },

    /// The volume asset could not be read, or its contents did not match
    /// the descriptor.
    #[error("cannot retrieve volume asset '{asset}': {reason}")]
    AssetRetrieval { asset: String, reason: String },
}
