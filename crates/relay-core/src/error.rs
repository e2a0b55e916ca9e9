use thiserror::Error;

use crate::target::ColorComponentType;

/// Errors surfaced by the relay pipeline. Configuration and binding errors
/// abort the run before any draw is issued; introspection lookup misses are
/// not errors (they render as `"? (code)"` in the report).
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(
        "capture target is {capture:?} but the composite destination is {composite:?}; \
         the screen-to-texel mapping would misalign"
    )]
    ResolutionMismatch {
        capture: (u32, u32),
        composite: (u32, u32),
    },

    #[error("relay target component type {component:?} cannot represent the relayed depth range")]
    DepthRangeUnrepresentable { component: ColorComponentType },

    #[error("target '{label}' is a sampler source of the same pass graph and cannot be bound as destination")]
    TargetBoundAsSampler { label: String },

    #[error("target '{label}' has no sampleable depth attachment")]
    MissingDepthAttachment { label: String },

    #[error("readback requested {requested:?} elements but the target stores {stored:?}")]
    ReadbackTypeMismatch {
        stored: ColorComponentType,
        requested: ColorComponentType,
    },

    #[error("pixel readback failed: {reason}")]
    ReadbackFailed { reason: String },
}
