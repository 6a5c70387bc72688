//! The LogHub provisioning units.
//!
//! [`DestinationStack`] assembles the receiving side of the cross-account
//! pipeline: storage bucket, transform-and-deliver stream, and a named,
//! cross-account-authorized log destination. [`SourceStack`] binds one log
//! group in a source account to a destination ARN produced by a prior
//! [`DestinationStack`] run.

mod destination;
mod source;

pub use destination::{
    AUDIT_LOG_GROUP, AUDIT_LOG_STREAM, BUCKET_NAME_PREFIX, DESTINATION_NAME, DestinationStack,
    ERROR_OUTPUT_PREFIX, LOG_DESTINATION_OUTPUT, OUTPUT_PREFIX, TRANSFORM_FUNCTION_NAME,
    TRANSFORM_TIMEOUT_SECONDS,
};
pub use source::SourceStack;
