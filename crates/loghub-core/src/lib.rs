//! Core types, configuration, and validation for LogHub.
//!
//! This crate provides the foundational building blocks shared across the
//! LogHub provisioning crates: AWS account/region identifiers, structured
//! ARN construction, late-bound attribute references, resource naming
//! validation, and the common error taxonomy.

mod config;
mod error;
mod token;
mod types;
mod validation;

pub use config::LogHubConfig;
pub use error::{LogHubError, LogHubResult};
pub use token::{AttrRef, Value};
pub use types::{AccountId, Arn, AwsRegion};
pub use validation::validate_bucket_name;
