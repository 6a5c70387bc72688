//! IAM policy document model for LogHub.
//!
//! Provides [`PolicyDocument`], [`Statement`], [`Principal`], and [`Effect`],
//! serializing to the exact AWS policy JSON wire shape
//! (`"Version": "2012-10-17"`, PascalCase keys, single-element action and
//! resource lists collapsed to plain strings).

mod policy;

pub use policy::{Effect, InlinePolicy, PolicyDocument, Principal, Statement};
