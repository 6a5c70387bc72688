//! Validation for derived resource names.
//!
//! The storage bucket name is derived from the destination account ID, so it
//! is validated at declaration time rather than waiting for the backend to
//! reject it asynchronously. Rules follow the
//! [Amazon S3 documentation](https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html).

use std::net::Ipv4Addr;

use crate::LogHubError;

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;

/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

/// Validate an S3 bucket name.
///
/// Rules (per AWS documentation):
/// - 3-63 characters long
/// - Only lowercase letters, numbers, hyphens, and dots
/// - Must start and end with a letter or number
/// - No consecutive dots (`..`)
/// - Not formatted as an IPv4 address (e.g. `192.168.0.1`)
///
/// # Errors
///
/// Returns [`LogHubError::InvalidBucketName`] if any rule is violated.
///
/// # Examples
///
/// ```
/// use loghub_core::validate_bucket_name;
///
/// assert!(validate_bucket_name("central-logs-111111111111").is_ok());
/// assert!(validate_bucket_name("AB").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> Result<(), LogHubError> {
    let len = name.len();

    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(LogHubError::InvalidBucketName {
            name: name.to_owned(),
            reason: format!(
                "bucket name must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters long"
            ),
        });
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(LogHubError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must only contain lowercase letters, numbers, hyphens, and dots"
                .to_owned(),
        });
    }

    let first = name.as_bytes()[0];
    let last = name.as_bytes()[len - 1];
    if !(first.is_ascii_lowercase() || first.is_ascii_digit())
        || !(last.is_ascii_lowercase() || last.is_ascii_digit())
    {
        return Err(LogHubError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must start and end with a letter or number".to_owned(),
        });
    }

    if name.contains("..") {
        return Err(LogHubError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must not contain consecutive dots".to_owned(),
        });
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(LogHubError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must not be formatted as an IP address".to_owned(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_accept_derived_bucket_name() {
        assert!(validate_bucket_name("central-logs-111111111111").is_ok());
    }

    #[test]
    fn test_should_reject_short_and_long_names() {
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_should_reject_uppercase_and_bad_chars() {
        assert!(validate_bucket_name("Central-Logs").is_err());
        assert!(validate_bucket_name("central_logs").is_err());
    }

    #[test]
    fn test_should_reject_bad_edges() {
        assert!(validate_bucket_name("-central-logs").is_err());
        assert!(validate_bucket_name("central-logs-").is_err());
    }

    #[test]
    fn test_should_reject_consecutive_dots_and_ip_form() {
        assert!(validate_bucket_name("central..logs").is_err());
        assert!(validate_bucket_name("192.168.0.1").is_err());
    }
}
