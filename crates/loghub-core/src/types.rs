//! Common AWS type definitions shared across the provisioning crates.

use std::fmt;

/// AWS Account ID (12-digit string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account ID from a string.
    ///
    /// # Errors
    /// Returns an error if the account ID is not a 12-digit numeric string.
    /// An empty string is rejected here, before any resource is declared.
    pub fn new(id: impl Into<String>) -> Result<Self, crate::LogHubError> {
        let id = id.into();
        if id.len() != 12 || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(crate::LogHubError::InvalidAccountId(id));
        }
        Ok(Self(id))
    }

    /// Get the account ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// AWS Region identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AwsRegion(String);

impl AwsRegion {
    /// Default region when none is configured.
    pub const DEFAULT: &str = "us-east-1";

    /// Create a new region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AwsRegion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A structured Amazon Resource Name.
///
/// The same constructor is used both to predict a resource's future ARN
/// (when authoring a policy that must name the resource before it exists)
/// and to report the ARN once provisioning completes, so the two can never
/// drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn {
    partition: String,
    service: String,
    region: String,
    account: String,
    resource: String,
}

impl Arn {
    /// Build an ARN in the `aws` partition.
    #[must_use]
    pub fn new(
        service: impl Into<String>,
        region: &AwsRegion,
        account: &AccountId,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            partition: "aws".to_owned(),
            service: service.into(),
            region: region.as_str().to_owned(),
            account: account.as_str().to_owned(),
            resource: resource.into(),
        }
    }

    /// ARN of a CloudWatch Logs destination with the given name.
    ///
    /// Form: `arn:aws:logs:<region>:<account>:destination:<name>`.
    #[must_use]
    pub fn log_destination(region: &AwsRegion, account: &AccountId, name: &str) -> Self {
        Self::new("logs", region, account, format!("destination:{name}"))
    }

    /// ARN of an S3 bucket. Buckets are global: region and account are empty.
    #[must_use]
    pub fn s3_bucket(bucket_name: &str) -> Self {
        Self {
            partition: "aws".to_owned(),
            service: "s3".to_owned(),
            region: String::new(),
            account: String::new(),
            resource: bucket_name.to_owned(),
        }
    }

    /// ARN of a CloudWatch Logs log group.
    ///
    /// Form: `arn:aws:logs:<region>:<account>:log-group:<name>`.
    #[must_use]
    pub fn log_group(region: &AwsRegion, account: &AccountId, name: &str) -> Self {
        Self::new("logs", region, account, format!("log-group:{name}"))
    }

    /// Resource portion of the ARN (everything after the account segment).
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}

impl serde::Serialize for Arn {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_valid_account_id() {
        let id = AccountId::new("111111111111").unwrap();
        assert_eq!(id.as_str(), "111111111111");
    }

    #[test]
    fn test_should_reject_invalid_account_id() {
        assert!(AccountId::new("").is_err());
        assert!(AccountId::new("12345").is_err());
        assert!(AccountId::new("abcdefghijkl").is_err());
        assert!(AccountId::new("1234567890123").is_err());
    }

    #[test]
    fn test_should_use_default_region() {
        let region = AwsRegion::default();
        assert_eq!(region.as_str(), "us-east-1");
    }

    #[test]
    fn test_should_format_log_destination_arn() {
        let account = AccountId::new("111111111111").unwrap();
        let region = AwsRegion::new("us-east-1");
        let arn = Arn::log_destination(&region, &account, "Central-Log-Destination");
        assert_eq!(
            arn.to_string(),
            "arn:aws:logs:us-east-1:111111111111:destination:Central-Log-Destination"
        );
    }

    #[test]
    fn test_should_format_bucket_arn_without_region_or_account() {
        let arn = Arn::s3_bucket("central-logs-111111111111");
        assert_eq!(arn.to_string(), "arn:aws:s3:::central-logs-111111111111");
    }

    #[test]
    fn test_should_serialize_arn_as_string() {
        let arn = Arn::s3_bucket("central-logs-111111111111");
        let json = serde_json::to_string(&arn).unwrap();
        assert_eq!(json, "\"arn:aws:s3:::central-logs-111111111111\"");
    }
}
