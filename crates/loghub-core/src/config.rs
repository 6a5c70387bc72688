//! Configuration management for the LogHub provisioner.
//!
//! All configuration is driven by environment variables. Required inputs are
//! validated by the stacks that consume them, not here, so a partially
//! populated configuration is fine for modes that do not need every field.

use crate::types::AwsRegion;

/// Global configuration for a provisioning pass.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogHubConfig {
    /// Account that owns the receiving pipeline.
    pub destination_account_id: Option<String>,
    /// Account authorized to push logs; defaults to the destination account.
    pub source_account_id: Option<String>,
    /// Log group in the source account to subscribe.
    pub log_group_name: Option<String>,
    /// Destination ARN from a prior pass; overrides the threaded output.
    pub log_destination_arn: Option<String>,
    /// Region for region-scoped ARNs.
    pub region: AwsRegion,
    /// Log level.
    pub log_level: String,
    /// Directory for rendered provisioning plans.
    pub out_dir: String,
}

impl Default for LogHubConfig {
    fn default() -> Self {
        Self {
            destination_account_id: None,
            source_account_id: None,
            log_group_name: None,
            log_destination_arn: None,
            region: AwsRegion::default(),
            log_level: "info".to_owned(),
            out_dir: "loghub.out".to_owned(),
        }
    }
}

impl LogHubConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("DESTINATION_ACCOUNT_ID") {
            config.destination_account_id = Some(v);
        }
        if let Ok(v) = std::env::var("SOURCE_ACCOUNT_ID") {
            config.source_account_id = Some(v);
        }
        if let Ok(v) = std::env::var("LOG_GROUP_NAME") {
            config.log_group_name = Some(v);
        }
        if let Ok(v) = std::env::var("LOG_DESTINATION_ARN") {
            config.log_destination_arn = Some(v);
        }
        if let Ok(v) = std::env::var("AWS_REGION") {
            config.region = AwsRegion::new(v);
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("OUT_DIR") {
            config.out_dir = v;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = LogHubConfig::default();
        assert!(config.destination_account_id.is_none());
        assert_eq!(config.region.as_str(), "us-east-1");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.out_dir, "loghub.out");
    }
}
