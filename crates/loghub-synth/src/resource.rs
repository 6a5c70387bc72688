//! Typed resource declarations.
//!
//! Each spec serializes to the PascalCase property shape the external
//! executor consumes. Late-bound fields hold a [`Value`], which renders as a
//! literal string or an `Fn::GetAtt` reference.

use serde::Serialize;
use serde_json::json;
use typed_builder::TypedBuilder;

use loghub_core::{LogHubError, LogHubResult, Value};
use loghub_iam::{InlinePolicy, PolicyDocument};

/// A durable object store bucket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketSpec {
    /// Globally unique bucket name.
    pub bucket_name: String,
}

/// An IAM role with a trust policy and optional inline policies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleSpec {
    /// Role path.
    pub path: String,
    /// Who may assume this role.
    pub assume_role_policy_document: PolicyDocument,
    /// Inline policies attached to the role.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<InlinePolicy>,
}

impl RoleSpec {
    /// Role at path `/` assumable by the given service principal.
    #[must_use]
    pub fn assumed_by_service(service: &str) -> Self {
        Self {
            path: "/".to_owned(),
            assume_role_policy_document: PolicyDocument::assume_role(service),
            policies: Vec::new(),
        }
    }

    /// Attach an inline policy.
    #[must_use]
    pub fn with_policy(mut self, policy: InlinePolicy) -> Self {
        self.policies.push(policy);
        self
    }
}

/// A batch-transform function, owned and lifecycle-managed externally.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionSpec {
    /// Function name.
    pub function_name: String,
    /// Runtime identifier.
    pub runtime: String,
    /// Handler entry point.
    pub handler: String,
    /// Code asset location.
    pub code: String,
    /// Execution role ARN.
    pub role: Value,
    /// Per-invocation timeout in seconds. Bounds worst-case per-batch
    /// latency and is the backpressure control for the whole pipeline.
    pub timeout: u32,
}

/// A log group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogGroupSpec {
    /// Log group name.
    pub log_group_name: String,
}

/// A log stream within a log group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogStreamSpec {
    /// Parent log group name.
    pub log_group_name: String,
    /// Log stream name.
    pub log_stream_name: String,
}

/// A buffered delivery stream with a processing stage and an object-store sink.
#[derive(Debug, Clone, TypedBuilder)]
pub struct DeliveryStreamSpec {
    /// Delivery stream ingestion type.
    #[builder(default = "DirectPut".to_owned(), setter(into))]
    pub delivery_stream_type: String,
    /// Sink bucket ARN.
    #[builder(setter(into))]
    pub bucket_arn: Value,
    /// Delivery role ARN.
    #[builder(setter(into))]
    pub role_arn: Value,
    /// Buffer size threshold in MB.
    #[builder(default = 50)]
    pub buffering_size_mb: u32,
    /// Buffer time threshold in seconds.
    #[builder(default = 300)]
    pub buffering_interval_seconds: u32,
    /// Output compression format.
    #[builder(default = "UNCOMPRESSED".to_owned(), setter(into))]
    pub compression_format: String,
    /// Output key prefix under the sink bucket.
    #[builder(setter(into))]
    pub prefix: String,
    /// Error-output key prefix under the sink bucket.
    #[builder(setter(into))]
    pub error_output_prefix: String,
    /// ARN of the transform function applied to each batch.
    #[builder(setter(into))]
    pub processor_function_arn: Value,
    /// Log group receiving delivery diagnostics.
    #[builder(setter(into))]
    pub audit_log_group_name: String,
    /// Log stream receiving delivery diagnostics.
    #[builder(setter(into))]
    pub audit_log_stream_name: String,
}

impl DeliveryStreamSpec {
    /// Render the nested extended-S3 destination configuration.
    fn properties(&self) -> LogHubResult<serde_json::Value> {
        Ok(json!({
            "DeliveryStreamType": self.delivery_stream_type,
            "ExtendedS3DestinationConfiguration": {
                "BucketArn": to_value(&self.bucket_arn)?,
                "RoleArn": to_value(&self.role_arn)?,
                "BufferingHints": {
                    "SizeInMBs": self.buffering_size_mb,
                    "IntervalInSeconds": self.buffering_interval_seconds,
                },
                "CompressionFormat": self.compression_format,
                "Prefix": self.prefix,
                "ErrorOutputPrefix": self.error_output_prefix,
                "ProcessingConfiguration": {
                    "Enabled": true,
                    "Processors": [{
                        "Type": "Lambda",
                        "Parameters": [{
                            "ParameterName": "LambdaArn",
                            "ParameterValue": to_value(&self.processor_function_arn)?,
                        }],
                    }],
                },
                "CloudWatchLoggingOptions": {
                    "Enabled": true,
                    "LogGroupName": self.audit_log_group_name,
                    "LogStreamName": self.audit_log_stream_name,
                },
            },
        }))
    }
}

/// A named, cross-account-authorized log destination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogDestinationSpec {
    /// Fixed destination name.
    pub destination_name: String,
    /// Role the log service assumes to push records into the target.
    pub role_arn: Value,
    /// The delivery stream receiving forwarded records.
    pub target_arn: Value,
    /// Resource policy (rendered JSON) naming the accounts allowed to
    /// create subscriptions against this destination.
    pub destination_policy: String,
}

/// A subscription binding a log group to a destination ARN.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionFilterSpec {
    /// Log group in the source account.
    pub log_group_name: String,
    /// Destination ARN produced by a prior provisioning pass.
    pub destination_arn: String,
    /// Filter expression; empty forwards all events.
    pub filter_pattern: String,
}

/// A resource declaration of any supported kind.
#[derive(Debug, Clone)]
pub enum ResourceSpec {
    /// Object store bucket.
    Bucket(BucketSpec),
    /// IAM role.
    Role(RoleSpec),
    /// Transform function.
    Function(FunctionSpec),
    /// Log group.
    LogGroup(LogGroupSpec),
    /// Log stream.
    LogStream(LogStreamSpec),
    /// Delivery stream.
    DeliveryStream(DeliveryStreamSpec),
    /// Log destination.
    LogDestination(LogDestinationSpec),
    /// Subscription filter.
    SubscriptionFilter(SubscriptionFilterSpec),
}

impl ResourceSpec {
    /// Executor-facing type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bucket(_) => "AWS::S3::Bucket",
            Self::Role(_) => "AWS::IAM::Role",
            Self::Function(_) => "AWS::Lambda::Function",
            Self::LogGroup(_) => "AWS::Logs::LogGroup",
            Self::LogStream(_) => "AWS::Logs::LogStream",
            Self::DeliveryStream(_) => "AWS::KinesisFirehose::DeliveryStream",
            Self::LogDestination(_) => "AWS::Logs::Destination",
            Self::SubscriptionFilter(_) => "AWS::Logs::SubscriptionFilter",
        }
    }

    /// Render the property map.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn properties(&self) -> LogHubResult<serde_json::Value> {
        match self {
            Self::Bucket(s) => to_value(s),
            Self::Role(s) => to_value(s),
            Self::Function(s) => to_value(s),
            Self::LogGroup(s) => to_value(s),
            Self::LogStream(s) => to_value(s),
            Self::DeliveryStream(s) => s.properties(),
            Self::LogDestination(s) => to_value(s),
            Self::SubscriptionFilter(s) => to_value(s),
        }
    }
}

fn to_value<T: Serialize>(spec: &T) -> LogHubResult<serde_json::Value> {
    serde_json::to_value(spec).map_err(|e| LogHubError::Internal(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loghub_core::AttrRef;

    #[test]
    fn test_should_render_bucket_properties() {
        let spec = ResourceSpec::Bucket(BucketSpec {
            bucket_name: "central-logs-111111111111".to_owned(),
        });
        assert_eq!(spec.type_name(), "AWS::S3::Bucket");
        let props = spec.properties().unwrap();
        assert_eq!(props["BucketName"], "central-logs-111111111111");
    }

    #[test]
    fn test_should_render_delivery_stream_with_late_bound_processor() {
        let spec = DeliveryStreamSpec::builder()
            .bucket_arn("arn:aws:s3:::central-logs-111111111111")
            .role_arn(AttrRef::arn("FirehoseDeliveryRole"))
            .prefix("CentralLogs/AWSLogs/")
            .error_output_prefix("CentralLogs/AWSLogs/Error/")
            .processor_function_arn(AttrRef::arn("FirehoseDataProcessorFunction"))
            .audit_log_group_name("central-logs-delivery-group")
            .audit_log_stream_name("central-logs-delivery-stream")
            .build();
        assert_eq!(spec.delivery_stream_type, "DirectPut");
        assert_eq!(spec.buffering_size_mb, 50);
        assert_eq!(spec.buffering_interval_seconds, 300);

        let props = ResourceSpec::DeliveryStream(spec).properties().unwrap();
        let config = &props["ExtendedS3DestinationConfiguration"];
        assert_eq!(config["CompressionFormat"], "UNCOMPRESSED");
        assert_eq!(config["BufferingHints"]["SizeInMBs"], 50);
        assert_eq!(
            config["ProcessingConfiguration"]["Processors"][0]["Parameters"][0]["ParameterValue"],
            serde_json::json!({"Fn::GetAtt": ["FirehoseDataProcessorFunction", "Arn"]})
        );
    }

    #[test]
    fn test_should_render_role_with_inline_policy() {
        use loghub_iam::Statement;

        let spec = RoleSpec::assumed_by_service("logs.amazonaws.com").with_policy(
            InlinePolicy::new(
                "logDestinationPolicy",
                PolicyDocument::new()
                    .statement(Statement::allow().action("firehose:PutRecord").resource("*")),
            ),
        );
        let props = ResourceSpec::Role(spec).properties().unwrap();
        assert_eq!(props["Path"], "/");
        assert_eq!(
            props["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]["Service"],
            "logs.amazonaws.com"
        );
        assert_eq!(props["Policies"][0]["PolicyName"], "logDestinationPolicy");
    }
}
