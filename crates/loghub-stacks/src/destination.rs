//! The destination provisioning unit.
//!
//! Builds the receiving pipeline in one pass: storage bucket, transform
//! function and its execution role, delivery stream with an audit log
//! group/stream, and the cross-account-authorized log destination whose ARN
//! is the unit's sole externally consumable output.

use std::collections::BTreeMap;

use tracing::info;

use loghub_core::{
    AccountId, Arn, AttrRef, AwsRegion, LogHubError, LogHubResult, validate_bucket_name,
};
use loghub_iam::{InlinePolicy, PolicyDocument, Principal, Statement};
use loghub_synth::{
    BucketSpec, DeliveryStreamSpec, FunctionSpec, LogDestinationSpec, LogGroupSpec, LogStreamSpec,
    PlanOutput, ProvisioningPlan, ResourceGraph, ResourceSpec, RoleSpec,
};

/// Prefix for the per-account storage bucket name.
pub const BUCKET_NAME_PREFIX: &str = "central-logs-";

/// Fixed name of the ingestion endpoint. The endpoint ARN is fully
/// deterministic given this name, which is what makes the self-referential
/// resource policy possible.
pub const DESTINATION_NAME: &str = "Central-Log-Destination";

/// Name of the batch-transform function.
pub const TRANSFORM_FUNCTION_NAME: &str = "data-processor-function";

/// Per-batch transform timeout. A batch that exceeds this is abandoned and
/// the delivery stream's retry/error-output behavior takes over.
pub const TRANSFORM_TIMEOUT_SECONDS: u32 = 120;

/// Log group capturing pipeline-level delivery diagnostics.
pub const AUDIT_LOG_GROUP: &str = "central-logs-delivery-group";

/// Log stream within [`AUDIT_LOG_GROUP`].
pub const AUDIT_LOG_STREAM: &str = "central-logs-delivery-stream";

/// Output key prefix under the storage bucket.
pub const OUTPUT_PREFIX: &str = "CentralLogs/AWSLogs/";

/// Error-output key prefix under the storage bucket.
pub const ERROR_OUTPUT_PREFIX: &str = "CentralLogs/AWSLogs/Error/";

/// Name of the exported destination ARN output.
pub const LOG_DESTINATION_OUTPUT: &str = "LogDestinationARN";

const BUCKET_ID: &str = "CentralLogsBucket";
const LAMBDA_ROLE_ID: &str = "FirehoseLambdaRole";
const FUNCTION_ID: &str = "FirehoseDataProcessorFunction";
const DELIVERY_ROLE_ID: &str = "FirehoseDeliveryRole";
const AUDIT_GROUP_ID: &str = "FirehoseLogGroup";
const AUDIT_STREAM_ID: &str = "FirehoseLogStream";
const DELIVERY_STREAM_ID: &str = "FirehoseLoggingDeliveryStream";
const DESTINATION_ROLE_ID: &str = "LogDestinationRole";
const DESTINATION_ID: &str = "LogDestination";

/// The receiving side of the cross-account pipeline.
#[derive(Debug)]
pub struct DestinationStack {
    destination_account: AccountId,
    source_account: AccountId,
    graph: ResourceGraph,
    log_destination_arn: Arn,
}

impl DestinationStack {
    /// Assemble the destination stack.
    ///
    /// When no source account is given, the destination account itself is
    /// authorized (degenerate same-account mode, used for testing).
    ///
    /// # Errors
    /// Fails before any resource is declared if the derived bucket name
    /// violates S3 naming rules; graph-level errors surface if construction
    /// order is violated internally.
    pub fn new(
        destination_account: AccountId,
        source_account: Option<AccountId>,
        region: &AwsRegion,
    ) -> LogHubResult<Self> {
        let source_account = source_account.unwrap_or_else(|| destination_account.clone());
        info!(
            destination_account = %destination_account,
            source_account = %source_account,
            "assembling destination stack"
        );

        let bucket_name = format!("{BUCKET_NAME_PREFIX}{destination_account}");
        validate_bucket_name(&bucket_name)?;

        // Predicted before anything exists; the same constructor reports the
        // final output, so policy and output can never drift apart.
        let log_destination_arn =
            Arn::log_destination(region, &destination_account, DESTINATION_NAME);

        let mut graph = ResourceGraph::new();

        graph.add(
            BUCKET_ID,
            ResourceSpec::Bucket(BucketSpec {
                bucket_name: bucket_name.clone(),
            }),
        )?;

        // Transform execution role. The log-resource wildcard is an
        // intentionally relaxed default: the function's own log group does
        // not exist until first invocation.
        graph.add(
            LAMBDA_ROLE_ID,
            ResourceSpec::Role(
                RoleSpec::assumed_by_service("lambda.amazonaws.com").with_policy(
                    InlinePolicy::new(
                        "logWriteAccess",
                        PolicyDocument::new().statement(
                            Statement::allow()
                                .actions([
                                    "logs:CreateLogGroup",
                                    "logs:CreateLogStream",
                                    "logs:PutLogEvents",
                                ])
                                .resource("arn:aws:logs:*:*:*"),
                        ),
                    ),
                ),
            ),
        )?;

        graph.add(
            FUNCTION_ID,
            ResourceSpec::Function(FunctionSpec {
                function_name: TRANSFORM_FUNCTION_NAME.to_owned(),
                runtime: "nodejs12.x".to_owned(),
                handler: "index.handler".to_owned(),
                code: "resources".to_owned(),
                role: AttrRef::arn(LAMBDA_ROLE_ID).into(),
                timeout: TRANSFORM_TIMEOUT_SECONDS,
            }),
        )?;

        let bucket_arn = Arn::s3_bucket(&bucket_name);
        let audit_group_arn = Arn::log_group(region, &destination_account, AUDIT_LOG_GROUP);

        graph.add(
            DELIVERY_ROLE_ID,
            ResourceSpec::Role(
                RoleSpec::assumed_by_service("firehose.amazonaws.com")
                    .with_policy(InlinePolicy::new(
                        "bucketAccess",
                        PolicyDocument::new().statement(
                            Statement::allow()
                                .actions([
                                    "s3:AbortMultipartUpload",
                                    "s3:GetBucketLocation",
                                    "s3:GetObject",
                                    "s3:ListBucket",
                                    "s3:ListBucketMultipartUploads",
                                    "s3:PutObject",
                                ])
                                .resource(&bucket_arn)
                                .resource(format!("{bucket_arn}/*")),
                        ),
                    ))
                    .with_policy(InlinePolicy::new(
                        "transformInvocation",
                        PolicyDocument::new().statement(
                            Statement::allow()
                                .actions([
                                    "lambda:GetFunctionConfiguration",
                                    "lambda:InvokeFunction",
                                ])
                                .resource(AttrRef::arn(FUNCTION_ID)),
                        ),
                    ))
                    .with_policy(InlinePolicy::new(
                        "deliveryAudit",
                        PolicyDocument::new().statement(
                            Statement::allow()
                                .action("logs:PutLogEvents")
                                .resource(&audit_group_arn),
                        ),
                    )),
            ),
        )?;

        graph.add(
            AUDIT_GROUP_ID,
            ResourceSpec::LogGroup(LogGroupSpec {
                log_group_name: AUDIT_LOG_GROUP.to_owned(),
            }),
        )?;
        graph.add(
            AUDIT_STREAM_ID,
            ResourceSpec::LogStream(LogStreamSpec {
                log_group_name: AUDIT_LOG_GROUP.to_owned(),
                log_stream_name: AUDIT_LOG_STREAM.to_owned(),
            }),
        )?;
        graph.depends_on(AUDIT_STREAM_ID, AUDIT_GROUP_ID)?;

        graph.add(
            DELIVERY_STREAM_ID,
            ResourceSpec::DeliveryStream(
                DeliveryStreamSpec::builder()
                    .bucket_arn(AttrRef::arn(BUCKET_ID))
                    .role_arn(AttrRef::arn(DELIVERY_ROLE_ID))
                    .prefix(OUTPUT_PREFIX)
                    .error_output_prefix(ERROR_OUTPUT_PREFIX)
                    .processor_function_arn(AttrRef::arn(FUNCTION_ID))
                    .audit_log_group_name(AUDIT_LOG_GROUP)
                    .audit_log_stream_name(AUDIT_LOG_STREAM)
                    .build(),
            ),
        )?;
        // The logging options name the audit group/stream by plain string,
        // so the edges must be explicit.
        graph.depends_on(DELIVERY_STREAM_ID, AUDIT_GROUP_ID)?;
        graph.depends_on(DELIVERY_STREAM_ID, AUDIT_STREAM_ID)?;

        // Endpoint role: only the log service may assume it, and it may do
        // nothing but push records into the delivery stream. The wildcard
        // resource is an intentionally relaxed default: the stream ARN is
        // not yet known at role declaration time in a single-pass model.
        graph.add(
            DESTINATION_ROLE_ID,
            ResourceSpec::Role(
                RoleSpec::assumed_by_service("logs.amazonaws.com").with_policy(
                    InlinePolicy::new(
                        "logDestinationPolicy",
                        PolicyDocument::new().statement(
                            Statement::allow().action("firehose:PutRecord").resource("*"),
                        ),
                    ),
                ),
            ),
        )?;

        // Self-referential resource policy: the destination's own ARN is
        // predicted from its static name, not looked up.
        let destination_policy = PolicyDocument::new()
            .statement(
                Statement::allow()
                    .principal(Principal::account(source_account.as_str()))
                    .action("logs:PutSubscriptionFilter")
                    .resource(&log_destination_arn),
            )
            .to_json()
            .map_err(|e| LogHubError::Internal(e.into()))?;

        graph.add(
            DESTINATION_ID,
            ResourceSpec::LogDestination(LogDestinationSpec {
                destination_name: DESTINATION_NAME.to_owned(),
                role_arn: AttrRef::arn(DESTINATION_ROLE_ID).into(),
                target_arn: AttrRef::arn(DELIVERY_STREAM_ID).into(),
                destination_policy,
            }),
        )?;
        // Ordering is load-bearing: the destination must not be created
        // until the delivery stream and its role are complete.
        graph.depends_on(DESTINATION_ID, DELIVERY_STREAM_ID)?;
        graph.depends_on(DESTINATION_ID, DESTINATION_ROLE_ID)?;

        Ok(Self {
            destination_account,
            source_account,
            graph,
            log_destination_arn,
        })
    }

    /// The predicted ARN of the ingestion endpoint.
    #[must_use]
    pub fn log_destination_arn(&self) -> &Arn {
        &self.log_destination_arn
    }

    /// The account that owns the pipeline.
    #[must_use]
    pub fn destination_account(&self) -> &AccountId {
        &self.destination_account
    }

    /// The account authorized to create subscriptions.
    #[must_use]
    pub fn source_account(&self) -> &AccountId {
        &self.source_account
    }

    /// Synthesize the ordered provisioning plan.
    ///
    /// # Errors
    /// Returns graph-level errors (unknown references, cycles).
    pub fn synth(&self) -> LogHubResult<ProvisioningPlan> {
        let mut outputs = BTreeMap::new();
        outputs.insert(
            LOG_DESTINATION_OUTPUT.to_owned(),
            PlanOutput::new("LogDestination ARN", self.log_destination_arn.to_string()),
        );
        self.graph.synth("LogDestinationStack", outputs)
    }
}
