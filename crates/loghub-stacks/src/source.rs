//! The source provisioning unit.
//!
//! Binds one log group in a source account to a remote destination ARN with
//! an empty (forward-all) filter. The log group is assumed to exist; the
//! destination ARN is treated as an opaque string.

use std::collections::BTreeMap;

use tracing::info;

use loghub_core::{LogHubError, LogHubResult};
use loghub_synth::{ProvisioningPlan, ResourceGraph, ResourceSpec, SubscriptionFilterSpec};

const SUBSCRIPTION_ID: &str = "SubscriptionFilter";

/// A subscription from one source log group to a destination ARN.
#[derive(Debug)]
pub struct SourceStack {
    log_group_name: String,
    destination_arn: String,
    graph: ResourceGraph,
}

impl SourceStack {
    /// Assemble the source stack.
    ///
    /// # Errors
    /// Returns [`LogHubError::Config`] if either input is empty; no resource
    /// is declared in that case.
    pub fn new(
        log_group_name: impl Into<String>,
        destination_arn: impl Into<String>,
    ) -> LogHubResult<Self> {
        let log_group_name = log_group_name.into();
        let destination_arn = destination_arn.into();

        if log_group_name.is_empty() {
            return Err(LogHubError::Config("log group name must not be empty".to_owned()));
        }
        if destination_arn.is_empty() {
            return Err(LogHubError::Config(
                "log destination ARN must not be empty".to_owned(),
            ));
        }

        info!(
            log_group = %log_group_name,
            destination_arn = %destination_arn,
            "assembling source stack"
        );

        let mut graph = ResourceGraph::new();
        graph.add(
            SUBSCRIPTION_ID,
            ResourceSpec::SubscriptionFilter(SubscriptionFilterSpec {
                log_group_name: log_group_name.clone(),
                destination_arn: destination_arn.clone(),
                // Empty pattern: forward all log events unfiltered.
                filter_pattern: String::new(),
            }),
        )?;

        Ok(Self {
            log_group_name,
            destination_arn,
            graph,
        })
    }

    /// The subscribed log group.
    #[must_use]
    pub fn log_group_name(&self) -> &str {
        &self.log_group_name
    }

    /// The destination the log group forwards to.
    #[must_use]
    pub fn destination_arn(&self) -> &str {
        &self.destination_arn
    }

    /// Synthesize the provisioning plan.
    ///
    /// # Errors
    /// Returns graph-level errors.
    pub fn synth(&self) -> LogHubResult<ProvisioningPlan> {
        self.graph.synth("LogSourceStack", BTreeMap::new())
    }
}
