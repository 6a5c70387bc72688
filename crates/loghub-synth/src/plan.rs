//! The synthesized provisioning plan.

use std::collections::BTreeMap;

use serde::Serialize;

use loghub_core::{LogHubError, LogHubResult};

/// One resource declaration in executor order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlannedResource {
    /// Logical ID, unique within the plan.
    pub logical_id: String,
    /// Executor-facing resource type.
    pub r#type: String,
    /// Logical IDs that must complete before this resource is created.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Rendered property map.
    pub properties: serde_json::Value,
}

/// A named output exported from the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlanOutput {
    /// Human-readable description.
    pub description: String,
    /// The exported value.
    pub value: String,
}

impl PlanOutput {
    /// Create an output.
    #[must_use]
    pub fn new(description: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            value: value.into(),
        }
    }
}

/// An ordered batch of resource declarations plus named outputs.
///
/// Resources appear in a valid creation order: every resource comes after
/// everything it depends on, explicitly or through attribute references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningPlan {
    /// Name of the provisioning unit that produced this plan.
    pub stack_name: String,
    /// Resource declarations in creation order.
    pub resources: Vec<PlannedResource>,
    /// Exported outputs.
    pub outputs: BTreeMap<String, PlanOutput>,
}

impl ProvisioningPlan {
    /// Look up a resource by logical ID.
    #[must_use]
    pub fn resource(&self, logical_id: &str) -> Option<&PlannedResource> {
        self.resources.iter().find(|r| r.logical_id == logical_id)
    }

    /// Position of a resource in creation order.
    #[must_use]
    pub fn position(&self, logical_id: &str) -> Option<usize> {
        self.resources.iter().position(|r| r.logical_id == logical_id)
    }

    /// An output value by name.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs.get(name).map(|o| o.value.as_str())
    }

    /// Render the plan as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> LogHubResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LogHubError::Internal(e.into()))
    }
}
