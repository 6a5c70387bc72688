//! Resource declarations and the provisioning graph for LogHub.
//!
//! A provisioning pass builds an in-memory [`ResourceGraph`] of typed
//! resource declarations with explicit dependency edges, then synthesizes a
//! [`ProvisioningPlan`]: an ordered batch of resource declarations plus
//! named outputs, handed verbatim to an external executor. The graph is the
//! only ordering authority this system enforces; everything else is the
//! executor's responsibility.

mod graph;
mod plan;
mod resource;

pub use graph::ResourceGraph;
pub use plan::{PlanOutput, PlannedResource, ProvisioningPlan};
pub use resource::{
    BucketSpec, DeliveryStreamSpec, FunctionSpec, LogDestinationSpec, LogGroupSpec, LogStreamSpec,
    ResourceSpec, RoleSpec, SubscriptionFilterSpec,
};
