//! The provisioning dependency graph.
//!
//! Declarations accumulate in insertion order with explicit dependency
//! edges; synthesis adds the implicit edges induced by `Fn::GetAtt`
//! references, rejects edges to undeclared resources, and emits a
//! topologically ordered [`ProvisioningPlan`].

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use loghub_core::{LogHubError, LogHubResult};

use crate::plan::{PlanOutput, PlannedResource, ProvisioningPlan};
use crate::resource::ResourceSpec;

struct Node {
    logical_id: String,
    spec: ResourceSpec,
    depends_on: Vec<String>,
}

/// A directed acyclic graph of resource declarations.
pub struct ResourceGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl ResourceGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Declare a resource under a logical ID.
    ///
    /// # Errors
    /// Returns [`LogHubError::DuplicateLogicalId`] if the ID is taken.
    pub fn add(&mut self, logical_id: impl Into<String>, spec: ResourceSpec) -> LogHubResult<()> {
        let logical_id = logical_id.into();
        if self.index.contains_key(&logical_id) {
            return Err(LogHubError::DuplicateLogicalId(logical_id));
        }
        debug!(logical_id = %logical_id, r#type = spec.type_name(), "declared resource");
        self.index.insert(logical_id.clone(), self.nodes.len());
        self.nodes.push(Node {
            logical_id,
            spec,
            depends_on: Vec::new(),
        });
        Ok(())
    }

    /// Add an explicit dependency edge: `logical_id` is created only after
    /// `depends_on` completes.
    ///
    /// Both resources must already be declared; referencing an undeclared
    /// resource fails fast rather than racing at execution time.
    ///
    /// # Errors
    /// Returns [`LogHubError::DependencyNotReady`] if either side is unknown.
    pub fn depends_on(&mut self, logical_id: &str, depends_on: &str) -> LogHubResult<()> {
        if !self.index.contains_key(depends_on) {
            return Err(LogHubError::DependencyNotReady {
                resource: logical_id.to_owned(),
                depends_on: depends_on.to_owned(),
            });
        }
        let Some(&pos) = self.index.get(logical_id) else {
            return Err(LogHubError::DependencyNotReady {
                resource: logical_id.to_owned(),
                depends_on: depends_on.to_owned(),
            });
        };
        let deps = &mut self.nodes[pos].depends_on;
        if !deps.iter().any(|d| d == depends_on) {
            deps.push(depends_on.to_owned());
        }
        Ok(())
    }

    /// Number of declared resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Synthesize an ordered provisioning plan.
    ///
    /// Dependency edges come from two places: explicit [`Self::depends_on`]
    /// calls and `Fn::GetAtt` references inside rendered properties. Every
    /// edge target must be a declared resource.
    ///
    /// # Errors
    /// Returns [`LogHubError::DependencyNotReady`] for references to
    /// undeclared resources and [`LogHubError::CycleDetected`] if the edges
    /// do not form a DAG.
    pub fn synth(
        &self,
        stack_name: &str,
        outputs: BTreeMap<String, PlanOutput>,
    ) -> LogHubResult<ProvisioningPlan> {
        let mut rendered = Vec::with_capacity(self.nodes.len());
        let mut deps: Vec<Vec<String>> = Vec::with_capacity(self.nodes.len());

        for node in &self.nodes {
            let properties = node.spec.properties()?;

            let mut referenced = HashSet::new();
            collect_get_att(&properties, &mut referenced);

            let mut node_deps = node.depends_on.clone();
            for id in referenced {
                if !self.index.contains_key(&id) {
                    return Err(LogHubError::DependencyNotReady {
                        resource: node.logical_id.clone(),
                        depends_on: id,
                    });
                }
                if !node_deps.iter().any(|d| *d == id) {
                    node_deps.push(id);
                }
            }
            node_deps.sort();

            rendered.push(properties);
            deps.push(node_deps);
        }

        let order = topological_order(&self.nodes, &deps)?;

        let resources = order
            .into_iter()
            .map(|i| PlannedResource {
                logical_id: self.nodes[i].logical_id.clone(),
                r#type: self.nodes[i].spec.type_name().to_owned(),
                depends_on: deps[i].clone(),
                properties: rendered[i].clone(),
            })
            .collect();

        debug!(stack = stack_name, resources = self.nodes.len(), "synthesized plan");

        Ok(ProvisioningPlan {
            stack_name: stack_name.to_owned(),
            resources,
            outputs,
        })
    }
}

impl Default for ResourceGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGraph")
            .field("resources", &self.nodes.len())
            .finish()
    }
}

/// Kahn's algorithm, preferring declaration order among ready nodes so
/// synthesis is deterministic.
fn topological_order(nodes: &[Node], deps: &[Vec<String>]) -> LogHubResult<Vec<usize>> {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.logical_id.as_str(), i))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    let mut emitted = vec![false; nodes.len()];

    while order.len() < nodes.len() {
        let mut progressed = false;
        for i in 0..nodes.len() {
            if emitted[i] {
                continue;
            }
            let ready = deps[i].iter().all(|d| emitted[index[d.as_str()]]);
            if ready {
                emitted[i] = true;
                order.push(i);
                progressed = true;
            }
        }
        if !progressed {
            let stuck = nodes
                .iter()
                .enumerate()
                .find(|(i, _)| !emitted[*i])
                .map(|(_, n)| n.logical_id.clone())
                .unwrap_or_default();
            return Err(LogHubError::CycleDetected(stuck));
        }
    }

    Ok(order)
}

/// Collect the logical IDs referenced by `Fn::GetAtt` anywhere in a property
/// tree.
fn collect_get_att(value: &serde_json::Value, out: &mut HashSet<String>) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::Array(parts)) = map.get("Fn::GetAtt") {
                if let Some(serde_json::Value::String(id)) = parts.first() {
                    out.insert(id.clone());
                }
            }
            for v in map.values() {
                collect_get_att(v, out);
            }
        }
        serde_json::Value::Array(items) => {
            for v in items {
                collect_get_att(v, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{BucketSpec, LogGroupSpec, LogStreamSpec};

    fn bucket(name: &str) -> ResourceSpec {
        ResourceSpec::Bucket(BucketSpec {
            bucket_name: name.to_owned(),
        })
    }

    #[test]
    fn test_should_reject_duplicate_logical_id() {
        let mut graph = ResourceGraph::new();
        graph.add("Bucket", bucket("central-logs-111111111111")).unwrap();
        let err = graph.add("Bucket", bucket("other")).unwrap_err();
        assert!(matches!(err, LogHubError::DuplicateLogicalId(id) if id == "Bucket"));
    }

    #[test]
    fn test_should_reject_edge_to_undeclared_resource() {
        let mut graph = ResourceGraph::new();
        graph.add("Bucket", bucket("central-logs-111111111111")).unwrap();
        let err = graph.depends_on("Bucket", "Missing").unwrap_err();
        assert!(matches!(err, LogHubError::DependencyNotReady { .. }));
    }

    #[test]
    fn test_should_order_explicit_dependencies() {
        let mut graph = ResourceGraph::new();
        graph
            .add(
                "Stream",
                ResourceSpec::LogStream(LogStreamSpec {
                    log_group_name: "g".to_owned(),
                    log_stream_name: "s".to_owned(),
                }),
            )
            .unwrap();
        graph
            .add(
                "Group",
                ResourceSpec::LogGroup(LogGroupSpec {
                    log_group_name: "g".to_owned(),
                }),
            )
            .unwrap();
        graph.depends_on("Stream", "Group").unwrap();

        let plan = graph.synth("test", BTreeMap::new()).unwrap();
        assert!(plan.position("Group").unwrap() < plan.position("Stream").unwrap());
    }

    #[test]
    fn test_should_detect_cycles() {
        let mut graph = ResourceGraph::new();
        graph.add("A", bucket("bucket-a")).unwrap();
        graph.add("B", bucket("bucket-b")).unwrap();
        graph.depends_on("A", "B").unwrap();
        graph.depends_on("B", "A").unwrap();

        let err = graph.synth("test", BTreeMap::new()).unwrap_err();
        assert!(matches!(err, LogHubError::CycleDetected(_)));
    }

    #[test]
    fn test_should_order_implicit_get_att_references() {
        use loghub_core::AttrRef;
        use loghub_iam::{InlinePolicy, PolicyDocument, Statement};

        let mut graph = ResourceGraph::new();
        graph
            .add(
                "Role",
                ResourceSpec::Role(
                    crate::resource::RoleSpec::assumed_by_service("firehose.amazonaws.com")
                        .with_policy(InlinePolicy::new(
                            "invoke",
                            PolicyDocument::new().statement(
                                Statement::allow()
                                    .action("lambda:InvokeFunction")
                                    .resource(AttrRef::arn("Function")),
                            ),
                        )),
                ),
            )
            .unwrap();
        graph
            .add(
                "Function",
                ResourceSpec::Function(crate::resource::FunctionSpec {
                    function_name: "data-processor-function".to_owned(),
                    runtime: "nodejs18.x".to_owned(),
                    handler: "index.handler".to_owned(),
                    code: "resources".to_owned(),
                    role: "arn:aws:iam::111111111111:role/x".into(),
                    timeout: 120,
                }),
            )
            .unwrap();

        let plan = graph.synth("test", BTreeMap::new()).unwrap();
        assert!(plan.position("Function").unwrap() < plan.position("Role").unwrap());
        assert_eq!(
            plan.resource("Role").unwrap().depends_on,
            vec!["Function".to_owned()]
        );
    }

    #[test]
    fn test_should_fail_on_get_att_to_undeclared_resource() {
        use loghub_core::AttrRef;

        let mut graph = ResourceGraph::new();
        graph
            .add(
                "Destination",
                ResourceSpec::LogDestination(crate::resource::LogDestinationSpec {
                    destination_name: "Central-Log-Destination".to_owned(),
                    role_arn: AttrRef::arn("MissingRole").into(),
                    target_arn: "arn:aws:firehose:us-east-1:111111111111:deliverystream/x".into(),
                    destination_policy: "{}".to_owned(),
                }),
            )
            .unwrap();

        let err = graph.synth("test", BTreeMap::new()).unwrap_err();
        assert!(
            matches!(err, LogHubError::DependencyNotReady { resource, depends_on }
                if resource == "Destination" && depends_on == "MissingRole")
        );
    }
}
