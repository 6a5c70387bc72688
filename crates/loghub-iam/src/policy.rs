//! IAM policy documents, statements, and principals.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use loghub_core::Value;

/// IAM policy language version used for every document.
const POLICY_VERSION: &str = "2012-10-17";

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Effect {
    /// Grant the listed actions.
    Allow,
    /// Deny the listed actions.
    Deny,
}

/// The principal a statement applies to.
///
/// Identity-based policies carry no principal; trust policies and resource
/// policies name either a service or a set of AWS accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// AWS account principals, serialized as `{"AWS": [...]}`.
    Aws(Vec<String>),
    /// A service principal, serialized as `{"Service": "..."}`.
    Service(String),
}

impl Principal {
    /// A single AWS account principal.
    #[must_use]
    pub fn account(id: impl Into<String>) -> Self {
        Self::Aws(vec![id.into()])
    }

    /// A service principal such as `logs.amazonaws.com`.
    #[must_use]
    pub fn service(name: impl Into<String>) -> Self {
        Self::Service(name.into())
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Aws(accounts) => map.serialize_entry("AWS", accounts)?,
            Self::Service(name) => map.serialize_entry("Service", name)?,
        }
        map.end()
    }
}

/// A single policy statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    effect: Effect,
    principal: Option<Principal>,
    actions: Vec<String>,
    resources: Vec<Value>,
}

impl Statement {
    /// Start an `Allow` statement.
    #[must_use]
    pub fn allow() -> Self {
        Self {
            effect: Effect::Allow,
            principal: None,
            actions: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Add a single action.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Add several actions.
    #[must_use]
    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    /// Add a resource (literal ARN or late-bound reference).
    #[must_use]
    pub fn resource(mut self, resource: impl Into<Value>) -> Self {
        self.resources.push(resource.into());
        self
    }

    /// Set the principal.
    #[must_use]
    pub fn principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// The actions this statement grants or denies.
    #[must_use]
    pub fn action_list(&self) -> &[String] {
        &self.actions
    }

    /// The resources this statement is scoped to.
    #[must_use]
    pub fn resource_list(&self) -> &[Value] {
        &self.resources
    }

    /// The principal, if any.
    #[must_use]
    pub fn principal_ref(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

/// Serialize a slice as a plain value when it has exactly one element,
/// matching how AWS collapses single-element action/resource lists.
fn serialize_one_or_many<S, T>(items: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    if items.len() == 1 {
        items[0].serialize(serializer)
    } else {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

impl Serialize for Statement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct OneOrMany<'a, T>(&'a [T]);
        impl<T: Serialize> Serialize for OneOrMany<'_, T> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serialize_one_or_many(self.0, serializer)
            }
        }

        let len = 1
            + usize::from(self.principal.is_some())
            + usize::from(!self.actions.is_empty())
            + usize::from(!self.resources.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("Effect", &self.effect)?;
        if let Some(principal) = &self.principal {
            map.serialize_entry("Principal", principal)?;
        }
        if !self.actions.is_empty() {
            map.serialize_entry("Action", &OneOrMany(&self.actions))?;
        }
        // Trust policies carry no Resource key.
        if !self.resources.is_empty() {
            map.serialize_entry("Resource", &OneOrMany(&self.resources))?;
        }
        map.end()
    }
}

/// An IAM policy document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyDocument {
    /// Policy language version.
    #[serde(rename = "Version")]
    version: &'static str,
    /// Ordered statements.
    #[serde(rename = "Statement")]
    statements: Vec<Statement>,
}

impl PolicyDocument {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: POLICY_VERSION,
            statements: Vec::new(),
        }
    }

    /// Append a statement.
    #[must_use]
    pub fn statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    /// Trust policy allowing only the given service principal to assume the role.
    #[must_use]
    pub fn assume_role(service: impl Into<String>) -> Self {
        Self::new().statement(
            Statement::allow()
                .action("sts:AssumeRole")
                .principal(Principal::service(service)),
        )
    }

    /// The statements in declaration order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Render the document as compact JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// An inline policy attached to a role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InlinePolicy {
    /// Name of the inline policy.
    pub policy_name: String,
    /// The attached document.
    pub policy_document: PolicyDocument,
}

impl InlinePolicy {
    /// Create a named inline policy.
    #[must_use]
    pub fn new(name: impl Into<String>, document: PolicyDocument) -> Self {
        Self {
            policy_name: name.into(),
            policy_document: document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_should_serialize_trust_policy() {
        let doc = PolicyDocument::assume_role("logs.amazonaws.com");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": {"Service": "logs.amazonaws.com"},
                    "Action": "sts:AssumeRole"
                }]
            })
        );
    }

    #[test]
    fn test_should_collapse_single_action_to_string() {
        let doc = PolicyDocument::new().statement(
            Statement::allow()
                .action("firehose:PutRecord")
                .resource("*"),
        );
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["Statement"][0]["Action"], json!("firehose:PutRecord"));
        assert_eq!(value["Statement"][0]["Resource"], json!("*"));
    }

    #[test]
    fn test_should_serialize_multiple_actions_as_array() {
        let stmt = Statement::allow()
            .actions(["s3:GetObject", "s3:PutObject"])
            .resource("arn:aws:s3:::central-logs-111111111111/*");
        let value = serde_json::to_value(&stmt).unwrap();
        assert_eq!(
            value["Action"],
            json!(["s3:GetObject", "s3:PutObject"])
        );
    }

    #[test]
    fn test_should_serialize_account_principal_as_aws_list() {
        let stmt = Statement::allow()
            .action("logs:PutSubscriptionFilter")
            .principal(Principal::account("222222222222"))
            .resource("arn:aws:logs:us-east-1:111111111111:destination:Central-Log-Destination");
        let value = serde_json::to_value(&stmt).unwrap();
        assert_eq!(value["Principal"], json!({"AWS": ["222222222222"]}));
    }

    #[test]
    fn test_should_render_compact_json() {
        let doc = PolicyDocument::new().statement(
            Statement::allow()
                .action("firehose:PutRecord")
                .resource("*"),
        );
        let json = doc.to_json().unwrap();
        assert!(json.starts_with("{\"Version\":\"2012-10-17\""));
    }
}
