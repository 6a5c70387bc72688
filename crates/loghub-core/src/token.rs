//! Late-bound values for resource properties.
//!
//! A provisioning pass declares every resource before any of them exists, so
//! a property may need to reference an attribute (typically the ARN) of a
//! resource that has no concrete value yet. [`AttrRef`] captures such a
//! reference by logical ID; the external executor resolves it after creating
//! the target resource.

use crate::Arn;

/// Reference to an attribute of a declared resource, resolved by the
/// executor once the target exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrRef {
    /// Logical ID of the target resource.
    pub logical_id: String,
    /// Attribute name, e.g. `Arn`.
    pub attribute: String,
}

impl AttrRef {
    /// Reference the `Arn` attribute of the given resource.
    #[must_use]
    pub fn arn(logical_id: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            attribute: "Arn".to_owned(),
        }
    }
}

impl serde::Serialize for AttrRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            "Fn::GetAtt",
            &[self.logical_id.as_str(), self.attribute.as_str()],
        )?;
        map.end()
    }
}

/// A property value: either a literal string known at synthesis time, or a
/// late-bound attribute reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A concrete string value.
    Literal(String),
    /// A reference resolved by the executor.
    GetAtt(AttrRef),
}

impl Value {
    /// The logical ID this value depends on, if it is late-bound.
    #[must_use]
    pub fn referenced_id(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::GetAtt(r) => Some(&r.logical_id),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_owned())
    }
}

impl From<&Arn> for Value {
    fn from(arn: &Arn) -> Self {
        Self::Literal(arn.to_string())
    }
}

impl From<AttrRef> for Value {
    fn from(r: AttrRef) -> Self {
        Self::GetAtt(r)
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(s) => serializer.serialize_str(s),
            Self::GetAtt(r) => r.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_serialize_literal_as_string() {
        let v = Value::from("central-logs-delivery-group");
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"central-logs-delivery-group\"");
    }

    #[test]
    fn test_should_serialize_get_att_as_intrinsic() {
        let v = Value::from(AttrRef::arn("FirehoseLoggingDeliveryStream"));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Fn::GetAtt": ["FirehoseLoggingDeliveryStream", "Arn"]})
        );
    }

    #[test]
    fn test_should_report_referenced_id() {
        let v = Value::from(AttrRef::arn("LogDestinationRole"));
        assert_eq!(v.referenced_id(), Some("LogDestinationRole"));
        assert_eq!(Value::from("literal").referenced_id(), None);
    }
}
