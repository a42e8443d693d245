use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A monitored deployment selectable at logon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Fields the client does not model, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The instance list is usually wrapped in an object, but some servers
/// answer with the bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum InstanceListResponse {
    Wrapped {
        #[serde(default)]
        instances: Vec<Instance>,
    },
    Bare(Vec<Instance>),
}

impl InstanceListResponse {
    pub(crate) fn into_instances(self) -> Vec<Instance> {
        match self {
            InstanceListResponse::Wrapped { instances } => instances,
            InstanceListResponse::Bare(instances) => instances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<Instance> {
        serde_json::from_str::<InstanceListResponse>(json)
            .expect("Failed to parse instance list test JSON")
            .into_instances()
    }

    #[test]
    fn test_parse_wrapped_instance_list() {
        let instances = parse(
            r#"{"instances":[{"id":"abc","name":"Main Lab","region":"east"},{"id":"def"}]}"#,
        );
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].id, "abc");
        assert_eq!(instances[0].name.as_deref(), Some("Main Lab"));
        assert_eq!(instances[0].extra.get("region"), Some(&Value::from("east")));
        assert_eq!(instances[1].name, None);
    }

    #[test]
    fn test_parse_bare_instance_list() {
        let instances = parse(r#"[{"id":"abc"},{"id":"def"}]"#);
        let ids: Vec<&str> = instances.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["abc", "def"]);
    }

    #[test]
    fn test_parse_empty_wrapper() {
        assert!(parse(r#"{}"#).is_empty());
    }
}
