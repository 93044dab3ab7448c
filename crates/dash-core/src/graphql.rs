//! GraphQL-over-HTTP envelopes.
//!
//! Both endpoints accept `{query, variables}` and answer `{data, errors}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
    #[serde(
        default,
        rename = "operationName",
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_name: Option<String>,
}

impl GraphqlRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
            operation_name: None,
        }
    }

    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Name used in logs: the explicit operation name, else the first word
    /// after `query`/`mutation`, else `"anonymous"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.operation_name {
            return name.clone();
        }
        let trimmed = self.query.trim_start();
        for keyword in ["query", "mutation", "subscription"] {
            let Some(rest) = trimmed.strip_prefix(keyword) else {
                continue;
            };
            if !rest.starts_with(|c: char| c.is_whitespace() || c == '{' || c == '(') {
                break;
            }
            let name: String = rest
                .trim_start()
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if !name.is_empty() {
                return name;
            }
            break;
        }
        "anonymous".to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

impl GraphqlResponse {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphqlError {
    /// `extensions.code`, when the server sends one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.get("code")?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn request_serializes_without_empty_fields() {
        let request = GraphqlRequest::new("{ boutiques { id } }");
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json, json!({"query": "{ boutiques { id } }"}));
    }

    #[test]
    fn request_serializes_variables_and_operation_name() {
        let request = GraphqlRequest::new("query Orders($limit: Int) { orders(limit: $limit) { id } }")
            .variable("limit", 10)
            .operation_name("Orders");
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["variables"], json!({"limit": 10}));
        assert_eq!(json["operationName"], "Orders");
    }

    #[test]
    fn display_name_prefers_explicit_name() {
        let request = GraphqlRequest::new("query Foo { x }").operation_name("Bar");
        assert_eq!(request.display_name(), "Bar");
    }

    #[test]
    fn display_name_reads_query_keyword() {
        assert_eq!(
            GraphqlRequest::new("mutation auth_refresh($t: String) { x }").display_name(),
            "auth_refresh"
        );
        assert_eq!(GraphqlRequest::new("query{ x }").display_name(), "anonymous");
        assert_eq!(GraphqlRequest::new("{ x }").display_name(), "anonymous");
    }

    #[test]
    fn response_parses_errors_with_code() {
        let response: GraphqlResponse = serde_json::from_value(json!({
            "data": null,
            "errors": [{"message": "denied", "extensions": {"code": "FORBIDDEN"}}]
        }))
        .expect("parse");
        assert!(response.has_errors());
        assert_eq!(response.errors[0].code(), Some("FORBIDDEN"));
    }

    #[test]
    fn response_defaults_missing_fields() {
        let response: GraphqlResponse = serde_json::from_str("{}").expect("parse");
        assert!(response.data.is_none());
        assert!(!response.has_errors());
    }
}
