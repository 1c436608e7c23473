use serde::{Serialize, Deserialize};
use crate::application::{Request, Response};
use crate::domain::node::NodeId;

/// One line of the wire protocol: `{"command": "expand-node", "node": 12}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandReq {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<u64>,
}

impl CommandReq {
    /// Map the verb onto a controller request. Returns `Ok(None)` for `PING`.
    pub fn to_request(&self) -> anyhow::Result<Option<Request>> {
        let node = || {
            self.node
                .map(NodeId)
                .ok_or_else(|| anyhow::anyhow!("Missing 'node' for {}", self.command))
        };
        // The camelCase spellings are the verbs the desktop front end sends.
        let request = match self.command.as_str() {
            "PING" => return Ok(None),
            "toggle-function-calls" | "toggleFunctionCalls" => Request::ToggleFunctionCalls(node()?),
            "toggle-dependency-edges" | "toggleDependencyEdges" => Request::ToggleDependencyEdges(node()?),
            "expand-node" | "expandNode" => Request::ExpandNode(node()?),
            "collapse-node" | "collapseNode" => Request::CollapseNode(node()?),
            "expand-all" | "expandAll" => Request::ExpandAll(node()?),
            "expand-full-graph" | "fullGraph" => Request::ExpandFullGraph,
            "expand-to" | "expandTo" => Request::ExpandTo(node()?),
            "reset-graph" | "resetGraph" => Request::ResetGraph,
            "render" => Request::Render,
            other => anyhow::bail!("Unknown command: {}", other),
        };
        Ok(Some(request))
    }
}

/// Reply line: an `update-graph` event with markup, or an `alert`.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResponseDto {
    Success { event: String, data: String },
    Error { event: String, message: String },
}

impl ResponseDto {
    pub fn pong() -> Self {
        ResponseDto::Success {
            event: "pong".to_string(),
            data: "PONG".to_string(),
        }
    }

    pub fn alert(message: impl Into<String>) -> Self {
        ResponseDto::Error {
            event: "alert".to_string(),
            message: message.into(),
        }
    }
}

impl From<Response> for ResponseDto {
    fn from(response: Response) -> Self {
        match response {
            Response::UpdateGraph(markup) => ResponseDto::Success {
                event: "update-graph".to_string(),
                data: markup,
            },
            Response::Alert(message) => ResponseDto::alert(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(json: &str) -> CommandReq {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_verbs_map_to_requests() {
        assert_eq!(
            req(r#"{"command": "expand-node", "node": 4}"#).to_request().unwrap(),
            Some(Request::ExpandNode(NodeId(4)))
        );
        assert_eq!(
            req(r#"{"command": "fullGraph"}"#).to_request().unwrap(),
            Some(Request::ExpandFullGraph)
        );
        assert_eq!(req(r#"{"command": "PING"}"#).to_request().unwrap(), None);
    }

    #[test]
    fn test_missing_node_and_unknown_verb() {
        let err = req(r#"{"command": "expand-to"}"#).to_request().unwrap_err();
        assert!(err.to_string().contains("Missing 'node'"));
        let err = req(r#"{"command": "explode"}"#).to_request().unwrap_err();
        assert!(err.to_string().contains("Unknown command"));
    }

    #[test]
    fn test_response_wire_shape() {
        let json = serde_json::to_value(ResponseDto::from(Response::UpdateGraph("<svg/>".into()))).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["event"], "update-graph");
        assert_eq!(json["data"], "<svg/>");

        let json = serde_json::to_value(ResponseDto::from(Response::Alert("nope".into()))).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["event"], "alert");
        assert_eq!(json["message"], "nope");
    }
}
