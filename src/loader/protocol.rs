//! Line-delimited JSON messages exchanged with the host runtime and workers
//!
//! Every message is a single JSON object followed by `\n`. Host requests
//! carry an `id` that the matching reply echoes back, so a stale reply from
//! an abandoned request can never be mistaken for the current one.

use crate::types::ModuleKind;
use serde::{Deserialize, Serialize};

/// Operation requested from the host runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostCommand {
    /// Liveness check, answered with the runtime version
    Ping,
    /// Resolve a module identifier relative to the project directory
    Resolve { module: String },
    /// Throwaway load that only reports the module kind
    Probe { path: String },
    /// Timed load followed by a cache purge
    Load { path: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRequest {
    pub id: u64,
    #[serde(flatten)]
    pub command: HostCommand,
}

/// Reply payload from the host runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HostReplyBody {
    Ready { version: String },
    Resolved { path: Option<String> },
    Probed { kind: ModuleKind },
    Loaded { timespan: u64 },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostReply {
    pub id: u64,
    #[serde(flatten)]
    pub body: HostReplyBody,
}

/// The single request sent to an isolated worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    #[serde(rename = "modulePath")]
    pub module_path: String,
}

/// The single reply an isolated worker sends before exiting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkerReply {
    Timespan { timespan: u64 },
    Error { error: String },
}

/// Encode a message as one protocol line, newline included
pub fn encode_line<T: Serialize>(message: &T) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

/// Decode a protocol line. Anything that is not a protocol frame yields `None`.
pub fn decode_line<T: for<'de> Deserialize<'de>>(line: &str) -> Option<T> {
    let line = line.trim();
    if !line.starts_with('{') {
        return None;
    }
    serde_json::from_str(line).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_host_request_shape() {
        let request = HostRequest {
            id: 7,
            command: HostCommand::Load { path: "/p/node_modules/a/index.js".into() },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({ "id": 7, "op": "load", "path": "/p/node_modules/a/index.js" }));

        let ping = serde_json::to_value(HostRequest { id: 1, command: HostCommand::Ping }).unwrap();
        assert_eq!(ping, json!({ "id": 1, "op": "ping" }));
    }

    #[test]
    fn test_encode_line_ends_with_newline() {
        let line = encode_line(&WorkerRequest { module_path: "x".into() }).unwrap();
        assert_eq!(line, "{\"modulePath\":\"x\"}\n");
    }

    #[test]
    fn test_decode_host_replies() {
        let reply: HostReply = decode_line(r#"{"id":3,"status":"loaded","timespan":1500}"#).unwrap();
        assert_eq!(reply.id, 3);
        assert_eq!(reply.body, HostReplyBody::Loaded { timespan: 1500 });

        let reply: HostReply = decode_line(r#"{"id":4,"status":"resolved","path":null}"#).unwrap();
        assert_eq!(reply.body, HostReplyBody::Resolved { path: None });

        let reply: HostReply = decode_line(r#"{"id":5,"status":"probed","kind":"module"}"#).unwrap();
        assert_eq!(reply.body, HostReplyBody::Probed { kind: ModuleKind::Module });

        let reply: HostReply = decode_line(r#"{"id":6,"status":"failed","error":"boom"}"#).unwrap();
        assert_eq!(reply.body, HostReplyBody::Failed { error: "boom".into() });
    }

    #[test]
    fn test_decode_worker_replies() {
        assert_eq!(
            decode_line::<WorkerReply>(r#"{"timespan":42}"#),
            Some(WorkerReply::Timespan { timespan: 42 })
        );
        assert_eq!(
            decode_line::<WorkerReply>(r#"{"error":"Cannot find package"}"#),
            Some(WorkerReply::Error { error: "Cannot find package".into() })
        );
    }

    #[test]
    fn test_decode_skips_stray_output() {
        assert_eq!(decode_line::<WorkerReply>("hello from a postinstall banner"), None);
        assert_eq!(decode_line::<WorkerReply>(""), None);
        assert_eq!(decode_line::<HostReply>(r#"{"unrelated":true}"#), None);
    }
}
