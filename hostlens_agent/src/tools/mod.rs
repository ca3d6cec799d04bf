//! Tool registry and dispatch: maps tool names to their handlers.

pub mod system_info;
pub mod top_processes;

use crate::envelope::Envelope;
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
}

const REGISTRY: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: system_info::NAME,
        description: system_info::DESCRIPTION,
    },
    ToolDescriptor {
        name: top_processes::NAME,
        description: top_processes::DESCRIPTION,
    },
];

pub fn registry() -> &'static [ToolDescriptor] {
    REGISTRY
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Parse one request frame and run the matching tool. Every anticipated
/// failure, including malformed JSON and unknown tool names, comes back as
/// an error envelope rather than a transport-level fault.
pub async fn dispatch_text(state: &AppState, text: &str) -> Envelope {
    match serde_json::from_str::<ToolRequest>(text) {
        Ok(req) => dispatch(state, req).await,
        Err(err) => Envelope::err(format!("Invalid tool request: {err}")),
    }
}

pub async fn dispatch(state: &AppState, req: ToolRequest) -> Envelope {
    match req.tool.as_str() {
        system_info::NAME => system_info::run(state).await,
        top_processes::NAME => top_processes::run(state, &req.arguments).await,
        other => Envelope::err(format!("Unknown tool: {other}")),
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
