//! Entry point for the hostlens CLI: invoke a named tool on a running agent
//! and print the JSON envelope it returns.

mod ws;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(name = "hostlens")]
#[command(version, about = "Call hostlens agent tools over WebSocket")]
struct Cli {
    /// Tool to invoke (see GET /tools on the agent for the registry)
    tool: String,
    /// Agent WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:3000/ws")]
    url: String,
    /// Maximum number of processes (get_top_resource_processes only)
    #[arg(short, long)]
    limit: Option<i64>,
    /// Pretty-print the JSON reply
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let parsed = url::Url::parse(&cli.url).context("invalid agent URL")?;
    if !matches!(parsed.scheme(), "ws" | "wss") {
        bail!("agent URL must use ws:// or wss://, got {}", parsed.scheme());
    }

    let mut arguments = serde_json::Map::new();
    if let Some(limit) = cli.limit {
        arguments.insert("limit".into(), json!(limit));
    }
    let request = json!({ "tool": cli.tool, "arguments": Value::Object(arguments) });

    let mut stream = ws::connect(&cli.url).await?;
    let reply = ws::call_tool(&mut stream, &request).await?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&reply)?
    } else {
        serde_json::to_string(&reply)?
    };
    println!("{rendered}");

    // Failures come back as successfully-delivered error envelopes; surface
    // them through the exit code.
    if !tool_succeeded(&reply) {
        std::process::exit(1);
    }
    Ok(())
}

/// The agent replies with a one-element array; the envelope's `success`
/// flag decides the exit code.
fn tool_succeeded(reply: &Value) -> bool {
    reply
        .as_array()
        .and_then(|items| items.first())
        .and_then(|env| env.get("success"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
