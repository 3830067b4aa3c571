//! hooktail CLI - Trigger hooks and tail their output on a running daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9000";

#[derive(Parser)]
#[command(name = "hooktail-cli")]
#[command(about = "hooktail CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "HOOKTAIL_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a hook's command
    Trigger {
        /// Hook ID
        hook_id: String,
    },

    /// Show running state and recent output of a hook
    Tail {
        /// Hook ID
        hook_id: String,

        /// Only the newest N lines
        #[arg(short = 'n', long)]
        lines: Option<usize>,
    },

    /// List configured hooks
    List,
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Thin JSON-RPC 2.0 client for the daemon
struct RpcClient {
    http: reqwest::Client,
    url: String,
}

impl RpcClient {
    fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response: JsonRpcResponse<T> = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to connect to daemon at {}", self.url))?
            .json()
            .await
            .context("Failed to parse response")?;

        if let Some(error) = response.error {
            anyhow::bail!("RPC error ({}): {}", error.code, error.message);
        }

        response
            .result
            .ok_or_else(|| anyhow::anyhow!("No result in response"))
    }
}

#[derive(Deserialize)]
struct TailResult {
    status: String,
    output: Vec<String>,
    last_exec: Option<String>,
}

#[derive(Deserialize)]
struct ListResult {
    message: String,
    hooks: Vec<HookRow>,
}

#[derive(Deserialize, Tabled)]
struct HookRow {
    #[tabled(rename = "ID")]
    id: String,
    #[serde(rename = "execute-command")]
    #[tabled(rename = "Command")]
    execute_command: String,
    #[serde(rename = "command-working-directory")]
    #[tabled(rename = "Working Directory")]
    command_working_directory: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = RpcClient::new(cli.rpc_url);

    match cli.command {
        Commands::Trigger { hook_id } => {
            let params = json!({ "hook_id": hook_id });

            let _: serde_json::Value = client.call("hooks.trigger.v1", params).await?;

            println!("{}", format!("✓ Hook {} started", hook_id).green().bold());
        }

        Commands::Tail { hook_id, lines } => {
            let params = json!({
                "hook_id": hook_id,
                "lines": lines,
            });

            let tail: TailResult = client.call("hooks.tail.v1", params).await?;

            let status = match tail.status.as_str() {
                "running" => tail.status.yellow(),
                _ => tail.status.green(),
            };
            println!("{} {}", format!("Hook {}:", hook_id).cyan().bold(), status);
            println!(
                "  {} {}",
                "Last run:".bold(),
                tail.last_exec.as_deref().unwrap_or("never")
            );
            println!();

            if tail.output.is_empty() {
                println!("{}", "No output captured".yellow());
            } else {
                for line in tail.output {
                    println!("{}", line);
                }
            }
        }

        Commands::List => {
            let list: ListResult = client.call("hooks.list.v1", json!({})).await?;

            println!("{}", list.message.cyan().bold());
            println!();
            println!("{}", Table::new(list.hooks));
        }
    }

    Ok(())
}
