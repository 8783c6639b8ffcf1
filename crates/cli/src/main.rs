//! qmctl - Command-line interface for the Queue Manager daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";

/// Server error code for a missing item or an empty queue
const NOT_FOUND_CODE: i32 = 4001;

#[derive(Parser)]
#[command(name = "qmctl")]
#[command(about = "Queue Manager CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "QUEUE_MANAGER_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Enqueue a new item
    Enqueue {
        /// Item payload
        text: String,

        /// Simulated processing time in milliseconds
        #[arg(short, long, default_value = "0")]
        cost: u32,
    },

    /// Remove the oldest item without processing it
    Dequeue,

    /// Show a queued item
    Get {
        /// Item ID
        id: String,
    },

    /// Number of queued items
    Size,

    /// Remove every queued item
    Clear,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize, thiserror::Error)]
#[error("RPC error ({code}): {message}")]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// True if the daemon answered with the not-found code
fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<JsonRpcError>()
        .is_some_and(|rpc| rpc.code == NOT_FOUND_CODE)
}

#[derive(Deserialize, Tabled)]
struct ItemRow {
    id: String,
    text: String,
    cost: u32,
    enqueued_at: i64,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        return Err(error.into());
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn print_item(result: serde_json::Value) -> Result<()> {
    let item: ItemRow = serde_json::from_value(result).context("Unexpected item shape")?;
    println!("{}", Table::new(vec![item]));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Enqueue { text, cost } => {
            let params = json!({ "text": text, "cost": cost });
            let result = call_rpc(&cli.rpc_url, "queue.enqueue.v1", params).await?;

            println!("{}", "✓ Item enqueued".green().bold());
            println!();
            print_item(result)?;
        }

        Commands::Dequeue => match call_rpc(&cli.rpc_url, "queue.dequeue.v1", json!({})).await {
            Ok(result) => {
                println!("{}", "✓ Item removed".green().bold());
                println!();
                print_item(result)?;
            }
            Err(e) if is_not_found(&e) => {
                println!("{}", "Queue is empty".yellow());
            }
            Err(e) => return Err(e),
        },

        Commands::Get { id } => {
            let result = call_rpc(&cli.rpc_url, "queue.get.v1", json!({ "id": id })).await?;
            print_item(result)?;
        }

        Commands::Size => {
            let result = call_rpc(&cli.rpc_url, "queue.size.v1", json!({})).await?;
            println!("  {} {}", "Queued:".bold(), result["size"]);
        }

        Commands::Clear => {
            call_rpc(&cli.rpc_url, "queue.clear.v1", json!({})).await?;
            println!("{}", "✓ Queue cleared".green().bold());
        }
    }

    Ok(())
}
