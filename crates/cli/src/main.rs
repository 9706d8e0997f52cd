//! JobScout CLI - Command-line interface for the JobScout search engine
//!
//! Talks JSON-RPC to the local daemon; every engine operation is reachable
//! from a subcommand.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9610";

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(about = "JobScout Search Engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "JOBSCOUT_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an execution for a search spec
    Start {
        /// Search spec ID
        search_id: String,
    },

    /// Poll the status of an execution
    Status {
        /// Execution ID
        execution_id: String,
    },

    /// Request cancellation of a running execution
    Cancel {
        /// Execution ID
        execution_id: String,
    },

    /// List persisted results for a search spec
    Results {
        /// Search spec ID
        search_id: String,

        /// Only results from this source
        #[arg(long)]
        source: Option<String>,

        /// Minimum match score (0.0 - 1.0)
        #[arg(long)]
        min_score: Option<f64>,

        /// Include results flagged as duplicates
        #[arg(long)]
        include_duplicates: bool,

        /// Maximum rows to show
        #[arg(short = 'n', long, default_value = "25")]
        limit: usize,
    },

    /// Tail the activity log of an execution
    Activity {
        /// Execution ID
        execution_id: String,

        /// Number of entries to tail
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },

    /// Show daemon statistics
    Stats,
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
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Tabled)]
struct ResultRow {
    score: String,
    title: String,
    organization: String,
    source: String,
    location: String,
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
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn print_status(status: &serde_json::Value) {
    let state = status["status"].as_str().unwrap_or("unknown");
    let colored_state = match state {
        "completed" => state.green().bold(),
        "failed" => state.red().bold(),
        "cancelled" | "cancelling" => state.yellow().bold(),
        _ => state.cyan().bold(),
    };

    println!("  {} {}", "Execution:".bold(), status["execution_id"]);
    println!("  {} {}", "Status:".bold(), colored_state);

    if let Some(progress) = status.get("progress").filter(|p| !p.is_null()) {
        println!(
            "  {} {}/{} ({})",
            "Step:".bold(),
            progress["completed_steps"],
            progress["total_steps"],
            progress["current_step"].as_str().unwrap_or("-")
        );
        if let Some(source) = progress["current_source"].as_str() {
            println!("  {} {}", "Source:".bold(), source);
        }
        println!(
            "  {} {}",
            "Results so far:".bold(),
            progress["results_found"]
        );
    }

    if let Some(total) = status["total_results_found"].as_i64() {
        println!("  {} {}", "Total results:".bold(), total);
    }
    if let Some(error) = status["error_message"].as_str() {
        println!("  {} {}", "Error:".bold(), error.red());
    }
    println!(
        "  {} {:.1}s",
        "Uptime:".bold(),
        status["uptime_ms"].as_i64().unwrap_or(0) as f64 / 1000.0
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { search_id } => {
            let params = json!({ "search_id": search_id });
            let result = call_rpc(&cli.rpc_url, "search.start.v1", params).await?;

            println!("{}", "✓ Search execution started".green().bold());
            println!();
            println!("  {} {}", "Execution:".bold(), result["execution_id"]);
            println!("  {} {}", "Search:".bold(), result["search_id"]);
        }

        Commands::Status { execution_id } => {
            let params = json!({ "execution_id": execution_id });
            let result = call_rpc(&cli.rpc_url, "search.status.v1", params).await?;

            println!("{}", "Execution Status".cyan().bold());
            println!();
            print_status(&result);
        }

        Commands::Cancel { execution_id } => {
            let params = json!({ "execution_id": execution_id });
            let result = call_rpc(&cli.rpc_url, "search.cancel.v1", params).await?;

            println!(
                "{}",
                format!(
                    "✓ {}",
                    result["message"].as_str().unwrap_or("cancellation requested")
                )
                .green()
                .bold()
            );
        }

        Commands::Results {
            search_id,
            source,
            min_score,
            include_duplicates,
            limit,
        } => {
            let params = json!({
                "search_id": search_id,
                "source": source,
                "min_score": min_score,
                "include_duplicates": include_duplicates,
                "limit": limit,
            });
            let result = call_rpc(&cli.rpc_url, "search.results.v1", params).await?;

            let empty = vec![];
            let results = result["results"].as_array().unwrap_or(&empty);

            println!(
                "{}",
                format!(
                    "{} of {} results for search {}",
                    results.len(),
                    result["total"],
                    search_id
                )
                .cyan()
                .bold()
            );
            println!();

            if results.is_empty() {
                println!("  {}", "No results found".yellow());
            } else {
                let rows: Vec<ResultRow> = results
                    .iter()
                    .map(|r| ResultRow {
                        score: format!("{:.2}", r["match_score"].as_f64().unwrap_or(0.0)),
                        title: r["title"].as_str().unwrap_or("-").to_string(),
                        organization: r["organization"].as_str().unwrap_or("-").to_string(),
                        source: r["source"].as_str().unwrap_or("-").to_string(),
                        location: r["location"].as_str().unwrap_or("-").to_string(),
                    })
                    .collect();

                println!("{}", Table::new(rows));
            }
        }

        Commands::Activity {
            execution_id,
            limit,
        } => {
            let params = json!({
                "execution_id": execution_id,
                "limit": limit,
            });
            let result = call_rpc(&cli.rpc_url, "search.activity.v1", params).await?;

            let empty = vec![];
            let entries = result["entries"].as_array().unwrap_or(&empty);

            println!(
                "{}",
                format!("Activity for execution {}:", execution_id)
                    .cyan()
                    .bold()
            );
            println!();

            for entry in entries {
                let severity = entry["severity"].as_str().unwrap_or("info");
                let tag = match severity {
                    "success" => severity.green(),
                    "error" => severity.red(),
                    "debug" => severity.dimmed(),
                    _ => severity.normal(),
                };
                println!(
                    "  [{}] {:<7} {}",
                    entry["timestamp"],
                    tag,
                    entry["message"].as_str().unwrap_or("")
                );
            }
        }

        Commands::Stats => {
            println!("{}", "Daemon Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "admin.stats.v1", json!({})).await {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!(
                        "  {} {}",
                        "Live executions:".bold(),
                        stats["live_executions"]
                    );
                    println!(
                        "  {} {} seconds",
                        "Uptime:".bold(),
                        stats["uptime_seconds"]
                    );
                    println!("  {} {}", "Version:".bold(), stats["version"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}
