//! Simple SDK Example
//!
//! Demonstrates basic usage of the JobScout SDK.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package jobscout-daemon
//!    ```
//!
//! 2. Run this example (with a search spec already inserted):
//!    ```bash
//!    cargo run --example simple -- <search-id>
//!    ```

use std::time::Duration;

use jobscout_sdk::{JobscoutClient, ResultsQuery};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let search_id = std::env::args()
        .nth(1)
        .ok_or("usage: simple <search-id>")?;

    println!("JobScout SDK - Simple Example");
    println!("==============================\n");

    // 1. Connect to daemon
    println!("1. Connecting to daemon...");
    let client = JobscoutClient::connect("http://127.0.0.1:9610").await?;
    println!("   ✓ Connected\n");

    // 2. Start an execution
    println!("2. Starting search execution...");
    let started = client.start(&search_id).await?;
    println!("   ✓ Execution started:");
    println!("     - ID: {}", started.execution_id);
    println!("     - Status: {}\n", started.status);

    // 3. Wait for it to finish, reporting progress
    println!("3. Waiting for completion...");
    let terminal = client
        .wait_for_terminal(
            &started.execution_id,
            Duration::from_millis(500),
            Duration::from_secs(120),
        )
        .await?;
    println!("   ✓ Finished with status: {}", terminal.status);
    if let Some(total) = terminal.total_results_found {
        println!("     - Results found: {}", total);
    }
    println!();

    // 4. Show the activity trail
    println!("4. Activity log:");
    let activity = client.activity(&started.execution_id, 20).await?;
    for entry in &activity.entries {
        println!("   [{}] {:<7} {}", entry.timestamp, entry.severity, entry.message);
    }
    println!();

    // 5. Fetch the top results
    println!("5. Top results:");
    let results = client
        .results(
            &search_id,
            ResultsQuery {
                min_score: Some(0.1),
                limit: Some(10),
                ..ResultsQuery::default()
            },
        )
        .await?;

    for item in &results.results {
        println!(
            "   {:.2}  {} @ {} ({})",
            item.match_score, item.title, item.organization, item.source
        );
    }

    println!("\n✓ Example completed successfully!");

    Ok(())
}
