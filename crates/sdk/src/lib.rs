//! JobScout SDK - Rust Client Library
//!
//! Provides a typed client for the JobScout daemon's JSON-RPC API.
//!
//! # Example
//!
//! ```no_run
//! use jobscout_sdk::JobscoutClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect to daemon
//!     let client = JobscoutClient::connect("http://127.0.0.1:9610").await?;
//!
//!     // Fire off a search and poll it
//!     let started = client.start("my-search-spec").await?;
//!     println!("Execution started: {}", started.execution_id);
//!
//!     let status = client.status(&started.execution_id).await?;
//!     println!("Status: {}", status.status);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::JobscoutClient;
pub use error::{Result, SdkError};
pub use types::{
    ActivityEntry, ActivityResponse, CancelResponse, Progress, ResultItem, ResultsQuery,
    ResultsResponse, StartResponse, StatsResponse, StatusResponse,
};
