//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 server for the JobScout search engine.
//! Every engine operation is reachable here: start, status, cancel,
//! results, activity tail, and daemon stats.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
