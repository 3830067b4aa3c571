//! JSON-RPC API Layer
//!
//! Exposes hook triggering, output tailing and hook listing as JSON-RPC 2.0
//! methods over HTTP.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
