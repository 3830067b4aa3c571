// hooktail Infrastructure - Loki Adapter
// Implements: LogShipper (batched push to /loki/api/v1/push)

pub mod batch;
pub mod client;
pub mod error;
pub mod shipper;

pub use batch::{Batch, PushRequest, PushStream};
pub use client::LokiClient;
pub use error::ShipError;
pub use shipper::{LokiConfig, LokiShipper};
