//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::{not_found, to_rpc_error, trigger_error};
use crate::types::{ListResponse, TailRequest, TailResponse, TriggerRequest, TriggerResponse};
use hooktail_core::application::HookService;
use hooktail_core::error::AppError;
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use tracing::debug;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    service: Arc<HookService>,
}

impl RpcHandler {
    pub fn new(service: Arc<HookService>) -> Self {
        Self { service }
    }

    /// hooks.trigger.v1
    ///
    /// Responds as soon as the run is started; the run itself continues in
    /// its own task.
    pub async fn trigger(
        &self,
        params: TriggerRequest,
    ) -> Result<TriggerResponse, ErrorObjectOwned> {
        require_hook_id(&params.hook_id)?;
        let run = self
            .service
            .trigger(&params.hook_id)
            .map_err(trigger_error)?;
        debug!(hook_id = %run.hook_id(), "Run detached from RPC request");

        Ok(TriggerResponse {
            status: "started".to_string(),
            hook_id: params.hook_id,
        })
    }

    /// hooks.tail.v1
    pub async fn tail(&self, params: TailRequest) -> Result<TailResponse, ErrorObjectOwned> {
        require_hook_id(&params.hook_id)?;
        let snapshot = self
            .service
            .tail(&params.hook_id)
            .ok_or_else(|| not_found(&params.hook_id))?;

        Ok(TailResponse::from_snapshot(
            params.hook_id,
            snapshot,
            params.lines,
        ))
    }

    /// hooks.list.v1
    pub async fn list(&self) -> Result<ListResponse, ErrorObjectOwned> {
        Ok(ListResponse {
            message: "Webhook server is running".to_string(),
            hooks: self.service.hooks().to_vec(),
        })
    }
}

fn require_hook_id(hook_id: &str) -> Result<(), ErrorObjectOwned> {
    if hook_id.trim().is_empty() {
        return Err(to_rpc_error(AppError::Validation(
            "hook_id must not be empty".to_string(),
        )));
    }
    Ok(())
}
