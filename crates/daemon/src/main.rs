//! hooktail - Main Entry Point
//! Webhook-triggered shell commands with output tailing and Loki shipping

mod settings;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hooktail_api_rpc::{RpcServer, RpcServerConfig};
use hooktail_core::application::{shutdown_channel, ExecutionRegistry, HookService, OutputSink};
use hooktail_core::port::{SystemTimeProvider, TimeProvider};
use hooktail_infra_loki::LokiShipper;
use hooktail_infra_system::ShellCommandRunner;

use settings::{resolve_config_path, Settings};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHIPPER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

fn init_logging() -> Result<()> {
    let log_format = std::env::var("HOOKTAIL_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("hooktail=info"))?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    init_logging()?;
    info!("hooktail v{} starting...", VERSION);

    // 2. Configuration
    let config_path = resolve_config_path(std::env::args().nth(1));
    info!(path = %config_path.display(), "Loading configuration");
    let settings = Settings::load(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    let hooks = settings.hooks();
    for hook in &hooks {
        info!(
            hook_id = %hook.id,
            command = %hook.execute_command,
            working_dir = %hook.command_working_directory.display(),
            "Registered hook"
        );
    }

    // 3. DI wiring
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let registry = Arc::new(ExecutionRegistry::new(
        settings.server.tail.lines,
        time_provider.clone(),
    ));
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let mut sink = OutputSink::new(registry.clone());
    let mut shipper_handle = None;

    if settings.loki.enabled {
        let base_labels = settings.base_labels()?;
        let (shipper, handle) = LokiShipper::spawn(settings.loki_config(), shutdown_rx.clone())
            .map_err(|e| anyhow::anyhow!("Loki shipper start failed: {}", e))?;
        sink = sink.with_shipper(Arc::new(shipper), base_labels, time_provider.clone());
        shipper_handle = Some(handle);
    } else {
        info!("Loki shipping disabled");
    }

    let service = Arc::new(HookService::new(
        hooks,
        registry,
        Arc::new(sink),
        Arc::new(ShellCommandRunner::default()),
    ));

    // 4. JSON-RPC server
    let rpc_config = RpcServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, service)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "Ready. Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;

    if let Some(handle) = shipper_handle {
        if tokio::time::timeout(SHIPPER_DRAIN_TIMEOUT, handle).await.is_err() {
            warn!("Loki shipper did not stop in time");
        }
    }

    info!("Shutdown complete");
    Ok(())
}
