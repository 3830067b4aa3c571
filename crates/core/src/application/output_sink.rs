// Output Sink - tail buffers plus fan-out toward log shipping

use crate::application::registry::ExecutionRegistry;
use crate::domain::{ExecutionSnapshot, LabelSet, LogEntry, HOOK_ID_LABEL};
use crate::port::{LineSink, LogShipper, TimeProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

struct Shipping {
    shipper: Arc<dyn LogShipper>,
    base_labels: LabelSet,
    time_provider: Arc<dyn TimeProvider>,
}

/// Records hook output into the registry and optionally ships it
pub struct OutputSink {
    registry: Arc<ExecutionRegistry>,
    shipping: Option<Shipping>,
}

impl OutputSink {
    /// Sink that only keeps lines in the tail buffers
    pub fn new(registry: Arc<ExecutionRegistry>) -> Self {
        Self {
            registry,
            shipping: None,
        }
    }

    /// Also forward every recorded line to `shipper`
    ///
    /// Each entry carries `base_labels` plus `hook_id=<id>`.
    pub fn with_shipper(
        mut self,
        shipper: Arc<dyn LogShipper>,
        base_labels: LabelSet,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        self.shipping = Some(Shipping {
            shipper,
            base_labels,
            time_provider,
        });
        self
    }

    pub fn is_shipping(&self) -> bool {
        self.shipping.is_some()
    }

    /// Append `line` to the hook's tail buffer and ship it if enabled
    ///
    /// The per-hook lock is released before the hand-off, so a full shipper
    /// queue delays this producer only, never readers of the buffer.
    pub async fn record(&self, hook_id: &str, line: String) {
        trace!(hook_id = %hook_id, line = %line, "Recording output line");
        let state = self.registry.get_or_create(hook_id);

        match &self.shipping {
            None => state.push_line(line),
            Some(shipping) => {
                let timestamp_nanos = shipping.time_provider.now_nanos();
                state.push_line(line.clone());

                let labels = shipping.base_labels.with(HOOK_ID_LABEL, hook_id);
                shipping
                    .shipper
                    .enqueue(LogEntry::new(labels, line, timestamp_nanos))
                    .await;
            }
        }
    }

    /// Current state of a hook, `None` if the hook was never referenced
    pub fn snapshot(&self, hook_id: &str) -> Option<ExecutionSnapshot> {
        self.registry.get(hook_id).map(|state| state.snapshot())
    }

    /// Line sink bound to one hook, handed to the command runner
    pub fn for_hook<'a>(&'a self, hook_id: &'a str) -> HookOutput<'a> {
        HookOutput {
            sink: self,
            hook_id,
        }
    }
}

/// `LineSink` view of an `OutputSink` for a single hook
pub struct HookOutput<'a> {
    sink: &'a OutputSink,
    hook_id: &'a str,
}

#[async_trait]
impl LineSink for HookOutput<'_> {
    async fn emit(&self, line: String) {
        self.sink.record(self.hook_id, line).await;
    }
}
