// Defaults shared by the daemon configuration and the adapters
use std::time::Duration;

/// Lines kept per hook when the configuration does not say otherwise
pub const DEFAULT_TAIL_LINES: usize = 100;

/// Capacity of the queue between output capture and the log shipper
///
/// Producers wait once it is full, so this bounds shipper memory while
/// absorbing short stalls of the remote endpoint.
pub const DEFAULT_SHIPPER_QUEUE_CAPACITY: usize = 1024;

/// Time trigger for log batches (5s)
pub const DEFAULT_BATCH_WAIT: Duration = Duration::from_secs(5);

/// Size trigger for log batches, counted in distinct label sets
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Upper bound for one push request to the log endpoint (10s)
pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(10);
