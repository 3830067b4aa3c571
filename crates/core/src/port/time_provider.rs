// Time Provider Port (for testability)

use chrono::{DateTime, Utc};

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Current time in nanoseconds since epoch
    ///
    /// Saturates to 0 outside the range representable in an `i64`
    /// (years 1677..2262).
    fn now_nanos(&self) -> i64 {
        self.now().timestamp_nanos_opt().unwrap_or_default()
    }
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that starts at a fixed instant and moves forward one
    /// microsecond on every read, so consecutive captures are distinct
    pub struct SteppingTimeProvider {
        micros: AtomicI64,
    }

    impl SteppingTimeProvider {
        pub fn starting_at(start: DateTime<Utc>) -> Self {
            Self {
                micros: AtomicI64::new(start.timestamp_micros()),
            }
        }
    }

    impl TimeProvider for SteppingTimeProvider {
        fn now(&self) -> DateTime<Utc> {
            let micros = self.micros.fetch_add(1, Ordering::SeqCst);
            DateTime::from_timestamp_micros(micros).unwrap_or_default()
        }
    }
}
