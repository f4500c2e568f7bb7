//! Best-effort flag writes.

use tracing::warn;
use uuid::Uuid;
use waymark_core::flags::FlagName;
use waymark_core::ports::FlagStore;

/// A failed write is retried once.
const WRITE_ATTEMPTS: u32 = 2;

/// Writes `flag`, retrying once. Returns `false` if both attempts failed; the
/// caller degrades instead of surfacing the error.
pub(crate) async fn write_flag(
    store: &dyn FlagStore,
    identity: Uuid,
    flag: &FlagName,
    value: bool,
) -> bool {
    for attempt in 1..=WRITE_ATTEMPTS {
        match store.set_flag(identity, flag, value).await {
            Ok(()) => return true,
            Err(e) => warn!(%identity, %flag, attempt, error = %e, "flag write failed"),
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_test_support::{FailingFlagStore, RecordingFlagStore};

    #[tokio::test]
    async fn test_write_succeeds_first_time() {
        let store = RecordingFlagStore::new();
        let identity = Uuid::new_v4();

        assert!(write_flag(&store, identity, &FlagName::HasSeenTour, true).await);
        assert_eq!(store.write_attempts(), 1);
        assert!(store.value(identity, &FlagName::HasSeenTour));
    }

    #[tokio::test]
    async fn test_single_failure_is_retried() {
        let store = RecordingFlagStore::failing_first(1);
        let identity = Uuid::new_v4();

        assert!(write_flag(&store, identity, &FlagName::HasSeenTour, true).await);
        assert_eq!(store.write_attempts(), 2);
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_one_retry() {
        let store = FailingFlagStore::new();

        assert!(!write_flag(&store, Uuid::new_v4(), &FlagName::HasSeenTour, true).await);
        assert_eq!(store.write_attempts(), 2);
    }
}
