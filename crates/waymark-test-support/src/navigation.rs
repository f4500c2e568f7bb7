//! Test navigator — records navigation requests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use waymark_core::error::TourError;
use waymark_core::model::Location;
use waymark_core::ports::Navigator;

/// Records every `navigate_to` call and the navigations that settled.
/// Navigation takes `delay` (on the tokio clock) and fails for locations
/// marked unreachable.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    delay: Duration,
    unreachable: HashSet<Location>,
    requested: Mutex<Vec<Location>>,
    settled: Mutex<Vec<Location>>,
}

impl RecordingNavigator {
    /// Creates a navigator that settles immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a navigator that settles after `delay`.
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Marks `location` as unreachable.
    #[must_use]
    pub fn unreachable(mut self, location: &str) -> Self {
        self.unreachable.insert(Location::new(location));
        self
    }

    /// Locations requested, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requested(&self) -> Vec<Location> {
        self.requested.lock().unwrap().clone()
    }

    /// Locations whose navigation completed successfully, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn settled(&self) -> Vec<Location> {
        self.settled.lock().unwrap().clone()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate_to(&self, location: &Location) -> Result<(), TourError> {
        self.requested.lock().unwrap().push(location.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.unreachable.contains(location) {
            return Err(TourError::Navigation(format!("no route for {location}")));
        }
        self.settled.lock().unwrap().push(location.clone());
        Ok(())
    }
}
