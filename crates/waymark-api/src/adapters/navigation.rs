//! Navigation for browser-hosted tours.

use async_trait::async_trait;
use tracing::debug;
use waymark_core::error::TourError;
use waymark_core::model::Location;
use waymark_core::ports::Navigator;

/// Accepts every location at once. The client routes to the snapshot's
/// `current_location` when it changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientNavigator;

#[async_trait]
impl Navigator for ClientNavigator {
    async fn navigate_to(&self, location: &Location) -> Result<(), TourError> {
        if !location.as_str().starts_with('/') {
            return Err(TourError::Navigation(format!(
                "`{location}` is not an absolute path"
            )));
        }
        debug!(%location, "client navigation published");
        Ok(())
    }
}
