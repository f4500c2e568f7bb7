//! Process-local flag store for running without a database.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use waymark_core::error::TourError;
use waymark_core::flags::FlagName;
use waymark_core::ports::FlagStore;

/// Flags held in memory for the life of the process.
#[derive(Debug, Default)]
pub struct InMemoryFlagStore {
    flags: RwLock<HashMap<(Uuid, String), bool>>,
}

impl InMemoryFlagStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlagStore for InMemoryFlagStore {
    async fn get_flag(&self, identity: Uuid, name: &FlagName) -> Result<bool, TourError> {
        let flags = self
            .flags
            .read()
            .map_err(|_| TourError::Persistence("flag store lock poisoned".into()))?;
        Ok(flags.get(&(identity, name.key())).copied().unwrap_or(false))
    }

    async fn set_flag(
        &self,
        identity: Uuid,
        name: &FlagName,
        value: bool,
    ) -> Result<(), TourError> {
        let mut flags = self
            .flags
            .write()
            .map_err(|_| TourError::Persistence("flag store lock poisoned".into()))?;
        flags.insert((identity, name.key()), value);
        Ok(())
    }
}
