use std::sync::Mutex;

use crate::error::{NyoError, StorageError};
use crate::infrastructure::StateStore;
use crate::types::ProjectState;

/// Process-local store. The mutex serializes transactions.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: Mutex<Option<ProjectState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ProjectState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> Result<Option<ProjectState>, StorageError> {
        let guard = self.state.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }

    fn create(&self, state: &ProjectState) -> Result<(), NyoError> {
        let mut guard = self.state.lock().map_err(|_| StorageError::Poisoned)?;
        if guard.is_some() {
            return Err(NyoError::AlreadyInitialized(self.describe()));
        }
        *guard = Some(state.clone());
        Ok(())
    }

    fn transact<T, F>(&self, mutate: F) -> Result<T, NyoError>
    where
        F: FnOnce(&mut ProjectState) -> Result<T, NyoError>,
    {
        let mut guard = self.state.lock().map_err(|_| StorageError::Poisoned)?;
        let mut working = guard.clone().ok_or(NyoError::NoProject)?;
        let value = mutate(&mut working)?;
        *guard = Some(working);
        Ok(value)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
