use crate::error::{NyoError, StorageError};
use crate::types::ProjectState;

/// Defines the contract for project state backends.
///
/// The whole document is the unit of persistence. `transact` is the only
/// write path: it holds exclusive access across load, mutate and save, and
/// commits only when `mutate` returns `Ok`.
pub trait StateStore {
    /// Read the current document, `None` when no project has been created
    fn load(&self) -> Result<Option<ProjectState>, StorageError>;

    /// Persist a brand new document. Fails if one already exists.
    fn create(&self, state: &ProjectState) -> Result<(), NyoError>;

    /// Run `mutate` against the latest document under exclusive access
    fn transact<T, F>(&self, mutate: F) -> Result<T, NyoError>
    where
        F: FnOnce(&mut ProjectState) -> Result<T, NyoError>;

    /// Human readable location, for messages
    fn describe(&self) -> String;
}
