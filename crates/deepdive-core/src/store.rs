//! Key-value persistence collaborator.

use async_trait::async_trait;

use crate::error::Result;

/// A string-to-string store.
///
/// `set` always replaces the whole value; there is no merge.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: key present
    /// - `Ok(None)`: key absent
    /// - `Err(_)`: the store could not be read
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a key. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}
