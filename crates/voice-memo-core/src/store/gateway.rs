use crate::CoreResult;

/// Flat key-value durability interface.
///
/// Values are opaque bytes; the stores in this crate write JSON. The core
/// never rolls back an in-memory change because a call here failed.
#[async_trait::async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Read the value stored under `key`, `None` if absent.
    async fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: Vec<u8>) -> CoreResult<()>;
}
