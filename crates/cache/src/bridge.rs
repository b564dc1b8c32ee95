use crate::error::BridgeError;
use async_trait::async_trait;
use docmeta_model::{TypeDescriptor, TypeDetails};

/// Network collaborator the cache depends on.
///
/// Implementations own their session with the repository server; the cache
/// only sees the three calls below. All of them are the cache's suspension
/// points — everything else is in-memory compute.
#[async_trait]
pub trait RepositoryBridge: Send + Sync {
    /// Flat list of every type known to the repository.
    async fn get_types(&self) -> Result<Vec<TypeDescriptor>, BridgeError>;

    /// Attribute detail for one type, by name.
    async fn get_type_details(&self, type_name: &str) -> Result<TypeDetails, BridgeError>;

    /// Raw dump text for an object or type, by identifier.
    async fn execute_dump(&self, target_id: &str) -> Result<String, BridgeError>;
}
