//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use crate::models::{Illustration, ProcessingTask};
use uuid::Uuid;

/// Data persistence contract for illustrations.
#[async_trait]
pub trait IllustRepo: Send + Sync {
    /// Persists a new illustration atomically. The hash set is final at
    /// creation time.
    async fn create_illust(&self, illust: &Illustration) -> anyhow::Result<()>;
    async fn get_illust(&self, id: Uuid) -> anyhow::Result<Option<Illustration>>;
    /// Most recent public illustrations, newest first.
    async fn list_recent(&self, limit: i64) -> anyhow::Result<Vec<Illustration>>;
}

/// Durable object storage contract, keyed by content address.
///
/// `put` must be safe to call repeatedly with the same key and equal bytes:
/// content addressing means a re-write of identical content is a no-op from
/// a correctness standpoint.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> anyhow::Result<()>;
}

/// Durable dispatch contract for scaling tasks.
///
/// Implementations must publish with persistent delivery (the message
/// survives a broker restart before consumption). Delivery is at-least-once;
/// the downstream worker must tolerate reprocessing.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn publish(&self, task: &ProcessingTask) -> anyhow::Result<()>;
}

/// Identity contract. Token issuance/verification only — user accounts
/// themselves live behind this boundary.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Issues a bearer token for a user.
    fn issue_token(&self, user_id: Uuid) -> String;

    /// Resolves a bearer token to a user ID, or `None` if invalid.
    async fn authenticate(&self, token: &str) -> anyhow::Result<Option<Uuid>>;
}
