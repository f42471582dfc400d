//! Persistence provider seam
//!
//! Abstracts the per-user remote document store so sync works with any
//! backend. Every write is independent: there is no transaction spanning a
//! collection write and an ordering-list write.

use crate::error::Result;
use crate::types::{Collection, Document, OrderList};
use async_trait::async_trait;
use melo_core::UserId;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// Document field set to the server time by [`PersistenceProvider::upsert_stamped`]
pub const LAST_HEARD_AT: &str = "lastHeardAt";

/// Remote store scoped to a single user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistenceProvider: Send + Sync {
    /// User this scope belongs to
    fn user_id(&self) -> UserId;

    // ========================================================================
    // Collections
    // ========================================================================

    /// Create or overwrite the document `id`
    async fn upsert(&self, collection: Collection, id: &str, data: Value) -> Result<()>;

    /// Like `upsert`, with `stamp_field` set to the provider's current time
    async fn upsert_stamped(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
        stamp_field: &str,
    ) -> Result<()>;

    /// Delete the document `id` (absent ids are not an error)
    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;

    // ========================================================================
    // Ordering lists
    // ========================================================================

    /// Append `id` unless already present
    async fn order_union(&self, list: OrderList, id: &str) -> Result<()>;

    /// Remove `id` if present
    async fn order_remove(&self, list: OrderList, id: &str) -> Result<()>;

    /// Replace the whole list
    async fn order_overwrite(&self, list: OrderList, ids: Vec<String>) -> Result<()>;

    // ========================================================================
    // Live subscriptions
    // ========================================================================

    /// Whole-collection snapshots, pushed on every change
    async fn subscribe_collection(
        &self,
        collection: Collection,
    ) -> Result<watch::Receiver<Vec<Document>>>;

    /// Whole-list snapshots, pushed on every change
    async fn subscribe_order(&self, list: OrderList) -> Result<watch::Receiver<Vec<String>>>;
}

/// Opens per-user scopes of a store
pub trait PersistenceConnector: Send + Sync {
    fn connect(&self, user: &UserId) -> Arc<dyn PersistenceProvider>;
}
