//! In-memory persistence provider
//!
//! Holds every user's documents in process. Echoes (subscription pushes) are
//! delivered immediately by default; [`MemoryStore::hold_echoes`] buffers them
//! until [`MemoryStore::flush_echoes`], which simulates remote latency.

use crate::error::{Result, SyncError};
use crate::store::{PersistenceConnector, PersistenceProvider};
use crate::types::{Collection, Document, OrderList};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use melo_core::UserId;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

/// Store operation, for fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Upsert,
    Delete,
    OrderUnion,
    OrderRemove,
    OrderOverwrite,
    Subscribe,
}

/// Shared in-memory store; clones share state
#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
}

#[derive(Default)]
struct Shared {
    collections: HashMap<(UserId, Collection), CollectionSlot>,
    orders: HashMap<(UserId, OrderList), OrderSlot>,
    hold_echoes: bool,
    failures: HashMap<StoreOp, usize>,
    last_stamp: Option<DateTime<Utc>>,
}

struct CollectionSlot {
    documents: BTreeMap<String, Value>,
    tx: watch::Sender<Vec<Document>>,
    dirty: bool,
}

impl CollectionSlot {
    fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            documents: BTreeMap::new(),
            tx,
            dirty: false,
        }
    }

    fn snapshot(&self) -> Vec<Document> {
        self.documents
            .iter()
            .map(|(id, data)| Document::new(id.clone(), data.clone()))
            .collect()
    }

    fn publish(&mut self, hold: bool) {
        if hold {
            self.dirty = true;
        } else {
            self.tx.send_replace(self.snapshot());
            self.dirty = false;
        }
    }
}

struct OrderSlot {
    ids: Vec<String>,
    tx: watch::Sender<Vec<String>>,
    dirty: bool,
}

impl OrderSlot {
    fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            ids: Vec::new(),
            tx,
            dirty: false,
        }
    }

    fn publish(&mut self, hold: bool) {
        if hold {
            self.dirty = true;
        } else {
            self.tx.send_replace(self.ids.clone());
            self.dirty = false;
        }
    }
}

impl Shared {
    fn check(&mut self, op: StoreOp, target: &str) -> Result<()> {
        if let Some(remaining) = self.failures.get_mut(&op) {
            if *remaining > 0 {
                *remaining -= 1;
                debug!(?op, target, "Injected store failure");
                return Err(match op {
                    StoreOp::Subscribe => SyncError::SubscriptionFailed(target.to_string()),
                    _ => SyncError::write_rejected(target, "injected failure"),
                });
            }
        }
        Ok(())
    }

    fn collection(&mut self, user: &UserId, collection: Collection) -> &mut CollectionSlot {
        self.collections
            .entry((user.clone(), collection))
            .or_insert_with(CollectionSlot::new)
    }

    fn order(&mut self, user: &UserId, list: OrderList) -> &mut OrderSlot {
        self.orders
            .entry((user.clone(), list))
            .or_insert_with(OrderSlot::new)
    }

    // Strictly increasing so that recency order is total
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Concrete scope for `user`
    pub fn scope(&self, user: UserId) -> MemoryScope {
        MemoryScope {
            user,
            store: self.clone(),
        }
    }

    /// Buffer subscription pushes until `flush_echoes`
    pub fn hold_echoes(&self) {
        self.lock().hold_echoes = true;
    }

    /// Push every buffered change and return to immediate echoes
    pub fn flush_echoes(&self) {
        let mut shared = self.lock();
        shared.hold_echoes = false;
        for slot in shared.collections.values_mut().filter(|s| s.dirty) {
            slot.publish(false);
        }
        for slot in shared.orders.values_mut().filter(|s| s.dirty) {
            slot.publish(false);
        }
    }

    /// Make the next call of `op` fail
    pub fn fail_next(&self, op: StoreOp) {
        *self.lock().failures.entry(op).or_insert(0) += 1;
    }

    /// Current stored documents (not the last echoed snapshot)
    pub fn documents(&self, user: &UserId, collection: Collection) -> Vec<Document> {
        self.lock()
            .collections
            .get(&(user.clone(), collection))
            .map(CollectionSlot::snapshot)
            .unwrap_or_default()
    }

    /// Current stored ordering list
    pub fn order(&self, user: &UserId, list: OrderList) -> Vec<String> {
        self.lock()
            .orders
            .get(&(user.clone(), list))
            .map(|slot| slot.ids.clone())
            .unwrap_or_default()
    }
}

impl PersistenceConnector for MemoryStore {
    fn connect(&self, user: &UserId) -> Arc<dyn PersistenceProvider> {
        Arc::new(self.scope(user.clone()))
    }
}

/// One user's view of a [`MemoryStore`]
#[derive(Clone)]
pub struct MemoryScope {
    user: UserId,
    store: MemoryStore,
}

impl MemoryScope {
    fn write_collection(
        &self,
        collection: Collection,
        apply: impl FnOnce(&mut BTreeMap<String, Value>),
    ) {
        let mut shared = self.store.lock();
        let hold = shared.hold_echoes;
        let slot = shared.collection(&self.user, collection);
        apply(&mut slot.documents);
        slot.publish(hold);
    }

    fn write_order(&self, list: OrderList, apply: impl FnOnce(&mut Vec<String>)) {
        let mut shared = self.store.lock();
        let hold = shared.hold_echoes;
        let slot = shared.order(&self.user, list);
        apply(&mut slot.ids);
        slot.publish(hold);
    }
}

#[async_trait]
impl PersistenceProvider for MemoryScope {
    fn user_id(&self) -> UserId {
        self.user.clone()
    }

    async fn upsert(&self, collection: Collection, id: &str, data: Value) -> Result<()> {
        self.store.lock().check(StoreOp::Upsert, collection.as_str())?;
        self.write_collection(collection, |documents| {
            documents.insert(id.to_string(), data);
        });
        Ok(())
    }

    async fn upsert_stamped(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
        stamp_field: &str,
    ) -> Result<()> {
        let stamp = {
            let mut shared = self.store.lock();
            shared.check(StoreOp::Upsert, collection.as_str())?;
            shared.next_stamp()
        };

        let Value::Object(mut fields) = data else {
            return Err(SyncError::write_rejected(
                collection.as_str(),
                "stamped document must be an object",
            ));
        };
        fields.insert(stamp_field.to_string(), serde_json::to_value(stamp)?);

        self.write_collection(collection, |documents| {
            documents.insert(id.to_string(), Value::Object(fields));
        });
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        self.store.lock().check(StoreOp::Delete, collection.as_str())?;
        self.write_collection(collection, |documents| {
            documents.remove(id);
        });
        Ok(())
    }

    async fn order_union(&self, list: OrderList, id: &str) -> Result<()> {
        self.store.lock().check(StoreOp::OrderUnion, list.as_str())?;
        self.write_order(list, |ids| {
            if !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        });
        Ok(())
    }

    async fn order_remove(&self, list: OrderList, id: &str) -> Result<()> {
        self.store.lock().check(StoreOp::OrderRemove, list.as_str())?;
        self.write_order(list, |ids| ids.retain(|existing| existing != id));
        Ok(())
    }

    async fn order_overwrite(&self, list: OrderList, ids: Vec<String>) -> Result<()> {
        self.store
            .lock()
            .check(StoreOp::OrderOverwrite, list.as_str())?;
        self.write_order(list, |current| *current = ids);
        Ok(())
    }

    async fn subscribe_collection(
        &self,
        collection: Collection,
    ) -> Result<watch::Receiver<Vec<Document>>> {
        let mut shared = self.store.lock();
        shared.check(StoreOp::Subscribe, collection.as_str())?;
        Ok(shared.collection(&self.user, collection).tx.subscribe())
    }

    async fn subscribe_order(&self, list: OrderList) -> Result<watch::Receiver<Vec<String>>> {
        let mut shared = self.store.lock();
        shared.check(StoreOp::Subscribe, list.as_str())?;
        Ok(shared.order(&self.user, list).tx.subscribe())
    }
}
