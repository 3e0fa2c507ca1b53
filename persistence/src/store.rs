//! Transactional entity store
//!
//! Writes happen inside a [`Transaction`] that buffers its changes and
//! applies them all at once on [`Transaction::commit`]. Dropping a
//! transaction without committing discards it. Commits are serialized by the
//! store; a transaction that modified an entity another commit changed in the
//! meantime fails with [`PersistenceError::Conflict`].

use crate::config::StoreConfig;
use crate::entity::Entity;
use crate::entity::EntityId;
use crate::entity::Link;
use crate::entity::PropertyValue;
use crate::error::PersistenceError;
use crate::error::Result;
use crate::storage::SnapshotFile;
use crate::storage::StoreState;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tracing::debug;
use tracing::info;

/// Write access to entities inside a caller-owned transaction
pub trait StoreTransaction {
    /// Create a new, empty entity of `entity_type`
    fn new_entity(&mut self, entity_type: &str) -> EntityId;

    fn set_property(&mut self, entity: EntityId, name: &str, value: PropertyValue) -> Result<()>;

    /// Add a link called `name` from `from` to `to`
    fn add_link(&mut self, from: EntityId, name: &str, to: EntityId) -> Result<()>;
}

/// Entity store, in memory or backed by a snapshot file
#[derive(Debug)]
pub struct EntityStore {
    state: RwLock<StoreState>,
    next_id: AtomicU64,
    snapshot: Option<SnapshotFile>,
}

impl EntityStore {
    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::from_state(StoreState::default(), None)
    }

    /// Open the snapshot-backed store described by `config`. A missing
    /// snapshot opens empty; the file is written on the first commit.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let snapshot = SnapshotFile::new(config.path.clone(), config.compression_level);
        let state = snapshot.load()?.unwrap_or_default();
        info!(
            path = %snapshot.path().display(),
            entities = state.entities.len(),
            "opened entity store"
        );
        Ok(Self::from_state(state, Some(snapshot)))
    }

    fn from_state(state: StoreState, snapshot: Option<SnapshotFile>) -> Self {
        let next_id = state
            .entities
            .keys()
            .map(|id| id.0 + 1)
            .max()
            .unwrap_or(0)
            .max(state.next_id)
            .max(1);
        Self {
            state: RwLock::new(state),
            next_id: AtomicU64::new(next_id),
            snapshot,
        }
    }

    /// Path of the backing snapshot, if any
    pub fn path(&self) -> Option<&Path> {
        self.snapshot.as_ref().map(SnapshotFile::path)
    }

    pub fn begin(&self) -> Transaction<'_> {
        Transaction {
            store: self,
            working: BTreeMap::new(),
            base_versions: BTreeMap::new(),
            deleted: BTreeSet::new(),
        }
    }

    pub fn get(&self, id: EntityId) -> Result<Option<Entity>> {
        Ok(self.read()?.entities.get(&id).cloned())
    }

    pub fn entities_of_type(&self, entity_type: &str) -> Result<Vec<Entity>> {
        Ok(self
            .read()?
            .entities
            .values()
            .filter(|entity| entity.entity_type == entity_type)
            .cloned()
            .collect())
    }

    /// Entities reached from `id` through links called `link`, in link order
    pub fn linked(&self, id: EntityId, link: &str) -> Result<Vec<Entity>> {
        let state = self.read()?;
        let entity = state
            .entities
            .get(&id)
            .ok_or(PersistenceError::EntityNotFound(id))?;
        Ok(entity
            .links_named(link)
            .filter_map(|target| state.entities.get(&target).cloned())
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.entities.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn allocate_id(&self) -> EntityId {
        EntityId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|e| PersistenceError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|e| PersistenceError::LockPoisoned(e.to_string()))
    }
}

/// Buffered set of changes against an [`EntityStore`]
#[derive(Debug)]
pub struct Transaction<'s> {
    store: &'s EntityStore,
    /// Entities created or touched by this transaction
    working: BTreeMap<EntityId, Entity>,
    /// Store version of each touched pre-existing entity when first read
    base_versions: BTreeMap<EntityId, u64>,
    deleted: BTreeSet<EntityId>,
}

impl Transaction<'_> {
    /// Remove an entity; its outgoing links go with it
    pub fn delete_entity(&mut self, id: EntityId) -> Result<()> {
        let created_here =
            self.working.contains_key(&id) && !self.base_versions.contains_key(&id);
        self.working.remove(&id);
        if !created_here && !self.base_versions.contains_key(&id) {
            let version = self.store_version(id)?;
            self.base_versions.insert(id, version);
        }
        self.deleted.insert(id);
        Ok(())
    }

    pub fn has_changes(&self) -> bool {
        !self.working.is_empty() || !self.deleted.is_empty()
    }

    /// Apply every buffered change atomically
    pub fn commit(mut self) -> Result<()> {
        let working = std::mem::take(&mut self.working);
        let deleted = std::mem::take(&mut self.deleted);
        let base_versions = std::mem::take(&mut self.base_versions);
        if working.is_empty() && deleted.is_empty() {
            return Ok(());
        }

        let mut state = self.store.write()?;
        for (id, base) in &base_versions {
            let current = state.entities.get(id).map(|entity| entity.version);
            if current != Some(*base) {
                return Err(PersistenceError::Conflict(*id));
            }
        }

        let mut next = state.clone();
        let (written, removed) = (working.len(), deleted.len());
        for (id, mut entity) in working {
            entity.version += 1;
            next.entities.insert(id, entity);
        }
        for id in &deleted {
            next.entities.remove(id);
        }
        next.next_id = self.store.next_id.load(Ordering::Relaxed);

        if let Some(snapshot) = &self.store.snapshot {
            snapshot.save(&next)?;
        }
        *state = next;

        debug!(written, removed, "committed transaction");
        Ok(())
    }

    fn store_version(&self, id: EntityId) -> Result<u64> {
        self.store
            .read()?
            .entities
            .get(&id)
            .map(|entity| entity.version)
            .ok_or(PersistenceError::EntityNotFound(id))
    }

    /// Working copy of `id`, pulled from the store on first touch
    fn touch(&mut self, id: EntityId) -> Result<&mut Entity> {
        if self.deleted.contains(&id) {
            return Err(PersistenceError::EntityNotFound(id));
        }
        if !self.working.contains_key(&id) {
            let entity = self
                .store
                .get(id)?
                .ok_or(PersistenceError::EntityNotFound(id))?;
            self.base_versions.insert(id, entity.version);
            self.working.insert(id, entity);
        }
        self.working
            .get_mut(&id)
            .ok_or(PersistenceError::EntityNotFound(id))
    }
}

impl StoreTransaction for Transaction<'_> {
    fn new_entity(&mut self, entity_type: &str) -> EntityId {
        let id = self.store.allocate_id();
        self.working.insert(id, Entity::new(id, entity_type));
        id
    }

    fn set_property(&mut self, entity: EntityId, name: &str, value: PropertyValue) -> Result<()> {
        self.touch(entity)?
            .properties
            .insert(name.to_string(), value);
        Ok(())
    }

    fn add_link(&mut self, from: EntityId, name: &str, to: EntityId) -> Result<()> {
        if self.deleted.contains(&to)
            || (!self.working.contains_key(&to) && self.store.get(to)?.is_none())
        {
            return Err(PersistenceError::EntityNotFound(to));
        }
        self.touch(from)?.links.push(Link {
            name: name.to_string(),
            target: to,
        });
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.has_changes() {
            debug!(
                entities = self.working.len(),
                deletions = self.deleted.len(),
                "discarding uncommitted transaction"
            );
        }
    }
}
