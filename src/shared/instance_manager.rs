// This is free and unencumbered software released into the public domain.

use crate::shared::{
    BridgeError, BridgeResult, Identifier, Instance, NativeObject, SurfaceProducer,
};
use alloc::sync::Arc;
use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// First identifier handed out for host-created instances. Lower values are
/// left to the remote side.
pub const MIN_HOST_CREATED_IDENTIFIER: Identifier = 65536;

#[derive(Default)]
struct Registry {
    instances: HashMap<Identifier, NativeObject>,
    identifiers: HashMap<usize, Identifier>,
    producers: HashMap<Identifier, Arc<dyn SurfaceProducer>>,
    latest_producer: Option<Identifier>,
    next_identifier: Identifier,
}

impl Registry {
    fn insert(&mut self, identifier: Identifier, object: NativeObject) {
        self.identifiers.insert(object.key(), identifier);
        self.instances.insert(identifier, object);
    }

    fn allocate_identifier(&mut self) -> Identifier {
        let identifier = self.next_identifier;
        self.next_identifier += 1;
        identifier
    }

    fn take_producer(&mut self, identifier: Identifier) -> Option<Arc<dyn SurfaceProducer>> {
        if self.latest_producer == Some(identifier) {
            self.latest_producer = None;
        }
        self.producers.remove(&identifier)
    }
}

/// Bidirectional map between native objects and the identifiers the remote
/// side uses for them. Also tracks the surface producer currently attached to
/// each object.
///
/// Lookups take a shared lock and may run from any thread. Producers removed
/// from the map are released after the lock is dropped.
pub struct InstanceManager {
    registry: RwLock<Registry>,
}

impl core::fmt::Debug for InstanceManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let registry = self.read();
        f.debug_struct("InstanceManager")
            .field("instances", &registry.instances.len())
            .field("producers", &registry.producers.len())
            .finish()
    }
}

impl Default for InstanceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceManager {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry {
                next_identifier: MIN_HOST_CREATED_IDENTIFIER,
                ..Default::default()
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Registers an object the remote side created under its own identifier,
    /// which must lie below [`MIN_HOST_CREATED_IDENTIFIER`].
    pub fn add_remote_created_instance(
        &self,
        object: impl Into<NativeObject>,
        identifier: Identifier,
    ) -> BridgeResult {
        if !(0..MIN_HOST_CREATED_IDENTIFIER).contains(&identifier) {
            return Err(BridgeError::invalid_argument(format!(
                "identifier {identifier} is outside 0..{MIN_HOST_CREATED_IDENTIFIER}"
            )));
        }

        let object = object.into();
        let mut registry = self.write();
        if registry.instances.contains_key(&identifier) {
            return Err(BridgeError::IdentifierInUse(identifier));
        }
        if let Some(&existing) = registry.identifiers.get(&object.key()) {
            return Err(BridgeError::AlreadyRegistered(existing));
        }
        registry.insert(identifier, object);
        drop(registry);

        #[cfg(feature = "tracing")]
        asimov_module::tracing::debug!(target: "asimov_camerax_bridge", identifier, "added remote-created instance");

        Ok(())
    }

    /// Registers an object created on this side and returns its new identifier.
    pub fn add_host_created_instance(
        &self,
        object: impl Into<NativeObject>,
    ) -> BridgeResult<Identifier> {
        match self.get_or_add_host_created_instance(object) {
            (identifier, true) => Ok(identifier),
            (identifier, false) => Err(BridgeError::AlreadyRegistered(identifier)),
        }
    }

    /// Returns the object's identifier, registering it first if needed. The
    /// flag tells whether a new identifier was assigned.
    pub fn get_or_add_host_created_instance(
        &self,
        object: impl Into<NativeObject>,
    ) -> (Identifier, bool) {
        let object = object.into();
        let mut registry = self.write();
        if let Some(&existing) = registry.identifiers.get(&object.key()) {
            return (existing, false);
        }
        let identifier = registry.allocate_identifier();
        registry.insert(identifier, object);
        drop(registry);

        #[cfg(feature = "tracing")]
        asimov_module::tracing::debug!(target: "asimov_camerax_bridge", identifier, "added host-created instance");

        (identifier, true)
    }

    pub fn get(&self, identifier: Identifier) -> BridgeResult<NativeObject> {
        self.read()
            .instances
            .get(&identifier)
            .cloned()
            .ok_or(BridgeError::NotFound(identifier))
    }

    pub fn get_instance<T: Instance>(&self, identifier: Identifier) -> BridgeResult<T> {
        let object = self.get(identifier)?;
        T::from_native(&object).ok_or(BridgeError::WrongKind {
            identifier,
            expected: T::KIND,
            actual: object.kind(),
        })
    }

    pub fn identifier_for(&self, object: &NativeObject) -> Option<Identifier> {
        self.read().identifiers.get(&object.key()).copied()
    }

    pub fn contains_instance(&self, object: &NativeObject) -> bool {
        self.identifier_for(object).is_some()
    }


    pub fn len(&self) -> usize {
        self.read().instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops the mapping for `identifier`, releasing its surface producer.
    pub fn remove(&self, identifier: Identifier) -> BridgeResult<NativeObject> {
        let mut registry = self.write();
        let object = registry
            .instances
            .remove(&identifier)
            .ok_or(BridgeError::NotFound(identifier))?;
        registry.identifiers.remove(&object.key());
        let producer = registry.take_producer(identifier);
        drop(registry);

        if let Some(producer) = producer {
            release(identifier, producer);
        }
        Ok(object)
    }

    /// Drops every mapping and releases every attached producer.
    pub fn clear(&self) {
        let producers: Vec<_> = {
            let mut registry = self.write();
            registry.instances.clear();
            registry.identifiers.clear();
            registry.latest_producer = None;
            registry.producers.drain().collect()
        };

        for (identifier, producer) in producers {
            release(identifier, producer);
        }
    }

    /// Makes `producer` the current one for `identifier`. A producer it
    /// replaces is released.
    pub fn attach_producer(
        &self,
        identifier: Identifier,
        producer: Arc<dyn SurfaceProducer>,
    ) -> BridgeResult {
        let mut registry = self.write();
        if !registry.instances.contains_key(&identifier) {
            return Err(BridgeError::NotFound(identifier));
        }
        let previous = registry.producers.insert(identifier, producer);
        registry.latest_producer = Some(identifier);
        drop(registry);

        if let Some(previous) = previous {
            release(identifier, previous);
        }
        Ok(())
    }

    pub fn producer(&self, identifier: Identifier) -> Option<Arc<dyn SurfaceProducer>> {
        self.read().producers.get(&identifier).cloned()
    }

    /// Releases the producer attached to `identifier`, if any.
    pub fn release_producer(&self, identifier: Identifier) -> bool {
        let producer = self.write().take_producer(identifier);
        match producer {
            Some(producer) => {
                release(identifier, producer);
                true
            },
            None => false,
        }
    }

    /// Releases the most recently attached producer, if it is still attached.
    pub fn release_latest_producer(&self) -> bool {
        let taken = {
            let mut registry = self.write();
            let latest = registry.latest_producer;
            latest.and_then(|identifier| registry.take_producer(identifier).map(|p| (identifier, p)))
        };
        match taken {
            Some((identifier, producer)) => {
                release(identifier, producer);
                true
            },
            None => false,
        }
    }
}

fn release(_identifier: Identifier, producer: Arc<dyn SurfaceProducer>) {
    #[cfg(feature = "tracing")]
    asimov_module::tracing::debug!(
        target: "asimov_camerax_bridge",
        identifier = _identifier,
        producer = producer.id(),
        "releasing surface producer"
    );

    producer.release();
}
