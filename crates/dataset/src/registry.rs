//! Process-wide cache of compiled schemas, one per dataset kind.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::{Lazy, OnceCell};
use tracing::debug;

use crate::error::Result;
use crate::kind::DatasetKind;
use crate::schema::Schema;

static GLOBAL: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

type Slot = Arc<OnceCell<Arc<Schema>>>;

/// Compiles each kind's schema at most once.
///
/// Concurrent first use of a kind blocks on that kind's cell only; a failed
/// compilation is not cached and is retried on the next request.
#[derive(Default)]
pub struct SchemaRegistry {
    slots: RwLock<HashMap<TypeId, Slot>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every [`crate::Dataset`].
    pub fn global() -> &'static SchemaRegistry {
        &GLOBAL
    }

    /// The compiled schema for `K`, compiling it on first use.
    pub fn schema<K: DatasetKind>(&self) -> Result<Arc<Schema>> {
        let slot = self.slot(TypeId::of::<K>());
        slot.get_or_try_init(|| {
            debug!(dataset = K::NAME, "Compiling dataset schema");
            K::schema_source().compile(K::NAME).map(Arc::new)
        })
        .cloned()
    }

    /// Whether `K` has been compiled.
    pub fn is_compiled<K: DatasetKind>(&self) -> bool {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(&TypeId::of::<K>())
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of kinds with a compiled schema.
    pub fn len(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.get().is_some()).count()
    }

    /// True when nothing has been compiled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: TypeId) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(id).or_default())
    }
}
