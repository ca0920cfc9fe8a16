//! In-memory item store shared by the list and create handlers.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use rand::Rng;

use crate::items::model::{Item, NewItem};

/// Upper bound for generated ids.
const MAX_ID: u64 = u32::MAX as u64;

#[derive(Default)]
struct Inner {
    /// Items in insertion order.
    items: Vec<Item>,
    /// Every id handed out so far.
    ids: HashSet<u64>,
}

/// Concurrency-safe item store.
///
/// One lock covers both the ordered list and the id set: a create draws its
/// id and appends the item under the same write guard, and a list clones the
/// whole vector under a read guard.
#[derive(Default)]
pub struct ItemStore {
    inner: RwLock<Inner>,
}

impl ItemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the illustrative sample items.
    pub fn with_samples() -> Self {
        let now = Utc::now();
        let samples = [
            (1, "Temperature Sensor", 23.5, "celsius"),
            (2, "Pressure Gauge", 101.3, "kPa"),
            (3, "Humidity Monitor", 45.2, "percent"),
        ];

        let store = Self::new();
        {
            let mut inner = store.inner.write().unwrap_or_else(PoisonError::into_inner);
            for (id, name, value, unit) in samples {
                inner.ids.insert(id);
                inner.items.push(Item {
                    id,
                    name: name.to_string(),
                    value,
                    unit: unit.to_string(),
                    created: now,
                });
            }
        }
        store
    }

    /// Snapshot of all items in insertion order.
    pub fn list(&self) -> Vec<Item> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .clone()
    }

    /// Store a validated item under a fresh random id and return it.
    pub fn create(&self, new_item: NewItem) -> Item {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let mut rng = rand::thread_rng();
        let id = loop {
            let candidate = rng.gen_range(1..=MAX_ID);
            if inner.ids.insert(candidate) {
                break candidate;
            }
        };

        let item = Item {
            id,
            name: new_item.name,
            value: new_item.value,
            unit: new_item.unit,
            created: Utc::now(),
        };
        inner.items.push(item.clone());
        item
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
