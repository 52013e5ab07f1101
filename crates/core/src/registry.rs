//! Finished zones by key.

use std::collections::BTreeMap;

use log::{error, info};

use crate::zone::{ObjectDefinition, Zone};

#[derive(Clone, Debug, Default)]
pub struct ZoneRegistry {
    zones: BTreeMap<String, Zone>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses a key that is already taken; the existing zone is kept.
    pub fn register(&mut self, zone: Zone) -> bool {
        if self.zones.contains_key(&zone.key) {
            error!("zone {} is already registered", zone.key);
            return false;
        }
        info!("registered zone {} ({} floors)", zone.key, zone.floors.len());
        self.zones.insert(zone.key.clone(), zone);
        true
    }

    pub fn get(&self, key: &str) -> Option<&Zone> {
        let zone = self.zones.get(key);
        if zone.is_none() {
            error!("missing zone {key}");
        }
        zone
    }

    pub fn find_object(&self, zone: &str, object_id: &str) -> Option<&ObjectDefinition> {
        let object = self.get(zone)?.find_object(object_id);
        if object.is_none() {
            error!("missing object {object_id} in zone {zone}");
        }
        object
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.zones.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
