//! Name to color registry.
//!
//! Maps an event name to a display color. The first lookup of an unseen name
//! derives a color from the name itself and remembers it; explicit overrides
//! replace that mapping for every record sharing the name.
//!
//! # Invariants
//! - The in-memory map is authoritative. Writes to the mirror happen after the
//!   map is updated and their results are never read back into it.
//! - Mirror failures are logged and never surface from lookups or overrides.

use std::collections::HashMap;

use log::{debug, warn};

use crate::color::{color_for_name, is_valid_hex};
use crate::error::{RegistryError, StoreResult};
use crate::store::TableStore;
use crate::store::name_colors::{delete_color, query_colors, upsert_color};
use crate::types::EventRecord;

#[derive(Default)]
pub struct NameColorRegistry<'s> {
    colors: HashMap<String, String>,
    mirror: Option<&'s dyn TableStore>,
}

impl<'s> NameColorRegistry<'s> {
    /// An in-memory registry with no mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry whose assignments are mirrored to `store`.
    pub fn with_mirror(store: &'s dyn TableStore) -> Self {
        NameColorRegistry {
            colors: HashMap::new(),
            mirror: Some(store),
        }
    }

    /// Seeds the registry from the `name_colors` table and mirrors back to it.
    pub fn load(store: &'s dyn TableStore) -> StoreResult<Self> {
        let mut registry = Self::with_mirror(store);
        for (name, color) in query_colors(store)? {
            registry.colors.insert(name, color);
        }
        debug!(
            "event=registry_load module=registry status=ok names={}",
            registry.colors.len()
        );
        Ok(registry)
    }

    /// The color for `name`, assigning a derived one on first sight.
    pub fn color_for(&mut self, name: &str) -> String {
        if let Some(color) = self.colors.get(name) {
            return color.clone();
        }
        let color = color_for_name(name);
        self.colors.insert(name.to_string(), color.clone());
        self.mirror_upsert(name, &color);
        color
    }

    /// The stored color for `name` without assigning one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(String::as_str)
    }

    /// The display color for a record: its own valid override, else the name's color.
    pub fn resolve(&mut self, record: &EventRecord) -> String {
        match record.color.as_deref() {
            Some(color) if is_valid_hex(color) => color.to_string(),
            _ => self.color_for(&record.name),
        }
    }

    pub fn set_color(&mut self, name: &str, color: &str) -> Result<(), RegistryError> {
        if !is_valid_hex(color) {
            return Err(RegistryError::InvalidColor(color.to_string()));
        }
        self.colors.insert(name.to_string(), color.to_string());
        self.mirror_upsert(name, color);
        Ok(())
    }

    /// Forgets the mapping. A later lookup derives the color again.
    pub fn remove_color(&mut self, name: &str) -> Option<String> {
        let removed = self.colors.remove(name);
        if let Some(store) = self.mirror {
            if let Err(err) = delete_color(name, store) {
                warn!("event=color_mirror module=registry status=error op=delete name={name:?} error={err}");
            }
        }
        removed
    }

    /// `(name, color)` pairs sorted by name.
    pub fn legend(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .colors
            .iter()
            .map(|(name, color)| (name.as_str(), color.as_str()))
            .collect();
        entries.sort_unstable();
        entries
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    fn mirror_upsert(&self, name: &str, color: &str) {
        let Some(store) = self.mirror else {
            return;
        };
        if let Err(err) = upsert_color(name, color, store) {
            warn!("event=color_mirror module=registry status=error op=upsert name={name:?} error={err}");
        }
    }
}
