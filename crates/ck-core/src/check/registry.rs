//! Check name → constructor table.
//!
//! The table is assembled once with a [`RegistryBuilder`] and is read-only
//! afterwards. Aliases point at the same constructor as the primary name,
//! and every lookup constructs a fresh handler, so no state is shared
//! between invocations.

use super::{Check, CheckInfo};
use ck_common::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Produces a fresh handler per invocation.
pub type Constructor = fn() -> Box<dyn Check>;

struct Entry {
    name: String,
    aliases: Vec<String>,
    constructor: Constructor,
}

/// A registered check as listed by `ckagent list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredCheck {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
}

/// Collects registrations, rejecting any name or alias used twice.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<Entry>,
    index: BTreeMap<String, usize>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` and its aliases. Lookups are case-insensitive.
    pub fn register(
        &mut self,
        name: &str,
        aliases: &[&str],
        constructor: Constructor,
    ) -> Result<&mut Self> {
        let slot = self.entries.len();
        let keys: Vec<String> = std::iter::once(name)
            .chain(aliases.iter().copied())
            .map(str::to_ascii_lowercase)
            .collect();

        for (idx, key) in keys.iter().enumerate() {
            if self.index.contains_key(key) || keys[..idx].contains(key) {
                return Err(Error::DuplicateCheck { name: key.clone() });
            }
        }
        for key in keys {
            self.index.insert(key, slot);
        }

        debug!(check = name, aliases = ?aliases, "registered check");
        self.entries.push(Entry {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            constructor,
        });
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            entries: self.entries,
            index: self.index,
        }
    }
}

/// Read-only check table.
pub struct Registry {
    entries: Vec<Entry>,
    index: BTreeMap<String, usize>,
}

impl Registry {
    /// Registry with the built-in checks.
    pub fn builtin() -> Result<Self> {
        let mut builder = RegistryBuilder::new();
        crate::checks::register_builtin(&mut builder)?;
        Ok(builder.build())
    }

    fn entry(&self, name: &str) -> Result<&Entry> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|slot| &self.entries[*slot])
            .ok_or_else(|| Error::UnknownCheck {
                name: name.to_string(),
            })
    }

    /// Construct a fresh handler for `name` or one of its aliases.
    pub fn create(&self, name: &str) -> Result<Box<dyn Check>> {
        Ok((self.entry(name)?.constructor)())
    }

    /// Primary name for `name` or one of its aliases.
    pub fn canonical_name(&self, name: &str) -> Result<&str> {
        Ok(&self.entry(name)?.name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_lowercase())
    }

    /// Build-time introspection of a check.
    pub fn describe(&self, name: &str) -> Result<CheckInfo> {
        Ok(self.create(name)?.info())
    }

    /// Registered checks sorted by name.
    pub fn list(&self) -> Vec<RegisteredCheck> {
        let mut checks: Vec<RegisteredCheck> = self
            .entries
            .iter()
            .map(|entry| RegisteredCheck {
                name: entry.name.clone(),
                aliases: entry.aliases.clone(),
                description: (entry.constructor)().info().description,
            })
            .collect();
        checks.sort_by(|a, b| a.name.cmp(&b.name));
        checks
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();

/// Install the process-wide registry. Fails if one is already installed.
pub fn install(registry: Registry) -> Result<Arc<Registry>> {
    let registry = Arc::new(registry);
    GLOBAL
        .set(Arc::clone(&registry))
        .map_err(|_| Error::RegistryInitialized)?;
    Ok(registry)
}

/// The process-wide registry installed by [`install`].
pub fn global() -> Result<Arc<Registry>> {
    GLOBAL.get().cloned().ok_or(Error::RegistryUninitialized)
}
