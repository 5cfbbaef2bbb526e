//! Alias resolution between accepted key names and their master keys.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{DatasetError, Result};

/// Maps every accepted key name onto its master key.
///
/// A group is the master followed by its aliases in declared order. Names
/// are unique across all groups.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    dataset: String,
    masters: HashMap<String, String>,
    groups: IndexMap<String, Vec<String>>,
}

impl AliasResolver {
    /// Create an empty resolver for the named dataset.
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            masters: HashMap::new(),
            groups: IndexMap::new(),
        }
    }

    /// Register a group; the first name is the master.
    ///
    /// Fails when the group is empty or any name is already taken.
    pub fn insert_group(&mut self, group: Vec<String>) -> Result<()> {
        let Some(master) = group.first().cloned() else {
            return Err(DatasetError::config(&self.dataset, "empty alias group"));
        };

        for (i, name) in group.iter().enumerate() {
            if let Some(owner) = self.masters.get(name) {
                return Err(DatasetError::config(
                    &self.dataset,
                    format!("key '{}' is declared more than once (already belongs to '{}')", name, owner),
                ));
            }
            if group[..i].contains(name) {
                return Err(DatasetError::config(
                    &self.dataset,
                    format!("key '{}' is repeated within its own alias group", name),
                ));
            }
        }

        for name in &group {
            self.masters.insert(name.clone(), master.clone());
        }
        self.groups.insert(master, group);
        Ok(())
    }

    /// The master for `name`, if it is a master or a known alias.
    pub fn master_of(&self, name: &str) -> Option<&str> {
        self.masters.get(name).map(String::as_str)
    }

    /// Whether `name` is any accepted key.
    pub fn contains(&self, name: &str) -> bool {
        self.masters.contains_key(name)
    }

    /// Resolve `name` to its master key.
    pub fn resolve_to_master(&self, name: &str) -> Result<&str> {
        self.master_of(name)
            .ok_or_else(|| DatasetError::unknown_key(&self.dataset, name))
    }

    /// `[master, alias1, alias2, ...]` for any member of a group.
    pub fn all_aliases_of(&self, name: &str) -> Result<&[String]> {
        let master = self.resolve_to_master(name)?;
        Ok(self.groups.get(master).map(Vec::as_slice).unwrap_or_default())
    }

    /// Every name of the group except `name`, in declared order.
    pub fn other_aliases_of(&self, name: &str) -> Result<Vec<&str>> {
        Ok(self
            .all_aliases_of(name)?
            .iter()
            .map(String::as_str)
            .filter(|n| *n != name)
            .collect())
    }

    /// The group without its master, whichever member is asked about.
    pub fn non_master_aliases_of(&self, name: &str) -> Result<&[String]> {
        let all = self.all_aliases_of(name)?;
        Ok(&all[1.min(all.len())..])
    }

    /// True when `name` is accepted and is not itself a master.
    pub fn is_alias(&self, name: &str) -> bool {
        self.master_of(name).is_some_and(|master| master != name)
    }

    /// Master keys in declared order.
    pub fn masters(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }
}
