//! Match rows against concept description definitions.

use crate::model::{DefinitionEntry, Row};
use serde::{Deserialize, Serialize};

/// What happens to a definition entry after it matched a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefinitionPolicy {
    /// The entry is removed from the pool: at most one row per document
    /// receives it.
    #[default]
    Consume,
    /// The entry stays in the pool and enriches every matching row.
    Shared,
}

impl DefinitionPolicy {
    /// Lenient conversion: anything other than `shared` means [`DefinitionPolicy::Consume`].
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("shared") {
            DefinitionPolicy::Shared
        } else {
            DefinitionPolicy::Consume
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DefinitionPolicy::Consume => "consume",
            DefinitionPolicy::Shared => "shared",
        }
    }
}

impl<'de> Deserialize<'de> for DefinitionPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(DefinitionPolicy::from_flag(&s))
    }
}

impl Serialize for DefinitionPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Definition entries of one document, looked up by `(id_short, id)`.
#[derive(Debug, Clone, Default)]
pub struct DefinitionPool {
    entries: Vec<DefinitionEntry>,
    policy: DefinitionPolicy,
}

impl DefinitionPool {
    pub fn new(entries: Vec<DefinitionEntry>, policy: DefinitionPolicy) -> Self {
        Self { entries, policy }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that have not been consumed yet.
    pub fn remaining(&self) -> &[DefinitionEntry] {
        &self.entries
    }

    /// Find the entry whose id-short and id equal the given pair. Under
    /// [`DefinitionPolicy::Consume`] the entry is removed.
    pub fn take(&mut self, id_short: Option<&str>, semantic_id: Option<&str>) -> Option<DefinitionEntry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id_short.as_deref() == id_short && e.id.as_deref() == semantic_id)?;
        match self.policy {
            DefinitionPolicy::Consume => Some(self.entries.remove(pos)),
            DefinitionPolicy::Shared => Some(self.entries[pos].clone()),
        }
    }

    /// Copy the matching definition into `row`. Returns whether one matched;
    /// without a match the row's definition is cleared.
    pub fn attach(&mut self, row: &mut Row) -> bool {
        match self.take(row.id_short.as_deref(), row.semantic_id()) {
            Some(entry) => {
                row.definition = entry.definition;
                true
            }
            None => {
                row.definition.clear();
                false
            }
        }
    }
}
