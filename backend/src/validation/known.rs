use common::model::EntityKind;
use std::collections::{HashMap, HashSet};

/// Identifiers already present per table.
///
/// The validator reads it to check references; the importer adds every row it
/// writes so later rows of the same run see them.
#[derive(Debug, Clone, Default)]
pub struct KnownIdentifiers {
    ids: HashMap<EntityKind, HashSet<i64>>,
}

impl KnownIdentifiers {
    pub fn contains(&self, kind: EntityKind, id: i64) -> bool {
        self.ids.get(&kind).is_some_and(|set| set.contains(&id))
    }

    /// Returns `false` when the identifier was already known.
    pub fn insert(&mut self, kind: EntityKind, id: i64) -> bool {
        self.ids.entry(kind).or_default().insert(id)
    }

    pub fn extend(&mut self, kind: EntityKind, ids: impl IntoIterator<Item = i64>) {
        self.ids.entry(kind).or_default().extend(ids);
    }

    pub fn is_empty(&self, kind: EntityKind) -> bool {
        self.ids.get(&kind).is_none_or(HashSet::is_empty)
    }
}
