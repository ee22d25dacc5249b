use serde::Serialize;

use crate::data_types::AbstractSchema;

/// Classified difference between two abstract schemas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Fields only present in the new schema, with their new type
    pub added: AbstractSchema,
    /// Fields only present in the old schema, with their old type
    pub deleted: AbstractSchema,
    /// Fields present in both whose type changed, with their new type
    pub modified: AbstractSchema,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }
}

pub fn diff(old: &AbstractSchema, new: &AbstractSchema) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for (name, new_type) in new {
        match old.get(name) {
            None => {
                changes.added.insert(name.clone(), *new_type);
            }
            Some(old_type) if old_type != new_type => {
                changes.modified.insert(name.clone(), *new_type);
            }
            Some(_) => {}
        }
    }

    changes.deleted = old
        .iter()
        .filter(|(name, _)| !new.contains_key(*name))
        .map(|(name, old_type)| (name.clone(), *old_type))
        .collect();

    changes
}
