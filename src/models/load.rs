/// A relation that can be eagerly loaded alongside an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Client,
    Users,
    Projects,
    Requirements,
    AuditTasks,
    Issue,
    /// The owning client of each user in a project's user listing.
    UsersClient,
}

/// The set of relations to eagerly load for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSet(u8);

impl LoadSet {
    pub const NONE: Self = Self(0);

    pub const fn with(self, relation: Relation) -> Self {
        Self(self.0 | (1 << relation as u8))
    }

    pub fn of(relations: &[Relation]) -> Self {
        relations
            .iter()
            .fold(Self::NONE, |set, relation| set.with(*relation))
    }

    pub fn contains(self, relation: Relation) -> bool {
        self.0 & (1 << relation as u8) != 0
    }
}

/// Collapse a loaded collection into a projection field: empty means absent.
pub(crate) fn loaded<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
