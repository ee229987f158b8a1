//! Paper ids already claimed by a higher-priority category.

use std::collections::HashSet;

/// Ids claimed during one recommendation request.
///
/// The set is owned by exactly one generator at a time: each generator
/// receives it by value, adds its selections and hands it back, so later
/// categories see everything earlier ones kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    ids: HashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Claim an id. Returns false if it was already claimed.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> Extend<S> for ExclusionSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.ids.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
