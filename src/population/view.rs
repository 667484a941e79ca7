//! Non-owning views over a classifier set.

use super::set::ClassifierSet;
use crate::classifier::Macroclassifier;

/// A transient subset of a [`ClassifierSet`]: match sets, correct sets and
/// GA niches.
///
/// A view stores population indices and the summed numerosity of its
/// members. It stays valid while the population only grows or merges
/// numerosity; any deletion from the population invalidates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetView {
    members: Vec<usize>,
    total_numerosity: u32,
}

impl SetView {
    /// An empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds population entry `index` carrying `numerosity` copies.
    pub fn push(&mut self, index: usize, numerosity: u32) {
        self.members.push(index);
        self.total_numerosity += numerosity;
    }

    /// Population indices of the members, in population order.
    pub fn indices(&self) -> &[usize] {
        &self.members
    }

    /// Number of macroclassifiers in the view.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the view has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Summed numerosity of the members at view construction time.
    pub fn total_numerosity(&self) -> u32 {
        self.total_numerosity
    }

    /// Whether population entry `index` is in the view.
    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    /// Iterates the members as `(population index, macroclassifier)` pairs.
    pub fn iter<'a, P>(
        &'a self,
        population: &'a ClassifierSet<P>,
    ) -> impl Iterator<Item = (usize, &'a Macroclassifier<P>)> + 'a {
        self.members.iter().map(move |&i| (i, population.get(i)))
    }

    /// Current numerosity of the members, read back from the population.
    pub fn current_numerosity<P>(&self, population: &ClassifierSet<P>) -> u32 {
        self.iter(population).map(|(_, m)| m.numerosity()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_tracks_numerosity() {
        let mut view = SetView::new();
        assert!(view.is_empty());
        view.push(3, 2);
        view.push(7, 5);
        assert_eq!(view.len(), 2);
        assert_eq!(view.total_numerosity(), 7);
        assert_eq!(view.indices(), &[3, 7]);
        assert!(view.contains(7));
        assert!(!view.contains(4));
    }
}
