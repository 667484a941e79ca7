//! The numerosity-compressed classifier container.

use super::view::SetView;
use crate::classifier::Macroclassifier;
use crate::data::Instances;
use crate::error::Result;
use crate::representation::{Niche, Representation};
use crate::update::UpdateStrategy;
use std::io::Write;

/// Ordered collection of macroclassifiers with a cached total numerosity.
///
/// # Invariants
///
/// - `total_numerosity() == Σ numerosity` of the members, after every
///   operation.
/// - Entries with zero numerosity are removed immediately.
/// - A checked insertion of a structurally equal rule merges numerosity
///   instead of appending a duplicate.
///
/// The set has no internal synchronization: every mutation takes
/// `&mut self`.
#[derive(Debug)]
pub struct ClassifierSet<P> {
    macros: Vec<Macroclassifier<P>>,
    total_numerosity: u32,
}

impl<P> Default for ClassifierSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ClassifierSet<P> {
    /// An empty set.
    pub fn new() -> Self {
        Self {
            macros: Vec::new(),
            total_numerosity: 0,
        }
    }

    /// An empty set with room for `capacity` macroclassifiers.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            macros: Vec::with_capacity(capacity),
            total_numerosity: 0,
        }
    }

    /// Number of macroclassifiers.
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    /// Whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Number of micro-classifiers.
    pub fn total_numerosity(&self) -> u32 {
        self.total_numerosity
    }

    /// # Panics
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> &Macroclassifier<P> {
        assert!(
            index < self.macros.len(),
            "classifier index {index} out of range for set of {}",
            self.macros.len()
        );
        &self.macros[index]
    }

    /// # Panics
    /// Panics if `index` is out of range.
    pub fn get_mut(&mut self, index: usize) -> &mut Macroclassifier<P> {
        assert!(
            index < self.macros.len(),
            "classifier index {index} out of range for set of {}",
            self.macros.len()
        );
        &mut self.macros[index]
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &Macroclassifier<P>> {
        self.macros.iter()
    }

    /// Iterates mutably over the entries in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Macroclassifier<P>> {
        self.macros.iter_mut()
    }

    /// Index of the entry holding the classifier with `serial`.
    pub fn position(&self, serial: u64) -> Option<usize> {
        self.macros.iter().position(|m| m.serial() == serial)
    }

    /// A view containing every entry.
    pub fn full_view(&self) -> SetView {
        let mut view = SetView::new();
        for (i, m) in self.macros.iter().enumerate() {
            view.push(i, m.numerosity());
        }
        view
    }

    /// Inserts a macroclassifier, merging where possible.
    ///
    /// With `check_subsumption`, the numerosity is merged into (a) a
    /// structurally equal member, or else (b) the first subsumption-eligible
    /// member that is more general than the new rule. Otherwise the rule is
    /// appended. Returns the index of the entry that received the copies.
    pub fn add_classifier<R: Representation>(
        &mut self,
        macroclassifier: Macroclassifier<P>,
        check_subsumption: bool,
        representation: &R,
    ) -> usize {
        let added = macroclassifier.numerosity();
        self.total_numerosity += added;

        if check_subsumption {
            let target = self
                .macros
                .iter()
                .position(|m| m.equals(&macroclassifier, representation))
                .or_else(|| {
                    self.macros.iter().position(|m| {
                        m.is_subsumable() && m.is_more_general(&macroclassifier, representation)
                    })
                });
            if let Some(i) = target {
                self.macros[i].add_numerosity(added);
                return i;
            }
        }

        self.macros.push(macroclassifier);
        self.macros.len() - 1
    }

    /// Removes up to `count` copies of entry `index`.
    ///
    /// The entry disappears once its numerosity reaches zero, which shifts
    /// the indices of later entries. Returns the number of copies removed.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn delete_classifier(&mut self, index: usize, count: u32) -> u32 {
        let entry = self.get_mut(index);
        let removed = entry.remove_numerosity(count);
        if entry.numerosity() == 0 {
            self.macros.remove(index);
        }
        self.total_numerosity -= removed;
        removed
    }

    /// Removes up to `count` copies of the classifier with `serial`.
    ///
    /// # Panics
    /// Panics if no member carries that serial.
    pub fn delete_by_serial(&mut self, serial: u64, count: u32) -> u32 {
        let index = self
            .position(serial)
            .unwrap_or_else(|| panic!("classifier {serial} is not a member of this set"));
        self.delete_classifier(index, count)
    }

    /// Removes every entry for which `keep` returns `false`.
    ///
    /// Returns the number of micro-classifiers removed.
    pub fn retain<F>(&mut self, mut keep: F) -> u32
    where
        F: FnMut(&Macroclassifier<P>) -> bool,
    {
        let mut removed = 0;
        self.macros.retain(|m| {
            let kept = keep(m);
            if !kept {
                removed += m.numerosity();
            }
            kept
        });
        self.total_numerosity -= removed;
        removed
    }

    /// All entries whose condition matches instance `index`.
    ///
    /// One pass over the population; results are cached per classifier.
    pub fn generate_match_set<R: Representation>(
        &mut self,
        instances: &Instances,
        index: usize,
        representation: &R,
    ) -> SetView {
        let mut view = SetView::new();
        for (i, m) in self.macros.iter_mut().enumerate() {
            if m.is_match(instances, index, representation) {
                view.push(i, m.numerosity());
            }
        }
        view
    }

    /// The members of `match_set` whose action is correct for `niche` of
    /// instance `index`.
    pub fn generate_correct_set<R: Representation>(
        &self,
        match_set: &SetView,
        instances: &Instances,
        index: usize,
        niche: Niche,
        representation: &R,
    ) -> SetView {
        self.filter_view(match_set, |m| {
            representation.is_correct(m.chromosome(), instances, index, niche)
        })
    }

    /// The members of `view` satisfying `predicate`.
    pub fn filter_view<F>(&self, view: &SetView, predicate: F) -> SetView
    where
        F: Fn(&Macroclassifier<P>) -> bool,
    {
        let mut out = SetView::new();
        for (i, m) in view.iter(self) {
            if predicate(m) {
                out.push(i, m.numerosity());
            }
        }
        out
    }

    /// Absorbs every entry of `other` with the checked insertion rule.
    pub fn merge<R: Representation>(&mut self, other: ClassifierSet<P>, representation: &R) {
        for m in other.macros {
            self.add_classifier(m, true, representation);
        }
    }

    /// Merges coexisting entries that are equal, or that a
    /// subsumption-eligible entry is more general than.
    ///
    /// Returns the number of entries folded into others. Total numerosity
    /// is unchanged.
    pub fn self_subsume<R: Representation>(&mut self, representation: &R) -> usize {
        let mut folded = 0;
        let mut i = 0;
        while i < self.macros.len() {
            let candidate = &self.macros[i];
            let absorber = (0..self.macros.len()).find(|&j| {
                let other = &self.macros[j];
                j != i
                    && (other.equals(candidate, representation)
                        || (other.is_subsumable() && other.is_more_general(candidate, representation)))
            });
            match absorber {
                Some(j) => {
                    let absorbed = self.macros.remove(i);
                    let j = if j > i { j - 1 } else { j };
                    self.macros[j].add_numerosity(absorbed.numerosity());
                    folded += 1;
                }
                None => i += 1,
            }
        }
        folded
    }

    /// Tests every classifier against every instance, filling the match
    /// caches so coverage statistics are complete.
    pub fn evaluate_coverage<R: Representation>(
        &mut self,
        instances: &Instances,
        representation: &R,
    ) {
        for m in &mut self.macros {
            for index in 0..instances.len() {
                m.is_match(instances, index, representation);
            }
        }
    }

    /// Numerosity-weighted mean fitness (0 for an empty set).
    pub fn mean_fitness(&self) -> f64 {
        if self.total_numerosity == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .macros
            .iter()
            .map(|m| m.fitness() * f64::from(m.numerosity()))
            .sum();
        sum / f64::from(self.total_numerosity)
    }

    /// Writes the population as text, one rule per line:
    /// rendered rule, numerosity, fitness, experience and strategy statistics,
    /// separated by tabs.
    pub fn write_to<W, R, U>(&self, writer: &mut W, representation: &R, strategy: &U) -> Result<()>
    where
        W: Write,
        R: Representation,
        U: UpdateStrategy<Payload = P>,
    {
        for m in &self.macros {
            writeln!(
                writer,
                "{}\t{}\t{:.6}\t{}\t{}",
                representation.render(m.chromosome()),
                m.numerosity(),
                m.fitness(),
                m.experience(),
                strategy.describe(m.payload())
            )?;
        }
        Ok(())
    }
}
