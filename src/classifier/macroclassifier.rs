//! Numerosity-compressed classifier.

use super::Classifier;
use crate::representation::Representation;
use std::ops::{Deref, DerefMut};

/// `numerosity` identical copies of one classifier.
///
/// All classifier reads go through `Deref`, so a macroclassifier can be used
/// wherever a `&Classifier` is expected.
#[derive(Debug)]
pub struct Macroclassifier<P> {
    classifier: Classifier<P>,
    numerosity: u32,
}

impl<P> Macroclassifier<P> {
    /// Wraps `classifier` as `numerosity` copies.
    pub fn new(classifier: Classifier<P>, numerosity: u32) -> Self {
        Self {
            classifier,
            numerosity,
        }
    }

    /// Number of copies represented.
    pub fn numerosity(&self) -> u32 {
        self.numerosity
    }

    /// Adds `count` copies.
    pub fn add_numerosity(&mut self, count: u32) {
        self.numerosity += count;
    }

    /// Removes up to `count` copies; returns how many were removed.
    pub fn remove_numerosity(&mut self, count: u32) -> u32 {
        let removed = count.min(self.numerosity);
        self.numerosity -= removed;
        removed
    }

    /// The wrapped classifier.
    pub fn classifier(&self) -> &Classifier<P> {
        &self.classifier
    }

    /// Mutable access to the wrapped classifier.
    pub fn classifier_mut(&mut self) -> &mut Classifier<P> {
        &mut self.classifier
    }

    /// Unwraps the classifier, dropping the copy count.
    pub fn into_classifier(self) -> Classifier<P> {
        self.classifier
    }

    /// Structural equality of the wrapped classifiers.
    pub fn equals<R: Representation>(&self, other: &Macroclassifier<P>, representation: &R) -> bool {
        self.classifier.equals(&other.classifier, representation)
    }
}

impl<P> Deref for Macroclassifier<P> {
    type Target = Classifier<P>;

    fn deref(&self) -> &Classifier<P> {
        &self.classifier
    }
}

impl<P> DerefMut for Macroclassifier<P> {
    fn deref_mut(&mut self) -> &mut Classifier<P> {
        &mut self.classifier
    }
}
