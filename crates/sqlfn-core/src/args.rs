//! Argument lists handed to function factories.

use crate::column_type::ColumnType;
use crate::function::{BoxedFunction, Function};
use crate::span::Span;

/// Ordered argument evaluators paired with their source positions.
///
/// A factory receives its `Args` by value, so after construction the
/// resolver holds nothing it could reuse.
#[derive(Debug, Default)]
pub struct Args {
    functions: Vec<BoxedFunction>,
    positions: Vec<Span>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            functions: Vec::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, function: BoxedFunction, position: Span) {
        self.functions.push(function);
        self.positions.push(position);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Function> {
        self.functions.get(index).map(|f| f.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut BoxedFunction> {
        self.functions.get_mut(index)
    }

    /// Source position of argument `index`, or the default span when out of range.
    pub fn position(&self, index: usize) -> Span {
        self.positions.get(index).copied().unwrap_or_default()
    }

    pub fn positions(&self) -> &[Span] {
        &self.positions
    }

    /// Replace argument `index`, returning the previous evaluator.
    pub fn replace(&mut self, index: usize, function: BoxedFunction) -> Option<BoxedFunction> {
        let slot = self.functions.get_mut(index)?;
        Some(std::mem::replace(slot, function))
    }

    /// Replace argument `index` with the result of `f` applied to it.
    pub fn map_at<E>(
        &mut self,
        index: usize,
        f: impl FnOnce(BoxedFunction, Span) -> Result<BoxedFunction, E>,
    ) -> Result<(), E> {
        if index < self.functions.len() {
            let position = self.positions[index];
            let current = self.functions.remove(index);
            let replaced = f(current, position)?;
            self.functions.insert(index, replaced);
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Function> {
        self.functions.iter().map(|f| f.as_ref())
    }

    pub fn types(&self) -> impl Iterator<Item = ColumnType> + '_ {
        self.functions.iter().map(|f| f.column_type())
    }

    pub fn into_vec(self) -> Vec<BoxedFunction> {
        self.functions
    }

    pub fn into_parts(self) -> (Vec<BoxedFunction>, Vec<Span>) {
        (self.functions, self.positions)
    }

    /// Destructure into exactly `N` evaluators.
    pub fn into_array<const N: usize>(self) -> Option<[BoxedFunction; N]> {
        self.functions.try_into().ok()
    }
}

impl FromIterator<(BoxedFunction, Span)> for Args {
    fn from_iter<I: IntoIterator<Item = (BoxedFunction, Span)>>(iter: I) -> Self {
        let mut args = Args::new();
        for (function, position) in iter {
            args.push(function, position);
        }
        args
    }
}
