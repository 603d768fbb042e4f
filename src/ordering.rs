//! Variable orderings: the priority law every diagram lives under.
//!
//! A [`VariableOrdering`] is a deduplicated sequence of variables. The
//! earlier a variable appears, the higher its priority, i.e. the closer to
//! the root its decision nodes sit. Every ordering-sensitive algorithm in
//! the crate (`mk_node`, `apply`, reduction, counting) takes the ordering
//! explicitly; a diagram has no ordering of its own.

use std::cmp::Ordering;
use std::fmt;

use crate::types::Var;

/// An ordered list of distinct variables.
///
/// Construction deduplicates: the first occurrence of a variable wins and
/// later occurrences are dropped silently. Duplicates are a policy matter,
/// not an error.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VariableOrdering {
    variables: Vec<Var>,
}

impl VariableOrdering {
    pub fn new(variables: impl IntoIterator<Item = Var>) -> Self {
        let mut seen = Vec::new();
        for var in variables {
            if !seen.contains(&var) {
                seen.push(var);
            }
        }
        Self { variables: seen }
    }

    /// Convenience constructor from raw 1-indexed ids.
    pub fn from_ids(ids: impl IntoIterator<Item = u32>) -> Self {
        Self::new(ids.into_iter().map(Var::new))
    }

    /// Position of `var` in the ordering, or `None` if it is absent.
    pub fn position(&self, var: Var) -> Option<usize> {
        self.variables.iter().position(|&v| v == var)
    }

    /// The variable at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds.
    pub fn var_at(&self, position: usize) -> Var {
        self.variables[position]
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn contains(&self, var: Var) -> bool {
        self.position(var).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = Var> + '_ {
        self.variables.iter().copied()
    }

    /// Compares two variables by priority.
    ///
    /// `Ordering::Less` means `a` has *higher* priority than `b` (it sits
    /// closer to the root). A variable absent from the ordering has strictly
    /// lower priority than any present variable; two absent variables
    /// compare equal. This asymmetry is deliberate and other components
    /// depend on it.
    pub fn cmp_priority(&self, a: Var, b: Var) -> Ordering {
        match (self.position(a), self.position(b)) {
            (Some(pa), Some(pb)) => pa.cmp(&pb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Drops all variables preceding `var`.
    ///
    /// Since every present variable precedes an absent one, the result is
    /// empty when `var` is not part of the ordering.
    pub fn remove_before(&mut self, var: Var) {
        let position = self.position(var).unwrap_or(self.variables.len());
        self.variables.drain(..position);
    }
}

impl fmt::Display for VariableOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, var) in self.variables.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", var)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first() {
        let order = VariableOrdering::from_ids([3, 1, 3, 2, 1]);
        let collected: Vec<u32> = order.iter().map(Var::id).collect();
        assert_eq!(collected, vec![3, 1, 2]);
    }

    #[test]
    fn test_position() {
        let order = VariableOrdering::from_ids([2, 5, 7]);
        assert_eq!(order.position(Var::new(2)), Some(0));
        assert_eq!(order.position(Var::new(7)), Some(2));
        assert_eq!(order.position(Var::new(4)), None);
    }

    #[test]
    fn test_cmp_priority_present() {
        let order = VariableOrdering::from_ids([2, 5, 7]);
        assert_eq!(order.cmp_priority(Var::new(2), Var::new(5)), Ordering::Less);
        assert_eq!(
            order.cmp_priority(Var::new(7), Var::new(5)),
            Ordering::Greater
        );
        assert_eq!(
            order.cmp_priority(Var::new(5), Var::new(5)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_cmp_priority_absent_is_lowest() {
        let order = VariableOrdering::from_ids([2, 5]);
        // A present variable always precedes an absent one,
        // no matter how their ids compare.
        assert_eq!(order.cmp_priority(Var::new(5), Var::new(1)), Ordering::Less);
        assert_eq!(
            order.cmp_priority(Var::new(1), Var::new(5)),
            Ordering::Greater
        );
        assert_eq!(
            order.cmp_priority(Var::new(1), Var::new(9)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_remove_before() {
        let mut order = VariableOrdering::from_ids([1, 2, 3, 4]);
        order.remove_before(Var::new(3));
        let collected: Vec<u32> = order.iter().map(Var::id).collect();
        assert_eq!(collected, vec![3, 4]);

        let mut order = VariableOrdering::from_ids([1, 2]);
        order.remove_before(Var::new(9));
        assert!(order.is_empty());
    }
}
