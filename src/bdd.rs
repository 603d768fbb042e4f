use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::Debug;

use log::debug;

use crate::error::{Error, Result};
use crate::node::Node;
use crate::ordering::VariableOrdering;
use crate::reference::Ref;
use crate::storage::Arena;
use crate::types::{Lit, Var};

/// The diagram manager.
///
/// All nodes live in a single arena owned by the manager and are addressed
/// through [`Ref`] handles. Unlike a hash-consing manager, `mk_node` never
/// dedups and never collapses redundant nodes: complete and otherwise
/// unreduced diagrams are first-class values here, and canonical form is
/// reached explicitly through [`reduce_q`]/[`reduce_r`].
///
/// [`reduce_q`]: Bdd::reduce_q
/// [`reduce_r`]: Bdd::reduce_r
pub struct Bdd {
    storage: RefCell<Arena<Node>>,
}

impl Bdd {
    pub fn new() -> Self {
        let mut storage = Arena::new();

        // Allocate the two terminal singletons at the reserved identities.
        let zero = storage.add(Node::Terminal(false));
        assert_eq!(zero, Ref::ZERO.index());
        let one = storage.add(Node::Terminal(true));
        assert_eq!(one, Ref::ONE.index());

        Self {
            storage: RefCell::new(storage),
        }
    }

    /// The false terminal.
    pub fn zero(&self) -> Ref {
        Ref::ZERO
    }

    /// The true terminal.
    pub fn one(&self) -> Ref {
        Ref::ONE
    }

    /// Total number of nodes ever constructed, terminals included.
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().len()
    }

    /// Copies out the node behind a handle.
    pub fn node(&self, f: Ref) -> Node {
        self.storage.borrow().value(f.index())
    }

    pub fn is_terminal(&self, f: Ref) -> bool {
        self.node(f).is_terminal()
    }

    pub fn is_zero(&self, f: Ref) -> bool {
        f == Ref::ZERO
    }

    pub fn is_one(&self, f: Ref) -> bool {
        f == Ref::ONE
    }

    /// The decision variable of `f`, or `None` for terminals.
    pub fn var(&self, f: Ref) -> Option<Var> {
        self.node(f).var()
    }

    /// The low (else) child.
    ///
    /// # Panics
    ///
    /// Panics if `f` is a terminal.
    pub fn low(&self, f: Ref) -> Ref {
        match self.node(f) {
            Node::Decision { low, .. } => low,
            Node::Terminal(_) => panic!("terminal {} has no children", f),
        }
    }

    /// The high (then) child.
    ///
    /// # Panics
    ///
    /// Panics if `f` is a terminal.
    pub fn high(&self, f: Ref) -> Ref {
        match self.node(f) {
            Node::Decision { high, .. } => high,
            Node::Terminal(_) => panic!("terminal {} has no children", f),
        }
    }

    fn check_ordering(
        &self,
        var: Var,
        low: Ref,
        high: Ref,
        order: &VariableOrdering,
    ) -> Result<()> {
        for child in [high, low] {
            if let Some(child_var) = self.var(child) {
                if order.cmp_priority(var, child_var) != std::cmp::Ordering::Less {
                    return Err(Error::InvalidOrdering {
                        var,
                        child: child_var,
                    });
                }
            }
        }
        Ok(())
    }

    /// Constructs a decision node (the `cons` operation).
    ///
    /// Succeeds only if `var` has strictly higher priority under `order`
    /// than the variable of either non-terminal child; terminals always
    /// satisfy this. Each successful call allocates a fresh identity, even
    /// for `low == high` or for a (var, low, high) triple that already
    /// exists elsewhere in the arena.
    pub fn mk_node(&self, var: Var, low: Ref, high: Ref, order: &VariableOrdering) -> Result<Ref> {
        debug!("mk(var = {}, low = {}, high = {})", var, low, high);

        self.check_ordering(var, low, high, order)?;

        let index = self.storage.borrow_mut().add(Node::Decision { var, low, high });
        Ok(Ref::new(index as u32))
    }

    /// Overwrites the decision node behind `target`, keeping its identity.
    ///
    /// This is the explicit identity-reuse path of the rebuild pass after
    /// merge/remove surgery; the same ordering-validity rule as in
    /// [`mk_node`] applies.
    ///
    /// # Panics
    ///
    /// Panics if `target` is a terminal.
    ///
    /// [`mk_node`]: Bdd::mk_node
    pub fn mk_node_at(
        &self,
        target: Ref,
        var: Var,
        low: Ref,
        high: Ref,
        order: &VariableOrdering,
    ) -> Result<()> {
        debug!(
            "mk_at(target = {}, var = {}, low = {}, high = {})",
            target, var, low, high
        );

        assert!(
            !self.is_terminal(target),
            "terminal {} cannot be overwritten",
            target
        );

        self.check_ordering(var, low, high, order)?;

        self.storage
            .borrow_mut()
            .set(target.index(), Node::Decision { var, low, high });
        Ok(())
    }

    /// Builds the conjunction of the given DIMACS-style literals.
    ///
    /// Every variable must be part of `order`; the diagram is built bottom
    /// up from the lowest-priority literal.
    pub fn cube(
        &self,
        literals: impl IntoIterator<Item = i32>,
        order: &VariableOrdering,
    ) -> Result<Ref> {
        let literals = self.sort_by_priority(literals, order)?;
        debug!("cube(literals = {:?})", literals);

        let mut current = self.one();
        for lit in literals.into_iter().rev() {
            current = if lit.is_positive() {
                self.mk_node(lit.var(), self.zero(), current, order)?
            } else {
                self.mk_node(lit.var(), current, self.zero(), order)?
            };
        }
        Ok(current)
    }

    /// Builds the disjunction of the given DIMACS-style literals.
    pub fn clause(
        &self,
        literals: impl IntoIterator<Item = i32>,
        order: &VariableOrdering,
    ) -> Result<Ref> {
        let literals = self.sort_by_priority(literals, order)?;
        debug!("clause(literals = {:?})", literals);

        let mut current = self.zero();
        for lit in literals.into_iter().rev() {
            current = if lit.is_positive() {
                self.mk_node(lit.var(), current, self.one(), order)?
            } else {
                self.mk_node(lit.var(), self.one(), current, order)?
            };
        }
        Ok(current)
    }

    fn sort_by_priority(
        &self,
        literals: impl IntoIterator<Item = i32>,
        order: &VariableOrdering,
    ) -> Result<Vec<Lit>> {
        let mut literals: Vec<Lit> = literals.into_iter().map(Lit::from_dimacs).collect();
        for lit in &literals {
            if !order.contains(lit.var()) {
                return Err(Error::UnknownVariable(lit.var()));
            }
        }
        literals.sort_by_key(|lit| order.position(lit.var()));
        Ok(literals)
    }

    /// Evaluates the diagram under an assignment.
    ///
    /// The assignment is the set of variables that are true; every variable
    /// not in the set, including variables skipped by the diagram, counts
    /// as false.
    pub fn evaluate(&self, f: Ref, assignment: &HashSet<Var>) -> bool {
        let mut current = f;
        loop {
            match self.node(current) {
                Node::Terminal(value) => return value,
                Node::Decision { var, low, high } => {
                    current = if assignment.contains(&var) { high } else { low };
                }
            }
        }
    }

    /// All nodes reachable from `f`, including `f` itself and terminals.
    pub fn descendants(&self, f: Ref) -> HashSet<Ref> {
        let mut visited = HashSet::new();
        let mut queue = vec![f];

        while let Some(node) = queue.pop() {
            if visited.insert(node) {
                if let Node::Decision { low, high, .. } = self.node(node) {
                    queue.push(high);
                    queue.push(low);
                }
            }
        }

        visited
    }

    /// Number of nodes reachable from `f`, terminals included.
    pub fn size(&self, f: Ref) -> usize {
        self.descendants(f).len()
    }

    pub fn to_bracket_string(&self, f: Ref) -> String {
        match self.node(f) {
            Node::Terminal(false) => "(0)".to_string(),
            Node::Terminal(true) => "(1)".to_string(),
            Node::Decision { var, low, high } => format!(
                "{}:({}, {}, {})",
                f,
                var,
                self.to_bracket_string(high),
                self.to_bracket_string(low)
            ),
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new()
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bdd")
            .field("nodes", &self.num_nodes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_terminals() {
        let bdd = Bdd::new();

        assert!(bdd.is_terminal(bdd.zero()));
        assert!(bdd.is_terminal(bdd.one()));
        assert!(bdd.is_zero(bdd.zero()));
        assert!(bdd.is_one(bdd.one()));
        assert_eq!(bdd.var(bdd.zero()), None);
        assert_eq!(bdd.var(bdd.one()), None);
        assert_eq!(bdd.num_nodes(), 2);
    }

    #[test]
    fn test_mk_node() {
        let bdd = Bdd::new();
        let order = VariableOrdering::from_ids([1, 2]);

        let x2 = bdd
            .mk_node(Var::new(2), bdd.zero(), bdd.one(), &order)
            .unwrap();
        let f = bdd.mk_node(Var::new(1), bdd.zero(), x2, &order).unwrap();

        assert_eq!(bdd.var(f), Some(Var::new(1)));
        assert_eq!(bdd.low(f), bdd.zero());
        assert_eq!(bdd.high(f), x2);
    }

    #[test]
    fn test_mk_node_never_dedups() {
        let bdd = Bdd::new();
        let order = VariableOrdering::from_ids([1]);

        let a = bdd
            .mk_node(Var::new(1), bdd.zero(), bdd.one(), &order)
            .unwrap();
        let b = bdd
            .mk_node(Var::new(1), bdd.zero(), bdd.one(), &order)
            .unwrap();
        assert_ne!(a, b);

        // A redundant node is constructible as well.
        let r = bdd.mk_node(Var::new(1), a, a, &order);
        assert!(r.is_err()); // ...but not under itself
        let order = VariableOrdering::from_ids([2, 1]);
        let r = bdd.mk_node(Var::new(2), a, a, &order).unwrap();
        assert_eq!(bdd.low(r), bdd.high(r));
    }

    #[test]
    fn test_mk_node_rejects_ordering_violation() {
        let bdd = Bdd::new();
        let order = VariableOrdering::from_ids([1, 2]);

        let x1 = bdd
            .mk_node(Var::new(1), bdd.zero(), bdd.one(), &order)
            .unwrap();
        let err = bdd.mk_node(Var::new(2), x1, bdd.one(), &order).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidOrdering {
                var: Var::new(2),
                child: Var::new(1),
            }
        );
    }

    #[test]
    fn test_mk_node_rejects_absent_parent_variable() {
        let bdd = Bdd::new();
        let order = VariableOrdering::from_ids([1]);

        let x1 = bdd
            .mk_node(Var::new(1), bdd.zero(), bdd.one(), &order)
            .unwrap();
        // An absent variable has lower priority than any present one.
        assert!(bdd.mk_node(Var::new(9), x1, x1, &order).is_err());
    }

    #[test]
    fn test_evaluate() {
        let bdd = Bdd::new();
        let order = VariableOrdering::from_ids([1, 2]);

        let x2 = bdd
            .mk_node(Var::new(2), bdd.zero(), bdd.one(), &order)
            .unwrap();
        // f = x1 AND x2
        let f = bdd.mk_node(Var::new(1), bdd.zero(), x2, &order).unwrap();

        let both = HashSet::from([Var::new(1), Var::new(2)]);
        let only_x1 = HashSet::from([Var::new(1)]);
        let empty = HashSet::new();

        assert!(bdd.evaluate(f, &both));
        assert!(!bdd.evaluate(f, &only_x1));
        assert!(!bdd.evaluate(f, &empty));
    }

    #[test]
    fn test_size() {
        let bdd = Bdd::new();
        let order = VariableOrdering::from_ids([1, 2]);

        let x2 = bdd
            .mk_node(Var::new(2), bdd.zero(), bdd.one(), &order)
            .unwrap();
        let f = bdd.mk_node(Var::new(1), bdd.zero(), x2, &order).unwrap();

        println!("f = {}", bdd.to_bracket_string(f));
        assert_eq!(bdd.size(f), 4); // f, x2, both terminals
        assert_eq!(bdd.size(bdd.one()), 1);
    }
}
