//! Boolean-operator application over diagrams.
//!
//! [`Bdd::apply`] combines two diagrams under any of the 16 binary Boolean
//! operators by simultaneous Shannon-expansion descent, respecting the
//! supplied variable ordering. [`Bdd::negate`] is the single-operand
//! analogue. Both memoize subresults per top-level call, keyed by node
//! identity.

use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;

use crate::bdd::Bdd;
use crate::error::Result;
use crate::node::Node;
use crate::ordering::VariableOrdering;
use crate::reference::Ref;

/// A binary Boolean operator.
///
/// The discriminant is the operator's truth table packed into four bits:
/// bit `3 - (2a + b)` holds the output for inputs `(a, b)`, so the sixteen
/// variants enumerate every binary Boolean function.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Op {
    /// Constant false.
    Contradiction = 0,
    /// `a AND b`.
    And = 1,
    /// `a AND NOT b`.
    GreaterThan = 2,
    /// `a`.
    IdA = 3,
    /// `NOT a AND b`.
    LessThan = 4,
    /// `b`.
    IdB = 5,
    /// `a XOR b`.
    Xor = 6,
    /// `a OR b`.
    Or = 7,
    /// `NOT (a OR b)`.
    Nor = 8,
    /// `a XNOR b`.
    Equiv = 9,
    /// `NOT b`.
    NotB = 10,
    /// `b IMPLIES a`.
    ImpliedBy = 11,
    /// `NOT a`.
    NotA = 12,
    /// `a IMPLIES b`.
    Implies = 13,
    /// `NOT (a AND b)`.
    Nand = 14,
    /// Constant true.
    Tautology = 15,
}

impl Op {
    /// All sixteen operators, in truth-table order.
    pub const ALL: [Op; 16] = [
        Op::Contradiction,
        Op::And,
        Op::GreaterThan,
        Op::IdA,
        Op::LessThan,
        Op::IdB,
        Op::Xor,
        Op::Or,
        Op::Nor,
        Op::Equiv,
        Op::NotB,
        Op::ImpliedBy,
        Op::NotA,
        Op::Implies,
        Op::Nand,
        Op::Tautology,
    ];

    /// Resolves the operator on two terminal values.
    pub fn eval(self, a: bool, b: bool) -> bool {
        let bit = 3 - (2 * a as u8 + b as u8);
        (self as u8 >> bit) & 1 == 1
    }
}

impl Bdd {
    /// Computes the diagram for `f op g` (the Apply algorithm).
    ///
    /// If both nodes are terminals the operator is resolved directly.
    /// If both share the same top variable, the recursion descends pairwise;
    /// otherwise it steps only into the node whose top variable has the
    /// higher priority under `order`, pairing it against the other node
    /// unchanged. The memo table is scoped to this call and keyed by the
    /// `(f, g)` identity pair; the operator is fixed for the whole call.
    pub fn apply(&self, f: Ref, g: Ref, op: Op, order: &VariableOrdering) -> Result<Ref> {
        debug!("apply(f = {}, g = {}, op = {:?})", f, g, op);
        let mut cache = HashMap::new();
        self.apply_rec(f, g, op, order, &mut cache)
    }

    fn apply_rec(
        &self,
        f: Ref,
        g: Ref,
        op: Op,
        order: &VariableOrdering,
        cache: &mut HashMap<(Ref, Ref), Ref>,
    ) -> Result<Ref> {
        if let (Node::Terminal(a), Node::Terminal(b)) = (self.node(f), self.node(g)) {
            return Ok(if op.eval(a, b) { self.one() } else { self.zero() });
        }

        let key = (f, g);
        if let Some(&res) = cache.get(&key) {
            debug!("cache: apply(f = {}, g = {}) -> {}", f, g, res);
            return Ok(res);
        }

        let fv = self.var(f);
        let gv = self.var(g);

        let res = match (fv, gv) {
            (Some(v), Some(w)) if v == w => {
                let high = self.apply_rec(self.high(f), self.high(g), op, order, cache)?;
                let low = self.apply_rec(self.low(f), self.low(g), op, order, cache)?;
                self.mk_node(v, low, high, order)?
            }
            _ => {
                // Step into whichever side currently has the
                // higher-priority top variable; terminals never step.
                let step_f = match (fv, gv) {
                    (Some(_), None) => true,
                    (None, Some(_)) => false,
                    (Some(v), Some(w)) => order.cmp_priority(v, w) != Ordering::Greater,
                    (None, None) => unreachable!("both terminals handled above"),
                };
                if step_f {
                    let v = fv.unwrap();
                    let high = self.apply_rec(self.high(f), g, op, order, cache)?;
                    let low = self.apply_rec(self.low(f), g, op, order, cache)?;
                    self.mk_node(v, low, high, order)?
                } else {
                    let w = gv.unwrap();
                    let high = self.apply_rec(f, self.high(g), op, order, cache)?;
                    let low = self.apply_rec(f, self.low(g), op, order, cache)?;
                    self.mk_node(w, low, high, order)?
                }
            }
        };

        cache.insert(key, res);
        Ok(res)
    }

    /// Computes the diagram for `NOT f`.
    ///
    /// Terminals flip; decision nodes recurse into both children and
    /// recombine, memoized per node identity for the duration of the call.
    pub fn negate(&self, f: Ref, order: &VariableOrdering) -> Result<Ref> {
        debug!("negate(f = {})", f);
        let mut cache = HashMap::new();
        self.negate_rec(f, order, &mut cache)
    }

    fn negate_rec(
        &self,
        f: Ref,
        order: &VariableOrdering,
        cache: &mut HashMap<Ref, Ref>,
    ) -> Result<Ref> {
        match self.node(f) {
            Node::Terminal(value) => Ok(if value { self.zero() } else { self.one() }),
            Node::Decision { var, low, high } => {
                if let Some(&res) = cache.get(&f) {
                    return Ok(res);
                }
                let low = self.negate_rec(low, order, cache)?;
                let high = self.negate_rec(high, order, cache)?;
                let res = self.mk_node(var, low, high, order)?;
                cache.insert(f, res);
                Ok(res)
            }
        }
    }
}
