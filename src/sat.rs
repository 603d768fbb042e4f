//! Satisfiability queries: one model, all models, model counting.

use std::collections::HashMap;

use log::debug;
use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::ordering::VariableOrdering;
use crate::reference::Ref;
use crate::types::Lit;

impl Bdd {
    /// Returns one satisfying assignment, as the literals along the first
    /// path to the true terminal found by depth-first search trying the
    /// high branch first.
    ///
    /// In an unreduced diagram a branch may dead-end in the false terminal
    /// only, so the search backtracks. Returns [`Error::Unsatisfiable`] if
    /// no path to the true terminal exists.
    pub fn one_sat(&self, f: Ref) -> Result<Vec<Lit>> {
        let mut path = Vec::new();
        if self.one_sat_rec(f, &mut path) {
            Ok(path)
        } else {
            Err(Error::Unsatisfiable)
        }
    }

    fn one_sat_rec(&self, f: Ref, path: &mut Vec<Lit>) -> bool {
        match self.node(f) {
            Node::Terminal(value) => value,
            Node::Decision { var, low, high } => {
                path.push(var.pos());
                if self.one_sat_rec(high, path) {
                    return true;
                }
                path.pop();

                path.push(var.neg());
                if self.one_sat_rec(low, path) {
                    return true;
                }
                path.pop();
                false
            }
        }
    }

    /// Enumerates every satisfying assignment over all variables of `order`.
    ///
    /// Variables the diagram skips (below a node, between a node and its
    /// children, or above the root) contribute every 0/1 combination, so
    /// the result has exactly [`sat_count`] entries and each entry assigns
    /// all of `order`'s variables. Subresults are memoized per node
    /// identity, which is sound because a node's position in the ordering
    /// does not depend on the path that reached it.
    ///
    /// Returns [`Error::UnknownVariable`] if a decision variable of the
    /// diagram is absent from `order`.
    ///
    /// [`sat_count`]: Bdd::sat_count
    pub fn all_sat(&self, f: Ref, order: &VariableOrdering) -> Result<Vec<Vec<Lit>>> {
        debug!("all_sat(f = {})", f);
        let mut cache = HashMap::new();
        let models = self.all_sat_rec(f, order, &mut cache)?;
        Ok(self.spread(models, 0, self.level(f, order)?, order))
    }

    /// Position of a node's variable in `order`; terminals sit one past
    /// the last position.
    fn level(&self, f: Ref, order: &VariableOrdering) -> Result<usize> {
        match self.var(f) {
            None => Ok(order.len()),
            Some(var) => order.position(var).ok_or(Error::UnknownVariable(var)),
        }
    }

    /// Cross-products `models` with all 0/1 choices for the ordering
    /// variables at positions `from..to`, prepending so literals stay in
    /// priority order.
    fn spread(
        &self,
        models: Vec<Vec<Lit>>,
        from: usize,
        to: usize,
        order: &VariableOrdering,
    ) -> Vec<Vec<Lit>> {
        let mut out = models;
        for position in (from..to).rev() {
            let var = order.var_at(position);
            out = out
                .into_iter()
                .flat_map(|model| {
                    let mut low = Vec::with_capacity(model.len() + 1);
                    low.push(var.neg());
                    low.extend(model.iter().copied());
                    let mut high = Vec::with_capacity(model.len() + 1);
                    high.push(var.pos());
                    high.extend(model);
                    [low, high]
                })
                .collect();
        }
        out
    }

    fn all_sat_rec(
        &self,
        f: Ref,
        order: &VariableOrdering,
        cache: &mut HashMap<Ref, Vec<Vec<Lit>>>,
    ) -> Result<Vec<Vec<Lit>>> {
        match self.node(f) {
            Node::Terminal(false) => Ok(Vec::new()),
            Node::Terminal(true) => Ok(vec![Vec::new()]),
            Node::Decision { var, low, high } => {
                if let Some(models) = cache.get(&f) {
                    return Ok(models.clone());
                }

                let position = order.position(var).ok_or(Error::UnknownVariable(var))?;
                let mut models = Vec::new();

                for (child, lit) in [(high, var.pos()), (low, var.neg())] {
                    let sub = self.all_sat_rec(child, order, cache)?;
                    let child_level = self.level(child, order)?;
                    for mut model in self.spread(sub, position + 1, child_level, order) {
                        model.insert(0, lit);
                        models.push(model);
                    }
                }

                cache.insert(f, models.clone());
                Ok(models)
            }
        }
    }

    /// Counts the satisfying assignments of `f` over all variables of
    /// `order`, i.e. the number of true rows of its full truth table.
    ///
    /// Each branch count is scaled by `2^(child position - node position)`
    /// and the sum halved, which compensates for variables skipped on
    /// branches of different depth; the top-level result is scaled for the
    /// variables above the root. Memoized per node identity for the
    /// duration of the call.
    pub fn sat_count(&self, f: Ref, order: &VariableOrdering) -> Result<BigUint> {
        debug!("sat_count(f = {})", f);
        let mut cache = HashMap::new();
        let count = self.sat_count_rec(f, order, &mut cache)?;
        Ok(count << self.level(f, order)?)
    }

    fn sat_count_rec(
        &self,
        f: Ref,
        order: &VariableOrdering,
        cache: &mut HashMap<Ref, BigUint>,
    ) -> Result<BigUint> {
        match self.node(f) {
            Node::Terminal(false) => Ok(BigUint::ZERO),
            Node::Terminal(true) => Ok(BigUint::from(1u32)),
            Node::Decision { var, low, high } => {
                if let Some(count) = cache.get(&f) {
                    return Ok(count.clone());
                }

                let position = order.position(var).ok_or(Error::UnknownVariable(var))?;
                let count_high = self.sat_count_rec(high, order, cache)?;
                let count_low = self.sat_count_rec(low, order, cache)?;
                let level_high = self.level(high, order)?;
                let level_low = self.level(low, order)?;

                let count: BigUint = ((count_high << (level_high - position))
                    + (count_low << (level_low - position)))
                    >> 1;

                cache.insert(f, count.clone());
                Ok(count)
            }
        }
    }
}
