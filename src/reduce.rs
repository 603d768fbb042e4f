//! Canonicalization: equivalence and redundancy detection, merge/remove
//! graph surgery, missing-variable insertion, QOBDD/ROBDD reduction.
//!
//! The surgery primitives ([`merge`], [`remove`]) work through a redirect
//! map and a rebuild pass that rewrites only the strict ancestors of the
//! pivot variable, preserving every rewritten node's identity. Handles held
//! by callers therefore stay valid across reductions.
//!
//! [`merge`]: Bdd::merge
//! [`remove`]: Bdd::remove

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::bdd::Bdd;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::ordering::VariableOrdering;
use crate::reference::Ref;
use crate::types::Var;

impl Bdd {
    /// Tests whether two diagrams encode the same sub-function, structurally:
    /// terminals are equivalent only if identical, decision nodes iff they
    /// share the variable and have pairwise-equivalent children. Memoized by
    /// identity pair for the duration of the call.
    pub fn is_equivalent(&self, a: Ref, b: Ref) -> bool {
        let mut cache = HashMap::new();
        self.is_equivalent_rec(a, b, &mut cache)
    }

    fn is_equivalent_rec(&self, a: Ref, b: Ref, cache: &mut HashMap<(Ref, Ref), bool>) -> bool {
        if a == b {
            return true;
        }
        match (self.node(a), self.node(b)) {
            // Terminals are singletons, so distinct handles differ.
            (Node::Terminal(_), _) | (_, Node::Terminal(_)) => false,
            (
                Node::Decision {
                    var: va,
                    low: la,
                    high: ha,
                },
                Node::Decision {
                    var: vb,
                    low: lb,
                    high: hb,
                },
            ) => {
                if va != vb {
                    return false;
                }
                if let Some(&res) = cache.get(&(a, b)) {
                    return res;
                }
                let res = self.is_equivalent_rec(ha, hb, cache)
                    && self.is_equivalent_rec(la, lb, cache);
                cache.insert((a, b), res);
                res
            }
        }
    }

    /// Groups the decision nodes reachable from `f` by variable, in
    /// depth-first discovery order.
    fn layers(&self, f: Ref) -> HashMap<Var, Vec<Ref>> {
        let mut layers: HashMap<Var, Vec<Ref>> = HashMap::new();
        let mut visited = HashSet::new();
        let mut stack = vec![f];

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            if let Node::Decision { var, low, high } = self.node(node) {
                layers.entry(var).or_default().push(node);
                stack.push(low);
                stack.push(high);
            }
        }

        layers
    }

    /// Finds the first pair of distinct, equivalent decision nodes in the
    /// diagram, scanning layer by layer.
    ///
    /// Layers are visited following `order`, then any remaining layers by
    /// ascending variable id, so the search is deterministic. Returns
    /// [`Error::NotFound`] if every pair of same-variable nodes is
    /// inequivalent.
    pub fn find_any_equivalent(&self, f: Ref, order: &VariableOrdering) -> Result<(Ref, Ref)> {
        let layers = self.layers(f);

        let mut vars: Vec<Var> = order.iter().filter(|v| layers.contains_key(v)).collect();
        let mut extra: Vec<Var> = layers
            .keys()
            .copied()
            .filter(|v| !order.contains(*v))
            .collect();
        extra.sort();
        vars.extend(extra);

        for var in vars {
            let layer = &layers[&var];
            for i in 0..layer.len() {
                for j in (i + 1)..layer.len() {
                    if self.is_equivalent(layer[i], layer[j]) {
                        debug!("equivalent pair in layer {}: {} ~ {}", var, layer[i], layer[j]);
                        return Ok((layer[i], layer[j]));
                    }
                }
            }
        }

        Err(Error::NotFound)
    }

    /// A decision node is redundant iff its two children are the identical
    /// node.
    pub fn is_redundant(&self, f: Ref) -> bool {
        matches!(self.node(f), Node::Decision { low, high, .. } if low == high)
    }

    /// Depth-first search for the first redundant node, high branch first.
    ///
    /// Returns [`Error::NotFound`] if the diagram has none.
    pub fn find_redundant(&self, f: Ref) -> Result<Ref> {
        let mut visited = HashSet::new();
        self.find_redundant_rec(f, &mut visited).ok_or(Error::NotFound)
    }

    fn find_redundant_rec(&self, f: Ref, visited: &mut HashSet<Ref>) -> Option<Ref> {
        if !visited.insert(f) {
            return None;
        }
        match self.node(f) {
            Node::Terminal(_) => None,
            Node::Decision { low, high, .. } => {
                if low == high {
                    return Some(f);
                }
                self.find_redundant_rec(high, visited)
                    .or_else(|| self.find_redundant_rec(low, visited))
            }
        }
    }

    /// Rewrites the strict ancestors of the pivot variable along the
    /// redirect map, preserving their identities.
    ///
    /// Redirected nodes return their target; nodes whose variable has
    /// priority at or below the pivot are untouched; everything above is
    /// rebuilt in place. The redirect map doubles as the memo table.
    fn rebuild(
        &self,
        f: Ref,
        pivot: Var,
        order: &VariableOrdering,
        redirect: &mut HashMap<Ref, Ref>,
    ) -> Result<Ref> {
        if let Some(&target) = redirect.get(&f) {
            return Ok(target);
        }
        match self.node(f) {
            Node::Terminal(_) => Ok(f),
            Node::Decision { var, low, high } => {
                if order.cmp_priority(var, pivot) != std::cmp::Ordering::Less {
                    return Ok(f);
                }
                let low = self.rebuild(low, pivot, order, redirect)?;
                let high = self.rebuild(high, pivot, order, redirect)?;
                self.mk_node_at(f, var, low, high, order)?;
                redirect.insert(f, f);
                Ok(f)
            }
        }
    }

    /// Merges two equivalent decision nodes, redirecting `b` into `a`, and
    /// returns the diagram's new root.
    ///
    /// # Panics
    ///
    /// Panics if `a` and `b` are not decision nodes over the same variable.
    pub fn merge(&self, root: Ref, a: Ref, b: Ref, order: &VariableOrdering) -> Result<Ref> {
        debug!("merge(root = {}, a = {}, b = {})", root, a, b);

        let pivot = self.var(a).expect("merge target must be a decision node");
        assert_eq!(
            self.var(b),
            Some(pivot),
            "merged nodes must decide the same variable"
        );

        let mut redirect = HashMap::from([(a, a), (b, a)]);
        self.rebuild(root, pivot, order, &mut redirect)
    }

    /// Removes a redundant node, redirecting it to its (identical) child,
    /// and returns the diagram's new root.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not redundant.
    pub fn remove(&self, root: Ref, node: Ref, order: &VariableOrdering) -> Result<Ref> {
        debug!("remove(root = {}, node = {})", root, node);

        assert!(self.is_redundant(node), "only redundant nodes can be removed");
        let pivot = self.var(node).expect("redundant nodes are decision nodes");

        let mut redirect = HashMap::from([(node, self.high(node))]);
        self.rebuild(root, pivot, order, &mut redirect)
    }

    /// Reduces to a QOBDD: merges equivalent pairs until none remain.
    ///
    /// The result has no duplicate subgraphs but may still contain
    /// redundant nodes and skipped variables; pair with
    /// [`add_missing_vars`] for the full quasi-reduced form.
    ///
    /// [`add_missing_vars`]: Bdd::add_missing_vars
    pub fn reduce_q(&self, root: Ref, order: &VariableOrdering) -> Result<Ref> {
        debug!("reduce_q(root = {})", root);

        let mut root = root;
        loop {
            match self.find_any_equivalent(root, order) {
                Ok((a, b)) => root = self.merge(root, a, b, order)?,
                Err(Error::NotFound) => return Ok(root),
                Err(e) => return Err(e),
            }
        }
    }

    /// Reduces to the canonical ROBDD.
    ///
    /// Alternates equivalent-pair merging and redundant-node removal until
    /// neither search finds anything: removing a redundant node can make
    /// two of its former parents equivalent, so a single pass of each is
    /// not enough.
    pub fn reduce_r(&self, root: Ref, order: &VariableOrdering) -> Result<Ref> {
        debug!("reduce_r(root = {})", root);

        let mut root = self.reduce_q(root, order)?;
        loop {
            match self.find_redundant(root) {
                Ok(node) => {
                    root = self.remove(root, node, order)?;
                    root = self.reduce_q(root, order)?;
                }
                Err(Error::NotFound) => return Ok(root),
                Err(e) => return Err(e),
            }
        }
    }

    /// Inserts redundant decision nodes so that every root-to-terminal path
    /// visits every variable of `order`, and returns the new root.
    ///
    /// Chains are inserted innermost first. Surviving decision nodes keep
    /// their identity (their children are rewritten in place); inserted
    /// nodes are fresh, shared per (child, position) so equal gaps reuse
    /// one node per missing variable.
    ///
    /// Returns [`Error::UnknownVariable`] if a decision variable of the
    /// diagram is absent from `order`.
    pub fn add_missing_vars(&self, root: Ref, order: &VariableOrdering) -> Result<Ref> {
        debug!("add_missing_vars(root = {})", root);

        let mut completed = HashMap::new();
        let mut chains = HashMap::new();
        self.fill_gap(root, 0, order, &mut completed, &mut chains)
    }

    /// Completes `f` below its own level, then wraps it in redundant nodes
    /// for the ordering positions `from..level(f)`.
    fn fill_gap(
        &self,
        f: Ref,
        from: usize,
        order: &VariableOrdering,
        completed: &mut HashMap<Ref, Ref>,
        chains: &mut HashMap<(Ref, usize), Ref>,
    ) -> Result<Ref> {
        let level = match self.var(f) {
            None => order.len(),
            Some(var) => order.position(var).ok_or(Error::UnknownVariable(var))?,
        };

        let mut current = self.complete_below(f, level, order, completed, chains)?;
        for position in (from..level).rev() {
            current = match chains.get(&(f, position)).copied() {
                Some(chain) => chain,
                None => {
                    let var = order.var_at(position);
                    let chain = self.mk_node(var, current, current, order)?;
                    chains.insert((f, position), chain);
                    chain
                }
            };
        }
        Ok(current)
    }

    fn complete_below(
        &self,
        f: Ref,
        level: usize,
        order: &VariableOrdering,
        completed: &mut HashMap<Ref, Ref>,
        chains: &mut HashMap<(Ref, usize), Ref>,
    ) -> Result<Ref> {
        match self.node(f) {
            Node::Terminal(_) => Ok(f),
            Node::Decision { var, low, high } => {
                if let Some(&done) = completed.get(&f) {
                    return Ok(done);
                }
                let low = self.fill_gap(low, level + 1, order, completed, chains)?;
                let high = self.fill_gap(high, level + 1, order, completed, chains)?;
                self.mk_node_at(f, var, low, high, order)?;
                completed.insert(f, f);
                Ok(f)
            }
        }
    }

    /// Whether the diagram is a QOBDD under `order`: no equivalent pair
    /// exists and no root-to-terminal path skips an ordering variable.
    ///
    /// A terminal-rooted diagram is a QOBDD only over the empty ordering.
    /// Returns [`Error::UnknownVariable`] if a decision variable of the
    /// diagram is absent from `order`.
    pub fn is_qobdd(&self, root: Ref, order: &VariableOrdering) -> Result<bool> {
        if !self.visits_every_variable(root, order)? {
            return Ok(false);
        }
        Ok(self.find_any_equivalent(root, order).is_err())
    }

    fn visits_every_variable(&self, root: Ref, order: &VariableOrdering) -> Result<bool> {
        let position = |f: Ref| -> Result<usize> {
            match self.var(f) {
                None => Ok(order.len()),
                Some(var) => order.position(var).ok_or(Error::UnknownVariable(var)),
            }
        };

        if position(root)? != 0 && !(self.is_terminal(root) && order.is_empty()) {
            return Ok(false);
        }

        for node in self.descendants(root) {
            if let Node::Decision { low, high, .. } = self.node(node) {
                let level = position(node)?;
                for child in [high, low] {
                    if position(child)? != level + 1 {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    /// Whether the diagram is a ROBDD: no equivalent pair and no redundant
    /// node. Both tests are structural, so this cannot fail on variables
    /// outside `order`.
    pub fn is_robdd(&self, root: Ref, order: &VariableOrdering) -> bool {
        self.find_any_equivalent(root, order).is_err() && self.find_redundant(root).is_err()
    }
}
