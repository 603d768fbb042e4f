//! Lossless conversion between diagrams and formulas.
//!
//! Formula to diagram goes through the dense truth table and the bottom-up
//! builder, yielding a complete (unreduced) diagram; diagram to formula is
//! a recursive Shannon expansion. Round trips preserve the function, not
//! the syntax.

use std::collections::HashMap;

use log::debug;

use crate::bdd::Bdd;
use crate::error::Result;
use crate::formula::Formula;
use crate::node::Node;
use crate::ordering::VariableOrdering;
use crate::reference::Ref;
use crate::truth_table::TruthTable;

impl Formula {
    /// Builds the complete diagram of this formula over the variables of
    /// `order`, via its full truth table.
    pub fn to_obdd(&self, bdd: &Bdd, order: &VariableOrdering) -> Result<Ref> {
        debug!("to_obdd(formula = {})", self);
        TruthTable::new(self, order).to_obdd(bdd)
    }
}

impl Bdd {
    /// Converts a diagram back into a formula by Shannon expansion:
    /// `var * F(high) + -var * F(low)`, memoized per node identity.
    pub fn to_formula(&self, f: Ref) -> Formula {
        let mut cache = HashMap::new();
        self.to_formula_rec(f, &mut cache)
    }

    fn to_formula_rec(&self, f: Ref, cache: &mut HashMap<Ref, Formula>) -> Formula {
        match self.node(f) {
            Node::Terminal(value) => Formula::constant(value),
            Node::Decision { var, low, high } => {
                if let Some(formula) = cache.get(&f) {
                    return formula.clone();
                }
                let high = self.to_formula_rec(high, cache);
                let low = self.to_formula_rec(low, cache);
                let formula = Formula::or(
                    Formula::and(Formula::variable(var), high),
                    Formula::and(Formula::not(Formula::variable(var)), low),
                );
                cache.insert(f, formula.clone());
                formula
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use test_log::test;

    use super::*;
    use crate::apply::Op;
    use crate::types::Var;

    fn assignments(vars: &[Var]) -> Vec<HashSet<Var>> {
        let mut out = Vec::new();
        for bits in 0..(1u32 << vars.len()) {
            let mut set = HashSet::new();
            for (i, &v) in vars.iter().enumerate() {
                if bits & (1 << i) != 0 {
                    set.insert(v);
                }
            }
            out.push(set);
        }
        out
    }

    #[test]
    fn test_round_trip_is_logically_equivalent() {
        let bdd = Bdd::new();
        let order = VariableOrdering::from_ids([1, 2, 3]);

        let f = Formula::parse("((X1 * (-X2)) + (-X3))").unwrap();
        let diagram = f.to_obdd(&bdd, &order).unwrap();
        let back = bdd.to_formula(diagram);
        println!("back = {}", back);

        assert!(f.logically_equivalent(&back));
        // Reduction does not change the function either.
        let canonical = bdd.reduce_r(diagram, &order).unwrap();
        assert!(f.logically_equivalent(&bdd.to_formula(canonical)));
    }

    #[test]
    fn test_terminal_formulas() {
        let bdd = Bdd::new();
        assert_eq!(bdd.to_formula(bdd.zero()), Formula::constant(false));
        assert_eq!(bdd.to_formula(bdd.one()), Formula::constant(true));
    }

    #[test]
    fn test_apply_agrees_with_formula_evaluation() {
        let bdd = Bdd::new();
        let order = VariableOrdering::from_ids([1, 2, 3]);
        let vars = [Var::new(1), Var::new(2), Var::new(3)];

        let f = Formula::parse("(X1 + (-X2))").unwrap();
        let g = Formula::parse("((X2 * X3) + X1)").unwrap();
        let fd = f.to_obdd(&bdd, &order).unwrap();
        let gd = g.to_obdd(&bdd, &order).unwrap();

        for op in Op::ALL {
            let h = bdd.apply(fd, gd, op, &order).unwrap();
            for assignment in assignments(&vars) {
                assert_eq!(
                    bdd.evaluate(h, &assignment),
                    op.eval(f.evaluate(&assignment), g.evaluate(&assignment)),
                    "op = {:?}",
                    op
                );
            }
        }
    }

    #[test]
    fn test_reduction_conserves_truth_table() {
        let bdd = Bdd::new();
        let order = VariableOrdering::from_ids([1, 2, 3]);

        let f = Formula::parse("((X1 * (-X2)) + (-X3))").unwrap();
        let table = TruthTable::new(&f, &order);
        let diagram = f.to_obdd(&bdd, &order).unwrap();

        let count = bdd.sat_count(diagram, &order).unwrap();
        assert_eq!(count, table.count_true().into());

        let canonical = bdd.reduce_r(diagram, &order).unwrap();
        assert!(bdd.is_robdd(canonical, &order));
        assert_eq!(bdd.sat_count(canonical, &order).unwrap(), count);

        let models = bdd.all_sat(canonical, &order).unwrap();
        assert_eq!(models.len(), table.count_true());
    }
}
