//! Dense truth tables and the bottom-up table-to-diagram builder.

use std::collections::HashSet;
use std::fmt;

use crate::bdd::Bdd;
use crate::error::Result;
use crate::formula::Formula;
use crate::ordering::VariableOrdering;
use crate::reference::Ref;
use crate::types::Var;

/// A dense enumeration of a formula's outputs over an ordered variable
/// list.
///
/// For `n` variables the table has `2^n` rows of `n + 1` columns: the `n`
/// input columns followed by the output. Column `c` toggles every
/// `2^(n-1-c)` rows, so the first variable is most significant and row `k`
/// spells `k` in binary.
#[derive(Debug, Clone)]
pub struct TruthTable {
    variables: Vec<Var>,
    rows: Vec<Vec<bool>>,
}

impl TruthTable {
    /// Evaluates `formula` once per row over the variables of `order`.
    ///
    /// # Panics
    ///
    /// Panics if the ordering has 32 or more variables; a dense table of
    /// that size is not representable.
    pub fn new(formula: &Formula, order: &VariableOrdering) -> Self {
        let variables: Vec<Var> = order.iter().collect();
        let n = variables.len();
        assert!(n < 32, "truth table over {} variables is too large", n);

        let rows = (0..1usize << n)
            .map(|k| {
                let mut row: Vec<bool> =
                    (0..n).map(|c| k >> (n - 1 - c) & 1 == 1).collect();
                let assignment: HashSet<Var> = variables
                    .iter()
                    .zip(&row)
                    .filter(|(_, &bit)| bit)
                    .map(|(&var, _)| var)
                    .collect();
                row.push(formula.evaluate(&assignment));
                row
            })
            .collect();

        Self { variables, rows }
    }

    pub fn variables(&self) -> &[Var] {
        &self.variables
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The full row `k`: input columns followed by the output column.
    pub fn row(&self, k: usize) -> &[bool] {
        &self.rows[k]
    }

    /// The output column of row `k`.
    pub fn output(&self, k: usize) -> bool {
        self.rows[k][self.variables.len()]
    }

    /// Number of rows whose output is true.
    pub fn count_true(&self) -> usize {
        (0..self.num_rows()).filter(|&k| self.output(k)).count()
    }

    /// Builds the complete (unreduced) diagram whose shape mirrors the
    /// table exactly.
    ///
    /// Adjacent rows pair bottom-up into decision nodes over the
    /// lowest-priority variable, then each remaining layer pairs two at a
    /// time up to the root. The result visits every variable on every path
    /// and shares nothing but the terminals.
    pub fn to_obdd(&self, bdd: &Bdd) -> Result<Ref> {
        let order = VariableOrdering::new(self.variables.iter().copied());

        let mut layer: Vec<Ref> = (0..self.num_rows())
            .map(|k| if self.output(k) { bdd.one() } else { bdd.zero() })
            .collect();

        for position in (0..self.variables.len()).rev() {
            let var = self.variables[position];
            let mut next = Vec::with_capacity(layer.len() / 2);
            for pair in layer.chunks(2) {
                next.push(bdd.mk_node(var, pair[0], pair[1], &order)?);
            }
            layer = next;
        }

        Ok(layer[0])
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for var in &self.variables {
            write!(f, "{} ", var)?;
        }
        writeln!(f, "|")?;
        for row in &self.rows {
            let (inputs, output) = row.split_at(self.variables.len());
            for &bit in inputs {
                write!(f, "{} ", bit as u8)?;
            }
            writeln!(f, "| {}", output[0] as u8)?;
        }
        Ok(())
    }
}
