//! Boolean formula syntax trees.
//!
//! The grammar, in string form:
//!
//! ```text
//! operand ::= '0' | '1'
//!           | ('X' | 'x') digits
//!           | '-' operand
//!           | '(' operand ')'
//!           | '(' operand ('*' | '+') operand ')'
//! ```
//!
//! Binary expressions must be parenthesized, so `(X1 * (X2 + X3))` parses
//! and `X1 * X2` does not; operands may carry extra grouping parentheses,
//! as in `((X1 * (-X2)) + (-X3))`. Printing is the structural inverse:
//! binary nodes are always parenthesized, negation prefixes without
//! parentheses.
//!
//! # Example
//!
//! ```
//! use obdd_rs::formula::Formula;
//!
//! let f = Formula::parse("((X1 * (-X2)) + (-X3))").unwrap();
//! assert_eq!(f.to_string(), "((X1 * -X2) + -X3)");
//! ```

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::Var;

/// A Boolean formula, built bottom-up or by parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Constant(bool),
    Variable(Var),
    Not(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn constant(value: bool) -> Self {
        Formula::Constant(value)
    }

    pub fn variable(var: Var) -> Self {
        Formula::Variable(var)
    }

    /// Shorthand for a variable with the given 1-indexed id.
    pub fn var(id: u32) -> Self {
        Formula::Variable(Var::new(id))
    }

    pub fn not(f: Formula) -> Self {
        Formula::Not(Box::new(f))
    }

    pub fn and(lhs: Formula, rhs: Formula) -> Self {
        Formula::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Formula, rhs: Formula) -> Self {
        Formula::Or(Box::new(lhs), Box::new(rhs))
    }

    /// Parses a formula from its string form.
    pub fn parse(text: &str) -> Result<Formula> {
        let mut parser = Parser::new(text);
        let formula = parser.operand()?;
        parser.skip_whitespace();
        if !parser.at_end() {
            return Err(parser.error("trailing input after formula"));
        }
        Ok(formula)
    }

    /// Evaluates the formula; the assignment is the set of variables that
    /// are true.
    pub fn evaluate(&self, assignment: &HashSet<Var>) -> bool {
        match self {
            Formula::Constant(value) => *value,
            Formula::Variable(var) => assignment.contains(var),
            Formula::Not(f) => !f.evaluate(assignment),
            Formula::And(lhs, rhs) => lhs.evaluate(assignment) && rhs.evaluate(assignment),
            Formula::Or(lhs, rhs) => lhs.evaluate(assignment) || rhs.evaluate(assignment),
        }
    }

    /// All variables mentioned by the formula, in ascending id order.
    pub fn variables(&self) -> BTreeSet<Var> {
        let mut vars = BTreeSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut BTreeSet<Var>) {
        match self {
            Formula::Constant(_) => {}
            Formula::Variable(var) => {
                vars.insert(*var);
            }
            Formula::Not(f) => f.collect_variables(vars),
            Formula::And(lhs, rhs) | Formula::Or(lhs, rhs) => {
                lhs.collect_variables(vars);
                rhs.collect_variables(vars);
            }
        }
    }

    /// Bottom-up algebraic simplification.
    ///
    /// After reducing the children: constant folding, double-negation
    /// elimination, idempotence (`f op f -> f`, by structural equality) and
    /// complementary-pair collapse (`f * -f -> 0`, `f + -f -> 1`).
    pub fn reduce(&self) -> Formula {
        match self {
            Formula::Constant(_) | Formula::Variable(_) => self.clone(),
            Formula::Not(f) => match f.reduce() {
                Formula::Constant(value) => Formula::Constant(!value),
                Formula::Not(inner) => *inner,
                reduced => Formula::not(reduced),
            },
            Formula::And(lhs, rhs) => {
                let lhs = lhs.reduce();
                let rhs = rhs.reduce();
                match (&lhs, &rhs) {
                    (Formula::Constant(false), _) | (_, Formula::Constant(false)) => {
                        Formula::Constant(false)
                    }
                    (Formula::Constant(true), _) => rhs,
                    (_, Formula::Constant(true)) => lhs,
                    _ if lhs == rhs => lhs,
                    _ if complementary(&lhs, &rhs) => Formula::Constant(false),
                    _ => Formula::and(lhs, rhs),
                }
            }
            Formula::Or(lhs, rhs) => {
                let lhs = lhs.reduce();
                let rhs = rhs.reduce();
                match (&lhs, &rhs) {
                    (Formula::Constant(true), _) | (_, Formula::Constant(true)) => {
                        Formula::Constant(true)
                    }
                    (Formula::Constant(false), _) => rhs,
                    (_, Formula::Constant(false)) => lhs,
                    _ if lhs == rhs => lhs,
                    _ if complementary(&lhs, &rhs) => Formula::Constant(true),
                    _ => Formula::or(lhs, rhs),
                }
            }
        }
    }

    /// Whether two formulas have the same truth table over the union of
    /// their variables.
    pub fn logically_equivalent(&self, other: &Formula) -> bool {
        let vars: Vec<Var> = self.variables().union(&other.variables()).copied().collect();
        let n = vars.len();
        for bits in 0..(1u64 << n) {
            let assignment: HashSet<Var> = vars
                .iter()
                .enumerate()
                .filter(|(i, _)| bits & (1 << i) != 0)
                .map(|(_, &v)| v)
                .collect();
            if self.evaluate(&assignment) != other.evaluate(&assignment) {
                return false;
            }
        }
        true
    }
}

fn complementary(lhs: &Formula, rhs: &Formula) -> bool {
    let negates = |a: &Formula, b: &Formula| matches!(a, Formula::Not(inner) if **inner == *b);
    negates(lhs, rhs) || negates(rhs, lhs)
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Constant(false) => write!(f, "0"),
            Formula::Constant(true) => write!(f, "1"),
            Formula::Variable(var) => write!(f, "X{}", var.id()),
            Formula::Not(inner) => write!(f, "-{}", inner),
            Formula::And(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Formula::Or(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
        }
    }
}

impl FromStr for Formula {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Formula::parse(s)
    }
}

/// Recursive-descent parser over the formula grammar.
struct Parser<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            input: text.as_bytes(),
            offset: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::ParseError {
            offset: self.offset,
            message: message.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.offset += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.offset += 1;
        }
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.offset += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!(
                "expected '{}', found '{}'",
                expected as char, c as char
            ))),
            None => Err(self.error(format!("expected '{}', found end of input", expected as char))),
        }
    }

    fn operand(&mut self) -> Result<Formula> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("expected an operand, found end of input")),
            Some(b'0') => {
                self.bump();
                Ok(Formula::Constant(false))
            }
            Some(b'1') => {
                self.bump();
                Ok(Formula::Constant(true))
            }
            Some(b'-') => {
                self.bump();
                Ok(Formula::not(self.operand()?))
            }
            Some(b'X') | Some(b'x') => {
                self.bump();
                self.variable()
            }
            Some(b'(') => {
                self.bump();
                let lhs = self.operand()?;
                self.skip_whitespace();
                let combine = match self.bump() {
                    Some(b'*') => Formula::and,
                    Some(b'+') => Formula::or,
                    // Plain grouping, as in `(-X2)` or `((X1))`.
                    Some(b')') => return Ok(lhs),
                    Some(c) => {
                        self.offset -= 1;
                        return Err(self.error(format!(
                            "expected '*', '+' or ')', found '{}'",
                            c as char
                        )));
                    }
                    None => return Err(self.error("expected '*', '+' or ')', found end of input")),
                };
                let rhs = self.operand()?;
                self.skip_whitespace();
                self.expect(b')')?;
                Ok(combine(lhs, rhs))
            }
            Some(c) => Err(self.error(format!("unexpected character '{}'", c as char))),
        }
    }

    fn variable(&mut self) -> Result<Formula> {
        let start = self.offset;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.offset += 1;
        }
        if self.offset == start {
            return Err(self.error("expected digits after variable prefix"));
        }
        let digits = std::str::from_utf8(&self.input[start..self.offset]).expect("ascii digits");
        let id: u32 = digits
            .parse()
            .map_err(|_| self.error(format!("variable id '{}' is out of range", digits)))?;
        if id == 0 {
            return Err(self.error("variable ids are 1-indexed"));
        }
        Ok(Formula::Variable(Var::new(id)))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_parse_and_print() {
        let f = Formula::parse("((X1 * (-X2)) + (-X3))").unwrap();
        assert_eq!(
            f,
            Formula::or(
                Formula::and(Formula::var(1), Formula::not(Formula::var(2))),
                Formula::not(Formula::var(3)),
            )
        );
        // Printing fully parenthesizes binary nodes only.
        assert_eq!(f.to_string(), "((X1 * -X2) + -X3)");

        // The printed form parses back to the same tree.
        assert_eq!(Formula::parse(&f.to_string()).unwrap(), f);
    }

    #[test]
    fn test_parse_atoms() {
        assert_eq!(Formula::parse("0").unwrap(), Formula::Constant(false));
        assert_eq!(Formula::parse("1").unwrap(), Formula::Constant(true));
        assert_eq!(Formula::parse("x12").unwrap(), Formula::var(12));
        assert_eq!(Formula::parse("X12").unwrap(), Formula::var(12));
        assert_eq!(
            Formula::parse("--X1").unwrap(),
            Formula::not(Formula::not(Formula::var(1)))
        );
        assert_eq!(
            Formula::parse(" ( X1 + X2 ) ").unwrap(),
            Formula::or(Formula::var(1), Formula::var(2))
        );

        let f: Formula = "-x3".parse().unwrap();
        assert_eq!(f, Formula::not(Formula::var(3)));
    }

    #[test]
    fn test_parse_grouping() {
        // Extra parentheses around an operand are plain grouping.
        assert_eq!(Formula::parse("(-X2)").unwrap(), Formula::not(Formula::var(2)));
        assert_eq!(Formula::parse("((X1))").unwrap(), Formula::var(1));
        assert_eq!(
            Formula::parse("(X1 * ((-X2)))").unwrap(),
            Formula::and(Formula::var(1), Formula::not(Formula::var(2)))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Formula::parse(""),
            Err(Error::ParseError { .. })
        ));
        for text in ["X1 * X2", "(X1 * X2", "(X1 & X2)", "X", "X0", "()", "2", "(X1 * X2))"] {
            let err = Formula::parse(text).unwrap_err();
            assert!(
                matches!(err, Error::ParseError { .. }),
                "{:?} for {:?}",
                err,
                text
            );
        }
    }

    #[test]
    fn test_evaluate_scenario() {
        let f = Formula::parse("((X1 * (-X2)) + (-X3))").unwrap();
        // X2 unassigned counts as false, so X1 * -X2 holds.
        let assignment = HashSet::from([Var::new(1), Var::new(3)]);
        assert!(f.evaluate(&assignment));

        let all = HashSet::from([Var::new(1), Var::new(2), Var::new(3)]);
        assert!(!f.evaluate(&all));
    }

    #[test]
    fn test_variables() {
        let f = Formula::parse("((X3 * X1) + (-X3))").unwrap();
        let vars: Vec<u32> = f.variables().into_iter().map(Var::id).collect();
        assert_eq!(vars, vec![1, 3]);
    }

    #[test]
    fn test_reduce_constant_folding() {
        let f = Formula::and(Formula::var(1), Formula::constant(false));
        assert_eq!(f.reduce(), Formula::Constant(false));

        let f = Formula::and(Formula::constant(true), Formula::var(1));
        assert_eq!(f.reduce(), Formula::var(1));

        let f = Formula::or(Formula::var(1), Formula::constant(true));
        assert_eq!(f.reduce(), Formula::Constant(true));

        let f = Formula::not(Formula::constant(false));
        assert_eq!(f.reduce(), Formula::Constant(true));
    }

    #[test]
    fn test_reduce_double_negation() {
        let f = Formula::not(Formula::not(Formula::var(2)));
        assert_eq!(f.reduce(), Formula::var(2));
    }

    #[test]
    fn test_reduce_idempotence() {
        let inner = Formula::and(Formula::var(1), Formula::var(2));
        let f = Formula::or(inner.clone(), inner.clone());
        assert_eq!(f.reduce(), inner);
    }

    #[test]
    fn test_reduce_complementary() {
        let f = Formula::and(Formula::var(1), Formula::not(Formula::var(1)));
        assert_eq!(f.reduce(), Formula::Constant(false));

        let f = Formula::or(Formula::not(Formula::var(1)), Formula::var(1));
        assert_eq!(f.reduce(), Formula::Constant(true));
    }

    #[test]
    fn test_reduce_nested() {
        // -(X1 * (X2 + X2)) with a doubled operand collapses bottom-up.
        let f = Formula::not(Formula::and(
            Formula::var(1),
            Formula::or(Formula::var(2), Formula::var(2)),
        ));
        assert_eq!(
            f.reduce(),
            Formula::not(Formula::and(Formula::var(1), Formula::var(2)))
        );
        assert!(f.logically_equivalent(&f.reduce()));
    }

    #[test]
    fn test_logically_equivalent() {
        // De Morgan
        let f = Formula::not(Formula::and(Formula::var(1), Formula::var(2)));
        let g = Formula::or(
            Formula::not(Formula::var(1)),
            Formula::not(Formula::var(2)),
        );
        assert!(f.logically_equivalent(&g));
        assert!(!f.logically_equivalent(&Formula::var(1)));
    }
}
