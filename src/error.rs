use thiserror::Error;

use crate::types::Var;

/// The result of an engine operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned when an engine operation failed.
///
/// Every failure is reported explicitly; there are no null-like sentinel
/// values anywhere in the API, so "no satisfying assignment" can never be
/// confused with "malformed query".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// `mk_node` was invoked with a variable that is not of strictly higher
    /// priority than one of its non-terminal children.
    #[error("variable {var} does not precede child variable {child} in the ordering")]
    InvalidOrdering { var: Var, child: Var },

    /// The diagram represents the constant false function.
    #[error("no satisfying assignment exists")]
    Unsatisfiable,

    /// No equivalent pair or redundant node was located.
    #[error("no matching node found")]
    NotFound,

    /// The input text does not match the formula grammar.
    #[error("parse error at offset {offset}: {message}")]
    ParseError { offset: usize, message: String },

    /// A position lookup was required for a variable that is absent from
    /// the ordering.
    #[error("variable {0} is not part of the ordering")]
    UnknownVariable(Var),
}
