//! # obdd-rs: Ordered Binary Decision Diagrams in Rust
//!
//! **`obdd-rs`** is a canonical representation engine for Boolean functions
//! built on Ordered, Quasi-Reduced and Reduced Binary Decision Diagrams
//! (OBDD/QOBDD/ROBDD).
//!
//! ## What makes it different?
//!
//! Most BDD libraries keep every diagram reduced at all times. This engine
//! treats *unreduced* diagrams as first-class values: construction never
//! dedups, so complete diagrams (one path per truth-table row), duplicated
//! subgraphs and redundant nodes are all representable, and canonical form
//! is reached through explicit, observable reduction steps: equivalent-pair
//! merging, redundant-node removal and missing-variable insertion. That
//! makes it a good fit for visualization and for inspecting what reduction
//! actually does to a diagram.
//!
//! ## Key features
//!
//! - **Manager-centric architecture**: all nodes live in an arena owned by
//!   the [`Bdd`][crate::bdd::Bdd] manager and are addressed through
//!   lightweight [`Ref`][crate::reference::Ref] handles.
//! - **External variable orderings**: every algorithm takes a
//!   [`VariableOrdering`][crate::ordering::VariableOrdering] explicitly; the
//!   same node can be inspected under different orderings.
//! - **The full operator algebra**: [`apply`][crate::bdd::Bdd::apply]
//!   supports all 16 binary Boolean operators via Shannon expansion.
//! - **Queries**: one model, all models (skipped variables included),
//!   exact model counting with `num-bigint`.
//! - **Formulas and truth tables**: a parseable
//!   [`Formula`][crate::formula::Formula] AST and a dense
//!   [`TruthTable`][crate::truth_table::TruthTable], with lossless
//!   conversion between all three representations.
//! - **Explicit errors**: every failure is a typed
//!   [`Error`][crate::error::Error]; there are no null-like sentinels.
//!
//! ## Basic usage
//!
//! ```rust
//! use obdd_rs::bdd::Bdd;
//! use obdd_rs::formula::Formula;
//! use obdd_rs::ordering::VariableOrdering;
//!
//! let bdd = Bdd::new();
//! let order = VariableOrdering::from_ids([1, 2, 3]);
//!
//! // Parse a formula and build its complete diagram.
//! let f = Formula::parse("((X1 * (-X2)) + (-X3))")?;
//! let diagram = f.to_obdd(&bdd, &order)?;
//!
//! // 5 of the 8 assignments satisfy f.
//! assert_eq!(bdd.sat_count(diagram, &order)?, 5u32.into());
//!
//! // Reduce to the canonical ROBDD; the function is unchanged.
//! let canonical = bdd.reduce_r(diagram, &order)?;
//! assert!(bdd.is_robdd(canonical, &order));
//! assert_eq!(bdd.sat_count(canonical, &order)?, 5u32.into());
//!
//! // And back to a formula, logically equivalent to where we started.
//! assert!(f.logically_equivalent(&bdd.to_formula(canonical)));
//! # Ok::<(), obdd_rs::error::Error>(())
//! ```
//!
//! ## Core components
//!
//! - **[`bdd`]**: the [`Bdd`][crate::bdd::Bdd] manager, node construction
//!   and evaluation.
//! - **[`apply`]**: the 16-operator algebra and negation.
//! - **[`sat`]**: satisfiability, model enumeration, model counting.
//! - **[`reduce`]**: equivalence/redundancy detection, merge/remove graph
//!   surgery, QOBDD/ROBDD reduction.
//! - **[`formula`]** and **[`truth_table`]**: the two other faces of a
//!   Boolean function, with conversions in [`convert`].

pub mod apply;
pub mod bdd;
pub mod convert;
pub mod error;
pub mod formula;
pub mod node;
pub mod ordering;
pub mod reduce;
pub mod reference;
pub mod sat;
pub mod storage;
pub mod truth_table;
pub mod types;
