//! # levelized-bdd: Levelized Decision Diagrams in Rust
//!
//! **`levelized-bdd`** is a library for **Binary Decision Diagrams (BDDs)** and **Zero-suppressed
//! Decision Diagrams (ZDDs)** where every algorithm is a sweep over a sorted stream of nodes or
//! arcs, instead of a recursion over a shared unique table.
//!
//! ## How it works
//!
//! A decision diagram is an immutable, reference-counted *node file*: its nodes stored bottom-up,
//! level by level, together with the width of every level and bounds on the number of arcs that
//! cross between levels. Handles to a file carry a negation flag (BDD only) and a level shift, so
//! `!f` and `f` shifted by `k` levels are O(1) and share the file.
//!
//! Operations such as `apply`, quantification and restriction run *top-down*: they process requests
//! level by level in ascending order and emit an *arc file*. The **reduction** engine then sweeps
//! the arcs *bottom-up*, merging duplicate nodes and removing redundant ones, and writes a new
//! canonical node file.
//!
//! ## Quick Start
//!
//! ```rust
//! use levelized_bdd::bdd::Bdd;
//!
//! // 1. Create variables (levels start at 0)
//! let x0 = Bdd::ithvar(0);
//! let x1 = Bdd::ithvar(1);
//!
//! // 2. Build a formula: f = x0 AND (NOT x1)
//! let f = &x0 & !&x1;
//!
//! // 3. Check properties
//! assert!(!f.is_false()); // It is satisfiable
//! assert!(!f.is_true());  // It is not a tautology
//! assert_eq!(f, Bdd::cube([(0, true), (1, false)]));
//!
//! // 4. Evaluate (x0=true, x1=false) -> should be true
//! assert!(f.eval(|x| x == 0));
//! ```
//!
//! ## Core Components
//!
//! - **[`bdd`]** and **[`zdd`]**: the user-facing diagram types and their operations.
//! - **[`reduce`]**: the reduction engine that turns arcs into canonical node files.
//! - **[`relprod`]**: relational product, image and preimage for symbolic model checking.
//! - **[`replace`]**: variable substitution and its classification into replace types.
//! - **[`sat`]**: satisfying assignments and model counting.
//! - **[`dot`]**: utilities for visualizing diagrams using Graphviz.
//! - **[`stats`]**: per-thread counters of the work done by every algorithm.

pub mod arc;
pub mod arc_file;
pub mod bdd;
pub mod cut;
pub mod dd;
pub mod dot;
pub mod error;
pub mod exec_policy;
pub mod isomorphism;
pub mod level_info;
pub mod node;
pub mod node_file;
pub mod policy;
pub mod prod2;
pub mod ptr;
mod quantify;
pub mod reduce;
pub mod relprod;
pub mod replace;
pub mod sat;
pub mod stats;
mod sweep;
pub mod types;
pub mod zdd;
