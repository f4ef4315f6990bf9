//! Binary Decision Diagrams.
//!
//! A [`Bdd`] is a [`DecisionDiagram`] under the [`BddPolicy`]: a node is removed when both of its
//! children are equal, and negation is a constant-time flag flip.
//!
//! ```
//! use levelized_bdd::bdd::Bdd;
//!
//! let x0 = Bdd::ithvar(0);
//! let x1 = Bdd::ithvar(1);
//! let f = &x0 & &x1;
//! assert!(f.eval(|_| true));
//! assert!(!f.eval(|l| l == 0));
//! assert_eq!(!(&x0 & &x1), !&x0 | !&x1);
//! ```

use std::collections::HashMap;
use std::ops::Not;

use log::debug;

use crate::dd::DecisionDiagram;
use crate::error::DdError;
use crate::exec_policy::ExecPolicy;
use crate::node::Node;
use crate::node_file::NodeFile;
use crate::policy::BddPolicy;
use crate::prod2::{apply, BoolOp};
use crate::ptr::Ptr;
use crate::quantify::{quantify, restrict};
use crate::replace::{infer_replace_type, rebuild, replace, validate_replace_type, ReplaceType};
use crate::types::{Level, MAX_ID};

pub type Bdd = DecisionDiagram<BddPolicy>;

impl Bdd {
    pub fn bdd_true() -> Self {
        Self::terminal(true)
    }

    pub fn bdd_false() -> Self {
        Self::terminal(false)
    }

    /// The variable on `level`.
    pub fn ithvar(level: Level) -> Self {
        Self::from(NodeFile::from_nodes([Node::new(level, MAX_ID, Ptr::FALSE, Ptr::TRUE)]))
    }

    /// The negation of the variable on `level`.
    pub fn nithvar(level: Level) -> Self {
        Self::from(NodeFile::from_nodes([Node::new(level, MAX_ID, Ptr::TRUE, Ptr::FALSE)]))
    }

    /// Conjunction of the literals `(level, polarity)`.
    pub fn cube(literals: impl IntoIterator<Item = (Level, bool)>) -> Self {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_unstable();
        literals.dedup();
        debug!("cube(literals = {:?})", literals);
        if literals.windows(2).any(|w| w[0].0 == w[1].0) {
            return Self::bdd_false();
        }
        Self::chain(&literals, false)
    }

    /// Disjunction of the literals `(level, polarity)`.
    pub fn clause(literals: impl IntoIterator<Item = (Level, bool)>) -> Self {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_unstable();
        literals.dedup();
        debug!("clause(literals = {:?})", literals);
        if literals.windows(2).any(|w| w[0].0 == w[1].0) {
            return Self::bdd_true();
        }
        Self::chain(&literals, true)
    }

    /// Conjunction of the variables on `levels`.
    pub fn and_of(levels: impl IntoIterator<Item = Level>) -> Self {
        Self::cube(levels.into_iter().map(|l| (l, true)))
    }

    /// Disjunction of the variables on `levels`.
    pub fn or_of(levels: impl IntoIterator<Item = Level>) -> Self {
        Self::clause(levels.into_iter().map(|l| (l, true)))
    }

    /// A chain of nodes, one per literal. Every literal that is not satisfied leads to the
    /// `escape` terminal, which is `false` for cubes and `true` for clauses.
    fn chain(literals: &[(Level, bool)], is_clause: bool) -> Self {
        if literals.is_empty() {
            return Self::terminal(!is_clause);
        }
        let escape = Ptr::terminal(is_clause);
        let mut current = Ptr::terminal(!is_clause);
        let mut nodes = Vec::with_capacity(literals.len());
        for &(level, positive) in literals.iter().rev() {
            let n = if positive ^ is_clause {
                Node::new(level, MAX_ID, escape, current)
            } else {
                Node::new(level, MAX_ID, current, escape)
            };
            current = n.uid;
            nodes.push(n);
        }
        Self::from(NodeFile::from_nodes(nodes))
    }

    pub fn is_true(&self) -> bool {
        self.is_terminal_value(true)
    }

    pub fn is_false(&self) -> bool {
        self.is_terminal_value(false)
    }
}

impl Bdd {
    pub fn apply_not(&self) -> Self {
        self.negated()
    }

    pub fn apply_op(&self, other: &Self, op: BoolOp) -> Self {
        apply(self, other, op)
    }

    pub fn apply_and(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::And)
    }

    pub fn apply_nand(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::Nand)
    }

    pub fn apply_or(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::Or)
    }

    pub fn apply_nor(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::Nor)
    }

    pub fn apply_xor(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::Xor)
    }

    pub fn apply_eq(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::Xnor)
    }

    pub fn apply_imply(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::Imp)
    }

    pub fn apply_diff(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::Diff)
    }

    pub fn apply_less(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::Less)
    }

    /// If-then-else: `(self & g) | (!self & h)`.
    pub fn apply_ite(&self, g: &Self, h: &Self) -> Self {
        if self.is_terminal() {
            return if self.value() { g.clone() } else { h.clone() };
        }
        if g.shares_file_with(h) && g.is_negated() == h.is_negated() {
            return g.clone();
        }
        let then_part = apply(self, g, BoolOp::And);
        let else_part = apply(self, h, BoolOp::Less);
        apply(&then_part, &else_part, BoolOp::Or)
    }

    pub fn apply_and_many<'a>(nodes: impl IntoIterator<Item = &'a Bdd>) -> Self {
        let mut res = Self::bdd_true();
        for f in nodes {
            res = res.apply_and(f);
            if res.is_false() {
                break;
            }
        }
        res
    }

    pub fn apply_or_many<'a>(nodes: impl IntoIterator<Item = &'a Bdd>) -> Self {
        let mut res = Self::bdd_false();
        for f in nodes {
            res = res.apply_or(f);
            if res.is_true() {
                break;
            }
        }
        res
    }
}

impl Bdd {
    /// Fixes the variable on `level` to `value`.
    pub fn substitute(&self, level: Level, value: bool) -> Self {
        restrict(self, |l| (l == level).then_some(value)).reduce()
    }

    /// Fixes every variable in `assignment` to its value.
    pub fn restrict(&self, assignment: impl IntoIterator<Item = (Level, bool)>) -> Self {
        let values: HashMap<Level, bool> = assignment.into_iter().collect();
        restrict(self, |l| values.get(&l).copied()).reduce()
    }

    /// Existential quantification of all levels for which `pred` holds.
    pub fn exists(&self, pred: impl Fn(Level) -> bool) -> Self {
        self.exists_with(&ExecPolicy::default(), pred)
    }

    pub fn exists_with(&self, ep: &ExecPolicy, pred: impl Fn(Level) -> bool) -> Self {
        quantify(ep, self, BoolOp::Or, pred).reduce()
    }

    /// Existential quantification of the given levels.
    pub fn exists_levels(&self, levels: &[Level]) -> Self {
        self.exists(|l| levels.contains(&l))
    }

    /// Universal quantification of all levels for which `pred` holds.
    pub fn forall(&self, pred: impl Fn(Level) -> bool) -> Self {
        self.forall_with(&ExecPolicy::default(), pred)
    }

    pub fn forall_with(&self, ep: &ExecPolicy, pred: impl Fn(Level) -> bool) -> Self {
        quantify(ep, self, BoolOp::And, pred).reduce()
    }

    /// Universal quantification of the given levels.
    pub fn forall_levels(&self, levels: &[Level]) -> Self {
        self.forall(|l| levels.contains(&l))
    }

    /// Moves every variable from level `x` to level `m(x)`.
    pub fn replace(&self, m: impl Fn(Level) -> Level) -> Result<Self, DdError> {
        self.replace_with(&ExecPolicy::default(), m, None)
    }

    /// Same as [`replace`][Bdd::replace] with a declared type of the mapping, which saves its
    /// inference. Declaring a type that does not describe `m` is an error.
    pub fn replace_as(&self, m: impl Fn(Level) -> Level, m_type: ReplaceType) -> Result<Self, DdError> {
        self.replace_with(&ExecPolicy::default(), m, Some(m_type))
    }

    pub fn replace_with(
        &self,
        ep: &ExecPolicy,
        m: impl Fn(Level) -> Level,
        declared: Option<ReplaceType>,
    ) -> Result<Self, DdError> {
        let inferred = infer_replace_type(self.support(), |l| Some(m(l)));
        match validate_replace_type(declared, inferred)? {
            ReplaceType::NonMonotone if ep.replace_rebuild => Ok(rebuild(self, m)),
            m_type => replace(self, m, m_type),
        }
    }

    /// Value of the function under `assignment`.
    pub fn eval(&self, assignment: impl Fn(Level) -> bool) -> bool {
        if self.is_terminal() {
            return self.value();
        }
        let mut current = self.root();
        // Every child lies on a deeper level, so one pass from the root suffices
        for n in self.nodes_top_down() {
            if n.uid == current {
                current = n.child(assignment(n.level()));
                if current.is_terminal() {
                    break;
                }
            }
        }
        current.value()
    }
}

impl Not for Bdd {
    type Output = Bdd;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Not for &Bdd {
    type Output = Bdd;

    fn not(self) -> Self::Output {
        self.negated()
    }
}
