//! Product construction of two diagrams of the same kind.
//!
//! The product is a single top-down sweep over pairs of pointers `(f, g)`. On the level of a pair,
//! both sides are cofactored with [`DdPolicy::cofactor`] and the resulting children pairs become
//! requests further down. Pairs are resolved to a terminal as early as possible, i.e. as soon as
//! the operator no longer depends on the other side.
//!
//! Before sweeping, a few cases are resolved in constant time by returning one of the inputs (or a
//! negation of it) as-is:
//!
//! - both inputs are terminals,
//! - one input is a terminal that makes the operator constant, the identity or a negation, and
//! - both inputs share the same file.

use std::fmt::{Display, Formatter};

use log::debug;

use crate::arc_file::ArcFile;
use crate::dd::{DecisionDiagram, Unreduced};
use crate::policy::DdPolicy;
use crate::ptr::Ptr;
use crate::stats;
use crate::sweep::{RequestQueue, SweepWriter, Target};
use crate::types::Level;

/// Binary boolean operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
    /// `a -> b`
    Imp,
    /// `b -> a`
    InvImp,
    /// `a & !b`
    Diff,
    /// `!a & b`
    Less,
}

impl BoolOp {
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            BoolOp::And => a & b,
            BoolOp::Nand => !(a & b),
            BoolOp::Or => a | b,
            BoolOp::Nor => !(a | b),
            BoolOp::Xor => a ^ b,
            BoolOp::Xnor => !(a ^ b),
            BoolOp::Imp => !a | b,
            BoolOp::InvImp => a | !b,
            BoolOp::Diff => a & !b,
            BoolOp::Less => !a & b,
        }
    }

    /// The operator with its operands swapped.
    pub fn flip(self) -> Self {
        match self {
            BoolOp::Imp => BoolOp::InvImp,
            BoolOp::InvImp => BoolOp::Imp,
            BoolOp::Diff => BoolOp::Less,
            BoolOp::Less => BoolOp::Diff,
            op => op,
        }
    }

    pub fn is_commutative(self) -> bool {
        self.flip() == self
    }
}

impl Display for BoolOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BoolOp::And => "and",
            BoolOp::Nand => "nand",
            BoolOp::Or => "or",
            BoolOp::Nor => "nor",
            BoolOp::Xor => "xor",
            BoolOp::Xnor => "xnor",
            BoolOp::Imp => "imp",
            BoolOp::InvImp => "invimp",
            BoolOp::Diff => "diff",
            BoolOp::Less => "less",
        };
        write!(f, "{}", s)
    }
}

/// What a boolean function of one argument does.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Unary {
    Const(bool),
    Identity,
    Negation,
}

impl Unary {
    pub fn of(g: impl Fn(bool) -> bool) -> Self {
        match (g(false), g(true)) {
            (false, true) => Unary::Identity,
            (true, false) => Unary::Negation,
            (v, _) => Unary::Const(v),
        }
    }

    /// Applies the function to a whole diagram, if that is possible without a sweep.
    pub fn apply_to<P: DdPolicy>(self, dd: &DecisionDiagram<P>) -> Option<DecisionDiagram<P>> {
        match self {
            Unary::Const(v) => Some(DecisionDiagram::terminal(v)),
            Unary::Identity => Some(dd.clone()),
            Unary::Negation if P::SUPPORTS_NEGATION => Some(dd.negated()),
            Unary::Negation => None,
        }
    }
}

/// Resolves a pair of children: to a terminal, if the operator already decides it, or to the
/// request on the level of the topmost node.
fn resolve<P: DdPolicy>(p: Ptr, q: Ptr, op: BoolOp) -> Target<(Ptr, Ptr)> {
    if p.is_terminal() && q.is_terminal() {
        return Target::Terminal(op.apply(p.value(), q.value()));
    }
    if p.is_terminal() && P::is_invariant_terminal(p.value()) {
        if let Unary::Const(v) = Unary::of(|y| op.apply(p.value(), y)) {
            return Target::Terminal(v);
        }
    }
    if q.is_terminal() && P::is_invariant_terminal(q.value()) {
        if let Unary::Const(v) = Unary::of(|x| op.apply(x, q.value())) {
            return Target::Terminal(v);
        }
    }
    let level = match (p.level_or_none(), q.level_or_none()) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => unreachable!("pairs of terminals are resolved above"),
    };
    Target::Request(level, (p, q))
}

/// Constant-time answers for two diagrams over the same file.
fn resolve_same_file<P: DdPolicy>(
    a: &DecisionDiagram<P>,
    b: &DecisionDiagram<P>,
    op: BoolOp,
) -> Option<DecisionDiagram<P>> {
    let differ = a.is_negated() != b.is_negated();
    let g = Unary::of(|x| op.apply(x, x ^ differ));
    match g {
        // Only the empty family is a constant that every kind of diagram agrees on
        Unary::Const(true) if !P::SUPPORTS_NEGATION => None,
        _ => g.apply_to(a),
    }
}

/// Constant-time answers if either root is a terminal.
fn resolve_terminal_root<P: DdPolicy>(
    a: &DecisionDiagram<P>,
    b: &DecisionDiagram<P>,
    op: BoolOp,
) -> Option<DecisionDiagram<P>> {
    if a.is_terminal() && b.is_terminal() {
        let value = op.apply(a.value(), b.value());
        if a.value() == value {
            return Some(a.clone());
        }
        if b.value() == value {
            return Some(b.clone());
        }
        return Some(DecisionDiagram::terminal(value));
    }
    if a.is_terminal() && P::is_invariant_terminal(a.value()) {
        let va = a.value();
        return Unary::of(|y| op.apply(va, y)).apply_to(b);
    }
    if b.is_terminal() && P::is_invariant_terminal(b.value()) {
        let vb = b.value();
        return Unary::of(|x| op.apply(x, vb)).apply_to(a);
    }
    None
}

/// The product of `a` and `b` under `op`.
pub(crate) fn prod2<P: DdPolicy>(a: &DecisionDiagram<P>, b: &DecisionDiagram<P>, op: BoolOp) -> Unreduced<P> {
    prod2_pruned(a, b, op, |_| false)
}

/// The product of `a` and `b` under `op`, where nodes on levels for which `prune_level` holds may
/// be skipped as if they were existentially quantified afterwards: a node with a `false` child is
/// replaced by its other child, and a node with a `true` child by `true`.
pub(crate) fn prod2_pruned<P: DdPolicy>(
    a: &DecisionDiagram<P>,
    b: &DecisionDiagram<P>,
    op: BoolOp,
    prune_level: impl Fn(Level) -> bool,
) -> Unreduced<P> {
    debug!(
        "prod2<{}>(op = {}, a = {} nodes, b = {} nodes)",
        P::NAME,
        op,
        a.nodecount(),
        b.nodecount()
    );
    stats::record(|s| s.prod.runs += 1);

    if a.shares_file_with(b) {
        if let Some(res) = resolve_same_file(a, b, op) {
            debug!("prod2: same file");
            stats::record(|s| s.prod.same_file_shortcuts += 1);
            return res.into();
        }
    }
    if a.is_terminal() || b.is_terminal() {
        if let Some(res) = resolve_terminal_root(a, b, op) {
            debug!("prod2: terminal root");
            stats::record(|s| s.prod.terminal_shortcuts += 1);
            return res.into();
        }
    }

    stats::record(|s| s.prod.sweeps += 1);
    let va = a.view();
    let vb = b.view();

    let mut arcs = ArcFile::new();
    let terminal = {
        let mut out = SweepWriter::new(&mut arcs);
        let mut queue: RequestQueue<(Ptr, Ptr)> = RequestQueue::new();

        match resolve::<P>(va.root(), vb.root(), op) {
            Target::Terminal(v) => out.connect(&[], Ptr::terminal(v)),
            Target::Request(level, key) => queue.push(level, key, []),
        }

        while let Some((level, requests)) = queue.pop_level() {
            out.begin_level(level);
            let prune = prune_level(level);

            for ((p, q), sources) in requests {
                let (p0, p1) = va.cofactor::<P>(p, level);
                let (q0, q1) = vb.cofactor::<P>(q, level);
                let low = resolve::<P>(p0, q0, op);
                let high = resolve::<P>(p1, q1, op);

                if prune {
                    let skip_to = match (&low, &high) {
                        (Target::Terminal(true), _) | (_, Target::Terminal(true)) => Some(Target::Terminal(true)),
                        (Target::Terminal(false), _) => Some(high.clone()),
                        (_, Target::Terminal(false)) => Some(low.clone()),
                        _ => None,
                    };
                    if let Some(target) = skip_to {
                        match target {
                            Target::Terminal(v) => out.connect(&sources, Ptr::terminal(v)),
                            Target::Request(l, key) => queue.push(l, key, sources),
                        }
                        continue;
                    }
                }

                let uid = out.output_node(&sources);
                for (out_idx, child) in [(false, low), (true, high)] {
                    match child {
                        Target::Terminal(v) => out.terminal_arc(uid, out_idx, v),
                        Target::Request(l, key) => queue.push(l, key, [uid.with_out_idx(out_idx)]),
                    }
                }
            }
            out.observe_pending(queue.pending_arcs());
        }
        out.finish()
    };

    match terminal {
        Some(v) => Unreduced::Reduced(DecisionDiagram::terminal(v)),
        None => Unreduced::Arcs(arcs),
    }
}

/// Reduced product of `a` and `b` under `op`.
pub fn apply<P: DdPolicy>(a: &DecisionDiagram<P>, b: &DecisionDiagram<P>, op: BoolOp) -> DecisionDiagram<P> {
    prod2(a, b, op).reduce()
}

macro_rules! impl_bool_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<P: DdPolicy> std::ops::$trait for &DecisionDiagram<P> {
            type Output = DecisionDiagram<P>;

            fn $method(self, rhs: Self) -> Self::Output {
                apply(self, rhs, $op)
            }
        }

        impl<P: DdPolicy> std::ops::$trait for DecisionDiagram<P> {
            type Output = DecisionDiagram<P>;

            fn $method(self, rhs: Self) -> Self::Output {
                apply(&self, &rhs, $op)
            }
        }

        impl<P: DdPolicy> std::ops::$trait<&DecisionDiagram<P>> for DecisionDiagram<P> {
            type Output = DecisionDiagram<P>;

            fn $method(self, rhs: &DecisionDiagram<P>) -> Self::Output {
                apply(&self, rhs, $op)
            }
        }

        impl<P: DdPolicy> std::ops::$trait<DecisionDiagram<P>> for &DecisionDiagram<P> {
            type Output = DecisionDiagram<P>;

            fn $method(self, rhs: DecisionDiagram<P>) -> Self::Output {
                apply(self, &rhs, $op)
            }
        }
    };
}

impl_bool_op!(BitAnd, bitand, BoolOp::And);
impl_bool_op!(BitOr, bitor, BoolOp::Or);
impl_bool_op!(BitXor, bitxor, BoolOp::Xor);

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use test_log::test;

    use super::*;
    use crate::bdd::Bdd;
    use crate::node::Node;
    use crate::node_file::NodeFile;
    use crate::policy::BddPolicy;
    use crate::types::MAX_ID;
    use crate::zdd::Zdd;

    #[test]
    fn test_bool_op_table() {
        assert!(BoolOp::Imp.apply(false, false));
        assert!(!BoolOp::Imp.apply(true, false));
        assert!(BoolOp::InvImp.apply(true, false));
        assert!(BoolOp::Diff.apply(true, false));
        assert!(BoolOp::Less.apply(false, true));
        assert_eq!(BoolOp::Diff.flip(), BoolOp::Less);
        assert!(BoolOp::Xnor.is_commutative());
        assert!(!BoolOp::Imp.is_commutative());
    }

    #[test]
    fn test_unary() {
        assert_eq!(Unary::of(|x| x), Unary::Identity);
        assert_eq!(Unary::of(|x| !x), Unary::Negation);
        assert_eq!(Unary::of(|_| true), Unary::Const(true));
    }

    #[test]
    fn test_terminal_roots_reuse_handles() {
        let t = Bdd::bdd_true();
        let f = Bdd::bdd_false();
        let x = Bdd::ithvar(2);

        let r = apply(&t, &t, BoolOp::And);
        assert!(Rc::ptr_eq(r.file_ptr(), t.file_ptr()));

        let r = apply(&x, &t, BoolOp::And);
        assert!(Rc::ptr_eq(r.file_ptr(), x.file_ptr()));

        let r = apply(&f, &x, BoolOp::And);
        assert!(r.is_terminal_value(false));

        let r = apply(&x, &t, BoolOp::Xor);
        assert!(Rc::ptr_eq(r.file_ptr(), x.file_ptr()));
        assert!(r.is_negated());
    }

    #[test]
    fn test_same_file() {
        let x = Bdd::ithvar(1);
        assert!(apply(&x, &x.negated(), BoolOp::And).is_terminal_value(false));
        assert!(apply(&x, &x.negated(), BoolOp::Or).is_terminal_value(true));
        assert!(apply(&x, &x, BoolOp::Xor).is_terminal_value(false));
        let r = apply(&x, &x, BoolOp::Nand);
        assert!(r.is_negated());
        assert!(Rc::ptr_eq(r.file_ptr(), x.file_ptr()));
    }

    #[test]
    fn test_and_of_two_variables() {
        let x0 = Bdd::ithvar(0);
        let x1 = Bdd::ithvar(1);
        let f = apply(&x0, &x1, BoolOp::And);

        let n1 = Node::new(1, MAX_ID, Ptr::FALSE, Ptr::TRUE);
        let n0 = Node::new(0, MAX_ID, Ptr::FALSE, n1.uid);
        assert_eq!(f.file().nodes(), &[n1, n0]);
        assert!(f.is_canonical());
    }

    #[test]
    fn test_xor_shares_children() {
        let x0 = Bdd::ithvar(0);
        let x1 = Bdd::ithvar(1);
        let f = apply(&x0, &x1, BoolOp::Xor);
        assert_eq!(f.nodecount(), 3);
        assert_eq!(f.support(), vec![0, 1]);
        assert_eq!(f.number_of_terminals(false), 2);
        assert_eq!(f.number_of_terminals(true), 2);
    }

    #[test]
    fn test_negated_operand() {
        let x0 = Bdd::ithvar(0);
        let x1 = Bdd::ithvar(1);
        // x0 & !x1
        let f = apply(&x0, &x1.negated(), BoolOp::And);
        let g = apply(&x0, &x1, BoolOp::Diff);
        assert_eq!(f.file().nodes(), g.file().nodes());
    }

    #[test]
    fn test_pruned_product() {
        // (x0 & x1) pruned on level 1 collapses to x0
        let x0 = Bdd::ithvar(0);
        let x1 = Bdd::ithvar(1);
        let f = prod2_pruned(&x0, &x1, BoolOp::And, |l| l == 1).reduce();
        let expected = NodeFile::from_nodes([Node::new(0, MAX_ID, Ptr::FALSE, Ptr::TRUE)]);
        assert_eq!(f.file().nodes(), expected.nodes());
    }

    #[test]
    fn test_zdd_union_and_intersection() {
        let a = Zdd::ithvar(0);
        let b = Zdd::ithvar(1);
        let u = apply(&a, &b, BoolOp::Or);
        assert_eq!(u.nodecount(), 2);

        let i = apply(&a, &b, BoolOp::And);
        assert!(i.is_terminal_value(false));

        let d = apply(&u, &b, BoolOp::Diff);
        assert_eq!(d.file().nodes(), a.file().nodes());
    }

    #[test]
    fn test_shifted_operands() {
        let x = Bdd::ithvar(0);
        let y = x.shifted(1);
        let f = apply::<BddPolicy>(&x, &y, BoolOp::And);
        assert_eq!(f.support(), vec![0, 1]);
        assert_eq!(f.nodecount(), 2);
    }
}
