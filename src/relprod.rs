//! Relational product: image and preimage of a set of states under a transition relation.
//!
//! States are a BDD over the *current-state* variables, and the relation is a BDD over both the
//! current-state and the *next-state* variables. A partial level mapping `m` says which levels
//! survive (and where they go): levels with `m(x) = None` are quantified away.
//!
//! - `relprod` is `exists(states & relation, pred)` without any renaming.
//! - `relnext` computes the successors: the conjunction, quantified over the unmapped levels and
//!   renamed with `m`.
//! - `relprev` computes the predecessors: the states are first renamed with `m`, then conjoined
//!   with the relation and quantified over the unmapped levels.
//!
//! The conjunction prunes nodes on levels that are about to be quantified, which keeps the
//! intermediate result small.

use log::debug;

use crate::bdd::Bdd;
use crate::dd::Unreduced;
use crate::error::DdError;
use crate::exec_policy::ExecPolicy;
use crate::policy::BddPolicy;
use crate::prod2::{prod2_pruned, BoolOp};
use crate::quantify::quantify;
use crate::replace::{infer_replace_type, rebuild, replace, replace_unreduced, validate_replace_type, ReplaceType};
use crate::types::Level;

/// `states & relation`, skipping the nodes on levels that are quantified afterwards.
fn relprod_and(states: &Bdd, relation: &Bdd, prune_level: impl Fn(Level) -> bool) -> Unreduced<BddPolicy> {
    prod2_pruned(states, relation, BoolOp::And, prune_level)
}

/// Total version of a partial level mapping. Unmapped levels are quantified before the mapping
/// is applied, so their image is irrelevant.
fn total(m: impl Fn(Level) -> Option<Level>) -> impl Fn(Level) -> Level {
    move |x| m(x).unwrap_or(x)
}

impl Bdd {
    /// `exists(self & relation, pred)`.
    pub fn relprod(&self, relation: &Bdd, pred: impl Fn(Level) -> bool) -> Bdd {
        self.relprod_with(&ExecPolicy::default(), relation, pred)
    }

    pub fn relprod_with(&self, ep: &ExecPolicy, relation: &Bdd, pred: impl Fn(Level) -> bool) -> Bdd {
        debug!(
            "relprod(states = {} nodes, relation = {} nodes)",
            self.nodecount(),
            relation.nodecount()
        );
        let tmp = relprod_and(self, relation, &pred).reduce();
        quantify(ep, &tmp, BoolOp::Or, pred).reduce()
    }

    /// Successors of the states in `self` under `relation`, renamed with `m`.
    ///
    /// The kind of `m` is inferred from the levels of the relation.
    pub fn relnext(&self, relation: &Bdd, m: impl Fn(Level) -> Option<Level>) -> Result<Bdd, DdError> {
        self.relnext_with(&ExecPolicy::default(), relation, m, None)
    }

    /// Same as [`relnext`][Bdd::relnext] with a declared kind of `m`.
    ///
    /// Declaring a kind that does not describe `m` is an error. Declaring
    /// [`NonMonotone`][ReplaceType::NonMonotone] is always an error: either the mapping is not
    /// non-monotone, or a non-monotone renaming cannot be fused with the quantification.
    pub fn relnext_as(
        &self,
        relation: &Bdd,
        m: impl Fn(Level) -> Option<Level>,
        m_type: ReplaceType,
    ) -> Result<Bdd, DdError> {
        self.relnext_with(&ExecPolicy::default(), relation, m, Some(m_type))
    }

    pub fn relnext_with(
        &self,
        ep: &ExecPolicy,
        relation: &Bdd,
        m: impl Fn(Level) -> Option<Level>,
        declared: Option<ReplaceType>,
    ) -> Result<Bdd, DdError> {
        let inferred = infer_replace_type(relation.support(), &m);
        let m_type = validate_replace_type(declared, inferred)?;
        if declared == Some(ReplaceType::NonMonotone) {
            return Err(DdError::NonMonotoneUnsupported { operation: "relnext" });
        }
        self.relnext_typed(ep, relation, m, m_type)
    }

    fn relnext_typed(
        &self,
        ep: &ExecPolicy,
        relation: &Bdd,
        m: impl Fn(Level) -> Option<Level>,
        m_type: ReplaceType,
    ) -> Result<Bdd, DdError> {
        debug!(
            "relnext(states = {} nodes, relation = {} nodes, type = {})",
            self.nodecount(),
            relation.nodecount(),
            m_type
        );
        let unmapped = |x: Level| m(x).is_none();
        let tmp = relprod_and(self, relation, unmapped).reduce();
        let quantified = quantify(ep, &tmp, BoolOp::Or, unmapped);

        match m_type {
            ReplaceType::NonMonotone if ep.replace_rebuild => Ok(rebuild(&quantified.reduce(), total(&m))),
            ReplaceType::NonMonotone => Err(DdError::NonMonotoneUnsupported { operation: "relnext" }),
            _ => replace_unreduced(quantified, total(&m), m_type),
        }
    }

    /// Successors where the next-state variables are the ones on the levels `varcount..`, and
    /// level `x + varcount` is the next-state copy of level `x`.
    pub fn relnext_shift(&self, relation: &Bdd, varcount: Level) -> Bdd {
        let m = move |x: Level| if x < varcount { None } else { Some(x - varcount) };
        match self.relnext_typed(&ExecPolicy::default(), relation, m, ReplaceType::Shift) {
            Ok(res) => res,
            Err(e) => unreachable!("shifting is monotone: {}", e),
        }
    }

    /// Successors where the current-state variables are on the even levels, and level `x + 1` is
    /// the next-state copy of level `x`.
    pub fn relnext_interleaved(&self, relation: &Bdd) -> Bdd {
        let m = |x: Level| if x % 2 == 0 { None } else { Some(x - 1) };
        match self.relnext_typed(&ExecPolicy::default(), relation, m, ReplaceType::Shift) {
            Ok(res) => res,
            Err(e) => unreachable!("shifting is monotone: {}", e),
        }
    }

    /// Predecessors of the states in `self` under `relation`. The states are renamed with `m`
    /// before the product, so every level of `self` must be mapped.
    ///
    /// The kind of `m` is inferred from the levels of the states.
    pub fn relprev(&self, relation: &Bdd, m: impl Fn(Level) -> Option<Level>) -> Result<Bdd, DdError> {
        self.relprev_with(&ExecPolicy::default(), relation, m, None)
    }

    /// Same as [`relprev`][Bdd::relprev] with a declared kind of `m`.
    pub fn relprev_as(
        &self,
        relation: &Bdd,
        m: impl Fn(Level) -> Option<Level>,
        m_type: ReplaceType,
    ) -> Result<Bdd, DdError> {
        self.relprev_with(&ExecPolicy::default(), relation, m, Some(m_type))
    }

    pub fn relprev_with(
        &self,
        ep: &ExecPolicy,
        relation: &Bdd,
        m: impl Fn(Level) -> Option<Level>,
        declared: Option<ReplaceType>,
    ) -> Result<Bdd, DdError> {
        let support = self.support();
        if let Some(&level) = support.iter().find(|&&l| m(l).is_none()) {
            return Err(DdError::UnmappedLevel { level });
        }
        let inferred = infer_replace_type(support, &m);
        let m_type = validate_replace_type(declared, inferred)?;
        debug!(
            "relprev(states = {} nodes, relation = {} nodes, type = {})",
            self.nodecount(),
            relation.nodecount(),
            m_type
        );

        let renamed = match m_type {
            ReplaceType::NonMonotone if ep.replace_rebuild => rebuild(self, total(&m)),
            ReplaceType::NonMonotone => return Err(DdError::NonMonotoneUnsupported { operation: "relprev" }),
            _ => replace(self, total(&m), m_type)?,
        };

        let unmapped = |x: Level| m(x).is_none();
        let tmp = relprod_and(&renamed, relation, unmapped).reduce();
        Ok(quantify(ep, &tmp, BoolOp::Or, unmapped).reduce())
    }

    /// Predecessors where level `x + varcount` is the next-state copy of level `x`.
    pub fn relprev_shift(&self, relation: &Bdd, varcount: Level) -> Result<Bdd, DdError> {
        let m = move |x: Level| if x >= varcount { None } else { Some(x + varcount) };
        self.relprev_as(relation, m, ReplaceType::Shift)
    }

    /// Predecessors where level `x + 1` is the next-state copy of the even level `x`.
    pub fn relprev_interleaved(&self, relation: &Bdd) -> Result<Bdd, DdError> {
        let m = |x: Level| if x % 2 == 1 { None } else { Some(x + 1) };
        self.relprev_as(relation, m, ReplaceType::Shift)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use test_log::test;

    use super::*;
    use crate::cut::Cuts;
    use crate::level_info::LevelInfo;
    use crate::stats;

    /// Increment of a 2-bit counter `(b1 b0)`, with `b0` on level 0, `b1` on level 2 and their
    /// next-state copies on the level below.
    fn increment() -> Bdd {
        let x: Vec<Bdd> = (0..4).map(Bdd::ithvar).collect();
        let b0 = &x[0] ^ &x[1];
        let b1 = x[3].apply_eq(&(&x[2] ^ &x[0]));
        &b0 & &b1
    }

    fn state(value: u32) -> Bdd {
        Bdd::cube([(0, value & 1 == 1), (2, value & 2 == 2)])
    }

    #[test]
    fn test_relprod_identity_and_annihilation() {
        let t = Bdd::bdd_true();
        let r = t.relprod(&t, |_| true);
        assert!(Rc::ptr_eq(r.file_ptr(), t.file_ptr()));

        let f = Bdd::bdd_false();
        let r = f.relprod(&increment(), |l| l % 2 == 0);
        assert!(r.is_false());
        assert_eq!(r.max_1level_cut(), Cuts::new(0, 1, 0, 1));

        let r = state(0).relprod(&f, |l| l % 2 == 0);
        assert!(r.is_false());
    }

    #[test]
    fn test_relprod() {
        // Toggling a single bit
        let r = &Bdd::ithvar(0) ^ &Bdd::ithvar(1);
        assert_eq!(Bdd::ithvar(0).relprod(&r, |l| l == 0), Bdd::nithvar(1));
        assert!(Bdd::bdd_true().relprod(&r, |l| l == 0).is_true());
    }

    #[test]
    fn test_relprod_two_bit_relation() {
        // Relation {(00,01), (01,10), (10,01), (10,11)} with the current state on levels 0 and 1
        // and the next state on levels 2 and 3, first character on the lower level
        let pair = |from: &str, to: &str| {
            let bits = from.chars().chain(to.chars()).map(|c| c == '1');
            Bdd::cube((0..).zip(bits))
        };
        let pairs = [
            pair("00", "01"),
            pair("01", "10"),
            pair("10", "01"),
            pair("10", "11"),
        ];
        let relation = Bdd::apply_or_many(&pairs);
        let states = Bdd::cube([(0, false), (1, true)]);

        let next = states.relprod(&relation, |x| x < 2);
        println!("next = {:?}", next);

        assert!(!next.is_negated());
        assert!(next.is_canonical());
        assert_eq!(next.file().levels(), &[LevelInfo::new(3, 1), LevelInfo::new(2, 1)]);
        assert_eq!(next.file().width, 1);
        assert_eq!(next.max_1level_cut(), Cuts::new(1, 2, 1, 3));
        assert_eq!(next.file().number_of_terminals, [2, 1]);
        assert_eq!(
            next.nodes_bottom_up().collect::<Vec<_>>(),
            Bdd::cube([(2, true), (3, false)]).nodes_bottom_up().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_relprod_of_shifted_diagrams() {
        let r = (&Bdd::ithvar(0) ^ &Bdd::ithvar(1)).shifted(2);
        let s = Bdd::ithvar(0).shifted(2);
        assert_eq!(s.relprod(&r, |l| l == 2), Bdd::nithvar(3));
    }

    #[test]
    fn test_relnext_interleaved() {
        let r = increment();
        for v in 0..4 {
            let next = state(v).relnext_interleaved(&r);
            assert_eq!(next, state((v + 1) % 4), "successor of {}", v);
        }
    }

    #[test]
    fn test_relnext_with_inferred_type() {
        let r = increment();
        stats::reset_stats();
        let next = state(0).relnext(&r, |x| if x % 2 == 0 { None } else { Some(x - 1) }).unwrap();
        assert_eq!(next, state(1));
        // All current-state nodes are pruned, so only the shift of the handle changes
        assert_eq!(stats::stats().replace.shift_returns, 1);
    }

    #[test]
    fn test_relnext_shift() {
        // A single bit toggled, with the next-state copy two levels below
        let r = &Bdd::ithvar(0) ^ &Bdd::ithvar(2);
        assert_eq!(Bdd::ithvar(0).relnext_shift(&r, 2), Bdd::nithvar(0));
        assert_eq!(Bdd::nithvar(0).relnext_shift(&r, 2), Bdd::ithvar(0));
    }

    #[test]
    fn test_relnext_non_monotone() {
        let r = increment();
        // b0' goes to level 2 and b1' to level 0
        let m = |x: Level| match x {
            1 => Some(2),
            3 => Some(0),
            _ => None,
        };
        let next = state(0).relnext(&r, m).unwrap();
        assert_eq!(next, Bdd::cube([(0, false), (2, true)]));

        assert_eq!(
            state(0).relnext_as(&r, m, ReplaceType::NonMonotone),
            Err(DdError::NonMonotoneUnsupported { operation: "relnext" })
        );
        assert_eq!(
            state(0).relnext_as(&r, m, ReplaceType::Monotone),
            Err(DdError::ReplaceTypeMismatch {
                declared: ReplaceType::Monotone,
                inferred: ReplaceType::NonMonotone
            })
        );

        let ep = ExecPolicy {
            replace_rebuild: false,
            ..ExecPolicy::default()
        };
        assert!(state(0).relnext_with(&ep, &r, m, None).is_err());
    }

    #[test]
    fn test_relnext_declared_type_mismatch() {
        let r = increment();
        let m = |x: Level| if x % 2 == 0 { None } else { Some(x - 1) };
        let err = state(0).relnext_as(&r, m, ReplaceType::Identity).unwrap_err();
        assert_eq!(
            err,
            DdError::ReplaceTypeMismatch {
                declared: ReplaceType::Identity,
                inferred: ReplaceType::Shift
            }
        );
        assert!(err.is_invalid_argument());

        let err = state(0).relnext_as(&r, m, ReplaceType::NonMonotone).unwrap_err();
        assert!(matches!(err, DdError::ReplaceTypeMismatch { .. }));

        assert_eq!(state(0).relnext_as(&r, m, ReplaceType::Monotone), Ok(state(1)));
    }

    #[test]
    fn test_relprev_interleaved() {
        let r = increment();
        for v in 0..4 {
            let prev = state(v).relprev_interleaved(&r).unwrap();
            assert_eq!(prev, state((v + 3) % 4), "predecessor of {}", v);
        }
    }

    #[test]
    fn test_relprev_shift() {
        let r = &Bdd::ithvar(0) ^ &Bdd::ithvar(2);
        assert_eq!(Bdd::ithvar(0).relprev_shift(&r, 2).unwrap(), Bdd::nithvar(0));
        assert_eq!(
            Bdd::ithvar(3).relprev_shift(&r, 2),
            Err(DdError::UnmappedLevel { level: 3 })
        );
    }

    #[test]
    fn test_relprev_unmapped_level() {
        let r = increment();
        assert_eq!(
            Bdd::ithvar(1).relprev_interleaved(&r),
            Err(DdError::UnmappedLevel { level: 1 })
        );
    }

    #[test]
    fn test_reachability_fixpoint() {
        let r = increment();
        let mut reached = state(0);
        let mut steps = 0;
        loop {
            let next = reached.relnext_interleaved(&r);
            let new = &reached | &next;
            if new == reached {
                break;
            }
            reached = new;
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert!(reached.is_true());
    }
}
