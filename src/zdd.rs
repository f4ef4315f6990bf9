//! Zero-suppressed Decision Diagrams.
//!
//! A [`Zdd`] represents a family of sets of levels. A node whose high child is `false` is removed,
//! so a level that a path skips is *not* in the sets along that path. The `true` terminal is the
//! family `{∅}` and the `false` terminal is the empty family.
//!
//! List of basic operations over ZDDs, where `A` and `B` are families of sets:
//!
//! - `A.offset(vars)` selects the sets of `A` that contain none of `vars`.
//! - `A.project(keep)` removes all levels but the kept ones from every set.
//! - `A.union(B)`, `A.intersect(B)`, `A.diff(B)` and `A.symmetric_diff(B)`.
//! - `A.count()` is the number of sets in `A`.

use std::collections::{BTreeSet, HashMap};
use std::ops::Sub;

use log::debug;
use num_bigint::BigUint;

use crate::dd::DecisionDiagram;
use crate::error::DdError;
use crate::exec_policy::ExecPolicy;
use crate::node::Node;
use crate::node_file::NodeFile;
use crate::policy::ZddPolicy;
use crate::prod2::{apply, BoolOp};
use crate::ptr::Ptr;
use crate::quantify::{quantify, restrict};
use crate::replace::{infer_replace_type, replace, validate_replace_type, ReplaceType};
use crate::sat::count_paths;
use crate::types::{Level, MAX_ID};

pub type Zdd = DecisionDiagram<ZddPolicy>;

impl Zdd {
    /// The empty family `∅`.
    pub fn empty() -> Self {
        Self::terminal(false)
    }

    /// The family `{∅}` that only contains the empty set.
    pub fn null() -> Self {
        Self::terminal(true)
    }

    /// The family `{{level}}`.
    pub fn ithvar(level: Level) -> Self {
        Self::from(NodeFile::from_nodes([Node::new(level, MAX_ID, Ptr::FALSE, Ptr::TRUE)]))
    }

    /// The family `{vars}` with a single set.
    pub fn vars(vars: impl IntoIterator<Item = Level>) -> Self {
        Self::chain(vars, Ptr::TRUE, |current| (Ptr::FALSE, current))
    }

    /// The family `{{x} | x ∈ vars}`.
    pub fn singletons(vars: impl IntoIterator<Item = Level>) -> Self {
        Self::chain(vars, Ptr::FALSE, |current| (current, Ptr::TRUE))
    }

    /// The family of all subsets of `vars`.
    pub fn powerset(vars: impl IntoIterator<Item = Level>) -> Self {
        Self::chain(vars, Ptr::TRUE, |current| (current, current))
    }

    /// One node per level in `vars`, built bottom-up. The children of each node are computed from
    /// the node below it (`bottom` for the deepest one).
    fn chain(vars: impl IntoIterator<Item = Level>, bottom: Ptr, children: impl Fn(Ptr) -> (Ptr, Ptr)) -> Self {
        let vars: BTreeSet<Level> = vars.into_iter().collect();
        debug!("chain(vars = {:?})", vars);
        if vars.is_empty() {
            return Self::terminal(bottom.value());
        }
        let mut current = bottom;
        let mut nodes = Vec::with_capacity(vars.len());
        for &level in vars.iter().rev() {
            let (low, high) = children(current);
            let n = Node::new(level, MAX_ID, low, high);
            current = n.uid;
            nodes.push(n);
        }
        Self::from(NodeFile::from_nodes(nodes))
    }
}

impl Zdd {
    pub fn union(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::Or)
    }

    pub fn intersect(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::And)
    }

    pub fn diff(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::Diff)
    }

    pub fn symmetric_diff(&self, other: &Self) -> Self {
        apply(self, other, BoolOp::Xor)
    }

    /// The sets that contain none of `vars`.
    pub fn offset(&self, vars: &[Level]) -> Self {
        restrict(self, |l| (vars.contains(&l)).then_some(false)).reduce()
    }

    /// Every set with all levels removed for which `keep` does not hold.
    pub fn project(&self, keep: impl Fn(Level) -> bool) -> Self {
        self.project_with(&ExecPolicy::default(), keep)
    }

    pub fn project_with(&self, ep: &ExecPolicy, keep: impl Fn(Level) -> bool) -> Self {
        quantify(ep, self, BoolOp::Or, |l| !keep(l)).reduce()
    }

    /// Moves every level `x` to `m(x)`. Only order-preserving mappings are supported.
    pub fn replace(&self, m: impl Fn(Level) -> Level) -> Result<Self, DdError> {
        self.replace_as_opt(m, None)
    }

    pub fn replace_as(&self, m: impl Fn(Level) -> Level, m_type: ReplaceType) -> Result<Self, DdError> {
        self.replace_as_opt(m, Some(m_type))
    }

    fn replace_as_opt(&self, m: impl Fn(Level) -> Level, declared: Option<ReplaceType>) -> Result<Self, DdError> {
        let inferred = infer_replace_type(self.support(), |l| Some(m(l)));
        let m_type = validate_replace_type(declared, inferred)?;
        replace(self, m, m_type)
    }

    /// Whether the family contains the set `set`.
    pub fn contains(&self, set: &[Level]) -> bool {
        let mut set = set.to_vec();
        set.sort_unstable();
        set.dedup();

        let mut rest = set.iter().peekable();
        let mut current = self.root();
        for n in self.nodes_top_down() {
            if current.is_terminal() {
                break;
            }
            if n.uid != current {
                continue;
            }
            // A level skipped on the way to this node is not in any of the sets below
            if rest.next_if(|&&l| l < n.level()).is_some() {
                return false;
            }
            let take_high = rest.next_if_eq(&&n.level()).is_some();
            current = n.child(take_high);
        }
        current.is_true() && rest.next().is_none()
    }

    /// Number of sets in the family.
    pub fn count(&self) -> BigUint {
        if self.is_terminal() {
            return BigUint::from(self.value() as u32);
        }
        count_paths(self)
    }

    /// All sets of the family, each sorted by level.
    pub fn sets(&self) -> Vec<Vec<Level>> {
        if self.is_terminal() {
            return if self.value() { vec![vec![]] } else { vec![] };
        }
        let mut results: HashMap<Ptr, Vec<Vec<Level>>> = HashMap::new();
        let lookup = |results: &HashMap<Ptr, Vec<Vec<Level>>>, p: Ptr| -> Vec<Vec<Level>> {
            if p.is_terminal() {
                return if p.value() { vec![vec![]] } else { vec![] };
            }
            match results.get(&p) {
                Some(sets) => sets.clone(),
                None => unreachable!("children are enumerated before their parents"),
            }
        };

        for n in self.nodes_bottom_up() {
            let mut sets = lookup(&results, n.low);
            for mut s in lookup(&results, n.high) {
                s.insert(0, n.level());
                sets.push(s);
            }
            results.insert(n.uid, sets);
        }
        let mut sets = lookup(&results, self.root());
        sets.sort();
        sets
    }
}

impl Sub for Zdd {
    type Output = Zdd;

    fn sub(self, rhs: Self) -> Self::Output {
        self.diff(&rhs)
    }
}

impl Sub for &Zdd {
    type Output = Zdd;

    fn sub(self, rhs: Self) -> Self::Output {
        self.diff(rhs)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_empty() {
        let empty = Zdd::empty();
        println!("empty = {:?} with count {}", empty, empty.count());
        assert_eq!(empty.count(), BigUint::ZERO);
        assert!(!empty.contains(&[]));
    }

    #[test]
    fn test_null() {
        let null = Zdd::null();
        assert_eq!(null.count(), BigUint::from(1u32));
        assert!(null.contains(&[]));
        assert!(!null.contains(&[0]));
    }

    #[test]
    fn test_ithvar() {
        let a = Zdd::ithvar(2);
        assert_eq!(a.count(), BigUint::from(1u32));
        assert!(a.contains(&[2]));
        assert!(!a.contains(&[]));
        assert!(!a.contains(&[1, 2]));
        assert!(!a.contains(&[2, 3]));
        assert_eq!(a.sets(), vec![vec![2]]);
    }

    #[test]
    fn test_vars_singletons_powerset() {
        let v = Zdd::vars([2, 0]);
        assert_eq!(v.sets(), vec![vec![0, 2]]);

        let s = Zdd::singletons([0, 1, 2]);
        assert_eq!(s.count(), BigUint::from(3u32));
        assert!(s.contains(&[1]));
        assert!(!s.contains(&[0, 1]));

        let p = Zdd::powerset([0, 1, 2]);
        assert_eq!(p.count(), BigUint::from(8u32));
        assert!(p.contains(&[0, 2]));
        assert!(p.contains(&[]));
        assert!(!p.contains(&[3]));

        assert_eq!(Zdd::vars([]), Zdd::null());
        assert_eq!(Zdd::singletons([]), Zdd::empty());
        assert_eq!(Zdd::powerset([]), Zdd::null());
    }

    #[test]
    fn test_union() {
        let c1 = Zdd::ithvar(1);
        let c3 = Zdd::ithvar(3);
        let c13 = c1.union(&c3);
        println!("c13 = {:?} with count {}", c13, c13.count());
        assert_eq!(c13.count(), BigUint::from(2u32));
        assert_eq!(c13, &c1 | &c3);

        let f = &c13 | &Zdd::vars([2, 3]);
        assert_eq!(f.sets(), vec![vec![1], vec![2, 3], vec![3]]);
    }

    #[test]
    fn test_set_operations() {
        let p = Zdd::powerset([0, 1, 2]);
        let s = Zdd::singletons([0, 1, 2]);
        let v = Zdd::vars([0, 2]);

        assert_eq!((&p - &s).count(), BigUint::from(5u32));
        assert_eq!(p.symmetric_diff(&s), &p - &s);
        assert_eq!(p.intersect(&v), v);
        assert_eq!(&s & &v, Zdd::empty());
        assert_eq!(s.diff(&p), Zdd::empty());
    }

    #[test]
    fn test_null_is_not_invariant() {
        // {∅} ∩ {∅, {0}} = {∅}
        let null = Zdd::null();
        let p = Zdd::powerset([0]);
        assert_eq!(null.intersect(&p), null);
        assert_eq!(p.diff(&null), Zdd::ithvar(0));
    }

    #[test]
    fn test_offset() {
        let p = Zdd::powerset([0, 1, 2]);
        assert_eq!(p.offset(&[1]), Zdd::powerset([0, 2]));
        assert_eq!(p.offset(&[5]), p);

        let s = Zdd::singletons([0, 1]);
        assert_eq!(s.offset(&[0, 1]), Zdd::empty());
    }

    #[test]
    fn test_project() {
        let v = Zdd::vars([0, 1, 2]);
        assert_eq!(v.project(|l| l != 1), Zdd::vars([0, 2]));

        let s = Zdd::singletons([0, 1, 2]);
        assert_eq!(s.project(|l| l == 0).sets(), vec![vec![], vec![0]]);
        assert_eq!(s.project(|_| false), Zdd::null());
    }

    #[test]
    fn test_replace() {
        let v = Zdd::vars([0, 1]);
        assert_eq!(v.replace(|x| x + 2).unwrap(), Zdd::vars([2, 3]));
        assert_eq!(v.replace(|x| 2 * x).unwrap(), Zdd::vars([0, 2]));
        assert_eq!(
            v.replace(|x| 1 - x),
            Err(DdError::NonMonotoneUnsupported { operation: "replace" })
        );
    }
}
