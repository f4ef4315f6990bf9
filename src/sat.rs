use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::dd::DecisionDiagram;
use crate::policy::DdPolicy;
use crate::ptr::Ptr;
use crate::types::Level;

/// Bottom-up sum over all nodes of `dd`: a terminal counts as `terminal(value)` and a node
/// combines the counts of its children with `combine(low, high)`.
fn count_bottom_up<P: DdPolicy>(
    dd: &DecisionDiagram<P>,
    terminal: impl Fn(bool) -> BigUint,
    combine: impl Fn(&BigUint, &BigUint) -> BigUint,
) -> BigUint {
    let mut counts: HashMap<Ptr, BigUint> = HashMap::new();
    let lookup = |counts: &HashMap<Ptr, BigUint>, p: Ptr| -> BigUint {
        if p.is_terminal() {
            return terminal(p.value());
        }
        match counts.get(&p) {
            Some(c) => c.clone(),
            None => unreachable!("children are counted before their parents"),
        }
    };

    for n in dd.nodes_bottom_up() {
        let low = lookup(&counts, n.low);
        let high = lookup(&counts, n.high);
        counts.insert(n.uid, combine(&low, &high));
    }
    lookup(&counts, dd.root())
}

/// Number of paths from the root to the `true` terminal.
pub(crate) fn count_paths<P: DdPolicy>(dd: &DecisionDiagram<P>) -> BigUint {
    count_bottom_up(dd, |v| BigUint::from(v as u32), |low, high| low + high)
}

impl Bdd {
    /// Returns one satisfying assignment, if any exists.
    ///
    /// The assignment lists the literals `(level, value)` along a single path to `true`, preferring
    /// the high branch. Levels skipped by that path may take any value.
    ///
    /// Returns `None` if the BDD represents the constant false function.
    pub fn one_sat(&self) -> Option<Vec<(Level, bool)>> {
        if self.is_false() {
            return None;
        }

        let view = self.view();
        let mut path = Vec::new();
        let mut current = view.root();

        // In a reduced BDD every node other than `false` reaches `true`
        while let Some(n) = view.node(current) {
            let take_high = !n.high.is_false();
            path.push((n.level(), take_high));
            current = n.child(take_high);
        }
        debug_assert!(current.is_true());

        Some(path)
    }

    /// Number of paths from the root to the `true` terminal. Zero for a constant BDD.
    pub fn pathcount(&self) -> BigUint {
        if self.is_terminal() {
            return BigUint::ZERO;
        }
        count_paths(self)
    }

    /// Number of satisfying assignments to `varcount` variables.
    ///
    /// # Panics
    ///
    /// Panics if the BDD depends on more than `varcount` variables.
    pub fn satcount(&self, varcount: usize) -> BigUint {
        assert!(
            self.varcount() <= varcount,
            "Counting over {} variables, but the BDD depends on {}",
            varcount,
            self.varcount()
        );
        let max = BigUint::from(1u32) << varcount;
        if self.is_terminal() {
            return if self.value() { max } else { BigUint::ZERO };
        }
        count_bottom_up(
            self,
            |v| if v { max.clone() } else { BigUint::ZERO },
            |low, high| (low + high) >> 1,
        )
    }
}
