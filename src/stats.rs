//! Per-thread counters describing what the algorithms did.
//!
//! ```
//! use levelized_bdd::bdd::Bdd;
//! use levelized_bdd::stats;
//!
//! stats::reset_stats();
//! let f = Bdd::ithvar(0) & Bdd::ithvar(1);
//! assert!(f.nodecount() > 0);
//! assert!(stats::stats().reduce.runs >= 1);
//! ```

use std::cell::RefCell;

/// Statistics of the reduction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReduceStats {
    /// Number of arc files reduced
    pub runs: usize,
    /// Number of runs that only had a single node as input
    pub trivial: usize,
    /// Arcs to internal nodes seen in the inputs
    pub sum_node_arcs: usize,
    /// Arcs to terminals seen in the inputs
    pub sum_terminal_arcs: usize,
    /// Nodes removed since both children are (essentially) equal
    pub removed_by_rule_1: usize,
    /// Nodes removed since they duplicate another node
    pub removed_by_rule_2: usize,
}

impl ReduceStats {
    /// Total number of nodes removed.
    pub fn removed(&self) -> usize {
        self.removed_by_rule_1 + self.removed_by_rule_2
    }

    /// Fraction of the removed nodes that were removed by Rule 1.
    pub fn rule_1_ratio(&self) -> f64 {
        if self.removed() == 0 {
            return 0.0;
        }
        self.removed_by_rule_1 as f64 / self.removed() as f64
    }
}

/// Statistics of the product construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProdStats {
    pub runs: usize,
    /// Resolved directly since an operand was a terminal
    pub terminal_shortcuts: usize,
    /// Resolved directly since both operands share their file
    pub same_file_shortcuts: usize,
    /// Top-down sweeps that were run
    pub sweeps: usize,
}

/// Statistics of quantification and restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantifyStats {
    pub runs: usize,
    /// The input was returned as-is
    pub terminal_returns: usize,
    /// Sweeps that only touched a single level
    pub singleton_sweeps: usize,
    /// Sweeps that touched all levels at once
    pub simultaneous_sweeps: usize,
}

/// Statistics of variable substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceStats {
    pub terminal_returns: usize,
    pub identity_returns: usize,
    pub shift_returns: usize,
    pub monotonic_scans: usize,
    pub monotonic_reduces: usize,
    pub identity_reduces: usize,
    pub rebuilds: usize,
}

impl ReplaceStats {
    /// Number of substitutions that did not touch any node.
    pub fn zero_cost(&self) -> usize {
        self.terminal_returns + self.identity_returns + self.shift_returns
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub reduce: ReduceStats,
    pub prod: ProdStats,
    pub quantify: QuantifyStats,
    pub replace: ReplaceStats,
}

thread_local! {
    static STATS: RefCell<Stats> = RefCell::new(Stats::default());
}

/// Snapshot of the statistics of the current thread.
pub fn stats() -> Stats {
    STATS.with(|s| s.borrow().clone())
}

/// Clears the statistics of the current thread.
pub fn reset_stats() {
    STATS.with(|s| *s.borrow_mut() = Stats::default());
}

pub(crate) fn record(f: impl FnOnce(&mut Stats)) {
    STATS.with(|s| f(&mut s.borrow_mut()));
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_record_and_reset() {
        reset_stats();
        record(|s| s.reduce.removed_by_rule_1 += 3);
        record(|s| s.reduce.removed_by_rule_2 += 1);
        let s = stats();
        assert_eq!(s.reduce.removed(), 4);
        assert_eq!(s.reduce.rule_1_ratio(), 0.75);

        reset_stats();
        assert_eq!(stats(), Stats::default());
    }
}
