//! Substitution of levels.
//!
//! How expensive it is to move every node from level `x` to level `m(x)` depends on how `m`
//! behaves on the levels of the diagram:
//!
//! - [`Identity`][ReplaceType::Identity]: nothing to do.
//! - [`Shift`][ReplaceType::Shift]: `m(x) - x` is the same for all levels, so only the shift of the
//!   handle changes.
//! - [`Monotone`][ReplaceType::Monotone]: `m` preserves the order of levels, so one linear scan
//!   relabels all nodes in place. An unreduced diagram is instead relabelled during its reduction.
//! - [`NonMonotone`][ReplaceType::NonMonotone]: the order of levels changes and the diagram has to
//!   be rebuilt. Only BDDs support this.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use log::debug;

use crate::bdd::Bdd;
use crate::dd::{DecisionDiagram, Unreduced};
use crate::error::DdError;
use crate::level_info::LevelInfo;
use crate::node_file::{NodeFile, NodeWriter};
use crate::policy::DdPolicy;
use crate::ptr::Ptr;
use crate::stats;
use crate::types::{Level, SignedLevel};

/// Kinds of level mappings, from the most to the least restrictive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReplaceType {
    Identity,
    Shift,
    Monotone,
    NonMonotone,
}

impl Display for ReplaceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReplaceType::Identity => "identity",
            ReplaceType::Shift => "shift",
            ReplaceType::Monotone => "monotone",
            ReplaceType::NonMonotone => "non-monotone",
        };
        write!(f, "{}", s)
    }
}

/// The most restrictive [`ReplaceType`] of the partial map `m` on `levels` (given top-down).
/// Levels that `m` does not map are ignored.
pub fn infer_replace_type(
    levels: impl IntoIterator<Item = Level>,
    m: impl Fn(Level) -> Option<Level>,
) -> ReplaceType {
    let mut identity = true;
    let mut shift = true;
    let mut monotone = true;

    let mut prev: Option<(Level, SignedLevel)> = None;
    for before in levels {
        let Some(after) = m(before) else {
            continue;
        };
        let diff = after as SignedLevel - before as SignedLevel;

        identity &= before == after;
        if let Some((prev_after, prev_diff)) = prev {
            shift &= prev_diff == diff;
            monotone &= prev_after < after;
        }
        prev = Some((after, diff));
    }

    if !monotone {
        ReplaceType::NonMonotone
    } else if !shift {
        ReplaceType::Monotone
    } else if !identity {
        ReplaceType::Shift
    } else {
        ReplaceType::Identity
    }
}

/// Checks a declared type against the inferred one and returns the type to use.
pub(crate) fn validate_replace_type(
    declared: Option<ReplaceType>,
    inferred: ReplaceType,
) -> Result<ReplaceType, DdError> {
    match declared {
        None => Ok(inferred),
        Some(d) if d < inferred || (d == ReplaceType::NonMonotone && inferred != d) => {
            Err(DdError::ReplaceTypeMismatch {
                declared: d,
                inferred,
            })
        }
        Some(d) => Ok(d),
    }
}

/// Relabels all nodes of `dd` in a single linear scan. `m` must be monotone on its levels.
fn monotonic_scan<P: DdPolicy>(dd: &DecisionDiagram<P>, m: &impl Fn(Level) -> Level) -> DecisionDiagram<P> {
    let mut out = NodeFile::new();
    {
        let mut writer = NodeWriter::new(&mut out);
        // Swapping the terminals may change the order of the children within a level
        writer.set_sorted(dd.file().sorted && !dd.is_negated());
        writer.set_indexable(dd.file().indexable);
        writer.set_1level_cut(dd.max_1level_cut());
        writer.set_2level_cut(dd.max_2level_cut());

        for n in dd.nodes_bottom_up() {
            writer.push_unchecked(n.relabeled(m));
        }
        for li in dd.file().levels() {
            let li = li.shifted(dd.shift());
            writer.push_level_unchecked(LevelInfo::new(m(li.level), li.width));
        }
    }
    DecisionDiagram::from(out)
}

/// Replaces the levels of a reduced diagram with a mapping of the given (validated) type.
///
/// Non-monotone mappings are rejected here; BDDs handle them with [`rebuild`].
pub(crate) fn replace<P: DdPolicy>(
    dd: &DecisionDiagram<P>,
    m: impl Fn(Level) -> Level,
    m_type: ReplaceType,
) -> Result<DecisionDiagram<P>, DdError> {
    if dd.is_terminal() {
        stats::record(|s| s.replace.terminal_returns += 1);
        return Ok(dd.clone());
    }
    debug!("replace<{}>(type = {}, nodes = {})", P::NAME, m_type, dd.nodecount());

    match m_type {
        ReplaceType::Identity => {
            stats::record(|s| s.replace.identity_returns += 1);
            Ok(dd.clone())
        }
        ReplaceType::Shift => {
            stats::record(|s| s.replace.shift_returns += 1);
            let top = match dd.topvar() {
                Some(top) => top,
                None => unreachable!("terminals are returned above"),
            };
            Ok(dd.shifted(m(top) as SignedLevel - top as SignedLevel))
        }
        ReplaceType::Monotone => {
            stats::record(|s| s.replace.monotonic_scans += 1);
            Ok(monotonic_scan(dd, &m))
        }
        ReplaceType::NonMonotone => Err(DdError::NonMonotoneUnsupported { operation: "replace" }),
    }
}

/// Replaces the levels of a possibly unreduced diagram. Unreduced arcs are relabelled while they
/// are reduced.
pub(crate) fn replace_unreduced<P: DdPolicy>(
    u: Unreduced<P>,
    m: impl Fn(Level) -> Level,
    m_type: ReplaceType,
) -> Result<DecisionDiagram<P>, DdError> {
    match u {
        Unreduced::Reduced(dd) => replace(&dd, m, m_type),
        Unreduced::Arcs(_) => match m_type {
            ReplaceType::NonMonotone => Err(DdError::NonMonotoneUnsupported { operation: "replace" }),
            ReplaceType::Monotone | ReplaceType::Shift => {
                stats::record(|s| s.replace.monotonic_reduces += 1);
                Ok(u.reduce_with(m))
            }
            ReplaceType::Identity => {
                stats::record(|s| s.replace.identity_reduces += 1);
                Ok(u.reduce())
            }
        },
    }
}

/// Rebuilds `dd` bottom-up with every node on level `x` replaced by an if-then-else on `m(x)`.
/// Works for any mapping, including non-monotone ones.
pub(crate) fn rebuild(dd: &Bdd, m: impl Fn(Level) -> Level) -> Bdd {
    if dd.is_terminal() {
        stats::record(|s| s.replace.terminal_returns += 1);
        return dd.clone();
    }
    debug!("replace<bdd>(type = non-monotone, nodes = {})", dd.nodecount());
    stats::record(|s| s.replace.rebuilds += 1);

    let mut results: HashMap<Ptr, Bdd> = HashMap::new();
    let lookup = |results: &HashMap<Ptr, Bdd>, p: Ptr| -> Bdd {
        if p.is_terminal() {
            return Bdd::terminal(p.value());
        }
        match results.get(&p) {
            Some(f) => f.clone(),
            None => unreachable!("children are rebuilt before their parents"),
        }
    };

    for n in dd.nodes_bottom_up() {
        let low = lookup(&results, n.low);
        let high = lookup(&results, n.high);
        let var = Bdd::ithvar(m(n.level()));
        results.insert(n.uid, var.apply_ite(&high, &low));
    }
    lookup(&results, dd.root())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use test_log::test;

    use super::*;

    #[test]
    fn test_infer_replace_type() {
        let levels = [0, 1, 2, 4];
        assert_eq!(infer_replace_type(levels, Some), ReplaceType::Identity);
        assert_eq!(infer_replace_type(levels, |x| Some(x + 3)), ReplaceType::Shift);
        assert_eq!(infer_replace_type(levels, |x| Some(2 * x)), ReplaceType::Monotone);
        assert_eq!(infer_replace_type(levels, |x| Some(10 - x)), ReplaceType::NonMonotone);
        assert_eq!(infer_replace_type([], |x| Some(x + 1)), ReplaceType::Identity);
    }

    #[test]
    fn test_infer_replace_type_partial() {
        // Interleaved next-state variables mapped onto the current-state ones
        let m = |x: Level| if x % 2 == 1 { Some(x - 1) } else { None };
        assert_eq!(infer_replace_type([0, 1, 2, 3], m), ReplaceType::Shift);
        assert_eq!(infer_replace_type([0, 2], m), ReplaceType::Identity);

        let m = |x: Level| if x == 1 { None } else { Some(5 - x) };
        assert_eq!(infer_replace_type([1, 3], m), ReplaceType::Shift);
        assert_eq!(infer_replace_type([0, 1, 3], m), ReplaceType::NonMonotone);
    }

    #[test]
    fn test_validate_replace_type() {
        assert_eq!(validate_replace_type(None, ReplaceType::Shift), Ok(ReplaceType::Shift));
        assert_eq!(
            validate_replace_type(Some(ReplaceType::Monotone), ReplaceType::Shift),
            Ok(ReplaceType::Monotone)
        );
        assert_eq!(
            validate_replace_type(Some(ReplaceType::Identity), ReplaceType::Shift),
            Err(DdError::ReplaceTypeMismatch {
                declared: ReplaceType::Identity,
                inferred: ReplaceType::Shift
            })
        );
        assert!(validate_replace_type(Some(ReplaceType::NonMonotone), ReplaceType::Monotone).is_err());
        assert_eq!(
            validate_replace_type(Some(ReplaceType::NonMonotone), ReplaceType::NonMonotone),
            Ok(ReplaceType::NonMonotone)
        );
    }

    #[test]
    fn test_shift_keeps_file() {
        let f = &Bdd::ithvar(0) & &Bdd::ithvar(1);
        let g = replace(&f, |x| x + 2, ReplaceType::Shift).unwrap();
        assert!(Rc::ptr_eq(f.file_ptr(), g.file_ptr()));
        assert_eq!(g.shift(), 2);
        assert_eq!(g.support(), vec![2, 3]);
        assert_eq!(g, &Bdd::ithvar(2) & &Bdd::ithvar(3));
    }

    #[test]
    fn test_monotonic_scan() {
        let f = &Bdd::ithvar(0) & &Bdd::ithvar(1);
        let g = replace(&f, |x| 2 * x + 1, ReplaceType::Monotone).unwrap();
        assert!(g.is_canonical());
        assert_eq!(g.support(), vec![1, 3]);
        assert_eq!(g, &Bdd::ithvar(1) & &Bdd::ithvar(3));
        assert_eq!(g.max_1level_cut(), f.max_1level_cut());
    }

    #[test]
    fn test_monotonic_scan_of_negation() {
        let f = !(&Bdd::ithvar(0) & &Bdd::ithvar(1));
        let g = replace(&f, |x| 2 * x, ReplaceType::Monotone).unwrap();
        assert!(!g.is_negated());
        assert_eq!(g.number_of_terminals(true), 2);
        assert_eq!(g, !(&Bdd::ithvar(0) & &Bdd::ithvar(2)));
    }

    #[test]
    fn test_non_monotone_is_rejected() {
        let f = &Bdd::ithvar(0) & &Bdd::ithvar(1);
        assert_eq!(
            replace(&f, |x| 1 - x, ReplaceType::NonMonotone),
            Err(DdError::NonMonotoneUnsupported { operation: "replace" })
        );
    }

    #[test]
    fn test_rebuild() {
        // x0 & !x1 with the two variables swapped
        let f = &Bdd::ithvar(0) & &Bdd::nithvar(1);
        let g = rebuild(&f, |x| 1 - x);
        assert_eq!(g, &Bdd::ithvar(1) & &Bdd::nithvar(0));
    }
}
