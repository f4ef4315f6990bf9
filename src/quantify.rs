//! Quantification, restriction and projection as one top-down sweep.
//!
//! Each request of the sweep is a *set* of pointers whose disjunction (or conjunction) is to be
//! computed. What happens on a level is decided by a [`LevelAction`]:
//!
//! - `Keep` outputs a node whose children are the sets of low and high cofactors.
//! - `Quantify` merges the low and high cofactors into a single set further down, without
//!   outputting a node on this level.
//! - `Fix(v)` continues with the cofactors for the value `v` only.
//!
//! Sets are normalized eagerly: neutral terminals are dropped and an absorbing terminal collapses
//! the whole set. Both only happen for terminals that are invariant under cofactoring, since a ZDD
//! terminal does not mean the same thing on every level.

use log::debug;

use crate::arc_file::ArcFile;
use crate::dd::{DecisionDiagram, NodeView, Unreduced};
use crate::exec_policy::ExecPolicy;
use crate::policy::DdPolicy;
use crate::prod2::BoolOp;
use crate::ptr::Ptr;
use crate::stats;
use crate::sweep::{RequestQueue, SweepWriter, Target};
use crate::types::Level;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum LevelAction {
    Keep,
    Quantify,
    Fix(bool),
}

/// Normalizes the set `ptrs` combined with `op` (which is either `Or` or `And`).
fn normalize<P: DdPolicy>(mut ptrs: Vec<Ptr>, op: BoolOp) -> Target<Vec<Ptr>> {
    debug_assert!(matches!(op, BoolOp::Or | BoolOp::And));
    let neutral = op == BoolOp::And;
    let absorbing = !neutral;

    ptrs.sort_unstable();
    ptrs.dedup();

    if P::is_invariant_terminal(absorbing) && ptrs.contains(&Ptr::terminal(absorbing)) {
        return Target::Terminal(absorbing);
    }
    if P::is_invariant_terminal(neutral) {
        ptrs.retain(|&p| p != Ptr::terminal(neutral));
    }
    match ptrs.first() {
        None => Target::Terminal(neutral),
        Some(&p) if ptrs.len() == 1 && p.is_terminal() => Target::Terminal(p.value()),
        // Nodes sort before terminals
        Some(&p) => Target::Request(p.level(), ptrs),
    }
}

fn cofactors<P: DdPolicy>(view: &NodeView, ptrs: &[Ptr], level: Level) -> (Vec<Ptr>, Vec<Ptr>) {
    ptrs.iter().map(|&p| view.cofactor::<P>(p, level)).unzip()
}

/// One sweep over `dd`, combining the sets with `op` and treating each level as `action` says.
pub(crate) fn quantify_sweep<P: DdPolicy>(
    dd: &DecisionDiagram<P>,
    op: BoolOp,
    action: impl Fn(Level) -> LevelAction,
) -> Unreduced<P> {
    let view = dd.view();

    let mut arcs = ArcFile::new();
    let terminal = {
        let mut out = SweepWriter::new(&mut arcs);
        let mut queue: RequestQueue<Vec<Ptr>> = RequestQueue::new();

        match normalize::<P>(vec![view.root()], op) {
            Target::Terminal(v) => out.connect(&[], Ptr::terminal(v)),
            Target::Request(level, key) => queue.push(level, key, []),
        }

        while let Some((level, requests)) = queue.pop_level() {
            out.begin_level(level);
            let level_action = action(level);

            for (ptrs, sources) in requests {
                let (lows, highs) = cofactors::<P>(&view, &ptrs, level);

                let forward_to = match level_action {
                    LevelAction::Keep => {
                        let uid = out.output_node(&sources);
                        let children = [(false, normalize::<P>(lows, op)), (true, normalize::<P>(highs, op))];
                        for (out_idx, child) in children {
                            match child {
                                Target::Terminal(v) => out.terminal_arc(uid, out_idx, v),
                                Target::Request(l, key) => queue.push(l, key, [uid.with_out_idx(out_idx)]),
                            }
                        }
                        continue;
                    }
                    LevelAction::Quantify => normalize::<P>(lows.into_iter().chain(highs).collect(), op),
                    LevelAction::Fix(false) => normalize::<P>(lows, op),
                    LevelAction::Fix(true) => normalize::<P>(highs, op),
                };

                match forward_to {
                    Target::Terminal(v) => out.connect(&sources, Ptr::terminal(v)),
                    Target::Request(l, key) => queue.push(l, key, sources),
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

/// Quantifies all levels of `dd` for which `pred` holds, merging the cofactors with `op`.
///
/// The result of the last sweep is returned unreduced, such that a caller may relabel it during
/// the reduction.
pub(crate) fn quantify<P: DdPolicy>(
    ep: &ExecPolicy,
    dd: &DecisionDiagram<P>,
    op: BoolOp,
    pred: impl Fn(Level) -> bool,
) -> Unreduced<P> {
    stats::record(|s| s.quantify.runs += 1);
    if dd.is_terminal() {
        stats::record(|s| s.quantify.terminal_returns += 1);
        return dd.clone().into();
    }

    let affected: Vec<Level> = dd.support().into_iter().filter(|&l| pred(l)).collect();
    debug!(
        "quantify<{}>(op = {}, nodes = {}, affected levels = {:?})",
        P::NAME,
        op,
        dd.nodecount(),
        affected
    );
    if affected.is_empty() {
        return dd.clone().into();
    }

    if !ep.quantify_singleton(affected.len()) {
        stats::record(|s| s.quantify.simultaneous_sweeps += 1);
        return quantify_sweep(dd, op, |l| {
            if pred(l) {
                LevelAction::Quantify
            } else {
                LevelAction::Keep
            }
        });
    }

    // One level at a time, from the bottom up
    let mut current: Unreduced<P> = dd.clone().into();
    for &level in affected.iter().rev() {
        let reduced = current.reduce();
        if reduced.is_terminal() {
            return reduced.into();
        }
        stats::record(|s| s.quantify.singleton_sweeps += 1);
        current = quantify_sweep(&reduced, op, |l| {
            if l == level {
                LevelAction::Quantify
            } else {
                LevelAction::Keep
            }
        });
    }
    current
}

/// Fixes the levels for which `assignment` has a value.
pub(crate) fn restrict<P: DdPolicy>(
    dd: &DecisionDiagram<P>,
    assignment: impl Fn(Level) -> Option<bool>,
) -> Unreduced<P> {
    stats::record(|s| s.quantify.runs += 1);
    if dd.is_terminal() || dd.support().into_iter().all(|l| assignment(l).is_none()) {
        stats::record(|s| s.quantify.terminal_returns += 1);
        return dd.clone().into();
    }
    debug!("restrict<{}>(nodes = {})", P::NAME, dd.nodecount());

    quantify_sweep(dd, BoolOp::Or, |l| match assignment(l) {
        Some(v) => LevelAction::Fix(v),
        None => LevelAction::Keep,
    })
}
