//! Reconstruction of closed liquidity intervals from signed tick deltas.
//!
//! A pool's tick list is a sequence of signed liquidity changes sorted by
//! index. Walking it with a stack recovers the closed intervals: an opening
//! tick pushes its magnitude, a closing tick settles the most recently
//! opened liquidity first (LIFO), splitting entries when magnitudes differ.
//! Anything the walk cannot match is a structural violation and the pool's
//! requirement is unknowable.

use std::fmt;

use crate::types::{LiquidityInterval, LiquidityTick, PoolId};

/// Tick stream malformed beyond repair; no reserve requirement can be
/// derived for the pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuralViolation {
    pub pool: PoolId,
    pub kind: ViolationKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// Tick indexes must be strictly ascending; duplicates count too.
    OutOfOrder { index: i32, prev_index: i32 },
    /// A zero-magnitude delta belongs to no interval.
    ZeroMagnitude { index: i32 },
    /// A closing tick drained down to an earlier unmatched closing tick.
    ClosingAgainstClosing { index: i32, stacked_index: i32 },
    /// Ticks left unmatched after the full walk.
    UnmatchedTicks { count: usize, first_index: i32 },
}

impl fmt::Display for StructuralViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "structural violation in pool {}: ", self.pool)?;
        match self.kind {
            ViolationKind::OutOfOrder { index, prev_index } => write!(
                f,
                "tick index {index} arrived after {prev_index}; input must be strictly ascending"
            ),
            ViolationKind::ZeroMagnitude { index } => {
                write!(f, "tick at index {index} has zero liquidity change")
            }
            ViolationKind::ClosingAgainstClosing { index, stacked_index } => write!(
                f,
                "closing tick at index {index} ran into unmatched closing tick at index {stacked_index}"
            ),
            ViolationKind::UnmatchedTicks { count, first_index } => write!(
                f,
                "{count} unmatched tick(s) after full walk, first at index {first_index}"
            ),
        }
    }
}

impl std::error::Error for StructuralViolation {}

/// One stack entry: unsettled magnitude from a single tick.
struct OpenEntry {
    index: i32,
    sign: bool,
    remaining: u128,
}

/// Recovers the closed liquidity intervals of `pool` from its sorted tick
/// deltas.
///
/// Output is sorted by `(lower_index, upper_index, liquidity)` and every
/// interval satisfies `lower_index < upper_index` and `liquidity > 0`. The
/// result is a pure function of the input; re-running it cannot change the
/// answer.
pub fn reconstruct_intervals(
    pool: &PoolId,
    ticks: &[LiquidityTick],
) -> Result<Vec<LiquidityInterval>, StructuralViolation> {
    let violation = |kind| StructuralViolation { pool: pool.clone(), kind };

    let mut stack: Vec<OpenEntry> = Vec::new();
    let mut intervals: Vec<LiquidityInterval> = Vec::new();
    let mut prev_index: Option<i32> = None;

    for tick in ticks {
        if let Some(prev) = prev_index {
            if tick.index <= prev {
                return Err(violation(ViolationKind::OutOfOrder {
                    index: tick.index,
                    prev_index: prev,
                }));
            }
        }
        prev_index = Some(tick.index);

        if tick.liquidity_change == 0 {
            return Err(violation(ViolationKind::ZeroMagnitude { index: tick.index }));
        }

        if tick.sign || stack.is_empty() {
            // Openers always push. A closer with nothing to settle parks on
            // the stack so the end-of-walk check reports it.
            stack.push(OpenEntry {
                index: tick.index,
                sign: tick.sign,
                remaining: tick.liquidity_change,
            });
            continue;
        }

        let mut remaining = tick.liquidity_change;
        while remaining > 0 {
            let Some(top) = stack.last_mut() else {
                stack.push(OpenEntry { index: tick.index, sign: tick.sign, remaining });
                break;
            };
            if !top.sign {
                return Err(violation(ViolationKind::ClosingAgainstClosing {
                    index: tick.index,
                    stacked_index: top.index,
                }));
            }
            if remaining >= top.remaining {
                intervals.push(LiquidityInterval::new(top.index, tick.index, top.remaining));
                remaining -= top.remaining;
                stack.pop();
            } else {
                intervals.push(LiquidityInterval::new(top.index, tick.index, remaining));
                top.remaining -= remaining;
                remaining = 0;
            }
        }
    }

    if let Some(first) = stack.first() {
        return Err(violation(ViolationKind::UnmatchedTicks {
            count: stack.len(),
            first_index: first.index,
        }));
    }

    intervals.sort();
    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> PoolId {
        PoolId::new("pool-test")
    }

    #[test]
    fn empty_input_yields_no_intervals() {
        let intervals = reconstruct_intervals(&pool(), &[]).unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn exact_pair_becomes_one_interval() {
        let ticks = [LiquidityTick::open(-10, 1_000), LiquidityTick::close(10, 1_000)];
        let intervals = reconstruct_intervals(&pool(), &ticks).unwrap();
        assert_eq!(intervals, vec![LiquidityInterval::new(-10, 10, 1_000)]);
    }

    #[test]
    fn nested_opens_settle_innermost_first() {
        let ticks = [
            LiquidityTick::open(-100, 500),
            LiquidityTick::open(-50, 300),
            LiquidityTick::close(50, 300),
            LiquidityTick::close(100, 500),
        ];
        let intervals = reconstruct_intervals(&pool(), &ticks).unwrap();
        assert_eq!(
            intervals,
            vec![
                LiquidityInterval::new(-100, 100, 500),
                LiquidityInterval::new(-50, 50, 300),
            ]
        );
    }

    #[test]
    fn small_closer_splits_the_open_entry() {
        let ticks = [
            LiquidityTick::open(0, 1_000),
            LiquidityTick::close(10, 400),
            LiquidityTick::close(20, 600),
        ];
        let intervals = reconstruct_intervals(&pool(), &ticks).unwrap();
        assert_eq!(
            intervals,
            vec![
                LiquidityInterval::new(0, 10, 400),
                LiquidityInterval::new(0, 20, 600),
            ]
        );
    }

    #[test]
    fn large_closer_drains_multiple_opens() {
        let ticks = [
            LiquidityTick::open(0, 400),
            LiquidityTick::open(5, 600),
            LiquidityTick::close(10, 1_000),
        ];
        let intervals = reconstruct_intervals(&pool(), &ticks).unwrap();
        assert_eq!(
            intervals,
            vec![
                LiquidityInterval::new(0, 10, 400),
                LiquidityInterval::new(5, 10, 600),
            ]
        );
    }

    #[test]
    fn unmatched_opener_is_structural() {
        let ticks = [LiquidityTick::open(-10, 1_000)];
        let err = reconstruct_intervals(&pool(), &ticks).unwrap_err();
        assert_eq!(err.pool, pool());
        assert_eq!(err.kind, ViolationKind::UnmatchedTicks { count: 1, first_index: -10 });
    }

    #[test]
    fn lone_closer_is_structural() {
        let ticks = [LiquidityTick::close(7, 1_000)];
        let err = reconstruct_intervals(&pool(), &ticks).unwrap_err();
        assert_eq!(err.kind, ViolationKind::UnmatchedTicks { count: 1, first_index: 7 });
    }

    #[test]
    fn closer_surplus_parks_and_reports() {
        // 400 of the 1000 settles; the leftover 600 has nothing to match.
        let ticks = [LiquidityTick::open(0, 400), LiquidityTick::close(10, 1_000)];
        let err = reconstruct_intervals(&pool(), &ticks).unwrap_err();
        assert_eq!(err.kind, ViolationKind::UnmatchedTicks { count: 1, first_index: 10 });
    }

    #[test]
    fn closer_meeting_parked_closer_is_structural() {
        let ticks = [LiquidityTick::close(0, 100), LiquidityTick::close(10, 100)];
        let err = reconstruct_intervals(&pool(), &ticks).unwrap_err();
        assert_eq!(
            err.kind,
            ViolationKind::ClosingAgainstClosing { index: 10, stacked_index: 0 }
        );
    }

    #[test]
    fn out_of_order_input_is_structural() {
        let ticks = [LiquidityTick::open(10, 100), LiquidityTick::close(-10, 100)];
        let err = reconstruct_intervals(&pool(), &ticks).unwrap_err();
        assert_eq!(err.kind, ViolationKind::OutOfOrder { index: -10, prev_index: 10 });
    }

    #[test]
    fn duplicate_index_is_structural() {
        let ticks = [LiquidityTick::open(5, 100), LiquidityTick::close(5, 100)];
        let err = reconstruct_intervals(&pool(), &ticks).unwrap_err();
        assert_eq!(err.kind, ViolationKind::OutOfOrder { index: 5, prev_index: 5 });
    }

    #[test]
    fn zero_magnitude_is_structural() {
        let ticks = [LiquidityTick::open(-10, 1_000), LiquidityTick::open(0, 0)];
        let err = reconstruct_intervals(&pool(), &ticks).unwrap_err();
        assert_eq!(err.kind, ViolationKind::ZeroMagnitude { index: 0 });
    }

    #[test]
    fn violation_display_names_the_pool() {
        let err = reconstruct_intervals(&PoolId::new("pool-77"), &[LiquidityTick::open(1, 5)])
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("pool-77"), "message was: {msg}");
        assert!(msg.contains("unmatched"), "message was: {msg}");
    }

    #[test]
    fn reconstruction_is_deterministic() {
        let ticks = [
            LiquidityTick::open(-20, 100),
            LiquidityTick::open(-10, 200),
            LiquidityTick::close(10, 150),
            LiquidityTick::close(20, 150),
        ];
        let a = reconstruct_intervals(&pool(), &ticks).unwrap();
        let b = reconstruct_intervals(&pool(), &ticks).unwrap();
        assert_eq!(a, b);
        // Sorted by lower bound, then upper.
        assert_eq!(
            a,
            vec![
                LiquidityInterval::new(-20, 20, 100),
                LiquidityInterval::new(-10, 10, 150),
                LiquidityInterval::new(-10, 20, 50),
            ]
        );
    }
}
