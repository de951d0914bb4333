//! Symbol intervals backing set and range transitions.
//!
//! Symbols are plain `u32` values: token types in a parser machine,
//! Unicode code points in a lexer machine. An [`IntervalSet`] keeps its
//! intervals sorted and coalesced, so two sets covering the same symbols
//! always compare equal and print the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive range of symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub lo: u32,
    pub hi: u32,
}

impl Interval {
    /// Inclusive interval from `lo` to `hi`. Requires `lo <= hi`.
    pub fn new(lo: u32, hi: u32) -> Self {
        debug_assert!(lo <= hi);
        Self { lo, hi }
    }

    /// Interval holding a single symbol.
    pub fn point(symbol: u32) -> Self {
        Self { lo: symbol, hi: symbol }
    }

    pub fn contains(&self, symbol: u32) -> bool {
        self.lo <= symbol && symbol <= self.hi
    }

    /// Number of symbols covered.
    pub fn len(&self) -> u64 {
        u64::from(self.hi) - u64::from(self.lo) + 1
    }

    /// True when the two intervals overlap or sit side by side, so their
    /// union is still a single interval.
    fn touches(&self, other: &Interval) -> bool {
        u64::from(self.lo) <= u64::from(other.hi) + 1 && u64::from(other.lo) <= u64::from(self.hi) + 1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lo == self.hi {
            write!(f, "{}", self.lo)
        } else {
            write!(f, "{}-{}", self.lo, self.hi)
        }
    }
}

/// Sorted, coalesced set of inclusive symbol intervals.
///
/// Insertion merges overlapping and adjacent intervals, so the internal
/// representation is canonical: `add(1, 3)` followed by `add(4, 6)` holds
/// one interval `1-6`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding the single symbol `symbol`.
    pub fn point(symbol: u32) -> Self {
        let mut set = Self::new();
        set.add_symbol(symbol);
        set
    }

    /// Set built from `(lo, hi)` pairs. Pairs may arrive in any order.
    pub fn from_pairs(pairs: &[(u32, u32)]) -> Self {
        let mut set = Self::new();
        for &(lo, hi) in pairs {
            set.add(lo, hi);
        }
        set
    }

    /// Add the inclusive range `lo..=hi`, merging with existing intervals.
    pub fn add(&mut self, lo: u32, hi: u32) {
        debug_assert!(lo <= hi);
        let mut merged = Interval::new(lo, hi);
        let mut kept = Vec::with_capacity(self.intervals.len() + 1);
        for &iv in &self.intervals {
            if iv.touches(&merged) {
                merged.lo = merged.lo.min(iv.lo);
                merged.hi = merged.hi.max(iv.hi);
            } else {
                kept.push(iv);
            }
        }
        kept.push(merged);
        kept.sort_by_key(|iv| iv.lo);
        self.intervals = kept;
    }

    pub fn add_symbol(&mut self, symbol: u32) {
        self.add(symbol, symbol);
    }

    /// Merge all intervals of `other` into `self`.
    pub fn union(&mut self, other: &IntervalSet) {
        for iv in &other.intervals {
            self.add(iv.lo, iv.hi);
        }
    }

    pub fn contains(&self, symbol: u32) -> bool {
        self.intervals
            .binary_search_by(|iv| {
                if symbol < iv.lo {
                    std::cmp::Ordering::Greater
                } else if symbol > iv.hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Complement of this set within the alphabet `0..=max_symbol`.
    /// Intervals beyond `max_symbol` are ignored.
    pub fn complement(&self, max_symbol: u32) -> IntervalSet {
        let mut out = IntervalSet::new();
        let mut next = 0u64;
        for iv in &self.intervals {
            if u64::from(iv.lo) > next {
                let gap_hi = iv.lo - 1;
                if next <= u64::from(max_symbol) {
                    out.add(next as u32, gap_hi.min(max_symbol));
                }
            }
            next = next.max(u64::from(iv.hi) + 1);
        }
        if next <= u64::from(max_symbol) {
            out.add(next as u32, max_symbol);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of symbols covered across all intervals.
    pub fn symbol_count(&self) -> u64 {
        self.intervals.iter().map(Interval::len).sum()
    }

    /// Number of distinct intervals in canonical form.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Interval> + '_ {
        self.intervals.iter().copied()
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{iv}")?;
        }
        write!(f, "}}")
    }
}
