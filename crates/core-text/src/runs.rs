//! Per-attribute style runs.
//!
//! Each `AttributeKey` owns a sorted vector of non-overlapping runs. Adjacent
//! runs with equal values are merged after every mutation so that equal
//! documents always have identical run lists (undo dedup relies on this).
//!
//! Text edits are mirrored here:
//! * `insert_gap` opens a hole of `n` characters at an offset. A run that
//!   strictly contains the offset is split around the hole; inserted text is
//!   unstyled until the caller applies attributes to it.
//! * `remove_span` collapses `[start, end)`. Runs are truncated or shifted;
//!   runs entirely inside the span disappear.

use crate::attributes::{AttributeKey, AttributeSet, AttributeValue};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Run {
    pub start: usize,
    pub len: usize,
    pub value: AttributeValue,
}

impl Run {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RunList {
    runs: BTreeMap<AttributeKey, Vec<Run>>,
}

impl RunList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Runs for one key, ordered by start offset.
    pub fn runs(&self, key: AttributeKey) -> &[Run] {
        self.runs.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttributeKey, &Run)> {
        self.runs
            .iter()
            .flat_map(|(k, runs)| runs.iter().map(move |r| (*k, r)))
    }

    /// Largest run end across all keys (0 when empty).
    pub fn max_end(&self) -> usize {
        self.iter().map(|(_, r)| r.end()).max().unwrap_or(0)
    }

    pub fn value_at(&self, key: AttributeKey, index: usize) -> Option<&AttributeValue> {
        self.runs(key)
            .iter()
            .find(|r| r.start <= index && index < r.end())
            .map(|r| &r.value)
    }

    pub fn attributes_at(&self, index: usize) -> AttributeSet {
        self.runs
            .keys()
            .filter_map(|k| self.value_at(*k, index).map(|v| (*k, v.clone())))
            .collect()
    }

    /// Assign `value` to `key` over `[start, end)`, replacing whatever the key
    /// held there.
    pub fn set(&mut self, key: AttributeKey, value: AttributeValue, start: usize, end: usize) {
        if start >= end {
            return;
        }
        self.clear(key, start, end);
        let runs = self.runs.entry(key).or_default();
        let idx = runs.partition_point(|r| r.start < start);
        runs.insert(
            idx,
            Run {
                start,
                len: end - start,
                value,
            },
        );
        Self::merge_adjacent(runs);
    }

    /// Remove `key` from `[start, end)`, splitting runs that straddle the bounds.
    pub fn clear(&mut self, key: AttributeKey, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let Some(runs) = self.runs.get_mut(&key) else {
            return;
        };
        let mut out = Vec::with_capacity(runs.len() + 1);
        for run in runs.drain(..) {
            if run.end() <= start || run.start >= end {
                out.push(run);
                continue;
            }
            if run.start < start {
                out.push(Run {
                    start: run.start,
                    len: start - run.start,
                    value: run.value.clone(),
                });
            }
            if run.end() > end {
                out.push(Run {
                    start: end,
                    len: run.end() - end,
                    value: run.value,
                });
            }
        }
        if out.is_empty() {
            self.runs.remove(&key);
        } else {
            *runs = out;
        }
    }

    /// Shift runs for `n` characters inserted at `at`.
    pub fn insert_gap(&mut self, at: usize, n: usize) {
        if n == 0 {
            return;
        }
        for runs in self.runs.values_mut() {
            let mut out = Vec::with_capacity(runs.len() + 1);
            for mut run in runs.drain(..) {
                if run.start >= at {
                    run.start += n;
                    out.push(run);
                } else if run.end() > at {
                    let tail = run.end() - at;
                    out.push(Run {
                        start: run.start,
                        len: at - run.start,
                        value: run.value.clone(),
                    });
                    out.push(Run {
                        start: at + n,
                        len: tail,
                        value: run.value,
                    });
                } else {
                    out.push(run);
                }
            }
            *runs = out;
        }
    }

    /// Collapse `[start, end)` out of every run.
    pub fn remove_span(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let n = end - start;
        let map = |x: usize| {
            if x <= start {
                x
            } else if x >= end {
                x - n
            } else {
                start
            }
        };
        self.runs.retain(|_, runs| {
            let mut out = Vec::with_capacity(runs.len());
            for run in runs.drain(..) {
                let s = map(run.start);
                let e = map(run.end());
                if e > s {
                    out.push(Run {
                        start: s,
                        len: e - s,
                        value: run.value,
                    });
                }
            }
            Self::merge_adjacent(&mut out);
            *runs = out;
            !runs.is_empty()
        });
    }

    fn merge_adjacent(runs: &mut Vec<Run>) {
        let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
        for run in runs.drain(..) {
            if let Some(last) = merged.last_mut()
                && last.end() == run.start
                && last.value == run.value
            {
                last.len += run.len;
                continue;
            }
            merged.push(run);
        }
        *runs = merged;
    }
}
