//! 1D interval store: non-overlapping `[start, end]` ranges along one axis, each
//! carrying a value, with a store-wide default for the gaps.
//!
//! Entries live in a `BTreeMap` keyed by their start. Because entries never overlap,
//! the only entry that can contain a given index is the last one starting at or
//! before it, which keeps point lookups and range splits at O(log n).

use std::collections::BTreeMap;

use gridstore_common::{Interval, shift_index};

use crate::restore::{Range1DOp, Range1DRestoreData};

#[derive(Debug, Clone, PartialEq)]
struct Span<T> {
    end: u32,
    value: T,
}

#[derive(Debug, Clone)]
pub struct Range1DStore<T> {
    spans: BTreeMap<u32, Span<T>>,
    default_value: T,
}

impl<T: Clone + Default> Default for Range1DStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone> Range1DStore<T> {
    pub fn new(default_value: T) -> Self {
        Self {
            spans: BTreeMap::new(),
            default_value,
        }
    }

    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Number of explicit ranges.
    #[inline]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    #[inline]
    pub fn get(&self, index: u32) -> &T {
        self.try_get(index).unwrap_or(&self.default_value)
    }

    pub fn try_get(&self, index: u32) -> Option<&T> {
        let (_, span) = self.spans.range(..=index).next_back()?;
        (span.end >= index).then_some(&span.value)
    }

    /// Explicit ranges in ascending order.
    pub fn ranges(&self) -> impl Iterator<Item = (u32, u32, &T)> + '_ {
        self.spans
            .iter()
            .map(|(&start, span)| (start, span.end, &span.value))
    }

    /// Explicit ranges starting at or after `start`, in ascending order.
    pub fn ranges_from(&self, start: u32) -> impl Iterator<Item = (u32, u32, &T)> + '_ {
        self.spans
            .range(start..)
            .map(|(&start, span)| (start, span.end, &span.value))
    }

    /// Explicit ranges intersecting `[start, end]`, unclipped.
    pub fn overlapping(&self, start: u32, end: u32) -> Vec<(u32, u32, &T)> {
        let iv = Interval::new(start, end);
        self.overlapping_keys(iv)
            .into_iter()
            .filter_map(|key| self.spans.get(&key).map(|span| (key, span.end, &span.value)))
            .collect()
    }

    /// Keys of every range intersecting `iv`, ascending.
    fn overlapping_keys(&self, iv: Interval) -> Vec<u32> {
        let mut keys = Vec::new();
        if let Some((&key, span)) = self.spans.range(..iv.start()).next_back()
            && span.end >= iv.start()
        {
            keys.push(key);
        }
        keys.extend(self.spans.range(iv.start()..=iv.end()).map(|(&key, _)| key));
        keys
    }
}

impl<T: Clone + PartialEq> Range1DStore<T> {
    /// Overwrite `[start, end]` with `value`, splitting any range crossing its edges.
    ///
    /// Neighbours carrying an equal value are merged into the new range, so the
    /// explicit ranges always form the minimal partition.
    pub fn set(&mut self, start: u32, end: u32, value: T) -> Range1DRestoreData<T> {
        let iv = Interval::new(start, end);
        let mut restore = Range1DRestoreData::default();
        let previous = self.take_range(iv);
        self.spans.insert(iv.start(), Span { end: iv.end(), value });
        self.join_around(iv);
        restore.record_overwritten(iv.start(), iv.end(), previous);
        restore
    }

    pub fn batch_set<I>(&mut self, items: I) -> Range1DRestoreData<T>
    where
        I: IntoIterator<Item = (u32, u32, T)>,
    {
        let mut restore = Range1DRestoreData::default();
        for (start, end, value) in items {
            restore.merge(self.set(start, end, value));
        }
        restore
    }

    /// Drop explicit values in `[start, end]` without shifting anything.
    pub fn clear(&mut self, start: u32, end: u32) -> Range1DRestoreData<T> {
        let iv = Interval::new(start, end);
        let mut restore = Range1DRestoreData::default();
        let previous = self.take_range(iv);
        if !previous.is_empty() {
            restore.record_overwritten(iv.start(), iv.end(), previous);
        }
        restore
    }

    /// Remove `[start, end]` and pull everything after it back by its length.
    pub fn cut(&mut self, start: u32, end: u32) -> Range1DRestoreData<T> {
        let iv = Interval::new(start, end);
        let len = i64::try_from(iv.len()).unwrap_or(i64::MAX);
        let mut restore = Range1DRestoreData::default();

        let previous = self.take_range(iv);
        if !previous.is_empty() {
            restore.record_overwritten(iv.start(), iv.end(), previous);
        }
        if let Some(after) = iv.end().checked_add(1) {
            self.shift_from(after, -len);
        }
        self.join_at(iv.start());
        restore.record_shift(iv.start(), -len);
        restore
    }

    /// Open a gap of `count` default-valued indices at `index`.
    ///
    /// Parts of ranges pushed past [`Interval::MAX_FINITE`] are dropped; the
    /// restore-data brings them back.
    pub fn insert_at(&mut self, index: u32, count: u32) -> Range1DRestoreData<T> {
        let mut restore = Range1DRestoreData::default();
        if count == 0 {
            return restore;
        }
        let lost = self.open_gap(index, count);
        // Recorded ahead of the shift so undo puts them back in old coordinates.
        for (start, end, value) in lost {
            restore.record_overwritten(start, end, vec![(start, end, value)]);
        }
        restore.record_shift(index, i64::from(count));
        restore
    }

    /// Undo the changes described by `data`.
    pub fn restore(&mut self, data: Range1DRestoreData<T>) {
        for op in data.ops.into_iter().rev() {
            match op {
                Range1DOp::Overwritten {
                    start,
                    end,
                    previous,
                } => {
                    let iv = Interval::new(start, end);
                    self.take_range(iv);
                    let starts: Vec<u32> = previous.iter().map(|&(s, _, _)| s).collect();
                    for (s, e, value) in previous {
                        self.spans.insert(s, Span { end: e, value });
                    }
                    for s in starts {
                        self.join_at(s);
                    }
                    self.join_around(iv);
                }
                Range1DOp::Shift { index, delta } => {
                    let count = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);
                    if delta > 0 {
                        let gap = Interval::new(index, index.saturating_add(count - 1));
                        self.take_range(gap);
                        if let Some(after) = gap.end().checked_add(1) {
                            self.shift_from(after, -delta);
                        }
                        self.join_at(index);
                    } else {
                        self.open_gap(index, count);
                    }
                }
            }
        }
    }

    /// Remove everything inside `iv`, keeping the parts of crossing ranges that lie
    /// outside it. Returns the removed pieces clipped to `iv`.
    fn take_range(&mut self, iv: Interval) -> Vec<(u32, u32, T)> {
        let mut removed = Vec::new();
        for key in self.overlapping_keys(iv) {
            let Some(span) = self.spans.remove(&key) else {
                continue;
            };
            if key < iv.start() {
                self.spans.insert(
                    key,
                    Span {
                        end: iv.start() - 1,
                        value: span.value.clone(),
                    },
                );
            }
            if span.end > iv.end() {
                self.spans.insert(
                    iv.end() + 1,
                    Span {
                        end: span.end,
                        value: span.value.clone(),
                    },
                );
            }
            removed.push((key.max(iv.start()), span.end.min(iv.end()), span.value));
        }
        removed
    }

    /// Merge the range starting at `index` into the one ending at `index - 1` when
    /// both carry equal values.
    fn join_at(&mut self, index: u32) {
        let Some((&prev_start, prev)) = self.spans.range(..index).next_back() else {
            return;
        };
        let Some(next) = self.spans.get(&index) else {
            return;
        };
        if prev.end.checked_add(1) != Some(index) || prev.value != next.value {
            return;
        }
        let end = next.end;
        self.spans.remove(&index);
        if let Some(prev) = self.spans.get_mut(&prev_start) {
            prev.end = end;
        }
    }

    fn join_around(&mut self, iv: Interval) {
        self.join_at(iv.start());
        if let Some(after) = iv.end().checked_add(1) {
            self.join_at(after);
        }
    }

    /// Split a range crossing `index` and push everything at/after `index` forward.
    /// Returns what was pushed off the end of the axis.
    fn open_gap(&mut self, index: u32, count: u32) -> Vec<(u32, u32, T)> {
        if let Some((&key, span)) = self.spans.range(..index).next_back()
            && span.end >= index
        {
            let tail = Span {
                end: span.end,
                value: span.value.clone(),
            };
            if let Some(head) = self.spans.get_mut(&key) {
                head.end = index - 1;
            }
            self.spans.insert(index, tail);
        }
        self.shift_from(index, i64::from(count))
    }

    /// Move every range starting at or after `from` by `delta`.
    ///
    /// Finite ranges pushed past `MAX_FINITE` are truncated or dropped, and the lost
    /// pieces are returned in their old coordinates. Moving back never loses anything;
    /// callers guarantee the destination is empty.
    fn shift_from(&mut self, from: u32, delta: i64) -> Vec<(u32, u32, T)> {
        let last = i64::from(Interval::MAX_FINITE);
        let mut lost = Vec::new();
        for (start, span) in self.spans.split_off(&from) {
            if i64::from(start) + delta > last {
                lost.push((start, span.end, span.value));
                continue;
            }
            let end = if span.end == Interval::UNBOUNDED {
                Interval::UNBOUNDED
            } else if i64::from(span.end) + delta > last {
                let first_lost = shift_index(Interval::MAX_FINITE, -delta) + 1;
                lost.push((first_lost, span.end, span.value.clone()));
                Interval::MAX_FINITE
            } else {
                shift_index(span.end, delta)
            };
            self.spans.insert(
                shift_index(start, delta),
                Span {
                    end,
                    value: span.value,
                },
            );
        }
        lost
    }
}
