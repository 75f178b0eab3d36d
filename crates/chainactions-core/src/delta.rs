//! Insertion-ordered net-delta accumulation.
//!
//! Classification picks extremes (`most negative` / `most positive`) out of
//! a per-asset delta map, so iteration order must be deterministic: entries
//! keep the position of their first `add`, and extremum scans use strict
//! comparison so the first-seen entry wins ties.

use indexmap::IndexMap;

/// Addition that clamps at the numeric bounds instead of overflowing.
///
/// Accumulation must never panic: a log can legally carry any `uint256`
/// amount, so repeated adds clamp rather than wrap.
pub trait SaturatingAdd: Copy {
    fn saturating_add(self, rhs: Self) -> Self;
}

impl SaturatingAdd for i64 {
    fn saturating_add(self, rhs: Self) -> Self {
        i64::saturating_add(self, rhs)
    }
}

impl SaturatingAdd for i128 {
    fn saturating_add(self, rhs: Self) -> Self {
        i128::saturating_add(self, rhs)
    }
}

impl SaturatingAdd for f64 {
    // floats saturate to infinity on their own
    fn saturating_add(self, rhs: Self) -> Self {
        self + rhs
    }
}

impl SaturatingAdd for alloy_primitives::I256 {
    fn saturating_add(self, rhs: Self) -> Self {
        alloy_primitives::I256::saturating_add(self, rhs)
    }
}

/// A signed per-asset delta map with insertion-order iteration.
///
/// `V` is the delta representation: `I256` raw units on EVM, `f64`
/// ui-amounts on Solana. Positive = the acting account received, negative =
/// it sent.
#[derive(Debug, Clone, Default)]
pub struct DeltaMap<V> {
    inner: IndexMap<String, V>,
}

impl<V> DeltaMap<V>
where
    V: Copy + Default + PartialOrd + SaturatingAdd,
{
    pub fn new() -> Self {
        Self { inner: IndexMap::new() }
    }

    /// Accumulate a delta for `key`, clamping at the numeric bounds. The
    /// first `add` fixes the key's iteration position.
    pub fn add(&mut self, key: &str, delta: V) {
        let entry = self.inner.entry(key.to_string()).or_default();
        *entry = entry.saturating_add(delta);
    }

    /// Set a delta outright, appending the key if new.
    pub fn insert(&mut self, key: &str, value: V) {
        self.inner.insert(key.to_string(), value);
    }

    /// Remove a key, returning its accumulated delta if present.
    /// Remaining entries keep their relative order.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.inner.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).copied()
    }

    /// Drop entries failing the predicate, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, V) -> bool) {
        self.inner.retain(|k, v| keep(k, *v));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, V)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Partition into (strictly negative, strictly positive) entry lists,
    /// both in insertion order. Zero deltas fall in neither.
    pub fn split_signed(&self) -> (Vec<(String, V)>, Vec<(String, V)>) {
        let zero = V::default();
        let mut negative = Vec::new();
        let mut positive = Vec::new();
        for (key, value) in &self.inner {
            if *value < zero {
                negative.push((key.clone(), *value));
            } else if *value > zero {
                positive.push((key.clone(), *value));
            }
        }
        (negative, positive)
    }
}

/// The entry with the smallest delta. Strict `<` scan: the first-seen entry
/// wins ties.
pub fn most_negative<V: Copy + PartialOrd>(entries: &[(String, V)]) -> Option<&(String, V)> {
    let mut best: Option<&(String, V)> = None;
    for entry in entries {
        match best {
            Some((_, value)) if !(entry.1 < *value) => {}
            _ => best = Some(entry),
        }
    }
    best
}

/// The entry with the largest delta. Strict `>` scan: the first-seen entry
/// wins ties.
pub fn most_positive<V: Copy + PartialOrd>(entries: &[(String, V)]) -> Option<&(String, V)> {
    let mut best: Option<&(String, V)> = None;
    for entry in entries {
        match best {
            Some((_, value)) if !(entry.1 > *value) => {}
            _ => best = Some(entry),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates() {
        let mut deltas: DeltaMap<i64> = DeltaMap::new();
        deltas.add("a", -100);
        deltas.add("a", 30);
        assert_eq!(deltas.get("a"), Some(-70));
        assert_eq!(deltas.len(), 1);
    }

    #[test]
    fn add_saturates_at_numeric_bounds() {
        let mut deltas: DeltaMap<i64> = DeltaMap::new();
        deltas.add("up", i64::MAX);
        deltas.add("up", i64::MAX);
        assert_eq!(deltas.get("up"), Some(i64::MAX));

        deltas.add("down", i64::MIN);
        deltas.add("down", -1);
        assert_eq!(deltas.get("down"), Some(i64::MIN));
    }

    #[test]
    fn iteration_keeps_insertion_order() {
        let mut deltas: DeltaMap<i64> = DeltaMap::new();
        deltas.add("c", 1);
        deltas.add("a", 2);
        deltas.add("b", 3);
        deltas.add("a", 1); // re-add must not move "a"
        let keys: Vec<_> = deltas.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn split_signed_excludes_zero() {
        let mut deltas: DeltaMap<i64> = DeltaMap::new();
        deltas.add("sent", -5);
        deltas.add("noop", 7);
        deltas.add("noop", -7);
        deltas.add("recv", 9);
        let (negative, positive) = deltas.split_signed();
        assert_eq!(negative, vec![("sent".to_string(), -5)]);
        assert_eq!(positive, vec![("recv".to_string(), 9)]);
    }

    #[test]
    fn extremum_first_seen_wins_ties() {
        let entries = vec![
            ("first".to_string(), -10i64),
            ("second".to_string(), -10),
            ("third".to_string(), -3),
        ];
        assert_eq!(most_negative(&entries).unwrap().0, "first");

        let entries = vec![
            ("first".to_string(), 4i64),
            ("second".to_string(), 9),
            ("third".to_string(), 9),
        ];
        assert_eq!(most_positive(&entries).unwrap().0, "second");
    }

    #[test]
    fn extremum_empty_is_none() {
        let entries: Vec<(String, i64)> = vec![];
        assert!(most_negative(&entries).is_none());
        assert!(most_positive(&entries).is_none());
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut deltas: DeltaMap<i64> = DeltaMap::new();
        deltas.add("a", 1);
        deltas.add("b", 2);
        deltas.add("c", 3);
        assert_eq!(deltas.remove("b"), Some(2));
        let keys: Vec<_> = deltas.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn works_with_floats() {
        let mut deltas: DeltaMap<f64> = DeltaMap::new();
        deltas.add("usdc", -100.0);
        deltas.add("bonk", 50_000.0);
        deltas.retain(|_, v| v.abs() > 1e-6);
        let (negative, positive) = deltas.split_signed();
        assert_eq!(negative[0].0, "usdc");
        assert_eq!(positive[0].0, "bonk");
    }
}
