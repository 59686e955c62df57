//! Match results and their union / intersection combination.

use crate::domain::ids::{PatternId, PortId, SignalId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// One captured `(signal, port)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capture {
    pub signal: SignalId,
    pub port: Option<PortId>,
}

/// Ordered captures recorded under one label.
pub type Group = Vec<Capture>;

/// A satisfied pattern with its accumulated score and named groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub pattern: PatternId,
    pub score: u32,
    pub groups: BTreeMap<String, Group>,
}

impl Match {
    pub fn new(pattern: PatternId, score: u32) -> Self {
        Self {
            pattern,
            score,
            groups: BTreeMap::new(),
        }
    }

    pub fn group(&self, label: &str) -> Option<&[Capture]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    pub fn append(&mut self, label: &str, capture: Capture) {
        self.groups.entry(label.to_string()).or_default().push(capture);
    }

    fn absorb_groups(&mut self, other: Match) {
        for (label, captures) in other.groups {
            self.groups.entry(label).or_default().extend(captures);
        }
    }
}

/// Matches keyed by pattern id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchCollection {
    matches: BTreeMap<PatternId, Match>,
}

impl MatchCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn contains(&self, pattern: &PatternId) -> bool {
        self.matches.contains_key(pattern)
    }

    pub fn get(&self, pattern: &PatternId) -> Option<&Match> {
        self.matches.get(pattern)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    pub fn pattern_ids(&self) -> impl Iterator<Item = &PatternId> {
        self.matches.keys()
    }

    /// Insert `m`, folding it into an existing match with the same pattern id.
    ///
    /// On collision the groups concatenate and the higher score wins.
    pub fn insert(&mut self, m: Match) {
        match self.matches.entry(m.pattern.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(m);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                existing.score = existing.score.max(m.score);
                existing.absorb_groups(m);
            }
        }
    }

    /// Add a fresh match for `pattern` unless one is already present.
    pub fn add_if_absent(&mut self, pattern: &PatternId, score: u32) {
        if !self.matches.contains_key(pattern) {
            self.matches.insert(pattern.clone(), Match::new(pattern.clone(), score));
        }
    }

    /// Append `capture` to `label` on the match for `pattern`, if there is one.
    pub fn append_capture(&mut self, pattern: &PatternId, label: &str, capture: Capture) {
        if let Some(m) = self.matches.get_mut(pattern) {
            m.append(label, capture);
        }
    }

    pub fn add_score(&mut self, score: u32) {
        for m in self.matches.values_mut() {
            m.score += score;
        }
    }

    /// Highest-scoring match; ties resolve to the smallest pattern id.
    pub fn best(&self) -> Option<&Match> {
        self.matches
            .values()
            .fold(None, |best: Option<&Match>, m| match best {
                Some(b) if b.score >= m.score => Some(b),
                _ => Some(m),
            })
    }

    pub fn into_best(mut self) -> Option<Match> {
        let id = self.best()?.pattern.clone();
        self.matches.remove(&id)
    }

    pub fn into_matches(self) -> Vec<Match> {
        self.matches.into_values().collect()
    }

    /// Every pattern id found in any operand.
    pub fn combine_union(parts: impl IntoIterator<Item = MatchCollection>) -> Self {
        let mut result = Self::new();
        for part in parts {
            for m in part.matches.into_values() {
                result.insert(m);
            }
        }
        result
    }

    /// Only pattern ids found in every operand; scores add up and groups concatenate.
    ///
    /// No operands yield an empty collection.
    pub fn combine_intersect(parts: impl IntoIterator<Item = MatchCollection>) -> Self {
        let mut parts = parts.into_iter();
        let Some(mut result) = parts.next() else {
            return Self::new();
        };
        for mut part in parts {
            result.matches.retain(|id, _| part.matches.contains_key(id));
            for (id, m) in result.matches.iter_mut() {
                if let Some(other) = part.matches.remove(id) {
                    m.score += other.score;
                    m.absorb_groups(other);
                }
            }
            if result.is_empty() {
                break;
            }
        }
        result
    }
}

impl FromIterator<Match> for MatchCollection {
    fn from_iter<T: IntoIterator<Item = Match>>(iter: T) -> Self {
        let mut collection = Self::new();
        for m in iter {
            collection.insert(m);
        }
        collection
    }
}

impl IntoIterator for MatchCollection {
    type Item = Match;
    type IntoIter = std::collections::btree_map::IntoValues<PatternId, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::InstanceId;

    fn capture(n: u64) -> Capture {
        Capture {
            signal: SignalId(InstanceId(n)),
            port: None,
        }
    }

    fn collection(entries: &[(&str, u32)]) -> MatchCollection {
        entries
            .iter()
            .map(|(id, score)| {
                let mut m = Match::new(PatternId::from(*id), *score);
                m.append("x", capture(u64::from(*score)));
                m
            })
            .collect()
    }

    #[test]
    fn test_union_keeps_all_ids_and_merges_groups() {
        let union = MatchCollection::combine_union([
            collection(&[("a", 1), ("b", 2)]),
            collection(&[("b", 5), ("c", 3)]),
        ]);
        let ids: Vec<_> = union.pattern_ids().map(PatternId::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let b = union.get(&PatternId::from("b")).unwrap();
        assert_eq!(b.score, 5);
        assert_eq!(b.group("x"), Some(&[capture(2), capture(5)][..]));
    }

    #[test]
    fn test_intersection_keeps_shared_ids_only() {
        let both = MatchCollection::combine_intersect([
            collection(&[("a", 1), ("b", 2)]),
            collection(&[("b", 5), ("c", 3)]),
        ]);
        assert_eq!(both.len(), 1);
        let b = both.get(&PatternId::from("b")).unwrap();
        assert_eq!(b.score, 7);
        assert_eq!(b.group("x").map(<[Capture]>::len), Some(2));
    }

    #[test]
    fn test_intersection_of_nothing_is_empty() {
        assert!(MatchCollection::combine_intersect(Vec::new()).is_empty());
    }

    #[test]
    fn test_add_if_absent_does_not_overwrite() {
        let mut matches = collection(&[("a", 4)]);
        matches.add_if_absent(&PatternId::from("a"), 1);
        matches.add_if_absent(&PatternId::from("b"), 1);
        assert_eq!(matches.get(&PatternId::from("a")).map(|m| m.score), Some(4));
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_best_prefers_highest_score() {
        let matches = collection(&[("a", 1), ("b", 3), ("c", 3)]);
        assert_eq!(matches.best().map(|m| m.pattern.as_str()), Some("b"));
    }
}
