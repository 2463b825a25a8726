use ahash::AHashMap as HashMap;
use cluster_access_core::{AccessSource, RuleKey, RuleShape, RuleSpec};
use std::collections::{hash_map::Entry, BTreeSet};
use tracing::trace;

/// Accumulates the rules produced by a single synthesis.
///
/// Rules are held in an arena. `merged` indexes the entries that accept additional sources by
/// their shape; `inserted` indexes single-source entries by shape and source. Keys that land on
/// the same entry are folded: the entry keeps the least of them, which names the rule.
#[derive(Debug, Default)]
pub(crate) struct RuleTable {
    entries: Vec<Rule>,
    merged: HashMap<RuleShape, usize>,
    inserted: HashMap<(RuleShape, AccessSource), usize>,
}

#[derive(Debug)]
struct Rule {
    key: RuleKey,
    sources: BTreeSet<AccessSource>,
}

// === impl RuleTable ===

impl RuleTable {
    /// Adds `source` to the rule with the same shape as `key`, creating the rule if it doesn't
    /// exist.
    pub(crate) fn merge(&mut self, key: RuleKey, source: AccessSource) {
        match self.merged.entry(key.shape()) {
            Entry::Occupied(entry) => {
                let rule = &mut self.entries[*entry.get()];
                trace!(rule = %rule.key.name(&rule.sources), %source, "Merging source");
                rule.fold(key);
                rule.sources.insert(source);
            }
            Entry::Vacant(entry) => {
                trace!(rule = %key.name([&source]), "Adding rule");
                entry.insert(self.entries.len());
                self.entries.push(Rule::new(key, source));
            }
        }
    }

    /// Adds a rule with a single source.
    ///
    /// A source that is already inserted for the same shape is dropped rather than treated as a
    /// conflict: access lists may repeat an entry and a group may be resolved more than once, and
    /// neither should produce a second rule.
    pub(crate) fn insert(&mut self, key: RuleKey, source: AccessSource) {
        match self.inserted.entry((key.shape(), source)) {
            Entry::Occupied(entry) => {
                let rule = &mut self.entries[*entry.get()];
                trace!(rule = %rule.key.name(&rule.sources), "Rule already exists");
                rule.fold(key);
            }
            Entry::Vacant(entry) => {
                let source = entry.key().1.clone();
                trace!(rule = %key.name([&source]), "Adding rule");
                entry.insert(self.entries.len());
                self.entries.push(Rule::new(key, source));
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Produces the table's rules in canonical order.
    pub(crate) fn into_rules(self) -> Vec<RuleSpec> {
        let mut rules = self
            .entries
            .into_iter()
            .map(|Rule { key, sources }| (key, sources))
            .collect::<Vec<_>>();
        rules.sort();
        rules
            .into_iter()
            .map(|(key, sources)| RuleSpec::new(key, sources))
            .collect()
    }
}

// === impl Rule ===

impl Rule {
    fn new(key: RuleKey, source: AccessSource) -> Self {
        Self {
            key,
            sources: Some(source).into_iter().collect(),
        }
    }

    /// Keeps the least key so that the rule's name doesn't depend on the order of insertion.
    fn fold(&mut self, key: RuleKey) {
        if key < self.key {
            self.key = key;
        }
    }
}
