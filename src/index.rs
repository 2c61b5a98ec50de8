//! Time-bounded alias tables and the immutable `ReferenceData` snapshot
//! shared by every worker.
//!
//! All tables are built once at start-up and never mutated afterwards;
//! workers hold a shared reference and read without locking. The inverted
//! alias map (alias → member ids) is the densest structure — millions of
//! generated permutations — so it is built in parallel with rayon.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::distance::within_distance_two;
use crate::member::{Member, Office, OfficeHolding};
use crate::normalize::Normalizer;
use crate::rules::Disambiguator;

/// Materialized lower bound for alias rows with no start date.
pub fn search_window_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1700, 1, 1).expect("valid date")
}

/// Materialized upper bound for alias rows with no end date. The corpus
/// ends in 1910, so open-ended rows are capped there.
pub fn search_window_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(1910, 1, 1).expect("valid date")
}

/// One row of a time-bounded alias table. `member_id` may be unknown, in
/// which case the alias resolves to itself as an opaque key.
#[derive(Debug, Clone)]
pub struct AliasRow {
    pub member_id: Option<i64>,
    pub alias: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub real_name: Option<String>,
}

impl AliasRow {
    /// Search windows are half-open: `start ≤ d < end`.
    pub fn window_contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// A named collection of alias rows supporting the two query modes of the
/// cascade: containment and bounded-fuzzy.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    pub name: String,
    pub rows: Vec<AliasRow>,
}

impl AliasTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose alias contains `key` as a substring and whose search
    /// window contains `date`.
    pub fn containment(&self, key: &str, date: NaiveDate) -> Vec<&AliasRow> {
        if key.is_empty() {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter(|r| r.window_contains(date) && r.alias.contains(key))
            .collect()
    }

    /// Rows whose alias is within Levenshtein distance two of `key`
    /// (spaces ignored) and whose search window contains `date`.
    pub fn fuzzy(&self, key: &str, date: NaiveDate) -> Vec<&AliasRow> {
        if key.is_empty() {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter(|r| r.window_contains(date) && within_distance_two(key, &r.alias, false))
            .collect()
    }
}

/// Everything the matcher cascade reads: the member catalog, every alias
/// index, the correction and rule tables. Constructed once by the loader,
/// immutable for the rest of the run.
#[derive(Debug)]
pub struct ReferenceData {
    pub members: HashMap<i64, Member>,
    /// Inverted full-alias map: normalized alias → member ids.
    pub alias_map: HashMap<String, Vec<i64>>,
    /// Inverted edit-distance-alias map, queried by the fuzzy
    /// name-permutation stage.
    pub edit_distance_map: HashMap<String, Vec<i64>>,
    pub peerage_titles: AliasTable,
    pub name_aliases: AliasTable,
    pub honorary_titles: AliasTable,
    /// Optional historic-hansard crawl table; may be empty.
    pub hansard_titles: AliasTable,
    pub offices: BTreeMap<i64, Office>,
    /// Office-position tables keyed by the position's normalized alias.
    pub office_positions: BTreeMap<String, AliasTable>,
    pub holdings: Vec<OfficeHolding>,
    /// Debate-id hard overrides from out-of-band analysis.
    pub inferences: HashMap<i64, i64>,
    /// Normalized strings that must never be resolved.
    pub ignored: HashSet<String>,
    pub normalizer: Normalizer,
    pub disambiguator: Disambiguator,
    /// Process start date; the "still alive" sentinel for missing dods.
    pub today: NaiveDate,
}

/// Loader output prior to index inversion.
pub struct ReferenceParts {
    pub members: Vec<Member>,
    /// Parenthetical aliases declared in the members file, already
    /// normalized: `(alias, member_id)`.
    pub defined_aliases: Vec<(String, i64)>,
    pub peerage_titles: AliasTable,
    pub name_aliases: AliasTable,
    pub honorary_titles: AliasTable,
    pub hansard_titles: AliasTable,
    pub offices: BTreeMap<i64, Office>,
    pub office_positions: BTreeMap<String, AliasTable>,
    pub holdings: Vec<OfficeHolding>,
    pub inferences: HashMap<i64, i64>,
    pub ignored: HashSet<String>,
    pub normalizer: Normalizer,
    pub disambiguator: Disambiguator,
    pub today: NaiveDate,
}

impl ReferenceData {
    /// Invert the per-member alias sets into the lookup maps and freeze the
    /// snapshot.
    pub fn assemble(parts: ReferenceParts) -> Self {
        let ReferenceParts {
            members,
            defined_aliases,
            peerage_titles,
            name_aliases,
            honorary_titles,
            hansard_titles,
            offices,
            office_positions,
            holdings,
            inferences,
            ignored,
            normalizer,
            disambiguator,
            today,
        } = parts;

        let full_pairs: Vec<(String, i64)> = members
            .par_iter()
            .flat_map_iter(|m| m.aliases.iter().cloned().map(move |a| (a, m.id)))
            .collect();
        let edit_pairs: Vec<(String, i64)> = members
            .par_iter()
            .flat_map_iter(|m| m.edit_aliases.iter().cloned().map(move |a| (a, m.id)))
            .collect();

        let mut alias_map: HashMap<String, Vec<i64>> = HashMap::with_capacity(full_pairs.len());
        for (alias, id) in full_pairs.into_iter().chain(defined_aliases) {
            alias_map.entry(alias).or_default().push(id);
        }
        let mut edit_distance_map: HashMap<String, Vec<i64>> =
            HashMap::with_capacity(edit_pairs.len());
        for (alias, id) in edit_pairs {
            edit_distance_map.entry(alias).or_default().push(id);
        }
        for ids in alias_map.values_mut().chain(edit_distance_map.values_mut()) {
            ids.sort_unstable();
            ids.dedup();
        }

        let members: HashMap<i64, Member> = members.into_iter().map(|m| (m.id, m)).collect();

        Self {
            members,
            alias_map,
            edit_distance_map,
            peerage_titles,
            name_aliases,
            honorary_titles,
            hansard_titles,
            offices,
            office_positions,
            holdings,
            inferences,
            ignored,
            normalizer,
            disambiguator,
            today,
        }
    }

    pub fn is_known_alias(&self, key: &str) -> bool {
        self.alias_map.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(alias: &str, id: Option<i64>, start: NaiveDate, end: NaiveDate) -> AliasRow {
        AliasRow {
            member_id: id,
            alias: alias.to_string(),
            start,
            end,
            real_name: None,
        }
    }

    #[test]
    fn containment_requires_window_and_substring() {
        let mut table = AliasTable::new("peerage");
        table.rows.push(row(
            "viscount palmerston",
            Some(7),
            date(1840, 1, 1),
            date(1866, 1, 1),
        ));

        assert_eq!(table.containment("palmerston", date(1850, 6, 1)).len(), 1);
        assert_eq!(table.containment("viscount palmerston", date(1850, 6, 1)).len(), 1);
        // Query not a substring of the alias.
        assert!(table.containment("palmerstone", date(1850, 6, 1)).is_empty());
        // Outside the window.
        assert!(table.containment("palmerston", date(1839, 12, 31)).is_empty());
        // The end bound is open.
        assert!(table.containment("palmerston", date(1866, 1, 1)).is_empty());
        // Last day inside.
        assert_eq!(table.containment("palmerston", date(1865, 12, 31)).len(), 1);
    }

    #[test]
    fn fuzzy_ignores_spaces() {
        let mut table = AliasTable::new("peerage");
        table.rows.push(row(
            "lord derby",
            Some(3),
            date(1800, 1, 1),
            date(1900, 1, 1),
        ));
        assert_eq!(table.fuzzy("lordderby", date(1850, 1, 1)).len(), 1);
        assert_eq!(table.fuzzy("lord derbyy", date(1850, 1, 1)).len(), 1);
        assert!(table.fuzzy("lord salisbury", date(1850, 1, 1)).is_empty());
    }

    #[test]
    fn alias_closure_over_assembled_map() {
        let members = vec![
            Member::new(1, "John Smith", "John", "Smith", date(1800, 1, 1), date(1880, 1, 1))
                .unwrap(),
            Member::new(2, "James Brown", "James", "Brown", date(1810, 1, 1), date(1890, 1, 1))
                .unwrap(),
        ];
        let expected: Vec<(i64, Vec<String>)> = members
            .iter()
            .map(|m| (m.id, m.aliases.iter().cloned().collect()))
            .collect();

        let data = ReferenceData::assemble(ReferenceParts {
            members,
            defined_aliases: vec![("the member for finsbury".into(), 1)],
            peerage_titles: AliasTable::new("peerage"),
            name_aliases: AliasTable::new("aliases"),
            honorary_titles: AliasTable::new("honorary"),
            hansard_titles: AliasTable::new("hansard"),
            offices: BTreeMap::new(),
            office_positions: BTreeMap::new(),
            holdings: Vec::new(),
            inferences: HashMap::new(),
            ignored: HashSet::new(),
            normalizer: Normalizer::default(),
            disambiguator: Disambiguator::default(),
            today: date(1910, 1, 1),
        });

        for (id, aliases) in expected {
            for alias in aliases {
                let ids = data.alias_map.get(&alias).unwrap_or_else(|| {
                    panic!("alias {alias:?} missing from map");
                });
                assert!(ids.contains(&id), "{alias:?} does not point at {id}");
            }
        }
        assert_eq!(
            data.alias_map.get("the member for finsbury"),
            Some(&vec![1])
        );
    }
}
