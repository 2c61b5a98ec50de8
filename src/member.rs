//! Member catalog types: parsed members with their generated alias sets,
//! office terms and life dates, plus offices and office holdings.
//!
//! Alias generation is the dense part. For every member the catalog
//! materializes two families from the normalized
//! `(titles, first, middles, last)` decomposition:
//!
//! - the *full* family — `{titles ∪ ∅} × {∅, initial, first}` crossed with
//!   every middle-name rendering (each middle independently omitted,
//!   initialed, or spelled out) and every surname possibility;
//! - the *edit-distance* family — `{titles ∪ ∅} × {∅, first} × last`, a much
//!   smaller set used as keys for the fuzzy name-permutation index.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::normalize::cleanse;

/// A member failed name validation at load time and is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The first name does not appear as a whole token of the full name.
    #[error("first name is not a token of the full name")]
    FirstNameMissing,
    /// The last name does not appear as a whole token of the full name.
    #[error("last name is not a token of the full name")]
    LastNameMissing,
}

/// Half-open interval of office service. `contains(d) ≡ start ≤ d < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeTerm {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl OfficeTerm {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// A parliamentary member with generated alias sets.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub dob: NaiveDate,
    pub dod: NaiveDate,
    pub titles: Vec<String>,
    pub middle_names: Vec<String>,
    pub aliases: HashSet<String>,
    pub edit_aliases: HashSet<String>,
    pub terms: Vec<OfficeTerm>,
}

impl Member {
    /// Build a member from its raw name fields, generating both alias
    /// families. Fails when the first or last name is not a whole token of
    /// the full name.
    pub fn new(
        id: i64,
        full_name: &str,
        first_name: &str,
        last_name: &str,
        dob: NaiveDate,
        dod: NaiveDate,
    ) -> Result<Self, NameError> {
        let first_name = cleanse(first_name);
        let last_name = cleanse(last_name);
        let full_name = cleanse(full_name);

        let tokens: Vec<&str> = full_name.split(' ').filter(|t| !t.is_empty()).collect();

        let fn_index = tokens
            .iter()
            .position(|t| *t == first_name)
            .ok_or(NameError::FirstNameMissing)?;
        let ln_index = tokens
            .iter()
            .position(|t| *t == last_name)
            .ok_or(NameError::LastNameMissing)?;

        let mut titles: Vec<String> = tokens[..fn_index].iter().map(|t| t.to_string()).collect();
        if !titles.iter().any(|t| t == "mr") {
            titles.push("mr".to_string());
        }

        let middle_names: Vec<String> = if ln_index > fn_index {
            tokens[fn_index + 1..ln_index]
                .iter()
                .map(|t| t.to_string())
                .collect()
        } else {
            Vec::new()
        };

        let surnames = surname_possibilities(&last_name);
        let middles = middle_possibilities(&middle_names);

        let mut aliases = HashSet::new();
        let mut edit_aliases = HashSet::new();
        let initial = first_name.chars().next().map(String::from).unwrap_or_default();

        for surname in &surnames {
            for title in titles.iter().map(String::as_str).chain([""]) {
                for first in ["", initial.as_str(), first_name.as_str()] {
                    for middle in &middles {
                        aliases.insert(join_name(&[title, first, middle.as_str(), surname.as_str()]));
                    }
                }
                for first in ["", first_name.as_str()] {
                    edit_aliases.insert(join_name(&[title, first, surname.as_str()]));
                }
            }
        }

        Ok(Self {
            id,
            first_name,
            last_name,
            full_name,
            dob,
            dod,
            titles,
            middle_names,
            aliases,
            edit_aliases,
            terms: Vec::new(),
        })
    }

    /// Life window plus alias membership; `key` must already be normalized.
    pub fn matches(&self, key: &str, speechdate: NaiveDate) -> bool {
        self.life_window_contains(speechdate) && self.aliases.contains(key)
    }

    /// `dob ≤ d ≤ dod` (inclusive on both ends).
    pub fn life_window_contains(&self, date: NaiveDate) -> bool {
        self.dob <= date && date <= self.dod
    }

    pub fn is_in_office(&self, speechdate: NaiveDate) -> bool {
        self.terms.iter().any(|t| t.contains(speechdate))
    }

    /// Whole years elapsed since birth at `speechdate`; zero when the date
    /// precedes the date of birth.
    pub fn age_at(&self, speechdate: NaiveDate) -> u32 {
        speechdate.years_since(self.dob).unwrap_or(0)
    }
}

/// Join name parts with single spaces, skipping empties.
fn join_name(parts: &[&str]) -> String {
    let mut out = String::new();
    for p in parts {
        if p.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(p);
    }
    out
}

/// Renderings of a hyphenated surname: the full form plus, for each hyphen,
/// a variant with that hyphen replaced by a space
/// (`smith-abney-hastings` → `smith abney-hastings`, `smith-abney hastings`).
pub fn surname_possibilities(last_name: &str) -> Vec<String> {
    let mut out = vec![last_name.to_string()];
    for (i, c) in last_name.char_indices() {
        if c == '-' {
            let mut variant = last_name.to_string();
            variant.replace_range(i..i + 1, " ");
            out.push(variant);
        }
    }
    out
}

/// Every rendering of the middle names: each middle name independently
/// omitted, reduced to its initial, or spelled in full.
fn middle_possibilities(middle_names: &[String]) -> Vec<String> {
    let mut acc: Vec<String> = vec![String::new()];
    for middle in middle_names.iter().rev() {
        let initial = middle.chars().next().map(String::from).unwrap_or_default();
        let mut next = Vec::with_capacity(acc.len() * 3);
        for rest in &acc {
            next.push(rest.clone());
            next.push(join_name(&[initial.as_str(), rest.as_str()]));
            next.push(join_name(&[middle.as_str(), rest.as_str()]));
        }
        acc = next;
    }
    acc.sort();
    acc.dedup();
    acc
}

// ---------------------------------------------------------------------------
// Offices
// ---------------------------------------------------------------------------

const OFFICE_STOPWORDS: [&str; 3] = ["of", "the", "to"];

/// A named office with its generated word-subset alias set: every ordered
/// subsequence of the name's words that keeps each non-stopword and
/// optionally drops each stopword.
#[derive(Debug, Clone)]
pub struct Office {
    pub id: i64,
    pub name: String,
    pub aliases: HashSet<String>,
}

impl Office {
    pub fn new(id: i64, name: &str) -> Self {
        let cleansed = cleanse(name);
        let words: Vec<&str> = cleansed.split(' ').filter(|w| !w.is_empty()).collect();

        let mut acc: Vec<String> = vec![String::new()];
        for &word in words.iter().rev() {
            let mut next = Vec::with_capacity(acc.len() * 2);
            let stopword = OFFICE_STOPWORDS.contains(&word);
            for rest in &acc {
                if stopword {
                    next.push(rest.clone());
                }
                next.push(join_name(&[word, rest.as_str()]));
            }
            acc = next;
        }

        let aliases = acc.into_iter().filter(|a| !a.is_empty()).collect();
        Self {
            id,
            name: name.to_string(),
            aliases,
        }
    }

    /// Exact membership of a normalized key in the alias set.
    pub fn matches(&self, key: &str) -> bool {
        self.aliases.contains(key)
    }
}

/// Assertion that `member_id` held `office_id` during the search window
/// `[start, end)`. Stored by id; lookups go through the catalog maps.
#[derive(Debug, Clone, Copy)]
pub struct OfficeHolding {
    pub member_id: i64,
    pub office_id: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl OfficeHolding {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member(full: &str, first: &str, last: &str) -> Member {
        Member::new(1, full, first, last, date(1800, 1, 1), date(1900, 12, 31)).unwrap()
    }

    #[test]
    fn simple_name_aliases() {
        let m = member("John Smith", "John", "Smith");
        assert_eq!(m.titles, vec!["mr"]);
        assert!(m.middle_names.is_empty());

        let when = date(1855, 1, 1);
        for alias in ["john smith", "j smith", "smith", "mr smith", "mr john smith"] {
            assert!(m.matches(alias, when), "missing alias {alias:?}");
        }
        for not_alias in ["jj smith", "johnsmith", "john", "j", ""] {
            assert!(!m.matches(not_alias, when), "unexpected alias {not_alias:?}");
        }
    }

    #[test]
    fn life_window_bounds_matching() {
        let m = member("John Smith", "John", "Smith");
        assert!(!m.matches("john smith", date(1799, 12, 31)));
        assert!(m.matches("john smith", date(1800, 1, 1)));
        assert!(m.matches("john smith", date(1900, 12, 31)));
        assert!(!m.matches("john smith", date(1901, 1, 1)));
    }

    #[test]
    fn middle_name_renderings() {
        let m = member("John Doe Smith", "John", "Smith");
        assert_eq!(m.middle_names, vec!["doe"]);

        let when = date(1850, 6, 1);
        for alias in ["j smith", "j d smith", "doe smith", "john doe smith"] {
            assert!(m.matches(alias, when), "missing alias {alias:?}");
        }
        assert!(!m.matches("john doe", when));
        assert!(!m.matches("jd smith", when));
    }

    #[test]
    fn multiple_middles_expand_independently() {
        let m = member("John Jim Joe Doe Smith", "John", "Smith");
        let when = date(1850, 6, 1);
        for alias in [
            "john jim joe doe smith",
            "doe smith",
            "jim smith",
            "john j j d smith",
            "j j j d smith",
            "j d smith",
            "smith",
        ] {
            assert!(m.matches(alias, when), "missing alias {alias:?}");
        }
        assert!(!m.matches("john jim", when));
        assert!(!m.matches("jjjd smith", when));
    }

    #[test]
    fn titles_are_taken_from_the_full_name_prefix() {
        let m = member("Sir Robert Peel", "Robert", "Peel");
        assert_eq!(m.titles, vec!["sir", "mr"]);
        let when = date(1850, 6, 1);
        assert!(m.matches("sir robert peel", when));
        assert!(m.matches("sir peel", when));
        assert!(m.matches("mr peel", when));
    }

    #[test]
    fn name_validation_errors() {
        let err = Member::new(
            1,
            "John Smith",
            "George",
            "Smith",
            date(1800, 1, 1),
            date(1900, 1, 1),
        )
        .unwrap_err();
        assert_eq!(err, NameError::FirstNameMissing);

        let err = Member::new(
            1,
            "John Smith",
            "John",
            "Jones",
            date(1800, 1, 1),
            date(1900, 1, 1),
        )
        .unwrap_err();
        assert_eq!(err, NameError::LastNameMissing);
    }

    #[test]
    fn hyphenated_surname_possibilities() {
        let p = surname_possibilities("smith-abney-hastings");
        assert!(p.contains(&"smith-abney-hastings".to_string()));
        assert!(p.contains(&"smith abney-hastings".to_string()));
        assert!(p.contains(&"smith-abney hastings".to_string()));

        let m = member("Charles Smith-Abney-Hastings", "Charles", "Smith-Abney-Hastings");
        let when = date(1850, 6, 1);
        assert!(m.matches("smith abney-hastings", when));
        assert!(m.matches("c smith-abney-hastings", when));
    }

    #[test]
    fn edit_distance_family_is_smaller() {
        let m = member("John Jim Joe Doe Smith", "John", "Smith");
        assert!(m.edit_aliases.len() < m.aliases.len());
        assert!(m.edit_aliases.contains("john smith"));
        assert!(m.edit_aliases.contains("mr smith"));
        assert!(m.edit_aliases.contains("smith"));
        assert!(!m.edit_aliases.contains("j smith"));
    }

    #[test]
    fn office_subset_aliases() {
        let office = Office::new(1, "Lord of the Treasury");
        for alias in [
            "lord of the treasury",
            "lord of treasury",
            "lord the treasury",
            "lord treasury",
        ] {
            assert!(office.matches(alias), "missing office alias {alias:?}");
        }
        for not_alias in ["treasury", "of the", "lord of", "of the treasury"] {
            assert!(!office.matches(not_alias), "unexpected office alias {not_alias:?}");
        }
    }

    #[test]
    fn office_term_half_open() {
        let term = OfficeTerm {
            start: date(1850, 1, 1),
            end: date(1855, 1, 1),
        };
        assert!(term.contains(date(1850, 1, 1)));
        assert!(term.contains(date(1854, 12, 31)));
        assert!(!term.contains(date(1855, 1, 1)));
    }

    #[test]
    fn age_at_counts_whole_years() {
        let m = member("John Smith", "John", "Smith");
        assert_eq!(m.age_at(date(1820, 1, 1)), 20);
        assert_eq!(m.age_at(date(1819, 12, 31)), 19);
        assert_eq!(m.age_at(date(1799, 1, 1)), 0);
    }
}
