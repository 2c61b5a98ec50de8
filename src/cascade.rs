//! The matcher cascade: the fixed ordered sequence of resolution stages
//! that turns a canonical search key plus context into a resolution,
//! ambiguity, miss, or ignore.
//!
//! Stage order is authoritative. Exact lookups come first, fuzzy lookups
//! only run when no exact stage produced anything, and once a stage marks
//! ambiguity only the downstream disambiguation stages (debate override,
//! office-tenure pruning, curated rules) may resolve it.
//!
//! A `Resolver` is per-worker state: it wraps the shared immutable
//! [`ReferenceData`] with caches for matches, ambiguities, and misses
//! keyed on the canonical key plus its context, and an ignore cache keyed
//! on the key alone. Caches are never shared or merged; the underlying
//! tables are deterministic, so every worker computes the same outcome
//! for the same row.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::distance::{within_distance_four, within_distance_two};
use crate::index::{AliasRow, ReferenceData};
use crate::model::House;
use crate::rules::RuleContext;

/// Strings at or beyond this length never trip the ignore heuristic; some
/// speaker column values contain whole debate text.
const IGNORE_MAX_LEN: usize = 35;

/// Keywords that mark a generic, unresolvable reference.
const IGNORE_KEYWORDS: &[&str] = &[
    "member",
    "membee",
    "membek",
    "evicted tenant",
    "voice",
    "british statesman",
    "bishop",
    "archbishop",
    "this parliament",
];

/// Prefixes that mark speakers outside the member catalog.
const IGNORE_PREFIXES: &[&str] = &["mrs ", "miss ", "a ", "an "];

/// Built-in ignore heuristic over a normalized key.
pub fn is_ignored_heuristic(key: &str) -> bool {
    if key.len() >= IGNORE_MAX_LEN {
        return false;
    }
    IGNORE_KEYWORDS.iter().any(|kw| key.contains(kw))
        || IGNORE_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// What a resolution points at: a catalog member, or an alias-table row
/// with no corresponding member, which resolves to its own text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Candidate {
    Member(i64),
    Opaque(String),
}

impl Candidate {
    fn render(&self) -> String {
        match self {
            Candidate::Member(id) => id.to_string(),
            Candidate::Opaque(alias) => alias.clone(),
        }
    }
}

/// Annotation produced for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    /// Member id, pipe-joined candidates, or empty.
    pub suggested_speaker: String,
    pub ambiguous: bool,
    pub fuzzy_matched: bool,
    pub ignored: bool,
}

impl RowOutcome {
    fn miss() -> Self {
        Self {
            suggested_speaker: String::new(),
            ambiguous: false,
            fuzzy_matched: false,
            ignored: false,
        }
    }

    fn ignored() -> Self {
        Self {
            ignored: true,
            ..Self::miss()
        }
    }
}

/// Cache key for context-dependent outcomes. House and debate id are part
/// of the key because the debate-override and curated-rule stages read
/// them; without them two rows with the same key and date but different
/// houses would clobber each other's outcome.
type CacheKey = (String, NaiveDate, House, i64);

/// Per-worker resolver: shared reference data plus private caches.
pub struct Resolver<'a> {
    data: &'a ReferenceData,
    match_cache: HashMap<CacheKey, (Candidate, bool)>,
    ambig_cache: HashMap<CacheKey, Vec<Candidate>>,
    miss_cache: HashSet<CacheKey>,
    ignored_cache: HashSet<String>,
}

/// Result of running the stages for one key.
struct Resolution {
    matched: Option<Candidate>,
    fuzzy: bool,
    ambiguous: bool,
    candidates: Vec<Candidate>,
}

/// What a single table stage produced.
enum StageHit {
    Nothing,
    Unique(Candidate),
    Ambiguous(Vec<Candidate>),
}

/// Dedup rows into candidates and classify. A lone row with no member id
/// only resolves when the stage accepts opaque aliases (the fuzzy peerage
/// stage does; exact stages pass it over).
fn resolve_rows(rows: &[&AliasRow], resolve_opaque: bool) -> StageHit {
    let mut candidates: Vec<Candidate> = Vec::new();
    for row in rows {
        let c = match row.member_id {
            Some(id) => Candidate::Member(id),
            None => Candidate::Opaque(row.alias.clone()),
        };
        if !candidates.contains(&c) {
            candidates.push(c);
        }
    }
    match candidates.len() {
        0 => StageHit::Nothing,
        1 => {
            let only = candidates.remove(0);
            match only {
                Candidate::Member(_) => StageHit::Unique(only),
                Candidate::Opaque(_) if resolve_opaque => StageHit::Unique(only),
                Candidate::Opaque(_) => StageHit::Nothing,
            }
        }
        _ => StageHit::Ambiguous(candidates),
    }
}

static INITIAL_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-z]\b").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"  +").unwrap());

/// Drop single-letter tokens (initials) before the name-permutation stage;
/// keeping them would only manufacture ambiguities.
fn strip_initials(key: &str) -> String {
    let stripped = INITIAL_TOKEN.replace_all(key, "");
    MULTI_SPACE.replace_all(&stripped, " ").trim().to_string()
}

impl<'a> Resolver<'a> {
    pub fn new(data: &'a ReferenceData) -> Self {
        Self {
            data,
            match_cache: HashMap::new(),
            ambig_cache: HashMap::new(),
            miss_cache: HashSet::new(),
            ignored_cache: HashSet::new(),
        }
    }

    /// Normalize a raw speaker string to its canonical search key.
    pub fn canonical_key(&self, raw: &str) -> String {
        self.data
            .normalizer
            .canonical_key(raw, |s| self.data.is_known_alias(s))
    }

    /// Resolve one row.
    pub fn resolve(
        &mut self,
        raw_speaker: &str,
        speechdate: NaiveDate,
        house: House,
        debate_id: i64,
    ) -> RowOutcome {
        let key = self.canonical_key(raw_speaker);

        if self.ignored_cache.contains(&key) {
            return RowOutcome::ignored();
        }
        let cache_key = (key.clone(), speechdate, house, debate_id);
        if self.miss_cache.contains(&cache_key) {
            return RowOutcome::miss();
        }
        if let Some(candidates) = self.ambig_cache.get(&cache_key) {
            return ambiguous_outcome(candidates);
        }
        if let Some((candidate, fuzzy)) = self.match_cache.get(&cache_key) {
            return RowOutcome {
                suggested_speaker: candidate.render(),
                ambiguous: false,
                fuzzy_matched: *fuzzy,
                ignored: false,
            };
        }

        if is_ignored_heuristic(&key) || self.data.ignored.contains(&key) {
            self.ignored_cache.insert(key);
            return RowOutcome::ignored();
        }

        let resolution = self.run_stages(&key, speechdate, house, debate_id);

        if let Some(candidate) = resolution.matched {
            let outcome = RowOutcome {
                suggested_speaker: candidate.render(),
                ambiguous: false,
                fuzzy_matched: resolution.fuzzy,
                ignored: false,
            };
            self.match_cache.insert(cache_key, (candidate, resolution.fuzzy));
            outcome
        } else if resolution.ambiguous && !resolution.candidates.is_empty() {
            let mut candidates = resolution.candidates;
            sort_candidates(&mut candidates);
            let outcome = ambiguous_outcome(&candidates);
            self.ambig_cache.insert(cache_key, candidates);
            outcome
        } else {
            self.miss_cache.insert(cache_key);
            RowOutcome::miss()
        }
    }

    /// Stages 3–13 of the cascade, in order.
    fn run_stages(
        &self,
        key: &str,
        speechdate: NaiveDate,
        house: House,
        debate_id: i64,
    ) -> Resolution {
        let data = self.data;
        let mut res = Resolution {
            matched: None,
            fuzzy: false,
            ambiguous: false,
            candidates: Vec::new(),
        };

        // Peerage titles, then name aliases: containment with date window.
        for table in [&data.peerage_titles, &data.name_aliases] {
            if res.matched.is_some() || res.ambiguous {
                break;
            }
            match resolve_rows(&table.containment(key, speechdate), false) {
                StageHit::Unique(c) => res.matched = Some(c),
                StageHit::Ambiguous(c) => {
                    res.ambiguous = true;
                    res.candidates = c;
                }
                StageHit::Nothing => {}
            }
        }

        // Office positions / office holdings: find an office the key names,
        // then restrict its holdings to the date window.
        if res.matched.is_none() && !res.ambiguous {
            let office_id = data
                .offices
                .values()
                .find(|o| o.matches(key) || o.aliases.iter().any(|a| key.contains(a.as_str())))
                .map(|o| o.id);

            if let Some(office_id) = office_id {
                let holders: Vec<Candidate> = dedup_members(
                    data.holdings
                        .iter()
                        .filter(|h| h.office_id == office_id && h.contains(speechdate))
                        .map(|h| h.member_id),
                );
                match holders.len() {
                    0 => {}
                    1 => res.matched = holders.into_iter().next(),
                    _ => {
                        res.ambiguous = true;
                        res.candidates = holders;
                    }
                }
            } else if let Some((_, table)) = data
                .office_positions
                .iter()
                .find(|(position, _)| key.contains(position.as_str()))
            {
                let rows: Vec<&AliasRow> = table
                    .rows
                    .iter()
                    .filter(|r| r.window_contains(speechdate))
                    .collect();
                match resolve_rows(&rows, false) {
                    StageHit::Unique(c) => res.matched = Some(c),
                    StageHit::Ambiguous(c) => {
                        res.ambiguous = true;
                        res.candidates = c;
                    }
                    StageHit::Nothing => {}
                }
            }
        }

        // Office-holding scan by office alias: first time-valid holding
        // whose office matches the key exactly.
        if res.matched.is_none() && !res.ambiguous {
            for holding in &data.holdings {
                if holding.contains(speechdate)
                    && data
                        .offices
                        .get(&holding.office_id)
                        .is_some_and(|o| o.matches(key))
                {
                    res.matched = Some(Candidate::Member(holding.member_id));
                    break;
                }
            }
        }

        // Direct alias map, filtered by life window.
        if res.matched.is_none() && !res.ambiguous {
            if let Some(ids) = data.alias_map.get(key) {
                let alive: Vec<Candidate> = ids
                    .iter()
                    .filter(|id| {
                        data.members
                            .get(*id)
                            .is_some_and(|m| m.life_window_contains(speechdate))
                    })
                    .map(|id| Candidate::Member(*id))
                    .collect();
                if alive.len() == 1 {
                    res.matched = alive.into_iter().next();
                } else {
                    // Zero or several survivors: either way only the
                    // disambiguation stages below may settle it.
                    res.ambiguous = true;
                    res.candidates = alive;
                }
            }
        }

        // Fuzzy peerage titles.
        if res.matched.is_none() && !res.ambiguous {
            match resolve_rows(&data.peerage_titles.fuzzy(key, speechdate), true) {
                StageHit::Unique(c) => {
                    res.matched = Some(c);
                    res.fuzzy = true;
                }
                StageHit::Ambiguous(c) => {
                    res.ambiguous = true;
                    res.candidates = c;
                }
                StageHit::Nothing => {}
            }
        }

        // Fuzzy office holdings: offices within distance four of the key,
        // space-sensitive.
        if res.matched.is_none() && !res.ambiguous {
            let office_ids: Vec<i64> = data
                .offices
                .values()
                .filter(|o| {
                    o.aliases
                        .iter()
                        .any(|a| within_distance_four(a, key, true))
                })
                .map(|o| o.id)
                .collect();

            if !office_ids.is_empty() {
                let holders: Vec<Candidate> = dedup_members(
                    data.holdings
                        .iter()
                        .filter(|h| office_ids.contains(&h.office_id) && h.contains(speechdate))
                        .map(|h| h.member_id),
                );
                match holders.len() {
                    0 => {}
                    1 => {
                        res.matched = holders.into_iter().next();
                        res.fuzzy = true;
                    }
                    _ => {
                        res.ambiguous = true;
                        res.candidates = holders;
                    }
                }
            }
        }

        // Fuzzy name permutations over the edit-distance alias map, with
        // initials stripped and life windows enforced.
        if res.matched.is_none() && !res.ambiguous {
            let stripped = strip_initials(key);
            if !stripped.is_empty() {
                let mut ids: Vec<i64> = Vec::new();
                for (alias, members) in &data.edit_distance_map {
                    if within_distance_two(&stripped, alias, false) {
                        ids.extend(members.iter().filter(|id| {
                            data.members
                                .get(*id)
                                .is_some_and(|m| m.life_window_contains(speechdate))
                        }));
                    }
                }
                ids.sort_unstable();
                ids.dedup();
                match ids.len() {
                    0 => {}
                    1 => {
                        res.matched = Some(Candidate::Member(ids[0]));
                        res.fuzzy = true;
                    }
                    _ => {
                        res.ambiguous = true;
                        res.candidates = ids.into_iter().map(Candidate::Member).collect();
                    }
                }
            }
        }

        // Debate-id override.
        if res.matched.is_none() && res.ambiguous && !res.candidates.is_empty() {
            if let Some(member_id) = data.inferences.get(&debate_id) {
                let inferred = Candidate::Member(*member_id);
                if res.candidates.contains(&inferred) {
                    res.matched = Some(inferred);
                    res.ambiguous = false;
                    res.candidates.clear();
                }
            }
        }

        // Office-tenure pruning: keep members of plausible age who held an
        // office on the date. A filter that would empty the set carries no
        // information and is discarded.
        if res.matched.is_none() && res.ambiguous && !res.candidates.is_empty() {
            let pruned: Vec<Candidate> = res
                .candidates
                .iter()
                .filter(|c| match c {
                    Candidate::Member(id) => data.members.get(id).is_some_and(|m| {
                        m.age_at(speechdate) >= 20 && m.is_in_office(speechdate)
                    }),
                    Candidate::Opaque(_) => false,
                })
                .cloned()
                .collect();
            if pruned.len() == 1 {
                res.matched = pruned.into_iter().next();
                res.ambiguous = false;
                res.candidates.clear();
            } else if !pruned.is_empty() {
                res.candidates = pruned;
            }
        }

        // Curated disambiguation rules.
        if res.matched.is_none() && res.ambiguous {
            let ctx = RuleContext {
                speechdate,
                house,
                debate_id,
            };
            let resolved = if data.disambiguator.has_alias_rules(key) {
                data.disambiguator.resolve_by_alias(key, &ctx)
            } else {
                let member_ids: Vec<i64> = res
                    .candidates
                    .iter()
                    .filter_map(|c| match c {
                        Candidate::Member(id) => Some(*id),
                        Candidate::Opaque(_) => None,
                    })
                    .collect();
                data.disambiguator
                    .resolve_by_members(key, &member_ids, &data.members, &ctx)
            };
            if let Some(id) = resolved {
                res.matched = Some(Candidate::Member(id));
                res.ambiguous = false;
                res.candidates.clear();
            }
        }

        trace!(
            key,
            matched = res.matched.is_some(),
            ambiguous = res.ambiguous,
            fuzzy = res.fuzzy,
            "cascade complete"
        );
        res
    }
}

fn dedup_members(ids: impl Iterator<Item = i64>) -> Vec<Candidate> {
    let mut seen: Vec<i64> = ids.collect();
    seen.sort_unstable();
    seen.dedup();
    seen.into_iter().map(Candidate::Member).collect()
}

/// Member ids ascending, then opaque aliases lexicographically.
fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| match (a, b) {
        (Candidate::Member(x), Candidate::Member(y)) => x.cmp(y),
        (Candidate::Member(_), Candidate::Opaque(_)) => std::cmp::Ordering::Less,
        (Candidate::Opaque(_), Candidate::Member(_)) => std::cmp::Ordering::Greater,
        (Candidate::Opaque(x), Candidate::Opaque(y)) => x.cmp(y),
    });
}

fn ambiguous_outcome(candidates: &[Candidate]) -> RowOutcome {
    let rendered: Vec<String> = candidates.iter().map(Candidate::render).collect();
    RowOutcome {
        suggested_speaker: rendered.join("|"),
        ambiguous: true,
        fuzzy_matched: false,
        ignored: false,
    }
}
