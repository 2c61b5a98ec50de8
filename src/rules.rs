//! Hand-curated disambiguation rules.
//!
//! A [`Rule`] is a predicate over `(speechdate, house, debate_id)` built
//! from date, house, and debate atoms combined with and/or. Rules live in
//! two keyed maps:
//!
//! - `by_member`: member id → rule, used to filter an ambiguous candidate
//!   set (the member must also carry the queried alias);
//! - `by_alias`: normalized alias → the cluster of members that alias is
//!   known to collide on, used for direct resolution with no fallback.
//!
//! Both maps answer with a member id only when *exactly one* rule in play
//! evaluates true; zero or several survivors mean undecided.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

use crate::member::Member;
use crate::model::House;

/// Context a rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub speechdate: NaiveDate,
    pub house: House,
    pub debate_id: i64,
}

/// A disambiguation predicate.
#[derive(Debug, Clone)]
pub enum Rule {
    /// `speechdate < date`.
    Before(NaiveDate),
    /// `date < speechdate`.
    After(NaiveDate),
    /// `speechdate == date`.
    On(NaiveDate),
    /// `speechdate.year == year`.
    InYear(i32),
    /// Year range, inclusive or exclusive on both ends.
    WithinYears { from: i32, to: i32, inclusive: bool },
    /// The speech came from this house.
    InHouse(House),
    /// The speech belongs to one of these debates.
    InDebates(HashSet<i64>),
    /// Unconditional.
    Always,
    /// Every child holds.
    All(Vec<Rule>),
    /// At least one child holds.
    Any(Vec<Rule>),
}

impl Rule {
    pub fn eval(&self, ctx: &RuleContext) -> bool {
        match self {
            Rule::Before(date) => ctx.speechdate < *date,
            Rule::After(date) => *date < ctx.speechdate,
            Rule::On(date) => ctx.speechdate == *date,
            Rule::InYear(year) => ctx.speechdate.year() == *year,
            Rule::WithinYears { from, to, inclusive } => {
                let y = ctx.speechdate.year();
                if *inclusive {
                    *from <= y && y <= *to
                } else {
                    *from < y && y < *to
                }
            }
            Rule::InHouse(house) => ctx.house == *house,
            Rule::InDebates(set) => set.contains(&ctx.debate_id),
            Rule::Always => true,
            Rule::All(children) => children.iter().all(|r| r.eval(ctx)),
            Rule::Any(children) => children.iter().any(|r| r.eval(ctx)),
        }
    }

    pub fn and(self, other: Rule) -> Rule {
        match self {
            Rule::All(mut children) => {
                children.push(other);
                Rule::All(children)
            }
            first => Rule::All(vec![first, other]),
        }
    }

    pub fn or(self, other: Rule) -> Rule {
        match self {
            Rule::Any(mut children) => {
                children.push(other);
                Rule::Any(children)
            }
            first => Rule::Any(vec![first, other]),
        }
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid curated rule date")
}

fn before(year: i32) -> Rule {
    Rule::Before(ymd(year, 1, 1))
}

fn before_md(year: i32, month: u32, day: u32) -> Rule {
    Rule::Before(ymd(year, month, day))
}

fn after(year: i32) -> Rule {
    Rule::After(ymd(year, 1, 1))
}

fn after_md(year: i32, month: u32, day: u32) -> Rule {
    Rule::After(ymd(year, month, day))
}

fn year(y: i32) -> Rule {
    Rule::InYear(y)
}

fn within(from: i32, to: i32) -> Rule {
    Rule::WithinYears {
        from,
        to,
        inclusive: true,
    }
}

fn commons() -> Rule {
    Rule::InHouse(House::Commons)
}

fn lords() -> Rule {
    Rule::InHouse(House::Lords)
}

fn always() -> Rule {
    Rule::Always
}

/// The curated rule set, grouped by the colliding alias each cluster
/// disambiguates.
fn curated_groups() -> Vec<(&'static str, Vec<(i64, Rule)>)> {
    vec![
        ("mr macaulay", vec![(2572, always())]),
        ("mr bruce", vec![(4253, commons()), (6881, lords())]),
        ("mr odonnell", vec![(5521, before(1886)), (7973, after(1900))]),
        ("mr curzon", vec![(6317, always())]),
        ("mr buchanan", vec![(5854, always())]),
        ("mr lowe", vec![(4218, always())]),
        ("mr j lowther", vec![(4967, after(1865))]),
        ("mr ewart", vec![(2551, always())]),
        ("mr goulburn", vec![(1824, always())]),
        ("mr warburton", vec![(2880, before(1848))]),
        (
            "mr lyttelton",
            vec![(1492, before(1821)), (5231, after(1896))],
        ),
        (
            "mr mclaren",
            vec![(4853, before(1881)), (5830, after(1881))],
        ),
        (
            "mr liddell",
            vec![
                (8168, after(1903)),
                (2527, commons().and(before(1856)).or(lords())),
                (
                    4264,
                    commons().and(after(1856)).and(before_md(1873, 12, 31)),
                ),
            ],
        ),
        (
            "mr anderson",
            vec![(4295, after(1869).and(before_md(1884, 12, 31)))],
        ),
        (
            "mr napier",
            vec![
                (8189, after(1906).and(before_md(1901, 12, 31))),
                (4063, before_md(1856, 12, 31)),
            ],
        ),
        ("mr hunter", vec![(5922, always())]),
        (
            "mr hunt",
            vec![
                (2712, after(1831).and(before_md(1832, 12, 31))),
                (6106, after(1886).and(before_md(1892, 12, 31))),
            ],
        ),
        ("mr bright", vec![(3812, always())]),
        ("mr rees", vec![(8268, always())]),
        ("mr dalziel", vec![(7489, always())]),
        ("colonel sykes", vec![(4571, always())]),
        ("mr patrick obrien", vec![(6238, always())]),
        (
            "mr illingworth",
            vec![
                (5137, before_md(1892, 12, 31)),
                (8316, after_md(1908, 1, 1)),
            ],
        ),
        (
            "mr balfour",
            vec![
                (2523, after(1831).and(before(1832))),
                (5410, after(1874).and(before(1911))),
            ],
        ),
        (
            "mr wortley",
            vec![(3339, before_md(1859, 12, 31)), (5829, after(1889))],
        ),
        ("mr matthews", vec![(5100, always())]),
        (
            "mr stanley",
            vec![
                (1021, after_md(1810, 12, 31).and(before(1812))),
                (5863, after(1888).and(before_md(1906, 12, 31))),
                (7892, after(1906)),
                (2326, after(1821).and(before_md(1843, 12, 31))),
                (4079, after(1855).and(before_md(1864, 12, 31))),
            ],
        ),
        (
            "mr gregory",
            vec![(3783, before_md(1872, 12, 31)), (5210, after(1873))],
        ),
        ("mr c buller", vec![(2577, always())]),
        ("mr bernal", vec![(2072, always())]),
        ("mr henley", vec![(3716, always())]),
        (
            "mr hobhouse",
            vec![
                (3229, after(1819).and(before_md(1851, 12, 31))),
                (7539, after(1900)),
            ],
        ),
        ("mr healy", vec![(5804, always())]),
        (
            "mr shaw lefevre",
            vec![(1030, before(1820)), (4783, after(1880))],
        ),
        (
            "mr whitbread",
            vec![
                (7619, after(1906)),
                (624, after(1804).and(before_md(1815, 12, 31))),
                (2852, after(1818).and(before_md(1820, 12, 31))),
            ],
        ),
        ("mr canning", vec![(1114, before_md(1827, 12, 31))]),
        (
            "mr ward",
            vec![
                (8340, after(1900)),
                (758, after(1803).and(before_md(1823, 12, 31))),
                (2406, after(1826).and(before_md(1831, 12, 31))),
                (3175, after(1832).and(before_md(1849, 12, 31))),
            ],
        ),
        (
            "mr childers",
            vec![
                (2894, before_md(1842, 12, 31)),
                (4705, after_md(1863, 1, 1)),
            ],
        ),
        ("mr walpole", vec![(3855, always())]),
        ("mr denman", vec![(2118, always())]),
        ("dr cameron", vec![(5403, always())]),
        (
            "mr villiers",
            vec![
                (6580, lords()),
                (1097, after(1808).and(before_md(1811, 12, 31))),
                (3415, after(1835).and(before_md(1885, 12, 31))),
                (8132, after(1905)),
            ],
        ),
        (
            "mr w williams",
            vec![
                (981, after(1819).and(before(1820))),
                (2123, after(1821).and(before(1826))),
                (3099, after(1831).and(before(1832))),
                (2937, year(1837).or(year(1834)).or(within(1836, 1839))),
                (3313, after(1850).and(before(1865))),
                (5084, after(1869).and(before(1870))),
            ],
        ),
        (
            "mr grattan",
            vec![
                (1263, after(1808).and(before(1820))),
                (
                    2302,
                    after(1821)
                        .and(before(1827))
                        .or(after(1830).and(before(1831)))
                        .or(after(1831).and(before(1832))),
                ),
                (
                    2421,
                    after(1832)
                        .and(before(1835))
                        .or(after(1836).and(before(1837)))
                        .or(after(1838).and(before(1839)))
                        .or(after(1841).and(before(1853))),
                ),
            ],
        ),
        ("mr hopwood", vec![(5476, after(1874).and(before(1886)))]),
        (
            "mr samuel smith",
            vec![(5869, after(1883).and(before(1906)))],
        ),
        (
            "mr moore",
            vec![
                (1195, after(1812).and(before(1820))),
                (2422, after(1826).and(before(1832))),
                (3989, after(1847).and(before(1853))),
                (4362, after(1859).and(before(1860))),
                (
                    5376,
                    after(1875)
                        .and(before(1877))
                        .or(after(1899).and(before(1900))),
                ),
                (
                    7896,
                    after(1900)
                        .and(before(1901))
                        .or(after(1907).and(before(1911))),
                ),
            ],
        ),
        ("mr reynolds", vec![(6197, after(1886).and(before(1888)))]),
        ("mr runciman", vec![(7907, after(1899).and(before(1910)))]),
        (
            "mr molloy",
            vec![
                (5712, after(1886).and(before(1901))),
                (6861, after(1910).and(before(1911))),
            ],
        ),
        (
            "mr colquhoun",
            vec![
                (2958, after(1833).and(before(1835))),
                (
                    3508,
                    after(1837)
                        .and(before(1842))
                        .or(after(1842).and(before(1847))),
                ),
            ],
        ),
        (
            "mr cripps",
            vec![
                (1329, after(1809).and(before(1813))),
                (3650, after(1842).and(before(1848))),
                (7329, after(1896).and(before(1906))),
            ],
        ),
        ("mr markham", vec![(7991, after(1900).and(before(1911)))]),
        (
            "mr bennet",
            vec![
                (1463, after(1812).and(before(1825))),
                (6026, after(1886).and(before(1887))),
                (8381, after(1906).and(before(1910))),
            ],
        ),
        (
            "mr robinson",
            vec![
                (
                    639,
                    after(1819)
                        .and(before(1820))
                        .or(after(1808).and(before(1813))),
                ),
                (
                    2241,
                    after(1820)
                        .and(before(1822))
                        .or(after(1828).and(before(1833))),
                ),
                (3247, after(1832).and(before(1838))),
                (5691, after(1886).and(before(1887))),
                (8129, after(1906).and(before(1909))),
            ],
        ),
        (
            "mr lefroy",
            vec![
                (
                    2995,
                    within(1838, 1841)
                        .or(after_md(1833, 1, 1).and(before_md(1833, 6, 1))),
                ),
                (
                    2663,
                    within(1830, 1832)
                        .or(within(1834, 1836))
                        .or(within(1842, 1847))
                        .or(after_md(1833, 6, 1).and(before_md(1834, 1, 1))),
                ),
            ],
        ),
        ("mr morton", vec![(6397, within(1890, 1910))]),
        (
            "mr pease",
            vec![
                (2966, within(1833, 1839)),
                (4572, within(1857, 1865)),
                (4851, within(1866, 1882)),
                (7390, within(1896, 1910)),
            ],
        ),
        (
            "mr wynn",
            vec![
                (1610, year(1809)),
                (
                    3101,
                    year(1812)
                        .or(within(1822, 1826))
                        .or(year(1831))
                        .or(year(1833))
                        .or(year(1835))
                        .or(year(1841)),
                ),
                (2398, within(1826, 1830)),
                (3658, within(1842, 1845)),
                (4758, after(1868)),
            ],
        ),
        ("mr ponsonby", vec![(8432, within(1908, 1910))]),
        (
            "mr whalley",
            vec![(5756, within(1880, 1881)), (4339, within(1853, 1877))],
        ),
        (
            "mr lambert",
            vec![(2538, within(1830, 1832)), (6438, within(1893, 1910))],
        ),
    ]
}

/// The rule store with its two entry points.
#[derive(Debug, Clone, Default)]
pub struct Disambiguator {
    by_member: HashMap<i64, Rule>,
    by_alias: HashMap<String, Vec<(i64, Rule)>>,
}

impl Disambiguator {
    /// Build from explicit maps; used by tests and by callers that load
    /// rules from elsewhere.
    pub fn new(
        by_member: HashMap<i64, Rule>,
        by_alias: HashMap<String, Vec<(i64, Rule)>>,
    ) -> Self {
        Self { by_member, by_alias }
    }

    /// The built-in curated rule set.
    pub fn curated() -> Self {
        let mut by_member = HashMap::new();
        let mut by_alias = HashMap::new();
        for (alias, entries) in curated_groups() {
            for (id, rule) in &entries {
                by_member.insert(*id, rule.clone());
            }
            by_alias.insert(alias.to_string(), entries);
        }
        Self { by_member, by_alias }
    }

    /// Whether `key` has a direct alias-keyed rule cluster.
    pub fn has_alias_rules(&self, key: &str) -> bool {
        self.by_alias.contains_key(key)
    }

    /// Direct resolution: evaluate the rule cluster stored for `key`.
    /// Returns a member id only when exactly one rule passes; no fallback
    /// to the member-keyed rules.
    pub fn resolve_by_alias(&self, key: &str, ctx: &RuleContext) -> Option<i64> {
        let entries = self.by_alias.get(key)?;
        let mut survivors = entries
            .iter()
            .filter(|(_, rule)| rule.eval(ctx))
            .map(|(id, _)| *id);
        match (survivors.next(), survivors.next()) {
            (Some(id), None) => Some(id),
            _ => None,
        }
    }

    /// Candidate filtering: keep candidates that carry a member-keyed rule,
    /// whose alias set contains `key`, and whose rule passes. Returns a
    /// member id only when exactly one survives.
    pub fn resolve_by_members(
        &self,
        key: &str,
        candidates: &[i64],
        members: &HashMap<i64, Member>,
        ctx: &RuleContext,
    ) -> Option<i64> {
        let mut survivors = candidates.iter().copied().filter(|id| {
            self.by_member.get(id).is_some_and(|rule| {
                members
                    .get(id)
                    .is_some_and(|m| m.aliases.contains(key))
                    && rule.eval(ctx)
            })
        });
        match (survivors.next(), survivors.next()) {
            (Some(id), None) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(y: i32, m: u32, d: u32, house: House) -> RuleContext {
        RuleContext {
            speechdate: ymd(y, m, d),
            house,
            debate_id: 0,
        }
    }

    #[test]
    fn liddell_cluster_resolves_by_context() {
        let disamb = Disambiguator::curated();

        assert_eq!(
            disamb.resolve_by_alias("mr liddell", &ctx(1855, 7, 4, House::Commons)),
            Some(2527)
        );
        assert_eq!(
            disamb.resolve_by_alias("mr liddell", &ctx(1856, 7, 4, House::Commons)),
            Some(4264)
        );
        assert_eq!(
            disamb.resolve_by_alias("mr liddell", &ctx(1856, 7, 4, House::Lords)),
            Some(2527)
        );
        // Both the Lords rule and the post-1903 rule pass: undecided.
        assert_eq!(
            disamb.resolve_by_alias("mr liddell", &ctx(1907, 7, 4, House::Lords)),
            None
        );
    }

    #[test]
    fn unknown_alias_has_no_cluster() {
        let disamb = Disambiguator::curated();
        assert!(!disamb.has_alias_rules("mr nobody"));
        assert_eq!(
            disamb.resolve_by_alias("mr nobody", &ctx(1850, 1, 1, House::Commons)),
            None
        );
    }

    #[test]
    fn within_years_bounds() {
        let rule = within(1830, 1832);
        assert!(rule.eval(&ctx(1830, 1, 1, House::Unknown)));
        assert!(rule.eval(&ctx(1832, 12, 31, House::Unknown)));
        assert!(!rule.eval(&ctx(1833, 1, 1, House::Unknown)));

        let exclusive = Rule::WithinYears {
            from: 1830,
            to: 1832,
            inclusive: false,
        };
        assert!(!exclusive.eval(&ctx(1830, 6, 1, House::Unknown)));
        assert!(exclusive.eval(&ctx(1831, 6, 1, House::Unknown)));
    }

    #[test]
    fn debate_atom() {
        let rule = Rule::InDebates([7, 9].into_iter().collect());
        let mut c = ctx(1850, 1, 1, House::Unknown);
        c.debate_id = 9;
        assert!(rule.eval(&c));
        c.debate_id = 8;
        assert!(!rule.eval(&c));
    }

    #[test]
    fn on_date_atom() {
        let rule = Rule::On(ymd(1855, 7, 4));
        assert!(rule.eval(&ctx(1855, 7, 4, House::Unknown)));
        assert!(!rule.eval(&ctx(1855, 7, 5, House::Unknown)));
    }

    #[test]
    fn by_members_requires_alias_and_unique_survivor() {
        use crate::member::Member;

        let m1 = Member::new(10, "John Liddell", "John", "Liddell", ymd(1800, 1, 1), ymd(1880, 1, 1)).unwrap();
        let m2 = Member::new(11, "Hugh Liddell", "Hugh", "Liddell", ymd(1810, 1, 1), ymd(1890, 1, 1)).unwrap();
        let members: HashMap<i64, Member> = [(10, m1), (11, m2)].into_iter().collect();

        let by_member: HashMap<i64, Rule> =
            [(10, before(1856)), (11, after(1856))].into_iter().collect();
        let disamb = Disambiguator::new(by_member, HashMap::new());

        let c = ctx(1850, 1, 1, House::Commons);
        assert_eq!(
            disamb.resolve_by_members("mr liddell", &[10, 11], &members, &c),
            Some(10)
        );
        // Alias not carried by either member: no survivor.
        assert_eq!(
            disamb.resolve_by_members("mr gladstone", &[10, 11], &members, &c),
            None
        );
        // No candidates: undecided.
        assert_eq!(disamb.resolve_by_members("mr liddell", &[], &members, &c), None);
    }
}
