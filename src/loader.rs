//! Reference-table ingestion.
//!
//! Everything the resolver consults is loaded here, once, before any
//! worker starts: the member catalog, the time-bounded alias tables, the
//! office registry with its holdings and position tables, the misspelling
//! dictionaries, debate inferences, and the ignored-string pool.
//!
//! Error policy follows two tiers. Structural problems — a missing column,
//! an unparseable date, a duplicate member id, an alias row pointing at a
//! member that does not exist — are fatal and abort the load naming the
//! file and row. Per-member validation failures (first or last name not a
//! token of the full name, unusable birth date) only skip that member.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::HsrError;
use crate::index::{
    AliasRow, AliasTable, ReferenceData, ReferenceParts, search_window_end, search_window_start,
};
use crate::member::{Member, Office, OfficeHolding, OfficeTerm};
use crate::normalize::{Normalizer, cleanse, index_alias};
use crate::rules::Disambiguator;

/// Root layout of the reference-data directory. `SCRATCH` overrides the
/// root; file names underneath are fixed.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn speakers_file(&self) -> PathBuf {
        self.root.join("mps/speakers-names/speakers.csv")
    }

    pub fn peerage_titles_dir(&self) -> PathBuf {
        self.root.join("mps/peerage-titles")
    }

    pub fn name_aliases_dir(&self) -> PathBuf {
        self.root.join("name-aliases")
    }

    pub fn office_titles_file(&self) -> PathBuf {
        self.root.join("titles/office_titles.csv")
    }

    pub fn office_holdings_file(&self) -> PathBuf {
        self.root.join("officeholdings.csv")
    }

    pub fn office_positions_dir(&self) -> PathBuf {
        self.root.join("mps/offices")
    }

    pub fn corrections_dir(&self) -> PathBuf {
        self.root.join("pre_corrections")
    }

    pub fn inferences_file(&self) -> PathBuf {
        self.root.join("inferences.csv")
    }

    pub fn non_mps_dir(&self) -> PathBuf {
        self.root.join("non-mps")
    }

    pub fn hansard_titles_file(&self) -> PathBuf {
        self.root.join("hansard_titles.csv")
    }
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Which side of an interval a date cell fills; governs how year-only and
/// year-month estimates are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRole {
    Start,
    End,
}

/// Parse `Y`, `Y-M`, or `Y-M-D` with `-` or `/` separators. Year-only and
/// year-month estimates expand to the earliest (`Start`) or latest (`End`)
/// day of the implied range. Returns `None` for empty or unparseable cells.
pub fn parse_flexible_date(value: &str, role: DateRole) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("na") || value.eq_ignore_ascii_case("n/a") {
        return None;
    }
    let sep = if value.contains('/') { '/' } else { '-' };
    let parts: Vec<&str> = value.split(sep).collect();

    let num = |s: &str| s.trim().parse::<i64>().ok();
    match parts.as_slice() {
        [y, m, d] => {
            NaiveDate::from_ymd_opt(num(y)? as i32, num(m)? as u32, num(d)? as u32)
        }
        [y, m] => {
            let y = num(y)? as i32;
            let m = num(m)? as u32;
            match role {
                DateRole::Start => NaiveDate::from_ymd_opt(y, m, 1),
                DateRole::End => last_day_of_month(y, m),
            }
        }
        [y] => {
            let y = num(y)? as i32;
            match role {
                DateRole::Start => NaiveDate::from_ymd_opt(y, 1, 1),
                DateRole::End => NaiveDate::from_ymd_opt(y, 12, 31),
            }
        }
        _ => None,
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next.and_then(|d| d.pred_opt())
}

// ---------------------------------------------------------------------------
// CSV helpers
// ---------------------------------------------------------------------------

fn open_csv(path: &Path) -> Result<csv::Reader<File>, HsrError> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| HsrError::TableRead {
            file: path.to_path_buf(),
            detail: e.to_string(),
        })
}

fn read_headers(
    reader: &mut csv::Reader<File>,
    path: &Path,
) -> Result<csv::StringRecord, HsrError> {
    reader
        .headers()
        .map(|h| h.clone())
        .map_err(|e| HsrError::TableRead {
            file: path.to_path_buf(),
            detail: e.to_string(),
        })
}

fn required_column(
    headers: &csv::StringRecord,
    name: &str,
    path: &Path,
) -> Result<usize, HsrError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| HsrError::MissingColumn {
            file: path.to_path_buf(),
            column: name.to_string(),
        })
}

fn optional_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("").trim()
}

/// CSV files of a directory in name order, so load order is stable across
/// runs.
fn csv_files_sorted(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv"))
        })
        .collect();
    files.sort();
    files
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

static DEFINED_ALIAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").unwrap());

struct MemberLoad {
    members: Vec<Member>,
    defined_aliases: Vec<(String, i64)>,
}

fn load_members(path: &Path, today: NaiveDate) -> Result<MemberLoad, HsrError> {
    let mut reader = open_csv(path)?;
    let headers = read_headers(&mut reader, path)?;

    let id_col = required_column(&headers, "corresponding_id", path)?;
    let name_col = required_column(&headers, "speaker_name", path)?;
    let first_col = required_column(&headers, "first_name", path)?;
    let last_col = required_column(&headers, "last_name", path)?;
    let dob_col = required_column(&headers, "dob", path)?;
    let dod_col = required_column(&headers, "dod", path)?;

    let mut members = Vec::new();
    let mut defined_aliases = Vec::new();
    let mut seen_ids: HashSet<i64> = HashSet::new();
    let mut skipped_names = 0usize;
    let mut skipped_dates = 0usize;
    let mut total = 0usize;

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| HsrError::TableRead {
            file: path.to_path_buf(),
            detail: format!("row {row}: {e}"),
        })?;
        total += 1;

        let id: i64 = match field(&record, id_col).parse() {
            Ok(id) => id,
            Err(_) => {
                debug!(row, "skipping member row with unparseable id");
                continue;
            }
        };
        if !seen_ids.insert(id) {
            return Err(HsrError::DuplicateMemberId {
                file: path.to_path_buf(),
                id,
            });
        }

        let raw_name = field(&record, name_col);
        let first = field(&record, first_col);
        let last = field(&record, last_col);
        if first.is_empty() || last.is_empty() {
            skipped_names += 1;
            debug!(row, name = raw_name, "missing first or last name");
            continue;
        }

        let dob_raw = field(&record, dob_col);
        let dob = if dob_raw.is_empty() {
            search_window_start()
        } else {
            match parse_flexible_date(dob_raw, DateRole::Start) {
                Some(d) => d,
                None => {
                    skipped_dates += 1;
                    debug!(row, value = dob_raw, "unrecoverable date of birth");
                    continue;
                }
            }
        };
        let dod_raw = field(&record, dod_col);
        let dod = if dod_raw.is_empty() {
            // Assume the member is still alive.
            today
        } else {
            match parse_flexible_date(dod_raw, DateRole::End) {
                Some(d) => d,
                None => {
                    skipped_dates += 1;
                    debug!(row, value = dod_raw, "unrecoverable date of death");
                    continue;
                }
            }
        };

        // Parenthetical aliases declared inline in the name field.
        let mut inline_aliases = Vec::new();
        for caps in DEFINED_ALIAS.captures_iter(raw_name) {
            let alias = index_alias(&caps[1]);
            if !alias.is_empty() {
                inline_aliases.push(alias);
            }
        }
        let bare_name = DEFINED_ALIAS.replace_all(raw_name, "");

        match Member::new(id, &bare_name, first, last, dob, dod) {
            Ok(member) => {
                for alias in inline_aliases {
                    defined_aliases.push((alias, member.id));
                }
                members.push(member);
            }
            Err(err) => {
                skipped_names += 1;
                debug!(row, name = raw_name, %err, "member rejected");
            }
        }
    }

    info!(
        loaded = members.len(),
        total,
        skipped_names,
        skipped_dates,
        "member catalog loaded"
    );
    Ok(MemberLoad {
        members,
        defined_aliases,
    })
}

// ---------------------------------------------------------------------------
// Alias tables
// ---------------------------------------------------------------------------

fn load_alias_rows(
    path: &Path,
    known_ids: &HashSet<i64>,
    table: &mut AliasTable,
) -> Result<(), HsrError> {
    let mut reader = open_csv(path)?;
    let headers = read_headers(&mut reader, path)?;

    let alias_col = required_column(&headers, "alias", path)?;
    let id_col = optional_column(&headers, "corresponding_id");
    let real_name_col = optional_column(&headers, "real_name");
    let start_col = required_column(&headers, "start_search", path)?;
    let end_col = required_column(&headers, "end_search", path)?;

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| HsrError::TableRead {
            file: path.to_path_buf(),
            detail: format!("row {row}: {e}"),
        })?;

        let alias = index_alias(field(&record, alias_col));
        if alias.is_empty() {
            continue;
        }

        let member_id = match id_col.map(|c| field(&record, c)) {
            Some(cell) if !cell.is_empty() => {
                let id: i64 = cell.parse().map_err(|_| HsrError::TableRead {
                    file: path.to_path_buf(),
                    detail: format!("row {row}: unparseable corresponding_id '{cell}'"),
                })?;
                if !known_ids.contains(&id) {
                    return Err(HsrError::UnknownMemberId {
                        file: path.to_path_buf(),
                        row,
                        id,
                    });
                }
                Some(id)
            }
            _ => None,
        };

        let start = parse_window_date(&record, start_col, DateRole::Start, path, row)?
            .unwrap_or_else(search_window_start);
        let end = parse_window_date(&record, end_col, DateRole::End, path, row)?
            .unwrap_or_else(search_window_end);

        let real_name = real_name_col
            .map(|c| field(&record, c))
            .filter(|v| !v.is_empty())
            .map(|v| v.to_lowercase());

        table.rows.push(AliasRow {
            member_id,
            alias,
            start,
            end,
            real_name,
        });
    }
    Ok(())
}

/// Parse a window cell; empty is recoverable (the caller substitutes the
/// materialized bound), garbage is fatal.
fn parse_window_date(
    record: &csv::StringRecord,
    col: usize,
    role: DateRole,
    path: &Path,
    row: usize,
) -> Result<Option<NaiveDate>, HsrError> {
    let cell = field(record, col);
    if cell.is_empty() || cell.eq_ignore_ascii_case("na") || cell.eq_ignore_ascii_case("n/a") {
        return Ok(None);
    }
    parse_flexible_date(cell, role)
        .map(Some)
        .ok_or_else(|| HsrError::InvalidDate {
            file: path.to_path_buf(),
            row,
            value: cell.to_string(),
        })
}

fn load_alias_dir(
    dir: &Path,
    name: &str,
    known_ids: &HashSet<i64>,
) -> Result<AliasTable, HsrError> {
    let mut table = AliasTable::new(name);
    if !dir.is_dir() {
        debug!(dir = %dir.display(), table = name, "alias directory absent");
        return Ok(table);
    }
    for file in csv_files_sorted(dir) {
        debug!(file = %file.display(), table = name, "loading alias table");
        load_alias_rows(&file, known_ids, &mut table)?;
    }
    info!(table = name, rows = table.rows.len(), "alias table loaded");
    Ok(table)
}

fn load_alias_file(
    path: &Path,
    name: &str,
    known_ids: &HashSet<i64>,
) -> Result<AliasTable, HsrError> {
    let mut table = AliasTable::new(name);
    if !path.is_file() {
        debug!(file = %path.display(), table = name, "optional alias table absent");
        return Ok(table);
    }
    load_alias_rows(path, known_ids, &mut table)?;
    info!(table = name, rows = table.rows.len(), "alias table loaded");
    Ok(table)
}

// ---------------------------------------------------------------------------
// Offices, holdings, positions
// ---------------------------------------------------------------------------

fn load_offices(path: &Path) -> Result<BTreeMap<i64, Office>, HsrError> {
    let mut reader = open_csv(path)?;
    let headers = read_headers(&mut reader, path)?;
    let id_col = required_column(&headers, "office_id", path)?;
    let name_col = required_column(&headers, "name", path)?;

    let mut offices = BTreeMap::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| HsrError::TableRead {
            file: path.to_path_buf(),
            detail: format!("row {row}: {e}"),
        })?;
        let id: i64 = field(&record, id_col).parse().map_err(|_| HsrError::TableRead {
            file: path.to_path_buf(),
            detail: format!("row {row}: unparseable office_id"),
        })?;
        offices.insert(id, Office::new(id, field(&record, name_col)));
    }
    info!(offices = offices.len(), "office registry loaded");
    Ok(offices)
}

fn load_holdings(
    path: &Path,
    offices: &BTreeMap<i64, Office>,
    members: &mut [Member],
    index: &HashMap<i64, usize>,
) -> Result<Vec<OfficeHolding>, HsrError> {
    let mut reader = open_csv(path)?;
    let headers = read_headers(&mut reader, path)?;
    let member_col = required_column(&headers, "corresponding_id", path)?;
    let office_col = required_column(&headers, "office_id", path)?;
    let start_col = required_column(&headers, "start_search", path)?;
    let end_col = required_column(&headers, "end_search", path)?;

    let mut holdings = Vec::new();
    let mut unknown_members = 0usize;
    let mut unknown_offices = 0usize;
    let mut invalid_dates = 0usize;

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| HsrError::TableRead {
            file: path.to_path_buf(),
            detail: format!("row {row}: {e}"),
        })?;

        let member_id: i64 = match field(&record, member_col).parse() {
            Ok(id) => id,
            Err(_) => {
                unknown_members += 1;
                continue;
            }
        };
        let office_id: i64 = match field(&record, office_col).parse() {
            Ok(id) => id,
            Err(_) => {
                unknown_offices += 1;
                continue;
            }
        };

        let Some(start) = parse_flexible_date(field(&record, start_col), DateRole::Start) else {
            invalid_dates += 1;
            debug!(row, "invalid office holding start date");
            continue;
        };
        let end = parse_flexible_date(field(&record, end_col), DateRole::End)
            .unwrap_or_else(search_window_end);

        let Some(&member_idx) = index.get(&member_id) else {
            unknown_members += 1;
            debug!(row, member_id, "office holding references unknown member");
            continue;
        };
        if !offices.contains_key(&office_id) {
            unknown_offices += 1;
            debug!(row, office_id, "office holding references unknown office");
            continue;
        }

        members[member_idx].terms.push(OfficeTerm { start, end });
        holdings.push(OfficeHolding {
            member_id,
            office_id,
            start,
            end,
        });
    }

    if unknown_members > 0 || unknown_offices > 0 || invalid_dates > 0 {
        warn!(
            unknown_members,
            unknown_offices, invalid_dates, "office holding rows skipped"
        );
    }
    info!(holdings = holdings.len(), "office holdings loaded");
    Ok(holdings)
}

/// Office-position tables: one CSV per position. The table is keyed by the
/// normalized alias of its first row; rows with an `honorary_title` feed
/// the honorary-titles index, and every row with a member id contributes an
/// office term.
fn load_office_positions(
    dir: &Path,
    known_ids: &HashSet<i64>,
    members: &mut [Member],
    index: &HashMap<i64, usize>,
) -> Result<(BTreeMap<String, AliasTable>, AliasTable), HsrError> {
    let mut positions = BTreeMap::new();
    let mut honorary = AliasTable::new("honorary titles");

    if !dir.is_dir() {
        debug!(dir = %dir.display(), "office positions directory absent");
        return Ok((positions, honorary));
    }

    for file in csv_files_sorted(dir) {
        let mut reader = open_csv(&file)?;
        let headers = read_headers(&mut reader, &file)?;
        let alias_col = required_column(&headers, "alias", &file)?;
        let start_col = required_column(&headers, "start_search", &file)?;
        let end_col = required_column(&headers, "end_search", &file)?;
        let id_col = optional_column(&headers, "corresponding_id");
        let honorary_col = optional_column(&headers, "honorary_title");

        let mut table = AliasTable::new("office position");
        let mut position_name: Option<String> = None;

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| HsrError::TableRead {
                file: file.clone(),
                detail: format!("row {row}: {e}"),
            })?;

            let alias = index_alias(field(&record, alias_col));
            if alias.is_empty() {
                continue;
            }
            if position_name.is_none() {
                position_name = Some(alias.clone());
            }

            let member_id = match id_col.map(|c| field(&record, c)) {
                Some(cell) if !cell.is_empty() => {
                    let id: i64 = cell.parse().map_err(|_| HsrError::TableRead {
                        file: file.clone(),
                        detail: format!("row {row}: unparseable corresponding_id '{cell}'"),
                    })?;
                    if !known_ids.contains(&id) {
                        return Err(HsrError::UnknownMemberId {
                            file: file.clone(),
                            row,
                            id,
                        });
                    }
                    Some(id)
                }
                _ => None,
            };

            let start = parse_window_date(&record, start_col, DateRole::Start, &file, row)?
                .unwrap_or_else(search_window_start);
            let end = parse_window_date(&record, end_col, DateRole::End, &file, row)?
                .unwrap_or_else(search_window_end);

            if let Some(id) = member_id {
                if let Some(&member_idx) = index.get(&id) {
                    members[member_idx].terms.push(OfficeTerm { start, end });
                }
                if let Some(title) = honorary_col.map(|c| field(&record, c)).filter(|t| !t.is_empty())
                {
                    honorary.rows.push(AliasRow {
                        member_id: Some(id),
                        alias: cleanse(title),
                        start,
                        end,
                        real_name: None,
                    });
                }
            }

            table.rows.push(AliasRow {
                member_id,
                alias,
                start,
                end,
                real_name: None,
            });
        }

        if let Some(name) = position_name {
            debug!(position = %name, rows = table.rows.len(), "office position loaded");
            table.name = name.clone();
            positions.insert(name, table);
        }
    }

    info!(
        positions = positions.len(),
        honorary = honorary.rows.len(),
        "office positions loaded"
    );
    Ok((positions, honorary))
}

// ---------------------------------------------------------------------------
// Corrections, inferences, ignored strings
// ---------------------------------------------------------------------------

fn load_corrections(dir: &Path) -> Result<Vec<(String, String)>, HsrError> {
    let mut corrections = Vec::new();
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "corrections directory absent");
        return Ok(corrections);
    }
    for file in csv_files_sorted(dir) {
        let is_tsv = file
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(if is_tsv { b'\t' } else { b',' })
            .flexible(true)
            .from_path(&file)
            .map_err(|e| HsrError::TableRead {
                file: file.clone(),
                detail: e.to_string(),
            })?;
        let headers = read_headers(&mut reader, &file)?;
        let incorrect_col = required_column(&headers, "INCORRECT", &file)?;
        let correct_col = required_column(&headers, "CORRECT", &file)?;

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| HsrError::TableRead {
                file: file.clone(),
                detail: format!("row {row}: {e}"),
            })?;
            let incorrect = field(&record, incorrect_col).to_lowercase();
            if incorrect.is_empty() {
                continue;
            }
            // A missing CORRECT cell means "delete the substring".
            let correct = field(&record, correct_col).to_string();
            corrections.push((incorrect, correct));
        }
    }
    info!(pairs = corrections.len(), "misspelling tables loaded");
    Ok(corrections)
}

fn load_inferences(path: &Path) -> Result<HashMap<i64, i64>, HsrError> {
    let mut inferences = HashMap::new();
    if !path.is_file() {
        debug!(file = %path.display(), "inferences table absent");
        return Ok(inferences);
    }
    let mut reader = open_csv(path)?;
    let headers = read_headers(&mut reader, path)?;
    let debate_col = required_column(&headers, "debate_id", path)?;
    let member_col = required_column(&headers, "member_id", path)?;

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| HsrError::TableRead {
            file: path.to_path_buf(),
            detail: format!("row {row}: {e}"),
        })?;
        let (Ok(debate_id), Ok(member_id)) = (
            field(&record, debate_col).parse::<i64>(),
            field(&record, member_col).parse::<i64>(),
        ) else {
            debug!(row, "skipping unparseable inference row");
            continue;
        };
        inferences.insert(debate_id, member_id);
    }
    info!(inferences = inferences.len(), "debate inferences loaded");
    Ok(inferences)
}

/// Pool the `non_mps` column from every CSV under the non-MPs directory.
fn load_ignored(dir: &Path) -> Result<HashSet<String>, HsrError> {
    let mut ignored = HashSet::new();
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "non-mps directory absent");
        return Ok(ignored);
    }
    for file in csv_files_sorted(dir) {
        let mut reader = open_csv(&file)?;
        let headers = read_headers(&mut reader, &file)?;
        let col = required_column(&headers, "non_mps", &file)?;
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| HsrError::TableRead {
                file: file.clone(),
                detail: format!("row {row}: {e}"),
            })?;
            let value = index_alias(field(&record, col));
            if !value.is_empty() {
                ignored.insert(value);
            }
        }
    }
    info!(ignored = ignored.len(), "ignored-string pool loaded");
    Ok(ignored)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Load every reference table and assemble the immutable snapshot.
pub fn load_reference_data(paths: &DataPaths, today: NaiveDate) -> Result<ReferenceData, HsrError> {
    let MemberLoad {
        mut members,
        defined_aliases,
    } = load_members(&paths.speakers_file(), today)?;

    let known_ids: HashSet<i64> = members.iter().map(|m| m.id).collect();
    let index: HashMap<i64, usize> = members
        .iter()
        .enumerate()
        .map(|(i, m)| (m.id, i))
        .collect();

    let peerage_titles = load_alias_dir(&paths.peerage_titles_dir(), "peerage titles", &known_ids)?;
    let name_aliases = load_alias_dir(&paths.name_aliases_dir(), "name aliases", &known_ids)?;
    let hansard_titles =
        load_alias_file(&paths.hansard_titles_file(), "hansard titles", &known_ids)?;

    let offices = load_offices(&paths.office_titles_file())?;
    let holdings = load_holdings(
        &paths.office_holdings_file(),
        &offices,
        &mut members,
        &index,
    )?;
    let (office_positions, honorary_titles) = load_office_positions(
        &paths.office_positions_dir(),
        &known_ids,
        &mut members,
        &index,
    )?;

    let corrections = load_corrections(&paths.corrections_dir())?;
    let inferences = load_inferences(&paths.inferences_file())?;
    let ignored = load_ignored(&paths.non_mps_dir())?;

    Ok(ReferenceData::assemble(ReferenceParts {
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
        normalizer: Normalizer::new(corrections),
        disambiguator: Disambiguator::curated(),
        today,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flexible_dates_expand_estimates() {
        let d = |y, m, dd| NaiveDate::from_ymd_opt(y, m, dd).unwrap();

        assert_eq!(parse_flexible_date("1855-07-04", DateRole::Start), Some(d(1855, 7, 4)));
        assert_eq!(parse_flexible_date("1855/07/04", DateRole::Start), Some(d(1855, 7, 4)));
        assert_eq!(parse_flexible_date("1855", DateRole::Start), Some(d(1855, 1, 1)));
        assert_eq!(parse_flexible_date("1855", DateRole::End), Some(d(1855, 12, 31)));
        assert_eq!(parse_flexible_date("1855-02", DateRole::Start), Some(d(1855, 2, 1)));
        assert_eq!(parse_flexible_date("1855-02", DateRole::End), Some(d(1855, 2, 28)));
        // Leap year.
        assert_eq!(parse_flexible_date("1856-02", DateRole::End), Some(d(1856, 2, 29)));
        assert_eq!(parse_flexible_date("1855/12", DateRole::End), Some(d(1855, 12, 31)));
        assert_eq!(parse_flexible_date("", DateRole::Start), None);
        assert_eq!(parse_flexible_date("not a date", DateRole::Start), None);
    }
}
