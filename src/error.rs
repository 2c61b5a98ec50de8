//! Actionable typed errors for hsr.
//!
//! Load-time structural problems are fatal and carry the offending file
//! and row so the operator can fix the reference table; internal
//! propagation uses `anyhow`, and the public API exposes these
//! `thiserror` types.

use std::path::PathBuf;

/// Errors that hsr surfaces to the user.
#[derive(Debug, thiserror::Error)]
pub enum HsrError {
    /// A reference table is missing a required column.
    #[error("{}: missing required column '{column}'", file.display())]
    MissingColumn { file: PathBuf, column: String },

    /// A date cell is outside the recoverable patterns (year, year-month,
    /// full date with `-` or `/` separators).
    #[error("{}: row {row}: unparseable date '{value}'", file.display())]
    InvalidDate {
        file: PathBuf,
        row: usize,
        value: String,
    },

    /// Two member rows share an id.
    #[error("{}: duplicate member id {id}", file.display())]
    DuplicateMemberId { file: PathBuf, id: i64 },

    /// An alias row references a member id that is not in the catalog.
    #[error("{}: row {row}: alias references unknown member id {id}", file.display())]
    UnknownMemberId { file: PathBuf, row: usize, id: i64 },

    /// A reference table could not be read at all.
    #[error("{}: {detail}", file.display())]
    TableRead { file: PathBuf, detail: String },

    /// Invalid CLI argument; maps to exit code 2.
    #[error("invalid argument: {detail}")]
    InvalidArgument { detail: String },

    /// Queue or I/O failure during processing; maps to exit code 1.
    #[error("pipeline error: {detail}")]
    Pipeline { detail: String },
}
