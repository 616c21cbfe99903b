// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous query modules over the three core tables.
//!
//! Every function takes a `&rusqlite::Connection` (a `Transaction` derefs to
//! one), so queries compose inside a single transaction driven by
//! `Database::transaction`.

pub mod blacklist;
pub mod calls;
pub mod contacts;

/// Parse a TEXT enum column, surfacing unknown stored values as a conversion
/// failure on the offending column instead of a silent default.
pub(crate) fn parse_enum_col<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Map `QueryReturnedNoRows` to `None`.
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
