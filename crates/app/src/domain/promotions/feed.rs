//! Promotions Feed
//!
//! Reads the comma-separated promotions feed (`id,price,expirationDate`) into
//! [`Promotion`] values. The first row is always treated as a header.

use std::{io, path::Path};

use jiff::{Timestamp, fmt::strtime};
use tracing::debug;

use crate::domain::promotions::{errors::FeedError, records::Promotion};

/// Verbose stamp layout, minus the trailing zone name. Fractional seconds
/// are optional.
const VERBOSE_STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

/// Expiration date encodings, tried in order. The first match wins.
const EXPIRATION_DATE_FORMATS: [fn(&str) -> Option<Timestamp>; 2] =
    [parse_verbose_stamp, parse_rfc3339];

/// Read and parse the feed at `path`.
///
/// # Errors
///
/// Returns an error when the file cannot be read or any row fails to parse.
pub async fn read_feed(path: &Path) -> Result<Vec<Promotion>, FeedError> {
    let contents = tokio::fs::read(path)
        .await
        .map_err(|source| FeedError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let promotions = parse_feed(contents.as_slice())?;

    debug!(path = %path.display(), records = promotions.len(), "parsed promotions feed");

    Ok(promotions)
}

/// Parse a feed from any reader.
///
/// The whole parse fails on the first bad row; no partial results are returned.
///
/// # Errors
///
/// Returns an error for unreadable CSV, rows with fewer than three columns,
/// non-numeric prices and expiration dates in no supported encoding.
pub fn parse_feed<R: io::Read>(reader: R) -> Result<Vec<Promotion>, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut promotions = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let row = index + 1;

        let (Some(id), Some(price), Some(expiration_date)) =
            (record.get(0), record.get(1), record.get(2))
        else {
            return Err(FeedError::MalformedRow {
                row,
                columns: record.len(),
            });
        };

        let expiration_date = parse_expiration_date(expiration_date).ok_or_else(|| {
            FeedError::InvalidExpirationDate {
                row,
                value: expiration_date.to_string(),
            }
        })?;

        let price = price
            .parse::<f64>()
            .map_err(|source| FeedError::InvalidPrice {
                row,
                value: price.to_string(),
                source,
            })?;

        promotions.push(Promotion {
            id: id.to_string(),
            price,
            expiration_date,
        });
    }

    Ok(promotions)
}

/// Parse an expiration date using the first encoding that accepts it.
pub fn parse_expiration_date(value: &str) -> Option<Timestamp> {
    EXPIRATION_DATE_FORMATS
        .iter()
        .find_map(|parse| parse(value))
}

/// `2024-12-31 23:59:59 -0500 EST`, `2024-12-31 23:59:59.5 -0500 EST`.
/// The offset decides the instant.
fn parse_verbose_stamp(value: &str) -> Option<Timestamp> {
    let (stamp, zone) = value.rsplit_once(' ')?;

    if !is_zone_name(zone) {
        return None;
    }

    strtime::parse(VERBOSE_STAMP_FORMAT, stamp)
        .ok()?
        .to_timestamp()
        .ok()
}

/// `2025-01-01T00:00:00Z`, `2025-01-01T00:00:00.5+02:00`
///
/// Only the strict internet profile: `T` separator, seconds, and either `Z`
/// or a `±HH:MM` offset.
fn parse_rfc3339(value: &str) -> Option<Timestamp> {
    if !has_rfc3339_layout(value) {
        return None;
    }

    value.parse().ok()
}

fn has_rfc3339_layout(value: &str) -> bool {
    let bytes = value.as_bytes();

    let separators = [(4, b'-'), (7, b'-'), (10, b'T'), (13, b':'), (16, b':')]
        .iter()
        .all(|&(at, separator)| bytes.get(at) == Some(&separator));

    let offset = bytes
        .len()
        .checked_sub(6)
        .and_then(|start| bytes.get(start..));

    let zoned = value.ends_with('Z')
        || matches!(
            offset,
            Some([b'+' | b'-', h1, h2, b':', m1, m2])
                if [h1, h2, m1, m2].iter().all(|d| d.is_ascii_digit())
        );

    separators && zoned
}

/// Abbreviations as printed after a Go-style stamp: `EST`, `CEST`, `ChST`,
/// `GMT+3`, or a bare `+03` when the zone has no abbreviation.
fn is_zone_name(zone: &str) -> bool {
    if matches!(zone, "ChST" | "MeST") {
        return true;
    }

    if let Some(offset) = zone.strip_prefix("GMT") {
        return offset.is_empty() || is_signed_hours(offset);
    }

    if is_signed_hours(zone) {
        return true;
    }

    zone.chars().all(|c| c.is_ascii_uppercase())
        && match zone.len() {
            3 => true,
            4 => zone.ends_with('T') || zone == "WITA",
            5 => zone.ends_with('T'),
            _ => false,
        }
}

/// `+3`, `-03`, `+0530`
fn is_signed_hours(value: &str) -> bool {
    value.strip_prefix(['+', '-']).is_some_and(|digits| {
        matches!(digits.len(), 1 | 2 | 4) && digits.chars().all(|c| c.is_ascii_digit())
    })
}
