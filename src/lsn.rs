//! Log sequence number and server timestamp helpers.
//!
//! LSNs travel as plain 64-bit integers; PostgreSQL prints them as two
//! hexadecimal halves separated by a slash (`16/B374D848`). Timestamps travel
//! as microseconds since the PostgreSQL epoch, 2000-01-01 00:00:00 UTC.

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// PostgreSQL epoch (2000-01-01) in microseconds since the Unix epoch.
pub const PG_EPOCH_MICROS: i64 = 946_684_800_000_000;

pub fn format_lsn(lsn: u64) -> String {
    format!("{:X}/{:X}", lsn >> 32, lsn & 0xFFFFFFFF)
}

pub fn parse_lsn(text: &str) -> Result<u64> {
    let invalid = || Error::InvalidInput {
        message: format!("invalid LSN: {}", text),
    };
    let (hi, lo) = text.split_once('/').ok_or_else(invalid)?;
    let hi = u32::from_str_radix(hi, 16).map_err(|_| invalid())?;
    let lo = u32::from_str_radix(lo, 16).map_err(|_| invalid())?;
    Ok((u64::from(hi) << 32) | u64::from(lo))
}

/// Converts a wire timestamp to UTC, or `None` if it is out of chrono's range.
pub fn pg_timestamp_to_datetime(pg_micros: i64) -> Option<DateTime<Utc>> {
    let unix_micros = pg_micros.checked_add(PG_EPOCH_MICROS)?;
    DateTime::from_timestamp_micros(unix_micros)
}

pub fn datetime_to_pg_timestamp(time: DateTime<Utc>) -> i64 {
    time.timestamp_micros() - PG_EPOCH_MICROS
}
