// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::Row;
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};

pub fn parse_date(s: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::invalid(format!("Invalid date '{}', expected YYYY-MM-DD", s))
    })
}

/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` (taken as midnight UTC).
pub fn parse_timestamp(s: &str) -> LedgerResult<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_date(s)
        .map(day_start)
        .map_err(|_| {
            LedgerError::invalid(format!(
                "Invalid timestamp '{}', expected RFC 3339 or YYYY-MM-DD",
                s
            ))
        })
}

pub fn parse_decimal(s: &str) -> LedgerResult<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| LedgerError::invalid(format!("Invalid decimal '{}'", s)))
}

/// Exact addition that reports overflow instead of panicking.
pub fn add_money(a: Decimal, b: Decimal) -> LedgerResult<Decimal> {
    a.checked_add(b).ok_or_else(|| LedgerError::invalid("amount out of range"))
}

/// Fixed-width UTC form used for every stored timestamp, so text order is time order.
pub fn fmt_ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn now_ts() -> String {
    fmt_ts(&Utc::now())
}

pub fn day_start(d: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))
}

/// Exclusive upper bound covering the whole of `d`.
pub fn day_after(d: NaiveDate) -> LedgerResult<DateTime<Utc>> {
    d.succ_opt()
        .map(day_start)
        .ok_or_else(|| LedgerError::invalid(format!("Date {} is out of range", d)))
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

pub fn col_decimal(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = r.get(idx)?;
    raw.parse::<Decimal>().map_err(|e| conversion_error(idx, e))
}

pub fn col_ts(r: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = r.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

pub fn col_date(r: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = r.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_error(idx, e))
}

pub fn col_opt_date(r: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = r.get(idx)?;
    raw.map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub fn col_enum<T>(r: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = LedgerError>,
{
    let raw: String = r.get(idx)?;
    raw.parse::<T>().map_err(|e| conversion_error(idx, e))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> anyhow::Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_fixed_width() {
        let a = parse_timestamp("2025-01-03T10:00:00.123+02:00").unwrap();
        assert_eq!(fmt_ts(&a), "2025-01-03T08:00:00Z");
        let b = parse_timestamp("2025-01-03").unwrap();
        assert_eq!(fmt_ts(&b), "2025-01-03T00:00:00Z");
    }

    #[test]
    fn bad_inputs_are_validation_errors() {
        assert!(parse_date("2025-13-01").unwrap_err().is_validation());
        assert!(parse_timestamp("yesterday").unwrap_err().is_validation());
        assert!(parse_decimal("12,5").unwrap_err().is_validation());
    }

    #[test]
    fn money_overflow_is_a_validation_error() {
        assert!(add_money(Decimal::MAX, Decimal::ONE).unwrap_err().is_validation());
        assert_eq!(add_money(Decimal::ONE, Decimal::TWO).unwrap(), Decimal::new(3, 0));
    }

    #[test]
    fn day_after_covers_whole_day() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(fmt_ts(&day_after(d).unwrap()), "2024-03-01T00:00:00Z");
    }
}
