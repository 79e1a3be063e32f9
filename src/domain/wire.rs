//! Decoding helpers for the hosted API, which is loose about types: prices
//! and totals often come back as strings (`"20.00"`), and timestamps are
//! either RFC 3339 text or Unix seconds. A `null` number reads as zero and
//! an unreadable timestamp reads as absent, so one odd field never drops a
//! whole row from a listing.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::warn;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrText {
    fn as_f64<E: de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrText::Int(n) => Ok(n as f64),
            NumberOrText::Float(n) => Ok(n),
            NumberOrText::Text(s) if s.trim().is_empty() => Ok(0.0),
            NumberOrText::Text(s) => s.trim().parse().map_err(E::custom),
        }
    }
}

pub fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumberOrText>::deserialize(deserializer)?.map_or(Ok(0.0), NumberOrText::as_f64)
}

pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(raw) => raw.as_f64::<D::Error>()?,
        None => 0.0,
    };
    if value < 0.0 || value > u32::MAX as f64 || value.fract() != 0.0 {
        return Err(de::Error::custom(format!("invalid quantity: {value}")));
    }
    Ok(value as u32)
}

pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Int(secs)) => Ok(Utc.timestamp_opt(secs, 0).single()),
        Some(NumberOrText::Float(secs)) => Ok(Utc.timestamp_opt(secs as i64, 0).single()),
        Some(NumberOrText::Text(text)) => match DateTime::parse_from_rfc3339(text.trim()) {
            Ok(dt) => Ok(Some(dt.with_timezone(&Utc))),
            Err(e) => {
                warn!(value = %text, error = %e, "Ignoring unreadable timestamp");
                Ok(None)
            }
        },
    }
}

/// Rounds to whole cents, the precision totals are stored at.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
