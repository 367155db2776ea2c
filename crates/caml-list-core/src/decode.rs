//! Wire-string → typed-value decoding.
//!
//! Every field value arrives as a string; the declared [`ObjectType`]
//! selects the decode rule. The dispatch here preserves the legacy
//! service's quirks deliberately: the empty-string pass-through for
//! numerics, the numeric/url-list duality of attachment fields, and the
//! `LookupMulti`/`UserMulti` asymmetry around empty id slots. Callers that
//! depend on those behaviors exist; do not normalize them.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::field_types::ObjectType;
use crate::xml::unescape_entities;

/// Delimiter between the id and value halves of a lookup wire string, and
/// between the entries of a multi-value string.
pub const PAIR_DELIMITER: &str = ";#";

/// Delimiter between the extended segments of a user wire string.
const USER_DELIMITER: &str = ",#";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unparseable integer value: `{0}`")]
    Int(String),
    #[error("unparseable floating-point value: `{0}`")]
    Float(String),
    #[error("unparseable date value: `{0}`")]
    Date(String),
}

/// Reference to an item in another list: the id half drives writes, the
/// value half is display text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lookup {
    pub lookup_id: Option<i64>,
    pub lookup_value: String,
}

impl Lookup {
    /// Builds a lookup from the two wire halves. An id slot that carries no
    /// leading digits yields `None`, mirroring the original's not-a-number
    /// result rather than failing the row.
    pub fn from_wire(id: &str, value: &str) -> Self {
        Self {
            lookup_id: js_parse_int(id),
            lookup_value: value.to_string(),
        }
    }
}

/// A site user. The short wire form carries only the lookup halves; the
/// extended form appends login name, email, SIP address, and title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub lookup_id: Option<i64>,
    pub lookup_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl User {
    pub fn from_wire(id: &str, value: &str) -> Self {
        Self {
            lookup_id: js_parse_int(id),
            lookup_value: value.to_string(),
            login_name: None,
            email: None,
            sip_address: None,
            title: None,
        }
    }

    /// Parses the full wire string, which may carry the extended
    /// comma-delimited form: `"id;#value,#login,#email,#sip,#title"`.
    /// Literal commas inside a segment arrive doubled and are collapsed.
    pub fn from_full_wire(raw: &str) -> Self {
        let segments: Vec<&str> = raw.split(USER_DELIMITER).collect();
        let (id, value) = split_pair(segments[0]);
        let mut user = Self::from_wire(id, value);
        if segments.len() > 1 {
            let unescape = |s: &str| s.replace(",,", ",");
            user.login_name = segments.get(1).map(|s| unescape(s));
            user.email = segments.get(2).map(|s| unescape(s));
            user.sip_address = segments.get(3).map(|s| unescape(s));
            user.title = segments.get(4).map(|s| unescape(s));
        }
        user
    }
}

/// A decoded field value. Serializes untagged so the structural comparison
/// used by the change diff sees the same shape the original serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDateTime),
    Json(serde_json::Value),
    Lookup(Lookup),
    User(User),
    LookupMulti(Vec<Lookup>),
    UserMulti(Vec<User>),
    Choices(Vec<String>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// Decodes a raw wire string according to the field's object type.
///
/// The raw string is entity-unescaped first, unconditionally. Unrecognized
/// object types never reach this function ([`ObjectType::from_tag`] folds
/// them into `Text`), so the default branch is the treat-as-string rule.
pub fn decode(raw: &str, object_type: ObjectType) -> Result<FieldValue, DecodeError> {
    let str_value = unescape_entities(raw);
    match object_type {
        ObjectType::Boolean => Ok(FieldValue::Bool(matches!(
            str_value.as_str(),
            "1" | "True" | "TRUE"
        ))),
        ObjectType::DateTime => decode_date(&str_value),
        ObjectType::Integer | ObjectType::Counter => {
            if str_value.is_empty() {
                // Absent numerics pass through unchanged, not coerced to 0.
                Ok(FieldValue::Text(str_value))
            } else {
                js_parse_int(&str_value)
                    .map(FieldValue::Int)
                    .ok_or(DecodeError::Int(str_value))
            }
        }
        ObjectType::Float | ObjectType::Currency => {
            if str_value.is_empty() {
                Ok(FieldValue::Text(str_value))
            } else {
                js_parse_float(&str_value)
                    .map(FieldValue::Float)
                    .ok_or(DecodeError::Float(str_value))
            }
        }
        ObjectType::Lookup => {
            if str_value.is_empty() {
                Ok(FieldValue::Null)
            } else {
                let (id, value) = split_pair(&str_value);
                Ok(FieldValue::Lookup(Lookup::from_wire(id, value)))
            }
        }
        ObjectType::User => {
            if str_value.is_empty() {
                Ok(FieldValue::Null)
            } else {
                Ok(FieldValue::User(User::from_full_wire(&str_value)))
            }
        }
        ObjectType::LookupMulti => Ok(FieldValue::LookupMulti(decode_lookup_multi(&str_value))),
        ObjectType::UserMulti => Ok(FieldValue::UserMulti(decode_user_multi(&str_value))),
        ObjectType::MultiChoice => Ok(FieldValue::Choices(decode_choices(&str_value))),
        ObjectType::Attachments => decode_attachments(&str_value),
        ObjectType::Json => Ok(decode_json(&str_value)),
        ObjectType::Calculated => decode_calculated(&str_value),
        ObjectType::Text | ObjectType::Note | ObjectType::Choice | ObjectType::Html => {
            Ok(FieldValue::Text(str_value))
        }
    }
}

/// Longest-numeric-prefix integer parse: `"12px"` → 12, `""` → `None`.
/// Mirrors the permissive parse the original relied on for date segments
/// and lookup ids.
fn js_parse_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Longest-valid-prefix float parse.
fn js_parse_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut best = None;
    for (i, c) in s.char_indices() {
        let end = i + c.len_utf8();
        if let Ok(v) = s[..end].parse::<f64>() {
            best = Some(v);
        }
    }
    best
}

fn split_pair(s: &str) -> (&str, &str) {
    match s.split_once(PAIR_DELIMITER) {
        Some((id, value)) => (id, value),
        None => (s, ""),
    }
}

/// Splits `"2014-08-29T14:02:18Z"` (or the space-delimited variant) into
/// numeric parts and constructs a local-time date. UTC correction is the
/// caller's concern; the version codec applies it where the wire is known
/// to carry UTC.
fn decode_date(s: &str) -> Result<FieldValue, DecodeError> {
    if s.is_empty() {
        return Ok(FieldValue::Null);
    }
    let err = || DecodeError::Date(s.to_string());
    let (date_part, time_part) = match s.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => match s.split_once(' ') {
            Some((d, t)) => (d, Some(t)),
            None => (s, None),
        },
    };
    let mut date_segments = date_part.split('-');
    let year = date_segments.next().and_then(js_parse_int).ok_or_else(err)?;
    let month = date_segments.next().and_then(js_parse_int).ok_or_else(err)?;
    let day = date_segments.next().and_then(js_parse_int).ok_or_else(err)?;

    let (hour, minute, second) = match time_part {
        Some(t) => {
            let mut time_segments = t.split(':');
            let hour = time_segments.next().and_then(js_parse_int).unwrap_or(0);
            let minute = time_segments.next().and_then(js_parse_int).unwrap_or(0);
            let second = time_segments
                .next()
                .map(|sec| sec.split('Z').next().unwrap_or(""))
                .and_then(js_parse_int)
                .unwrap_or(0);
            (hour, minute, second)
        }
        None => (0, 0, 0),
    };

    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|d| d.and_hms_opt(hour as u32, minute as u32, second as u32))
        .map(FieldValue::Date)
        .ok_or_else(err)
}

fn decode_lookup_multi(s: &str) -> Vec<Lookup> {
    let tokens: Vec<&str> = s.split(PAIR_DELIMITER).collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let id = tokens[i];
        // An empty id slot means a stray delimiter, not an entry.
        if !id.is_empty() {
            let value = tokens.get(i + 1).copied().unwrap_or("");
            out.push(Lookup::from_wire(id, value));
        }
        i += 2;
    }
    out
}

fn decode_user_multi(s: &str) -> Vec<User> {
    // Unlike the lookup walk above, empty id slots are NOT skipped here.
    // The asymmetry is load-bearing for existing consumers of the wire.
    let tokens: Vec<&str> = s.split(PAIR_DELIMITER).collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let id = tokens[i];
        let value = tokens.get(i + 1).copied().unwrap_or("");
        out.push(User::from_wire(id, value));
        i += 2;
    }
    out
}

fn decode_choices(s: &str) -> Vec<String> {
    s.split(PAIR_DELIMITER)
        .filter(|seg| !seg.is_empty())
        .map(str::to_string)
        .collect()
}

/// Attachment fields are numeric when the row was fetched without expansion
/// (a count of attachments) and a delimited url list when expanded.
fn decode_attachments(s: &str) -> Result<FieldValue, DecodeError> {
    if !s.is_empty() {
        if let Ok(count) = s.parse::<i64>() {
            if count > 0 {
                return Ok(FieldValue::Int(count));
            }
            return Ok(FieldValue::Text(String::new()));
        }
    }
    Ok(FieldValue::Choices(decode_choices(s)))
}

/// Malformed JSON degrades to null instead of failing the row; one bad
/// field must not abort a batch parse.
fn decode_json(s: &str) -> FieldValue {
    match serde_json::from_str::<serde_json::Value>(s) {
        Ok(v) => FieldValue::Json(v),
        Err(error) => {
            warn!(%error, raw = s, "discarding unparseable JSON field value");
            FieldValue::Null
        }
    }
}

/// Calculated columns tag their value with the inner type:
/// `"float;#426.50"`. The inner value is decoded recursively.
fn decode_calculated(s: &str) -> Result<FieldValue, DecodeError> {
    if s.is_empty() {
        return Ok(FieldValue::Null);
    }
    let (inner_tag, inner_value) = split_pair(s);
    decode(inner_value, ObjectType::from_tag(inner_tag))
}
