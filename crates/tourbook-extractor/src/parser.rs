//! Parse LLM output into typed field groups
//!
//! Decoding runs in three steps:
//!
//! 1. locate the JSON (markdown fences stripped, surrounding prose skipped)
//! 2. strict `serde` decode into the expected shape
//! 3. on failure, a normalization pass (bare arrays unwrapped or wrapped,
//!    numbers coerced to strings, unknown keys dropped) and a second decode
//!
//! Anything still unusable becomes [`Outcome::Degraded`].

use crate::error::DecodeError;
use crate::types::{Outcome, ShowFields};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tourbook_domain::{
    confidence_from_json, normalize_date, ContactFields, CoreFields, DealFields, FieldValue,
    VenueFields,
};
use tracing::debug;

const SHOW_KEYS: &[&str] = &[
    "artist",
    "title",
    "date",
    "start_time",
    "door_time",
    "status",
    "fee",
    "currency",
    "deal_type",
    "ticket_price",
    "venue_name",
    "city",
];

const VENUE_KEYS: &[&str] = &["name", "address", "city", "region", "country", "capacity"];

const CONTACT_KEYS: &[&str] = &["name", "email", "phone", "role"];

const NULL_WORDS: &[&str] = &["null", "none", "n/a", "unknown", "tbd"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ShowWire {
    artist: Option<String>,
    title: Option<String>,
    date: Option<String>,
    start_time: Option<String>,
    door_time: Option<String>,
    status: Option<String>,
    fee: Option<String>,
    currency: Option<String>,
    deal_type: Option<String>,
    ticket_price: Option<String>,
    venue_name: Option<String>,
    city: Option<String>,
    confidence: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ShowsWire {
    shows: Vec<ShowWire>,
    confidence: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct VenueWire {
    name: Option<String>,
    address: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
    capacity: Option<String>,
    confidence: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContactWire {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ContactsWire {
    contacts: Vec<ContactWire>,
    confidence: Option<Value>,
}

/// Decode a show-group response
pub fn decode_shows(response: &str) -> Outcome<Vec<ShowFields>> {
    match parse_value(response).and_then(|v| decode_with::<ShowsWire>(v, normalize_shows)) {
        Ok(wire) => {
            let confidence = confidence_from_json(wire.confidence.as_ref());
            let shows = wire
                .shows
                .into_iter()
                .map(|show| show_fields(show, confidence))
                .filter(|show| !is_blank_show(show))
                .collect();
            Outcome::Decoded {
                fields: shows,
                confidence,
            }
        }
        Err(e) => degraded(e),
    }
}

/// Decode a venue-group response
pub fn decode_venue(response: &str) -> Outcome<VenueFields> {
    match parse_value(response).and_then(|v| decode_with::<VenueWire>(v, normalize_venue)) {
        Ok(wire) => {
            let c = confidence_from_json(wire.confidence.as_ref());
            Outcome::Decoded {
                fields: VenueFields {
                    name: text(wire.name, c),
                    address: text(wire.address, c),
                    city: text(wire.city, c),
                    region: text(wire.region, c),
                    country: text(wire.country, c),
                    capacity: text(wire.capacity, c),
                },
                confidence: c,
            }
        }
        Err(e) => degraded(e),
    }
}

/// Decode a contacts-group response
pub fn decode_contacts(response: &str) -> Outcome<Vec<ContactFields>> {
    match parse_value(response).and_then(|v| decode_with::<ContactsWire>(v, normalize_contacts)) {
        Ok(wire) => {
            let c = confidence_from_json(wire.confidence.as_ref());
            let contacts = wire
                .contacts
                .into_iter()
                .map(|contact| ContactFields {
                    name: text(contact.name, c),
                    email: text(contact.email, c),
                    phone: text(contact.phone, c),
                    role: text(contact.role, c),
                })
                .filter(|contact| {
                    contact.name.is_present()
                        || contact.email.is_present()
                        || contact.phone.is_present()
                })
                .collect();
            Outcome::Decoded {
                fields: contacts,
                confidence: c,
            }
        }
        Err(e) => degraded(e),
    }
}

fn degraded<T>(e: DecodeError) -> Outcome<T> {
    debug!(error = %e, "Model output could not be decoded");
    Outcome::Degraded { reason: e.into() }
}

/// Extract JSON from response, handling markdown code blocks and prose
pub fn extract_json(response: &str) -> Result<&str, DecodeError> {
    let mut trimmed = response.trim();

    // Check if wrapped in markdown code block
    if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip the language tag line and the closing fence
        let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        trimmed = body.trim_end().trim_end_matches("```").trim();
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if serde_json::from_str::<Value>(trimmed).is_ok() {
            return Ok(trimmed);
        }
    }

    outermost_json(trimmed).ok_or(DecodeError::NoJson)
}

/// First balanced `{...}` or `[...]` span that parses as JSON
fn outermost_json(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find(['{', '[']) {
        let start = search_from + offset;
        if let Some(end) = balanced_end(&text[start..]) {
            let candidate = &text[start..start + end];
            if serde_json::from_str::<Value>(candidate).is_ok() {
                return Some(candidate);
            }
        }
        search_from = start + 1;
    }
    None
}

/// Byte length of the bracketed value at the start of `text`
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_value(response: &str) -> Result<Value, DecodeError> {
    let json = extract_json(response)?;
    serde_json::from_str(json).map_err(|_| DecodeError::NoJson)
}

fn decode_with<T: DeserializeOwned>(
    value: Value,
    normalize: fn(Value) -> Result<Value, DecodeError>,
) -> Result<T, DecodeError> {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => Ok(decoded),
        Err(strict) => {
            debug!(error = %strict, "Strict decode failed, normalizing");
            let normalized = normalize(value)?;
            serde_json::from_value(normalized).map_err(|e| DecodeError::Shape(e.to_string()))
        }
    }
}

/// Coerce a value into something a `Option<String>` field accepts
fn normalize_scalar(value: Value) -> Value {
    match value {
        Value::String(s) if is_null_word(&s) => Value::Null,
        Value::String(s) => Value::String(s),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Array(items) => items
            .into_iter()
            .next()
            .map(normalize_scalar)
            .unwrap_or(Value::Null),
        Value::Object(_) | Value::Null => Value::Null,
    }
}

/// Keep only `keys` (plus `confidence`), each coerced to a scalar
fn normalize_record(value: Value, keys: &[&str]) -> Option<Map<String, Value>> {
    let map = match value {
        Value::Object(map) => map,
        Value::Array(items) => match items.into_iter().next()? {
            Value::Object(map) => map,
            _ => return None,
        },
        _ => return None,
    };

    Some(
        map.into_iter()
            .filter_map(|(k, v)| {
                if k == "confidence" {
                    Some((k, v))
                } else if keys.contains(&k.as_str()) {
                    Some((k, normalize_scalar(v)))
                } else {
                    None
                }
            })
            .collect(),
    )
}

fn normalize_list(
    value: Value,
    list_key: &str,
    item_keys: &[&str],
) -> Result<Value, DecodeError> {
    let (items, confidence) = match value {
        Value::Array(items) => (items, None),
        Value::Object(mut map) => {
            let confidence = map.remove("confidence");
            match map.remove(list_key) {
                Some(Value::Array(items)) => (items, confidence),
                Some(Value::Object(single)) => (vec![Value::Object(single)], confidence),
                Some(Value::Null) => (Vec::new(), confidence),
                Some(other) => {
                    return Err(DecodeError::Shape(format!(
                        "\"{}\" is {}",
                        list_key,
                        json_type(&other)
                    )))
                }
                None if item_keys.iter().any(|k| map.contains_key(*k)) => {
                    (vec![Value::Object(map)], confidence)
                }
                None => {
                    return Err(DecodeError::Shape(format!("missing \"{}\"", list_key)));
                }
            }
        }
        other => {
            return Err(DecodeError::Shape(format!(
                "expected object or array, got {}",
                json_type(&other)
            )))
        }
    };

    let items: Vec<Value> = items
        .into_iter()
        .filter_map(|item| normalize_record(item, item_keys))
        .map(Value::Object)
        .collect();

    let mut out = Map::new();
    out.insert(list_key.to_string(), Value::Array(items));
    if let Some(confidence) = confidence {
        out.insert("confidence".to_string(), confidence);
    }
    Ok(Value::Object(out))
}

fn normalize_shows(value: Value) -> Result<Value, DecodeError> {
    normalize_list(value, "shows", SHOW_KEYS)
}

fn normalize_contacts(value: Value) -> Result<Value, DecodeError> {
    normalize_list(value, "contacts", CONTACT_KEYS)
}

fn normalize_venue(value: Value) -> Result<Value, DecodeError> {
    let value = match value {
        // {"venue": {...}}
        Value::Object(mut map) if !VENUE_KEYS.iter().any(|k| map.contains_key(*k)) => {
            let confidence = map.remove("confidence");
            match map.remove("venue") {
                Some(Value::Object(mut inner)) => {
                    if let Some(c) = confidence {
                        inner.entry("confidence").or_insert(c);
                    }
                    Value::Object(inner)
                }
                Some(other) => other,
                None => Value::Object(map),
            }
        }
        // An empty array means no venue was found
        Value::Array(items) if items.is_empty() => return Ok(Value::Object(Map::new())),
        other => other,
    };

    match normalize_record(value, VENUE_KEYS) {
        Some(map) => Ok(Value::Object(map)),
        None => Err(DecodeError::Shape("expected a venue object".to_string())),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn is_null_word(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || NULL_WORDS.iter().any(|w| s.eq_ignore_ascii_case(w))
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !is_null_word(v))
}

fn text(value: Option<String>, confidence: f64) -> FieldValue<String> {
    FieldValue::text(clean(value), confidence)
}

fn show_fields(show: ShowWire, document_confidence: f64) -> ShowFields {
    let c = show
        .confidence
        .as_ref()
        .map(|v| confidence_from_json(Some(v)))
        .unwrap_or(document_confidence);

    let raw_fee = clean(show.fee);
    let currency = clean(show.currency).or_else(|| raw_fee.as_deref().and_then(currency_from_symbol));
    let date = clean(show.date).and_then(|d| normalize_date(&d));

    ShowFields {
        core: CoreFields {
            artist: text(show.artist, c),
            title: text(show.title, c),
            date: FieldValue::new(date, c),
            start_time: text(show.start_time, c),
            door_time: text(show.door_time, c),
            status: text(show.status, c),
        },
        deal: DealFields {
            fee: FieldValue::new(raw_fee.as_deref().and_then(canonical_amount), c),
            currency: FieldValue::new(currency, c),
            deal_type: text(show.deal_type, c),
            ticket_price: text(show.ticket_price, c),
        },
        venue_name: text(show.venue_name, c),
        city: text(show.city, c),
    }
}

fn is_blank_show(show: &ShowFields) -> bool {
    let core = &show.core;
    let deal = &show.deal;
    ![
        &core.artist,
        &core.title,
        &core.date,
        &core.start_time,
        &core.door_time,
        &core.status,
        &deal.fee,
        &deal.deal_type,
        &deal.ticket_price,
        &show.venue_name,
        &show.city,
    ]
    .iter()
    .any(|f| f.is_present())
}

/// Canonical plain-decimal form of a money amount
///
/// `"$5,000"` → `"5000"`, `"2,500.50 USD"` → `"2500.50"`, `"5.000,00 EUR"` →
/// `"5000"`. Only the first number counts. Returns `None` when there is no
/// number, when that number is a percentage, or when its separators are
/// ambiguous.
pub fn canonical_amount(raw: &str) -> Option<String> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let tail = &raw[start..];
    let end = tail
        .find(|c: char| !(c.is_ascii_digit() || c == ',' || c == '.'))
        .unwrap_or(tail.len());
    if is_percentage(&tail[end..]) {
        return None;
    }

    let value = plain_decimal(tail[..end].trim_end_matches([',', '.']))?;
    if !value.is_finite() {
        return None;
    }

    if value.fract() == 0.0 {
        Some(format!("{:.0}", value))
    } else {
        Some(format!("{:.2}", value))
    }
}

fn is_percentage(after: &str) -> bool {
    let after = after.trim_start();
    after.starts_with('%')
        || after
            .get(..7)
            .is_some_and(|word| word.eq_ignore_ascii_case("percent"))
}

/// Parse digits with `,`/`.` separators in either US or European style
fn plain_decimal(token: &str) -> Option<f64> {
    let (integer, fraction) = match decimal_separator(token)? {
        Some(sep) => {
            let at = token.rfind(sep)?;
            (&token[..at], Some(&token[at + 1..]))
        }
        None => (token, None),
    };

    let groups: Vec<&str> = integer.split([',', '.']).collect();
    if let [first, rest @ ..] = groups.as_slice() {
        let well_grouped = !first.is_empty() && first.len() <= 3 && rest.iter().all(|g| g.len() == 3);
        if !rest.is_empty() && !well_grouped {
            return None;
        }
    }
    let digits = groups.concat();
    if digits.is_empty() {
        return None;
    }

    match fraction {
        Some(fraction) if (1..=2).contains(&fraction.len()) => {
            format!("{}.{}", digits, fraction).parse().ok()
        }
        Some(_) => None,
        None => digits.parse().ok(),
    }
}

/// Which separator marks decimals: `Some(None)` for none, `None` if ambiguous
fn decimal_separator(token: &str) -> Option<Option<char>> {
    let commas = token.matches(',').count();
    let dots = token.matches('.').count();
    match (commas, dots) {
        (0, 0) => Some(None),
        (1, 0) | (0, 1) => {
            let sep = if commas == 1 { ',' } else { '.' };
            let after = token.len() - token.find(sep)? - 1;
            match after {
                1 | 2 => Some(Some(sep)),
                3 => Some(None),
                _ => None,
            }
        }
        (_, 0) | (0, _) => Some(None),
        _ => {
            let sep = if token.rfind(',') > token.rfind('.') { ',' } else { '.' };
            (token.matches(sep).count() == 1).then_some(Some(sep))
        }
    }
}

pub(crate) fn currency_from_symbol(raw: &str) -> Option<String> {
    let code = if raw.contains('$') {
        "USD"
    } else if raw.contains('€') {
        "EUR"
    } else if raw.contains('£') {
        "GBP"
    } else {
        return None;
    };
    Some(code.to_string())
}
