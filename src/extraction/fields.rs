//! Canonical personal-data fields and normalization.
//!
//! AI providers return heterogeneous field names (`name`, `nombre`,
//! `full_name`, …); OCR exposes its own detected-field candidates. Both are
//! mapped onto one canonical field set here, and the expiry flag is derived
//! by comparing any detected validity date against today.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::AiExtraction;

/// Canonical field set produced by AI extraction after normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiFieldSet {
    pub full_name: Option<String>,
    pub curp: Option<String>,
    pub passport_number: Option<String>,
    pub ine_document_number: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub address: Option<String>,
    pub expiry_date: Option<String>,
}

/// Field candidates detected by OCR. `validity` carries the expiry/validity
/// date as printed or as recovered from the machine-readable zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedFields {
    pub full_name: Option<String>,
    pub curp: Option<String>,
    pub passport_number: Option<String>,
    pub ine_document_number: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub address: Option<String>,
    pub validity: Option<String>,
}

/// Provider aliases for each canonical field, compared case-insensitively
/// after trimming `-`/`.` and collapsing spaces to `_`.
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    (
        "full_name",
        &["full_name", "fullname", "name", "nombre", "nombre_completo"],
    ),
    ("curp", &["curp", "national_id", "clave_unica"]),
    (
        "passport_number",
        &["passport_number", "passport_no", "passport", "numero_pasaporte"],
    ),
    (
        "ine_document_number",
        &[
            "ine_document_number",
            "document_number",
            "documento",
            "numero_documento",
            "ocr_number",
            "ine_number",
        ],
    ),
    (
        "birth_date",
        &["birth_date", "date_of_birth", "birthdate", "dob", "fecha_nacimiento"],
    ),
    ("gender", &["gender", "sex", "sexo"]),
    ("nationality", &["nationality", "nacionalidad"]),
    ("address", &["address", "domicilio", "direccion"]),
    (
        "expiry_date",
        &[
            "expiry_date",
            "expiration_date",
            "date_of_expiry",
            "valid_until",
            "vigencia",
        ],
    ),
];

fn canonical_key(provider_key: &str) -> Option<&'static str> {
    let needle = provider_key
        .trim()
        .to_lowercase()
        .replace([' ', '-', '.'], "_");
    FIELD_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&needle.as_str()))
        .map(|(canonical, _)| *canonical)
}

fn value_to_string(value: &serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() || text.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(text)
    }
}

/// Map a provider's raw field map onto the canonical field set.
///
/// Unknown keys are ignored; the first alias match wins per field.
pub fn normalize_ai_fields(extraction: &AiExtraction) -> AiFieldSet {
    let mut fields = AiFieldSet::default();
    for (key, value) in &extraction.fields {
        let Some(canonical) = canonical_key(key) else {
            continue;
        };
        let Some(text) = value_to_string(value) else {
            continue;
        };
        let slot = match canonical {
            "full_name" => &mut fields.full_name,
            "curp" => &mut fields.curp,
            "passport_number" => &mut fields.passport_number,
            "ine_document_number" => &mut fields.ine_document_number,
            "birth_date" => &mut fields.birth_date,
            "gender" => &mut fields.gender,
            "nationality" => &mut fields.nationality,
            "address" => &mut fields.address,
            "expiry_date" => &mut fields.expiry_date,
            _ => unreachable!("canonical_key returns only known fields"),
        };
        if slot.is_none() {
            *slot = Some(text);
        }
    }
    fields
}

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());
static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})[/-](\d{2})[/-](\d{4})$").unwrap());
static MRZ_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})(\d{2})(\d{2})$").unwrap());
static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").unwrap());

/// Parse the validity formats seen across documents:
/// ISO (`2031-06-30`), day-first (`30/06/2031`), MRZ (`310630`), and the
/// bare year printed on some national IDs (`2031`, read as Dec 31).
pub fn parse_validity_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Some(caps) = ISO_DATE.captures(text) {
        return NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
    }
    if let Some(caps) = SLASH_DATE.captures(text) {
        return NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[2].parse().ok()?,
            caps[1].parse().ok()?,
        );
    }
    if let Some(caps) = MRZ_DATE.captures(text) {
        let yy: i32 = caps[1].parse().ok()?;
        // MRZ expiry dates are two-digit years; <50 reads as 20xx.
        let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
        return NaiveDate::from_ymd_opt(year, caps[2].parse().ok()?, caps[3].parse().ok()?);
    }
    if let Some(caps) = BARE_YEAR.captures(text) {
        return NaiveDate::from_ymd_opt(caps[1].parse().ok()?, 12, 31);
    }
    None
}

/// Whether a detected validity date lies strictly before `today`.
/// `None` when the text doesn't parse as a date.
pub fn derive_is_expired(validity: Option<&str>, today: NaiveDate) -> Option<bool> {
    let date = parse_validity_date(validity?)?;
    Some(date < today)
}

/// Convenience: expiry against the system clock.
pub fn is_expired_today(validity: Option<&str>) -> Option<bool> {
    derive_is_expired(validity, chrono::Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn extraction_with(pairs: &[(&str, &str)]) -> AiExtraction {
        let mut fields = serde_json::Map::new();
        for (k, v) in pairs {
            fields.insert(k.to_string(), serde_json::Value::String(v.to_string()));
        }
        AiExtraction {
            fields,
            model: "stub".into(),
        }
    }

    #[test]
    fn normalizes_spanish_provider_names() {
        let raw = extraction_with(&[
            ("nombre", "MARIA GUADALUPE LOPEZ"),
            ("curp", "LOGM900101MDFPRR08"),
            ("domicilio", "AV SIEMPRE VIVA 742"),
            ("vigencia", "2031"),
            ("sexo", "M"),
        ]);
        let fields = normalize_ai_fields(&raw);
        assert_eq!(fields.full_name.as_deref(), Some("MARIA GUADALUPE LOPEZ"));
        assert_eq!(fields.curp.as_deref(), Some("LOGM900101MDFPRR08"));
        assert_eq!(fields.address.as_deref(), Some("AV SIEMPRE VIVA 742"));
        assert_eq!(fields.expiry_date.as_deref(), Some("2031"));
        assert_eq!(fields.gender.as_deref(), Some("M"));
    }

    #[test]
    fn unknown_keys_are_ignored_and_first_alias_wins() {
        let raw = extraction_with(&[
            ("full_name", "FIRST"),
            ("name", "SECOND"),
            ("totally_unrelated", "x"),
        ]);
        let fields = normalize_ai_fields(&raw);
        assert_eq!(fields.full_name.as_deref(), Some("FIRST"));
    }

    #[test]
    fn empty_and_null_values_become_none() {
        let mut map = serde_json::Map::new();
        map.insert("name".into(), serde_json::Value::String("  ".into()));
        map.insert("curp".into(), serde_json::Value::Null);
        map.insert(
            "document_number".into(),
            serde_json::Value::String("null".into()),
        );
        let fields = normalize_ai_fields(&AiExtraction {
            fields: map,
            model: "stub".into(),
        });
        assert!(fields.full_name.is_none());
        assert!(fields.curp.is_none());
        assert!(fields.ine_document_number.is_none());
    }

    #[test]
    fn mixed_case_and_spaced_keys_normalize() {
        let raw = extraction_with(&[("Date Of Birth", "1990-01-01"), ("Passport-No", "G1234")]);
        let fields = normalize_ai_fields(&raw);
        assert_eq!(fields.birth_date.as_deref(), Some("1990-01-01"));
        assert_eq!(fields.passport_number.as_deref(), Some("G1234"));
    }

    #[test]
    fn parses_all_validity_formats() {
        let expected = NaiveDate::from_ymd_opt(2031, 6, 30).unwrap();
        assert_eq!(parse_validity_date("2031-06-30"), Some(expected));
        assert_eq!(parse_validity_date("30/06/2031"), Some(expected));
        assert_eq!(parse_validity_date("310630"), Some(expected));
        assert_eq!(
            parse_validity_date("2031"),
            NaiveDate::from_ymd_opt(2031, 12, 31)
        );
        assert_eq!(parse_validity_date("junk"), None);
    }

    #[test]
    fn mrz_century_pivot() {
        assert_eq!(
            parse_validity_date("490101").unwrap().year(),
            2049,
        );
        assert_eq!(parse_validity_date("990101").unwrap().year(), 1999);
    }

    #[test]
    fn expiry_compared_against_given_day() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(derive_is_expired(Some("2020-01-01"), today), Some(true));
        assert_eq!(derive_is_expired(Some("2031-01-01"), today), Some(false));
        assert_eq!(derive_is_expired(Some("2026-08-30"), today), Some(false));
        assert_eq!(derive_is_expired(Some("not a date"), today), None);
        assert_eq!(derive_is_expired(None, today), None);
    }
}
