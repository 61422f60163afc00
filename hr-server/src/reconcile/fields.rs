//! Field aliasing for externally sourced records
//!
//! Payroll exports name the same field differently depending on the
//! source (plain JSON, OData catalogs). Each logical field has an explicit
//! ordered list of candidate names; the first truthy value wins.

use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Ordered candidate names of one logical field
pub type Aliases = &'static [&'static str];

pub const EXTERNAL_ID: Aliases = &["id", "external_id", "Ref_Key"];
pub const NAME: Aliases = &["name", "Наименование", "Description"];
pub const PARENT: Aliases = &["parent_id", "Родитель_Key", "parent_external_id"];
pub const DEPARTMENT_REF: Aliases = &["department_id", "Подразделение_Key", "Подразделение"];
pub const POSITION_REF: Aliases = &["position_id", "Должность_Key", "Должность"];
pub const DEPARTMENT_LABEL: Aliases = &["department", "Подразделение"];
pub const POSITION_LABEL: Aliases = &["position", "Должность"];
pub const MANAGER_REF: Aliases = &["manager_id", "Руководитель_Key"];
pub const FULL_NAME: Aliases = &["full_name", "ФИО", "Наименование", "Description", "name"];
pub const BIRTHDAY: Aliases = &["birthday", "ДатаРождения"];
pub const PHONE: Aliases = &["phone", "Телефон", "internal_phone"];
pub const EMAIL: Aliases = &["email", "Email"];
pub const DISMISSED: Aliases = &["dismissed", "Уволен"];
pub const NEW_HIRE: Aliases = &["new_hire", "НовыйПрием"];
pub const EFFECTIVE_DATE: Aliases = &[
    "effective_date",
    "hire_date",
    "fire_date",
    "ДатаПриема",
    "ДатаУвольнения",
];

/// Key of a nested OData object (`$expand`)
const NESTED_KEY: &str = "Ref_Key";

/// OData placeholder for "no reference"
const EMPTY_REF: &str = "00000000-0000-0000-0000-000000000000";

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First truthy value among `aliases`
pub fn lookup<'a>(record: &'a Map<String, Value>, aliases: Aliases) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|name| record.get(*name))
        .find(|v| is_truthy(v))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Text value. Numbers are rendered, objects and arrays are skipped.
pub fn text(record: &Map<String, Value>, aliases: Aliases) -> Option<String> {
    aliases
        .iter()
        .filter_map(|name| record.get(*name))
        .filter(|v| is_truthy(v))
        .find_map(scalar_text)
}

/// Reference key: a scalar, or a nested object carrying `Ref_Key`
pub fn reference(record: &Map<String, Value>, aliases: Aliases) -> Option<String> {
    aliases
        .iter()
        .filter_map(|name| record.get(*name))
        .filter(|v| is_truthy(v))
        .find_map(|v| match v {
            Value::Object(nested) => nested.get(NESTED_KEY).and_then(scalar_text),
            other => scalar_text(other),
        })
        .filter(|key| key != EMPTY_REF)
}

/// Human-readable label: a plain string, or a nested object's name
pub fn label(record: &Map<String, Value>, aliases: Aliases) -> Option<String> {
    aliases
        .iter()
        .filter_map(|name| record.get(*name))
        .filter(|v| is_truthy(v))
        .find_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(nested) => text(nested, NAME),
            _ => None,
        })
}

pub fn flag(record: &Map<String, Value>, aliases: Aliases) -> bool {
    lookup(record, aliases).is_some()
}

/// Parse `YYYY-MM-DD`, `DD.MM.YYYY` or `YYYYMMDD`, ignoring any time part
/// after `T` or a space. Blank input is `Ok(None)`.
pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = raw.trim();
    let day = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or_default();
    if day.is_empty() {
        return Ok(None);
    }
    ["%Y-%m-%d", "%d.%m.%Y", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
        .map(Some)
        .ok_or_else(|| format!("unrecognized date '{}'", trimmed))
}

/// Date field; a present but unparseable value is an error
pub fn date(record: &Map<String, Value>, aliases: Aliases) -> Result<Option<NaiveDate>, String> {
    match text(record, aliases) {
        Some(raw) => parse_date(&raw),
        None => Ok(None),
    }
}
