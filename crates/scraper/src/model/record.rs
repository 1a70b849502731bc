// ABOUTME: The Record trait: a closed, declared field set with bulk construction and flattening.
// ABOUTME: Unknown field names fail with ErrorCode::UnknownField at construction, read and write.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, ScrapeError};

/// A fixed-schema record.
///
/// `FIELDS` lists the serialized (camelCase) field names and is the
/// authority for which names `new_from_array`, `get` and `set` accept.
pub trait Record: Serialize + DeserializeOwned + Default {
    const NAME: &'static str;
    const FIELDS: &'static [&'static str];

    /// Builds a record from a plain mapping. Absent fields take their
    /// defaults; an undeclared key or a wrongly typed value fails.
    fn new_from_array(data: Map<String, Value>) -> Result<Self> {
        let mut plain = Self::default().to_array();
        for (key, value) in data {
            check_field::<Self>(&key, "Record::new_from_array")?;
            plain.insert(key, value);
        }
        from_plain(plain, "Record::new_from_array")
    }

    /// [`Record::new_from_array`] from any JSON value; only objects are accepted.
    fn new_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::new_from_array(map),
            other => Err(ScrapeError::invalid_input(
                Self::NAME,
                "Record::new_from_value",
                Some(anyhow::anyhow!("expected an object, got {}", other)),
            )),
        }
    }

    /// Flattens the record, nested records and collections included, into a
    /// plain mapping keyed by field name.
    fn to_array(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    fn get(&self, field: &str) -> Result<Value> {
        check_field::<Self>(field, "Record::get")?;
        Ok(self.to_array().remove(field).unwrap_or(Value::Null))
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        check_field::<Self>(field, "Record::set")?;
        let mut plain = self.to_array();
        plain.insert(field.to_string(), value);
        *self = from_plain(plain, "Record::set")?;
        Ok(())
    }
}

fn check_field<R: Record>(field: &str, op: &str) -> Result<()> {
    if R::FIELDS.contains(&field) {
        Ok(())
    } else {
        Err(ScrapeError::unknown_field(R::NAME, field, op))
    }
}

fn from_plain<R: Record>(plain: Map<String, Value>, op: &str) -> Result<R> {
    serde_json::from_value(Value::Object(plain))
        .map_err(|e| ScrapeError::invalid_input(R::NAME, op, Some(e.into())))
}
