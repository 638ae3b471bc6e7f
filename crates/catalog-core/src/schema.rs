//! Per-resource write rules: allow-lists, required fields, defaults and
//! field checks.
//!
//! Resources differ only in the data held by a [`ResourceSchema`]; the logic
//! that applies it is shared.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::{
  Error, Result,
  projection::{is_falsy, project},
  store::Document,
};

/// A check applied to a field whenever it is present in a write.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
  pub field: &'static str,
  pub check: fn(&Value) -> Result<(), String>,
}

/// Value substituted on create when an optional field is absent or falsy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
  Zero,
  EmptyString,
  /// The creation time as an RFC 3339 string, e.g. `2024-03-01T12:30:05.123Z`.
  Now,
}

impl FieldDefault {
  fn value(self, now: DateTime<Utc>) -> Value {
    match self {
      Self::Zero => Value::from(0),
      Self::EmptyString => Value::from(""),
      Self::Now => Value::from(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    }
  }
}

#[derive(Debug)]
pub struct ResourceSchema {
  /// Store collection name.
  pub collection: &'static str,
  /// Singular noun used in messages.
  pub label:      &'static str,
  /// Allow-list for create and update.
  pub fields:     &'static [&'static str],
  pub required:   &'static [&'static str],
  pub defaults:   &'static [(&'static str, FieldDefault)],
  pub rules:      &'static [FieldRule],
}

pub static USERS: ResourceSchema = ResourceSchema {
  collection: "users",
  label:      "user",
  fields:     &["firstName", "lastName", "email", "favoriteColor", "birthday"],
  required:   &["firstName", "lastName", "email"],
  defaults:   &[],
  rules:      &[],
};

pub static PRODUCTS: ResourceSchema = ResourceSchema {
  collection: "products",
  label:      "product",
  fields:     &[
    "name",
    "description",
    "price",
    "category",
    "stock",
    "manufacturer",
    "releaseDate",
  ],
  required:   &["name", "description", "price", "category"],
  defaults:   &[
    ("stock", FieldDefault::Zero),
    ("manufacturer", FieldDefault::EmptyString),
    ("releaseDate", FieldDefault::Now),
  ],
  rules:      &[FieldRule { field: "price", check: non_negative_number }],
};

/// `price` must be a JSON number no smaller than zero.
pub fn non_negative_number(value: &Value) -> Result<(), String> {
  match value.as_f64() {
    Some(n) if n >= 0.0 => Ok(()),
    _ => Err("must be a non-negative number".to_owned()),
  }
}

impl ResourceSchema {
  /// Build the document to insert from a raw create payload.
  pub fn prepare_insert(&self, input: &Document, now: DateTime<Utc>) -> Result<Document> {
    let missing: Vec<&str> = self
      .required
      .iter()
      .copied()
      .filter(|field| input.get(*field).is_none_or(is_falsy))
      .collect();
    if !missing.is_empty() {
      return Err(Error::Validation(format!(
        "missing required field(s): {}",
        missing.join(", ")
      )));
    }

    let mut doc = project(self.fields, input);
    self.check_rules(&doc)?;

    for &(field, default) in self.defaults {
      if doc.get(field).is_none_or(is_falsy) {
        doc.insert(field.to_owned(), default.value(now));
      }
    }
    Ok(doc)
  }

  /// Build the partial document to merge from a raw update payload.
  ///
  /// Fails if nothing recognised remains after projection.
  pub fn prepare_update(&self, input: &Document) -> Result<Document> {
    let set = project(self.fields, input);
    self.check_rules(&set)?;
    if set.is_empty() {
      return Err(Error::Validation("no fields to update".to_owned()));
    }
    Ok(set)
  }

  fn check_rules(&self, doc: &Document) -> Result<()> {
    for rule in self.rules {
      if let Some(value) = doc.get(rule.field) {
        (rule.check)(value)
          .map_err(|reason| Error::Validation(format!("{} {reason}", rule.field)))?;
      }
    }
    Ok(())
  }
}
