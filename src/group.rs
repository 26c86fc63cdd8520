//! Partitions [`Document`]s into buckets keyed by the value(s) of a
//! frontmatter attribute. This is the `{value: [documents]}` half of the
//! plugins; turning buckets into pages lives in [`crate::page`].

use crate::document::Document;
use log::debug;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Documents grouped by attribute value. Buckets iterate in key order and
/// each bucket preserves the input order of its documents.
pub type Buckets<'a> = BTreeMap<String, Vec<&'a Document>>;

/// Groups `documents` by the frontmatter attribute `key`. Given three
/// documents A1, A2 and S1 whose `series` attributes are `A`, `A` and `S`,
/// grouping by `series` yields `{"A": [A1, A2], "S": [S1]}`.
///
/// * Documents without `key`, or whose value is null, are skipped.
/// * A list value puts the document into the bucket of each element. A value
///   repeated within the list still puts the document into that bucket once.
/// * Strings, numbers and booleans are keyed by their textual form. Mappings
///   can't be keyed and are skipped.
pub fn group<'a>(documents: &'a [Document], key: &str) -> Buckets<'a> {
    let mut buckets = Buckets::new();
    for document in documents {
        match document.get(key) {
            None | Some(Value::Null) => {
                debug!("Skipping `{}`: no `{}`", document.title(), key)
            }
            Some(Value::Sequence(values)) => {
                for value in values {
                    insert(&mut buckets, key, value, document);
                }
            }
            Some(value) => insert(&mut buckets, key, value, document),
        }
    }
    buckets
}

fn insert<'a>(buckets: &mut Buckets<'a>, key: &str, value: &Value, document: &'a Document) {
    let name = match bucket_name(value) {
        Some(name) => name,
        None => {
            debug!(
                "Skipping `{}` value {:?} for `{}`: not a scalar",
                key,
                value,
                document.title()
            );
            return;
        }
    };

    let bucket = buckets.entry(name).or_insert_with(Vec::new);
    match bucket.last() {
        Some(last) if std::ptr::eq(*last, document) => {}
        _ => bucket.push(document),
    }
}

/// Returns the bucket name for a scalar YAML value, or `None` for null,
/// sequences and mappings.
pub fn bucket_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
