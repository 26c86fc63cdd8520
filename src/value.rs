//! Conversions into [`Value`]s for templating.

use crate::config::{Config, GroupConfig};
use crate::document::Document;
use crate::group::bucket_name;
use gtmpl::Value;
use std::collections::HashMap;

/// Converts a YAML value into a template [`Value`]. Mapping keys are keyed by
/// their textual form; entries with non-scalar keys are dropped.
pub fn from_yaml(value: &serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Nil,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or(std::f64::NAN))
            }
        }
        serde_yaml::Value::String(s) => s.into(),
        serde_yaml::Value::Sequence(values) => Value::Array(values.iter().map(from_yaml).collect()),
        serde_yaml::Value::Mapping(m) => Value::Object(
            m.iter()
                .filter_map(|(k, v)| bucket_name(k).map(|k| (k, from_yaml(v))))
                .collect(),
        ),
    }
}

impl From<&Document> for Value {
    /// Converts a [`Document`] into a [`Value::Object`] holding its
    /// frontmatter attributes plus `id`, `title` and `body`.
    fn from(d: &Document) -> Value {
        let mut m: HashMap<String, Value> = match from_yaml(&serde_yaml::Value::Mapping(
            d.frontmatter.clone(),
        )) {
            Value::Object(m) => m,
            _ => HashMap::new(),
        };
        m.insert("id".to_owned(), (&d.id).into());
        m.insert("title".to_owned(), d.title().into());
        m.insert("body".to_owned(), (&d.body).into());
        Value::Object(m)
    }
}

impl From<&GroupConfig> for Value {
    /// Converts a [`GroupConfig`] into a [`Value::Object`] with fields
    /// `name`, `layout`, `multiple` and, when set, `permalink`.
    fn from(g: &GroupConfig) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("name".to_owned(), (&g.name).into());
        m.insert("layout".to_owned(), (&g.layout).into());
        m.insert("multiple".to_owned(), Value::Bool(g.multiple));
        if let Some(permalink) = &g.permalink {
            m.insert("permalink".to_owned(), permalink.into());
        }
        Value::Object(m)
    }
}

impl From<&Config> for Value {
    /// Converts a [`Config`] into a [`Value::Object`] with fields
    /// `permalink`, `layout` and `groups`.
    fn from(c: &Config) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("permalink".to_owned(), (&c.permalink).into());
        m.insert("layout".to_owned(), (&c.layout).into());
        m.insert(
            "groups".to_owned(),
            Value::Array(c.groups.iter().map(Value::from).collect()),
        );
        Value::Object(m)
    }
}

/// Converts a list of documents into a [`Value::Array`].
pub fn documents(documents: &[&Document]) -> Value {
    Value::Array(documents.iter().map(|d| Value::from(*d)).collect())
}

/// Inserts `value` under `key` if `object` is a [`Value::Object`].
pub fn insert(object: &mut Value, key: &str, value: Value) {
    if let Value::Object(m) = object {
        m.insert(key.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_document() -> Result<(), crate::document::Error> {
        let doc = Document::parse(
            "hello",
            "---\ntitle: Hello\ntags: [a, b]\nmeta: {draft: false, part: 2}\n---\nbody",
        )?;
        let output = gtmpl::template(
            "{{.id}}|{{.title}}|{{.body}}|{{range .tags}}{{.}},{{end}}|{{.meta.draft}}|{{.meta.part}}",
            Value::from(&doc),
        );
        assert_eq!("hello|Hello|body|a,b,|false|2", output.unwrap());
        Ok(())
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            permalink: ":group/:name.html".to_owned(),
            layout: "archive".to_owned(),
            groups: vec![GroupConfig {
                name: "tags".to_owned(),
                layout: "tag".to_owned(),
                multiple: true,
                permalink: None,
            }],
        };
        let output = gtmpl::template(
            "{{.permalink}}|{{.layout}}|{{range .groups}}{{.name}} {{.layout}} {{.multiple}}{{end}}",
            Value::from(&config),
        );
        assert_eq!(":group/:name.html|archive|tags tag true", output.unwrap());
    }
}
