//! Resolves the effective plugin configuration: user settings are
//! deep-merged over the documented defaults before being deserialized into
//! [`Config`] and [`GroupConfig`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The default permalink template for group pages.
pub const DEFAULT_PERMALINK: &str = ":group/:name.html";

/// The effective configuration of the [`crate::groupby::Groupby`] plugin.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// The permalink template for group pages. Placeholders: `:group` (the
    /// frontmatter key) and `:name` (the slug of the value).
    pub permalink: String,

    /// The layout for groups that don't set their own.
    pub layout: String,

    /// The groups to build pages for, in configuration order.
    pub groups: Vec<GroupConfig>,
}

/// One group definition.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GroupConfig {
    /// The frontmatter key to group by.
    pub name: String,

    /// The layout for this group's pages; empty means the global layout.
    pub layout: String,

    /// Whether the attribute is expected to hold several values. Exposed to
    /// templates; list values are split into buckets either way.
    pub multiple: bool,

    /// A permalink template overriding [`Config::permalink`] for this group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
}

impl Config {
    /// Resolves the effective configuration from the user's settings (the
    /// plugin's section of the site configuration). `user` may be null, in
    /// which case the defaults apply. `groups` may be a list of group tables
    /// or a mapping from group name to settings.
    pub fn resolve(user: &Value) -> Result<Config> {
        let mut merged = defaults();
        deep_merge(&mut merged, user);

        if let Value::Mapping(m) = &mut merged {
            let key = Value::String("groups".to_owned());
            if let Some(groups) = m.get(&key) {
                let groups = resolve_groups(groups)?;
                m.insert(key, groups);
            }
        }

        Ok(serde_yaml::from_value(merged)?)
    }

    /// Parses and resolves a YAML document holding the plugin settings.
    pub fn from_yaml_str(input: &str) -> Result<Config> {
        let user: Value = serde_yaml::from_str(input)?;
        Config::resolve(&user)
    }

    /// Loads and resolves the plugin settings from a YAML file.
    pub fn from_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        match serde_yaml::from_reader::<_, Value>(file) {
            Ok(user) => Config::resolve(&user),
            Err(err) => Err(Error::Annotated(
                format!("loading `{}`", path.display()),
                Box::new(Error::DeserializeYaml(err)),
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            permalink: DEFAULT_PERMALINK.to_owned(),
            layout: String::new(),
            groups: Vec::new(),
        }
    }
}

impl GroupConfig {
    /// The layout for this group's pages, falling back to `global`.
    pub fn layout_or<'a>(&'a self, global: &'a str) -> &'a str {
        match self.layout.is_empty() {
            true => global,
            false => &self.layout,
        }
    }

    /// The permalink template for this group's pages, falling back to
    /// `global`.
    pub fn permalink_or<'a>(&'a self, global: &'a str) -> &'a str {
        self.permalink.as_deref().unwrap_or(global)
    }
}

fn defaults() -> Value {
    let mut m = Mapping::new();
    m.insert("permalink".into(), DEFAULT_PERMALINK.into());
    m.insert("layout".into(), "".into());
    m.insert("groups".into(), Value::Sequence(Vec::new()));
    Value::Mapping(m)
}

fn group_defaults() -> Value {
    let mut m = Mapping::new();
    m.insert("name".into(), "".into());
    m.insert("layout".into(), "".into());
    m.insert("multiple".into(), false.into());
    Value::Mapping(m)
}

/// Normalizes the `groups` setting into a sequence of group tables with the
/// per-group defaults merged in. A bare string in a list names a group that
/// uses the defaults.
fn resolve_groups(groups: &Value) -> Result<Value> {
    let entries: Vec<Value> = match groups {
        Value::Null => Vec::new(),
        Value::Sequence(entries) => entries
            .iter()
            .map(|entry| match entry {
                Value::String(_) => {
                    let mut named = Mapping::new();
                    named.insert("name".into(), entry.clone());
                    Value::Mapping(named)
                }
                _ => entry.clone(),
            })
            .collect(),
        Value::Mapping(named) => named
            .iter()
            .map(|(name, settings)| {
                let mut entry = Mapping::new();
                entry.insert("name".into(), name.clone());
                let mut entry = Value::Mapping(entry);
                deep_merge(&mut entry, settings);
                entry
            })
            .collect(),
        _ => return Err(Error::InvalidGroups),
    };

    Ok(Value::Sequence(
        entries
            .iter()
            .map(|entry| {
                let mut group = group_defaults();
                deep_merge(&mut group, entry);
                group
            })
            .collect(),
    ))
}

/// Merges `overlay` into `base`. Mappings are merged key by key; any other
/// value in `overlay` replaces the one in `base`. A null in `overlay` leaves
/// `base` untouched, so an empty YAML key keeps its default.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None if value.is_null() => {}
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Resolves a plugin's section of the site configuration over `defaults`.
pub(crate) fn resolve_section<T: DeserializeOwned>(defaults: Value, user: &Value) -> Result<T> {
    let mut merged = defaults;
    deep_merge(&mut merged, user);
    Ok(serde_yaml::from_value(merged)?)
}

/// Looks up the section named `key` in a site configuration, returning null
/// when the configuration isn't a mapping or lacks the section.
pub fn section<'v>(site_config: &'v Value, key: &str) -> &'v Value {
    const NULL: &Value = &Value::Null;
    match site_config {
        Value::Mapping(m) => m.get(&Value::String(key.to_owned())).unwrap_or(NULL),
        _ => NULL,
    }
}

/// The result of resolving a configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error resolving a configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when `groups` is neither a list nor a mapping.
    InvalidGroups,

    /// Returned when the merged settings don't fit the configuration types.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the configuration file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidGroups => {
                write!(f, "`groups` must be a list or a mapping of group definitions")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Open { path, err } => {
                write!(f, "Opening configuration file `{}`: {}", path.display(), err)
            }
            Error::Annotated(annotation, err) => write!(f, "{}: {}", annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidGroups => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Open { path: _, err } => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}
