//! Defines the [`Document`] type, the read-only content item that the
//! plugins group, and the logic for splitting a source file into YAML
//! frontmatter and body.

use serde_yaml::{Mapping, Value};
use std::fmt;

/// A content item (typically a blog post) with a frontmatter mapping. The
/// plugins never mutate documents; they only look up attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// The document's identifier, e.g. the source path relative to the posts
    /// directory less the extension (`2021/hello`).
    pub id: String,

    /// The frontmatter attributes.
    pub frontmatter: Mapping,

    /// The raw body following the frontmatter.
    pub body: String,
}

impl Document {
    /// Constructs a [`Document`] with an empty body.
    pub fn new(id: &str, frontmatter: Mapping) -> Document {
        Document {
            id: id.to_owned(),
            frontmatter,
            body: String::new(),
        }
    }

    /// Parses a [`Document`] from an `id` and the contents of its source
    /// file. The input must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter (a mapping, possibly empty)
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Body
    pub fn parse(id: &str, input: &str) -> Result<Document> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            match input[FENCE.len()..].find(FENCE) {
                None => Err(Error::FrontmatterMissingEndFence),
                Some(offset) => Ok((
                    FENCE.len(),                        // yaml_start
                    FENCE.len() + offset,               // yaml_stop
                    FENCE.len() + offset + FENCE.len(), // body_start
                )),
            }
        }

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let yaml = &input[yaml_start..yaml_stop];
        let frontmatter = match yaml.trim() {
            "" => Mapping::new(),
            _ => match serde_yaml::from_str::<Value>(yaml)? {
                Value::Mapping(m) => m,
                Value::Null => Mapping::new(),
                _ => return Err(Error::FrontmatterNotAMapping),
            },
        };

        Ok(Document {
            id: id.to_owned(),
            frontmatter,
            body: input[body_start..].trim_start_matches('\n').to_owned(),
        })
    }

    /// Looks up a frontmatter attribute by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.frontmatter.get(&Value::String(key.to_owned()))
    }

    /// The document's `title` attribute, falling back to its id.
    pub fn title(&self) -> &str {
        match self.get("title") {
            Some(Value::String(title)) => title,
            _ => &self.id,
        }
    }

    /// The document's `date` attribute, if it is a string. Dates are
    /// compared lexically, so they should be written `YYYY-MM-DD`.
    pub fn date(&self) -> Option<&str> {
        match self.get("date") {
            Some(Value::String(date)) => Some(date),
            _ => None,
        }
    }
}

/// Represents the result of a [`Document`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Document`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a source file is missing its starting frontmatter fence
    /// (`---`).
    FrontmatterMissingStartFence,

    /// Returned when the starting fence was found but the ending one was
    /// missing.
    FrontmatterMissingEndFence,

    /// Returned when the frontmatter is valid YAML but not a mapping.
    FrontmatterNotAMapping,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Document must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::FrontmatterNotAMapping => {
                write!(f, "Frontmatter must be a YAML mapping")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::FrontmatterNotAMapping => None,
            Error::DeserializeYaml(err) => Some(err),
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
