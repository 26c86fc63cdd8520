//! The boundary with the host generator: the [`Site`] a generation pass runs
//! against, the [`Generator`] trait the plugins implement and the
//! [`RenderPage`]s they append to the host's page collection.

use crate::config;
use crate::document::{self, Document};
use crate::page::Descriptor;
use crate::permalink;
use crate::value;
use gtmpl::Value;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";

/// A plugin run once per generation pass.
pub trait Generator {
    /// Reads `site.documents` and appends pages to `site.pages`. Pages are
    /// only appended if the whole pass succeeds.
    fn generate(&self, site: &mut Site) -> Result<()>;
}

/// The host state a generation pass runs against.
pub struct Site {
    /// The site configuration. Each plugin reads its own section.
    pub config: serde_yaml::Value,

    /// The posts, most recent first.
    pub documents: Vec<Document>,

    /// The host's page collection.
    pub pages: Vec<RenderPage>,

    /// Site-level template variables published by the plugins.
    pub data: HashMap<String, Value>,
}

impl Site {
    /// Constructs a [`Site`] with no pages or data.
    pub fn new(config: serde_yaml::Value, documents: Vec<Document>) -> Site {
        Site {
            config,
            documents,
            pages: Vec::new(),
            data: HashMap::new(),
        }
    }

    /// Constructs a [`Site`] from the posts found in `posts_directory`. See
    /// [`load_documents`].
    pub fn from_directory(config: serde_yaml::Value, posts_directory: &Path) -> Result<Site> {
        Ok(Site::new(config, load_documents(posts_directory)?))
    }

    /// Runs each generator in turn.
    pub fn generate(&mut self, generators: &[&dyn Generator]) -> Result<()> {
        for generator in generators {
            generator.generate(self)?;
        }
        Ok(())
    }
}

/// Walks `dir` for markdown files and parses them into [`Document`]s, most
/// recent `date` first (undated documents last). A document's id is its path
/// relative to `dir` less the extension, e.g. `2021/hello` for
/// `{dir}/2021/hello.md`.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for result in WalkDir::new(dir).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
        let entry = result?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().map_or(true, |ext| ext != MARKDOWN_EXTENSION)
        {
            continue;
        }

        // strip_prefix() should never fail since `dir` is always an ancestor
        // of `path`
        let relative = path.strip_prefix(dir).unwrap_or(path).with_extension("");
        let id = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        debug!("Document: ... {}", id);
        documents.push(parse_document(&id, path)?);
    }

    documents.sort_by(|a, b| b.date().cmp(&a.date()));
    Ok(documents)
}

fn parse_document(id: &str, path: &Path) -> Result<Document> {
    use std::io::Read;
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    Document::parse(id, &contents)
        .map_err(|e| Error::Annotated(format!("parsing `{}`", path.display()), Box::new(e.into())))
}

/// A page as the host renders it: where to write it, which layout to render
/// it with and the template [`Value`] to render.
#[derive(Clone)]
pub struct RenderPage {
    /// The output path relative to the site's output directory.
    pub path: PathBuf,

    /// The layout to render the page with.
    pub layout: String,

    /// A [`Value::Object`] with fields `posts`, `group`, `title`, `slug`,
    /// `name`, `path`, `url`, `permalink` and `layout`.
    pub value: Value,
}

impl RenderPage {
    /// Adapts a page descriptor into a [`RenderPage`].
    pub fn new<P: Descriptor>(page: &P) -> RenderPage {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("posts".to_owned(), value::documents(page.posts()));
        m.insert("group".to_owned(), page.group().into());
        m.insert("title".to_owned(), page.title().into());
        m.insert("slug".to_owned(), page.slug().into());
        m.insert("name".to_owned(), page.name().into());
        m.insert(
            "path".to_owned(),
            Value::String(page.path().to_string_lossy().into_owned()),
        );
        m.insert("url".to_owned(), page.url().into());
        m.insert(
            "permalink".to_owned(),
            match page.permalink() {
                Some(permalink) => permalink.into(),
                None => Value::Nil,
            },
        );
        m.insert("layout".to_owned(), page.layout().into());
        RenderPage {
            path: page.path().to_owned(),
            layout: page.layout().to_owned(),
            value: Value::Object(m),
        }
    }

    /// Adds a field to the page's template value.
    pub fn with(mut self, key: &str, v: Value) -> RenderPage {
        value::insert(&mut self.value, key, v);
        self
    }
}

/// The result of a generation pass.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error during a generation pass.
#[derive(Debug)]
pub enum Error {
    /// Returned when a page URL can't be resolved from the permalink
    /// template.
    Configuration(permalink::ConfigurationError),

    /// Returned when a plugin's settings can't be resolved.
    Config(config::Error),

    /// Returned when a source document can't be parsed.
    Document(document::Error),

    /// Returned for I/O errors reading source documents.
    Io(std::io::Error),

    /// Returned for errors walking the posts directory.
    WalkDir(walkdir::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Configuration(err) => err.fmt(f),
            Error::Config(err) => err.fmt(f),
            Error::Document(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Configuration(err) => Some(err),
            Error::Config(err) => Some(err),
            Error::Document(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<permalink::Error> for Error {
    /// Converts a [`permalink::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator when building pages.
    fn from(err: permalink::Error) -> Error {
        Error::Configuration(err)
    }
}

impl From<config::Error> for Error {
    fn from(err: config::Error) -> Error {
        Error::Config(err)
    }
}

impl From<document::Error> for Error {
    fn from(err: document::Error) -> Error {
        Error::Document(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
