//! Defines [`PageDescriptor`], the archive page built for one bucket of
//! documents, and the capability traits a host renders pages through.

use crate::document::Document;
use crate::permalink;
use log::debug;
use std::path::{Path, PathBuf};
use url::Url;

/// A page with a human-readable title and a URL-safe slug derived from it.
pub trait HasSlug {
    fn title(&self) -> &str;
    fn slug(&self) -> &str;
}

/// A page with a resolved location on the site.
pub trait HasUrl {
    /// The site-relative URL, always beginning with `/`.
    fn url(&self) -> &str;

    /// The output path relative to the site's output directory.
    fn path(&self) -> &Path;

    /// The output file's stem, e.g. `my-post` for `tech/my-post.html`.
    fn name(&self) -> &str;

    /// A permalink that overrides [`HasUrl::url`]. Generated pages have none.
    fn permalink(&self) -> Option<&str> {
        None
    }
}

/// A page listing documents.
pub trait HasContentList {
    fn posts(&self) -> &[&Document];
}

/// Everything a host needs to render an archive page.
pub trait Descriptor: HasSlug + HasUrl + HasContentList {
    /// The frontmatter key the page was grouped by.
    fn group(&self) -> &str;

    /// The layout (template name) to render the page with.
    fn layout(&self) -> &str;
}

/// The settings a [`PageDescriptor`] is built from. The plugins derive these
/// from their configuration; see [`crate::groupby`] and [`crate::series`].
#[derive(Clone, Copy, Debug)]
pub struct Settings<'c> {
    /// The frontmatter key being grouped by; substituted for `:group`.
    pub group: &'c str,

    /// The layout to render pages with.
    pub layout: &'c str,

    /// The permalink template, e.g. `:group/:name.html`.
    pub permalink: &'c str,
}

/// The archive page for one bucket. All fields are computed on construction
/// and never change afterwards.
#[derive(Clone, Debug)]
pub struct PageDescriptor<'a> {
    title: String,
    slug: String,
    group: String,
    layout: String,
    posts: Vec<&'a Document>,
    url: String,
    path: PathBuf,
    name: String,
}

impl<'a> PageDescriptor<'a> {
    /// Builds the page for the bucket `value` holding `posts`. Fails if
    /// `settings.permalink` can't be resolved.
    pub fn build(
        value: &str,
        posts: Vec<&'a Document>,
        settings: &Settings,
    ) -> permalink::Result<PageDescriptor<'a>> {
        debug!("Page: ... {}", value);

        let slug = slugify(value);
        let url = permalink::resolve(
            settings.permalink,
            &[("group", settings.group), ("name", slug.as_str())],
        )?;
        let path = permalink::relative_path(&url);
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(PageDescriptor {
            title: value.to_owned(),
            slug,
            group: settings.group.to_owned(),
            layout: settings.layout.to_owned(),
            posts,
            url,
            path,
            name,
        })
    }

    /// Joins the page's URL onto `site_root` (e.g. `https://example.org/blog/`).
    pub fn absolute_url(&self, site_root: &Url) -> Result<Url, url::ParseError> {
        // `url` is site-absolute; joining it as-is would drop any path on
        // `site_root`.
        site_root.join(self.url.trim_start_matches('/'))
    }
}

impl HasSlug for PageDescriptor<'_> {
    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        &self.slug
    }
}

impl HasUrl for PageDescriptor<'_> {
    fn url(&self) -> &str {
        &self.url
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl HasContentList for PageDescriptor<'_> {
    fn posts(&self) -> &[&Document] {
        &self.posts
    }
}

impl Descriptor for PageDescriptor<'_> {
    fn group(&self) -> &str {
        &self.group
    }

    fn layout(&self) -> &str {
        &self.layout
    }
}

/// Converts a bucket value into a URL-safe slug: lower-case ASCII with runs
/// of anything else collapsed into a single `-`. Slugifying a slug returns it
/// unchanged.
pub fn slugify(value: &str) -> String {
    slug::slugify(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Mapping;

    const SETTINGS: Settings = Settings {
        group: "tech",
        layout: "group",
        permalink: ":group/:name.html",
    };

    #[test]
    fn test_build() -> permalink::Result<()> {
        let documents = vec![Document::new("a", Mapping::new()), Document::new("b", Mapping::new())];
        let page = PageDescriptor::build("My Post", documents.iter().collect(), &SETTINGS)?;
        assert_eq!("My Post", page.title());
        assert_eq!("my-post", page.slug());
        assert_eq!("/tech/my-post.html", page.url());
        assert_eq!(Path::new("tech/my-post.html"), page.path());
        assert_eq!("my-post", page.name());
        assert_eq!(None, page.permalink());
        assert_eq!("tech", page.group());
        assert_eq!("group", page.layout());
        assert_eq!(
            vec!["a", "b"],
            page.posts().iter().map(|d| d.id.as_str()).collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_build_invalid_template() {
        let settings = Settings {
            permalink: ":group/{name.html",
            ..SETTINGS
        };
        assert!(matches!(
            PageDescriptor::build("x", Vec::new(), &settings),
            Err(permalink::Error::UnterminatedPlaceholder { .. })
        ));
    }

    #[test]
    fn test_absolute_url() -> Result<(), Box<dyn std::error::Error>> {
        let page = PageDescriptor::build("Rust", Vec::new(), &SETTINGS)?;
        assert_eq!(
            Url::parse("https://example.org/blog/tech/rust.html")?,
            page.absolute_url(&Url::parse("https://example.org/blog/")?)?,
        );
        Ok(())
    }

    #[test]
    fn test_slugify() {
        assert_eq!("hello-world", slugify("Hello,   World!"));
        assert_eq!("c-and-rust", slugify("--C and Rust--"));
        assert_eq!("cafe", slugify("Café"));
    }

    #[test]
    fn test_slugify_idempotent() {
        for value in &["Hello, World!", "Rust 2021: async/await", "already-a-slug", "Ünïcödé"] {
            let once = slugify(value);
            assert_eq!(once, slugify(&once));
        }
    }
}
