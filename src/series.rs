//! The series plugin: one archive page per value of the `series`
//! frontmatter key, at `series/{slug}.html`.

use crate::config::{self, resolve_section};
use crate::document::Document;
use crate::group::group;
use crate::page::{PageDescriptor, Settings};
use crate::permalink;
use crate::site::{self, Generator, RenderPage, Site};
use gtmpl::Value;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// The name of the plugin's section in the site configuration, the
/// frontmatter key it groups by, and the key under which the list of series
/// pages is published in [`Site::data`].
pub const CONFIG_KEY: &str = "series";

/// The permalink template for series pages.
pub const PERMALINK: &str = "series/:name.html";

/// The series plugin's effective configuration.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SeriesConfig {
    /// The layout for series pages. Defaults to `series`.
    pub layout: String,
}

impl SeriesConfig {
    /// Resolves the effective configuration from the user's settings.
    pub fn resolve(user: &serde_yaml::Value) -> config::Result<SeriesConfig> {
        let mut defaults = Mapping::new();
        defaults.insert("layout".into(), "series".into());
        resolve_section(serde_yaml::Value::Mapping(defaults), user)
    }
}

/// Generates series pages.
pub struct Series {
    config: SeriesConfig,
}

impl Series {
    pub fn new(config: SeriesConfig) -> Series {
        Series { config }
    }

    /// Constructs the plugin from the [`CONFIG_KEY`] section of a site
    /// configuration.
    pub fn from_site_config(site_config: &serde_yaml::Value) -> config::Result<Series> {
        Ok(Series::new(SeriesConfig::resolve(config::section(
            site_config,
            CONFIG_KEY,
        ))?))
    }

    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    /// Builds one page per series in series-name order.
    pub fn pages<'a>(&self, documents: &'a [Document]) -> permalink::Result<Vec<PageDescriptor<'a>>> {
        let settings = Settings {
            group: CONFIG_KEY,
            layout: &self.config.layout,
            permalink: PERMALINK,
        };
        group(documents, CONFIG_KEY)
            .into_iter()
            .map(|(title, posts)| PageDescriptor::build(&title, posts, &settings))
            .collect()
    }
}

impl Generator for Series {
    /// Appends the series pages to `site.pages` and publishes their template
    /// values as the `site.data["series"]` list.
    fn generate(&self, site: &mut Site) -> site::Result<()> {
        let pages: Vec<RenderPage> = self
            .pages(&site.documents)?
            .iter()
            .map(RenderPage::new)
            .collect();
        site.data.insert(
            CONFIG_KEY.to_owned(),
            Value::Array(pages.iter().map(|p| p.value.clone()).collect()),
        );
        site.pages.extend(pages);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::load_documents;
    use std::path::Path;

    #[test]
    fn test_resolve() -> config::Result<()> {
        assert_eq!("series", SeriesConfig::resolve(&serde_yaml::Value::Null)?.layout);
        let user: serde_yaml::Value = serde_yaml::from_str("layout: collection")?;
        assert_eq!("collection", SeriesConfig::resolve(&user)?.layout);
        Ok(())
    }

    #[test]
    fn test_generate() -> Result<(), Box<dyn std::error::Error>> {
        let mut site = Site::new(
            serde_yaml::Value::Null,
            load_documents(Path::new("./testdata/posts/"))?,
        );
        Series::from_site_config(&site.config)?.generate(&mut site)?;

        assert_eq!(1, site.pages.len());
        assert_eq!(Path::new("series/learning-rust.html"), site.pages[0].path);
        assert_eq!("series", site.pages[0].layout);

        let output = gtmpl::template(
            "{{range .}}{{.title}} {{.url}} {{.name}}:{{range .posts}} {{.id}}{{end}}{{end}}",
            site.data[CONFIG_KEY].clone(),
        );
        assert_eq!(
            "Learning Rust /series/learning-rust.html learning-rust: rust/ownership rust/lifetimes",
            output.unwrap()
        );
        Ok(())
    }
}
