//! The group-by plugin: builds one archive page per value of each configured
//! frontmatter key, e.g. one page per tag and one per series.

use crate::config::{self, Config, GroupConfig};
use crate::document::Document;
use crate::group::group;
use crate::page::{HasContentList, HasSlug, PageDescriptor, Settings};
use crate::permalink;
use crate::site::{self, Generator, RenderPage, Site};
use crate::value;
use gtmpl::Value;
use log::{debug, info};
use std::collections::HashMap;

/// The name of the plugin's section in the site configuration. It's also the
/// key under which the effective configuration is published in
/// [`Site::data`].
pub const CONFIG_KEY: &str = "groupby";

/// Generates group pages for every group in its [`Config`].
pub struct Groupby {
    config: Config,
}

impl Groupby {
    /// Constructs the plugin from an effective configuration.
    pub fn new(config: Config) -> Groupby {
        Groupby { config }
    }

    /// Constructs the plugin from the [`CONFIG_KEY`] section of a site
    /// configuration. A missing section means all defaults.
    pub fn from_site_config(site_config: &serde_yaml::Value) -> config::Result<Groupby> {
        Ok(Groupby::new(Config::resolve(config::section(site_config, CONFIG_KEY))?))
    }

    /// The effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds the pages for one group, one per bucket in bucket-name order.
    pub fn group_pages<'a>(
        &self,
        group_config: &GroupConfig,
        documents: &'a [Document],
    ) -> permalink::Result<Vec<PageDescriptor<'a>>> {
        let settings = Settings {
            group: &group_config.name,
            layout: group_config.layout_or(&self.config.layout),
            permalink: group_config.permalink_or(&self.config.permalink),
        };
        group(documents, &group_config.name)
            .into_iter()
            .map(|(value, posts)| PageDescriptor::build(&value, posts, &settings))
            .collect()
    }
}

impl Generator for Groupby {
    /// Builds the pages for every group, publishes the effective
    /// configuration as `site.data["groupby"]` (each group carrying a sorted
    /// `posts` listing of `{name, list}` entries) and appends the pages to
    /// `site.pages`. Each page exposes its group's configuration as `config`.
    fn generate(&self, site: &mut Site) -> site::Result<()> {
        info!("Groupby: generating group pages");

        let mut pages = Vec::new();
        let mut groups = Vec::with_capacity(self.config.groups.len());
        for group_config in &self.config.groups {
            debug!("Group: creating pages for `{}`", group_config.name);
            let descriptors = self.group_pages(group_config, &site.documents)?;

            let mut config = Value::from(group_config);
            value::insert(&mut config, "posts", listing(&descriptors));
            for descriptor in &descriptors {
                pages.push(RenderPage::new(descriptor).with("config", config.clone()));
            }
            groups.push(config);
        }

        let mut config = Value::from(&self.config);
        value::insert(&mut config, "groups", Value::Array(groups));
        site.data.insert(CONFIG_KEY.to_owned(), config);
        site.pages.extend(pages);

        debug!("Groupby: generation complete");
        Ok(())
    }
}

/// Lists a group's buckets as `{name, list}` objects.
fn listing(descriptors: &[PageDescriptor]) -> Value {
    Value::Array(
        descriptors
            .iter()
            .map(|d| {
                let mut m: HashMap<String, Value> = HashMap::new();
                m.insert("name".to_owned(), d.title().into());
                m.insert("list".to_owned(), value::documents(d.posts()));
                Value::Object(m)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HasUrl;
    use std::path::Path;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn documents() -> Vec<Document> {
        vec![
            Document::parse("a1", "---\ntitle: A1\nseries: A\ntags: [x, y]\n---\n").unwrap(),
            Document::parse("s1", "---\ntitle: S1\nseries: S\ntags: [y]\n---\n").unwrap(),
            Document::parse("a2", "---\ntitle: A2\nseries: A\n---\n").unwrap(),
            Document::parse("none", "---\ntitle: None\n---\n").unwrap(),
        ]
    }

    fn site_config(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_group_pages() -> Result<(), Box<dyn std::error::Error>> {
        init();
        let plugin = Groupby::new(Config::from_yaml_str("groups: [{name: series, layout: series}]")?);
        let documents = documents();
        let pages = plugin.group_pages(&plugin.config().groups[0], &documents)?;

        let summary: Vec<(&str, &str, Vec<&str>)> = pages
            .iter()
            .map(|p| (p.title(), p.url(), p.posts().iter().map(|d| d.id.as_str()).collect()))
            .collect();
        assert_eq!(
            vec![
                ("A", "/series/a.html", vec!["a1", "a2"]),
                ("S", "/series/s.html", vec!["s1"]),
            ],
            summary
        );
        assert_eq!(Path::new("series/a.html"), pages[0].path());
        Ok(())
    }

    #[test]
    fn test_generate() -> Result<(), Box<dyn std::error::Error>> {
        init();
        let config = site_config(
            r#"
groupby:
  layout: archive
  groups:
    - name: series
      layout: series
    - name: tags
      multiple: true
"#,
        );
        let plugin = Groupby::from_site_config(&config)?;
        let mut site = Site::new(config, documents());
        site.generate(&[&plugin])?;

        let pages: Vec<(String, &str)> = site
            .pages
            .iter()
            .map(|p| (p.path.to_string_lossy().into_owned(), p.layout.as_str()))
            .collect();
        assert_eq!(
            vec![
                ("series/a.html".to_owned(), "series"),
                ("series/s.html".to_owned(), "series"),
                ("tags/x.html".to_owned(), "archive"),
                ("tags/y.html".to_owned(), "archive"),
            ],
            pages
        );

        let output = gtmpl::template(
            "{{.title}} {{.slug}} {{.group}} {{.url}} {{.name}} {{.config.multiple}}:{{range .posts}} {{.title}}{{end}}",
            site.pages[3].value.clone(),
        );
        assert_eq!("y y tags /tags/y.html y true: A1 S1", output.unwrap());

        let output = gtmpl::template(
            "{{range .groups}}{{.name}}={{range .posts}}{{.name}}({{len .list}}){{end}};{{end}}",
            site.data[CONFIG_KEY].clone(),
        );
        assert_eq!("series=A(2)S(1);tags=x(1)y(2);", output.unwrap());
        Ok(())
    }

    #[test]
    fn test_generate_group_permalink_override() -> Result<(), Box<dyn std::error::Error>> {
        init();
        let config = site_config(
            r#"
groupby:
  groups:
    tags:
      permalink: "/topics/{name}/"
"#,
        );
        let mut site = Site::new(config, documents());
        Groupby::from_site_config(&site.config)?.generate(&mut site)?;
        assert_eq!(
            vec![Path::new("topics/x/index.html"), Path::new("topics/y/index.html")],
            site.pages.iter().map(|p| p.path.as_path()).collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_generate_invalid_permalink() -> Result<(), Box<dyn std::error::Error>> {
        init();
        let config = site_config("groupby: {permalink: \":group/:nam e}.html\", groups: [series]}");

        // Resolving the configuration doesn't check the template...
        let plugin = Groupby::from_site_config(&config);
        assert!(plugin.is_ok());

        // ...building the first page does.
        let mut site = Site::new(config, documents());
        match plugin?.generate(&mut site) {
            Err(site::Error::Configuration(permalink::Error::UnknownPlaceholder { name, .. })) => {
                assert_eq!("nam", name)
            }
            Err(err) => panic!("wanted a configuration error, got {}", err),
            Ok(()) => panic!("wanted a configuration error"),
        }
        assert!(site.pages.is_empty());
        Ok(())
    }

    #[test]
    fn test_generate_no_groups() -> Result<(), Box<dyn std::error::Error>> {
        init();
        let mut site = Site::new(serde_yaml::Value::Null, documents());
        Groupby::from_site_config(&site.config)?.generate(&mut site)?;
        assert!(site.pages.is_empty());
        assert!(site.data.contains_key(CONFIG_KEY));
        Ok(())
    }
}
