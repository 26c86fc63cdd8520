//! Plugins for a static site generator that group posts by a frontmatter
//! attribute (e.g., `series` or `tags`) and build one archive page per
//! distinct value. A generation pass can be broken down into three steps:
//!
//! 1. Grouping documents into buckets by the value(s) of a key
//!    ([`crate::group`])
//! 2. Building a page descriptor for each bucket, with a slug and a URL
//!    resolved from a permalink template ([`crate::page`],
//!    [`crate::permalink`])
//! 3. Handing the pages back to the host as [`site::RenderPage`]s, whose
//!    template values the host renders with its own layouts ([`crate::site`])
//!
//! Two plugins implement [`site::Generator`]: [`groupby::Groupby`], which
//! builds pages for any number of configured keys, and [`series::Series`],
//! which builds pages for the `series` key at a fixed location. Both resolve
//! their settings over defaults ([`crate::config`]) and emit pages in
//! bucket-name order.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod config;
pub mod document;
pub mod group;
pub mod groupby;
pub mod page;
pub mod permalink;
pub mod series;
pub mod site;
pub mod value;
