//! Resolves permalink templates such as `:group/:name.html` into site URLs
//! and converts those URLs into relative output paths.
//!
//! A placeholder is written either `:ident` or `{ident}`, where `ident` is
//! made of ASCII letters, digits and underscores. Templates are only checked
//! when a URL is resolved, so a bad template in the configuration surfaces on
//! the first page built from it.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

/// Substitutes `placeholders` into `template` and sanitizes the result: the
/// URL always begins with `/`, repeated slashes are collapsed and `.`/`..`
/// segments are dropped. Placeholder values are percent-escaped.
///
/// ```
/// use groupby::permalink::resolve;
///
/// let url = resolve(":group/:name.html", &[("group", "tech"), ("name", "my-post")]).unwrap();
/// assert_eq!("/tech/my-post.html", url);
/// ```
pub fn resolve(template: &str, placeholders: &[(&str, &str)]) -> Result<String> {
    if template.trim().is_empty() {
        return Err(Error::EmptyTemplate);
    }

    let lookup = |name: &str| -> Result<String> {
        match placeholders.iter().find(|(k, _)| *k == name) {
            Some((_, value)) => Ok(urlencoding::encode(value).into_owned()),
            None => Err(Error::UnknownPlaceholder {
                template: template.to_owned(),
                name: name.to_owned(),
            }),
        }
    };

    let mut url = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((position, c)) = chars.next() {
        match c {
            ':' => {
                let mut name = String::new();
                while let Some((_, c)) = chars.peek() {
                    if !is_ident_char(*c) {
                        break;
                    }
                    name.push(*c);
                    chars.next();
                }
                if name.is_empty() {
                    return Err(Error::MissingPlaceholderName {
                        template: template.to_owned(),
                        position,
                    });
                }
                url.push_str(&lookup(&name)?);
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, c)) if is_ident_char(c) => name.push(c),
                        Some((_, _)) | None => {
                            return Err(Error::UnterminatedPlaceholder {
                                template: template.to_owned(),
                                position,
                            })
                        }
                    }
                }
                if name.is_empty() {
                    return Err(Error::MissingPlaceholderName {
                        template: template.to_owned(),
                        position,
                    });
                }
                url.push_str(&lookup(&name)?);
            }
            '}' => {
                return Err(Error::UnmatchedBrace {
                    template: template.to_owned(),
                    position,
                })
            }
            c => url.push(c),
        }
    }

    Ok(sanitize(&url))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn sanitize(url: &str) -> String {
    let mut sanitized = String::with_capacity(url.len() + 1);
    for segment in url
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
    {
        sanitized.push('/');
        sanitized.push_str(segment);
    }
    if sanitized.is_empty() || url.ends_with('/') {
        sanitized.push('/');
    }
    sanitized
}

/// Converts a resolved URL into an output path relative to the site's output
/// directory: the URL is unescaped and its leading separator stripped. URLs
/// naming a directory (trailing `/`) map to that directory's `index.html`.
pub fn relative_path(url: &str) -> PathBuf {
    let unescaped = urlencoding::decode(url)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| url.to_owned());
    let path = PathBuf::from(unescaped.trim_start_matches('/'));
    match unescaped.ends_with('/') {
        true => path.join("index.html"),
        false => path,
    }
}

/// The result of resolving a permalink template.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a permalink template that can't be resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Returned when the template is empty.
    EmptyTemplate,

    /// Returned for a `:` or `{}` with no placeholder name.
    MissingPlaceholderName { template: String, position: usize },

    /// Returned for a `{` without a matching `}` (or with characters that
    /// can't appear in a placeholder name before it).
    UnterminatedPlaceholder { template: String, position: usize },

    /// Returned for a `}` without a matching `{`.
    UnmatchedBrace { template: String, position: usize },

    /// Returned when a placeholder doesn't name a known value.
    UnknownPlaceholder { template: String, name: String },
}

/// The error raised when a page's URL can't be resolved from the configured
/// permalink template.
pub type ConfigurationError = Error;

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::EmptyTemplate => write!(f, "Permalink template is empty"),
            Error::MissingPlaceholderName { template, position } => write!(
                f,
                "Permalink template `{}` is invalid: placeholder without a name at {}",
                template, position
            ),
            Error::UnterminatedPlaceholder { template, position } => write!(
                f,
                "Permalink template `{}` is invalid: unterminated `{{` at {}",
                template, position
            ),
            Error::UnmatchedBrace { template, position } => write!(
                f,
                "Permalink template `{}` is invalid: unmatched `}}` at {}",
                template, position
            ),
            Error::UnknownPlaceholder { template, name } => write!(
                f,
                "Permalink template `{}` is invalid: unknown placeholder `{}`",
                template, name
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const PLACEHOLDERS: &[(&str, &str)] = &[("group", "tech"), ("name", "my-post")];

    #[test]
    fn test_resolve_default_template() -> Result<()> {
        let url = resolve(":group/:name.html", PLACEHOLDERS)?;
        assert_eq!("/tech/my-post.html", url);
        assert_eq!(Path::new("tech/my-post.html"), relative_path(&url));
        Ok(())
    }

    #[test]
    fn test_resolve_braced() -> Result<()> {
        assert_eq!("/archive/tech/my-post/", resolve("/archive/{group}/{name}/", PLACEHOLDERS)?);
        Ok(())
    }

    #[test]
    fn test_resolve_sanitizes() -> Result<()> {
        assert_eq!("/tech/my-post.html", resolve("//:group/../:name.html", PLACEHOLDERS)?);
        assert_eq!("/tech/my-post.html", resolve("./:group//:name.html", PLACEHOLDERS)?);
        Ok(())
    }

    #[test]
    fn test_resolve_escapes_values() -> Result<()> {
        let url = resolve(":group/:name.html", &[("group", "big ideas"), ("name", "x")])?;
        assert_eq!("/big%20ideas/x.html", url);
        assert_eq!(Path::new("big ideas/x.html"), relative_path(&url));
        Ok(())
    }

    #[test]
    fn test_relative_path_directory() {
        assert_eq!(Path::new("tech/my-post/index.html"), relative_path("/tech/my-post/"));
    }

    #[test]
    fn test_resolve_invalid_templates() {
        assert_eq!(Err(Error::EmptyTemplate), resolve("  ", PLACEHOLDERS));
        assert!(matches!(
            resolve(":group/:.html", PLACEHOLDERS),
            Err(Error::MissingPlaceholderName { position: 7, .. })
        ));
        assert!(matches!(
            resolve("{group/:name.html", PLACEHOLDERS),
            Err(Error::UnterminatedPlaceholder { position: 0, .. })
        ));
        assert!(matches!(
            resolve(":group}/:name.html", PLACEHOLDERS),
            Err(Error::UnmatchedBrace { position: 6, .. })
        ));
        assert!(matches!(
            resolve("{}/:name.html", PLACEHOLDERS),
            Err(Error::MissingPlaceholderName { position: 0, .. })
        ));
        assert_eq!(
            Err(Error::UnknownPlaceholder {
                template: ":year/:name.html".to_owned(),
                name: "year".to_owned(),
            }),
            resolve(":year/:name.html", PLACEHOLDERS),
        );
    }
}
