use std::fmt;
use std::str::FromStr;

use winnow::ascii::{digit0, digit1};
use winnow::combinator::{alt, eof, opt, preceded, repeat};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::error::{Error, Result};

/// A package query as typed on the command line.
///
/// Accepts `name`, `category/name` and full atoms such as
/// `>=category/name-1.2-r1:0::repo`. Only the category and name are kept;
/// version, slot and repository parts are validated and dropped, since a
/// package's `metadata.xml` is shared by all its versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageQuery {
    /// Category, when the query was qualified.
    pub category: Option<String>,
    /// Package name without version.
    pub name: String,
}

impl PackageQuery {
    /// Parse a query string.
    ///
    /// # Examples
    ///
    /// ```
    /// use portage_meta::PackageQuery;
    ///
    /// let q = PackageQuery::parse("sys-apps/portage").unwrap();
    /// assert_eq!(q.category.as_deref(), Some("sys-apps"));
    /// assert_eq!(q.name, "portage");
    ///
    /// let q = PackageQuery::parse(">=dev-lang/python-3.12.1_rc1-r2:3.12").unwrap();
    /// assert_eq!(q.to_string(), "dev-lang/python");
    ///
    /// let q = PackageQuery::parse("gcc").unwrap();
    /// assert_eq!(q.category, None);
    /// ```
    pub fn parse(input: &str) -> Result<PackageQuery> {
        let raw = input.trim();
        let (operator, first, second) = parse_atom
            .parse(raw)
            .map_err(|e| Error::InvalidQuery(format!("{raw}: {e}")))?;

        let (category, full_name) = match second {
            Some(name) => (Some(first), name),
            None => (None, first),
        };
        let name = strip_version(full_name);
        if operator.is_some() && name.len() == full_name.len() {
            return Err(Error::InvalidQuery(format!(
                "{raw}: version operator without a version"
            )));
        }

        Ok(PackageQuery {
            category: category.map(str::to_string),
            name: name.to_string(),
        })
    }
}

impl FromStr for PackageQuery {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PackageQuery::parse(s)
    }
}

impl fmt::Display for PackageQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.category {
            Some(cat) => write!(f, "{cat}/{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

// Winnow parsers

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+')
}

fn is_slot_char(c: char) -> bool {
    is_name_char(c) || matches!(c, '/' | '*' | '=')
}

fn parse_operator<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    alt((">=", "<=", "=", "~", "<", ">")).parse_next(input)
}

type Atom<'s> = (Option<&'s str>, &'s str, Option<&'s str>);

fn parse_atom<'s>(input: &mut &'s str) -> ModalResult<Atom<'s>> {
    let operator = opt(parse_operator).parse_next(input)?;
    let first = take_while(1.., is_name_char).parse_next(input)?;
    let second = opt(preceded('/', take_while(1.., is_name_char))).parse_next(input)?;
    opt('*').parse_next(input)?;
    opt(preceded(':', take_while(1.., is_slot_char))).parse_next(input)?;
    opt(preceded("::", take_while(1.., is_name_char))).parse_next(input)?;
    eof.parse_next(input)?;
    Ok((operator, first, second))
}

/// PMS version syntax, optionally followed by a `*` glob.
fn parse_version(input: &mut &str) -> ModalResult<()> {
    digit1.parse_next(input)?;
    let () = repeat(0.., ('.', digit1)).parse_next(input)?;
    opt(one_of('a'..='z')).parse_next(input)?;
    let () = repeat(
        0..,
        ('_', alt(("alpha", "beta", "pre", "rc", "p")), digit0),
    )
    .parse_next(input)?;
    opt(("-r", digit1)).parse_next(input)?;
    opt('*').parse_next(input)?;
    Ok(())
}

fn is_version(s: &str) -> bool {
    parse_version.parse(s).is_ok()
}

/// Drop a trailing `-<version>` from a package name.
fn strip_version(name: &str) -> &str {
    for (i, _) in name.match_indices('-') {
        let (head, tail) = (&name[..i], &name[i + 1..]);
        if !head.is_empty() && is_version(tail) {
            return head;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name() {
        let q: PackageQuery = "portage".parse().unwrap();
        assert_eq!(q.category, None);
        assert_eq!(q.name, "portage");
    }

    #[test]
    fn qualified_name() {
        let q: PackageQuery = "sys-apps/portage".parse().unwrap();
        assert_eq!(q.category.as_deref(), Some("sys-apps"));
        assert_eq!(q.name, "portage");
    }

    #[test]
    fn version_is_stripped() {
        let q: PackageQuery = "=sys-apps/portage-3.0.63-r1".parse().unwrap();
        assert_eq!(q.to_string(), "sys-apps/portage");
    }

    #[test]
    fn hyphenated_names_survive() {
        let q: PackageQuery = "x11-libs/gtk-engines-murrine".parse().unwrap();
        assert_eq!(q.name, "gtk-engines-murrine");
        let q: PackageQuery = "=dev-python/typing-extensions-4.12.2".parse().unwrap();
        assert_eq!(q.name, "typing-extensions");
    }

    #[test]
    fn names_with_digits_after_hyphen() {
        // "gtk+-2" would be a version, "python-3to2" is not.
        let q: PackageQuery = "dev-python/python-3to2".parse().unwrap();
        assert_eq!(q.name, "python-3to2");
    }

    #[test]
    fn slot_and_repo_are_dropped() {
        let q: PackageQuery = "dev-lang/python:3.12::gentoo".parse().unwrap();
        assert_eq!(q.to_string(), "dev-lang/python");
        let q: PackageQuery = "dev-lang/rust::gentoo".parse().unwrap();
        assert_eq!(q.to_string(), "dev-lang/rust");
    }

    #[test]
    fn glob_version() {
        let q: PackageQuery = "=sys-devel/gcc-14*".parse().unwrap();
        assert_eq!(q.to_string(), "sys-devel/gcc");
    }

    #[test]
    fn version_suffixes() {
        for v in ["1", "1.2.3", "1.0a", "2.0_rc3", "1_alpha_p2", "3.1-r10", "0_pre"] {
            assert!(is_version(v), "{v}");
        }
        for v in ["", "a1", "1..2", "1.2-r", "1_gamma"] {
            assert!(!is_version(v), "{v}");
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let q: PackageQuery = "  app-editors/vim  ".parse().unwrap();
        assert_eq!(q.to_string(), "app-editors/vim");
    }

    #[test]
    fn invalid_queries() {
        assert!("".parse::<PackageQuery>().is_err());
        assert!("sys-apps/".parse::<PackageQuery>().is_err());
        assert!("a/b/c".parse::<PackageQuery>().is_err());
        assert!("foo bar".parse::<PackageQuery>().is_err());
        assert!(">=sys-apps/portage".parse::<PackageQuery>().is_err());
    }
}
