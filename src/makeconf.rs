use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use winnow::ascii::{line_ending, space0, space1};
use winnow::combinator::{alt, cut_err, delimited, eof, opt, preceded, repeat};
use winnow::error::StrContext;
use winnow::prelude::*;
use winnow::token::{any, one_of, take_till, take_while};

use crate::error::{Error, Result};

/// Variables assigned in a `make.conf` style file.
///
/// Supports `KEY=value`, `KEY="value"` (spanning lines, with backslash
/// escapes), `KEY='value'`, an optional `export` prefix, `#` comments, and
/// `$KEY` / `${KEY}` references to earlier assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MakeConf {
    vars: HashMap<String, String>,
}

impl MakeConf {
    /// Parse the contents of a `make.conf` file.
    ///
    /// # Examples
    ///
    /// ```
    /// use portage_meta::MakeConf;
    ///
    /// let conf = MakeConf::parse(
    ///     "PORTDIR=\"/var/db/repos/gentoo\"\n\
    ///      PORTDIR_OVERLAY=\"${PORTDIR_OVERLAY} /var/db/repos/local\"\n",
    /// )
    /// .unwrap();
    /// assert_eq!(conf.get("PORTDIR"), Some("/var/db/repos/gentoo"));
    /// assert_eq!(conf.get("PORTDIR_OVERLAY"), Some(" /var/db/repos/local"));
    /// ```
    pub fn parse(input: &str) -> Result<MakeConf> {
        let assignments = parse_assignments
            .parse(input)
            .map_err(|e| Error::InvalidConfig(format!("{e}")))?;

        let mut vars: HashMap<String, String> = HashMap::new();
        for (key, parts) in assignments {
            let mut value = String::new();
            for part in parts {
                match part {
                    Part::Literal(s) => value.push_str(&s),
                    Part::Var(name) => {
                        if let Some(v) = vars.get(&name) {
                            value.push_str(v);
                        }
                    }
                }
            }
            vars.insert(key, value);
        }
        Ok(MakeConf { vars })
    }

    /// Load and parse a file; a missing file yields `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<MakeConf>> {
        match fs::read_to_string(path) {
            Ok(text) => {
                log::debug!("reading {}", path.display());
                MakeConf::parse(&text).map(Some).map_err(|e| match e {
                    Error::InvalidConfig(msg) => {
                        Error::InvalidConfig(format!("{}: {msg}", path.display()))
                    }
                    other => other,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::InvalidConfig(format!("{}: {e}", path.display()))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Var(String),
}

fn lit(s: &str) -> Part {
    Part::Literal(s.to_string())
}

// Winnow parsers

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse_key(input: &mut &str) -> ModalResult<String> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_key_char),
    )
        .take()
        .map(str::to_string)
        .parse_next(input)
}

fn parse_var_ref(input: &mut &str) -> ModalResult<Part> {
    preceded(
        '$',
        alt((
            delimited('{', take_while(1.., is_key_char), '}'),
            take_while(1.., is_key_char),
        )),
    )
    .map(|name: &str| Part::Var(name.to_string()))
    .parse_next(input)
}

fn parse_escape(input: &mut &str) -> ModalResult<Part> {
    preceded('\\', any)
        .map(|c: char| match c {
            '\n' => lit(""),
            c => Part::Literal(c.to_string()),
        })
        .parse_next(input)
}

fn parse_double_quoted(input: &mut &str) -> ModalResult<Vec<Part>> {
    let inner = repeat(
        0..,
        alt((
            parse_var_ref,
            parse_escape,
            '$'.map(|_| lit("$")),
            take_while(1.., |c: char| !matches!(c, '"' | '\\' | '$')).map(lit),
        )),
    );
    delimited(
        '"',
        inner,
        cut_err('"').context(StrContext::Label("closing double quote")),
    )
    .parse_next(input)
}

fn parse_single_quoted(input: &mut &str) -> ModalResult<Vec<Part>> {
    delimited(
        '\'',
        take_till(0.., '\''),
        cut_err('\'').context(StrContext::Label("closing single quote")),
    )
    .map(|s: &str| vec![lit(s)])
    .parse_next(input)
}

fn parse_bare(input: &mut &str) -> ModalResult<Vec<Part>> {
    repeat(
        1..,
        alt((
            parse_var_ref,
            '$'.map(|_| lit("$")),
            take_while(1.., |c: char| {
                !c.is_whitespace() && !matches!(c, '"' | '\'' | '$' | '#')
            })
            .map(lit),
        )),
    )
    .parse_next(input)
}

type Assignment = (String, Vec<Part>);

fn parse_assignment(input: &mut &str) -> ModalResult<Assignment> {
    opt(("export", space1)).parse_next(input)?;
    let key = parse_key.parse_next(input)?;
    '='.parse_next(input)?;
    let segments: Vec<Vec<Part>> = repeat(
        0..,
        alt((parse_double_quoted, parse_single_quoted, parse_bare)),
    )
    .parse_next(input)?;
    Ok((key, segments.into_iter().flatten().collect()))
}

fn parse_comment<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    preceded('#', take_till(0.., ['\r', '\n'])).parse_next(input)
}

fn parse_assignments(input: &mut &str) -> ModalResult<Vec<Assignment>> {
    let mut out = Vec::new();
    while !input.is_empty() {
        space0.parse_next(input)?;
        if let Some(assignment) = opt(parse_assignment).parse_next(input)? {
            out.push(assignment);
        } else if !input.starts_with(['#', '\r', '\n']) && !input.is_empty() {
            let skipped = take_till(0.., ['\r', '\n']).parse_next(input)?;
            log::warn!("ignoring unsupported make.conf line: {skipped}");
        }
        space0.parse_next(input)?;
        opt(parse_comment).parse_next(input)?;
        cut_err(alt((line_ending, eof)))
            .context(StrContext::Label("end of line"))
            .parse_next(input)?;
    }
    Ok(out)
}
