//! Width-aware rendering of extracted fields.
//!
//! A field either fits the terminal as authored, in which case its line
//! breaks and indentation are kept, or it is reflowed into a single
//! paragraph wrapped at the terminal width. In both cases the first output
//! line carries `first` as its prefix and every later line `subsequent`.

use textwrap::core::display_width;
use textwrap::{Options, WordSeparator, WordSplitter, WrapAlgorithm};

use crate::config::RenderConfig;
use crate::field::Field;

/// Placeholder printed for empty fields.
pub const NONE_SPECIFIED: &str = "None specified";

const TAB_SIZE: usize = 8;

/// Render one field value.
///
/// Returns `None` only when `text` is empty and `quiet` is set.
///
/// # Examples
///
/// ```
/// use portage_meta::{format_line, RenderConfig};
///
/// let cfg = RenderConfig::new(80, false);
/// let out = format_line("one\ntwo", "Herd:  ", "       ", false, &cfg);
/// assert_eq!(out.as_deref(), Some("Herd:  one\n       two"));
///
/// let narrow = RenderConfig::new(12, false);
/// let out = format_line("alpha beta gamma", "", "  ", false, &narrow);
/// assert_eq!(out.as_deref(), Some("alpha beta\n  gamma"));
/// ```
pub fn format_line(
    text: &str,
    first: &str,
    subsequent: &str,
    quiet: bool,
    cfg: &RenderConfig,
) -> Option<String> {
    let expanded = expand_tabs(text);
    let trimmed = expanded.trim_matches('\n');
    if trimmed.is_empty() {
        return if quiet {
            None
        } else {
            Some(format!("{first}{NONE_SPECIFIED}"))
        };
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    let indent = display_width(first).max(display_width(subsequent));
    let longest = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);

    if indent + longest > cfg.term_width {
        Some(reflow(&lines, first, subsequent, cfg.term_width))
    } else {
        Some(preserve(&lines, first, subsequent))
    }
}

/// Render a field list, one output block per entry.
///
/// The first entry is prefixed with `first`, the rest with `subsequent`.
/// Each [`Field::Separator`] becomes an empty block. An empty list renders
/// as `first` + `None specified` in verbose mode unless `quiet` is set, and
/// as nothing otherwise.
///
/// # Examples
///
/// ```
/// use portage_meta::{format_list, Field, RenderConfig};
///
/// let cfg = RenderConfig::new(80, false);
/// let fields = vec![Field::text("A"), Field::Separator, Field::text("B")];
/// let blocks = format_list(&fields, "> ", "  ", false, &cfg);
/// assert_eq!(blocks, vec!["> A", "", "  B"]);
/// ```
pub fn format_list(
    fields: &[Field],
    first: &str,
    subsequent: &str,
    quiet: bool,
    cfg: &RenderConfig,
) -> Vec<String> {
    let Some((head, rest)) = fields.split_first() else {
        if cfg.verbose && !quiet {
            return vec![format!("{first}{NONE_SPECIFIED}")];
        }
        return Vec::new();
    };

    let mut blocks = Vec::with_capacity(fields.len());
    match head {
        Field::Separator => blocks.push(String::new()),
        Field::Text(text) => blocks.extend(format_line(text, first, subsequent, quiet, cfg)),
    }
    for field in rest {
        match field {
            Field::Separator => blocks.push(String::new()),
            Field::Text(text) => {
                blocks.extend(format_line(text, subsequent, subsequent, quiet, cfg))
            }
        }
    }
    blocks
}

/// Join, collapse whitespace and wrap at `width` without breaking words.
fn reflow(lines: &[&str], first: &str, subsequent: &str, width: usize) -> String {
    let paragraph = lines
        .iter()
        .flat_map(|l| l.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");
    let options = Options::new(width)
        .initial_indent(first)
        .subsequent_indent(subsequent)
        .break_words(false)
        .word_separator(WordSeparator::AsciiSpace)
        .word_splitter(WordSplitter::NoHyphenation)
        .wrap_algorithm(WrapAlgorithm::FirstFit);
    textwrap::fill(&paragraph, options)
}

/// Keep the authored line breaks, prefixing each line.
fn preserve(lines: &[&str], first: &str, subsequent: &str) -> String {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let prefix = if i == 0 { first } else { subsequent };
        out.push(format!("{prefix}{line}"));
    }
    // A whitespace-only last line is an artifact of closing-tag indentation.
    if out.last().is_some_and(|l| is_blank(l)) {
        out.pop();
    }
    out.join("\n")
}

fn is_blank(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_whitespace)
}

/// Replace tabs with spaces up to the next multiple of eight columns.
fn expand_tabs(text: &str) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + TAB_SIZE);
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let pad = TAB_SIZE - column % TAB_SIZE;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}
