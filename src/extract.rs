//! Field extraction from a package's `metadata.xml`.

use std::fs;
use std::path::Path;

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{Error, Result};
use crate::field::{push_group, Field};
use crate::style::Palette;

/// Read a `metadata.xml` file.
///
/// Any I/O failure becomes [`Error::MetadataUnavailable`].
pub fn read_metadata(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::MetadataUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// A parsed `metadata.xml` document.
pub struct PackageMetadata<'input> {
    doc: Document<'input>,
}

impl<'input> PackageMetadata<'input> {
    /// Parse a metadata document; `path` is only used for error reporting.
    ///
    /// # Examples
    ///
    /// ```
    /// use portage_meta::PackageMetadata;
    /// use std::path::Path;
    ///
    /// let xml = "<pkgmetadata><herd>base-system</herd></pkgmetadata>";
    /// let meta = PackageMetadata::parse(Path::new("metadata.xml"), xml).unwrap();
    /// assert_eq!(meta.herd_names(), vec!["base-system"]);
    /// ```
    pub fn parse(path: &Path, text: &'input str) -> Result<Self> {
        let doc = Document::parse_with_options(text, parsing_options()).map_err(|e| {
            Error::MetadataUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        Ok(PackageMetadata { doc })
    }

    pub(crate) fn top_level<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
        self.doc
            .root_element()
            .children()
            .filter(move |n| n.has_tag_name(tag))
    }

    /// Text of every top-level `<herd>`, in document order.
    pub fn herd_names(&self) -> Vec<&str> {
        self.top_level("herd").map(text_of).collect()
    }

    /// One field per herd.
    ///
    /// In verbose mode `resolve` is asked for the herd's contact address
    /// and a hit renders as `name (email)`.
    pub fn herds<F>(&self, verbose: bool, mut resolve: F) -> Vec<Field>
    where
        F: FnMut(&str) -> Option<String>,
    {
        self.herd_names()
            .into_iter()
            .map(|name| match verbose.then(|| resolve(name)).flatten() {
                Some(email) => Field::Text(format!("{name} ({email})")),
                None => Field::text(name),
            })
            .collect()
    }

    /// Maintainer records separated by [`Field::Separator`].
    ///
    /// Each record is an optional restriction marker followed by the text of
    /// every child element of `<maintainer>` in document order.
    pub fn maintainers(&self, palette: &Palette) -> Vec<Field> {
        let mut fields = Vec::new();
        for (i, node) in self.top_level("maintainer").enumerate() {
            let mut group = Vec::new();
            if let Some(restrict) = node.attribute("restrict") {
                group.push(Field::Text(palette.restrict(restrict)));
            }
            group.extend(
                node.children()
                    .filter(Node::is_element)
                    .map(|child| Field::text(text_of(child))),
            );
            push_group(&mut fields, i, group);
        }
        fields
    }

    /// One field per `<longdescription>`, raw text, every language.
    pub fn descriptions(&self) -> Vec<Field> {
        self.top_level("longdescription")
            .map(|n| Field::text(text_of(n)))
            .collect()
    }

    /// Flag name and flag body for every `<flag>`, separated per flag.
    pub fn useflags(&self, palette: &Palette) -> Vec<Field> {
        let mut fields = Vec::new();
        let flags = self.doc.descendants().filter(|n| n.has_tag_name("flag"));
        for (i, node) in flags.enumerate() {
            let name = palette.useflag(node.attribute("name").unwrap_or(""));
            let title = match node.attribute("restrict") {
                Some(restrict) => format!("{name} {}", palette.restrict(restrict)),
                None => name,
            };
            push_group(
                &mut fields,
                i,
                vec![Field::Text(title), Field::Text(flag_body(node, palette))],
            );
        }
        fields
    }
}

/// Metadata documents carry a `DOCTYPE`, which roxmltree rejects by default.
pub(crate) fn parsing_options<'a>() -> ParsingOptions<'a> {
    ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    }
}

/// First text child of an element, or `""`.
pub(crate) fn text_of<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("")
}

/// Render a flag description as a single line of prose.
///
/// Nested `<pkg>` and `<cat>` references are highlighted; other markup is
/// dropped while its text is kept.
fn flag_body(node: Node, palette: &Palette) -> String {
    let mut raw = String::new();
    render_inline(node, palette, &mut raw);
    collapse_whitespace(&raw)
}

fn render_inline(node: Node, palette: &Palette, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            out.push_str(child.text().unwrap_or(""));
        } else if child.has_tag_name("pkg") || child.has_tag_name("cat") {
            let text: String = child
                .descendants()
                .filter(Node::is_text)
                .filter_map(|n| n.text())
                .collect();
            out.push_str(&palette.cpv(&collapse_whitespace(&text)));
        } else if child.is_element() {
            render_inline(child, palette, out);
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const METADATA: &str = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <!DOCTYPE pkgmetadata SYSTEM "http://www.gentoo.org/dtd/metadata.dtd">
        <pkgmetadata>
          <herd>base-system</herd>
          <herd>no-herd</herd>
          <maintainer>
            <email>jane@gentoo.org</email>
            <name>Jane Doe</name>
          </maintainer>
          <maintainer restrict="&gt;=sys-apps/foo-2">
            <email>john@gentoo.org</email>
            <description>Only the new series</description>
          </maintainer>
          <longdescription>
            A tool that does things.
          </longdescription>
          <longdescription lang="de">Ein Werkzeug.</longdescription>
          <use>
            <flag name="ssl">Enable   <b>SSL</b> support via
              <pkg>dev-libs/openssl</pkg> &amp; friends</flag>
            <flag name="gtk" restrict="&gt;=sys-apps/foo-2">Use <cat>x11-libs</cat> widgets</flag>
          </use>
        </pkgmetadata>
    "#};

    fn parsed(xml: &str) -> PackageMetadata<'_> {
        PackageMetadata::parse(Path::new("metadata.xml"), xml).unwrap()
    }

    #[test]
    fn herd_names_in_order() {
        assert_eq!(parsed(METADATA).herd_names(), vec!["base-system", "no-herd"]);
    }

    #[test]
    fn herds_without_verbose_skip_resolution() {
        let meta = parsed(METADATA);
        let mut calls = 0;
        let fields = meta.herds(false, |_| {
            calls += 1;
            Some("x@example.org".to_string())
        });
        assert_eq!(calls, 0);
        assert_eq!(fields, vec![Field::text("base-system"), Field::text("no-herd")]);
    }

    #[test]
    fn herds_verbose_append_email() {
        let meta = parsed(METADATA);
        let fields = meta.herds(true, |name| {
            (name == "base-system").then(|| "base-system@gentoo.org".to_string())
        });
        assert_eq!(
            fields,
            vec![
                Field::text("base-system (base-system@gentoo.org)"),
                Field::text("no-herd"),
            ]
        );
    }

    #[test]
    fn maintainers_are_grouped() {
        let fields = parsed(METADATA).maintainers(&Palette::plain());
        assert_eq!(
            fields,
            vec![
                Field::text("jane@gentoo.org"),
                Field::text("Jane Doe"),
                Field::Separator,
                Field::text("(Restrict to >=sys-apps/foo-2)"),
                Field::text("john@gentoo.org"),
                Field::text("Only the new series"),
            ]
        );
    }

    #[test]
    fn empty_first_maintainer_still_separated() {
        let meta = parsed(
            "<pkgmetadata><maintainer/><maintainer><email>x</email></maintainer></pkgmetadata>",
        );
        assert_eq!(
            meta.maintainers(&Palette::plain()),
            vec![Field::Separator, Field::text("x")]
        );
    }

    #[test]
    fn no_maintainers() {
        let meta = parsed("<pkgmetadata><herd>x</herd></pkgmetadata>");
        assert!(meta.maintainers(&Palette::plain()).is_empty());
    }

    #[test]
    fn descriptions_keep_raw_text_of_all_languages() {
        let fields = parsed(METADATA).descriptions();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], Field::text("\n    A tool that does things.\n  "));
        assert_eq!(fields[1], Field::text("Ein Werkzeug."));
    }

    #[test]
    fn useflags_render_inline_markup() {
        let fields = parsed(METADATA).useflags(&Palette::plain());
        assert_eq!(
            fields,
            vec![
                Field::text("ssl"),
                Field::text("Enable SSL support via dev-libs/openssl & friends"),
                Field::Separator,
                Field::text("gtk (Restrict to >=sys-apps/foo-2)"),
                Field::text("Use x11-libs widgets"),
            ]
        );
    }

    #[test]
    fn useflag_references_are_highlighted() {
        colored::control::set_override(true);
        let fields = parsed(METADATA).useflags(&Palette::colored());
        let Field::Text(body) = &fields[1] else {
            panic!("expected flag body");
        };
        assert!(body.contains(&Palette::colored().cpv("dev-libs/openssl")));
    }

    #[test]
    fn empty_elements_yield_empty_text() {
        let meta = parsed("<pkgmetadata><herd/><longdescription></longdescription></pkgmetadata>");
        assert_eq!(meta.herd_names(), vec![""]);
        assert_eq!(meta.descriptions(), vec![Field::text("")]);
    }

    #[test]
    fn malformed_document_is_unavailable() {
        let err = PackageMetadata::parse(Path::new("metadata.xml"), "<pkgmetadata>").err();
        assert!(matches!(err, Some(Error::MetadataUnavailable { .. })));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = read_metadata(Path::new("/nonexistent/metadata.xml")).unwrap_err();
        assert!(matches!(err, Error::MetadataUnavailable { .. }));
    }
}
