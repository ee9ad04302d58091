//! The `<upstream>` block: upstream maintainers, changelog, documentation,
//! bug tracker and remote identifiers.

use colored::Color;
use roxmltree::Node;

use crate::config::RenderConfig;
use crate::extract::{text_of, PackageMetadata};
use crate::field::{push_group, Field};
use crate::style::Palette;
use crate::wrap::format_list;

/// Continuation indent matching the width of the section labels.
const SECTION_INDENT: &str = "            ";

/// Sub-sections of an `<upstream>` element, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Maintainer,
    Changelog,
    Docs,
    BugsTo,
    RemoteId,
}

impl Section {
    const ALL: [Section; 5] = [
        Section::Maintainer,
        Section::Changelog,
        Section::Docs,
        Section::BugsTo,
        Section::RemoteId,
    ];

    fn label(self) -> &'static str {
        match self {
            Section::Maintainer => "Maintainer: ",
            Section::Changelog => "Changelog:  ",
            Section::Docs => "Docs:       ",
            Section::BugsTo => "Bugs to:    ",
            Section::RemoteId => "Remote ID:  ",
        }
    }

    fn entries(self, node: Node, palette: &Palette) -> Vec<Field> {
        match self {
            Section::Maintainer => maintainer_entries(node, palette),
            Section::Changelog => children(node, "changelog")
                .map(|n| Field::text(text_of(n)))
                .collect(),
            Section::Docs => children(node, "doc")
                .map(|n| match n.attribute("lang") {
                    Some(lang) => Field::Text(format!(
                        "{} ({})",
                        text_of(n),
                        palette.paint(lang, Color::Yellow)
                    )),
                    None => Field::text(text_of(n)),
                })
                .collect(),
            Section::BugsTo => children(node, "bugs-to")
                .map(|n| Field::text(text_of(n)))
                .collect(),
            Section::RemoteId => children(node, "remote-id")
                .map(|n| {
                    Field::Text(format!(
                        "{}: {}",
                        n.attribute("type").unwrap_or(""),
                        text_of(n)
                    ))
                })
                .collect(),
        }
    }
}

impl PackageMetadata<'_> {
    /// One field per non-empty upstream sub-section, upstream elements
    /// separated by [`Field::Separator`].
    ///
    /// Each field is already labelled (`Maintainer: `, `Docs:       `, ...)
    /// and wrapped; multiple lines within a section are joined with `\n`.
    pub fn upstream(&self, palette: &Palette, cfg: &RenderConfig) -> Vec<Field> {
        let mut fields = Vec::new();
        for (i, node) in self.top_level("upstream").enumerate() {
            let group: Vec<Field> = Section::ALL
                .iter()
                .filter_map(|section| render_section(*section, node, palette, cfg))
                .map(Field::Text)
                .collect();
            if group.is_empty() {
                log::debug!("<upstream> element #{i} has no content");
            }
            push_group(&mut fields, i, group);
        }
        fields
    }
}

fn render_section(
    section: Section,
    node: Node,
    palette: &Palette,
    cfg: &RenderConfig,
) -> Option<String> {
    let entries = section.entries(node, palette);
    let blocks = format_list(&entries, section.label(), SECTION_INDENT, true, cfg);
    (!blocks.is_empty()).then(|| blocks.join("\n"))
}

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| n.has_tag_name(tag))
}

fn maintainer_entries(node: Node, palette: &Palette) -> Vec<Field> {
    let mut entries = Vec::new();
    for maint in children(node, "maintainer") {
        if let Some(name) = children(maint, "name").next() {
            entries.push(Field::text(text_of(name)));
        }
        if let Some(email) = children(maint, "email").next() {
            entries.push(Field::text(text_of(email)));
        }
        match maint.attribute("status") {
            Some("active") => entries.push(Field::Text(format!(
                "({})",
                palette.paint("active", Color::Green)
            ))),
            Some("inactive") => entries.push(Field::Text(format!(
                "({})",
                palette.paint("inactive", Color::Red)
            ))),
            Some(status) => entries.push(Field::Text(format!("({status})"))),
            None => {}
        }
    }
    entries
}
