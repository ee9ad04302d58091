//! Per-package orchestration: extract each requested category, format it and
//! write it out in a fixed order.

use std::cell::Cell;
use std::io::Write;
use std::path::Path;

use colored::Color;

use crate::atom::PackageQuery;
use crate::config::{Categories, RenderConfig};
use crate::error::{Error, Result};
use crate::extract::{read_metadata, PackageMetadata};
use crate::field::Field;
use crate::herds::HerdRegistry;
use crate::repo::{PackageDir, Repositories};
use crate::style::Palette;
use crate::wrap::format_list;

pub const HERD_LABEL: &str = "Herd:        ";
pub const MAINTAINER_LABEL: &str = "Maintainer:  ";
pub const UPSTREAM_LABEL: &str = "Upstream:    ";
/// Continuation indent for labelled output, as wide as the labels.
pub const LABEL_INDENT: &str = "             ";

/// Prefix for messages written to the error stream.
pub const ERROR_PREFIX: &str = "!!! ";

/// Renders package metadata for a batch of queries.
pub struct Meta<'a> {
    categories: Categories,
    render: RenderConfig,
    palette: Palette,
    repos: &'a Repositories,
    herds: &'a HerdRegistry,
    registry_reported: Cell<bool>,
}

impl<'a> Meta<'a> {
    pub fn new(
        categories: Categories,
        render: RenderConfig,
        repos: &'a Repositories,
        herds: &'a HerdRegistry,
    ) -> Self {
        let palette = if render.color {
            Palette::colored()
        } else {
            Palette::plain()
        };
        Meta {
            categories,
            render,
            palette,
            repos,
            herds,
            registry_reported: Cell::new(false),
        }
    }

    /// Process queries in order, separating packages with a blank line.
    ///
    /// A package without readable metadata is reported on `err` and
    /// skipped. A query matching no package stops the batch with
    /// [`Error::NoSuchPackage`].
    pub fn run<W: Write, E: Write>(
        &self,
        queries: &[PackageQuery],
        out: &mut W,
        err: &mut E,
    ) -> Result<()> {
        for (i, query) in queries.iter().enumerate() {
            let pkg = self.repos.find_package(query)?;
            if i > 0 {
                writeln!(out)?;
            }
            self.show(&pkg, out, err)?;
        }
        Ok(())
    }

    /// Process the package directory `dir` directly (`--current`).
    pub fn run_current<W: Write, E: Write>(
        &self,
        dir: &Path,
        out: &mut W,
        err: &mut E,
    ) -> Result<()> {
        let pkg = self.repos.package_at(dir);
        self.show(&pkg, out, err)
    }

    /// Print everything requested about one package.
    pub fn show<W: Write, E: Write>(
        &self,
        pkg: &PackageDir,
        out: &mut W,
        err: &mut E,
    ) -> Result<()> {
        if self.render.verbose {
            writeln!(out, "{}", self.header(pkg))?;
        }
        match self.show_metadata(pkg, out, err) {
            Err(Error::MetadataUnavailable { path, reason }) => {
                log::debug!("{}: {reason}", path.display());
                writeln!(err, "{ERROR_PREFIX}No metadata available")?;
                Ok(())
            }
            other => other,
        }
    }

    /// ` * category/name`, plus ` [overlay]` outside the main tree.
    pub fn header(&self, pkg: &PackageDir) -> String {
        let mut header = format!(" * {}", self.palette.cpv(&pkg.cat_pkg()));
        if let Some(overlay) = &pkg.overlay {
            header.push(' ');
            header.push_str(&self.palette.paint(&format!("[{overlay}]"), Color::Cyan));
        }
        header
    }

    fn show_metadata<W: Write, E: Write>(
        &self,
        pkg: &PackageDir,
        out: &mut W,
        err: &mut E,
    ) -> Result<()> {
        let path = pkg.metadata_path();
        let text = read_metadata(&path)?;
        let meta = PackageMetadata::parse(&path, &text)?;
        self.render(&meta, &text, out, err)
    }

    /// Write the requested categories of a parsed document.
    ///
    /// Order is fixed: herd, maintainer, upstream, description, USE flags,
    /// raw XML. `raw` is the document text, used for the XML dump.
    pub fn render<W: Write, E: Write>(
        &self,
        meta: &PackageMetadata,
        raw: &str,
        out: &mut W,
        err: &mut E,
    ) -> Result<()> {
        let cats = &self.categories;
        let (herd_label, maint_label, upstream_label, indent) = if cats.labelled() {
            (HERD_LABEL, MAINTAINER_LABEL, UPSTREAM_LABEL, LABEL_INDENT)
        } else {
            ("", "", "", "")
        };

        if cats.show_herd() {
            let herds = self.herd_fields(meta, err)?;
            self.emit(&herds, herd_label, indent, out)?;
        }
        if cats.show_maintainer() {
            self.emit(&meta.maintainers(&self.palette), maint_label, indent, out)?;
        }
        if cats.show_upstream() {
            let upstream = meta.upstream(&self.palette, &self.render);
            self.emit(&upstream, upstream_label, indent, out)?;
        }
        if cats.description {
            self.emit(&meta.descriptions(), "", "", out)?;
        }
        if cats.useflags {
            self.emit(&meta.useflags(&self.palette), "", "", out)?;
        }
        if cats.xml {
            out.write_all(raw.as_bytes())?;
            out.flush()?;
        }
        Ok(())
    }

    fn herd_fields<E: Write>(
        &self,
        meta: &PackageMetadata,
        err: &mut E,
    ) -> Result<Vec<Field>> {
        let mut failure = None;
        let fields = meta.herds(self.render.verbose, |name| match self.herds.email(name) {
            Ok(email) => email.map(str::to_string),
            Err(e) => {
                failure.get_or_insert(e);
                None
            }
        });
        if let Some(e) = failure {
            if !self.registry_reported.replace(true) {
                log::warn!("{e}");
                writeln!(err, "{ERROR_PREFIX}{e}")?;
            }
        }
        Ok(fields)
    }

    fn emit<W: Write>(
        &self,
        fields: &[Field],
        first: &str,
        rest: &str,
        out: &mut W,
    ) -> Result<()> {
        for block in format_list(fields, first, rest, false, &self.render) {
            writeln!(out, "{block}")?;
        }
        out.flush()?;
        Ok(())
    }
}
