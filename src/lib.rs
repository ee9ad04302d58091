//! Display Gentoo package `metadata.xml` information as terminal text.
//!
//! This crate extracts herds, maintainers, long descriptions, per-package
//! USE flag notes and upstream information from a package's
//! [`metadata.xml`] and renders them for a terminal of a given width.
//!
//! [`metadata.xml`]: https://devmanual.gentoo.org/ebuild-writing/misc-files/metadata/
//!
//! # Overview
//!
//! Rendering happens in two stages. Extraction turns the document into an
//! ordered list of [`Field`]s, where a [`Field::Separator`] marks the
//! boundary between two maintainers, two USE flags or two upstream blocks.
//! Formatting then renders each field: text that fits the terminal keeps its
//! authored line breaks, wider text is reflowed and wrapped, and the first
//! line gets a different prefix than the following ones.
//!
//! # Examples
//!
//! ```
//! use std::path::Path;
//! use portage_meta::{format_list, PackageMetadata, Palette, RenderConfig};
//!
//! let xml = "\
//! <pkgmetadata>
//!   <maintainer><email>jane@gentoo.org</email><name>Jane</name></maintainer>
//!   <maintainer><email>john@gentoo.org</email></maintainer>
//! </pkgmetadata>";
//! let meta = PackageMetadata::parse(Path::new("metadata.xml"), xml).unwrap();
//! let cfg = RenderConfig::new(80, false);
//! let lines = format_list(
//!     &meta.maintainers(&Palette::plain()),
//!     "Maintainer:  ",
//!     "             ",
//!     false,
//!     &cfg,
//! );
//! assert_eq!(
//!     lines,
//!     vec![
//!         "Maintainer:  jane@gentoo.org",
//!         "             Jane",
//!         "",
//!         "             john@gentoo.org",
//!     ]
//! );
//! ```

mod atom;
mod config;
mod error;
mod extract;
mod field;
mod herds;
mod makeconf;
mod meta;
mod repo;
mod style;
mod upstream;
mod wrap;

// Re-export public types
pub use atom::PackageQuery;
pub use config::{Categories, RenderConfig, DEFAULT_TERM_WIDTH};
pub use error::{Error, Result};
pub use extract::{read_metadata, PackageMetadata};
pub use field::Field;
pub use herds::{is_reserved, HerdRegistry, RESERVED_HERDS};
pub use makeconf::MakeConf;
pub use meta::{Meta, ERROR_PREFIX, HERD_LABEL, LABEL_INDENT, MAINTAINER_LABEL, UPSTREAM_LABEL};
pub use repo::{PackageDir, Repositories, Repository, MAKE_CONF_PATHS};
pub use style::Palette;
pub use wrap::{format_line, format_list, NONE_SPECIFIED};
