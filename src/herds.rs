use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;

use crate::error::{Error, Result};
use crate::extract::parsing_options;

/// Herd names that never appear in `herds.xml`.
pub const RESERVED_HERDS: [&str; 3] = ["no-herd", "maintainer-wanted", "maintainer-needed"];

/// Returns `true` for herd names that never resolve to a contact.
pub fn is_reserved(herd: &str) -> bool {
    RESERVED_HERDS.contains(&herd)
}

type Entries = HashMap<String, Option<String>>;

/// The herds registry (`metadata/herds.xml`), loaded on first use.
///
/// The document is read and parsed at most once per registry value. A
/// failed load is remembered too, so a missing registry costs one attempt.
#[derive(Debug)]
pub struct HerdRegistry {
    path: PathBuf,
    entries: OnceCell<std::result::Result<Entries, String>>,
}

impl HerdRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HerdRegistry {
            path: path.into(),
            entries: OnceCell::new(),
        }
    }

    /// Registry living in a repository's `metadata/herds.xml`.
    pub fn for_repository(repo: &Path) -> Self {
        HerdRegistry::new(repo.join("metadata").join("herds.xml"))
    }

    /// Build a registry from an in-memory document.
    pub fn from_xml(path: impl Into<PathBuf>, xml: &str) -> Self {
        let registry = HerdRegistry::new(path);
        let _ = registry.entries.set(parse_registry(xml));
        registry
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Contact address of `herd`.
    ///
    /// Reserved herds resolve to `None` without touching the registry.
    /// Herds missing from the registry, or listed without an email, also
    /// resolve to `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use portage_meta::HerdRegistry;
    ///
    /// let registry = HerdRegistry::from_xml(
    ///     "herds.xml",
    ///     "<herds><herd><name>base-system</name><email>base@example.org</email></herd></herds>",
    /// );
    /// assert_eq!(registry.email("base-system").unwrap(), Some("base@example.org"));
    /// assert_eq!(registry.email("no-herd").unwrap(), None);
    /// ```
    pub fn email(&self, herd: &str) -> Result<Option<&str>> {
        if is_reserved(herd) {
            return Ok(None);
        }
        match self.load() {
            Ok(entries) => Ok(entries
                .get(herd)
                .and_then(|email| email.as_deref())
                .filter(|email| !email.is_empty())),
            Err(reason) => Err(Error::RegistryUnavailable {
                path: self.path.clone(),
                reason: reason.clone(),
            }),
        }
    }

    /// Returns `true` once a load has been attempted.
    pub fn is_loaded(&self) -> bool {
        self.entries.get().is_some()
    }

    fn load(&self) -> &std::result::Result<Entries, String> {
        self.entries.get_or_init(|| {
            log::debug!("loading herds registry from {}", self.path.display());
            match fs::read_to_string(&self.path) {
                Ok(text) => parse_registry(&text),
                Err(e) => Err(e.to_string()),
            }
        })
    }
}

fn parse_registry(xml: &str) -> std::result::Result<Entries, String> {
    let doc = roxmltree::Document::parse_with_options(xml, parsing_options())
        .map_err(|e| e.to_string())?;
    let mut entries = Entries::new();
    for herd in doc.descendants().filter(|n| n.has_tag_name("herd")) {
        let Some(name) = child_text(herd, "name") else {
            continue;
        };
        let email = child_text(herd, "email").map(str::to_string);
        // First entry wins on duplicate names.
        entries.entry(name.to_string()).or_insert(email);
    }
    log::debug!("herds registry has {} entries", entries.len());
    Ok(entries)
}

fn child_text<'a>(node: roxmltree::Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.has_tag_name(tag))
        .map(|c| c.text().unwrap_or(""))
}
