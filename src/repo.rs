//! Package repositories (the main tree plus overlays) and package lookup.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::atom::PackageQuery;
use crate::error::{Error, Result};
use crate::herds::HerdRegistry;
use crate::makeconf::MakeConf;

/// Locations searched for `make.conf`, most specific first.
pub const MAKE_CONF_PATHS: [&str; 2] = ["/etc/portage/make.conf", "/etc/make.conf"];

const DEFAULT_MAIN_TREES: [&str; 2] = ["/var/db/repos/gentoo", "/usr/portage"];

/// A single package repository on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Repository root.
    pub path: PathBuf,
    /// Name from `profiles/repo_name`, or the directory name.
    pub name: String,
}

impl Repository {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = repo_name(&path);
        Repository { path, name }
    }

    /// Category directories, from `profiles/categories` when present.
    fn categories(&self) -> Vec<String> {
        let listed = self.path.join("profiles").join("categories");
        if let Ok(text) = fs::read_to_string(&listed) {
            return text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string)
                .collect();
        }

        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("cannot read repository {}: {e}", self.path.display());
                return Vec::new();
            }
        };
        let mut categories: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.contains('-') || name == "virtual")
            .collect();
        categories.sort();
        categories
    }

    fn package(&self, category: &str, name: &str, overlay: bool) -> Option<PackageDir> {
        let path = self.path.join(category).join(name);
        path.is_dir().then(|| PackageDir {
            path,
            category: category.to_string(),
            name: name.to_string(),
            overlay: overlay.then(|| self.name.clone()),
        })
    }

    fn matches(&self, query: &PackageQuery, overlay: bool) -> Vec<PackageDir> {
        match &query.category {
            Some(category) => self.package(category, &query.name, overlay).into_iter().collect(),
            None => self
                .categories()
                .iter()
                .filter_map(|category| self.package(category, &query.name, overlay))
                .collect(),
        }
    }
}

fn repo_name(path: &Path) -> String {
    if let Ok(text) = fs::read_to_string(path.join("profiles").join("repo_name")) {
        if let Some(name) = text.lines().next().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
    }
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A located package directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDir {
    pub path: PathBuf,
    pub category: String,
    pub name: String,
    /// Overlay name, `None` for the main tree.
    pub overlay: Option<String>,
}

impl PackageDir {
    pub fn metadata_path(&self) -> PathBuf {
        self.path.join("metadata.xml")
    }

    /// `category/name`.
    pub fn cat_pkg(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }
}

/// The main tree and any overlays, searched in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repositories {
    main: Repository,
    overlays: Vec<Repository>,
}

impl Repositories {
    pub fn new<I, P>(main: impl Into<PathBuf>, overlays: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Repositories {
            main: Repository::open(main),
            overlays: overlays.into_iter().map(Repository::open).collect(),
        }
    }

    /// Repositories configured by `PORTDIR` / `PORTDIR_OVERLAY`, taken from
    /// the environment first and `make.conf` second.
    pub fn from_env() -> Result<Self> {
        let mut make_conf = None;
        for path in MAKE_CONF_PATHS {
            if let Some(conf) = MakeConf::load(Path::new(path))? {
                make_conf = Some(conf);
                break;
            }
        }
        Ok(Repositories::from_settings(
            |key| env::var(key).ok(),
            make_conf.as_ref(),
        ))
    }

    /// Resolve repositories from a variable lookup and an optional
    /// `make.conf`.
    pub fn from_settings<F>(lookup: F, make_conf: Option<&MakeConf>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |key: &str| {
            lookup(key)
                .or_else(|| make_conf.and_then(|c| c.get(key)).map(str::to_string))
                .filter(|v| !v.trim().is_empty())
        };

        let main = setting("PORTDIR")
            .map(|p| PathBuf::from(p.trim()))
            .unwrap_or_else(default_main_tree);
        let overlays: Vec<PathBuf> = setting("PORTDIR_OVERLAY")
            .map(|v| v.split_whitespace().map(PathBuf::from).collect())
            .unwrap_or_default();
        log::debug!("main tree {}, {} overlay(s)", main.display(), overlays.len());
        Repositories::new(main, overlays)
    }

    pub fn main(&self) -> &Repository {
        &self.main
    }

    pub fn overlays(&self) -> &[Repository] {
        &self.overlays
    }

    /// Herds registry of the main tree.
    pub fn herd_registry(&self) -> HerdRegistry {
        HerdRegistry::for_repository(&self.main.path)
    }

    /// Find the directory of the package named by `query`.
    ///
    /// The main tree is searched before overlays. A bare name matching
    /// several categories of the same repository is ambiguous.
    pub fn find_package(&self, query: &PackageQuery) -> Result<PackageDir> {
        let searched = std::iter::once((&self.main, false))
            .chain(self.overlays.iter().map(|repo| (repo, true)));
        for (repo, overlay) in searched {
            let mut hits = repo.matches(query, overlay);
            match hits.len() {
                0 => continue,
                1 => {
                    let hit = hits.remove(0);
                    log::debug!("{query} found at {}", hit.path.display());
                    return Ok(hit);
                }
                _ => {
                    return Err(Error::AmbiguousPackage {
                        query: query.to_string(),
                        candidates: hits.iter().map(PackageDir::cat_pkg).collect(),
                    })
                }
            }
        }
        Err(Error::NoSuchPackage(query.to_string()))
    }

    /// Describe an arbitrary package directory, such as the working
    /// directory in `--current` mode.
    ///
    /// Category and name are the last two path components; the package is
    /// in an overlay unless its repository root is the main tree.
    pub fn package_at(&self, dir: &Path) -> PackageDir {
        let component = |p: Option<&Path>| {
            p.and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let parent = dir.parent();
        let root = parent.and_then(Path::parent);

        let overlay = match root {
            Some(root) if same_path(root, &self.main.path) => None,
            Some(root) => Some(
                self.overlays
                    .iter()
                    .find(|o| same_path(&o.path, root))
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| repo_name(root)),
            ),
            None => None,
        };

        PackageDir {
            path: dir.to_path_buf(),
            category: component(parent),
            name: component(Some(dir)),
            overlay,
        }
    }
}

fn default_main_tree() -> PathBuf {
    DEFAULT_MAIN_TREES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_dir())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MAIN_TREES[1]))
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_repo(root: &Path, name: Option<&str>, packages: &[&str]) {
        fs::create_dir_all(root.join("profiles")).unwrap();
        if let Some(name) = name {
            fs::write(root.join("profiles/repo_name"), format!("{name}\n")).unwrap();
        }
        for pkg in packages {
            fs::create_dir_all(root.join(pkg)).unwrap();
        }
    }

    fn fixture() -> (TempDir, Repositories) {
        let tmp = tempfile::tempdir().unwrap();
        let main = tmp.path().join("gentoo");
        let overlay = tmp.path().join("local-overlay");
        make_repo(
            &main,
            Some("gentoo"),
            &["sys-apps/portage", "app-editors/vim", "app-vim/vim", "dev-lang/rust"],
        );
        make_repo(&overlay, Some("local"), &["dev-lang/rust", "app-misc/mytool"]);
        let repos = Repositories::new(&main, [&overlay]);
        (tmp, repos)
    }

    fn query(s: &str) -> PackageQuery {
        s.parse().unwrap()
    }

    #[test]
    fn qualified_lookup() {
        let (_tmp, repos) = fixture();
        let pkg = repos.find_package(&query("sys-apps/portage")).unwrap();
        assert_eq!(pkg.cat_pkg(), "sys-apps/portage");
        assert_eq!(pkg.overlay, None);
        assert!(pkg.metadata_path().ends_with("sys-apps/portage/metadata.xml"));
    }

    #[test]
    fn bare_name_lookup() {
        let (_tmp, repos) = fixture();
        let pkg = repos.find_package(&query("portage")).unwrap();
        assert_eq!(pkg.cat_pkg(), "sys-apps/portage");
    }

    #[test]
    fn main_tree_preferred_over_overlay() {
        let (_tmp, repos) = fixture();
        let pkg = repos.find_package(&query("dev-lang/rust")).unwrap();
        assert_eq!(pkg.overlay, None);
    }

    #[test]
    fn overlay_only_package() {
        let (_tmp, repos) = fixture();
        let pkg = repos.find_package(&query("mytool")).unwrap();
        assert_eq!(pkg.cat_pkg(), "app-misc/mytool");
        assert_eq!(pkg.overlay.as_deref(), Some("local"));
    }

    #[test]
    fn ambiguous_bare_name() {
        let (_tmp, repos) = fixture();
        match repos.find_package(&query("vim")) {
            Err(Error::AmbiguousPackage { candidates, .. }) => {
                assert_eq!(candidates, vec!["app-editors/vim", "app-vim/vim"]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn missing_package() {
        let (_tmp, repos) = fixture();
        let err = repos.find_package(&query("sys-apps/nothing")).unwrap_err();
        assert!(matches!(err, Error::NoSuchPackage(ref q) if q == "sys-apps/nothing"));
    }

    #[test]
    fn categories_file_limits_search() {
        let (tmp, repos) = fixture();
        fs::write(tmp.path().join("gentoo/profiles/categories"), "app-editors\n").unwrap();
        let pkg = repos.find_package(&query("vim")).unwrap();
        assert_eq!(pkg.cat_pkg(), "app-editors/vim");
    }

    #[test]
    fn repo_name_falls_back_to_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("my-overlay");
        make_repo(&root, None, &[]);
        assert_eq!(Repository::open(&root).name, "my-overlay");
    }

    #[test]
    fn package_at_main_tree() {
        let (tmp, repos) = fixture();
        let pkg = repos.package_at(&tmp.path().join("gentoo/sys-apps/portage"));
        assert_eq!(pkg.cat_pkg(), "sys-apps/portage");
        assert_eq!(pkg.overlay, None);
    }

    #[test]
    fn package_at_overlay() {
        let (tmp, repos) = fixture();
        let pkg = repos.package_at(&tmp.path().join("local-overlay/app-misc/mytool"));
        assert_eq!(pkg.overlay.as_deref(), Some("local"));
        let pkg = repos.package_at(&tmp.path().join("elsewhere/cat/pkg"));
        assert_eq!(pkg.overlay.as_deref(), Some("elsewhere"));
    }

    #[test]
    fn settings_prefer_lookup_over_make_conf() {
        let conf = MakeConf::parse("PORTDIR=/from/conf\nPORTDIR_OVERLAY=\"/o1 /o2\"\n").unwrap();
        let repos = Repositories::from_settings(
            |key| (key == "PORTDIR").then(|| "/from/env".to_string()),
            Some(&conf),
        );
        assert_eq!(repos.main().path, PathBuf::from("/from/env"));
        let overlays: Vec<_> = repos.overlays().iter().map(|o| o.path.clone()).collect();
        assert_eq!(overlays, vec![PathBuf::from("/o1"), PathBuf::from("/o2")]);
    }

    #[test]
    fn settings_without_overlays() {
        let repos = Repositories::from_settings(|_| None, None);
        assert!(repos.overlays().is_empty());
    }
}
