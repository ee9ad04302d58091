/// Fallback width when neither `COLUMNS` nor the terminal report one.
pub const DEFAULT_TERM_WIDTH: usize = 80;

/// Rendering settings shared by every formatter for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Column budget for wrapped output.
    pub term_width: usize,
    /// Print headers and `None specified` placeholders.
    pub verbose: bool,
    /// Emit ANSI colors.
    pub color: bool,
}

impl RenderConfig {
    pub fn new(term_width: usize, verbose: bool) -> Self {
        RenderConfig {
            term_width: term_width.max(1),
            verbose,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Resolve the terminal width: an explicit override first, then the
    /// size reported by the terminal, then [`DEFAULT_TERM_WIDTH`].
    pub fn detect_width(explicit: Option<usize>) -> usize {
        if let Some(width) = explicit.filter(|w| *w > 0) {
            return width;
        }
        match crossterm::terminal::size() {
            Ok((cols, _)) if cols > 0 => usize::from(cols),
            Ok(_) => DEFAULT_TERM_WIDTH,
            Err(e) => {
                log::debug!("terminal size unavailable ({e}), using {DEFAULT_TERM_WIDTH}");
                DEFAULT_TERM_WIDTH
            }
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig::new(DEFAULT_TERM_WIDTH, true)
    }
}

/// Which metadata categories a run prints.
///
/// Built once from the command line; an all-`false` value means "no
/// specific category requested", which prints herd, maintainer and
/// upstream with labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Categories {
    pub herd: bool,
    pub maintainer: bool,
    pub upstream: bool,
    pub description: bool,
    pub useflags: bool,
    pub xml: bool,
}

impl Categories {
    /// Returns `true` when at least one category flag was given.
    pub fn any_requested(&self) -> bool {
        self.herd || self.maintainer || self.upstream || self.description || self.useflags || self.xml
    }

    /// Returns `true` when output should carry `Herd:` style labels.
    pub fn labelled(&self) -> bool {
        !self.any_requested()
    }

    pub fn show_herd(&self) -> bool {
        self.herd || self.labelled()
    }

    pub fn show_maintainer(&self) -> bool {
        self.maintainer || self.labelled()
    }

    pub fn show_upstream(&self) -> bool {
        self.upstream || self.labelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_categories_show_summary() {
        let cats = Categories::default();
        assert!(cats.labelled());
        assert!(cats.show_herd());
        assert!(cats.show_maintainer());
        assert!(cats.show_upstream());
        assert!(!cats.description);
    }

    #[test]
    fn explicit_category_disables_summary() {
        let cats = Categories {
            useflags: true,
            ..Default::default()
        };
        assert!(!cats.labelled());
        assert!(!cats.show_herd());
        assert!(!cats.show_maintainer());
        assert!(!cats.show_upstream());
    }

    #[test]
    fn xml_alone_counts_as_request() {
        let cats = Categories {
            xml: true,
            ..Default::default()
        };
        assert!(cats.any_requested());
    }

    #[test]
    fn explicit_width_wins() {
        assert_eq!(RenderConfig::detect_width(Some(42)), 42);
    }

    #[test]
    fn zero_width_is_clamped() {
        assert_eq!(RenderConfig::new(0, false).term_width, 1);
    }
}
