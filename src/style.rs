use colored::{Color, Colorize};

/// Terminal highlighting used while extracting fields.
///
/// When disabled every method returns its input unchanged, which is what
/// `--no-color` and piped output rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    /// A palette that emits ANSI color sequences.
    pub fn colored() -> Self {
        Palette { enabled: true }
    }

    /// A palette that leaves text untouched.
    pub fn plain() -> Self {
        Palette { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Bold emphasis.
    pub fn emph(&self, s: &str) -> String {
        if self.enabled {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }

    /// Colorize with a named terminal color.
    pub fn paint(&self, s: &str, color: Color) -> String {
        if self.enabled {
            s.color(color).to_string()
        } else {
            s.to_string()
        }
    }

    /// Package or category reference.
    pub fn cpv(&self, s: &str) -> String {
        self.paint(s, Color::Green)
    }

    /// USE flag name.
    pub fn useflag(&self, s: &str) -> String {
        self.paint(s, Color::Blue)
    }

    /// `(Restrict to <value>)` marker for restricted maintainers and flags.
    pub fn restrict(&self, value: &str) -> String {
        format!("({} {})", self.emph("Restrict to"), self.paint(value, Color::Green))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::plain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_is_identity() {
        let p = Palette::plain();
        assert_eq!(p.emph("x"), "x");
        assert_eq!(p.cpv("dev-lang/rust"), "dev-lang/rust");
        assert_eq!(p.restrict(">=dev-lang/rust-1.80"), "(Restrict to >=dev-lang/rust-1.80)");
    }

    #[test]
    fn colored_wraps_text() {
        colored::control::set_override(true);
        let p = Palette::colored();
        let painted = p.cpv("dev-lang/rust");
        assert!(painted.contains("dev-lang/rust"));
        assert!(painted.starts_with('\u{1b}'));
    }
}
