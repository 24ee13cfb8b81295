//! Colors, icons and column widths shared by every command.

use crossterm::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: ColorScheme,
    pub icons: Icons,
    /// Width of the mod name column
    pub name_width: usize,
    /// Width of the version column
    pub version_width: usize,
    /// Width of the progress bar
    pub bar_width: usize,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            colors: ColorScheme::default(),
            icons: Icons::default(),
            name_width: 36,
            version_width: 12,
            bar_width: 24,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub name: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            name: Color::Cyan,
            secondary: Color::DarkGrey,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Icons {
    /// Needs download (○)
    pub pending: &'static str,
    /// Transferring (●)
    pub active: &'static str,
    /// Up to date or committed (✓)
    pub success: &'static str,
    /// Failed (✗)
    pub error: &'static str,
    /// Skipped or unknown (⚠)
    pub warning: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            pending: "○",
            active: "●",
            success: "✓",
            error: "✗",
            warning: "⚠",
        }
    }
}

/// Truncate `s` to `width` characters, marking the cut with `…`.
pub fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let kept: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit() {
        assert_eq!(fit("short", 10), "short");
        assert_eq!(fit("FS25_VeryLongModName.zip", 10), "FS25_Very…");
        assert_eq!(fit("FS25_VeryLongModName.zip", 10).chars().count(), 10);
    }
}
