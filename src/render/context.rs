use crate::config::Theme;
use ratatui::style::Color;

/// Snapshot of theme colors for rendering.
/// Passed to widgets to avoid threading many individual parameters.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub primary: Color,
    pub secondary: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub dimmed: Color,
    pub background: Color,
    pub controls_bg: Color,
    pub keybind_hints: Color,
    pub keybind_labels: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub table_header: Color,
    pub table_border: Color,
    pub palette: Vec<Color>,
}

impl RenderContext {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            primary: theme.get("primary"),
            secondary: theme.get("secondary"),
            success: theme.get("success"),
            error: theme.get("error"),
            warning: theme.get("warning"),
            dimmed: theme.get("dimmed"),
            background: theme.get("background"),
            controls_bg: theme.get("controls_bg"),
            keybind_hints: theme.get("keybind_hints"),
            keybind_labels: theme.get("keybind_labels"),
            text_primary: theme.get("text_primary"),
            text_secondary: theme.get("text_secondary"),
            table_header: theme.get("table_header"),
            table_border: theme.get("table_border"),
            palette: theme.chart_palette(),
        }
    }

    /// Series color for slot `i`, cycling through the palette.
    pub fn series_color(&self, i: usize) -> Color {
        if self.palette.is_empty() {
            return self.primary;
        }
        self.palette[i % self.palette.len()]
    }

    /// Border color for a control, brighter when it has focus.
    pub fn border(&self, focused: bool) -> Color {
        if focused {
            self.primary
        } else {
            self.dimmed
        }
    }
}
