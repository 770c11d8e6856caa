use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use supports_color::Stream;

pub const CONFIG_FILE: &str = "config.toml";
const CONFIG_VERSION: &str = "0.1";

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Default configuration as TOML with every field commented out, so the
    /// file documents the defaults without overriding them.
    pub fn generate_default_config(&self) -> Result<String> {
        let toml_str = toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| eyre!("Failed to serialize default config: {}", e))?;
        Ok(comment_all_fields(&toml_str, &collect_all_comments()))
    }

    /// Write the commented default config. Refuses to overwrite unless `force`.
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path(CONFIG_FILE);

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, self.generate_default_config()?)?;

        Ok(config_path)
    }
}

fn collect_all_comments() -> HashMap<String, String> {
    let sections: [(&str, &[(&str, &str)]); 6] = [
        ("", APP_COMMENTS),
        ("display", DISPLAY_COMMENTS),
        ("performance", PERFORMANCE_COMMENTS),
        ("chart", CHART_COMMENTS),
        ("theme.colors", COLOR_COMMENTS),
        ("debug", DEBUG_COMMENTS),
    ];
    let mut comments = HashMap::new();
    for (section, fields) in sections {
        for (field, comment) in fields {
            let key = if section.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", section, field)
            };
            comments.insert(key, comment.to_string());
        }
    }
    comments
}

fn push_commented(out: &mut String, text: &str) {
    for line in text.lines() {
        out.push_str("# ");
        out.push_str(line);
        out.push('\n');
    }
}

/// Comment out every section header and field, adding the field's description above it.
/// Option fields that serialize to nothing are added as `# field = ...` placeholders.
fn comment_all_fields(toml: &str, comments: &HashMap<String, String>) -> String {
    let mut result = String::new();
    result.push_str("# carscope configuration file\n");
    result.push_str("# This file uses TOML format. See https://toml.io/ for syntax reference.\n\n");

    let mut current_section = String::new();
    let mut seen: HashSet<String> = HashSet::new();

    for line in toml.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            current_section = trimmed[1..trimmed.len() - 1].to_string();
            if let Some((_, header)) = SECTION_HEADERS.iter().find(|(s, _)| *s == current_section)
            {
                result.push_str(header);
                result.push('\n');
            }
            push_commented(&mut result, line);
            push_missing_options(&mut result, &current_section, comments, &mut seen);
            continue;
        }

        match trimmed.split_once('=') {
            Some((field, _)) if !trimmed.starts_with('#') => {
                let path = if current_section.is_empty() {
                    field.trim().to_string()
                } else {
                    format!("{}.{}", current_section, field.trim())
                };
                if let Some(comment) = comments.get(&path) {
                    push_commented(&mut result, comment);
                }
                seen.insert(path);
                push_commented(&mut result, line);
            }
            _ => {
                result.push_str(line);
                result.push('\n');
            }
        }
    }

    result
}

fn push_missing_options(
    out: &mut String,
    section: &str,
    comments: &HashMap<String, String>,
    seen: &mut HashSet<String>,
) {
    for (path, example) in OPTION_FIELDS {
        let Some((field_section, field)) = path.rsplit_once('.') else {
            continue;
        };
        if field_section != section || seen.contains(*path) {
            continue;
        }
        if let Some(comment) = comments.get(*path) {
            push_commented(out, comment);
        }
        out.push_str(&format!("# {} = {}\n", field, example));
        seen.insert(path.to_string());
    }
}

/// Option fields and the example value shown for them in the generated file.
const OPTION_FIELDS: &[(&str, &str)] = &[("chart.export_dir", "\"~/Pictures/carscope\"")];

const APP_COMMENTS: &[(&str, &str)] = &[(
    "version",
    "Configuration format version (for future compatibility)",
)];

const SECTION_HEADERS: &[(&str, &str)] = &[
    (
        "display",
        "# ============================================================================\n# Display Settings\n# ============================================================================",
    ),
    (
        "performance",
        "# ============================================================================\n# Performance Settings\n# ============================================================================",
    ),
    (
        "chart",
        "# ============================================================================\n# Chart Export\n# ============================================================================",
    ),
    (
        "theme.colors",
        "# ============================================================================\n# Color Theme\n# ============================================================================\n# Supported formats:\n#   - Named colors: \"red\", \"blue\", \"bright_red\", \"dark_gray\", etc. (case-insensitive)\n#   - Hex colors: \"#ff0000\"\n#   - Indexed colors: \"indexed(0-255)\"\n# Set NO_COLOR to disable colors entirely.",
    ),
    (
        "debug",
        "# ============================================================================\n# Debug Settings\n# ============================================================================",
    ),
];

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: String,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub chart: ChartConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            chart: ChartConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_banner: bool,
    pub sidebar_width: u16,
}

const DISPLAY_COMMENTS: &[(&str, &str)] = &[
    (
        "show_banner",
        "Show the title banner and cover image reference on the Home page",
    ),
    ("sidebar_width", "Width of the sidebar in columns (minimum 24)"),
];

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_banner: true,
            sidebar_width: 34,
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = Self::default();
        if other.show_banner != default.show_banner {
            self.show_banner = other.show_banner;
        }
        if other.sidebar_width != default.sidebar_width {
            self.sidebar_width = other.sidebar_width;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

const PERFORMANCE_COMMENTS: &[(&str, &str)] = &[(
    "event_poll_interval_ms",
    "How often to poll the terminal for input, in milliseconds",
)];

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        if other.event_poll_interval_ms != Self::default().event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub export_format: String,
    pub export_dir: Option<PathBuf>,
    pub export_width: u32,
    pub export_height: u32,
}

const CHART_COMMENTS: &[(&str, &str)] = &[
    ("export_format", "Image format for exported charts: \"png\" or \"svg\""),
    (
        "export_dir",
        "Directory for exported charts. Unset means the current directory",
    ),
    ("export_width", "Exported image width in pixels"),
    ("export_height", "Exported image height in pixels"),
];

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            export_format: "png".to_string(),
            export_dir: None,
            export_width: 1024,
            export_height: 768,
        }
    }
}

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        let default = Self::default();
        if other.export_format != default.export_format {
            self.export_format = other.export_format;
        }
        if other.export_dir.is_some() {
            self.export_dir = other.export_dir;
        }
        if other.export_width != default.export_width {
            self.export_width = other.export_width;
        }
        if other.export_height != default.export_height {
            self.export_height = other.export_height;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.colors.merge(other.colors);
    }
}

/// Declares the color fields once: struct, defaults, merge, validation list and comments.
macro_rules! color_config {
    ($($field:ident: $default:literal => $comment:literal,)*) => {
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(default)]
        pub struct ColorConfig {
            $(pub $field: String,)*
        }

        impl Default for ColorConfig {
            fn default() -> Self {
                Self {
                    $($field: $default.to_string(),)*
                }
            }
        }

        impl ColorConfig {
            /// (name, value) for every color, in declaration order.
            pub fn entries(&self) -> Vec<(&'static str, &str)> {
                vec![$((stringify!($field), self.$field.as_str()),)*]
            }

            pub fn merge(&mut self, other: Self) {
                let default = Self::default();
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )*
            }
        }

        const COLOR_COMMENTS: &[(&str, &str)] = &[$((stringify!($field), $comment),)*];
    };
}

color_config! {
    primary: "cyan" => "Headings and focused borders",
    secondary: "yellow" => "Secondary highlights such as the selected page",
    success: "green" => "Success messages (e.g. export finished)",
    error: "red" => "Error panel and failed export messages",
    warning: "yellow" => "Warnings",
    dimmed: "dark_gray" => "Unfocused borders and inactive items",
    background: "reset" => "Main background",
    controls_bg: "indexed(236)" => "Background of the bottom control bar",
    keybind_hints: "cyan" => "Keys in the control bar",
    keybind_labels: "white" => "Action labels in the control bar",
    text_primary: "white" => "Primary text and axis labels",
    text_secondary: "dark_gray" => "Secondary text and placeholders",
    table_header: "white" => "Table header text",
    table_border: "cyan" => "Table borders",
    chart_series_1: "cyan" => "Chart palette, first series",
    chart_series_2: "magenta" => "Chart palette, second series",
    chart_series_3: "green" => "Chart palette, third series",
    chart_series_4: "yellow" => "Chart palette, fourth series",
    chart_series_5: "blue" => "Chart palette, fifth series",
    chart_series_6: "red" => "Chart palette, sixth series",
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_level: String,
}

const DEBUG_COMMENTS: &[(&str, &str)] = &[
    (
        "enabled",
        "Show the debug status row and write a log file to the cache directory",
    ),
    (
        "log_level",
        "Log level for the log file: trace, debug, info, warn or error (RUST_LOG overrides)",
    ),
];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_level: "info".to_string(),
        }
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        let default = Self::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
        if other.log_level != default.log_level {
            self.log_level = other.log_level;
        }
    }
}

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        Self::load_from(&ConfigManager::new(app_name)?)
    }

    /// Load from a specific config directory. A missing file yields the defaults.
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        if let Some(user_config) = Self::load_user_config(manager)? {
            config.merge(user_config);
        }
        config.validate()?;
        Ok(config)
    }

    fn load_user_config(manager: &ConfigManager) -> Result<Option<AppConfig>> {
        let config_path = manager.config_path(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map(Some).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }
        self.display.merge(other.display);
        self.performance.merge(other.performance);
        self.chart.merge(other.chart);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with(CONFIG_VERSION) {
            return Err(eyre!(
                "Unsupported config version: {}. Expected {}.x",
                self.version,
                CONFIG_VERSION
            ));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        if self.display.sidebar_width < 24 {
            return Err(eyre!(
                "sidebar_width must be at least 24, got {}",
                self.display.sidebar_width
            ));
        }

        match self.chart.export_format.to_lowercase().as_str() {
            "png" | "svg" => {}
            other => {
                return Err(eyre!(
                    "Invalid export_format: {}. Must be 'png' or 'svg'",
                    other
                ))
            }
        }

        for (name, value) in [
            ("export_width", self.chart.export_width),
            ("export_height", self.chart.export_height),
        ] {
            if !(200..=8192).contains(&value) {
                return Err(eyre!("{} must be between 200 and 8192, got {}", name, value));
            }
        }

        if !LOG_LEVELS.contains(&self.debug.log_level.to_lowercase().as_str()) {
            return Err(eyre!(
                "Invalid log_level: {}. Must be one of {}",
                self.debug.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        let parser = ColorParser::new();
        for (name, value) in self.theme.colors.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }

        Ok(())
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parse a color string (named, hex or indexed) into a terminal color
    pub fn parse(&self, s: &str) -> Result<Color> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();

        let color = if trimmed.starts_with('#') {
            let (r, g, b) = parse_hex(trimmed)?;
            self.convert_rgb_to_terminal_color(r, g, b)
        } else if let Some(num) = lower
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let num = num.trim().parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            Color::Indexed(num)
        } else {
            parse_named(&lower).ok_or_else(|| {
                eyre!(
                    "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                     bright variants (bright_red, etc.), hex colors (#ff0000) or indexed(n)",
                    trimmed
                )
            })?
        };

        // Invalid values are still rejected when colors are disabled.
        Ok(if self.no_color { Color::Reset } else { color })
    }

    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_named(name: &str) -> Option<Color> {
    let name = name.replace(' ', "_");
    let color = match name.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "bright_black" | "gray" | "grey" | "dark_gray" | "dark_grey" => Color::Indexed(8),
        "bright_red" => Color::Indexed(9),
        "bright_green" => Color::Indexed(10),
        "bright_yellow" => Color::Indexed(11),
        "bright_blue" => Color::Indexed(12),
        "bright_magenta" => Color::Indexed(13),
        "bright_cyan" => Color::Indexed(14),
        "bright_white" => Color::Indexed(15),
        "light_gray" | "light_grey" => Color::Indexed(7),
        "reset" | "default" => Color::Reset,
        _ => return None,
    };
    Some(color)
}

/// Parse hex color string (#ff0000) to RGB components
fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 || !s.is_ascii() {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let component = |range: std::ops::Range<usize>, name: &str| {
        u8::from_str_radix(&s[range], 16)
            .map_err(|_| eyre!("Invalid {} component in hex color: {}", name, s))
    };
    Ok((
        component(1..3, "red")?,
        component(3..5, "green")?,
        component(5..7, "blue")?,
    ))
}

/// Convert RGB to nearest xterm 256-color palette index
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        // grayscale ramp 232-255
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    // 6x6x6 color cube 16-231
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Parsed theme colors, looked up by config field name.
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let colors = config
            .colors
            .entries()
            .into_iter()
            .map(|(name, value)| Ok((name.to_string(), parser.parse(value)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    pub fn get_optional(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    /// Chart palette in series order.
    pub fn chart_palette(&self) -> Vec<Color> {
        (1..=6)
            .map(|i| self.get(&format!("chart_series_{}", i)))
            .collect()
    }
}
