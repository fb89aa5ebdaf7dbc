use catppuccin::PALETTE;
use ratatui::style::Color;

/// Convert a catppuccin color to a ratatui color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colors tables, footers and screenshots are drawn with.
///
/// Use the factory functions like `catppuccin_mocha()` for the built-in
/// flavors, or set the fields directly for a custom palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    // Base colors
    pub base: Color,
    pub mantle: Color,
    pub crust: Color,

    // Surface colors
    pub surface0: Color,
    pub surface1: Color,

    // Text colors
    pub text: Color,
    pub subtext0: Color,

    // Accent colors
    pub red: Color,
    pub yellow: Color,
    pub mauve: Color,
}

impl Theme {
    /// Create a theme from a Catppuccin flavor.
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            mantle: catppuccin_to_color(&c.mantle),
            crust: catppuccin_to_color(&c.crust),
            surface0: catppuccin_to_color(&c.surface0),
            surface1: catppuccin_to_color(&c.surface1),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            red: catppuccin_to_color(&c.red),
            yellow: catppuccin_to_color(&c.yellow),
            mauve: catppuccin_to_color(&c.mauve),
        }
    }

    /// Catppuccin Mocha theme (dark).
    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    /// Catppuccin Latte theme (light).
    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    /// Catppuccin Frappé theme (dark).
    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    /// Catppuccin Macchiato theme (dark).
    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    #[must_use]
    pub const fn base(&self) -> Color {
        self.base
    }

    #[must_use]
    pub const fn crust(&self) -> Color {
        self.crust
    }

    #[must_use]
    pub const fn surface0(&self) -> Color {
        self.surface0
    }

    #[must_use]
    pub const fn text(&self) -> Color {
        self.text
    }

    #[must_use]
    pub const fn text_muted(&self) -> Color {
        self.subtext0
    }

    // Semantic colors
    #[must_use]
    pub const fn error(&self) -> Color {
        self.red
    }

    #[must_use]
    pub const fn prompt(&self) -> Color {
        self.mauve
    }

    #[must_use]
    pub const fn selection_bg(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn header(&self) -> Color {
        self.yellow
    }

    #[must_use]
    pub const fn status_bg(&self) -> Color {
        self.mantle
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

/// A named built-in theme.
#[derive(Debug, Clone)]
pub struct ThemeInfo {
    /// Display name for the theme
    pub name: &'static str,
    /// Short name accepted in config files
    pub id: &'static str,
    pub theme: Theme,
}

impl ThemeInfo {
    const fn new(name: &'static str, id: &'static str, theme: Theme) -> Self {
        Self { name, id, theme }
    }
}

impl std::fmt::Display for ThemeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Returns a list of all available built-in themes.
#[must_use]
pub fn available_themes() -> Vec<ThemeInfo> {
    vec![
        ThemeInfo::new("Catppuccin Mocha", "mocha", Theme::catppuccin_mocha()),
        ThemeInfo::new("Catppuccin Macchiato", "macchiato", Theme::catppuccin_macchiato()),
        ThemeInfo::new("Catppuccin Frappé", "frappe", Theme::catppuccin_frappe()),
        ThemeInfo::new("Catppuccin Latte", "latte", Theme::catppuccin_latte()),
    ]
}

/// Look up a theme by display name or id. Returns the default theme if not found.
#[must_use]
pub fn theme_from_name(name: &str) -> Theme {
    available_themes()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name) || t.id.eq_ignore_ascii_case(name))
        .map(|t| t.theme)
        .unwrap_or_default()
}
