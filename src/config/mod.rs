pub mod loader;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tablebox::column::config::ColumnConfig;
use tablebox::screenshot::{Palette, ScreenshotOptions};
use tablebox::{TableOptions, Theme};

pub use loader::load;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub title: Option<String>,
    pub headers: bool,
    pub zebra: bool,
    pub divider: u16,
    /// `[left, right]` blank columns around the table
    pub padding: Option<(u16, u16)>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            title: None,
            headers: true,
            zebra: true,
            divider: 1,
            padding: None,
        }
    }
}

impl TableConfig {
    pub fn options(&self, theme: &Theme) -> TableOptions {
        let mut options = TableOptions::default()
            .headers(self.headers)
            .zebra(self.zebra)
            .divider(self.divider)
            .with_theme(theme);
        if let Some(title) = &self.title {
            options = options.title(title.as_str());
        }
        if let Some((left, right)) = self.padding {
            options = options.padding(left, right);
        }
        options
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    pub dir: Option<PathBuf>,
    pub width: u16,
    pub height: u16,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            dir: None,
            width: 100,
            height: 40,
        }
    }
}

impl ScreenshotConfig {
    pub fn options(&self, theme: &Theme) -> ScreenshotOptions {
        let mut options = ScreenshotOptions {
            palette: Palette::from_theme(theme),
            size: (self.width, self.height),
            ..ScreenshotOptions::default()
        };
        if let Some(dir) = &self.dir {
            options.dir.clone_from(dir);
        }
        options
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub screenshot: ScreenshotConfig,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}
