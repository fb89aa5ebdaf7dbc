//! Export a rendered element as a static HTML page.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use ratatui::buffer::{Buffer, CellDiffOption};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier};
use ratatui::text::Span;
use tracing::info;

use crate::Result;
use crate::Theme;
use crate::element::Element;

/// Page wrapped around the rendered fragment; `{0}` marks where it goes.
pub const DEFAULT_TEMPLATE: &str =
    r#"<html><head><meta charset="utf-8"></head><body><center>{0}</center></body>"#;

const PLACEHOLDER: &str = "{0}";

/// The 16 ANSI colors, xterm defaults.
const ANSI: [&str; 16] = [
    "#000000", "#cd0000", "#00cd00", "#cdcd00", "#0000ee", "#cd00cd", "#00cdcd", "#e5e5e5",
    "#7f7f7f", "#ff0000", "#00ff00", "#ffff00", "#5c5cff", "#ff00ff", "#00ffff", "#ffffff",
];

/// How terminal colors are written out as CSS colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    /// Used where a cell keeps the terminal's default foreground.
    pub fg: String,
    /// Used where a cell keeps the terminal's default background.
    pub bg: String,
    pub overrides: HashMap<Color, String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            fg: "#c0c0c0".to_string(),
            bg: ANSI[0].to_string(),
            overrides: HashMap::new(),
        }
    }
}

impl Palette {
    /// Defaults taken from the theme's text and base colors.
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        let plain = Self::default();
        Self {
            fg: plain.css(theme.text(), true),
            bg: plain.css(theme.base(), false),
            overrides: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, color: Color, css: impl Into<String>) -> Self {
        self.overrides.insert(color, css.into());
        self
    }

    /// CSS color for `color`; `fg` picks which default `Reset` maps to.
    #[must_use]
    pub fn css(&self, color: Color, fg: bool) -> String {
        if let Some(css) = self.overrides.get(&color) {
            return css.clone();
        }
        match color {
            Color::Reset if fg => self.fg.clone(),
            Color::Reset => self.bg.clone(),
            Color::Rgb(r, g, b) => format!("#{r:02x}{g:02x}{b:02x}"),
            Color::Indexed(n) => indexed(n),
            named => ANSI[ansi_index(named)].to_string(),
        }
    }
}

const fn ansi_index(color: Color) -> usize {
    match color {
        Color::Red => 1,
        Color::Green => 2,
        Color::Yellow => 3,
        Color::Blue => 4,
        Color::Magenta => 5,
        Color::Cyan => 6,
        Color::Gray => 7,
        Color::DarkGray => 8,
        Color::LightRed => 9,
        Color::LightGreen => 10,
        Color::LightYellow => 11,
        Color::LightBlue => 12,
        Color::LightMagenta => 13,
        Color::LightCyan => 14,
        Color::White => 15,
        _ => 0,
    }
}

fn indexed(n: u8) -> String {
    match n {
        0..=15 => ANSI[usize::from(n)].to_string(),
        // 6x6x6 color cube
        16..=231 => {
            let idx = n - 16;
            let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            let (r, g, b) = (level(idx / 36), level((idx / 6) % 6), level(idx % 6));
            format!("#{r:02x}{g:02x}{b:02x}")
        }
        // Grayscale ramp
        232..=255 => {
            let gray = 8 + (n - 232) * 10;
            format!("#{gray:02x}{gray:02x}{gray:02x}")
        }
    }
}

fn escape(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct RunStyle {
    fg: Color,
    bg: Color,
    modifier: Modifier,
}

/// Turns a rendered [`Buffer`] into an HTML `<pre>` fragment.
#[derive(Debug, Clone, Default)]
pub struct HtmlGenerator {
    palette: Palette,
}

impl HtmlGenerator {
    #[must_use]
    pub const fn new(palette: Palette) -> Self {
        Self { palette }
    }

    #[must_use]
    pub fn fragment(&self, buf: &Buffer) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            r#"<pre style="color:{};background-color:{}">"#,
            self.palette.fg, self.palette.bg
        );
        let area = buf.area;
        for y in area.top()..area.bottom() {
            if y > area.top() {
                html.push('\n');
            }
            self.line(buf, y, &mut html);
        }
        html.push_str("</pre>");
        html
    }

    fn line(&self, buf: &Buffer, y: u16, html: &mut String) {
        let mut run: Option<(RunStyle, String)> = None;
        let mut hidden = 0usize;
        for x in buf.area.left()..buf.area.right() {
            let cell = &buf[(x, y)];
            if hidden > 0 {
                hidden -= 1;
                continue;
            }
            if cell.diff_option == CellDiffOption::Skip {
                continue;
            }
            let symbol = cell.symbol();
            // Trailing cells of a wide character hold a placeholder.
            hidden = Span::raw(symbol).width().saturating_sub(1);

            let style = RunStyle {
                fg: cell.fg,
                bg: cell.bg,
                modifier: cell.modifier,
            };
            match &mut run {
                Some((current, text)) if *current == style => text.push_str(symbol),
                _ => {
                    if let Some((current, text)) = run.take() {
                        self.span(current, &text, html);
                    }
                    run = Some((style, symbol.to_string()));
                }
            }
        }
        if let Some((current, text)) = run {
            self.span(current, &text, html);
        }
    }

    fn span(&self, style: RunStyle, text: &str, html: &mut String) {
        let (mut fg, mut bg) = (
            self.palette.css(style.fg, true),
            self.palette.css(style.bg, false),
        );
        if style.modifier.contains(Modifier::REVERSED) {
            std::mem::swap(&mut fg, &mut bg);
        }
        let mut css = format!("color:{fg};background-color:{bg}");
        if style.modifier.contains(Modifier::BOLD) {
            css.push_str(";font-weight:bold");
        }
        if style.modifier.contains(Modifier::ITALIC) {
            css.push_str(";font-style:italic");
        }
        if style.modifier.contains(Modifier::UNDERLINED) {
            css.push_str(";text-decoration:underline");
        }
        let _ = write!(html, r#"<span style="{css}">"#);
        escape(text, html);
        html.push_str("</span>");
    }
}

/// Where and how [`take_screenshot`] writes its page.
#[derive(Debug, Clone)]
pub struct ScreenshotOptions {
    /// File name without the `.html` suffix; defaults to the local time.
    pub filename: Option<String>,
    pub dir: PathBuf,
    pub palette: Palette,
    /// Render size as `(columns, rows)`.
    pub size: (u16, u16),
    pub template: String,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self {
            filename: None,
            dir: PathBuf::from("."),
            palette: Palette::default(),
            size: (100, 40),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl ScreenshotOptions {
    fn file_path(&self) -> PathBuf {
        let name = self.filename.as_ref().map_or_else(
            || chrono::Local::now().format("%d-%m-%Y_%H.%M.html").to_string(),
            |name| format!("{name}.html"),
        );
        self.dir.join(name)
    }
}

/// Render `element` headlessly into a fresh buffer of the given size.
#[must_use]
pub fn render_to_buffer(element: &dyn Element, (width, height): (u16, u16)) -> Buffer {
    let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
    element.render(buf.area, &mut buf);
    buf
}

/// Render `element` and write it as an HTML page. Returns the written path.
pub fn take_screenshot(element: &dyn Element, options: &ScreenshotOptions) -> Result<PathBuf> {
    let buf = render_to_buffer(element, options.size);
    let fragment = HtmlGenerator::new(options.palette.clone()).fragment(&buf);
    let page = fill_template(&options.template, &fragment);
    let path = options.file_path();
    write_page(&path, &page)?;
    info!(path = %path.display(), "Wrote screenshot");
    Ok(path)
}

/// Substitute `{0}` with `fragment` and unescape `{{`/`}}`, in one pass so
/// braces inside the fragment are left alone.
fn fill_template(template: &str, fragment: &str) -> String {
    let mut page = String::with_capacity(template.len() + fragment.len());
    let mut rest = template;
    while let Some(i) = rest.find(['{', '}']) {
        page.push_str(&rest[..i]);
        rest = &rest[i..];
        if let Some(tail) = rest.strip_prefix(PLACEHOLDER) {
            page.push_str(fragment);
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("{{").or_else(|| rest.strip_prefix("}}")) {
            page.push_str(&rest[..1]);
            rest = tail;
        } else {
            page.push_str(&rest[..1]);
            rest = &rest[1..];
        }
    }
    page.push_str(rest);
    page
}

fn write_page(path: &Path, page: &str) -> Result<()> {
    fs::write(path, page)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Label, Styled};
    use ratatui::style::Style;

    #[test]
    fn test_named_file_with_template_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let options = ScreenshotOptions {
            filename: Some("shot".into()),
            dir: dir.path().to_path_buf(),
            size: (10, 2),
            ..ScreenshotOptions::default()
        };
        let path = take_screenshot(&Label::new("hello"), &options).unwrap();

        assert_eq!(path, dir.path().join("shot.html"));
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let page = fs::read_to_string(&path).unwrap();
        let prefix = &DEFAULT_TEMPLATE[..DEFAULT_TEMPLATE.find(PLACEHOLDER).unwrap()];
        assert!(page.starts_with(prefix));
        assert!(page.contains("hello"));
        assert!(page.ends_with("</center></body>"));
    }

    #[test]
    fn test_default_filename_is_timestamp() {
        let options = ScreenshotOptions::default();
        let name = options.file_path();
        let name = name.file_name().unwrap().to_string_lossy();
        let stem = name.strip_suffix(".html").unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(stem, "%d-%m-%Y_%H.%M").is_ok());
    }

    #[test]
    fn test_template_braces_unescaped() {
        let template = "<style>pre {{ margin: 0 }}</style>{0}";
        assert_eq!(
            fill_template(template, "<pre>{{x}}</pre>"),
            "<style>pre { margin: 0 }</style><pre>{{x}}</pre>"
        );
        assert_eq!(fill_template(DEFAULT_TEMPLATE, "F"), DEFAULT_TEMPLATE.replace(PLACEHOLDER, "F"));
    }

    #[test]
    fn test_skipped_cells_left_out() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 1));
        buf.set_string(0, 0, "abc", Style::default());
        buf[(1, 0)].set_diff_option(CellDiffOption::Skip);
        let html = HtmlGenerator::default().fragment(&buf);
        assert!(html.contains(">ac</span>"));
    }

    #[test]
    fn test_write_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let options = ScreenshotOptions {
            filename: Some("shot".into()),
            dir: dir.path().join("missing"),
            ..ScreenshotOptions::default()
        };
        assert!(take_screenshot(&Label::new("x"), &options).is_err());
    }

    #[test]
    fn test_fragment_escapes_and_groups_runs() {
        let element = Styled::new(Box::new(Label::new("<a&b>")), Style::default().fg(Color::Red));
        let buf = render_to_buffer(&element, (5, 1));
        let html = HtmlGenerator::default().fragment(&buf);
        assert_eq!(
            html,
            concat!(
                r#"<pre style="color:#c0c0c0;background-color:#000000">"#,
                r#"<span style="color:#cd0000;background-color:#000000">&lt;a&amp;b&gt;</span>"#,
                "</pre>"
            )
        );
    }

    #[test]
    fn test_palette_colors() {
        let palette = Palette::default().with(Color::Blue, "navy");
        assert_eq!(palette.css(Color::Blue, true), "navy");
        assert_eq!(palette.css(Color::Rgb(1, 2, 255), true), "#0102ff");
        assert_eq!(palette.css(Color::Indexed(196), true), "#ff0000");
        assert_eq!(palette.css(Color::Indexed(232), true), "#080808");
        assert_eq!(palette.css(Color::Reset, false), "#000000");
    }

    #[test]
    fn test_bold_and_reversed() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 1));
        buf[(0, 0)]
            .set_symbol("x")
            .set_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
        let html = HtmlGenerator::default().fragment(&buf);
        assert!(html.contains(
            r#"<span style="color:#000000;background-color:#c0c0c0;font-weight:bold">x</span>"#
        ));
    }
}
