//! Text widgets that react to mouse clicks.

use std::fmt;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Text;
use tracing::info;

use crate::element::{Element, Label};
use crate::redirect::with_stderr_suppressed;
use crate::{Error, Result};

type Callback = Box<dyn FnMut() -> Result<()>>;

/// Text that runs a callback when clicked with the primary button.
///
/// Errors returned by the callback are passed straight back to the caller of
/// [`Element::mouse_event`].
pub struct ClickableText {
    label: Label,
    callback: Callback,
}

impl ClickableText {
    pub fn new(
        text: impl Into<Text<'static>>,
        callback: impl FnMut() -> Result<()> + 'static,
    ) -> Self {
        Self {
            label: Label::new(text),
            callback: Box::new(callback),
        }
    }

    #[must_use]
    pub fn styled(mut self, style: Style) -> Self {
        self.label = self.label.styled(style);
        self
    }

    /// Invoke the callback as if the text had been clicked.
    pub fn click(&mut self) -> Result<()> {
        (self.callback)()
    }
}

impl fmt::Debug for ClickableText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickableText")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Element for ClickableText {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        self.label.render(area, buf);
    }

    fn width(&self) -> u16 {
        self.label.width()
    }

    fn height(&self, width: u16) -> u16 {
        self.label.height(width)
    }

    fn text(&self) -> String {
        self.label.text()
    }

    fn mouse_event(&mut self, event: &MouseEvent, area: Rect) -> Result<bool> {
        let inside = area.contains(Position::new(event.column, event.row));
        if inside && event.kind == MouseEventKind::Down(MouseButton::Left) {
            self.click()?;
            return Ok(true);
        }
        Ok(false)
    }
}

/// Clickable text that opens a URL with the platform's default handler.
#[derive(Debug)]
pub struct LinkText {
    inner: ClickableText,
    url: String,
}

impl LinkText {
    pub fn new(text: impl Into<Text<'static>>, url: impl Into<String>) -> Self {
        let url = url.into();
        let target = url.clone();
        let inner = ClickableText::new(text, move || open_url(&target))
            .styled(Style::default().add_modifier(Modifier::UNDERLINED));
        Self { inner, url }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn styled(mut self, style: Style) -> Self {
        self.inner = self.inner.styled(style);
        self
    }
}

impl Element for LinkText {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        self.inner.render(area, buf);
    }

    fn width(&self) -> u16 {
        self.inner.width()
    }

    fn height(&self, width: u16) -> u16 {
        self.inner.height(width)
    }

    fn text(&self) -> String {
        self.inner.text()
    }

    fn mouse_event(&mut self, event: &MouseEvent, area: Rect) -> Result<bool> {
        self.inner.mouse_event(event, area)
    }
}

/// Open `url` in the default browser with stderr silenced for the call.
///
/// Browsers tend to print diagnostics that would corrupt the terminal UI.
pub fn open_url(url: &str) -> Result<()> {
    info!(url, "Opening link");
    with_stderr_suppressed(|| open::that(url))?.map_err(|source| Error::OpenUrl {
        url: url.to_string(),
        source,
    })
}
