//! Retained widgets that tables and rows are built from.

use crossterm::event::MouseEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Text;
use ratatui::widgets::Widget;

use crate::Result;

/// A retained widget that can live inside a table cell or row.
///
/// Elements render into a [`Buffer`] directly, so they work the same inside a
/// live terminal frame and in a headless render.
pub trait Element {
    /// Draw the element into `area`.
    fn render(&self, area: Rect, buf: &mut Buffer);

    /// Width the element wants when it is sized to its content.
    fn width(&self) -> u16;

    /// Rows needed at the given width.
    fn height(&self, width: u16) -> u16 {
        _ = width;
        1
    }

    /// Plain text shown by the element, without styling.
    fn text(&self) -> String;

    /// Handle a mouse event that landed inside `area`.
    ///
    /// Returns `Ok(true)` if the element reacted to it.
    fn mouse_event(&mut self, event: &MouseEvent, area: Rect) -> Result<bool> {
        _ = (event, area);
        Ok(false)
    }
}

/// Plain, non-interactive text.
#[derive(Debug, Clone, Default)]
pub struct Label {
    text: Text<'static>,
}

impl Label {
    pub fn new(text: impl Into<Text<'static>>) -> Self {
        Self { text: text.into() }
    }

    #[must_use]
    pub fn styled(mut self, style: Style) -> Self {
        self.text = self.text.style(style);
        self
    }

    #[must_use]
    pub const fn content(&self) -> &Text<'static> {
        &self.text
    }
}

impl Element for Label {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        (&self.text).render(area, buf);
    }

    fn width(&self) -> u16 {
        u16::try_from(self.text.width()).unwrap_or(u16::MAX)
    }

    fn height(&self, _width: u16) -> u16 {
        u16::try_from(self.text.height()).unwrap_or(u16::MAX).max(1)
    }

    fn text(&self) -> String {
        self.text
            .lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Applies a base style underneath another element.
///
/// Colors the inner element sets itself win over the base style.
pub struct Styled {
    inner: Box<dyn Element>,
    style: Style,
}

impl Styled {
    pub fn new(inner: Box<dyn Element>, style: Style) -> Self {
        Self { inner, style }
    }

    #[must_use]
    pub const fn style(&self) -> Style {
        self.style
    }

    #[must_use]
    pub fn inner(&self) -> &dyn Element {
        self.inner.as_ref()
    }
}

impl Element for Styled {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.style);
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

/// Adapter for drawing an [`Element`] with `Frame::render_widget`.
pub struct ElementWidget<'a>(pub &'a dyn Element);

impl Widget for ElementWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.0.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_label_size() {
        let label = Label::new("hello");
        assert_eq!(label.width(), 5);
        assert_eq!(label.height(10), 1);
        assert_eq!(label.text(), "hello");

        let multi = Label::new("a\nlonger");
        assert_eq!(multi.width(), 6);
        assert_eq!(multi.height(10), 2);
    }

    #[test]
    fn test_label_render() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 1));
        Label::new("abc").render(buf.area, &mut buf);
        assert_eq!(buf, Buffer::with_lines(["abc   "]));
    }

    #[test]
    fn test_styled_keeps_inner_color() {
        let inner = Label::new("x").styled(Style::default().fg(Color::Red));
        let styled = Styled::new(Box::new(inner), Style::default().fg(Color::Blue).bg(Color::Black));
        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 1));
        styled.render(buf.area, &mut buf);

        assert_eq!(buf[(0, 0)].fg, Color::Red);
        assert_eq!(buf[(0, 0)].bg, Color::Black);
        assert_eq!(buf[(1, 0)].bg, Color::Black);
    }

    #[test]
    fn test_element_widget() {
        let label = Label::new("hi");
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 1));
        ElementWidget(&label).render(buf.area, &mut buf);
        assert_eq!(buf, Buffer::with_lines(["hi "]));
    }
}
