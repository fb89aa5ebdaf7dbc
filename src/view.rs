//! Header/body/footer framing with a transient footer command line.
//!
//! [`FrameView`] hosts a body component (usually a table) and can swap a
//! [`CommandLine`] into its footer for one command, restoring whatever was
//! there before once the command is cleared.

pub mod command_line;

pub use command_line::{CommandLine, CommandLineEvent};

use std::fmt;

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use tracing::debug;

use crate::Result;
use crate::element::Element;
use crate::signal::HandlerId;
use crate::ui::{Component, EventResult};

/// Region of a frame that receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePart {
    Header,
    #[default]
    Body,
    Footer,
}

/// What is shown in the footer.
pub enum Footer {
    Static(Box<dyn Element>),
    Command(CommandLine),
}

impl Footer {
    fn element(&self) -> &dyn Element {
        match self {
            Self::Static(element) => element.as_ref(),
            Self::Command(line) => line,
        }
    }
}

/// Output of [`FrameView`] input handling.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent<E> {
    /// The body produced an event.
    Body(E),
    /// The footer command line finished.
    Command(CommandLineEvent),
}

/// Areas of the three parts for a given frame area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAreas {
    pub header: Rect,
    pub body: Rect,
    pub footer: Rect,
}

/// A body with optional header and footer elements above and below it.
pub struct FrameLayout<B> {
    header: Option<Box<dyn Element>>,
    body: B,
    footer: Option<Footer>,
    focus: FramePart,
}

impl<B: Element> FrameLayout<B> {
    pub const fn new(body: B) -> Self {
        Self {
            header: None,
            body,
            footer: None,
            focus: FramePart::Body,
        }
    }

    pub fn set_header(&mut self, header: Option<Box<dyn Element>>) {
        self.header = header;
    }

    #[must_use]
    pub fn header(&self) -> Option<&dyn Element> {
        self.header.as_deref()
    }

    pub fn set_footer(&mut self, footer: Option<Footer>) -> Option<Footer> {
        std::mem::replace(&mut self.footer, footer)
    }

    #[must_use]
    pub const fn footer(&self) -> Option<&Footer> {
        self.footer.as_ref()
    }

    #[must_use]
    pub const fn focus(&self) -> FramePart {
        self.focus
    }

    pub const fn set_focus(&mut self, part: FramePart) {
        self.focus = part;
    }

    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    pub const fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    /// Header and footer take their natural height; the body gets the rest.
    #[must_use]
    pub fn areas(&self, area: Rect) -> FrameAreas {
        let header = self.header.as_ref().map_or(0, |h| h.height(area.width));
        let footer = self
            .footer
            .as_ref()
            .map_or(0, |f| f.element().height(area.width));
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(header),
            Constraint::Min(0),
            Constraint::Length(footer),
        ])
        .areas(area);
        FrameAreas {
            header,
            body,
            footer,
        }
    }
}

impl<B: Element> Element for FrameLayout<B> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let areas = self.areas(area);
        if let Some(header) = &self.header {
            header.render(areas.header, buf);
        }
        self.body.render(areas.body, buf);
        if let Some(footer) = &self.footer {
            footer.element().render(areas.footer, buf);
        }
    }

    fn width(&self) -> u16 {
        let header = self.header.as_ref().map_or(0, |h| h.width());
        let footer = self.footer.as_ref().map_or(0, |f| f.element().width());
        self.body.width().max(header).max(footer)
    }

    fn height(&self, width: u16) -> u16 {
        let header = self.header.as_ref().map_or(0, |h| h.height(width));
        let footer = self
            .footer
            .as_ref()
            .map_or(0, |f| f.element().height(width));
        header + self.body.height(width) + footer
    }

    fn text(&self) -> String {
        self.header
            .iter()
            .map(|h| h.text())
            .chain(std::iter::once(self.body.text()))
            .chain(self.footer.iter().map(|f| f.element().text()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A [`FrameLayout`] that can host a footer command line.
pub struct FrameView<B> {
    frame: FrameLayout<B>,
    /// Footer replaced by the command line, put back on clear.
    saved_footer: Option<Footer>,
    handler: Option<HandlerId>,
}

impl<B: Element + Component> FrameView<B> {
    pub const fn new(body: B) -> Self {
        Self {
            frame: FrameLayout::new(body),
            saved_footer: None,
            handler: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, header: impl Element + 'static) -> Self {
        self.frame.set_header(Some(Box::new(header)));
        self
    }

    /// Show a static footer such as a status line.
    ///
    /// While a command line is open this replaces the footer restored by
    /// [`footer_clear`](Self::footer_clear) instead.
    pub fn set_status(&mut self, footer: impl Element + 'static) {
        let footer = Footer::Static(Box::new(footer));
        if self.handler.is_some() {
            self.saved_footer = Some(footer);
        } else {
            self.frame.set_footer(Some(footer));
        }
    }

    /// Show `line` in the footer, focus it and connect `callback` to its
    /// `done` signal.
    ///
    /// An already open command line is cleared first.
    pub fn footer_command(
        &mut self,
        mut line: CommandLine,
        callback: impl FnMut(&CommandLineEvent) + 'static,
    ) {
        self.footer_clear();
        let id = line.done.connect(callback);
        self.handler = Some(id);
        self.saved_footer = self.frame.set_footer(Some(Footer::Command(line)));
        self.frame.set_focus(FramePart::Footer);
        debug!("Opened footer command line");
    }

    /// Disconnect the callback, remove the command line and give focus back
    /// to the body. Does nothing if no command line is open.
    pub fn footer_clear(&mut self) {
        let Some(id) = self.handler.take() else {
            return;
        };
        let previous = self.saved_footer.take();
        if let Some(Footer::Command(mut line)) = self.frame.set_footer(previous) {
            line.done.disconnect(id);
        }
        self.frame.set_focus(FramePart::Body);
        debug!("Cleared footer command line");
    }

    #[must_use]
    pub const fn command_line(&self) -> Option<&CommandLine> {
        match self.frame.footer() {
            Some(Footer::Command(line)) => Some(line),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_command_open(&self) -> bool {
        self.handler.is_some()
    }

    #[must_use]
    pub const fn frame(&self) -> &FrameLayout<B> {
        &self.frame
    }

    #[must_use]
    pub const fn body(&self) -> &B {
        self.frame.body()
    }

    pub const fn body_mut(&mut self) -> &mut B {
        self.frame.body_mut()
    }

    #[must_use]
    pub const fn focus(&self) -> FramePart {
        self.frame.focus()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<ViewEvent<B::Output>>> {
        match (self.frame.focus, &mut self.frame.footer) {
            (FramePart::Footer, Some(Footer::Command(line))) => {
                Ok(line.handle_key(key)?.map(ViewEvent::Command))
            }
            (FramePart::Header | FramePart::Footer, _) => Ok(EventResult::Ignored),
            (FramePart::Body, _) => Ok(self.frame.body.handle_key(key)?.map(ViewEvent::Body)),
        }
    }

    /// Route a mouse event to the body if it landed there.
    pub fn handle_mouse(
        &mut self,
        event: MouseEvent,
        area: Rect,
    ) -> Result<EventResult<ViewEvent<B::Output>>> {
        let areas = self.frame.areas(area);
        if !areas.body.contains(Position::new(event.column, event.row)) {
            return Ok(EventResult::Ignored);
        }
        Ok(self
            .frame
            .body
            .handle_mouse(event, areas.body)?
            .map(ViewEvent::Body))
    }
}

impl<B: Element> Element for FrameView<B> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        self.frame.render(area, buf);
    }

    fn width(&self) -> u16 {
        self.frame.width()
    }

    fn height(&self, width: u16) -> u16 {
        self.frame.height(width)
    }

    fn text(&self) -> String {
        self.frame.text()
    }
}

impl<B> fmt::Debug for FrameView<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameView")
            .field("focus", &self.frame.focus)
            .field("command_open", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}
