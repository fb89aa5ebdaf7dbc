use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use crate::Result;
use crate::Theme;
use crate::element::Element;
use crate::signal::Signal;
use crate::ui::{Component, EventResult};

/// Emitted on [`CommandLine::done`] and returned from key handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLineEvent {
    /// User submitted the input value.
    Submitted(String),
    /// User cancelled the input.
    Cancelled,
}

/// A single-line text input, typically shown in a view's footer.
pub struct CommandLine {
    prompt: String,
    value: String,
    /// Cursor position in characters.
    cursor: usize,
    style: Style,
    prompt_style: Style,
    cursor_style: Style,
    /// Fired once per Enter or Esc.
    pub done: Signal<CommandLineEvent>,
}

impl CommandLine {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            value: String::new(),
            cursor: 0,
            style: Style::default(),
            prompt_style: Style::default(),
            cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            done: Signal::new(),
        }
    }

    /// Set an initial value for the input.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.value.chars().count();
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.style = Style::default().fg(theme.text()).bg(theme.status_bg());
        self.prompt_style = Style::default()
            .fg(theme.prompt())
            .add_modifier(Modifier::BOLD);
        self.cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);
        self
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.value
            .char_indices()
            .nth(chars)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        // Skip trailing spaces, then the word itself
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        let (start, end) = (self.byte_index(pos), self.byte_index(self.cursor));
        self.value.drain(start..end);
        self.cursor = pos;
    }

    fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn finish(&mut self, event: CommandLineEvent) -> EventResult<CommandLineEvent> {
        self.done.emit(&event);
        event.into()
    }
}

impl fmt::Debug for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandLine")
            .field("prompt", &self.prompt)
            .field("value", &self.value)
            .field("cursor", &self.cursor)
            .field("handlers", &self.done.len())
            .finish_non_exhaustive()
    }
}

impl Component for CommandLine {
    type Output = CommandLineEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let result = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.finish(CommandLineEvent::Submitted(self.value.clone())),
            (KeyCode::Esc, _) => self.finish(CommandLineEvent::Cancelled),

            (KeyCode::Backspace, KeyModifiers::ALT) | (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                self.delete_word_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Backspace, _) => {
                self.delete_char_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Delete, _) => {
                self.delete_char_at_cursor();
                EventResult::Consumed
            }

            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.char_len();
                EventResult::Consumed
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear_line();
                EventResult::Consumed
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                EventResult::Consumed
            }

            // Swallow everything else while the line has focus
            _ => EventResult::Consumed,
        };
        Ok(result)
    }
}

impl Element for CommandLine {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.style);
        let split = self.byte_index(self.cursor);
        let (before, after) = self.value.split_at(split);
        let mut rest = after.chars();
        let under_cursor = rest.next().unwrap_or(' ');
        let line = Line::from(vec![
            Span::styled(self.prompt.clone(), self.prompt_style),
            Span::raw(before.to_string()),
            Span::styled(under_cursor.to_string(), self.cursor_style),
            Span::raw(rest.collect::<String>()),
        ])
        .style(self.style);
        line.render(area, buf);
    }

    fn width(&self) -> u16 {
        let chars = self.prompt.chars().count() + self.char_len() + 1;
        u16::try_from(chars).unwrap_or(u16::MAX)
    }

    fn text(&self) -> String {
        format!("{}{}", self.prompt, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn press(line: &mut CommandLine, code: KeyCode) -> EventResult<CommandLineEvent> {
        line.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn type_str(line: &mut CommandLine, s: &str) {
        for c in s.chars() {
            press(line, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_editing() {
        let mut line = CommandLine::new(":");
        type_str(&mut line, "helo");
        press(&mut line, KeyCode::Left);
        type_str(&mut line, "l");
        assert_eq!(line.value(), "hello");

        press(&mut line, KeyCode::Home);
        press(&mut line, KeyCode::Delete);
        assert_eq!(line.value(), "ello");

        press(&mut line, KeyCode::End);
        press(&mut line, KeyCode::Backspace);
        assert_eq!(line.value(), "ell");
        assert_eq!(line.cursor(), 3);
    }

    #[test]
    fn test_multibyte_cursor() {
        let mut line = CommandLine::new("").with_value("héé");
        press(&mut line, KeyCode::Left);
        press(&mut line, KeyCode::Backspace);
        assert_eq!(line.value(), "hé");
    }

    #[test]
    fn test_delete_word() {
        let mut line = CommandLine::new("").with_value("set 1 name  ");
        line.handle_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(line.value(), "set 1 ");
    }

    #[test]
    fn test_done_signal() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut line = CommandLine::new(":");
        {
            let seen = seen.clone();
            line.done.connect(move |e| seen.borrow_mut().push(e.clone()));
        }
        type_str(&mut line, "quit");
        let result = press(&mut line, KeyCode::Enter);
        assert_eq!(
            result,
            EventResult::Event(CommandLineEvent::Submitted("quit".into()))
        );
        press(&mut line, KeyCode::Esc);
        assert_eq!(
            *seen.borrow(),
            [
                CommandLineEvent::Submitted("quit".into()),
                CommandLineEvent::Cancelled
            ]
        );
    }

    #[test]
    fn test_render() {
        let line = CommandLine::new(":").with_value("ab");
        let mut buf = Buffer::empty(Rect::new(0, 0, 5, 1));
        line.render(buf.area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), ":");
        assert_eq!(buf[(2, 0)].symbol(), "b");
        assert!(buf[(3, 0)].modifier.contains(Modifier::REVERSED));
        assert_eq!(line.text(), ":ab");
    }
}
