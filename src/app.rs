use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::layout::Rect;
use ratatui::style::Style;
use tablebox::screenshot::ScreenshotOptions;
use tablebox::ui::EventResult;
use tablebox::view::ViewEvent;
use tablebox::{
    CommandLine, CommandLineEvent, Element, ElementWidget, FrameView, Label, Record, Table, TableEvent,
    Theme, Value, take_screenshot,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::tui::{Event, Tui};

/// Work queued for the main loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    Quit,
    Suspend,
    Render,
    Resize(u16, u16),
    OpenCommandLine,
    /// Text submitted from the footer command line.
    Command(String),
    CommandCancelled,
    Screenshot(Option<String>),
    Status(String),
    Error(String),
}

/// A command typed into the footer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `add key=value ...`
    Add(Record),
    /// `del <row>`
    Delete(usize),
    /// `set <row> <key> <value>`
    Set { index: usize, key: String, value: Value },
    Recolor,
    /// `shot [name]`
    Screenshot(Option<String>),
    Quit,
}

/// JSON scalars keep their type; anything else is a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map_or_else(|_| Value::from(raw), Value::from)
}

fn parse_index(raw: Option<&str>) -> Result<usize, String> {
    let raw = raw.ok_or("missing row number")?;
    raw.parse()
        .map_err(|_| format!("`{raw}` is not a row number"))
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut words = input.split_whitespace();
        let Some(name) = words.next() else {
            return Err("empty command".to_string());
        };
        match name {
            "add" => words
                .map(|pair| {
                    pair.split_once('=')
                        .map(|(k, v)| (k, parse_value(v)))
                        .ok_or_else(|| format!("expected key=value, got `{pair}`"))
                })
                .collect::<Result<Record, _>>()
                .map(Self::Add),
            "del" | "delete" => parse_index(words.next()).map(Self::Delete),
            "set" => {
                let index = parse_index(words.next())?;
                let key = words.next().ok_or("missing column")?.to_string();
                let value = words.collect::<Vec<_>>().join(" ");
                if value.is_empty() {
                    return Err("missing value".to_string());
                }
                Ok(Self::Set {
                    index,
                    key,
                    value: parse_value(&value),
                })
            }
            "recolor" => Ok(Self::Recolor),
            "shot" | "screenshot" => Ok(Self::Screenshot(words.next().map(str::to_string))),
            "q" | "quit" => Ok(Self::Quit),
            other => Err(format!("unknown command `{other}`")),
        }
    }
}

pub struct App {
    view: FrameView<Table>,
    theme: Theme,
    screenshot: ScreenshotOptions,
    area: Rect,
    should_quit: bool,
    should_suspend: bool,
    message_tx: UnboundedSender<AppMessage>,
    message_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(table: Table, theme: Theme, screenshot: ScreenshotOptions) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let mut app = Self {
            view: FrameView::new(table),
            theme,
            screenshot,
            area: Rect::default(),
            should_quit: false,
            should_suspend: false,
            message_tx,
            message_rx,
        };
        app.set_status(":  command   s  screenshot   r  recolor   q  quit", false);
        app
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new(30.0, 4.0)?;
        tui.enter()?;

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_messages(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.enter()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };

        match event {
            Event::Quit => self.message_tx.send(AppMessage::Quit)?,
            Event::Render => self.message_tx.send(AppMessage::Render)?,
            Event::Resize(width, height) => self.message_tx.send(AppMessage::Resize(width, height))?,
            Event::Error(e) => self.message_tx.send(AppMessage::Error(e))?,
            Event::Key(key) => self.handle_key(key)?,
            Event::Mouse(mouse) => self.handle_mouse(mouse)?,
            Event::Tick => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> color_eyre::Result<()> {
        if self.view.is_command_open() {
            // The command line's done callback has already queued the result.
            if let EventResult::Event(ViewEvent::Command(_)) = self.view.handle_key(key)? {
                self.view.footer_clear();
            }
            return Ok(());
        }

        let message = match (key.code, key.modifiers) {
            (KeyCode::Char(':'), _) => AppMessage::OpenCommandLine,
            (KeyCode::Char('s'), KeyModifiers::NONE) => AppMessage::Screenshot(None),
            (KeyCode::Char('r'), KeyModifiers::NONE) => AppMessage::Command("recolor".into()),
            (KeyCode::Char('q'), KeyModifiers::NONE) => AppMessage::Quit,
            (KeyCode::Char('z'), KeyModifiers::CONTROL) => AppMessage::Suspend,
            _ => {
                match self.view.handle_key(key) {
                    Ok(EventResult::Event(ViewEvent::Body(TableEvent::Activated(index)))) => {
                        self.describe_row(index);
                    }
                    Ok(_) => {}
                    Err(e) => self.message_tx.send(AppMessage::Error(e.to_string()))?,
                }
                return Ok(());
            }
        };
        self.message_tx.send(message)?;
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> color_eyre::Result<()> {
        if let Err(e) = self.view.handle_mouse(mouse, self.area) {
            warn!(error = %e, "Mouse handling failed");
            self.message_tx.send(AppMessage::Error(e.to_string()))?;
        }
        Ok(())
    }

    fn describe_row(&mut self, index: usize) {
        let text = self
            .view
            .body()
            .get(index)
            .map(Element::text)
            .unwrap_or_default();
        self.set_status(format!("row {index}: {text}"), false);
    }

    fn set_status(&mut self, text: impl Into<String>, error: bool) {
        let fg = if error {
            self.theme.error()
        } else {
            self.theme.text_muted()
        };
        let style = Style::default().fg(fg).bg(self.theme.status_bg());
        self.view.set_status(Label::new(text.into()).styled(style));
    }

    fn open_command_line(&mut self) {
        let tx = self.message_tx.clone();
        let line = CommandLine::new(":").with_theme(&self.theme);
        self.view.footer_command(line, move |event| {
            let message = match event {
                CommandLineEvent::Submitted(text) => AppMessage::Command(text.clone()),
                CommandLineEvent::Cancelled => AppMessage::CommandCancelled,
            };
            if tx.send(message).is_err() {
                warn!("Message channel closed");
            }
        });
    }

    fn handle_messages(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        while let Ok(message) = self.message_rx.try_recv() {
            if message != AppMessage::Render {
                debug!(?message, "Handling message");
            }
            match message {
                AppMessage::Quit => self.should_quit = true,
                AppMessage::Suspend => self.should_suspend = true,
                AppMessage::Render => self.render(tui)?,
                AppMessage::Resize(width, height) => {
                    tui.resize(Rect::new(0, 0, width, height))?;
                    self.render(tui)?;
                }
                AppMessage::OpenCommandLine => self.open_command_line(),
                AppMessage::Command(text) => match text.parse::<Command>() {
                    Ok(command) => self.execute(command)?,
                    Err(e) => self.set_status(e, true),
                },
                AppMessage::CommandCancelled => self.set_status("cancelled", false),
                AppMessage::Screenshot(name) => self.screenshot(name),
                AppMessage::Status(text) => self.set_status(text, false),
                AppMessage::Error(text) => self.set_status(text, true),
            }
        }
        Ok(())
    }

    fn execute(&mut self, command: Command) -> color_eyre::Result<()> {
        let table = self.view.body_mut();
        let result = match command {
            Command::Add(record) => table.push(record).map(|()| "added row".to_string()),
            Command::Delete(index) => table.remove(index).map(|_| format!("deleted row {index}")),
            Command::Set { index, key, value } => match table.row_mut(index) {
                Some(row) => row.set(&key, value).map(|()| format!("updated row {index}")),
                None => Err(tablebox::Error::IndexOutOfBounds {
                    index,
                    len: table.len(),
                }),
            },
            Command::Recolor => {
                table.recolor();
                Ok("recolored rows".to_string())
            }
            Command::Screenshot(name) => {
                self.message_tx.send(AppMessage::Screenshot(name))?;
                return Ok(());
            }
            Command::Quit => {
                self.should_quit = true;
                return Ok(());
            }
        };
        let message = match result {
            Ok(text) => AppMessage::Status(text),
            Err(e) => AppMessage::Error(e.to_string()),
        };
        self.message_tx.send(message)?;
        Ok(())
    }

    fn screenshot(&mut self, name: Option<String>) {
        let options = ScreenshotOptions {
            filename: name,
            ..self.screenshot.clone()
        };
        match take_screenshot(&self.view, &options) {
            Ok(path) => self.set_status(format!("saved {}", path.display()), false),
            Err(e) => self.set_status(format!("screenshot failed: {e}"), true),
        }
    }

    fn render(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let view = &self.view;
        let mut area = self.area;
        tui.draw(|frame| {
            area = frame.area();
            frame.render_widget(ElementWidget(view), area);
        })?;
        self.area = area;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let command: Command = "add name=web port=80 up=true".parse().unwrap();
        let Command::Add(record) = command else {
            panic!("expected add");
        };
        assert_eq!(record.get("name"), Some(&Value::from("web")));
        assert_eq!(record.get("port"), Some(&Value::Int(80)));
        assert_eq!(record.get("up"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_parse_set_joins_value() {
        let command: Command = "set 2 name hello world".parse().unwrap();
        assert_eq!(
            command,
            Command::Set {
                index: 2,
                key: "name".into(),
                value: Value::from("hello world"),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Command>().is_err());
        assert!("del x".parse::<Command>().is_err());
        assert!("add oops".parse::<Command>().is_err());
        assert!("set 1 name".parse::<Command>().is_err());
        assert!("launch".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_simple() {
        assert_eq!("del 3".parse::<Command>().unwrap(), Command::Delete(3));
        assert_eq!("recolor".parse::<Command>().unwrap(), Command::Recolor);
        assert_eq!(
            "shot board".parse::<Command>().unwrap(),
            Command::Screenshot(Some("board".into()))
        );
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
    }
}
