use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;

use crate::Result;

/// Result of handling an input event.
///
/// - `Ignored` - the handler didn't recognize this input, the parent should process it
/// - `Consumed` - the input was handled but produced no message
/// - `Event(E)` - the input was handled and produced a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult<E> {
    /// Input was not handled, parent should process it.
    Ignored,
    /// Input was consumed but produced no event.
    Consumed,
    /// Input was consumed and produced an event.
    Event(E),
}

impl<E> EventResult<E> {
    /// Returns true if the input was consumed (either with or without an event).
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    /// Convert the carried event, keeping `Ignored`/`Consumed` as they are.
    pub fn map<F, T>(self, f: F) -> EventResult<T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Self::Ignored => EventResult::Ignored,
            Self::Consumed => EventResult::Consumed,
            Self::Event(e) => EventResult::Event(f(e)),
        }
    }
}

impl<E> From<E> for EventResult<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// Interactive building block.
///
/// Components handle input and emit generic outputs. Drawing is left to
/// [`Element`](crate::element::Element), so a component can be rendered
/// headless as well as into a terminal frame.
pub trait Component {
    /// The output type produced by this component.
    ///
    /// [`Table`](crate::table::Table) produces `TableEvent` to notify its
    /// parent of focus changes and activation.
    type Output;

    /// Handle a key event.
    ///
    /// Returns `Err(...)` if an error occurred during handling.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    /// Handle a mouse event; `area` is where the component was last drawn.
    fn handle_mouse(&mut self, event: MouseEvent, area: Rect) -> Result<EventResult<Self::Output>> {
        _ = (event, area);
        Ok(EventResult::Ignored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map() {
        let result: EventResult<u8> = EventResult::Event(2);
        assert_eq!(result.map(u16::from), EventResult::Event(2u16));
        assert_eq!(EventResult::<u8>::Ignored.map(u16::from), EventResult::Ignored);
    }
}
