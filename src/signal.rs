//! Minimal subscribe/unsubscribe callbacks for widget events.

/// Handle returned by [`Signal::connect`], used to disconnect again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// A list of callbacks invoked in connection order.
pub struct Signal<E> {
    handlers: Vec<(HandlerId, Box<dyn FnMut(&E)>)>,
    next_id: u64,
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> Signal<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, handler: impl FnMut(&E) + 'static) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not connected.
    pub fn disconnect(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_and_disconnect() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut signal = Signal::new();

        let a = {
            let seen = seen.clone();
            signal.connect(move |e: &u32| seen.borrow_mut().push(("a", *e)))
        };
        {
            let seen = seen.clone();
            signal.connect(move |e: &u32| seen.borrow_mut().push(("b", *e)));
        }

        signal.emit(&1);
        assert!(signal.disconnect(a));
        assert!(!signal.disconnect(a));
        signal.emit(&2);

        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
        assert_eq!(signal.len(), 1);
    }
}
