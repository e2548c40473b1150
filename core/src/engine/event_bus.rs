use crate::event::BattleEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

type Listener = Box<dyn FnMut(&BattleEvent)>;

/// Synchronous publish/subscribe for battle events.
///
/// Delivery is in registration order. Listeners must not call back into
/// the controller that owns the bus.
#[derive(Default)]
pub struct EventBus {
    next_id: u32,
    listeners: Vec<(SubscriberId, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&BattleEvent) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &BattleEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::EventBus;
    use crate::event::{BattleEvent, BattleEventKind};

    #[test]
    fn delivers_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |e: &BattleEvent| seen.borrow_mut().push((tag, e.kind)));
        }

        bus.emit(&BattleEvent::new(BattleEventKind::TurnStart, "go"));
        assert_eq!(
            *seen.borrow(),
            vec![
                ("first", BattleEventKind::TurnStart),
                ("second", BattleEventKind::TurnStart),
                ("third", BattleEventKind::TurnStart),
            ]
        );
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let id = {
            let count = Rc::clone(&count);
            bus.subscribe(move |_| *count.borrow_mut() += 1)
        };

        bus.emit(&BattleEvent::new(BattleEventKind::TurnEnd, ""));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&BattleEvent::new(BattleEventKind::TurnEnd, ""));

        assert_eq!(*count.borrow(), 1);
        assert!(bus.is_empty());
    }
}
