use crossterm::event::{self, Event, KeyEventKind};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread;

/// Room for a burst of keystrokes between frames. A full queue blocks the
/// reader rather than dropping events.
pub(crate) const EVENT_QUEUE_CAP: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputEvent {
    Key,
    Resize(u16, u16),
}

/// Only key presses and resizes matter to the screensaver.
pub(crate) fn map_event(ev: Event) -> Option<InputEvent> {
    match ev {
        Event::Key(k) if k.kind == KeyEventKind::Press => Some(InputEvent::Key),
        Event::Resize(c, r) => Some(InputEvent::Resize(c, r)),
        _ => None,
    }
}

/// Start the blocking reader thread. The receiver disconnects when the device
/// read fails; the thread exits when the receiver is dropped.
pub(crate) fn spawn_reader() -> Receiver<InputEvent> {
    let (tx, rx) = sync_channel(EVENT_QUEUE_CAP);
    thread::Builder::new()
        .name("input".into())
        .spawn(move || read_loop(tx))
        .map_err(|e| log::warn!("could not start input reader: {e}"))
        .ok();
    rx
}

fn read_loop(tx: SyncSender<InputEvent>) {
    loop {
        let ev = match event::read() {
            Ok(ev) => ev,
            Err(e) => {
                log::warn!("input read failed: {e}");
                return;
            }
        };
        let Some(ev) = map_event(ev) else {
            continue;
        };
        if tx.send(ev).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    fn key(kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn any_key_press_is_a_key_event() {
        assert_eq!(map_event(key(KeyEventKind::Press)), Some(InputEvent::Key));
        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(map_event(esc), Some(InputEvent::Key));
    }

    #[test]
    fn releases_and_repeats_are_ignored() {
        assert_eq!(map_event(key(KeyEventKind::Release)), None);
        assert_eq!(map_event(key(KeyEventKind::Repeat)), None);
    }

    #[test]
    fn resize_carries_new_size() {
        assert_eq!(
            map_event(Event::Resize(120, 40)),
            Some(InputEvent::Resize(120, 40))
        );
        assert_eq!(map_event(Event::FocusGained), None);
    }
}
