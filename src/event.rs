use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use futures::StreamExt;
use tokio::sync::mpsc;

/// Keyboard input the console cares about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Backspace,
    Submit,
    /// Ctrl+C or Esc.
    Cancel,
    /// Ctrl+D.
    EndOfInput,
}

/// Maps a raw key event; `None` for keys the console ignores.
pub fn map_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(InputEvent::Cancel),
            KeyCode::Char('d') => Some(InputEvent::EndOfInput),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Esc => Some(InputEvent::Cancel),
        KeyCode::Enter => Some(InputEvent::Submit),
        KeyCode::Backspace => Some(InputEvent::Backspace),
        KeyCode::Char(c) => Some(InputEvent::Char(c)),
        _ => None,
    }
}

/// Reads the terminal on a background task so that waiting for a key can
/// be dropped mid-way without losing input.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<InputEvent>,
    _task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<InputEvent>();

        let task = tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            while let Some(Ok(evt)) = reader.next().await {
                if let CrosstermEvent::Key(key) = evt
                    && let Some(input) = map_key(key)
                    && tx.send(input).is_err()
                {
                    break;
                }
            }
        });

        Self { rx, _task: task }
    }

    /// `None` once the terminal stops producing events.
    pub async fn next(&mut self) -> Option<InputEvent> {
        self.rx.recv().await
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
