/// Keyboard state tracker.
///
/// Movement needs "is the key down right now"; jump and dash need "was it
/// pressed this frame". Terminals only report presses (and key repeat), so a
/// key counts as held until no Press/Repeat has arrived for `HOLD_TIMEOUT`,
/// unless keyboard enhancement delivers real Release events.
///
/// Name entry reads the raw events of the frame through `typed()`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// An editing action decoded from one key event during name entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TextKey {
    Char(char),
    Backspace,
}

pub struct InputState {
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last `drain_events`.
    fresh_presses: Vec<KeyCode>,
    pub raw_events: Vec<KeyEvent>,
    /// Set when keyboard enhancement delivers Release events.
    honor_release: bool,
}

impl InputState {
    /// `key_releases`: the terminal reports Release events, so holds end on
    /// release instead of on a timeout.
    pub fn new(key_releases: bool) -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: key_releases,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }
        self.expire(Instant::now());
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Timeout-based release; skipped when real Release events arrive.
    fn expire(&mut self, now: Instant) {
        if self.honor_release { return; }
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        match self.last_active.get(&code) {
            Some(_) if self.honor_release => true,
            Some(t) => t.elapsed() < HOLD_TIMEOUT,
            None => false,
        }
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Edge trigger: pressed this frame, not merely still held.
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Shift + Left/Right pressed this frame (alternate dash chord).
    pub fn shift_arrow_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.kind != KeyEventKind::Release
                && k.modifiers.contains(KeyModifiers::SHIFT)
                && matches!(k.code, KeyCode::Left | KeyCode::Right)
        })
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// Text editing keys typed this frame.
    pub fn typed(&self) -> Vec<TextKey> {
        text_keys(&self.raw_events)
    }
}

/// Display name of a key for the controls screen. Letters are shown upper-case.
pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Char(' ') => "SPACE".to_string(),
        KeyCode::Char(c) => c.to_uppercase().collect(),
        KeyCode::Enter => "ENTER".to_string(),
        KeyCode::Esc => "ESC".to_string(),
        KeyCode::Tab => "TAB".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}").to_uppercase(),
    }
}

/// Distinct labels of a key list, joined with `/`.
pub fn keys_label(codes: &[KeyCode]) -> String {
    let mut labels: Vec<String> = Vec::with_capacity(codes.len());
    for &code in codes {
        let label = key_label(code);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels.join("/")
}

fn text_keys(events: &[KeyEvent]) -> Vec<TextKey> {
    events.iter()
        .filter(|k| k.kind != KeyEventKind::Release)
        .filter(|k| !k.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT))
        .filter_map(|k| match k.code {
            KeyCode::Char(c) if !c.is_control() => Some(TextKey::Char(c)),
            KeyCode::Backspace => Some(TextKey::Backspace),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn typed_text_skips_chords_and_releases() {
        let mut release = press(KeyCode::Char('z'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        let events = [
            press(KeyCode::Char('a'), KeyModifiers::NONE),
            press(KeyCode::Char('B'), KeyModifiers::SHIFT),
            press(KeyCode::Char('c'), KeyModifiers::CONTROL),
            release,
            press(KeyCode::Backspace, KeyModifiers::NONE),
            press(KeyCode::Enter, KeyModifiers::NONE),
        ];
        assert_eq!(
            text_keys(&events),
            vec![TextKey::Char('a'), TextKey::Char('B'), TextKey::Backspace],
        );
    }

    #[test]
    fn key_lists_collapse_letter_case() {
        let codes = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
        assert_eq!(keys_label(&codes), "←/A");
        assert_eq!(keys_label(&[KeyCode::Char(' '), KeyCode::F(1)]), "SPACE/F1");
    }

    #[test]
    fn release_events_end_holds_when_reported() {
        let mut input = InputState::new(true);
        let mut release = press(KeyCode::Left, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        let start = Instant::now();

        input.record(press(KeyCode::Left, KeyModifiers::NONE), start);
        assert!(input.was_pressed(KeyCode::Left));
        input.expire(start + Duration::from_secs(2));
        assert!(input.is_held(KeyCode::Left));

        input.record(release, start + Duration::from_secs(2));
        assert!(!input.is_held(KeyCode::Left));
    }

    #[test]
    fn releases_are_ignored_without_enhancement() {
        let mut input = InputState::new(false);
        let mut release = press(KeyCode::Right, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        let now = Instant::now();

        input.record(press(KeyCode::Right, KeyModifiers::NONE), now);
        input.record(release, now);
        assert!(input.is_held(KeyCode::Right));
        input.expire(now + HOLD_TIMEOUT * 2);
        assert!(!input.is_held(KeyCode::Right));
    }

    #[test]
    fn fresh_state_holds_nothing() {
        let input = InputState::new(false);
        assert!(!input.any_held(&[KeyCode::Left, KeyCode::Right]));
        assert!(!input.any_pressed(&[KeyCode::Char(' ')]));
        assert!(!input.shift_arrow_pressed());
        assert!(input.typed().is_empty());
    }
}
