// Shuttlers Translator
// Raw device frames -> resolved actions on an effector sink
//
// The translator owns all device state (held buttons, last jog counter, last
// shuttle position, shuttle repeat timer) and the binding table. It is
// single-threaded: a frame is processed to completion before the next one.

use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::binding::{Binding, Control, PhysicalKey};
use crate::decode::{JogDecoder, JogEvent, ShuttleBurst, ShuttleDecoder, ShuttleRepeat};
use crate::event::{Axis, EventKind, RawEvent, KEY_CODE_BASE};
use crate::layer::BindingTable;
use crate::output::EffectorSink;
use crate::state::{ButtonState, ButtonTracker};
use crate::Action;

/// Frames shorter than this that repeat the jog value without a shuttle
/// report are the device's "shuttle released" frame.
pub const SHORT_FRAME_LEN: usize = 3;

/// Recoverable conditions met while dispatching; none of them abort a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("key({code}) out of range")]
    OutOfRangeKey { code: u16 },

    #[error("key({key}) unbound")]
    UnboundBinding { key: PhysicalKey },
}

/// How the shuttle ring turns positions into actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShuttleMode {
    /// One burst of `|position|` actions per position change
    #[default]
    Burst,
    /// Repeat while held off center, faster the further it is turned
    Repeat { interval: Duration },
}

/// Configuration for the translator
#[derive(Debug, Clone, Default)]
pub struct TranslatorConfig {
    pub bindings: BindingTable,
    pub shuttle_mode: ShuttleMode,
}

/// Summary of one processed frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Sub-events before the synchronization marker
    pub processed: usize,
    /// Key sub-events that reached an effector
    pub dispatched: usize,
    /// Whether the sink was flushed after key handling
    pub flushed: bool,
    /// Conditions reported while processing
    pub errors: SmallVec<[TranslateError; 2]>,
}

/// Stateful decoder from device frames to logical actions.
#[derive(Debug)]
pub struct Translator {
    bindings: BindingTable,
    buttons: ButtonTracker,
    jog: JogDecoder,
    shuttle: ShuttleDecoder,
    repeat: Option<ShuttleRepeat>,
}

impl Translator {
    /// Create a translator with fresh device state
    pub fn new(config: TranslatorConfig) -> Self {
        let repeat = match config.shuttle_mode {
            ShuttleMode::Burst => None,
            ShuttleMode::Repeat { interval } => Some(ShuttleRepeat::new(interval)),
        };
        Self {
            bindings: config.bindings,
            buttons: ButtonTracker::new(),
            jog: JogDecoder::new(),
            shuttle: ShuttleDecoder::new(),
            repeat,
        }
    }

    /// The binding table in use
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Currently held buttons
    pub fn buttons(&self) -> ButtonState {
        self.buttons.state()
    }

    /// Last jog counter value
    pub fn jog_value(&self) -> u8 {
        self.jog.last()
    }

    /// Last shuttle position
    pub fn shuttle_value(&self) -> i8 {
        self.shuttle.last()
    }

    /// Active shuttle mode
    pub fn shuttle_mode(&self) -> ShuttleMode {
        match &self.repeat {
            Some(repeat) => ShuttleMode::Repeat {
                interval: repeat.interval(),
            },
            None => ShuttleMode::Burst,
        }
    }

    /// Process one read of sub-events
    pub fn process_frame<S: EffectorSink + ?Sized>(
        &mut self,
        events: &[RawEvent],
        sink: &mut S,
    ) -> FrameOutcome {
        self.process_frame_at(events, Instant::now(), sink)
    }

    /// Process one read of sub-events at a given time.
    ///
    /// Processing stops at the first synchronization marker. `events.len()`
    /// is the size of the read and feeds the short-frame check.
    pub fn process_frame_at<S: EffectorSink + ?Sized>(
        &mut self,
        events: &[RawEvent],
        now: Instant,
        sink: &mut S,
    ) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        let mut saw_shuttle = false;
        let mut needs_flush = false;

        for event in events.iter().take_while(|event| !event.is_sync()) {
            outcome.processed += 1;
            match event.kind {
                EventKind::Key => match self.dispatch_key(event.code, event.value, sink) {
                    Ok(flush) => {
                        outcome.dispatched += 1;
                        needs_flush |= flush;
                    }
                    Err(e) => {
                        log::warn!("{}", e);
                        outcome.errors.push(e);
                    }
                },
                EventKind::Relative => match Axis::from_code(event.code) {
                    Axis::Shuttle => {
                        saw_shuttle = true;
                        self.on_shuttle_at(event.value, now, sink);
                    }
                    Axis::Jog => {
                        let jog = self.on_jog(event.value, sink);
                        if jog == JogEvent::Idle
                            && !saw_shuttle
                            && self.shuttle.is_between_detents()
                            && events.len() < SHORT_FRAME_LEN
                        {
                            self.shuttle_released();
                        }
                    }
                    Axis::Unknown(code) => log::trace!("ignoring relative axis {}", code),
                },
                EventKind::Sync => {}
                EventKind::Other(kind) => {
                    log::trace!("ignoring event type {} code {}", kind, event.code)
                }
            }
        }

        if needs_flush {
            sink.flush();
            outcome.flushed = true;
        }
        outcome
    }

    /// Handle one button sub-event.
    ///
    /// Returns whether an effector action was emitted that still needs the
    /// frame's flush; commands complete on their own.
    pub fn dispatch_key<S: EffectorSink + ?Sized>(
        &mut self,
        code: u16,
        value: i32,
        sink: &mut S,
    ) -> Result<bool, TranslateError> {
        let key = code
            .checked_sub(KEY_CODE_BASE)
            .and_then(|index| PhysicalKey::new(index as usize))
            .ok_or(TranslateError::OutOfRangeKey { code })?;

        let action = Action::from_value(value);
        let pressed = action.is_pressed();
        let held = self.buttons.on_key_event(key, pressed);
        let binding = self.bindings.resolve_key(key, held);
        log::debug!("Key: {} {} held={} -> {}", key, action, held, binding);

        match binding {
            Binding::Unbound => Err(TranslateError::UnboundBinding { key }),
            Binding::KeyCode(out) => {
                sink.emit_key(out, pressed);
                Ok(true)
            }
            Binding::PointerClick(button) => {
                sink.emit_pointer_button(button, pressed);
                Ok(true)
            }
            Binding::PointerClickToTargetWindow(button) => {
                sink.emit_pointer_button_to_target_window(button, pressed);
                Ok(true)
            }
            Binding::Command(index) => {
                sink.invoke_command(index, value);
                Ok(false)
            }
        }
    }

    /// Handle a jog counter report
    pub fn on_jog<S: EffectorSink + ?Sized>(&mut self, raw: i32, sink: &mut S) -> JogEvent {
        let event = self.jog.on_jog(raw);
        match event {
            JogEvent::Step(direction) => {
                log::debug!("Jog: {}", direction);
                self.tap(Control::Jog(direction), sink);
            }
            JogEvent::Skipped => log::debug!("Jog: skipped ambiguous jump to {}", raw),
            JogEvent::Idle => {}
        }
        event
    }

    /// Handle a shuttle position report
    pub fn on_shuttle_at<S: EffectorSink + ?Sized>(
        &mut self,
        raw: i32,
        now: Instant,
        sink: &mut S,
    ) -> Option<ShuttleBurst> {
        let burst = self.shuttle.on_shuttle(raw)?;
        log::debug!("Shuttle: {}", burst.position);

        let Some(direction) = burst.direction() else {
            if let Some(repeat) = self.repeat.as_mut() {
                repeat.cancel();
            }
            return Some(burst);
        };
        let control = Control::Shuttle(direction);

        match self.repeat.as_mut() {
            Some(repeat) => {
                repeat.arm(direction, burst.magnitude(), now);
                self.tap(control, sink);
            }
            None => {
                for _ in 0..burst.magnitude() {
                    self.tap(control, sink);
                }
            }
        }
        Some(burst)
    }

    /// The ring sprang back to center without a report of its own
    fn shuttle_released(&mut self) {
        if self.shuttle.return_to_center().is_some() {
            log::debug!("Shuttle: 0 (implied)");
        }
        if let Some(repeat) = self.repeat.as_mut() {
            repeat.cancel();
        }
    }

    /// When the shuttle repeat timer next fires
    pub fn next_deadline(&self) -> Option<Instant> {
        self.repeat.as_ref().and_then(|r| r.next_deadline())
    }

    /// Fire shuttle repeats due at `now`; returns how many fired
    pub fn tick<S: EffectorSink + ?Sized>(&mut self, now: Instant, sink: &mut S) -> u32 {
        let Some(repeat) = self.repeat.as_mut() else {
            return 0;
        };
        let Some(direction) = repeat.direction() else {
            return 0;
        };
        let fired = repeat.due(now);
        for _ in 0..fired {
            self.tap(Control::Shuttle(direction), sink);
        }
        fired
    }

    /// Stop shuttle repeats; call before tearing the translator down
    pub fn cancel_repeat(&mut self) {
        if let Some(repeat) = self.repeat.as_mut() {
            repeat.cancel();
        }
    }

    /// Return to the initial device state, e.g. after the device reconnects
    pub fn reset(&mut self) {
        self.buttons.clear();
        self.jog = JogDecoder::new();
        self.shuttle = ShuttleDecoder::new();
        self.cancel_repeat();
    }

    /// Emit one discrete action for an axis control
    fn tap<S: EffectorSink + ?Sized>(&self, control: Control, sink: &mut S) {
        let step = match control {
            Control::Jog(direction) | Control::Shuttle(direction) => direction.step(),
            Control::Button(_) => 1,
        };
        match self.bindings.resolve(control, self.buttons.state()) {
            Binding::Unbound => log::debug!("{} unbound", control),
            Binding::KeyCode(key) => {
                sink.emit_key(key, true);
                sink.emit_key(key, false);
            }
            Binding::PointerClick(button) => {
                sink.emit_pointer_button(button, true);
                sink.emit_pointer_button(button, false);
            }
            Binding::PointerClickToTargetWindow(button) => {
                sink.emit_pointer_button_to_target_window(button, true);
                sink.emit_pointer_button_to_target_window(button, false);
            }
            Binding::Command(index) => sink.invoke_command(index, step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Direction;
    use crate::layer::Layer;
    use crate::output::{RecordingSink, SinkAction};
    use crate::Key;

    fn key(index: usize) -> PhysicalKey {
        PhysicalKey::new(index).unwrap()
    }

    fn translator(base: Layer, layers: Vec<Layer>) -> Translator {
        Translator::new(TranslatorConfig {
            bindings: BindingTable::new(layers, base),
            shuttle_mode: ShuttleMode::Burst,
        })
    }

    fn scroll_base() -> Layer {
        Layer::base("base")
            .with(Control::Button(key(0)), Binding::PointerClick(1))
            .with(Control::Jog(Direction::Clockwise), Binding::PointerClick(4))
            .with(Control::Jog(Direction::CounterClockwise), Binding::PointerClick(5))
            .with(Control::Shuttle(Direction::Clockwise), Binding::PointerClick(5))
            .with(Control::Shuttle(Direction::CounterClockwise), Binding::PointerClick(4))
    }

    fn clicks(button: u8, count: usize) -> Vec<SinkAction> {
        (0..count)
            .flat_map(|_| {
                [
                    SinkAction::PointerButton { button, pressed: true },
                    SinkAction::PointerButton { button, pressed: false },
                ]
            })
            .collect()
    }

    #[test]
    fn test_key_dispatch_updates_mask_and_flushes_once() {
        let mut t = translator(scroll_base(), vec![]);
        let mut sink = RecordingSink::new();
        let outcome = t.process_frame(&[RawEvent::button(0, 1), RawEvent::sync()], &mut sink);

        assert_eq!(outcome.dispatched, 1);
        assert!(outcome.flushed);
        assert!(t.buttons().is_held(key(0)));
        assert_eq!(
            sink.actions(),
            &[SinkAction::PointerButton { button: 1, pressed: true }, SinkAction::Flush]
        );
    }

    #[test]
    fn test_out_of_range_key_is_reported_and_dropped() {
        let mut t = translator(scroll_base(), vec![]);
        let mut sink = RecordingSink::new();
        let outcome = t.process_frame(
            &[RawEvent::new(1, KEY_CODE_BASE + 13, 1), RawEvent::new(1, 30, 1), RawEvent::sync()],
            &mut sink,
        );

        assert_eq!(
            outcome.errors.as_slice(),
            &[
                TranslateError::OutOfRangeKey { code: 269 },
                TranslateError::OutOfRangeKey { code: 30 },
            ]
        );
        assert!(t.buttons().is_empty());
        assert!(sink.actions().is_empty());
    }

    #[test]
    fn test_unbound_key_is_reported_without_flush() {
        let mut t = translator(scroll_base(), vec![]);
        let mut sink = RecordingSink::new();
        let outcome = t.process_frame(&[RawEvent::button(6, 1), RawEvent::sync()], &mut sink);

        assert_eq!(
            outcome.errors.as_slice(),
            &[TranslateError::UnboundBinding { key: key(6) }]
        );
        assert!(!outcome.flushed);
        assert!(sink.actions().is_empty());
        // The button is still tracked as held
        assert!(t.buttons().is_held(key(6)));
    }

    #[test]
    fn test_command_receives_polarity_and_skips_flush() {
        let base = Layer::base("base").with(Control::Button(key(2)), Binding::Command(0));
        let mut t = translator(base, vec![]);
        let mut sink = RecordingSink::new();
        t.process_frame(&[RawEvent::button(2, 1), RawEvent::sync()], &mut sink);
        t.process_frame(&[RawEvent::button(2, 0), RawEvent::sync()], &mut sink);

        assert_eq!(
            sink.actions(),
            &[
                SinkAction::Command { index: 0, value: 1 },
                SinkAction::Command { index: 0, value: 0 },
            ]
        );
    }

    #[test]
    fn test_activation_layer_applies_while_held() {
        let layer = Layer::activated_by("ctrl-tab", key(10))
            .with(Control::Jog(Direction::Clockwise), Binding::KeyCode(Key::from(15)));
        let mut t = translator(scroll_base(), vec![layer]);
        let mut sink = RecordingSink::new();

        t.process_frame(&[RawEvent::jog(1), RawEvent::sync()], &mut sink);
        assert_eq!(sink.take(), clicks(4, 1));

        // K10 is unbound in every layer; it still acts as a modifier
        t.process_frame(&[RawEvent::button(10, 1), RawEvent::sync()], &mut sink);
        sink.take();

        t.process_frame(&[RawEvent::jog(3), RawEvent::sync()], &mut sink);
        assert!(sink.take().is_empty(), "even jump must not emit");
        t.process_frame(&[RawEvent::jog(4), RawEvent::sync()], &mut sink);
        assert_eq!(
            sink.take(),
            vec![
                SinkAction::Key { key: Key::from(15), pressed: true },
                SinkAction::Key { key: Key::from(15), pressed: false },
            ]
        );
    }

    #[test]
    fn test_jog_only_frame_does_not_flush() {
        let mut t = translator(scroll_base(), vec![]);
        let mut sink = RecordingSink::new();
        let outcome = t.process_frame(&[RawEvent::jog(1), RawEvent::sync()], &mut sink);
        assert!(!outcome.flushed);
        assert_eq!(sink.actions(), clicks(4, 1).as_slice());
    }

    #[test]
    fn test_shuttle_burst() {
        let mut t = translator(scroll_base(), vec![]);
        let mut sink = RecordingSink::new();

        t.process_frame(&[RawEvent::shuttle(3), RawEvent::jog(0), RawEvent::sync()], &mut sink);
        assert_eq!(sink.take(), clicks(5, 3));

        t.process_frame(&[RawEvent::shuttle(3), RawEvent::jog(0), RawEvent::sync()], &mut sink);
        assert!(sink.take().is_empty());

        t.process_frame(&[RawEvent::shuttle(-2), RawEvent::jog(0), RawEvent::sync()], &mut sink);
        assert_eq!(sink.take(), clicks(4, 2));

        t.process_frame(&[RawEvent::shuttle(0), RawEvent::jog(0), RawEvent::sync()], &mut sink);
        assert!(sink.take().is_empty());
        assert_eq!(t.shuttle_value(), 0);
    }

    #[test]
    fn test_short_idle_jog_frame_releases_odd_shuttle() {
        let mut t = translator(scroll_base(), vec![]);
        let mut sink = RecordingSink::new();
        t.process_frame(&[RawEvent::shuttle(1), RawEvent::jog(0), RawEvent::sync()], &mut sink);
        assert_eq!(t.shuttle_value(), 1);
        sink.take();

        t.process_frame(&[RawEvent::jog(0), RawEvent::sync()], &mut sink);
        assert_eq!(t.shuttle_value(), 0);
        assert!(sink.actions().is_empty());

        // Next turn to 1 is a fresh burst
        t.process_frame(&[RawEvent::shuttle(1), RawEvent::jog(0), RawEvent::sync()], &mut sink);
        assert_eq!(sink.take(), clicks(5, 1));
    }

    #[test]
    fn test_idle_jog_keeps_even_shuttle() {
        let mut t = translator(scroll_base(), vec![]);
        let mut sink = RecordingSink::new();
        t.process_frame(&[RawEvent::shuttle(2), RawEvent::jog(0), RawEvent::sync()], &mut sink);
        t.process_frame(&[RawEvent::jog(0), RawEvent::sync()], &mut sink);
        assert_eq!(t.shuttle_value(), 2);
    }

    #[test]
    fn test_idle_jog_in_long_frame_keeps_shuttle() {
        let mut t = translator(scroll_base(), vec![]);
        let mut sink = RecordingSink::new();
        t.process_frame(&[RawEvent::shuttle(3), RawEvent::jog(0), RawEvent::sync()], &mut sink);
        // A button frame also repeats the jog value but is not short
        t.process_frame(
            &[RawEvent::jog(0), RawEvent::new(4, 4, 90001), RawEvent::button(6, 1), RawEvent::sync()],
            &mut sink,
        );
        assert_eq!(t.shuttle_value(), 3);
    }

    #[test]
    fn test_events_after_sync_are_not_processed() {
        let mut t = translator(scroll_base(), vec![]);
        let mut sink = RecordingSink::new();
        let outcome = t.process_frame(
            &[RawEvent::button(0, 1), RawEvent::sync(), RawEvent::button(0, 0)],
            &mut sink,
        );
        assert_eq!(outcome.processed, 1);
        assert!(t.buttons().is_held(key(0)));
        assert_eq!(
            sink.actions(),
            &[SinkAction::PointerButton { button: 1, pressed: true }, SinkAction::Flush]
        );
    }

    #[test]
    fn test_unknown_sub_events_are_ignored() {
        let mut t = translator(scroll_base(), vec![]);
        let mut sink = RecordingSink::new();
        let outcome = t.process_frame(
            &[RawEvent::new(2, 11, 840), RawEvent::new(4, 4, 1), RawEvent::sync()],
            &mut sink,
        );
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.processed, 2);
        assert!(sink.actions().is_empty());
    }

    #[test]
    fn test_repeat_mode_fires_on_deadline() {
        let mut t = Translator::new(TranslatorConfig {
            bindings: BindingTable::new(vec![], scroll_base()),
            shuttle_mode: ShuttleMode::Repeat {
                interval: Duration::from_millis(120),
            },
        });
        let mut sink = RecordingSink::new();
        let start = Instant::now();

        t.process_frame_at(&[RawEvent::shuttle(-3), RawEvent::jog(0), RawEvent::sync()], start, &mut sink);
        assert_eq!(sink.take(), clicks(4, 1));
        assert_eq!(t.next_deadline(), Some(start + Duration::from_millis(40)));

        assert_eq!(t.tick(start + Duration::from_millis(39), &mut sink), 0);
        assert_eq!(t.tick(start + Duration::from_millis(85), &mut sink), 2);
        assert_eq!(sink.take(), clicks(4, 2));

        t.process_frame_at(
            &[RawEvent::shuttle(0), RawEvent::jog(0), RawEvent::sync()],
            start + Duration::from_millis(90),
            &mut sink,
        );
        assert_eq!(t.next_deadline(), None);
        assert_eq!(t.tick(start + Duration::from_secs(5), &mut sink), 0);
        assert!(sink.actions().is_empty());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut t = translator(scroll_base(), vec![]);
        let mut sink = RecordingSink::new();
        t.process_frame(&[RawEvent::button(3, 1), RawEvent::jog(9), RawEvent::sync()], &mut sink);
        t.reset();
        assert!(t.buttons().is_empty());
        assert_eq!(t.jog_value(), 0);
        assert_eq!(t.shuttle_value(), 0);
    }
}
