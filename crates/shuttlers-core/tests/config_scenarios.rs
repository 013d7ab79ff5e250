// Shuttlers Config Scenarios
//
// The shipped demo layout, loaded and driven through a translator.

use shuttlers_core::{
    Binding, ButtonState, CommandSpec, Config, Control, Direction, Key, PhysicalKey, RawEvent,
    RecordingSink, ShuttleMode, SinkAction, Translator,
};

const DEMO_CONFIG: &str = include_str!("../../../demos/shuttlepro-v2.toml");

fn key(index: usize) -> PhysicalKey {
    PhysicalKey::new(index).unwrap()
}

#[test]
fn demo_config_parses() {
    let config = Config::from_toml(DEMO_CONFIG).expect("failed to parse demo config");

    assert_eq!(config.shuttle_mode, ShuttleMode::Burst);
    assert!(!config.exit_on_disconnect);
    assert_eq!(config.device_path, None);

    let names: Vec<_> = config.commands.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["command1", "command2", "next_tab", "prev_tab"]);
    assert!(matches!(&config.commands[2], CommandSpec::Spawn { program, .. } if program == "xdotool"));

    let layers: Vec<_> = config
        .bindings
        .layers()
        .iter()
        .map(|l| (l.name().to_string(), l.activation()))
        .collect();
    assert_eq!(
        layers,
        vec![
            ("tabs".to_string(), Some(key(10))),
            ("hscroll".to_string(), Some(key(9))),
            ("arrows".to_string(), Some(key(11))),
            ("pages".to_string(), Some(key(12))),
        ]
    );
    assert_eq!(config.command_table().len(), 4);
}

#[test]
fn demo_config_resolves_layers() {
    let config = Config::from_toml(DEMO_CONFIG).unwrap();
    let table = &config.bindings;
    let none = ButtonState::empty();

    assert_eq!(table.resolve_key(key(0), none), Binding::PointerClick(1));
    assert_eq!(table.resolve_key(key(2), none), Binding::Command(0));
    assert_eq!(table.resolve_key(key(4), none), Binding::PointerClickToTargetWindow(1));
    assert_eq!(table.resolve_key(key(8), none), Binding::Unbound);

    let tabs = none.with(key(10), true);
    assert_eq!(
        table.resolve(Control::Jog(Direction::CounterClockwise), tabs),
        Binding::Command(3)
    );

    // K10 outranks K9 when both are held
    let both = tabs.with(key(9), true);
    assert_eq!(table.resolve(Control::Jog(Direction::Clockwise), both), Binding::Command(2));

    let pages = none.with(key(12), true);
    assert_eq!(
        table.resolve(Control::Jog(Direction::Clockwise), pages),
        Binding::KeyCode(Key::from(109))
    );
    // Layers without a shuttle binding fall through to base scrolling
    assert_eq!(
        table.resolve(Control::Shuttle(Direction::Clockwise), pages),
        Binding::PointerClick(5)
    );
}

#[test]
fn demo_config_drives_translator() {
    let config = Config::from_toml(DEMO_CONFIG).unwrap();
    let mut translator = Translator::new(config.to_translator_config());
    let mut sink = RecordingSink::new();

    translator.process_frame(&[RawEvent::button(11, 1), RawEvent::sync()], &mut sink);
    translator.process_frame(&[RawEvent::jog(1), RawEvent::sync()], &mut sink);
    translator.process_frame(
        &[RawEvent::shuttle(-1), RawEvent::jog(1), RawEvent::sync()],
        &mut sink,
    );
    translator.process_frame(&[RawEvent::button(11, 0), RawEvent::sync()], &mut sink);
    translator.process_frame(&[RawEvent::button(2, 1), RawEvent::sync()], &mut sink);

    assert_eq!(
        sink.actions(),
        &[
            SinkAction::Key { key: Key::from(106), pressed: true },
            SinkAction::Key { key: Key::from(106), pressed: false },
            SinkAction::Key { key: Key::from(103), pressed: true },
            SinkAction::Key { key: Key::from(103), pressed: false },
            SinkAction::Command { index: 0, value: 1 },
        ]
    );
}

#[test]
fn stock_layout_matches_demo_base() {
    let demo = Config::from_toml(DEMO_CONFIG).unwrap();
    let stock = Config::default();
    let none = ButtonState::empty();

    for index in 0..4 {
        assert_eq!(
            stock.bindings.resolve_key(key(index), none),
            demo.bindings.resolve_key(key(index), none),
            "K{}",
            index
        );
    }
    for control in [
        Control::Jog(Direction::Clockwise),
        Control::Jog(Direction::CounterClockwise),
        Control::Shuttle(Direction::Clockwise),
        Control::Shuttle(Direction::CounterClockwise),
    ] {
        assert_eq!(
            stock.bindings.resolve(control, none),
            demo.bindings.resolve(control, none),
            "{:?}",
            control
        );
    }
    assert_eq!(
        stock.bindings.resolve(Control::Jog(Direction::Clockwise), none),
        Binding::PointerClick(4)
    );
}

#[test]
fn demo_shuttle_scrolls_in_bursts() {
    let config = Config::from_toml(DEMO_CONFIG).unwrap();
    let mut translator = Translator::new(config.to_translator_config());
    let mut sink = RecordingSink::new();

    translator.process_frame(
        &[RawEvent::shuttle(2), RawEvent::jog(0), RawEvent::sync()],
        &mut sink,
    );
    translator.process_frame(
        &[RawEvent::shuttle(-1), RawEvent::jog(0), RawEvent::sync()],
        &mut sink,
    );

    let press = |button| SinkAction::PointerButton { button, pressed: true };
    let release = |button| SinkAction::PointerButton { button, pressed: false };
    assert_eq!(
        sink.actions(),
        &[press(5), release(5), press(5), release(5), press(4), release(4)]
    );
}
