use picomac::{BridgeConfig, KeyScript, Simulation, StartMode};
use picomac_input::{map_raw_key, MacKeyCode, SystemAction};
use picomac_video::{PixelFormat, Rgb111, Rgb565};
use proptest::prelude::*;

fn sim_with_script<P: PixelFormat>(config: &BridgeConfig, script: &str) -> Simulation<P> {
    let words = KeyScript::from_json_str(script).unwrap().fifo_words().unwrap();
    let mut sim = Simulation::<P>::new(config).unwrap();
    sim.feed(words);
    sim
}

fn wire(key: MacKeyCode) -> u8 {
    key.encode(true).wire_code()
}

#[test]
fn typed_text_reaches_the_mac_in_order() {
    let mut sim = sim_with_script::<Rgb565>(
        &BridgeConfig::default(),
        r#"{"steps": [{"type": "hi"}, {"wait": 3}, {"key": "enter"}]}"#,
    );
    let report = sim.run(3);

    let h = wire(MacKeyCode::H);
    let i = wire(MacKeyCode::I);
    assert_eq!(
        sim.mac().keys(),
        &[(h, true), (h, false), (i, true), (i, false)]
    );
    // Enter is the pointer button in pointer mode.
    assert!(!report.button);
    assert_eq!(report.keys_pending, 0);
    assert_eq!(report.mode, "pointer");
}

#[test]
fn key_mode_forwards_pointer_bindings_as_keys() {
    let config = BridgeConfig {
        initial_mode: StartMode::Key,
        ..BridgeConfig::default()
    };
    let mut sim = sim_with_script::<Rgb565>(&config, r#"{"steps": [{"key": "enter"}]}"#);
    sim.run(2);
    let ret = wire(MacKeyCode::RETURN);
    assert_eq!(sim.mac().keys(), &[(ret, true), (ret, false)]);
}

#[test]
fn mode_toggle_is_never_delivered() {
    let mut sim = sim_with_script::<Rgb565>(
        &BridgeConfig::default(),
        r#"{"steps": [{"key": "right_shift"}, {"key": "right_shift"}, {"key": "right_shift"}]}"#,
    );
    let report = sim.run(2);
    assert!(sim.mac().keys().is_empty());
    assert_eq!(report.mode, "key");
}

#[test]
fn holding_right_pans_the_viewport_to_the_edge() {
    let mut sim = sim_with_script::<Rgb565>(
        &BridgeConfig::default(),
        r#"{"steps": [{"key": "right", "state": "pressed"}]}"#,
    );
    let report = sim.run(400);
    assert_eq!(report.mouse, (639, 240));
    assert_eq!(report.viewport, (320, 0));
    assert_eq!(report.frames, 400);
}

#[test]
fn control_alt_delete_stops_the_run() {
    let mut sim = sim_with_script::<Rgb111>(
        &BridgeConfig::default(),
        r#"{"steps": [
            {"key": "control", "state": "pressed"},
            {"key": "alt", "state": "pressed"},
            {"key": "delete"}
        ]}"#,
    );
    let report = sim.run(100);
    assert_eq!(sim.system_action(), Some(SystemAction::WatchdogReset));
    assert_eq!(report.frames, 1);
    assert_eq!(report.system_action.as_deref(), Some("WatchdogReset"));
}

#[test]
fn lcd_shows_menu_bar_and_desktop() {
    let mut sim = Simulation::<Rgb565>::new(&BridgeConfig::default()).unwrap();
    sim.run(1);
    let lcd = sim.lcd();
    // Menu bar is white with a black rule under it; the desktop is a checkerboard.
    assert_eq!(lcd.pixel(0, 0), Some(Rgb565::WHITE));
    assert_eq!(lcd.pixel(5, 19), Some(Rgb565::BLACK));
    assert_ne!(lcd.pixel(0, 100), lcd.pixel(1, 100));
    assert_ne!(lcd.pixel(0, 100), lcd.pixel(0, 101));
}

#[test]
fn vsync_and_one_hz_follow_simulated_time() {
    let mut sim = Simulation::<Rgb565>::new(&BridgeConfig::default()).unwrap();
    let report = sim.run(120);
    assert!(report.elapsed_us >= 120 * 16_667);
    assert_eq!(report.rendered_frames, 120);
    assert_eq!(report.machine_loops, report.elapsed_us / 1_000);
    assert!(report.vsyncs >= 110 && report.vsyncs <= 120, "{}", report.vsyncs);
    assert_eq!(report.seconds, report.elapsed_us / 1_000_000);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scripted_keys_arrive_in_fifo_order(
        chunks in proptest::collection::vec(("[a-z0-9]{1,4}", 0u32..5), 0..6),
    ) {
        let steps: Vec<String> = chunks
            .iter()
            .map(|(text, wait)| format!(r#"{{"type": "{text}"}}, {{"wait": {wait}}}"#))
            .collect();
        let script = format!(r#"{{"steps": [{}]}}"#, steps.join(", "));

        let mut sim = sim_with_script::<Rgb565>(&BridgeConfig::default(), &script);
        let report = sim.run(8);

        let expected: Vec<(u8, bool)> = chunks
            .iter()
            .flat_map(|(text, _)| text.bytes())
            .flat_map(|b| {
                let code = wire(map_raw_key(b).unwrap());
                [(code, true), (code, false)]
            })
            .collect();
        prop_assert_eq!(sim.mac().keys(), expected.as_slice());
        prop_assert_eq!(report.keys_pending, 0);
    }
}
