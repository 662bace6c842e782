use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{fast_config, init_tracing, InputEvent, RecordingInput};
use crate::platforms::KeyDirection;
use crate::{Key, Keyboard};

fn keyboard(input: &Arc<RecordingInput>) -> Keyboard {
    Keyboard::with_engine(input.clone(), fast_config())
}

#[test]
fn test_type_text_in_one_go_without_interval() {
    init_tracing();
    let input = Arc::new(RecordingInput::new());

    assert!(keyboard(&input).type_text("hi", Some(Duration::ZERO)));
    assert_eq!(input.events(), vec![InputEvent::Text("hi".to_string())]);
}

#[test]
fn test_type_text_per_character_with_interval() {
    let input = Arc::new(RecordingInput::new());

    assert!(keyboard(&input).type_text("héy", Some(Duration::from_millis(1))));
    assert_eq!(
        input.events(),
        vec![
            InputEvent::Text("h".to_string()),
            InputEvent::Text("é".to_string()),
            InputEvent::Text("y".to_string()),
        ]
    );
}

#[test]
fn test_type_text_uses_configured_interval() {
    // fast_config sets the interval to zero, so the default path sends one chunk
    let input = Arc::new(RecordingInput::new());

    assert!(keyboard(&input).type_text("Hello, World!", None));
    assert_eq!(
        input.events(),
        vec![InputEvent::Text("Hello, World!".to_string())]
    );
}

#[test]
fn test_hotkey_presses_in_order_and_releases_in_reverse() {
    init_tracing();
    let input = Arc::new(RecordingInput::new());

    assert!(keyboard(&input).hotkey(&["ctrl", "shift", "s"]));
    assert_eq!(
        input.events(),
        vec![
            InputEvent::Key(Key::Control, KeyDirection::Press),
            InputEvent::Key(Key::Shift, KeyDirection::Press),
            InputEvent::Key(Key::Char('s'), KeyDirection::Press),
            InputEvent::Key(Key::Char('s'), KeyDirection::Release),
            InputEvent::Key(Key::Shift, KeyDirection::Release),
            InputEvent::Key(Key::Control, KeyDirection::Release),
        ]
    );
}

#[test]
fn test_hotkey_with_unknown_key_sends_nothing() {
    let input = Arc::new(RecordingInput::new());

    assert!(!keyboard(&input).hotkey(&["ctrl", "hyper"]));
    assert!(input.events().is_empty());
}

#[test]
fn test_hotkey_without_keys_is_false() {
    let input = Arc::new(RecordingInput::new());

    assert!(!keyboard(&input).hotkey(&[]));
    assert!(input.events().is_empty());
}

#[test]
fn test_hotkey_releases_modifiers_after_failure() {
    init_tracing();
    let input = Arc::new(RecordingInput::failing_on(
        Key::Char('s'),
        KeyDirection::Press,
    ));

    assert!(!keyboard(&input).hotkey(&["ctrl", "shift", "s"]));
    assert_eq!(
        input.events(),
        vec![
            InputEvent::Key(Key::Control, KeyDirection::Press),
            InputEvent::Key(Key::Shift, KeyDirection::Press),
            InputEvent::Key(Key::Shift, KeyDirection::Release),
            InputEvent::Key(Key::Control, KeyDirection::Release),
        ]
    );
}

#[test]
fn test_press_sends_a_click() {
    let input = Arc::new(RecordingInput::new());
    let keyboard = keyboard(&input);

    assert!(keyboard.press("enter"));
    assert!(keyboard.press("F5"));
    assert_eq!(
        input.events(),
        vec![
            InputEvent::Key(Key::Enter, KeyDirection::Click),
            InputEvent::Key(Key::F(5), KeyDirection::Click),
        ]
    );
}

#[test]
fn test_press_unknown_key_is_false() {
    let input = Arc::new(RecordingInput::new());

    assert!(!keyboard(&input).press("nope"));
    assert!(input.events().is_empty());
}

#[test]
fn test_press_reports_engine_failure() {
    let input = Arc::new(RecordingInput::failing_on(Key::Tab, KeyDirection::Click));

    assert!(!keyboard(&input).press("tab"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_slow_typing_leaves_other_tasks_running() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = ticks.clone();
        tokio::spawn(async move {
            loop {
                ticks.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let input = Arc::new(RecordingInput::new());
    let keyboard = keyboard(&input);
    let before = ticks.load(Ordering::SeqCst);
    // Runs on the only worker, next to the ticker
    let typed = tokio::spawn(async move {
        keyboard.type_text("abcdefghij", Some(Duration::from_millis(20)))
    })
    .await
    .unwrap();
    let during = ticks.load(Ordering::SeqCst) - before;
    ticker.abort();

    assert!(typed);
    assert_eq!(input.events().len(), 10);
    assert!(during >= 3, "ticker advanced {} times while typing", during);
}

#[tokio::test]
async fn test_slow_typing_on_current_thread_runtime() {
    let input = Arc::new(RecordingInput::new());

    assert!(keyboard(&input).type_text("ok", Some(Duration::from_millis(1))));
    assert_eq!(input.events().len(), 2);
}
