// SPDX-License-Identifier: MIT OR Apache-2.0
//! The config edit round trip: emitter declares an item, the user edits it,
//! the renderer emits `hawk.config_update`, and the emitter's echo clears
//! the modified marker.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hawk_ingest::Router;
use hawk_protocol::params::ConfigValue;
use hawk_protocol::{Envelope, Outbound};
use hawk_store::{ConfigSyncState, Store};
use hawk_ui::{Mode, Ui, UiAction};
use serde_json::{Value, json};

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Route one inbound envelope value as the ingest task would.
fn route(router: &Router, value: Value) {
    let envelope = Envelope::from_value(&value).unwrap();
    assert!(router.route(envelope, chrono::Utc::now()).is_none());
}

fn type_text(ui: &mut Ui, store: &Store, text: &str) -> Vec<UiAction> {
    text.chars()
        .map(|c| ui.handle_key(press(KeyCode::Char(c)), store))
        .collect()
}

#[test]
fn edit_commit_emits_update_and_echo_confirms() {
    let store = Arc::new(Store::new());
    let router = Router::new(Arc::clone(&store));

    // The emitter declares port with bounds.
    route(
        &router,
        json!({
            "jsonrpc": "2.0",
            "method": "hawk.config",
            "params": {
                "key": "port", "value": 8080, "type": "integer",
                "min": 1, "max": 65535
            }
        }),
    );

    let mut ui = Ui::new("demo");
    ui.handle_key(press(KeyCode::Char('4')), &store);
    assert_eq!(ui.mode, Mode::Config);
    ui.config.refresh(&store, false);

    // Enter edit, replace 8080 with 9090, commit.
    ui.handle_key(press(KeyCode::Enter), &store);
    for _ in 0..4 {
        ui.handle_key(press(KeyCode::Backspace), &store);
    }
    type_text(&mut ui, &store, "9090");
    let action = ui.handle_key(press(KeyCode::Enter), &store);

    let UiAction::Emit(Outbound::ConfigUpdate { key, value }) = action else {
        panic!("expected an outbound config update, got {action:?}");
    };
    assert_eq!(key, "port");
    assert_eq!(value, ConfigValue::Integer(9090));

    // Optimistic local apply plus the modified marker.
    {
        let configs = store.configs();
        assert_eq!(configs["port"].value, ConfigValue::Integer(9090));
        assert_eq!(configs["port"].sync, ConfigSyncState::Modified);
        assert!(configs["port"].sync.is_marked());
    }

    // The emitter echoes the committed value: marker clears.
    route(
        &router,
        json!({
            "jsonrpc": "2.0",
            "method": "hawk.config",
            "params": {"key": "port", "value": 9090, "type": "integer"}
        }),
    );
    let configs = store.configs();
    assert_eq!(configs["port"].sync, ConfigSyncState::Confirmed);
    assert!(!configs["port"].sync.is_marked());
}

#[test]
fn emitter_disagreement_marks_drift() {
    let store = Arc::new(Store::new());
    let router = Router::new(Arc::clone(&store));
    route(
        &router,
        json!({
            "jsonrpc": "2.0",
            "method": "hawk.config",
            "params": {"key": "mode", "value": "fast", "type": "string"}
        }),
    );

    store
        .commit_config_edit("mode", ConfigValue::Text("slow".into()), chrono::Utc::now())
        .unwrap();

    // The emitter answers with a third value: the item drifts and stays
    // marked until a matching echo or another local edit.
    route(
        &router,
        json!({
            "jsonrpc": "2.0",
            "method": "hawk.config",
            "params": {"key": "mode", "value": "turbo", "type": "string"}
        }),
    );
    {
        let configs = store.configs();
        assert_eq!(configs["mode"].sync, ConfigSyncState::Drifted);
        assert_eq!(configs["mode"].value, ConfigValue::Text("turbo".into()));
    }

    // A late echo of the committed value still confirms.
    route(
        &router,
        json!({
            "jsonrpc": "2.0",
            "method": "hawk.config",
            "params": {"key": "mode", "value": "slow", "type": "string"}
        }),
    );
    assert_eq!(store.configs()["mode"].sync, ConfigSyncState::Confirmed);
}

#[test]
fn no_user_edit_means_no_outbound_update() {
    let store = Arc::new(Store::new());
    let router = Router::new(Arc::clone(&store));
    route(
        &router,
        json!({
            "jsonrpc": "2.0",
            "method": "hawk.config",
            "params": {"key": "port", "value": 8080, "type": "integer"}
        }),
    );

    // Entering edit and committing the unchanged buffer emits nothing.
    let mut ui = Ui::new("demo");
    ui.handle_key(press(KeyCode::Char('4')), &store);
    ui.config.refresh(&store, false);
    ui.handle_key(press(KeyCode::Enter), &store);
    let action = ui.handle_key(press(KeyCode::Enter), &store);
    assert_eq!(action, UiAction::None);
    assert_eq!(store.configs()["port"].sync, ConfigSyncState::Pristine);
}

#[test]
fn out_of_bounds_commit_stays_in_edit_mode() {
    let store = Arc::new(Store::new());
    let router = Router::new(Arc::clone(&store));
    route(
        &router,
        json!({
            "jsonrpc": "2.0",
            "method": "hawk.config",
            "params": {
                "key": "port", "value": 8080, "type": "integer",
                "min": 1, "max": 65535
            }
        }),
    );

    let mut ui = Ui::new("demo");
    ui.handle_key(press(KeyCode::Char('4')), &store);
    ui.config.refresh(&store, false);
    ui.handle_key(press(KeyCode::Enter), &store);
    for _ in 0..4 {
        ui.handle_key(press(KeyCode::Backspace), &store);
    }
    type_text(&mut ui, &store, "99999");
    let action = ui.handle_key(press(KeyCode::Enter), &store);

    assert_eq!(action, UiAction::None);
    let edit = ui.config.edit.as_ref().expect("edit stays open");
    assert!(edit.error.as_ref().unwrap().contains("above the maximum"));
    assert_eq!(store.configs()["port"].value, ConfigValue::Integer(8080));
}
