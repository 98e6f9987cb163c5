// Keyboard event handling
//
// This module contains the keyboard event handler that processes
// user input and updates the application state accordingly.

use super::AppState;
use crossterm::event::KeyCode;

/// Handle keyboard events and update application state
///
/// Returns `true` if the application should continue running,
/// `false` if it should exit.
///
/// # Key Bindings
/// - `q`, `Q`, `Esc` - Quit the application
/// - `Up` / `Down` - Select previous / next node
/// - `g` - Refresh the device list
/// - `d` - Switch to the next capture device
/// - `c`, `Space` - Start or stop capture
/// - `n` - Toggle domain labels (redraws every node)
/// - `t` - Toggle address labels
/// - `a` - Toggle animations
/// - `+`, `=` / `-`, `_` - Slower / faster refresh
/// - `x` - Clear the map
pub fn handle_key_event(app: &mut AppState, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            app.running = false;
            false
        }
        KeyCode::Up => {
            app.select_previous_node();
            true
        }
        KeyCode::Down => {
            app.select_next_node();
            true
        }
        KeyCode::Char('g') | KeyCode::Char('G') => {
            app.refresh_devices();
            true
        }
        KeyCode::Char('d') | KeyCode::Char('D') => {
            app.next_device();
            true
        }
        KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Char(' ') => {
            app.toggle_capture();
            true
        }
        KeyCode::Char('n') | KeyCode::Char('N') => {
            app.toggle_domain_labels();
            true
        }
        KeyCode::Char('t') | KeyCode::Char('T') => {
            app.map_settings.address_labels_enabled = !app.map_settings.address_labels_enabled;
            true
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            app.map_settings.animations_enabled = !app.map_settings.animations_enabled;
            true
        }
        // + = slower refresh (increase interval)
        // - = faster refresh (decrease interval)
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.decrease_refresh_rate();
            true
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            app.increase_refresh_rate();
            true
        }
        KeyCode::Char('x') | KeyCode::Char('X') => {
            app.clear_map();
            true
        }
        _ => true,
    }
}
