use kieli_config::Config;

use crate::state::AppState;


/// Sample vocabulary, default config, no colors
pub fn test_state() -> AppState {
    let mut state = AppState::new(Config::default()).expect("state");
    state.color = false;
    state
}
