use crate::event::BattleEvent;

#[cfg(target_arch = "wasm32")]
mod wasm_log {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console)]
        fn log(message: &str);
    }

    pub fn log_line(message: &str) {
        log(message);
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_log::log_line;

#[cfg(not(target_arch = "wasm32"))]
pub fn log_line(message: &str) {
    tracing::debug!(target: "battle_core::event", "{message}");
}

/// Writes an event as a JSON line into the host buffer and mirrors it.
pub fn push_event(logs: &mut Vec<String>, event: &BattleEvent) {
    let line = event.to_json_line();
    log_line(&line);
    logs.push(line);
}
