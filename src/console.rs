//! Browser console logging.
//!
//! Messages go to `console.log` / `console.error` when compiled for wasm32.
//! On native targets (tests, tooling) the macros expand to nothing but still
//! type-check their arguments.

#[doc(hidden)]
#[cfg(target_arch = "wasm32")]
pub fn log(message: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(message));
}

#[doc(hidden)]
#[cfg(target_arch = "wasm32")]
pub fn error(message: &str) {
    web_sys::console::error_1(&wasm_bindgen::JsValue::from_str(message));
}

#[doc(hidden)]
#[cfg(not(target_arch = "wasm32"))]
pub fn log(_message: &str) {}

#[doc(hidden)]
#[cfg(not(target_arch = "wasm32"))]
pub fn error(_message: &str) {}

/// Log an informational line prefixed with `[hintcore]`
macro_rules! console_log {
    ($($arg:tt)*) => {
        $crate::console::log(&format!("[hintcore] {}", format_args!($($arg)*)))
    };
}

/// Log an error line prefixed with `[hintcore]`
macro_rules! console_error {
    ($($arg:tt)*) => {
        $crate::console::error(&format!("[hintcore] {}", format_args!($($arg)*)))
    };
}

pub(crate) use console_error;
pub(crate) use console_log;
