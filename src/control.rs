//! Control surface: persisted settings and popup messages
//!
//! Messages arrive as `{ "action": "toggle" }` or `{ "action": "getStatus" }`
//! and are answered with `{ "enabled": bool }`.

use serde::{Deserialize, Serialize};

use crate::error::HintError;
use crate::presentation::{ActivePopover, Rect, Size, Viewport};
use crate::scanner::{ContentHost, ScanDriver, ScanReport};

/// Control message from the popup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlMessage {
    Toggle,
    GetStatus,
}

/// Reply to every control message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub enabled: bool,
}

/// Persisted popup settings, as the host stores them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// `None` until the user toggles for the first time
    pub enabled: Option<bool>,
    pub hints_shown: u64,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, HintError> {
        serde_json::from_str(json).map_err(|e| HintError::InvalidControl(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, HintError> {
        serde_json::to_string(self).map_err(|e| HintError::InvalidControl(e.to_string()))
    }
}

/// Host-side persistence of the enabled flag and the hints-shown counter
pub trait SettingsStore {
    /// Stored flag, `None` when nothing was ever stored
    fn load_enabled(&self) -> Option<bool>;
    fn store_enabled(&mut self, enabled: bool);
    fn load_hints_shown(&self) -> u64;
    fn store_hints_shown(&mut self, count: u64);
}

/// Volatile store (tests, hosts that persist the `Settings` snapshot themselves)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    settings: Settings,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(enabled: bool) -> Self {
        Self::from_settings(Settings {
            enabled: Some(enabled),
            ..Settings::default()
        })
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }
}

impl SettingsStore for MemoryStore {
    fn load_enabled(&self) -> Option<bool> {
        self.settings.enabled
    }

    fn store_enabled(&mut self, enabled: bool) {
        self.settings.enabled = Some(enabled);
    }

    fn load_hints_shown(&self) -> u64 {
        self.settings.hints_shown
    }

    fn store_hints_shown(&mut self, count: u64) {
        self.settings.hints_shown = count;
    }
}

/// Ties the scan driver to the persisted settings
pub struct Controller<S: SettingsStore> {
    driver: ScanDriver,
    store: S,
}

impl<S: SettingsStore> Controller<S> {
    /// Apply the persisted settings (or the configured default) and run the initial scan
    pub fn start(mut driver: ScanDriver, store: S, host: &mut impl ContentHost) -> (Self, ScanReport) {
        driver.restore_hints_shown(store.load_hints_shown());
        let enabled = store.load_enabled().unwrap_or(driver.config().enabled_by_default);
        let report = if driver.is_enabled() != enabled {
            driver.set_enabled(host, enabled)
        } else if enabled {
            driver.scan_all(host)
        } else {
            ScanReport::default()
        };
        (Self { driver, store }, report)
    }

    pub fn driver(&self) -> &ScanDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut ScanDriver {
        &mut self.driver
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a hint popover and persist the new shown count
    pub fn show_hint(&mut self, keyword: &str, anchor: Rect, size: Size, viewport: Viewport) -> Option<&ActivePopover> {
        if self.driver.show_hint(keyword, anchor, size, viewport).is_none() {
            return None;
        }
        self.store.store_hints_shown(self.driver.hints_shown());
        self.driver.active_hint()
    }

    /// Handle one control message. `GetStatus` has no side effects.
    pub fn handle(&mut self, message: ControlMessage, host: &mut impl ContentHost) -> ControlResponse {
        match message {
            ControlMessage::Toggle => {
                self.driver.toggle(host);
                self.store.store_enabled(self.driver.is_enabled());
            }
            ControlMessage::GetStatus => {}
        }
        ControlResponse {
            enabled: self.driver.is_enabled(),
        }
    }

    /// JSON in, JSON out
    pub fn handle_json(&mut self, json: &str, host: &mut impl ContentHost) -> Result<String, HintError> {
        let message: ControlMessage =
            serde_json::from_str(json).map_err(|e| HintError::InvalidControl(e.to_string()))?;
        let response = self.handle(message, host);
        serde_json::to_string(&response).map_err(|e| HintError::InvalidControl(e.to_string()))
    }
}
