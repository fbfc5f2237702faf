#![forbid(unsafe_code)]

//! Settings collaborator seam and engine configuration.
//!
//! # Design
//!
//! The persistence store is external; the engine only sees [`SettingsStore`]
//! (keyed `get`, partial `update`, key enumeration). [`LayoutConfig`] is read
//! from JSON or from a store, then validated in the manner of a policy file:
//! [`LayoutConfig::validate`] returns every problem at once, empty == valid.
//!
//! Writing the active layout never counts as a broad settings change, so the
//! autosave loop cannot feed back into itself.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use web_time::{Duration, Instant};

use crate::host::ContentHost;
use crate::model::{ColumnLocation, GhostTab};
use crate::session::LayoutSession;
use crate::signal::{LayoutChangeReason, SignalBus, Subscription};
use crate::DEFAULT_MAX_LAYERS;
use panedeck_core::timing::Debouncer;

/// Store key holding the persisted snapshot.
pub const ACTIVE_LAYOUT_KEY: &str = "activeLayout";

/// Keyed settings store with defaults fallback.
pub trait SettingsStore {
    /// Current value for `key`, falling back to the store's default.
    fn get(&self, key: &str) -> Option<Value>;

    /// Merge `partial` into the stored values.
    fn update(&mut self, partial: Map<String, Value>);

    /// Every key with a value or a default.
    fn keys(&self) -> Vec<String>;
}

/// In-memory [`SettingsStore`] with a change-notification counter.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: BTreeMap<String, Value>,
    defaults: BTreeMap<String, Value>,
    notifications: u64,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_defaults(defaults: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            defaults: defaults.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Convenience single-key update.
    pub fn set(&mut self, key: &str, value: Value) {
        let mut partial = Map::new();
        partial.insert(key.to_string(), value);
        self.update(partial);
    }

    /// Number of broad "settings changed" notifications fired so far.
    #[must_use]
    pub const fn notifications(&self) -> u64 {
        self.notifications
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values
            .get(key)
            .or_else(|| self.defaults.get(key))
            .cloned()
    }

    fn update(&mut self, partial: Map<String, Value>) {
        if partial.is_empty() {
            return;
        }
        let layout_only = partial.keys().all(|key| key == ACTIVE_LAYOUT_KEY);
        for (key, value) in partial {
            self.values.insert(key, value);
        }
        if !layout_only {
            self.notifications += 1;
        }
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .values
            .keys()
            .chain(self.defaults.keys())
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// Label metadata for a panel source identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelMapping {
    /// Source identifier, e.g. `#terminal`.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub pinned: bool,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub max_layers_left: usize,
    pub max_layers_center: usize,
    pub max_layers_right: usize,
    pub icons_only: bool,
    pub mobile_mode: bool,
    pub panel_mappings: Vec<PanelMapping>,
    /// Fraction of a pane's extent, from each edge, that starts a split.
    pub edge_threshold: f64,
    pub leave_grace_ms: u64,
    pub mutation_debounce_ms: u64,
    pub mutation_max_wait_ms: u64,
    pub icon_mode_throttle_ms: u64,
    pub autosave_debounce_ms: u64,
    /// Regions whose mutations never trigger hydration.
    pub noisy_regions: Vec<String>,
    /// Regions whose elements never hydrate a pending tab.
    pub staging_regions: Vec<String>,
    /// Columns pinned tabs may not enter, beyond hidden ones.
    pub pinned_forbidden_columns: Vec<ColumnLocation>,
    /// Pending placements of the default layout.
    pub default_placements: Vec<GhostTab>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_layers_left: DEFAULT_MAX_LAYERS,
            max_layers_center: DEFAULT_MAX_LAYERS,
            max_layers_right: DEFAULT_MAX_LAYERS,
            icons_only: false,
            mobile_mode: false,
            panel_mappings: Vec::new(),
            edge_threshold: 0.2,
            leave_grace_ms: 60,
            mutation_debounce_ms: 100,
            mutation_max_wait_ms: 400,
            icon_mode_throttle_ms: 80,
            autosave_debounce_ms: 250,
            noisy_regions: vec!["chat".to_string()],
            staging_regions: vec!["template".to_string(), "popup".to_string()],
            pinned_forbidden_columns: Vec::new(),
            default_placements: Vec::new(),
        }
    }
}

impl LayoutConfig {
    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load every recognised key from a settings store and validate.
    pub fn from_store(store: &dyn SettingsStore) -> Result<Self, ConfigError> {
        let mut object = Map::new();
        for key in store.keys() {
            if key == ACTIVE_LAYOUT_KEY {
                continue;
            }
            if let Some(value) = store.get(&key) {
                object.insert(key, value);
            }
        }
        let config: Self = serde_json::from_value(Value::Object(object)).map_err(ConfigError::Json)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, value) in [
            ("maxLayersLeft", self.max_layers_left),
            ("maxLayersCenter", self.max_layers_center),
            ("maxLayersRight", self.max_layers_right),
        ] {
            if value == 0 {
                errors.push(format!("{name} must be >= 1"));
            }
        }

        if !(self.edge_threshold > 0.0 && self.edge_threshold < 0.5) {
            errors.push(format!(
                "edgeThreshold must be in (0, 0.5), got {}",
                self.edge_threshold
            ));
        }

        if self.mutation_debounce_ms == 0 {
            errors.push("mutationDebounceMs must be > 0".into());
        }
        if self.mutation_max_wait_ms < self.mutation_debounce_ms {
            errors.push(format!(
                "mutationMaxWaitMs ({}) must be >= mutationDebounceMs ({})",
                self.mutation_max_wait_ms, self.mutation_debounce_ms
            ));
        }

        let mut seen = Vec::new();
        for mapping in &self.panel_mappings {
            if mapping.id.is_empty() {
                errors.push("panelMappings entries need a non-empty id".into());
            } else if seen.contains(&mapping.id.as_str()) {
                errors.push(format!("panelMappings id {} is duplicated", mapping.id));
            } else {
                seen.push(mapping.id.as_str());
            }
        }

        for (index, ghost) in self.default_placements.iter().enumerate() {
            if ghost.key().is_none() {
                errors.push(format!(
                    "defaultPlacements[{index}] needs searchId or searchClass"
                ));
            }
        }

        if self.pinned_forbidden_columns.contains(&ColumnLocation::Center) {
            errors.push("pinnedForbiddenColumns cannot include center".into());
        }

        errors
    }

    /// Split-depth ceiling for `column`.
    #[must_use]
    pub const fn max_layers(&self, column: ColumnLocation) -> usize {
        match column {
            ColumnLocation::Left => self.max_layers_left,
            ColumnLocation::Center => self.max_layers_center,
            ColumnLocation::Right => self.max_layers_right,
        }
    }

    #[must_use]
    pub fn mapping(&self, source_id: &str) -> Option<&PanelMapping> {
        self.panel_mappings.iter().find(|m| m.id == source_id)
    }

    #[must_use]
    pub const fn leave_grace(&self) -> Duration {
        Duration::from_millis(self.leave_grace_ms)
    }

    #[must_use]
    pub const fn mutation_window(&self) -> Duration {
        Duration::from_millis(self.mutation_debounce_ms)
    }

    #[must_use]
    pub const fn mutation_max_wait(&self) -> Duration {
        Duration::from_millis(self.mutation_max_wait_ms)
    }

    #[must_use]
    pub const fn icon_mode_interval(&self) -> Duration {
        Duration::from_millis(self.icon_mode_throttle_ms)
    }

    #[must_use]
    pub const fn autosave_window(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

/// Errors loading a [`LayoutConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

/// Debounced persistence of the active layout.
///
/// Listens to layout signals through a [`Subscription`]; [`Autosave::poll`]
/// writes the current snapshot once the burst has been quiet for the
/// configured window. Manual-resize intermediate frames never reach the bus,
/// so a drag persists exactly once.
pub struct Autosave {
    queue: Rc<RefCell<Debouncer<LayoutChangeReason>>>,
    _subscription: Subscription,
    writes: u64,
}

impl std::fmt::Debug for Autosave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autosave")
            .field("queued", &self.queue.borrow().len())
            .field("writes", &self.writes)
            .finish()
    }
}

impl Autosave {
    /// Start listening on `bus`.
    #[must_use]
    pub fn attach(bus: &mut SignalBus, window: Duration) -> Self {
        let queue = Rc::new(RefCell::new(Debouncer::new(window, window * 4)));
        let sink = Rc::clone(&queue);
        let subscription = bus.subscribe(move |signal| {
            sink.borrow_mut().push(signal.reason, Instant::now());
        });
        Self {
            queue,
            _subscription: subscription,
            writes: 0,
        }
    }

    /// Whether a write is queued.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }

    /// Persist the snapshot if the queued burst is due at `now`.
    pub fn poll<H: ContentHost>(
        &mut self,
        now: Instant,
        session: &LayoutSession<H>,
        store: &mut dyn SettingsStore,
    ) -> bool {
        let batch = self.queue.borrow_mut().poll(now);
        match batch {
            Some(reasons) if !reasons.is_empty() => {
                self.write(session, store);
                true
            }
            _ => false,
        }
    }

    /// Persist immediately if anything is queued.
    pub fn flush<H: ContentHost>(
        &mut self,
        session: &LayoutSession<H>,
        store: &mut dyn SettingsStore,
    ) -> bool {
        let batch = self.queue.borrow_mut().flush();
        if batch.is_empty() {
            return false;
        }
        self.write(session, store);
        true
    }

    #[must_use]
    pub const fn writes(&self) -> u64 {
        self.writes
    }

    fn write<H: ContentHost>(&mut self, session: &LayoutSession<H>, store: &mut dyn SettingsStore) {
        let snapshot = session.generate_snapshot();
        match serde_json::to_value(&snapshot) {
            Ok(value) => {
                let mut partial = Map::new();
                partial.insert(ACTIVE_LAYOUT_KEY.to_string(), value);
                store.update(partial);
                self.writes += 1;
                tracing::debug!(target: "panedeck.snapshot", writes = self.writes, "layout persisted");
            }
            Err(err) => {
                tracing::warn!(target: "panedeck.snapshot", error = %err, "snapshot serialization failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_valid() {
        let config = LayoutConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.max_layers(ColumnLocation::Center), 3);
        assert_eq!(config.noisy_regions, vec!["chat".to_string()]);
    }

    #[test]
    fn json_uses_camel_case_and_fills_defaults() {
        let config = LayoutConfig::from_json_str(
            r##"{"maxLayersLeft": 2, "edgeThreshold": 0.25,
                "panelMappings": [{"id": "#terminal", "title": "Terminal"}]}"##,
        )
        .expect("valid config");
        assert_eq!(config.max_layers_left, 2);
        assert_eq!(config.max_layers_right, 3);
        assert_eq!(config.edge_threshold, 0.25);
        assert_eq!(
            config.mapping("#terminal").map(|m| m.title.as_str()),
            Some("Terminal")
        );
    }

    #[test]
    fn validate_collects_every_problem() {
        let config = LayoutConfig {
            max_layers_center: 0,
            edge_threshold: 0.7,
            mutation_max_wait_ms: 10,
            default_placements: vec![GhostTab::default()],
            ..LayoutConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors[0].contains("maxLayersCenter"));
    }

    #[test]
    fn from_store_reads_keys_and_rejects_invalid() {
        let mut store = MemorySettings::with_defaults([("iconsOnly".to_string(), json!(true))]);
        store.set("maxLayersRight", json!(5));
        let config = LayoutConfig::from_store(&store).expect("valid store");
        assert!(config.icons_only);
        assert_eq!(config.max_layers_right, 5);

        store.set("edgeThreshold", json!(0.0));
        assert!(matches!(
            LayoutConfig::from_store(&store),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn active_layout_update_is_silent() {
        let mut store = MemorySettings::new();
        store.set(ACTIVE_LAYOUT_KEY, json!({"version": 1}));
        assert_eq!(store.notifications(), 0);
        store.set("iconsOnly", json!(true));
        assert_eq!(store.notifications(), 1);
        let mut both = Map::new();
        both.insert(ACTIVE_LAYOUT_KEY.to_string(), json!(null));
        both.insert("mobileMode".to_string(), json!(true));
        store.update(both);
        assert_eq!(store.notifications(), 2);
        assert_eq!(
            store.keys(),
            vec![
                ACTIVE_LAYOUT_KEY.to_string(),
                "iconsOnly".to_string(),
                "mobileMode".to_string()
            ]
        );
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "validation errors: a; b");
        assert!(std::error::Error::source(&err).is_none());
    }
}
