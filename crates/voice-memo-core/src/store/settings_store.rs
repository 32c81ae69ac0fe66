use crate::{
    Settings,
    store::{PersistWriter, PersistenceGateway, SETTINGS_KEY, load_json},
};

use std::sync::Arc;

use tracing::{info, instrument};

/// Persisted user settings.
pub struct SettingsStore {
    settings: Settings,
    writer: PersistWriter,
}

impl SettingsStore {
    /// Load settings, falling back to defaults when absent or unreadable.
    #[instrument(skip(gateway))]
    pub async fn load(gateway: Arc<dyn PersistenceGateway>) -> Self {
        let settings: Settings = load_json(gateway.as_ref(), SETTINGS_KEY)
            .await
            .unwrap_or_default();

        info!(
            high_quality = settings.high_quality,
            auto_save = settings.auto_save,
            "Settings loaded"
        );

        Self {
            settings,
            writer: PersistWriter::spawn(gateway, SETTINGS_KEY),
        }
    }

    /// Current settings.
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Replace all settings and persist.
    #[instrument(skip(self))]
    pub fn update(&mut self, settings: Settings) {
        self.settings = settings;
        self.writer.submit(&self.settings);
    }

    /// Wait for the latest settings to reach the store.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }
}
