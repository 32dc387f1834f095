use std::fs;

use serde::Deserialize;

#[derive(Debug)]
pub struct Settings {
    pub server_url: String,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            email: None,
            password: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    server_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

/// Defaults, then `clinic.toml`, then `CLINIC_*` environment overrides.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("clinic.toml") {
        if let Ok(file_cfg) = toml::from_str::<FileSettings>(&raw) {
            if let Some(v) = file_cfg.server_url {
                settings.server_url = v;
            }
            if let Some(v) = file_cfg.email {
                settings.email = Some(v);
            }
            if let Some(v) = file_cfg.password {
                settings.password = Some(v);
            }
        }
    }

    if let Ok(v) = std::env::var("CLINIC_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("CLINIC_EMAIL") {
        settings.email = Some(v);
    }
    if let Ok(v) = std::env::var("CLINIC_PASSWORD") {
        settings.password = Some(v);
    }

    settings
}
