//! Listener settings for the mock order server.

/// Where the server listens. Defaults to `127.0.0.1:8080`; `PORT` changes
/// only the port, `MOCK_SERVER_BIND` replaces the whole address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".into(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::resolve(std::env::var("PORT").ok(), std::env::var("MOCK_SERVER_BIND").ok())
    }

    pub fn resolve(port: Option<String>, bind: Option<String>) -> Self {
        let mut settings = Settings::default();
        if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
            settings.bind = format!("127.0.0.1:{}", port.trim());
        }
        if let Some(bind) = bind.filter(|b| !b.trim().is_empty()) {
            settings.bind = bind.trim().to_string();
        }
        settings
    }
}
