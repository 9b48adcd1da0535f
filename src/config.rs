//! Service configuration

/// Service configuration, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Path of the SQLite database file
    pub database_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            database_path: std::env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database_path: "bookmarkd.db".to_string(),
        }
    }
}
