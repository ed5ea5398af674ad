#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    // Absent means accounts live in process memory and vanish on restart.
    pub database_url: Option<String>,
    pub cors_allowed_origin: String,
    pub log_format: LogFormat,
}

pub const DEFAULT_PORT: u16 = 3333;
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:5173";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            cors_allowed_origin: DEFAULT_CORS_ALLOWED_ORIGIN.to_string(),
            log_format: LogFormat::default(),
        }
    }
}
