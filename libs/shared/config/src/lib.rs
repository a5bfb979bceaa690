use std::env;
use tracing::warn;

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: Option<String>,
    /// `None` means the console re-prompts until the input is valid or closed.
    pub prompt_max_attempts: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_host: DEFAULT_DB_HOST.to_string(),
            db_port: DEFAULT_DB_PORT,
            db_name: String::new(),
            db_user: String::new(),
            db_password: None,
            prompt_max_attempts: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            db_host: env::var("DB_HOST")
                .unwrap_or_else(|_| DEFAULT_DB_HOST.to_string()),
            db_port: parse_port(env::var("DB_PORT").ok().as_deref()),
            db_name: env::var("DB_NAME").unwrap_or_default(),
            db_user: env::var("DB_USER").unwrap_or_default(),
            db_password: env::var("DB_PASSWORD")
                .or_else(|_| env::var("PGPASSWORD"))
                .ok(),
            prompt_max_attempts: parse_max_attempts(env::var("PROMPT_MAX_ATTEMPTS").ok().as_deref()),
        };

        if config.db_password.is_none() {
            warn!("DB_PASSWORD not set, the password will be prompted for");
        }

        config
    }

    /// Applies the positional startup arguments on top of the environment.
    pub fn with_target(mut self, db_name: &str, db_port: u16, db_user: &str) -> Self {
        self.db_name = db_name.to_string();
        self.db_port = db_port;
        self.db_user = db_user.to_string();
        self
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.db_host = host.to_string();
        self
    }

    pub fn with_password(mut self, password: String) -> Self {
        self.db_password = Some(password);
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.db_host.is_empty()
            && !self.db_name.is_empty()
            && !self.db_user.is_empty()
            && self.db_port != 0
    }

    pub fn connection_url(&self) -> String {
        format!("postgresql://{}:{}/{}", self.db_host, self.db_port, self.db_name)
    }

    /// Human readable target, never includes the password.
    pub fn connection_summary(&self) -> String {
        format!("{} as {}", self.connection_url(), self.db_user)
    }
}

fn parse_port(raw: Option<&str>) -> u16 {
    match raw {
        None => DEFAULT_DB_PORT,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("DB_PORT '{}' is not a valid port, using {}", value, DEFAULT_DB_PORT);
            DEFAULT_DB_PORT
        }),
    }
}

/// Only a positive number bounds re-prompting.
fn parse_max_attempts(raw: Option<&str>) -> Option<usize> {
    let value = raw.map(str::trim)?;
    match value.parse::<usize>() {
        Ok(0) => None,
        Ok(attempts) => Some(attempts),
        Err(_) => {
            warn!("PROMPT_MAX_ATTEMPTS '{}' is not a number, re-prompting without a bound", value);
            None
        }
    }
}
