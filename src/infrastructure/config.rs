//! Environment-driven configuration. An optional `.env` file is loaded first.

use crate::data::http_gateway::DEFAULT_API_URL;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin of the browser front end allowed through CORS.
    pub allowed_origin: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("FINANCE_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("FINANCE_PORT must be a port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            host: lookup("FINANCE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            allowed_origin: lookup("FINANCE_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_file: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_url: lookup("FINANCE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            session_file: lookup("FINANCE_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_session_file),
        }
    }
}

fn default_session_file() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("finance-tracker"))
        .unwrap_or_else(|| PathBuf::from(".finance-tracker"))
        .join("session.json")
}
