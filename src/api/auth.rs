//! Shared-secret header checks
//!
//! The cron trigger sends `x-cron-secret`, curator tooling sends
//! `x-admin-key`. A secret that is not configured matches nothing.

use axum::http::HeaderMap;

use crate::config::AuthConfig;

pub const CRON_SECRET_HEADER: &str = "x-cron-secret";
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

#[derive(Debug, Clone, Default)]
pub struct SecretValidator {
    cron_secret: Option<String>,
    admin_key: Option<String>,
}

impl SecretValidator {
    pub fn new(cron_secret: Option<String>, admin_key: Option<String>) -> Self {
        Self {
            cron_secret: cron_secret.filter(|k| !k.is_empty()),
            admin_key: admin_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.cron_secret.clone(), config.admin_key.clone())
    }

    pub fn allows_cron(&self, headers: &HeaderMap) -> bool {
        matches_secret(header_value(headers, CRON_SECRET_HEADER), self.cron_secret.as_deref())
    }

    pub fn allows_admin(&self, headers: &HeaderMap) -> bool {
        matches_secret(header_value(headers, ADMIN_KEY_HEADER), self.admin_key.as_deref())
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn matches_secret(provided: Option<&str>, expected: Option<&str>) -> bool {
    match (provided, expected) {
        (Some(provided), Some(expected)) => constant_time_compare(provided, expected),
        _ => false,
    }
}

/// Constant-time string comparison
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
