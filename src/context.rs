//! Per-invocation state: configuration, stored session and API access.

use std::time::Duration;

use andiamo_api::ApiClient;
use andiamo_core::config::AndiamoConfig;
use andiamo_core::event::parse_event_date;
use andiamo_core::session::{Access, AccessGate, CredentialStore, TOKEN_KEY};
use andiamo_core::Role;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use owo_colors::OwoColorize;

pub struct AppContext {
    pub config: AndiamoConfig,
    pub store: CredentialStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let config = AndiamoConfig::load().context("Failed to load configuration")?;
        let store = CredentialStore::open(config.store_path())
            .context("Failed to open session store")?;

        tracing::debug!("Using backend {}", config.api_url);
        Ok(AppContext { config, store })
    }

    /// Client without credentials.
    pub fn client(&self) -> Result<ApiClient> {
        let client = ApiClient::new(
            self.config.api_url()?,
            Duration::from_secs(self.config.timeout_secs),
        )?;
        Ok(client)
    }

    /// Client carrying the stored token when there is one.
    pub fn client_with_stored_token(&self) -> Result<ApiClient> {
        let client = self.client()?;
        Ok(match self.store.get(TOKEN_KEY).filter(|t| !t.is_empty()) {
            Some(token) => client.with_token(token),
            None => client,
        })
    }

    /// Client for a view reserved to `role`.
    ///
    /// Prints where the user should go instead and returns `None` when the
    /// session is missing or holds another role.
    pub fn gated_client(&self, role: Role) -> Result<Option<ApiClient>> {
        match AccessGate::new(role).check(&self.store) {
            Access::Granted { token } => Ok(Some(self.client()?.with_token(token))),
            Access::Unauthenticated => {
                println!("{}", "Not logged in.".yellow());
                println!("Run `andiamo login` first.");
                Ok(None)
            }
            Access::Forbidden => {
                println!("{}", "Access forbidden.".red());
                println!("This view is reserved to {} accounts.", role);
                Ok(None)
            }
        }
    }

    /// Parse a user-supplied date-time, reading naive values in the configured zone.
    pub fn parse_datetime(&self, value: &str) -> Result<DateTime<Utc>> {
        let parsed = match self.config.zone()? {
            Some(tz) => parse_event_date(value, &tz),
            None => parse_event_date(value, &Local),
        };

        parsed.with_context(|| {
            format!("Invalid date '{}'. Expected e.g. 2025-03-20T15:00 or 2025-03-20", value)
        })
    }
}

/// Parse a calendar day: YYYY-MM-DD, "today" or "tomorrow".
pub fn parse_day(value: &str, today: NaiveDate) -> Result<NaiveDate> {
    match value.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => Ok(today + chrono::Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}'. Expected YYYY-MM-DD", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(parse_day("today", today).unwrap(), today);
        assert_eq!(
            parse_day("Tomorrow", today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
        );
        assert_eq!(
            parse_day("2024-12-24", today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 24).unwrap()
        );
        assert!(parse_day("24/12/2024", today).is_err());
    }
}
