use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use spendcast_core::calendar::Calendar;
use spendcast_core::error::CoreError;

pub const CONFIG_FILE: &str = "spendcast.toml";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database file
    pub database_path: String,
    /// IANA timezone for calendar arithmetic; the system zone when unset
    pub timezone: Option<String>,
    /// Length of `project` when no end date is given
    pub default_horizon_months: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "spendcast.db".to_string(),
            timezone: None,
            default_horizon_months: 12,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("SPENDCAST_").ignore(&["log"]))
    }

    /// The configured calendar, or the system one when no zone is set.
    pub fn calendar(&self) -> Result<Calendar, CoreError> {
        match self.timezone.as_deref().filter(|tz| !tz.trim().is_empty()) {
            Some(name) => Calendar::from_name(name),
            None => Ok(Calendar::local()),
        }
    }
}

/// Gets a list of common/popular timezones for user selection
pub fn get_common_timezones() -> Vec<&'static str> {
    vec![
        "UTC",
        "America/New_York",
        "America/Chicago",
        "America/Denver",
        "America/Los_Angeles",
        "America/Sao_Paulo",
        "Europe/London",
        "Europe/Paris",
        "Europe/Berlin",
        "Europe/Madrid",
        "Asia/Tokyo",
        "Asia/Kolkata",
        "Asia/Dubai",
        "Australia/Sydney",
        "Pacific/Auckland",
    ]
}

/// Suggests similar timezone names when validation fails
pub fn suggest_timezone(invalid_tz: &str) -> Vec<String> {
    let common = get_common_timezones();
    let lower_invalid = invalid_tz.trim().to_lowercase();

    let mut suggestions: Vec<String> = common
        .iter()
        .filter(|tz| {
            let lower_tz = tz.to_lowercase();
            !lower_invalid.is_empty()
                && (lower_tz.contains(&lower_invalid)
                    || lower_tz
                        .rsplit('/')
                        .next()
                        .is_some_and(|city| lower_invalid.contains(city)))
        })
        .map(|tz| tz.to_string())
        .collect();

    if suggestions.is_empty() {
        suggestions.extend(common.iter().take(5).map(|s| s.to_string()));
    }

    suggestions
}
