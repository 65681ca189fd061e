//! Runtime configuration.

use std::env;
use std::str::FromStr;

use serde::Deserialize;

use crate::bounds::Viewport;
use crate::error::ConfigError;
use crate::types::{Category, Theme};

pub const API_KEY_ENV: &str = "PLACES_API_KEY";
pub const API_HOST_ENV: &str = "PLACES_API_HOST";
pub const ENDPOINT_ENV: &str = "PLACES_API_ENDPOINT";
pub const MAP_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";
pub const CATEGORY_ENV: &str = "PLACES_CATEGORY";
pub const THEME_ENV: &str = "PLACES_THEME";

/// Settings of the explorer.
///
/// ## Example
///
/// ```rust
/// use places_explorer::types::Category;
/// use places_explorer::Config;
///
/// let config = r#"{"api_key": "secret", "category": "hotels"}"#;
/// let config: Config = serde_json::from_str(config).unwrap();
///
/// assert_eq!(config.category, Category::Hotels);
/// assert_eq!(config.api_host, "travel-advisor.p.rapidapi.com");
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key of the places search API.
    pub api_key: String,
    /// Value of the `x-rapidapi-host` header.
    pub api_host: String,
    /// Base URI of the places search API.
    pub endpoint: String,
    /// Access token of the map tile service, handed to the map renderer as is.
    pub map_token: Option<String>,
    /// Category selected at startup.
    pub category: Category,
    pub theme: Theme,
    /// Where the map starts.
    pub viewport: Viewport,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            api_host: "travel-advisor.p.rapidapi.com".to_owned(),
            endpoint: "https://travel-advisor.p.rapidapi.com".to_owned(),
            map_token: None,
            category: Category::default(),
            theme: Theme::default(),
            viewport: Viewport::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from the environment variables of the process.
    ///
    /// `PLACES_API_KEY` is required. The other variables override the defaults when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as `from_env` except that variables are looked up with `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Config::default();

        config.api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing(API_KEY_ENV))?;
        if let Some(host) = lookup(API_HOST_ENV) {
            config.api_host = host;
        }
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        config.map_token = lookup(MAP_TOKEN_ENV);
        if let Some(category) = lookup(CATEGORY_ENV) {
            config.category = parse(CATEGORY_ENV, category)?;
        }
        if let Some(theme) = lookup(THEME_ENV) {
            config.theme = parse(THEME_ENV, theme)?;
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn lookup<'a>(
        vars: &'a [(&'static str, &'static str)],
    ) -> impl Fn(&'static str) -> Option<String> + 'a {
        let vars = vars.iter().cloned().collect::<HashMap<_, _>>();
        move |var| vars.get(var).map(|v| v.to_string())
    }

    #[test]
    fn requires_api_key() {
        match Config::from_lookup(lookup(&[])) {
            Err(ConfigError::Missing(API_KEY_ENV)) => {}
            r => panic!("unexpected result: {:?}", r),
        }
        assert!(Config::from_lookup(lookup(&[(API_KEY_ENV, "")])).is_err());
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            (API_KEY_ENV, "secret"),
            (CATEGORY_ENV, "attractions"),
            (THEME_ENV, "dark"),
            (MAP_TOKEN_ENV, "pk.test"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.category, Category::Attractions);
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.map_token.as_deref(), Some("pk.test"));
        assert_eq!(config.endpoint, Config::default().endpoint);
    }

    #[test]
    fn invalid_value() {
        let r = Config::from_lookup(lookup(&[(API_KEY_ENV, "secret"), (CATEGORY_ENV, "bars")]));
        match r {
            Err(ConfigError::Invalid { var, value }) => {
                assert_eq!(var, CATEGORY_ENV);
                assert_eq!(value, "bars");
            }
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn deserialize_viewport() {
        let config: Config = serde_json::from_str(
            r#"{"viewport": {"latitude": 13.75, "longitude": 100.5, "zoom": 11}}"#,
        )
        .unwrap();
        assert_eq!(config.viewport, Viewport::new(13.75, 100.5, 11.));
        assert_eq!(config.category, Category::Restaurants);
    }
}
