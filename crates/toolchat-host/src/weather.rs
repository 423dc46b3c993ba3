//! Current weather from OpenWeatherMap
//!
//! `forecast` never fails: every problem is turned into a sentence the
//! model can relay to the user.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use toolchat_core::logging::Logger;

pub const DEFAULT_WEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_WEATHER_LANG: &str = "en";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoint, key and language for weather lookups
#[derive(Clone, PartialEq)]
pub struct WeatherSettings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub lang: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_WEATHER_API_BASE.to_string(),
            lang: DEFAULT_WEATHER_LANG.to_string(),
        }
    }
}

impl std::fmt::Debug for WeatherSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("lang", &self.lang)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    main: Readings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Readings {
    temp: f64,
}

pub struct WeatherClient {
    http: reqwest::Client,
    settings: WeatherSettings,
    logger: Arc<dyn Logger>,
}

impl WeatherClient {
    pub fn new(settings: WeatherSettings, logger: Arc<dyn Logger>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            settings,
            logger,
        })
    }

    pub fn settings(&self) -> &WeatherSettings {
        &self.settings
    }

    /// One-sentence description of the current weather in `city`
    pub async fn forecast(&self, city: &str) -> String {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            self.logger.warn("[weather] OPENWEATHERMAP_API_KEY is not set");
            return "Error: the OPENWEATHERMAP_API_KEY environment variable is not set.".to_string();
        };

        self.logger.info(&format!("[weather] Requesting weather for city: {}", city));

        let response = self
            .http
            .get(&self.settings.api_base)
            .query(&[
                ("q", city),
                ("units", "metric"),
                ("lang", self.settings.lang.as_str()),
                ("appid", api_key),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return self.transport_failure(&e),
        };

        let status = response.status();
        self.logger.debug(&format!("[weather] API response status: {}", status.as_u16()));

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.transport_failure(&e),
        };

        if !status.is_success() {
            return format!("API error: {} - {}", status.as_u16(), body);
        }

        match serde_json::from_str::<CurrentWeather>(&body) {
            Ok(data) => {
                let description = data
                    .weather
                    .first()
                    .map(|c| c.description.as_str())
                    .unwrap_or("unknown");
                format!(
                    "The weather in {} is {} with {}°C.",
                    city, description, data.main.temp
                )
            }
            Err(e) => {
                self.logger.error(&format!("[weather] Unexpected response body: {}", e));
                format!("API error: unexpected response format ({})", e)
            }
        }
    }

    fn transport_failure(&self, error: &reqwest::Error) -> String {
        self.logger.error(&format!("[weather] Request failed: {}", error));
        if is_certificate_error(error) {
            "SSL error: certificate problem. Check your network configuration.".to_string()
        } else {
            format!("Connection error: {}", error_chain(error))
        }
    }
}

fn error_chain(error: &dyn StdError) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}

fn is_certificate_error(error: &reqwest::Error) -> bool {
    let chain = error_chain(error).to_lowercase();
    chain.contains("certificate") || chain.contains("tls") || chain.contains("ssl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use toolchat_core::logging::NoOpLogger;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base: String, key: Option<&str>) -> WeatherClient {
        let settings = WeatherSettings {
            api_key: key.map(str::to_string),
            api_base: base,
            lang: "en".to_string(),
        };
        WeatherClient::new(settings, Arc::new(NoOpLogger)).unwrap()
    }

    #[tokio::test]
    async fn test_forecast_sentence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Paris"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [{ "description": "clear sky" }],
                "main": { "temp": 21.5 }
            })))
            .mount(&server)
            .await;

        let text = client(server.uri(), Some("k")).forecast("Paris").await;
        assert_eq!(text, "The weather in Paris is clear sky with 21.5°C.");
    }

    #[tokio::test]
    async fn test_unknown_city_reports_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string(r#"{"cod":"404","message":"city not found"}"#),
            )
            .mount(&server)
            .await;

        let text = client(server.uri(), Some("k")).forecast("Unknownville").await;
        assert!(text.starts_with("API error: 404 - "));
        assert!(text.contains("city not found"));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let text = client("http://127.0.0.1:9".to_string(), None).forecast("Oslo").await;
        assert!(text.contains("OPENWEATHERMAP_API_KEY"));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // port 9 (discard) is closed on test machines
        let text = client("http://127.0.0.1:9/weather".to_string(), Some("k"))
            .forecast("Oslo")
            .await;
        assert!(text.starts_with("Connection error: "), "{}", text);
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = WeatherSettings {
            api_key: Some("secret".into()),
            ..Default::default()
        };
        assert!(!format!("{:?}", settings).contains("secret"));
    }
}
