use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use kiosk_core::config::BackendConfig;
use kiosk_core::ephemeris::{AstroRecord, EphemerisResponse};
use kiosk_core::UnitSystem;
use tracing::{debug, warn};

use crate::backend::{Backend, MoonImageRecord, MoonImageRequest, Regeneration};
use crate::error::{BackendError, Result};

/// Provider scripts served over HTTP (the local CGI server).
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, script: &str) -> String {
        format!("{}/{}", self.base_url, script)
    }

    async fn get(&self, script: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = self.url(script);
        debug!(%url, ?query, "backend request");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(BackendError::from_send)?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, %url, body = %text, "backend error");
            return Err(BackendError::Api {
                status,
                message: text,
            });
        }
        Ok(resp)
    }
}

/// Date format the ephemeris proxy expects: `m/d/yyyy`.
pub fn ephemeris_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn ephemeris(&self, date: NaiveDate) -> Result<AstroRecord> {
        let resp = self
            .get("usNavObsData.py", &[("date", ephemeris_date(date))])
            .await?;
        let body: EphemerisResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(body.properties.data)
    }

    async fn moon_image(&self, req: &MoonImageRequest) -> Result<MoonImageRecord> {
        let resp = self
            .get(
                "moonPhase.py",
                &[
                    ("fracillum", req.fracillum.to_string()),
                    ("stage", req.stage.clone()),
                    ("filename", req.filename.clone()),
                ],
            )
            .await?;
        resp.json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn regenerate(&self, target: Regeneration, units: Option<UnitSystem>) -> Result<String> {
        let query: Vec<(&str, String)> = match units {
            Some(u) if target.takes_units() => vec![("units", u.to_string())],
            _ => Vec::new(),
        };
        let resp = self.get(target.script(), &query).await?;
        Ok(resp.text().await?)
    }

    async fn network_status(&self) -> Result<String> {
        let resp = self.get("networkStatus.py", &[]).await?;
        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeris_date_is_unpadded_us_style() {
        let d = NaiveDate::from_ymd_opt(2022, 2, 4).unwrap();
        assert_eq!(ephemeris_date(d), "2/4/2022");
        let d = NaiveDate::from_ymd_opt(2023, 11, 30).unwrap();
        assert_eq!(ephemeris_date(d), "11/30/2023");
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let backend = HttpBackend::new(&BackendConfig {
            base_url: "http://localhost:8000/cgi-bin/".to_string(),
            ..BackendConfig::default()
        })
        .unwrap();
        assert_eq!(
            backend.url("forecast.py"),
            "http://localhost:8000/cgi-bin/forecast.py"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_reports_unavailable() {
        let backend = HttpBackend::new(&BackendConfig {
            base_url: "http://127.0.0.1:9/cgi-bin".to_string(),
            timeout_secs: 2,
            ..BackendConfig::default()
        })
        .unwrap();
        let err = backend.network_status().await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)), "got {err:?}");
    }
}
