//! Splunk management-port implementation of [`AlertBackend`].
//!
//! Saved searches are created with a form-encoded POST; an HTTP 409 means
//! the title already exists and is followed by an update POST against the
//! named entry, which is what makes registration idempotent by title.
//! Fired alerts come from the `fired_alerts` collection with
//! `output_mode=json`.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use detci_core::AlertProfile;

use crate::backend::{AlertBackend, BackendError};

/// Connection parameters for the management port. Supplied by CLI flags and
/// environment, never derived from document content.
#[derive(Debug, Clone)]
pub struct SplunkConfig {
    /// Management base URL, e.g. `https://localhost:8089`.
    pub base_url: String,
    /// Bearer token for the REST API.
    pub token: String,
    /// App namespace saved searches are created in.
    pub app: String,
    /// Owner namespace saved searches are created under.
    pub owner: String,
    pub timeout: Duration,
    /// Accept the self-signed certificate a local management port ships with.
    pub accept_invalid_certs: bool,
}

#[derive(Debug)]
pub struct SplunkBackend {
    client: Client,
    base: Url,
    token: String,
    app: String,
    owner: String,
}

impl SplunkBackend {
    pub fn new(config: &SplunkConfig) -> Result<Self, BackendError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| BackendError::Url(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::Url(format!(
                "{} cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(SplunkBackend {
            client,
            base,
            token: config.token.clone(),
            app: config.app.clone(),
            owner: config.owner.clone(),
        })
    }

    /// `{base}/servicesNS/{owner}/{app}/saved/searches[/{title}]`
    fn saved_searches_url(&self, title: Option<&str>) -> Url {
        let mut url = self.base.clone();
        {
            // Guarded by the cannot_be_a_base check in new().
            let mut segments = url.path_segments_mut().expect("base URL validated");
            segments.pop_if_empty().extend([
                "servicesNS",
                self.owner.as_str(),
                self.app.as_str(),
                "saved",
                "searches",
            ]);
            if let Some(title) = title {
                segments.push(title); // percent-encoded by the Url builder
            }
        }
        url
    }

    fn fired_alerts_url(&self) -> Url {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().expect("base URL validated");
            segments
                .pop_if_empty()
                .extend(["services", "alerts", "fired_alerts"]);
        }
        url
    }

    fn post_saved_search(
        &self,
        url: Url,
        context: &'static str,
        params: &[(&str, String)],
    ) -> Result<StatusCode, BackendError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .query(&[("output_mode", "json")])
            .form(params)
            .send()?;

        let status = response.status();
        if status.is_success() || status == StatusCode::CONFLICT {
            return Ok(status);
        }

        Err(BackendError::Rejected {
            context,
            status: status.as_u16(),
            detail: truncate(&response.text().unwrap_or_default(), 300),
        })
    }
}

impl AlertBackend for SplunkBackend {
    fn register_alert(
        &self,
        title: &str,
        query: &str,
        profile: &AlertProfile,
    ) -> Result<(), BackendError> {
        let mut params = vec![
            ("name", title.to_string()),
            ("search", query.to_string()),
        ];
        params.extend(profile.form_params());

        let status =
            self.post_saved_search(self.saved_searches_url(None), "saved-search create", &params)?;
        if status != StatusCode::CONFLICT {
            tracing::info!(title, "registered scheduled alert");
            return Ok(());
        }

        // Title exists: update the named entry in place. The update endpoint
        // rejects a `name` attribute.
        let update: Vec<(&str, String)> = params
            .into_iter()
            .filter(|(key, _)| *key != "name")
            .collect();
        let status = self.post_saved_search(
            self.saved_searches_url(Some(title)),
            "saved-search update",
            &update,
        )?;
        if status == StatusCode::CONFLICT {
            return Err(BackendError::Rejected {
                context: "saved-search update",
                status: status.as_u16(),
                detail: "unexpected conflict on named entry".to_string(),
            });
        }
        tracing::info!(title, "updated existing scheduled alert");
        Ok(())
    }

    fn fired_alert_names(&self) -> Result<Vec<String>, BackendError> {
        let response = self
            .client
            .get(self.fired_alerts_url())
            .bearer_auth(&self.token)
            .query(&[("output_mode", "json"), ("count", "0")])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Rejected {
                context: "fired-alerts listing",
                status: status.as_u16(),
                detail: truncate(&response.text().unwrap_or_default(), 300),
            });
        }

        let listing: FiredAlertsResponse = response.json()?;
        Ok(listing
            .entry
            .into_iter()
            .map(|entry| entry.name)
            // The collection contains a synthetic "-" aggregate entry.
            .filter(|name| name != "-")
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct FiredAlertsResponse {
    #[serde(default)]
    entry: Vec<FiredAlertEntry>,
}

#[derive(Debug, Deserialize)]
struct FiredAlertEntry {
    name: String,
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &text[..cut])
}
