//! Transport for the zone API
//!
//! [`ZoneGateway`] is the seam between zone logic and the network. The save
//! protocol only talks to the trait, so tests drive it with scripted
//! gateways while [`HttpZoneGateway`] speaks HTTP to the real API.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde_derive::Deserialize;

use crate::config::ClientConfig;
use crate::dns::errors::{ZoneError, ZoneResult};
use crate::dns::zone::Zone;

/// Path of the legacy zone endpoint, relative to the API host
pub const ZONE_PATH: &str = "/config-dns/v1/zones";

pub trait ZoneGateway {
    /// Retrieve the current state of a zone
    fn fetch_zone(&self, name: &str) -> ZoneResult<Zone>;

    /// Submit a full zone for asynchronous application
    fn submit_zone(&self, zone: &Zone) -> ZoneResult<()>;
}

impl<G: ZoneGateway + ?Sized> ZoneGateway for &G {
    fn fetch_zone(&self, name: &str) -> ZoneResult<Zone> {
        (**self).fetch_zone(name)
    }

    fn submit_zone(&self, zone: &Zone) -> ZoneResult<()> {
        (**self).submit_zone(zone)
    }
}

/// Body of an `application/problem+json` answer
#[derive(Debug, Default, Deserialize)]
struct Problem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

/// Gateway over blocking HTTP
pub struct HttpZoneGateway {
    base_url: String,
    client: Client,
}

impl HttpZoneGateway {
    pub fn new(config: &ClientConfig) -> ZoneResult<HttpZoneGateway> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(auth) = &config.auth_header {
            match HeaderValue::from_str(auth) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => log::warn!("Ignoring Authorization value with invalid characters"),
            }
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(HttpZoneGateway {
            base_url: config.base_url(),
            client,
        })
    }

    pub fn zone_url(&self, name: &str) -> String {
        format!("{}{}/{}", self.base_url.trim_end_matches('/'), ZONE_PATH, name)
    }
}

/// Read the whole body, so the connection can be reused, and pair it with
/// the status
fn drain(response: Response) -> ZoneResult<(StatusCode, String)> {
    let status = response.status();
    let body = response.text()?;
    Ok((status, body))
}

fn problem_detail(body: &str) -> Problem {
    serde_json::from_str::<Problem>(body).unwrap_or_else(|_| Problem {
        title: String::new(),
        detail: body.trim().to_string(),
    })
}

impl ZoneGateway for HttpZoneGateway {
    fn fetch_zone(&self, name: &str) -> ZoneResult<Zone> {
        let url = self.zone_url(name);
        log::debug!("GET {}", url);

        let (status, body) = drain(self.client.get(&url).send()?)?;

        if status == StatusCode::NOT_FOUND {
            return Err(ZoneError::ZoneNotFound {
                zone_name: name.to_string(),
            });
        }
        if !status.is_success() {
            let problem = problem_detail(&body);
            return Err(ZoneError::Api {
                status: status.as_u16(),
                title: problem.title,
                detail: problem.detail,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn submit_zone(&self, zone: &Zone) -> ZoneResult<()> {
        let url = self.zone_url(zone.name());
        let payload = serde_json::to_string(zone)?;
        log::debug!("POST {} ({} bytes)", url, payload.len());

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()?;
        let (status, body) = drain(response)?;

        if !status.is_success() {
            let problem = problem_detail(&body);
            let detail = if problem.detail.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                format!("HTTP {}: {}", status.as_u16(), problem.detail)
            };
            return Err(ZoneError::FailedToSave {
                zone_name: zone.name().to_string(),
                detail,
            });
        }

        Ok(())
    }
}
