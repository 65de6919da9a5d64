//! Hosted feature service queries.
//!
//! Pages through `<layer>/query` with `f=geojson` until the service stops
//! reporting `exceededTransferLimit`.

use serde::Deserialize;
use tracing::debug;
use vc_common::{Error, Result};

use super::feature::Feature;
use crate::selection::CountyFilter;

#[derive(Debug, Deserialize)]
struct ServicePage {
    #[serde(default)]
    features: Vec<Feature>,
    #[serde(default)]
    properties: Option<PageProperties>,
    #[serde(rename = "exceededTransferLimit", default)]
    exceeded_transfer_limit: bool,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Default, Deserialize)]
struct PageProperties {
    #[serde(rename = "exceededTransferLimit", default)]
    exceeded_transfer_limit: bool,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

impl ServicePage {
    fn has_more(&self) -> bool {
        self.exceeded_transfer_limit
            || self
                .properties
                .as_ref()
                .is_some_and(|p| p.exceeded_transfer_limit)
    }
}

/// Fetch every feature of `layer_url` that passes `filter`.
pub fn query(layer_url: &str, filter: &CountyFilter, page_size: u32) -> Result<Vec<Feature>> {
    let endpoint = format!("{}/query", layer_url.trim_end_matches('/'));
    let predicate = filter.to_sql();
    let agent = ureq::AgentBuilder::new().build();

    let mut features = Vec::new();
    let mut offset: u64 = 0;
    loop {
        debug!(%endpoint, offset, "querying feature service page");
        let response = agent
            .get(&endpoint)
            .query("where", &predicate)
            .query("outFields", "*")
            .query("returnGeometry", "true")
            .query("outSR", "4326")
            .query("f", "geojson")
            .query("resultOffset", &offset.to_string())
            .query("resultRecordCount", &page_size.to_string())
            .call()
            .map_err(|e| Error::SourceUnavailable(format!("{endpoint}: {e}")))?;
        let page: ServicePage = response
            .into_json()
            .map_err(|e| Error::SourceUnavailable(format!("{endpoint}: {e}")))?;
        let more = check_page(&endpoint, &page)?;

        let received = page.features.len();
        features.extend(page.features);
        if received == 0 || !more {
            break;
        }
        offset += received as u64;
    }
    debug!(%endpoint, total = features.len(), "feature service query complete");
    Ok(features)
}

fn check_page(endpoint: &str, page: &ServicePage) -> Result<bool> {
    if let Some(err) = &page.error {
        return Err(Error::SourceUnavailable(match err.code {
            Some(code) => format!("{endpoint}: service error {code}: {}", err.message),
            None => format!("{endpoint}: {}", err.message),
        }));
    }
    Ok(page.has_more())
}
