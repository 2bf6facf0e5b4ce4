//! CRM API client implementing the `CrmGateway` port.

use async_trait::async_trait;
use dealboard_core::ports::CrmGateway;
use dealboard_core::RawDeal;
use dealboard_domain::constants::{COUNTRY_FIELD_KEY, CRM_PAGE_SIZE, ORIGIN_FIELD_KEY};
use dealboard_domain::{CrmUser, DealboardError, FieldOption, Result};
use reqwest::Method;
use tracing::{debug, info, warn};

use super::types::{DealsResponse, ListResponse, RawDealField, RawUser};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Connection settings for the upstream CRM API.
#[derive(Debug, Clone)]
pub struct CrmClientConfig {
    /// Base URL without a trailing slash, e.g. `https://api.example.com/v1`
    pub base_url: String,
    /// API token appended to every request
    pub api_token: String,
}

/// HTTP adapter for the upstream CRM. Pagination, auth and retry live here;
/// callers see complete result sets or a domain error.
pub struct CrmClient {
    http: HttpClient,
    base_url: String,
    api_token: String,
}

impl CrmClient {
    pub fn new(http: HttpClient, config: CrmClientConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token,
        }
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}{}?api_token={}",
            self.base_url,
            path,
            urlencoding::encode(&self.api_token)
        );
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.http.send(self.http.request(Method::GET, url)).await?;
        let response = response.error_for_status().map_err(|err| {
            let infra: InfraError = err.into();
            DealboardError::from(infra)
        })?;
        response.json::<T>().await.map_err(|err| {
            let infra: InfraError = err.into();
            DealboardError::from(infra)
        })
    }
}

#[async_trait]
impl CrmGateway for CrmClient {
    async fn fetch_pipeline_deals(&self, pipeline_id: i64) -> Result<Vec<RawDeal>> {
        let mut deals = Vec::new();
        let mut start = 0usize;

        loop {
            let url = self.url(
                "/deals",
                &[
                    ("pipeline_id", pipeline_id.to_string()),
                    ("start", start.to_string()),
                    ("limit", CRM_PAGE_SIZE.to_string()),
                ],
            );
            debug!(pipeline_id, start, "fetching deals page");

            let page: DealsResponse = self.get_json(&url).await?;
            if !page.success {
                return Err(DealboardError::Network(format!(
                    "upstream reported failure listing deals for pipeline {pipeline_id}"
                )));
            }
            deals.extend(page.data);

            let pagination = page.additional_data.and_then(|extra| extra.pagination);
            match pagination {
                Some(p) if p.more_items_in_collection => {
                    let next = p.next_start.unwrap_or(start + CRM_PAGE_SIZE);
                    if next <= start {
                        // Upstream pagination did not advance; bail rather
                        // than loop forever.
                        warn!(pipeline_id, start, next, "pagination stalled, stopping early");
                        break;
                    }
                    start = next;
                }
                _ => break,
            }
        }

        info!(pipeline_id, total = deals.len(), "fetched pipeline deals");
        Ok(deals)
    }

    async fn fetch_users(&self) -> Result<Vec<CrmUser>> {
        let url = self.url("/users", &[]);
        let response: ListResponse<RawUser> = self.get_json(&url).await?;
        if !response.success {
            return Err(DealboardError::Network("upstream reported failure listing users".into()));
        }
        Ok(response.data.into_iter().map(CrmUser::from).collect())
    }

    async fn fetch_field_options(&self) -> Result<(Vec<FieldOption>, Vec<FieldOption>)> {
        let url = self.url("/dealFields", &[]);
        let response: ListResponse<RawDealField> = self.get_json(&url).await?;
        if !response.success {
            return Err(DealboardError::Network(
                "upstream reported failure listing deal fields".into(),
            ));
        }

        let mut countries = Vec::new();
        let mut origins = Vec::new();
        for field in &response.data {
            match field.key.as_str() {
                k if k == COUNTRY_FIELD_KEY => countries = field.field_options(),
                k if k == ORIGIN_FIELD_KEY => origins = field.field_options(),
                _ => {}
            }
        }

        if countries.is_empty() {
            warn!("country field definition missing or empty upstream");
        }
        if origins.is_empty() {
            warn!("origin field definition missing or empty upstream");
        }
        Ok((countries, origins))
    }
}
