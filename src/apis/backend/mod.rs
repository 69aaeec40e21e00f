/// Monitoring backend API client
///
/// Endpoints implemented (all relative to `api.base_url`):
/// 1. GET /subnet, POST /subnet - tracked subnet
/// 2. GET /settings - registration settings
/// 3. GET /coldkeys, POST /coldkeys, DELETE /coldkeys/{key} - watchlist
/// 4. GET /miners - miner snapshot
/// 5. GET /price, GET /taoPrice - subnet token and base asset prices
/// 6. GET /notifications - deregistration alert feed
pub mod types;

use self::types::{
    AddColdkeyRequest, NotificationsResponse, PriceResponse, RawMiner, SetSubnetRequest,
    SettingsResponse, SubnetResponse,
};
use crate::apis::client::HttpClient;
use crate::config::ApiConfig;
use crate::errors::{MonitorError, MonitorResult};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;
use url::Url;

/// Operations the poller and the operator actions need from the backend
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn fetch_subnet(&self) -> MonitorResult<Option<String>>;
    async fn fetch_settings(&self) -> MonitorResult<SettingsResponse>;
    async fn fetch_coldkeys(&self) -> MonitorResult<Vec<String>>;
    async fn fetch_miners(&self) -> MonitorResult<Vec<RawMiner>>;
    async fn fetch_subnet_price(&self) -> MonitorResult<f64>;
    async fn fetch_base_price(&self) -> MonitorResult<f64>;
    async fn fetch_notifications(&self) -> MonitorResult<Vec<String>>;
    async fn add_coldkey(&self, coldkey: &str) -> MonitorResult<()>;
    async fn remove_coldkey(&self, coldkey: &str) -> MonitorResult<()>;
    async fn set_subnet(&self, subnet: &str) -> MonitorResult<()>;
}

pub struct BackendClient {
    http_client: HttpClient,
    base_url: Url,
}

impl BackendClient {
    pub fn new(config: &ApiConfig) -> MonitorResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            MonitorError::Config(format!("Invalid api.base_url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(MonitorError::Config(format!(
                "api.base_url '{}' cannot be used as a base URL",
                config.base_url
            )));
        }

        let http_client = HttpClient::new(config.timeout_secs).map_err(MonitorError::Config)?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> MonitorResult<reqwest::Response> {
        let url = self.endpoint(segments);
        let label = format!("{} /{}", method, segments.join("/"));
        let start = Instant::now();

        let mut builder = self
            .http_client
            .client()
            .request(method, url)
            .header("Accept", "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| MonitorError::network(label.clone(), e))?;

        let status = response.status();
        logger::debug(
            LogTag::Api,
            &format!("{} -> {} in {}ms", label, status.as_u16(), start.elapsed().as_millis()),
        );

        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            return Err(MonitorError::HttpStatus {
                endpoint: label,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> MonitorResult<T> {
        let response = self.request::<()>(Method::GET, segments, None).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| MonitorError::decode(format!("GET /{}", segments.join("/")), e))
    }
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn fetch_subnet(&self) -> MonitorResult<Option<String>> {
        let res: SubnetResponse = self.get_json(&["subnet"]).await?;
        Ok(res.subnet)
    }

    async fn fetch_settings(&self) -> MonitorResult<SettingsResponse> {
        self.get_json(&["settings"]).await
    }

    async fn fetch_coldkeys(&self) -> MonitorResult<Vec<String>> {
        self.get_json(&["coldkeys"]).await
    }

    async fn fetch_miners(&self) -> MonitorResult<Vec<RawMiner>> {
        self.get_json(&["miners"]).await
    }

    async fn fetch_subnet_price(&self) -> MonitorResult<f64> {
        let res: PriceResponse = self.get_json(&["price"]).await?;
        Ok(res.price)
    }

    async fn fetch_base_price(&self) -> MonitorResult<f64> {
        let res: PriceResponse = self.get_json(&["taoPrice"]).await?;
        Ok(res.price)
    }

    async fn fetch_notifications(&self) -> MonitorResult<Vec<String>> {
        let res: NotificationsResponse = self.get_json(&["notifications"]).await?;
        Ok(res.messages)
    }

    async fn add_coldkey(&self, coldkey: &str) -> MonitorResult<()> {
        self.request(Method::POST, &["coldkeys"], Some(&AddColdkeyRequest { coldkey }))
            .await
            .map(|_| ())
    }

    async fn remove_coldkey(&self, coldkey: &str) -> MonitorResult<()> {
        self.request::<()>(Method::DELETE, &["coldkeys", coldkey], None)
            .await
            .map(|_| ())
    }

    async fn set_subnet(&self, subnet: &str) -> MonitorResult<()> {
        self.request(Method::POST, &["subnet"], Some(&SetSubnetRequest { subnet }))
            .await
            .map(|_| ())
    }
}
