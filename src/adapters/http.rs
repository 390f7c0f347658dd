use crate::domain::model::HttpSample;
use crate::domain::ports::HttpProbe;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("siteops/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<HttpSample> {
        tracing::debug!("Requesting {}", url);
        let started = Instant::now();
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        let elapsed = started.elapsed();

        tracing::debug!(
            "Response status {} ({} bytes in {:?})",
            status,
            body.len(),
            elapsed
        );
        Ok(HttpSample { status, elapsed })
    }
}
