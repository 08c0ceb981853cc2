//! Fetching external vector icons referenced by `<img src="*.svg">`.

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::error::{CaptureError, Result};

/// Source of external icon markup. A `None` result means "draw no image".
pub trait IconFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Option<String>>;
}

/// Resolves an icon `src` against the document URL the snapshot was taken from.
pub fn resolve_icon_url(src: &str, base: Option<&str>) -> Result<String> {
    match Url::parse(src) {
        Ok(url) => Ok(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| {
                CaptureError::icon_fetch(None, format!("relative icon url {src} has no base"))
            })?;
            Ok(Url::parse(base)?.join(src)?.to_string())
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Clone)]
pub struct HttpIconFetcher {
    http: Client,
}

impl HttpIconFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CaptureError::Network)?;
        Ok(Self { http })
    }

    pub async fn fetch_markup(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await.map_err(CaptureError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CaptureError::icon_fetch(
                Some(status),
                format!("failed to fetch icon {url} (status {})", status.as_u16()),
            ));
        }
        let body = response.text().await.map_err(CaptureError::Network)?;
        if roxmltree::Document::parse(&body)
            .map(|doc| doc.root_element().tag_name().name() != "svg")
            .unwrap_or(true)
        {
            return Err(CaptureError::icon_fetch(
                Some(status),
                format!("icon {url} is not svg markup"),
            ));
        }
        Ok(body)
    }
}

impl IconFetcher for HttpIconFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Option<String>> {
        async move {
            match self.fetch_markup(url).await {
                Ok(markup) => Some(markup),
                Err(err) => {
                    log::warn!("{err}");
                    None
                }
            }
        }
        .boxed()
    }
}

/// Fetcher used when the network is off-limits: every external icon is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIconFetcher;

impl IconFetcher for NoopIconFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Option<String>> {
        log::debug!("skipping external icon {url}");
        futures::future::ready(None).boxed()
    }
}

/// Serves icons from a fixed url → markup table.
#[derive(Debug, Clone, Default)]
pub struct StaticIconFetcher {
    icons: HashMap<String, String>,
}

impl StaticIconFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_icon(mut self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.icons.insert(url.into(), markup.into());
        self
    }
}

impl IconFetcher for StaticIconFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Option<String>> {
        futures::future::ready(self.icons.get(url).cloned()).boxed()
    }
}
