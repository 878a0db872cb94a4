// src/core/net.rs
// HTTP GET returning decoded text. One request per call, no retries.

use reqwest::blocking;

use crate::config::options::NetOptions;
use crate::error::{Error, Result};

/// The network seam. Page parsers never see transport details.
pub trait HttpGet {
    fn get_text(&self, url: &str) -> Result<String>;
}

pub struct Client {
    http: blocking::Client,
    charset: String,
}

impl Client {
    pub fn new(opts: &NetOptions) -> Result<Self> {
        let http = blocking::Client::builder()
            .user_agent(opts.user_agent.as_str())
            .timeout(opts.timeout())
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;
        Ok(Self { http, charset: opts.charset.clone() })
    }
}

impl HttpGet for Client {
    fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "GET");
        let resp = self.http.get(url).send().map_err(|e| Error::fetch(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::fetch(url, format!("HTTP {status}")));
        }
        // A charset in Content-Type wins; the site's pages are EUC-JP otherwise.
        resp.text_with_charset(&self.charset).map_err(|e| Error::fetch(url, e))
    }
}

impl<T: HttpGet + ?Sized> HttpGet for &T {
    fn get_text(&self, url: &str) -> Result<String> {
        (**self).get_text(url)
    }
}
