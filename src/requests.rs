use std::{collections::BTreeMap, sync::Arc};

use anyhow::Context;
use reqwest::{
    Client, ClientBuilder, Response, Url,
    cookie::{CookieStore, Jar},
    header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::ratelimit::RateLimiter;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:144.0) Gecko/20100101 Firefox/144.0";

/// Body of a response plus the URL it ended up at after redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub body: String,
}

pub struct RequestClient {
    client: Client,
    cookie_jar: Arc<Jar>,
    rate_limiter: RateLimiter,
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("he,en-US;q=0.7,en;q=0.3"));
    headers
}

/// Value of cookie `name` in a `Cookie:` header value (`a=1; b=2`).
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

impl RequestClient {
    pub fn new() -> anyhow::Result<Self> {
        let cookie_jar = Arc::new(Jar::default());
        let client = ClientBuilder::new()
            .cookie_provider(cookie_jar.clone())
            .default_headers(browser_headers())
            .build()?;
        let rate_limiter = RateLimiter::new();
        Ok(Self {
            client,
            cookie_jar,
            rate_limiter,
        })
    }

    pub fn set_cookie(&self, url: &str, name: &str, value: &str) -> anyhow::Result<()> {
        let url = Url::parse(url).with_context(|| format!("invalid url: {url}"))?;
        self.cookie_jar
            .add_cookie_str(&format!("{name}={value}; Path=/"), &url);
        Ok(())
    }

    pub fn cookie(&self, url: &str, name: &str) -> anyhow::Result<Option<String>> {
        let url = Url::parse(url).with_context(|| format!("invalid url: {url}"))?;
        let Some(header) = self.cookie_jar.cookies(&url) else {
            return Ok(None);
        };
        Ok(header.to_str().ok().and_then(|h| find_cookie(h, name)))
    }

    async fn read_page(response: Response) -> anyhow::Result<FetchedPage> {
        let response = response.error_for_status()?;
        let final_url = response.url().to_string();
        let body = response.text().await?;
        Ok(FetchedPage { final_url, body })
    }

    pub async fn get(&self, url: &str) -> anyhow::Result<FetchedPage> {
        // Wait (non-blocking) until we're allowed to make a request according
        // to our self-imposed rate-limiting policy.
        self.rate_limiter.wait_until_ready().await;

        let response = self.client.get(url).send().await?;
        Self::read_page(response).await
    }

    pub async fn post_form(
        &self,
        url: &str,
        form: &BTreeMap<String, String>,
    ) -> anyhow::Result<FetchedPage> {
        self.rate_limiter.wait_until_ready().await;

        let response = self
            .client
            .post(url)
            .header(reqwest::header::REFERER, url)
            .form(form)
            .send()
            .await?;
        Self::read_page(response).await
    }
}
