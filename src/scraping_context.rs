use log::{info, warn};

use crate::{
    config::PortalConfig,
    form_state::PagerDetector,
    login::{PRESENTATION_COOKIE, SESSION_COOKIE, log_in},
    requests::RequestClient,
};

pub struct ScrapingContext {
    pub portal: PortalConfig,
    pub pager_detector: PagerDetector,
    pub request_client: RequestClient,
}

impl ScrapingContext {
    /// Builds the client and installs the session cookie, logging in first
    /// when credentials are configured.
    pub async fn new(portal: PortalConfig) -> anyhow::Result<Self> {
        let pager_detector = PagerDetector::new()?;
        let request_client = RequestClient::new()?;
        let (name, value) = PRESENTATION_COOKIE;
        request_client.set_cookie(&portal.url, name, value)?;

        let session_cookie = match &portal.login {
            Some(login) => Some(log_in(&request_client, login).await?),
            None => portal.session_cookie.clone(),
        };
        match session_cookie {
            Some(cookie) => request_client.set_cookie(&portal.url, SESSION_COOKIE, &cookie)?,
            None => warn!("No login or SESSION_COOKIE configured, fetching anonymously"),
        }
        info!("Scraping context ready for {}", portal.url);

        Ok(ScrapingContext {
            portal,
            pager_detector,
            request_client,
        })
    }
}
