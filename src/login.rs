use std::collections::BTreeMap;

use anyhow::Context;
use log::info;
use reqwest::Url;
use scraper::Html;

use crate::{
    config::LoginConfig,
    form_state::FormState,
    requests::RequestClient,
    text_manipulators::{extract_text, selector},
};

/// Session cookie the portal issues after login.
pub const SESSION_COOKIE: &str = "BCI_OL_KEY";
/// Makes the portal render schedules as a grid rather than a calendar widget.
pub const PRESENTATION_COOKIE: (&str, &str) = ("OrbitLivePresentationTypeByCookie", "GridView");

const USERNAME_FIELD: &str = "ctl00$ContentPlaceHolder1$edtUsername";
const PASSWORD_FIELD: &str = "ctl00$ContentPlaceHolder1$edtPassword";
const LOGIN_BUTTON_FIELD: &str = "ctl00$ContentPlaceHolder1$btnLogin";
const LOGIN_BUTTON_VALUE: &str = "כניסה";

/// Form body for the login post. Fails when the login page lacks the
/// WebForms state the server requires.
pub fn login_form(
    login_url: &str,
    state: &FormState,
    username: &str,
    password: &str,
) -> anyhow::Result<BTreeMap<String, String>> {
    for required in ["__VIEWSTATE", "__EVENTVALIDATION"] {
        if state.get(required).is_none() {
            anyhow::bail!("login page has no {required} field");
        }
    }

    let mut form = state.postback("", "", &BTreeMap::new());
    form.entry("__PageDataKey".to_string()).or_default();
    if let Ok(url) = Url::parse(login_url) {
        if let Some((_, return_url)) = url.query_pairs().find(|(k, _)| k == "ReturnUrl") {
            form.insert("ReturnUrl".to_string(), return_url.into_owned());
        }
    }
    form.insert(USERNAME_FIELD.to_string(), username.to_string());
    form.insert(PASSWORD_FIELD.to_string(), password.to_string());
    form.insert(LOGIN_BUTTON_FIELD.to_string(), LOGIN_BUTTON_VALUE.to_string());
    Ok(form)
}

/// Text of the first `<span>` whose id mentions "error".
pub fn login_error_message(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let span_selector = selector("span[id]").ok()?;
    document
        .select(&span_selector)
        .filter(|span| {
            span.value()
                .attr("id")
                .is_some_and(|id| id.to_lowercase().contains("error"))
        })
        .map(extract_text)
        .find(|text| !text.is_empty())
}

pub fn still_on_login_page(final_url: &str) -> bool {
    final_url.to_lowercase().contains("login")
}

/// Logs in with the configured credentials and returns the fresh session cookie.
pub async fn log_in(client: &RequestClient, login: &LoginConfig) -> anyhow::Result<String> {
    info!("Getting login page...");
    let page = client
        .get(&login.url)
        .await
        .context("failed to load login page")?;
    let state = FormState::from_html(&page.body)?;
    let form = login_form(&login.url, &state, &login.username, &login.password)?;

    info!("Logging in as {}", login.username);
    let response = client
        .post_form(&login.url, &form)
        .await
        .context("failed to post login form")?;
    if still_on_login_page(&response.final_url) {
        match login_error_message(&response.body) {
            Some(message) => anyhow::bail!("login failed: {message}"),
            None => anyhow::bail!("login failed: still on login page"),
        }
    }

    let cookie = client
        .cookie(&login.url, SESSION_COOKIE)?
        .with_context(|| format!("{SESSION_COOKIE} cookie not found after login"))?;
    info!("Login successful");
    Ok(cookie)
}
