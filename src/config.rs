use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};

/// The env vars the calendar job reads.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarEnv {
    pub portal_url: Option<String>,
    pub login_url: Option<String>,
    pub portal_username: Option<String>,
    pub portal_password: Option<String>,
    pub session_cookie: Option<String>,
    /// JSON object of extra fields for the initial search post.
    pub portal_form_data: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub html_input_dir: Option<PathBuf>,
    pub save_html: Option<bool>,
    pub write_json: Option<bool>,
    pub calendar_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginConfig {
    pub url: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub url: String,
    pub login: Option<LoginConfig>,
    pub session_cookie: Option<String>,
    pub form_data: BTreeMap<String, String>,
}

/// Where the schedule pages come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    Portal(PortalConfig),
    Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarConfig {
    pub source: PageSource,
    pub output_dir: PathBuf,
    pub save_html: bool,
    pub write_json: bool,
    pub calendar_name: String,
}

impl CalendarConfig {
    pub fn new() -> anyhow::Result<Self> {
        Self::from_env(CalendarEnv::load_from_env()?)
    }

    pub fn from_env(env: CalendarEnv) -> anyhow::Result<Self> {
        let source = match (env.html_input_dir, env.portal_url) {
            (Some(dir), _) => PageSource::Directory(dir),
            (None, Some(url)) => {
                let login = match (env.login_url, env.portal_username, env.portal_password) {
                    (Some(url), Some(username), Some(password)) => Some(LoginConfig {
                        url,
                        username,
                        password,
                    }),
                    (Some(_), _, _) => {
                        anyhow::bail!("LOGIN_URL is set but PORTAL_USERNAME/PORTAL_PASSWORD are not")
                    }
                    (None, _, _) => None,
                };
                let form_data = match env.portal_form_data.as_deref() {
                    Some(json) if !json.trim().is_empty() => serde_json::from_str(json)
                        .context("PORTAL_FORM_DATA must be a JSON object of strings")?,
                    _ => BTreeMap::new(),
                };
                PageSource::Portal(PortalConfig {
                    url,
                    login,
                    session_cookie: env.session_cookie,
                    form_data,
                })
            }
            (None, None) => anyhow::bail!("either PORTAL_URL or HTML_INPUT_DIR must be set"),
        };

        Ok(Self {
            source,
            output_dir: env.output_dir.unwrap_or_else(|| PathBuf::from("output")),
            save_html: env.save_html.unwrap_or(true),
            write_json: env.write_json.unwrap_or(true),
            calendar_name: env
                .calendar_name
                .unwrap_or_else(|| "College Calendar".to_string()),
        })
    }

    pub fn html_dir(&self) -> PathBuf {
        self.output_dir.join("html")
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join("json").join("classes.json")
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
