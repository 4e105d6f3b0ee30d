use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use itemtrade_models::{wire, ForeignInventory, SessionConfig, TradeStatus};
use reqwest::cookie::Jar;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::TradeApi;
use crate::cursor::TradeCursor;
use crate::error::SessionError;

/// Credentials of an already logged-in web session.
#[derive(Clone)]
pub struct SessionCredentials {
    /// Session id as stored in the `sessionid` cookie (may be URL-encoded).
    pub session_id: String,
    pub login_token: String,
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("session_id", &"<redacted>")
            .field("login_token", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct CommandResult {
    #[serde(default, deserialize_with = "wire::flag")]
    success: bool,
}

/// HTTP client for one trade with one counterpart.
pub struct TradeSession {
    http: Client,
    trade_url: String,
    session_id: String,
    counterpart_id: u64,
    app_id: u32,
    context_id: u64,
    cursor: TradeCursor,
}

impl TradeSession {
    pub fn new(
        config: &SessionConfig,
        credentials: &SessionCredentials,
        counterpart_id: u64,
    ) -> Result<Self, SessionError> {
        let session_id = urlencoding::decode(&credentials.session_id)
            .map_err(|e| SessionError::InvalidConfig(format!("session id is not UTF-8: {e}")))?
            .into_owned();
        if session_id.is_empty() {
            return Err(SessionError::InvalidConfig("session id is empty".to_string()));
        }

        let cookie_url: Url = format!("https://{}/", config.cookie_domain)
            .parse()
            .map_err(|e| {
                SessionError::InvalidConfig(format!(
                    "bad cookie domain {:?}: {e}",
                    config.cookie_domain
                ))
            })?;
        let jar = Arc::new(Jar::default());
        for (name, value) in [
            ("sessionid", credentials.session_id.as_str()),
            ("steamLogin", credentials.login_token.as_str()),
        ] {
            jar.add_cookie_str(
                &format!("{name}={value}; Domain={}; Path=/", config.cookie_domain),
                &cookie_url,
            );
        }

        let http = Client::builder()
            .cookie_provider(jar)
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| SessionError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            trade_url: trade_url(&config.base_url, counterpart_id),
            session_id,
            counterpart_id,
            app_id: config.app_id,
            context_id: config.context_id,
            cursor: TradeCursor::default(),
        })
    }

    pub fn counterpart_id(&self) -> u64 {
        self.counterpart_id
    }

    pub fn trade_url(&self) -> &str {
        &self.trade_url
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: &[(&str, String)],
    ) -> Result<T, SessionError> {
        let url = format!("{}{endpoint}", self.trade_url);
        debug!(endpoint, "Trade endpoint request");

        let response = self.http.post(&url).form(form).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).trim().to_string();
            return Err(SessionError::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| SessionError::Protocol(format!("{endpoint}: {e}")))
    }

    async fn command(&self, endpoint: &str, form: &[(&str, String)]) -> Result<bool, SessionError> {
        let result: CommandResult = self.post(endpoint, form).await?;
        if !result.success {
            debug!(endpoint, "Trade command answered without success");
        }
        Ok(result.success)
    }

    fn item_form(&self, asset_id: u64, slot: u32) -> [(&'static str, String); 5] {
        [
            ("sessionid", self.session_id.clone()),
            ("appid", self.app_id.to_string()),
            ("contextid", self.context_id.to_string()),
            ("itemid", asset_id.to_string()),
            ("slot", slot.to_string()),
        ]
    }
}

#[async_trait]
impl TradeApi for TradeSession {
    fn cursor(&self) -> TradeCursor {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: TradeCursor) {
        self.cursor.advance(cursor);
    }

    async fn fetch_status(&self) -> Result<TradeStatus, SessionError> {
        self.post(
            "tradestatus",
            &[
                ("sessionid", self.session_id.clone()),
                ("logpos", self.cursor.log_pos().to_string()),
                ("version", self.cursor.version().to_string()),
            ],
        )
        .await
    }

    async fn add_item(&self, asset_id: u64, slot: u32) -> Result<bool, SessionError> {
        self.command("additem", &self.item_form(asset_id, slot)).await
    }

    async fn remove_item(&self, asset_id: u64, slot: u32) -> Result<bool, SessionError> {
        self.command("removeitem", &self.item_form(asset_id, slot))
            .await
    }

    async fn send_message(&self, text: &str) -> Result<bool, SessionError> {
        self.command(
            "chat",
            &[
                ("sessionid", self.session_id.clone()),
                ("message", text.to_string()),
                ("logpos", self.cursor.log_pos().to_string()),
                ("version", self.cursor.version().to_string()),
            ],
        )
        .await
    }

    async fn set_ready(&self, ready: bool) -> Result<bool, SessionError> {
        self.command(
            "toggleready",
            &[
                ("sessionid", self.session_id.clone()),
                ("ready", ready.to_string()),
                ("version", self.cursor.version().to_string()),
            ],
        )
        .await
    }

    async fn accept_trade(&self) -> Result<bool, SessionError> {
        self.command(
            "confirm",
            &[
                ("sessionid", self.session_id.clone()),
                ("version", self.cursor.version().to_string()),
            ],
        )
        .await
    }

    async fn cancel_trade(&self) -> Result<bool, SessionError> {
        self.command("cancel", &[("sessionid", self.session_id.clone())])
            .await
    }

    async fn fetch_foreign_inventory(
        &self,
        counterpart_id: u64,
        context_id: u64,
    ) -> ForeignInventory {
        let url = format!("{}foreigninventory", self.trade_url);
        let form = [
            ("sessionid", self.session_id.clone()),
            ("steamid", counterpart_id.to_string()),
            ("appid", self.app_id.to_string()),
            ("contextid", context_id.to_string()),
        ];
        debug!(counterpart_id, context_id, "Fetching foreign inventory");

        let body = match self.http.post(&url).form(&form).send().await {
            Ok(response) if response.status().is_success() => response.text().await,
            Ok(response) => {
                warn!(status = %response.status(), "Foreign inventory request failed");
                return ForeignInventory::Unavailable;
            }
            Err(e) => Err(e),
        };

        let body = match body {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Foreign inventory request failed");
                return ForeignInventory::Unavailable;
            }
        };

        match ForeignInventory::from_json(&body) {
            Ok(inventory) => {
                if !inventory.is_loaded() {
                    warn!(counterpart_id, "Foreign inventory reported unavailable");
                }
                inventory
            }
            Err(e) => {
                warn!(error = %e, "Foreign inventory response unreadable");
                ForeignInventory::Unavailable
            }
        }
    }
}

fn trade_url(base_url: &str, counterpart_id: u64) -> String {
    format!("{}/{counterpart_id}/", base_url.trim_end_matches('/'))
}
