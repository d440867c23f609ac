//! Gateway adapter for the AVM Home Automation (AHA) HTTP interface.
//!
//! [`AhaClient`] implements the [`GatewayClient`] port against a real
//! FRITZ!Box style gateway: session handshake via `login_sid.lua`
//! (challenge-response, never sending the password itself), device reads
//! and commands via `webservices/homeautoswitch.lua`.
//!
//! The session id lives behind an async lock so one client can be shared
//! across the poll and dispatch engines.

pub mod device;
pub mod error;
pub mod login;

use reqwest::Url;
use tokio::sync::RwLock;

use fritzsync_app::ports::GatewayClient;
use fritzsync_domain::error::BridgeError;
use fritzsync_domain::identifier::DeviceIdentifier;
use fritzsync_domain::snapshot::DeviceSnapshot;

use crate::device::{DeviceXml, encode_setpoint};
use crate::error::AhaError;
use crate::login::SessionInfo;

const LOGIN_PATH: &str = "login_sid.lua";
const HOMEAUTO_PATH: &str = "webservices/homeautoswitch.lua";

/// HTTP client for one AHA gateway.
#[derive(Debug)]
pub struct AhaClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: String,
    sid: RwLock<Option<String>>,
}

impl AhaClient {
    #[must_use]
    pub fn new(base_url: Url, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            username: username.into(),
            password: password.into(),
            sid: RwLock::new(None),
        }
    }

    async fn get_session_info(&self, query: &[(&str, &str)]) -> Result<SessionInfo, AhaError> {
        let url = self.base_url.join(LOGIN_PATH)?;
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AhaError::Status(status.as_u16()));
        }
        SessionInfo::parse(&response.text().await?)
    }

    /// Run the `login_sid.lua` handshake and store the granted session id.
    #[tracing::instrument(skip(self))]
    pub async fn login_session(&self) -> Result<(), AhaError> {
        let info = self.get_session_info(&[("version", "2")]).await?;
        if info.has_session() {
            *self.sid.write().await = Some(info.sid);
            return Ok(());
        }

        let response = login::challenge_response(&info.challenge, &self.password)?;
        let info = self
            .get_session_info(&[
                ("version", "2"),
                ("username", self.username.as_str()),
                ("response", response.as_str()),
            ])
            .await?;
        if !info.has_session() {
            return Err(AhaError::LoginRejected {
                block_time: info.block_time,
            });
        }

        tracing::debug!(block_time = info.block_time, "session granted");
        *self.sid.write().await = Some(info.sid);
        Ok(())
    }

    /// Invalidate the session at the gateway and forget the session id.
    #[tracing::instrument(skip(self))]
    pub async fn logout_session(&self) -> Result<(), AhaError> {
        let Some(sid) = self.sid.write().await.take() else {
            return Ok(());
        };
        self.get_session_info(&[("logout", "1"), ("sid", sid.as_str())])
            .await?;
        Ok(())
    }

    async fn current_sid(&self) -> Result<String, AhaError> {
        self.sid.read().await.clone().ok_or(AhaError::NotLoggedIn)
    }

    async fn homeauto_get(
        &self,
        switchcmd: &str,
        ain: &DeviceIdentifier,
        param: Option<&str>,
    ) -> Result<String, AhaError> {
        let sid = self.current_sid().await?;
        let url = self.base_url.join(HOMEAUTO_PATH)?;
        let mut query = vec![
            ("switchcmd", switchcmd),
            ("ain", ain.as_str()),
            ("sid", sid.as_str()),
        ];
        if let Some(param) = param {
            query.push(("param", param));
        }
        let response = self.http.get(url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AhaError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Fetch one device's current state via `getdeviceinfos`.
    #[tracing::instrument(skip(self), fields(ain = %identifier))]
    pub async fn fetch_snapshot(
        &self,
        identifier: &DeviceIdentifier,
    ) -> Result<DeviceSnapshot, AhaError> {
        let body = self.homeauto_get("getdeviceinfos", identifier, None).await?;
        Ok(DeviceXml::parse(&body)?.into_snapshot())
    }

    fn command_error(
        identifier: &DeviceIdentifier,
        command: &'static str,
    ) -> impl FnOnce(AhaError) -> BridgeError {
        let identifier = identifier.clone();
        move |err| BridgeError::Command {
            identifier,
            command,
            source: Some(Box::new(err)),
        }
    }
}

impl GatewayClient for AhaClient {
    async fn login(&self) -> Result<(), BridgeError> {
        self.login_session()
            .await
            .map_err(|err| BridgeError::Authentication(Box::new(err)))
    }

    async fn logout(&self) -> Result<(), BridgeError> {
        self.logout_session()
            .await
            .map_err(|err| BridgeError::Authentication(Box::new(err)))
    }

    async fn device_snapshot(
        &self,
        identifier: &DeviceIdentifier,
    ) -> Result<DeviceSnapshot, BridgeError> {
        self.fetch_snapshot(identifier)
            .await
            .map_err(|err| BridgeError::unavailable(identifier.clone(), err))
    }

    async fn set_target_temperature(
        &self,
        identifier: &DeviceIdentifier,
        temperature: f64,
    ) -> Result<(), BridgeError> {
        let param = encode_setpoint(temperature).to_string();
        self.homeauto_get("sethkrtsoll", identifier, Some(&param))
            .await
            .map(|_| ())
            .map_err(Self::command_error(identifier, "sethkrtsoll"))
    }

    async fn set_switch_on(&self, identifier: &DeviceIdentifier) -> Result<(), BridgeError> {
        self.homeauto_get("setswitchon", identifier, None)
            .await
            .map(|_| ())
            .map_err(Self::command_error(identifier, "setswitchon"))
    }

    async fn set_switch_off(&self, identifier: &DeviceIdentifier) -> Result<(), BridgeError> {
        self.homeauto_get("setswitchoff", identifier, None)
            .await
            .map(|_| ())
            .map_err(Self::command_error(identifier, "setswitchoff"))
    }

    async fn set_switch_toggle(&self, identifier: &DeviceIdentifier) -> Result<(), BridgeError> {
        self.homeauto_get("setswitchtoggle", identifier, None)
            .await
            .map(|_| ())
            .map_err(Self::command_error(identifier, "setswitchtoggle"))
    }
}
