//! REST client for the station backend.
//!
//! One generic JSON request path handles the work: envelope decode,
//! error-body message recovery, 401 mapping, and capped retries for
//! idempotent reads. Auth is threaded explicitly per call; there is no
//! ambient token.

pub mod error;
pub mod retry;
pub mod types;

pub use error::ApiError;
pub use types::{
    ActiveLight, ApiEnvelope, Label, LabelRequest, LoginRequest, LogoutRequest,
    ManualLightRequest, NarcoticCheck, Order, Prescription, QrLoginRequest, ReceiveAck,
    ReceiveOrderRequest, UpdateInfo, UserAuth, UserRecord,
};

use crate::config::StationConfig;
use crate::http::{AuthContext, HttpClient, Method};
use retry::RetryPolicy;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_policy(http: HttpClient, retry: RetryPolicy) -> Self {
        Self { http, retry }
    }

    pub fn from_config(http: HttpClient, cfg: &StationConfig) -> Self {
        let retry = cfg
            .retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_default();
        Self { http, retry }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Runs one request on the blocking pool: serialize body, perform,
    /// decode envelope. GETs go through the retry policy.
    async fn call<T>(
        &self,
        method: Method,
        path: String,
        auth: Option<AuthContext>,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let http = self.http.clone();
        let policy = self.retry;
        let idempotent = method == Method::Get;
        tokio::task::spawn_blocking(move || {
            let payload = match &body {
                Some(v) => Some(serde_json::to_vec(v)?),
                None => None,
            };
            let mut run = || perform::<T>(&http, method, &path, auth.as_ref(), payload.as_deref());
            if idempotent {
                retry::run_with_retry(&policy, run)
            } else {
                run()
            }
        })
        .await
        .map_err(|e| ApiError::Task(e.to_string()))?
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<UserAuth, ApiError> {
        let body = serde_json::to_value(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        self.call(Method::Post, "auth/login".to_string(), None, Some(body))
            .await
    }

    pub async fn qr_login(&self, username: &str) -> Result<UserAuth, ApiError> {
        let body = serde_json::to_value(QrLoginRequest {
            username: username.to_string(),
        })?;
        self.call(Method::Post, "auth/qrlogin".to_string(), None, Some(body))
            .await
    }

    /// Server-side logout. The caller clears the local session regardless of
    /// the outcome.
    pub async fn logout(&self, auth: &AuthContext, color: &str, id: &str) -> Result<String, ApiError> {
        let body = serde_json::to_value(LogoutRequest {
            color: color.to_string(),
            id: id.to_string(),
        })?;
        self.call(
            Method::Post,
            "auth/logout".to_string(),
            Some(auth.clone()),
            Some(body),
        )
        .await
    }

    /// Fetches the user record behind the stored token, doubling as a token
    /// check: a stale session surfaces as `ApiError::Unauthorized`.
    pub async fn check_token(
        &self,
        auth: &AuthContext,
        user_id: &str,
    ) -> Result<UserRecord, ApiError> {
        self.call(
            Method::Get,
            format!("user/{}", user_id),
            Some(auth.clone()),
            None,
        )
        .await
    }

    /// Pending orders for a scanned patient HN. `None` when the server has
    /// nothing for that patient.
    pub async fn prescription_orders(
        &self,
        auth: &AuthContext,
        hn: &str,
    ) -> Result<Option<Prescription>, ApiError> {
        self.call(
            Method::Get,
            format!("prescription/order/{}", hn),
            Some(auth.clone()),
            None,
        )
        .await
    }

    pub async fn light_on(&self, auth: &AuthContext, location: &str) -> Result<ActiveLight, ApiError> {
        let body = serde_json::to_value(ManualLightRequest {
            location: location.to_string(),
        })?;
        self.call(
            Method::Post,
            "prescription/manual-on".to_string(),
            Some(auth.clone()),
            Some(body),
        )
        .await
    }

    pub async fn light_off(&self, auth: &AuthContext, location: &str) -> Result<ActiveLight, ApiError> {
        let body = serde_json::to_value(ManualLightRequest {
            location: location.to_string(),
        })?;
        self.call(
            Method::Post,
            "prescription/manual-off".to_string(),
            Some(auth.clone()),
            Some(body),
        )
        .await
    }

    pub async fn pause_dispense(&self, auth: &AuthContext, hn: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .call(
                Method::Delete,
                format!("prescription/dispense/{}", hn),
                Some(auth.clone()),
                None,
            )
            .await?;
        Ok(())
    }

    /// Orders already dispensed for the patient, for a re-dispense pass.
    pub async fn redispense(
        &self,
        auth: &AuthContext,
        hn: &str,
    ) -> Result<Option<Prescription>, ApiError> {
        self.call(
            Method::Get,
            format!("prescription/dispensated/{}", hn),
            Some(auth.clone()),
            None,
        )
        .await
    }

    pub async fn check_narcotic(
        &self,
        auth: &AuthContext,
        drug_code: &str,
    ) -> Result<NarcoticCheck, ApiError> {
        self.call(
            Method::Get,
            format!("prescription/narcotic/{}", drug_code),
            Some(auth.clone()),
            None,
        )
        .await
    }

    pub async fn order_label(
        &self,
        auth: &AuthContext,
        reference: &str,
        drug_code: &str,
    ) -> Result<Label, ApiError> {
        let body = serde_json::to_value(LabelRequest {
            reference: reference.to_string(),
            drug_code: drug_code.to_string(),
        })?;
        self.call(
            Method::Post,
            "prescription/label".to_string(),
            Some(auth.clone()),
            Some(body),
        )
        .await
    }

    pub async fn receive_order(
        &self,
        auth: &AuthContext,
        bin_location: &str,
        reference: Option<&str>,
        user: Option<&str>,
    ) -> Result<ReceiveAck, ApiError> {
        let body = serde_json::to_value(ReceiveOrderRequest {
            reference: reference.map(str::to_string),
            user: user.map(str::to_string),
        })?;
        self.call(
            Method::Patch,
            format!("prescription/receive/{}", bin_location),
            Some(auth.clone()),
            Some(body),
        )
        .await
    }

    /// Latest published build. Works unauthenticated so a station can update
    /// before anyone logs in.
    pub async fn latest_update(&self, auth: Option<&AuthContext>) -> Result<UpdateInfo, ApiError> {
        self.call(
            Method::Get,
            "upload/version/current".to_string(),
            auth.cloned(),
            None,
        )
        .await
    }
}

fn perform<T: DeserializeOwned>(
    http: &HttpClient,
    method: Method,
    path: &str,
    auth: Option<&AuthContext>,
    body: Option<&[u8]>,
) -> Result<T, ApiError> {
    let resp = http.request(method, path, auth, body)?;
    if resp.status == 401 {
        return Err(ApiError::Unauthorized);
    }
    if !(200..300).contains(&resp.status) {
        let message = types::error_message(&resp.body, resp.status);
        return Err(ApiError::Http {
            status: resp.status,
            message,
        });
    }
    // Decode the payload only after the success flag: rejected envelopes
    // carry null data that would not parse as T.
    let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_slice(&resp.body)?;
    if !envelope.success {
        return Err(ApiError::Rejected(envelope.message));
    }
    Ok(serde_json::from_value(envelope.data)?)
}
