//! Wire types for the station backend. Field renames follow the server's
//! JSON exactly (legacy `f_` column names included) so nothing here guesses.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every endpoint wraps its payload in this envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub message: String,
    pub success: bool,
    pub data: T,
}

/// Credentials returned by both login endpoints and persisted in the session
/// file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAuth {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QrLoginRequest {
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest {
    pub color: String,
    pub id: String,
}

/// Server-side user record; fetched to validate the stored token.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "f_userfullname", default)]
    pub full_name: Option<String>,
}

/// One patient's pending prescription orders.
#[derive(Debug, Clone, Deserialize)]
pub struct Prescription {
    pub hn: String,
    #[serde(rename = "patientName")]
    pub patient_name: String,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    #[serde(rename = "f_orderitemcode")]
    pub item_code: String,
    #[serde(rename = "f_orderitemname")]
    pub item_name: String,
    #[serde(rename = "f_prescriptionnohis")]
    pub prescription_no: String,
    #[serde(rename = "f_orderqty")]
    pub qty: String,
    #[serde(rename = "f_orderunitdesc")]
    pub unit: String,
    #[serde(rename = "f_itemlocationno")]
    pub bin_location: String,
    #[serde(rename = "f_referenceCode")]
    pub reference_code: String,
    #[serde(rename = "f_status")]
    pub status: String,
    #[serde(rename = "f_dispensestatus")]
    pub dispense_status: String,
    #[serde(rename = "f_patientname")]
    pub patient_name: String,
}

/// Bin light turned on manually; persisted while it stays lit so a restart
/// can still turn it off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveLight {
    #[serde(rename = "drugCode")]
    pub drug_code: String,
    #[serde(rename = "drugName")]
    pub drug_name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManualLightRequest {
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NarcoticCheck {
    #[serde(rename = "isNarcotic")]
    pub is_narcotic: bool,
}

/// Shelf label for one order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(rename = "f_orderitemname")]
    pub item_name: String,
    #[serde(rename = "f_orderqty")]
    pub qty: String,
    #[serde(rename = "f_orderunitdesc")]
    pub unit: String,
    #[serde(rename = "f_itemlocationno")]
    pub bin_location: String,
    #[serde(rename = "f_referenceCode")]
    pub reference_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelRequest {
    pub reference: String,
    #[serde(rename = "drugCode")]
    pub drug_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiveOrderRequest {
    pub reference: Option<String>,
    pub user: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiveAck {
    pub message: bool,
}

/// Latest published build, as reported by the version endpoint. The server
/// string-encodes `version_code`; a bare number is tolerated too.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(deserialize_with = "string_or_number")]
    pub version_code: String,
    pub version_name: String,
    pub apk_url: String,
    pub changelog: String,
    pub checksum: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Accepts `"5"` or `5` and yields the string form.
pub(crate) fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;

    impl de::Visitor<'_> for Visitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or an integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    de.deserialize_any(Visitor)
}

/// Best-effort message from an error body: the `message` field when the body
/// parses as JSON, otherwise a generic HTTP text.
pub(crate) fn error_message(body: &[u8], status: u32) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        message: Option<String>,
    }

    if let Ok(ErrorBody { message: Some(m) }) = serde_json::from_slice::<ErrorBody>(body) {
        if !m.is_empty() {
            return m;
        }
    }
    format!("HTTP {}", status)
}
