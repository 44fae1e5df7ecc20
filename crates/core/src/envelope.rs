//! Envelope Codec
//!
//! Every message on the wire is one JSON object:
//!
//! ```text
//! { "accid": <string>, "title": <string>, "timestamp": <int-millis>,
//!   "guid": <string-uuid>, "data": { ... } }
//! ```
//!
//! Outbound envelopes are built immediately before each send, with a fresh
//! `guid` and the current wall-clock time. Inbound envelopes are decoded
//! leniently: absent (or `null`) fields decode to empty values.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Command titles understood by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestTitle {
    StandMode,
    WalkMode,
    Twist,
    SitDown,
    StairMode,
    EmergencyStop,
    EnableImu,
}

impl RequestTitle {
    /// Wire spelling of the title.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestTitle::StandMode => "request_stand_mode",
            RequestTitle::WalkMode => "request_walk_mode",
            RequestTitle::Twist => "request_twist",
            RequestTitle::SitDown => "request_sitdown",
            RequestTitle::StairMode => "request_stair_mode",
            RequestTitle::EmergencyStop => "request_emgy_stop",
            RequestTitle::EnableImu => "request_enable_imu",
        }
    }
}

impl fmt::Display for RequestTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `data` of a `request_twist` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwistPayload {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// `data` of the stair-mode and IMU toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnablePayload {
    pub enable: bool,
}

/// The unit of wire exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Device identifier (`accid`); `None` when the sender supplied none
    #[serde(rename = "accid", default)]
    pub device_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Wall-clock milliseconds at send time
    #[serde(rename = "timestamp", default, deserialize_with = "null_as_default")]
    pub timestamp_millis: i64,
    /// Fresh per envelope, for traceability only
    #[serde(rename = "guid", default, deserialize_with = "null_as_default")]
    pub correlation_id: String,
    #[serde(rename = "data", default, deserialize_with = "null_as_default")]
    pub payload: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Envelope {
    /// Build an outbound envelope stamped with a new correlation id and the
    /// current time.
    ///
    /// `payload` must serialize to a JSON object; unit or `null` yields an
    /// empty `data` object.
    pub fn new<P>(device_id: Option<&str>, title: &str, payload: &P) -> CoreResult<Self>
    where
        P: Serialize + ?Sized,
    {
        let payload = match serde_json::to_value(payload)
            .map_err(|e| CoreError::encoding(e.to_string()))?
        {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(CoreError::encoding(format!(
                    "payload for '{}' must be an object, got {}",
                    title, other
                )))
            }
        };

        Ok(Self {
            device_id: device_id.map(str::to_string),
            title: title.to_string(),
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
            correlation_id: uuid::Uuid::new_v4().to_string(),
            payload,
        })
    }

    /// Serialize to wire text.
    pub fn to_wire(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(|e| CoreError::encoding(e.to_string()))
    }

    /// Parse wire text into an envelope.
    pub fn decode(raw: impl AsRef<[u8]>) -> CoreResult<Self> {
        serde_json::from_slice(raw.as_ref()).map_err(|e| CoreError::decoding(e.to_string()))
    }
}

/// Build and serialize an outbound envelope in one step.
pub fn encode<P>(device_id: Option<&str>, title: &str, payload: &P) -> CoreResult<String>
where
    P: Serialize + ?Sized,
{
    Envelope::new(device_id, title, payload)?.to_wire()
}

/// Parse wire text into an envelope.
pub fn decode(raw: impl AsRef<[u8]>) -> CoreResult<Envelope> {
    Envelope::decode(raw)
}
