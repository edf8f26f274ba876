use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::PaymentModes;

/// `currentModeOfPayment` as the backend stores it: a JSON object serialized into a string.
///
/// Encoding follows the field order of [`PaymentModes`]. Decoding never fails: anything
/// that is not a readable flag object decodes to all flags `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedPaymentModes(String);

impl EncodedPaymentModes {
    pub fn encode(modes: &PaymentModes) -> Self {
        match serde_json::to_string(modes) {
            Ok(raw) => Self(raw),
            Err(err) => {
                // An empty object still decodes to all flags false.
                warn!(error = %err, "failed to encode payment modes");
                Self("{}".to_string())
            }
        }
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> PaymentModes {
        decode_payment_modes(&self.0)
    }
}

impl<'de> Deserialize<'de> for EncodedPaymentModes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Older records carry the flags as a nested object instead of a string.
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => Self(raw),
            other => Self(other.to_string()),
        })
    }
}

pub fn decode_payment_modes(raw: &str) -> PaymentModes {
    if let Ok(modes) = serde_json::from_str::<PaymentModes>(raw) {
        return modes;
    }

    // Some rows were stringified twice.
    if let Ok(inner) = serde_json::from_str::<String>(raw) {
        if let Ok(modes) = serde_json::from_str::<PaymentModes>(&inner) {
            return modes;
        }
    }

    debug!(raw, "malformed currentModeOfPayment; defaulting to no payment modes");
    PaymentModes::default()
}
