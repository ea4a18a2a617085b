//! Events exchanged with a websocket peer

use crate::{core::validator::is_blank, store::Message};
use serde::{Deserialize, Serialize};

// ============================== // IncomingEvent // ============================== //

/// Events from client to server
///
/// Unrecognized `type` tags decode into `Unknown` so they can be reported
/// instead of dropping the connection.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingEvent {
    Join(JoinRequest),
    Message(MessageRequest),
    LoadHistory(LoadHistoryRequest),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    #[serde(default)]
    pub room_id: i64,
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadHistoryRequest {
    pub before_id: Option<i64>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown event type")]
    UnknownType,
    #[error("invalid event payload: {0}")]
    BadPayload(&'static str),
}

impl IncomingEvent {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            IncomingEvent::Join(req) => {
                if req.room_id == 0 {
                    return Err(ValidationError::BadPayload("room_id is required for join"));
                }
                if is_blank(&req.nick) {
                    return Err(ValidationError::BadPayload("nick is required for join"));
                }
                Ok(())
            }
            IncomingEvent::Message(req) => {
                if is_blank(&req.text) {
                    return Err(ValidationError::BadPayload("text is required for message"));
                }
                Ok(())
            }
            IncomingEvent::LoadHistory(_) => Ok(()),
            IncomingEvent::Unknown => Err(ValidationError::UnknownType),
        }
    }

    /// Decode a frame from the peer
    ///
    /// An object whose `type` is missing or not a string decodes as `Unknown`,
    /// so it is reported like any unrecognized tag. Anything that is not a JSON
    /// object of the right shape is a decode error.
    pub fn from_slice(data: &[u8]) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(data)?;
        match value.get("type") {
            Some(serde_json::Value::String(_)) => serde_json::from_value(value),
            _ if value.is_object() => Ok(IncomingEvent::Unknown),
            _ => serde_json::from_value(value),
        }
    }

    /// Room the event refers to, if it names one
    pub fn room_id(&self) -> i64 {
        match self {
            IncomingEvent::Join(req) => req.room_id,
            _ => 0,
        }
    }
}

// ============================== // OutgoingEvent // ============================== //

/// Events from server to client
///
/// Zero ids and empty strings or lists are left off the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingEvent {
    Message {
        #[serde(skip_serializing_if = "is_zero")]
        room_id: i64,
        #[serde(skip_serializing_if = "String::is_empty")]
        nick: String,
        message: Message,
    },
    History {
        #[serde(skip_serializing_if = "is_zero")]
        room_id: i64,
        #[serde(skip_serializing_if = "String::is_empty")]
        nick: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        messages: Vec<Message>,
    },
    Join {
        #[serde(skip_serializing_if = "is_zero")]
        room_id: i64,
        #[serde(skip_serializing_if = "String::is_empty")]
        nick: String,
    },
    Error {
        #[serde(skip_serializing_if = "is_zero")]
        room_id: i64,
        #[serde(skip_serializing_if = "String::is_empty")]
        text: String,
    },
}

impl OutgoingEvent {
    pub fn error(room_id: i64, text: impl Into<String>) -> Self {
        OutgoingEvent::Error {
            room_id,
            text: text.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

// ========================// tests //======================== //
