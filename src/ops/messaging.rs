use std::sync::mpsc;

use serde::{Deserialize, Serialize};

/// Payload posted between windows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessagePayload {
    /// A task was saved in a child window; the opener should refresh
    TaskSaved,
}

/// A message tagged with the origin it was sent from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowMessage {
    pub origin: String,
    pub payload: MessagePayload,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("message from {got} ignored (expected {expected})")]
    OriginMismatch { expected: String, got: String },
    #[error("opener is gone")]
    Disconnected,
}

/// Handle on the window that opened this one
#[derive(Debug, Clone)]
pub struct Opener {
    tx: mpsc::Sender<WindowMessage>,
    origin: String,
}

impl Opener {
    pub fn new(tx: mpsc::Sender<WindowMessage>, origin: &str) -> Self {
        Opener {
            tx,
            origin: origin.to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Post a payload addressed to the opener's origin
    pub fn post(&self, payload: MessagePayload) -> Result<(), MessageError> {
        self.tx
            .send(WindowMessage {
                origin: self.origin.clone(),
                payload,
            })
            .map_err(|_| MessageError::Disconnected)
    }
}

/// Accept a message only when its origin exactly equals ours
pub fn accept(current_origin: &str, msg: WindowMessage) -> Result<MessagePayload, MessageError> {
    if msg.origin != current_origin {
        return Err(MessageError::OriginMismatch {
            expected: current_origin.to_string(),
            got: msg.origin,
        });
    }
    Ok(msg.payload)
}
