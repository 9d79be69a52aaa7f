//! Tagged actions pushed by the backend over the event stream

use crate::{ImageFile, ProtoError};
use serde::{Deserialize, Serialize};

/// Progress report of a long operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    pub status: String,
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Log,
    Warning,
    Error,
}

/// One log line emitted by a long operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub kind: LogKind,
    pub message: String,
}

/// Messages sent from the backend to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackendAction {
    /// A file was scanned for the first time or re-scanned
    FileRegistered { image: ImageFile },

    /// A preview was (re)generated
    ThumbnailUpdated { image: ImageFile },

    /// Partial backend status; keys are merged into the mirror
    BackendStateUpdate {
        state: serde_json::Map<String, serde_json::Value>,
    },

    LongOperationStart { loid: String },

    LongOperationStatus { loid: String, status: OperationStatus },

    LongOperationLog { loid: String, log: LogMessage },

    LongOperationSuccess { loid: String },

    LongOperationError { loid: String, message: String },
}

impl BackendAction {
    /// Decode a single stream message
    pub fn decode(text: &str) -> Result<Self, ProtoError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtoError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Long operation id, if this is a long operation event
    pub fn operation_id(&self) -> Option<&str> {
        match self {
            BackendAction::LongOperationStart { loid }
            | BackendAction::LongOperationStatus { loid, .. }
            | BackendAction::LongOperationLog { loid, .. }
            | BackendAction::LongOperationSuccess { loid }
            | BackendAction::LongOperationError { loid, .. } => Some(loid),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_file_registered() {
        let text = r#"{
            "action": "FILE_REGISTERED",
            "image": {
                "path": "/a/b.jpg",
                "uid": "u1",
                "size": {"width": 10, "height": 20},
                "previews": [{"preview_size": {"width": 5, "height": 10}, "preview_timestamp": 42}],
                "file_size": 100,
                "file_ctime": 1.5,
                "file_mtime": 2.5,
                "file_color_tag": 3,
                "icc_profile_description": "sRGB",
                "mime_type": "image/jpeg",
                "exif_data": {},
                "country": "",
                "city": ""
            }
        }"#;

        let image = match BackendAction::decode(text).unwrap() {
            BackendAction::FileRegistered { image } => image,
            other => panic!("Wrong variant: {:?}", other),
        };
        assert_eq!(image.uid, "u1");
        assert_eq!(image.previews[0].preview_timestamp, 42);
        assert_eq!(image.file_color_tag, crate::FileColorTag::Purple);
    }

    #[test]
    fn test_decode_long_operation_log() {
        let text = r#"{"action":"LONG_OPERATION_LOG","loid":"x","log":{"kind":"warning","message":"hm"}}"#;
        match BackendAction::decode(text).unwrap() {
            BackendAction::LongOperationLog { loid, log } => {
                assert_eq!(loid, "x");
                assert_eq!(log.kind, LogKind::Warning);
            }
            other => panic!("Wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_action() {
        let result = BackendAction::decode(r#"{"action":"SOMETHING_ELSE"}"#);
        assert!(matches!(result, Err(ProtoError::Malformed(_))));
    }

    #[test]
    fn test_operation_id() {
        let action = BackendAction::LongOperationSuccess { loid: "op".into() };
        assert_eq!(action.operation_id(), Some("op"));

        let action = BackendAction::FileRegistered {
            image: ImageFile::new("u", "/a.jpg"),
        };
        assert!(action.operation_id().is_none());
    }
}
