// This is free and unencumbered software released into the public domain.

//! JSON wire format of host calls and their replies.

use crate::shared::{BridgeError, BridgeResult, Identifier, Quality, ResolutionInfo};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum HostCall {
    #[serde(rename = "PreviewHostApi.create")]
    PreviewCreate {
        identifier: Identifier,
        #[serde(default)]
        rotation: Option<i64>,
        #[serde(default)]
        target_resolution: Option<ResolutionInfo>,
    },
    #[serde(rename = "PreviewHostApi.setSurfaceProvider")]
    PreviewSetSurfaceProvider { identifier: Identifier },
    #[serde(rename = "PreviewHostApi.releaseFlutterSurfaceTexture")]
    PreviewReleaseFlutterSurfaceTexture,
    #[serde(rename = "PreviewHostApi.getResolutionInfo")]
    PreviewGetResolutionInfo { identifier: Identifier },
    #[serde(rename = "PreviewHostApi.setTargetRotation")]
    PreviewSetTargetRotation { identifier: Identifier, rotation: i64 },

    #[serde(rename = "VideoCaptureHostApi.withOutput")]
    VideoCaptureWithOutput { output_id: Identifier },
    #[serde(rename = "VideoCaptureHostApi.getOutput")]
    VideoCaptureGetOutput { identifier: Identifier },
    #[serde(rename = "VideoCaptureHostApi.setTargetRotation")]
    VideoCaptureSetTargetRotation { identifier: Identifier, rotation: i64 },
    #[serde(rename = "VideoCaptureHostApi.create")]
    VideoCaptureCreate {
        identifier: Identifier,
        #[serde(default)]
        rotation: Option<i64>,
        #[serde(default)]
        quality_selector_id: Option<Identifier>,
    },

    #[serde(rename = "RecorderHostApi.create")]
    RecorderCreate {
        identifier: Identifier,
        #[serde(default)]
        quality_selector_id: Option<Identifier>,
    },
    #[serde(rename = "QualitySelectorHostApi.create")]
    QualitySelectorCreate { identifier: Identifier, quality: Quality },

    #[serde(rename = "InstanceManagerHostApi.dispose")]
    InstanceDispose { identifier: Identifier },
    #[serde(rename = "InstanceManagerHostApi.clear")]
    InstanceClear,
}

impl HostCall {
    pub fn decode(message: &[u8]) -> BridgeResult<Self> {
        Ok(serde_json::from_slice(message)?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HostReply {
    Ok {
        #[serde(default, skip_serializing_if = "Value::is_null")]
        result: Value,
    },
    Error {
        code: String,
        message: String,
    },
}

impl HostReply {
    pub fn ok(result: Value) -> Self {
        Self::Ok { result }
    }

    pub fn error(err: &BridgeError) -> Self {
        Self::Error {
            code: err.code().to_owned(),
            message: err.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn decode(message: &[u8]) -> BridgeResult<Self> {
        Ok(serde_json::from_slice(message)?)
    }

    pub fn encode(&self) -> Bytes {
        // A reply holds only strings and JSON values, which always serialize.
        Bytes::from(serde_json::to_vec(self).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_arguments_may_be_omitted() {
        let call = HostCall::decode(br#"{"method":"PreviewHostApi.create","identifier":1}"#).unwrap();
        assert_eq!(
            call,
            HostCall::PreviewCreate {
                identifier: 1,
                rotation: None,
                target_resolution: None
            }
        );
    }

    #[test]
    fn nested_resolution_records_decode() {
        let call = HostCall::decode(
            br#"{"method":"PreviewHostApi.create","identifier":2,"rotation":1,
                 "target_resolution":{"width":1280,"height":720}}"#,
        )
        .unwrap();
        assert_eq!(
            call,
            HostCall::PreviewCreate {
                identifier: 2,
                rotation: Some(1),
                target_resolution: Some(ResolutionInfo {
                    width: 1280,
                    height: 720
                }),
            }
        );
    }

    #[test]
    fn argument_free_calls_carry_only_the_method() {
        let call = HostCall::decode(br#"{"method":"PreviewHostApi.releaseFlutterSurfaceTexture"}"#)
            .unwrap();
        assert_eq!(call, HostCall::PreviewReleaseFlutterSurfaceTexture);
    }

    #[test]
    fn unknown_methods_are_malformed() {
        let err = HostCall::decode(br#"{"method":"CameraHostApi.open"}"#).unwrap_err();
        assert_eq!(err.code(), "malformed-message");
    }

    #[test]
    fn replies_use_a_status_tag() {
        let ok = serde_json::to_value(HostReply::ok(json!(7))).unwrap();
        assert_eq!(ok, json!({"status": "ok", "result": 7}));

        let void = serde_json::to_value(HostReply::ok(Value::Null)).unwrap();
        assert_eq!(void, json!({"status": "ok"}));

        let err = serde_json::to_value(HostReply::error(&BridgeError::NotFound(3))).unwrap();
        assert_eq!(
            err,
            json!({
                "status": "error",
                "code": "not-found",
                "message": "no instance registered for identifier 3"
            })
        );
    }
}
