// This is free and unencumbered software released into the public domain.

//! One-way notifications sent to the remote side.

use crate::shared::{
    BinaryMessenger, BridgeResult, Identifier, InstanceManager, NativeObject, VideoCapture,
};
use alloc::sync::Arc;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RemoteEvent {
    CameraError { description: String },
    VideoCaptureCreated { identifier: Identifier },
}

impl RemoteEvent {
    pub fn channel(&self) -> &'static str {
        match self {
            Self::CameraError { .. } => "SystemServicesFlutterApi.onCameraError",
            Self::VideoCaptureCreated { .. } => "VideoCaptureFlutterApi.create",
        }
    }

    pub fn encode(&self) -> BridgeResult<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn decode(payload: &[u8]) -> BridgeResult<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// Fire-and-forget event emission. Failures are logged, never returned.
#[derive(Clone)]
pub struct EventEmitter {
    messenger: Arc<dyn BinaryMessenger>,
}

impl core::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventEmitter").finish_non_exhaustive()
    }
}

impl EventEmitter {
    pub fn new(messenger: Arc<dyn BinaryMessenger>) -> Self {
        Self { messenger }
    }

    pub fn emit(&self, event: RemoteEvent) {
        let result = event
            .encode()
            .and_then(|payload| self.messenger.send(event.channel(), payload));

        if let Err(_err) = result {
            #[cfg(feature = "tracing")]
            asimov_module::tracing::warn!(
                target: "asimov_camerax_bridge",
                channel = event.channel(),
                error = %_err,
                "dropped remote event"
            );
        }
    }
}

#[derive(Clone, Debug)]
pub struct SystemServicesFlutterApi {
    emitter: EventEmitter,
}

impl SystemServicesFlutterApi {
    pub fn new(emitter: EventEmitter) -> Self {
        Self { emitter }
    }

    pub fn send_camera_error(&self, description: impl Into<String>) {
        self.emitter.emit(RemoteEvent::CameraError {
            description: description.into(),
        });
    }
}

#[derive(Clone, Debug)]
pub struct VideoCaptureFlutterApi {
    emitter: EventEmitter,
    instance_manager: Arc<InstanceManager>,
}

impl VideoCaptureFlutterApi {
    pub fn new(emitter: EventEmitter, instance_manager: Arc<InstanceManager>) -> Self {
        Self {
            emitter,
            instance_manager,
        }
    }

    /// Registers a host-created capture and tells the remote side about it.
    /// Already registered captures keep their identifier and are not
    /// announced again.
    pub fn create(&self, capture: &Arc<dyn VideoCapture>) -> Identifier {
        let object = NativeObject::from(Arc::clone(capture));
        let (identifier, inserted) = self
            .instance_manager
            .get_or_add_host_created_instance(object);
        if inserted {
            self.emitter
                .emit(RemoteEvent::VideoCaptureCreated { identifier });
        }
        identifier
    }
}
