// This is free and unencumbered software released into the public domain.

use crate::shared::{
    BinaryMessenger, BridgeConfig, BridgeResult, CameraXProxy, EventEmitter, HostCall, HostReply,
    InstanceManager, PreviewHostApi, PreviewHostApiImpl, QualitySelectorHostApi, RecorderHostApi,
    RecorderHostApiImpl, SystemServicesFlutterApi, TextureRegistry, VideoCaptureFlutterApi,
    VideoCaptureHostApi, VideoCaptureHostApiImpl,
};
use alloc::sync::Arc;
use bytes::Bytes;
use serde_json::{Value, json};

/// Decodes host calls, dispatches them to the host APIs and encodes replies.
#[derive(Debug)]
pub struct Bridge {
    instance_manager: Arc<InstanceManager>,
    preview: PreviewHostApiImpl,
    video_capture: VideoCaptureHostApiImpl,
    recorder: RecorderHostApiImpl,
    diagnostics: bool,
}

impl Bridge {
    pub fn new(
        config: BridgeConfig,
        camerax: Arc<dyn CameraXProxy>,
        texture_registry: Arc<dyn TextureRegistry>,
        messenger: Arc<dyn BinaryMessenger>,
    ) -> Self {
        let diagnostics = config.diagnostics;
        let instance_manager = Arc::new(InstanceManager::new());
        let emitter = EventEmitter::new(messenger);

        let preview = PreviewHostApiImpl::new(
            config.clone(),
            Arc::clone(&instance_manager),
            texture_registry,
            Arc::clone(&camerax),
            SystemServicesFlutterApi::new(emitter.clone()),
        );
        let video_capture = VideoCaptureHostApiImpl::new(
            config,
            Arc::clone(&instance_manager),
            Arc::clone(&camerax),
            VideoCaptureFlutterApi::new(emitter, Arc::clone(&instance_manager)),
        );
        let recorder = RecorderHostApiImpl::new(Arc::clone(&instance_manager), camerax);

        Self {
            instance_manager,
            preview,
            video_capture,
            recorder,
            diagnostics,
        }
    }

    /// Whether every call and reply is traced.
    pub fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    pub fn instance_manager(&self) -> &Arc<InstanceManager> {
        &self.instance_manager
    }

    /// Handles one encoded call. Bad input yields an error reply, never a
    /// panic.
    pub fn handle_message(&self, message: &[u8]) -> Bytes {
        let result = HostCall::decode(message).and_then(|call| {
            #[cfg(feature = "tracing")]
            if self.diagnostics {
                asimov_module::tracing::debug!(target: "asimov_camerax_bridge", ?call, "host call");
            }
            self.call(call)
        });
        let reply = match result {
            Ok(result) => HostReply::ok(result),
            Err(err) => {
                #[cfg(feature = "tracing")]
                asimov_module::tracing::debug!(target: "asimov_camerax_bridge", code = err.code(), error = %err, "host call failed");

                HostReply::error(&err)
            },
        };

        #[cfg(feature = "tracing")]
        if self.diagnostics {
            asimov_module::tracing::debug!(target: "asimov_camerax_bridge", ok = reply.is_ok(), "host reply");
        }

        reply.encode()
    }

    pub fn call(&self, call: HostCall) -> BridgeResult<Value> {
        use HostCall::*;
        Ok(match call {
            PreviewCreate {
                identifier,
                rotation,
                target_resolution,
            } => {
                self.preview
                    .create(identifier, rotation, target_resolution)?;
                Value::Null
            },
            PreviewSetSurfaceProvider { identifier } => {
                json!(self.preview.set_surface_provider(identifier)?)
            },
            PreviewReleaseFlutterSurfaceTexture => {
                self.preview.release_flutter_surface_texture()?;
                Value::Null
            },
            PreviewGetResolutionInfo { identifier } => {
                serde_json::to_value(self.preview.get_resolution_info(identifier)?)?
            },
            PreviewSetTargetRotation {
                identifier,
                rotation,
            } => {
                self.preview.set_target_rotation(identifier, rotation)?;
                Value::Null
            },
            VideoCaptureWithOutput { output_id } => json!(self.video_capture.with_output(output_id)?),
            VideoCaptureGetOutput { identifier } => {
                json!(self.video_capture.get_output(identifier)?)
            },
            VideoCaptureSetTargetRotation {
                identifier,
                rotation,
            } => {
                self.video_capture
                    .set_target_rotation(identifier, rotation)?;
                Value::Null
            },
            VideoCaptureCreate {
                identifier,
                rotation,
                quality_selector_id,
            } => {
                self.video_capture
                    .create(identifier, rotation, quality_selector_id)?;
                Value::Null
            },
            RecorderCreate {
                identifier,
                quality_selector_id,
            } => {
                RecorderHostApi::create(&self.recorder, identifier, quality_selector_id)?;
                Value::Null
            },
            QualitySelectorCreate {
                identifier,
                quality,
            } => {
                QualitySelectorHostApi::create(&self.recorder, identifier, quality)?;
                Value::Null
            },
            InstanceDispose { identifier } => {
                self.instance_manager.remove(identifier)?;
                Value::Null
            },
            InstanceClear => {
                self.instance_manager.clear();
                Value::Null
            },
        })
    }
}
