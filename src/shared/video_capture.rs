// This is free and unencumbered software released into the public domain.

use crate::shared::{
    BridgeConfig, BridgeError, BridgeResult, CameraXProxy, Identifier, InstanceManager,
    LensFacing, NativeObject, QualitySelector, Recorder, Rotation, TransformationInfo,
    VideoCapture, VideoCaptureFlutterApi, VideoCaptureSpec,
};
use alloc::sync::Arc;

/// Remote-callable operations on video capture pipelines.
pub trait VideoCaptureHostApi {
    /// Wraps the recorder `output_id` in a new capture and returns the
    /// capture's identifier.
    fn with_output(&self, output_id: Identifier) -> BridgeResult<Identifier>;

    fn get_output(&self, identifier: Identifier) -> BridgeResult<Identifier>;

    fn set_target_rotation(&self, identifier: Identifier, rotation: i64) -> BridgeResult;

    fn create(
        &self,
        identifier: Identifier,
        rotation: Option<i64>,
        quality_selector_id: Option<Identifier>,
    ) -> BridgeResult;
}

pub struct VideoCaptureHostApiImpl {
    config: BridgeConfig,
    instance_manager: Arc<InstanceManager>,
    camerax: Arc<dyn CameraXProxy>,
    flutter_api: VideoCaptureFlutterApi,
}

impl core::fmt::Debug for VideoCaptureHostApiImpl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VideoCaptureHostApiImpl")
            .field("config", &self.config)
            .field("instance_manager", &self.instance_manager)
            .finish_non_exhaustive()
    }
}

impl VideoCaptureHostApiImpl {
    pub fn new(
        config: BridgeConfig,
        instance_manager: Arc<InstanceManager>,
        camerax: Arc<dyn CameraXProxy>,
        flutter_api: VideoCaptureFlutterApi,
    ) -> Self {
        Self {
            config,
            instance_manager,
            camerax,
            flutter_api,
        }
    }

    fn video_capture(&self, identifier: Identifier) -> BridgeResult<Arc<dyn VideoCapture>> {
        self.instance_manager.get_instance(identifier)
    }
}

impl VideoCaptureHostApi for VideoCaptureHostApiImpl {
    fn with_output(&self, output_id: Identifier) -> BridgeResult<Identifier> {
        let recorder: Arc<dyn Recorder> = self.instance_manager.get_instance(output_id)?;
        let capture = self.camerax.video_capture_with_output(recorder)?;
        Ok(self.flutter_api.create(&capture))
    }

    fn get_output(&self, identifier: Identifier) -> BridgeResult<Identifier> {
        let recorder = self.video_capture(identifier)?.output();
        self.instance_manager
            .identifier_for(&NativeObject::from(recorder))
            .ok_or(BridgeError::Unregistered("recorder"))
    }

    fn set_target_rotation(&self, identifier: Identifier, rotation: i64) -> BridgeResult {
        let rotation = Rotation::try_from(rotation)?;
        self.video_capture(identifier)?
            .set_target_rotation(rotation);
        Ok(())
    }

    fn create(
        &self,
        identifier: Identifier,
        rotation: Option<i64>,
        quality_selector_id: Option<Identifier>,
    ) -> BridgeResult {
        let mut spec = VideoCaptureSpec {
            target_rotation: self.config.target_rotation,
            resolution_selector: self.config.resolution_selector(),
            quality_selector: None,
        };
        if let Some(rotation) = rotation {
            spec.target_rotation = Rotation::try_from(rotation)?;
        }
        if let Some(id) = quality_selector_id {
            let selector: Arc<dyn QualitySelector> = self.instance_manager.get_instance(id)?;
            spec.quality_selector = Some(selector);
        }

        let capture = self.camerax.create_video_capture(spec)?;
        if capture.lens_facing() == Some(LensFacing::Front) {
            capture.set_transformation_info(TransformationInfo::for_lens(LensFacing::Front));
        }

        self.instance_manager
            .add_remote_created_instance(capture, identifier)
    }
}
