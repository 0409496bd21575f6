// This is free and unencumbered software released into the public domain.

use crate::shared::{
    BridgeResult, CameraXProxy, Identifier, InstanceManager, Quality, QualitySelector,
};
use alloc::sync::Arc;

pub trait RecorderHostApi {
    fn create(&self, identifier: Identifier, quality_selector_id: Option<Identifier>)
    -> BridgeResult;
}

pub trait QualitySelectorHostApi {
    fn create(&self, identifier: Identifier, quality: Quality) -> BridgeResult;
}

/// Host APIs for the recording-side objects a capture pipeline wraps.
pub struct RecorderHostApiImpl {
    instance_manager: Arc<InstanceManager>,
    camerax: Arc<dyn CameraXProxy>,
}

impl core::fmt::Debug for RecorderHostApiImpl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecorderHostApiImpl")
            .field("instance_manager", &self.instance_manager)
            .finish_non_exhaustive()
    }
}

impl RecorderHostApiImpl {
    pub fn new(instance_manager: Arc<InstanceManager>, camerax: Arc<dyn CameraXProxy>) -> Self {
        Self {
            instance_manager,
            camerax,
        }
    }
}

impl RecorderHostApi for RecorderHostApiImpl {
    fn create(
        &self,
        identifier: Identifier,
        quality_selector_id: Option<Identifier>,
    ) -> BridgeResult {
        let selector = quality_selector_id
            .map(|id| self.instance_manager.get_instance::<Arc<dyn QualitySelector>>(id))
            .transpose()?;
        let recorder = self.camerax.create_recorder(selector)?;
        self.instance_manager
            .add_remote_created_instance(recorder, identifier)
    }
}

impl QualitySelectorHostApi for RecorderHostApiImpl {
    fn create(&self, identifier: Identifier, quality: Quality) -> BridgeResult {
        let selector = self.camerax.create_quality_selector(quality)?;
        self.instance_manager
            .add_remote_created_instance(selector, identifier)
    }
}
