// This is free and unencumbered software released into the public domain.

use crate::shared::{
    BridgeConfig, BridgeError, BridgeResult, CameraXProxy, Identifier, InstanceManager, Preview,
    PreviewSpec, ResolutionInfo, Rotation, Size, SurfaceProvider, SystemServicesFlutterApi,
    TextureRegistry,
};
use alloc::sync::Arc;

/// Remote-callable operations on previews.
pub trait PreviewHostApi {
    fn create(
        &self,
        identifier: Identifier,
        rotation: Option<i64>,
        target_resolution: Option<ResolutionInfo>,
    ) -> BridgeResult;

    /// Returns the id of the surface producer now backing the preview.
    fn set_surface_provider(&self, identifier: Identifier) -> BridgeResult<i64>;

    fn release_flutter_surface_texture(&self) -> BridgeResult;

    fn get_resolution_info(&self, identifier: Identifier) -> BridgeResult<ResolutionInfo>;

    fn set_target_rotation(&self, identifier: Identifier, rotation: i64) -> BridgeResult;
}

pub struct PreviewHostApiImpl {
    config: BridgeConfig,
    instance_manager: Arc<InstanceManager>,
    texture_registry: Arc<dyn TextureRegistry>,
    camerax: Arc<dyn CameraXProxy>,
    system_services: SystemServicesFlutterApi,
}

impl core::fmt::Debug for PreviewHostApiImpl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PreviewHostApiImpl")
            .field("config", &self.config)
            .field("instance_manager", &self.instance_manager)
            .finish_non_exhaustive()
    }
}

impl PreviewHostApiImpl {
    pub fn new(
        config: BridgeConfig,
        instance_manager: Arc<InstanceManager>,
        texture_registry: Arc<dyn TextureRegistry>,
        camerax: Arc<dyn CameraXProxy>,
        system_services: SystemServicesFlutterApi,
    ) -> Self {
        Self {
            config,
            instance_manager,
            texture_registry,
            camerax,
            system_services,
        }
    }

    fn preview(&self, identifier: Identifier) -> BridgeResult<Arc<dyn Preview>> {
        self.instance_manager.get_instance(identifier)
    }
}

impl PreviewHostApi for PreviewHostApiImpl {
    fn create(
        &self,
        identifier: Identifier,
        rotation: Option<i64>,
        target_resolution: Option<ResolutionInfo>,
    ) -> BridgeResult {
        let mut spec = PreviewSpec {
            target_rotation: self.config.target_rotation,
            capture_mode: self.config.capture_mode,
            resolution_selector: self.config.resolution_selector(),
            target_resolution: None,
        };
        if let Some(rotation) = rotation {
            spec.target_rotation = Rotation::try_from(rotation)?;
        }
        if let Some(resolution) = target_resolution {
            spec.target_resolution = Some(Size::try_from(resolution)?);
        }

        let preview = self.camerax.create_preview(spec)?;
        self.instance_manager
            .add_remote_created_instance(preview, identifier)
    }

    fn set_surface_provider(&self, identifier: Identifier) -> BridgeResult<i64> {
        let preview = self.preview(identifier)?;
        let producer = self.texture_registry.create_surface_producer()?;
        let producer_id = producer.id();
        let provider =
            match SurfaceProvider::new(producer.surface_texture(), self.system_services.clone()) {
                Ok(provider) => provider,
                Err(err) => {
                    producer.release();
                    return Err(err);
                },
            };

        // The old producer stays live until the new provider is installed.
        preview.set_surface_provider(Arc::new(provider));
        if let Err(err) = self
            .instance_manager
            .attach_producer(identifier, Arc::clone(&producer))
        {
            producer.release();
            return Err(err);
        }

        Ok(producer_id)
    }

    fn release_flutter_surface_texture(&self) -> BridgeResult {
        self.instance_manager.release_latest_producer();
        Ok(())
    }

    fn get_resolution_info(&self, identifier: Identifier) -> BridgeResult<ResolutionInfo> {
        let preview = self.preview(identifier)?;
        let resolution = preview.resolution().ok_or_else(|| {
            BridgeError::not_ready(format!("preview {identifier} has no resolution yet"))
        })?;
        Ok(resolution.into())
    }

    fn set_target_rotation(&self, identifier: Identifier, rotation: i64) -> BridgeResult {
        let rotation = Rotation::try_from(rotation)?;
        self.preview(identifier)?.set_target_rotation(rotation);
        Ok(())
    }
}
