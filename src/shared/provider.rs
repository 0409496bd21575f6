// This is free and unencumbered software released into the public domain.

use crate::shared::{
    BridgeError, BridgeResult, Executor, SerialExecutor, SurfaceRequest, SurfaceResult,
    SurfaceTexture, SystemServicesFlutterApi, TransformationInfo,
};
use alloc::sync::Arc;
use scopeguard::defer;

/// Answers native surface requests with surfaces backed by one texture.
///
/// Results are delivered on the provider's own executor thread. Every surface
/// handed out is released exactly once when its result arrives; failures are
/// reported to the remote side as camera errors and never returned to a
/// caller.
pub struct SurfaceProvider {
    texture: Arc<dyn SurfaceTexture>,
    executor: Arc<SerialExecutor>,
    system_services: SystemServicesFlutterApi,
}

impl core::fmt::Debug for SurfaceProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SurfaceProvider")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl SurfaceProvider {
    pub fn new(
        texture: Arc<dyn SurfaceTexture>,
        system_services: SystemServicesFlutterApi,
    ) -> BridgeResult<Self> {
        let executor = SerialExecutor::new("camerax-surface-provider")
            .map_err(|e| BridgeError::native("spawning the surface executor", e))?;
        Ok(Self {
            texture,
            executor: Arc::new(executor),
            system_services,
        })
    }

    pub fn on_surface_requested(&self, mut request: Box<dyn SurfaceRequest>) {
        let resolution = request.resolution();
        self.texture.set_default_buffer_size(resolution);

        let surface = match self.texture.create_surface() {
            Ok(surface) => surface,
            Err(err) => {
                #[cfg(feature = "tracing")]
                asimov_module::tracing::warn!(target: "asimov_camerax_bridge", error = %err, "no surface for request");

                request.will_not_provide_surface();
                self.system_services
                    .send_camera_error(format!("Failed to create a preview surface: {err}"));
                return;
            },
        };

        request.set_transformation_info(TransformationInfo::for_lens(request.lens_facing()));

        let system_services = self.system_services.clone();
        let executor: Arc<dyn Executor> = self.executor.clone();
        request.provide_surface(
            surface,
            executor,
            Box::new(move |result: SurfaceResult| {
                let SurfaceResult { code, surface } = result;
                defer! {
                    surface.release();
                }

                if !code.is_success() {
                    #[cfg(feature = "tracing")]
                    asimov_module::tracing::warn!(target: "asimov_camerax_bridge", %code, "surface provisioning failed");

                    system_services.send_camera_error(code.error_description());
                }
            }),
        );
    }
}
