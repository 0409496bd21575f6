// This is free and unencumbered software released into the public domain.

//! Surfaces exchanged between the UI texture registry and the native camera.

use crate::shared::{BridgeResult, Executor, LensFacing, Size, TransformationInfo};
use alloc::sync::Arc;
use derive_more::Display;

/// Status reported by the native side once it is done with a provided surface.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[display("{_0}")]
pub struct ResultCode(pub i32);

impl ResultCode {
    pub const SURFACE_USED_SUCCESSFULLY: Self = Self(0);
    pub const REQUEST_CANCELLED: Self = Self(1);
    pub const INVALID_SURFACE: Self = Self(2);
    pub const SURFACE_ALREADY_PROVIDED: Self = Self(3);
    pub const WILL_NOT_PROVIDE_SURFACE: Self = Self(4);

    #[inline]
    pub fn is_success(self) -> bool {
        self == Self::SURFACE_USED_SUCCESSFULLY
    }

    /// Human-readable description sent to the remote side for a failed
    /// provisioning.
    pub fn error_description(self) -> String {
        match self {
            Self::INVALID_SURFACE => {
                format!("{self}: Provided surface could not be used by the camera.")
            },
            _ => format!("{self}: Attempt to provide a surface resulted with unrecognizable code."),
        }
    }
}

/// A drawable surface backed by a texture buffer. Releasing consumes it.
pub trait Surface: Send {
    fn release(self: Box<Self>);
}

pub trait SurfaceTexture: Send + Sync {
    fn set_default_buffer_size(&self, size: Size);
    fn create_surface(&self) -> BridgeResult<Box<dyn Surface>>;
}

/// A texture-registry entry the UI layer renders from.
pub trait SurfaceProducer: Send + Sync {
    fn id(&self) -> i64;
    fn surface_texture(&self) -> Arc<dyn SurfaceTexture>;
    fn release(&self);
}

pub trait TextureRegistry: Send + Sync {
    fn create_surface_producer(&self) -> BridgeResult<Arc<dyn SurfaceProducer>>;
}

/// Outcome of a provisioning; the surface is handed back to its provider.
pub struct SurfaceResult {
    pub code: ResultCode,
    pub surface: Box<dyn Surface>,
}

impl core::fmt::Debug for SurfaceResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SurfaceResult")
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

pub type ResultListener = Box<dyn FnOnce(SurfaceResult) + Send + 'static>;

/// A native request for a surface to render preview frames into.
pub trait SurfaceRequest: Send {
    fn resolution(&self) -> Size;
    fn lens_facing(&self) -> LensFacing;
    fn set_transformation_info(&mut self, info: TransformationInfo);

    /// Hands over `surface`. The native side invokes `listener` on `executor`
    /// exactly once, returning the surface with the result code.
    fn provide_surface(
        self: Box<Self>,
        surface: Box<dyn Surface>,
        executor: Arc<dyn Executor>,
        listener: ResultListener,
    );

    fn will_not_provide_surface(self: Box<Self>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_surface_has_its_own_description() {
        assert_eq!(
            ResultCode::INVALID_SURFACE.error_description(),
            "2: Provided surface could not be used by the camera."
        );
    }

    #[test]
    fn other_codes_are_unrecognizable() {
        for code in [ResultCode::REQUEST_CANCELLED, ResultCode(99)] {
            let description = code.error_description();
            assert!(description.starts_with(&format!("{}: ", code.0)));
            assert!(description.ends_with("resulted with unrecognizable code."));
        }
    }
}
