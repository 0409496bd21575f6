// This is free and unencumbered software released into the public domain.

//! The native camera framework as seen from the bridge.

use crate::shared::{
    BridgeResult, CaptureMode, LensFacing, Quality, ResolutionSelector, Rotation, Size,
    SurfaceProvider, TransformationInfo,
};
use alloc::{borrow::Cow, sync::Arc};
use derive_more::From;

pub trait Preview: Send + Sync {
    fn set_surface_provider(&self, provider: Arc<SurfaceProvider>);

    /// The resolution the framework settled on, once it has one.
    fn resolution(&self) -> Option<Size>;

    fn set_target_rotation(&self, rotation: Rotation);
}

pub trait Recorder: Send + Sync {
    fn quality_selector(&self) -> Option<Arc<dyn QualitySelector>>;
}

pub trait QualitySelector: Send + Sync {
    fn quality(&self) -> Quality;
}

pub trait VideoCapture: Send + Sync {
    fn output(&self) -> Arc<dyn Recorder>;
    fn set_target_rotation(&self, rotation: Rotation);
    fn set_transformation_info(&self, info: TransformationInfo);

    /// Facing of the camera the capture is bound to, if any.
    fn lens_facing(&self) -> Option<LensFacing>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreviewSpec {
    pub target_rotation: Rotation,
    pub capture_mode: CaptureMode,
    pub resolution_selector: ResolutionSelector,
    pub target_resolution: Option<Size>,
}

#[derive(Clone, Default)]
pub struct VideoCaptureSpec {
    pub target_rotation: Rotation,
    pub resolution_selector: ResolutionSelector,
    pub quality_selector: Option<Arc<dyn QualitySelector>>,
}

impl core::fmt::Debug for VideoCaptureSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VideoCaptureSpec")
            .field("target_rotation", &self.target_rotation)
            .field("resolution_selector", &self.resolution_selector)
            .field("quality_selector", &self.quality_selector.as_ref().map(|q| q.quality()))
            .finish()
    }
}

/// Builders of the native framework.
pub trait CameraXProxy: Send + Sync {
    fn create_preview(&self, spec: PreviewSpec) -> BridgeResult<Arc<dyn Preview>>;
    fn create_video_capture(&self, spec: VideoCaptureSpec) -> BridgeResult<Arc<dyn VideoCapture>>;
    fn video_capture_with_output(
        &self,
        recorder: Arc<dyn Recorder>,
    ) -> BridgeResult<Arc<dyn VideoCapture>>;
    fn create_recorder(
        &self,
        quality_selector: Option<Arc<dyn QualitySelector>>,
    ) -> BridgeResult<Arc<dyn Recorder>>;
    fn create_quality_selector(&self, quality: Quality) -> BridgeResult<Arc<dyn QualitySelector>>;
}

/// Any native object the instance manager can hold.
#[derive(Clone, From)]
pub enum NativeObject {
    Preview(Arc<dyn Preview>),
    VideoCapture(Arc<dyn VideoCapture>),
    Recorder(Arc<dyn Recorder>),
    QualitySelector(Arc<dyn QualitySelector>),
}

impl NativeObject {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Preview(_) => <Arc<dyn Preview> as Instance>::KIND,
            Self::VideoCapture(_) => <Arc<dyn VideoCapture> as Instance>::KIND,
            Self::Recorder(_) => <Arc<dyn Recorder> as Instance>::KIND,
            Self::QualitySelector(_) => <Arc<dyn QualitySelector> as Instance>::KIND,
        }
    }

    /// Identity of the shared allocation; equal for clones of the same object.
    pub(crate) fn key(&self) -> usize {
        match self {
            Self::Preview(p) => Arc::as_ptr(p) as *const () as usize,
            Self::VideoCapture(v) => Arc::as_ptr(v) as *const () as usize,
            Self::Recorder(r) => Arc::as_ptr(r) as *const () as usize,
            Self::QualitySelector(q) => Arc::as_ptr(q) as *const () as usize,
        }
    }
}

impl core::fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NativeObject({}@{:#x})", self.kind(), self.key())
    }
}

impl dogma::Named for NativeObject {
    fn name(&self) -> Cow<'_, str> {
        self.kind().into()
    }
}

/// Typed view of a [`NativeObject`].
pub trait Instance: Sized + Into<NativeObject> {
    const KIND: &'static str;

    fn from_native(object: &NativeObject) -> Option<Self>;
}

macro_rules! instance {
    ($variant:ident, $kind:literal) => {
        impl Instance for Arc<dyn $variant> {
            const KIND: &'static str = $kind;

            fn from_native(object: &NativeObject) -> Option<Self> {
                match object {
                    NativeObject::$variant(inner) => Some(Arc::clone(inner)),
                    _ => None,
                }
            }
        }
    };
}

instance!(Preview, "preview");
instance!(VideoCapture, "video capture");
instance!(Recorder, "recorder");
instance!(QualitySelector, "quality selector");
