// This is free and unencumbered software released into the public domain.

//! In-process stand-in for the native camera framework.
//!
//! Previews settle on their target resolution (or the sensor size fitted to
//! the requested aspect ratio) as soon as they are built, and installing a
//! surface provider immediately issues a surface request from the configured
//! lens. Result codes can be scripted; surface and producer releases are
//! counted so callers can observe teardown.

use crate::shared::{
    AspectRatio, BridgeError, BridgeResult, CameraXProxy, Executor, LensFacing, Preview,
    PreviewSpec, Quality, QualitySelector, Recorder, ResultCode, ResultListener, Rotation, Size,
    Surface, SurfaceProducer, SurfaceProvider, SurfaceRequest, SurfaceResult, SurfaceTexture,
    TextureRegistry, TransformationInfo, VideoCapture, VideoCaptureSpec,
};
use alloc::{borrow::Cow, collections::VecDeque, sync::Arc};
use std::{
    sync::{
        Condvar, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicI64, Ordering},
    },
    time::{Duration, Instant},
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

#[derive(Clone, Debug)]
pub struct LoopbackConfig {
    pub sensor_size: Size,
    pub lens_facing: LensFacing,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            sensor_size: Size::new(1920, 1080),
            lens_facing: LensFacing::Back,
        }
    }
}

impl LoopbackConfig {
    pub fn with_sensor_size(mut self, size: Size) -> Self {
        self.sensor_size = size;
        self
    }

    pub fn with_lens_facing(mut self, facing: LensFacing) -> Self {
        self.lens_facing = facing;
        self
    }
}

/// A count that can be waited on.
#[derive(Debug, Default)]
pub struct Counter {
    count: Mutex<usize>,
    changed: Condvar,
}

impl Counter {
    fn increment(&self) {
        *lock(&self.count) += 1;
        self.changed.notify_all();
    }

    pub fn get(&self) -> usize {
        *lock(&self.count)
    }

    /// Waits until the count reaches `n`; false on timeout.
    pub fn wait_for(&self, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = lock(&self.count);
        while *count < n {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            count = self
                .changed
                .wait_timeout(count, deadline - now)
                .unwrap_or_else(|p| p.into_inner())
                .0;
        }
        true
    }
}

#[derive(Debug, Default)]
struct ResultScript(Mutex<VecDeque<ResultCode>>);

impl ResultScript {
    fn next(&self) -> ResultCode {
        lock(&self.0)
            .pop_front()
            .unwrap_or(ResultCode::SURFACE_USED_SUCCESSFULLY)
    }
}

#[derive(Default)]
pub struct LoopbackCameraX {
    config: LoopbackConfig,
    results: Arc<ResultScript>,
    previews: Mutex<Vec<Arc<LoopbackPreview>>>,
    video_captures: Mutex<Vec<Arc<LoopbackVideoCapture>>>,
}

impl core::fmt::Debug for LoopbackCameraX {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoopbackCameraX")
            .field("config", &self.config)
            .field("previews", &lock(&self.previews).len())
            .field("video_captures", &lock(&self.video_captures).len())
            .finish()
    }
}

impl LoopbackCameraX {
    pub fn new(config: LoopbackConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Every preview built so far, oldest first.
    pub fn previews(&self) -> Vec<Arc<LoopbackPreview>> {
        lock(&self.previews).clone()
    }

    /// Every video capture built so far, oldest first.
    pub fn video_captures(&self) -> Vec<Arc<LoopbackVideoCapture>> {
        lock(&self.video_captures).clone()
    }

    pub fn build_preview(&self, spec: PreviewSpec) -> Arc<LoopbackPreview> {
        let preview = Arc::new(LoopbackPreview {
            resolution: self.settle_resolution(&spec),
            rotation: Mutex::new(spec.target_rotation),
            spec,
            lens_facing: self.config.lens_facing,
            results: Arc::clone(&self.results),
            provider: Mutex::new(None),
            transformation: Arc::default(),
        });
        lock(&self.previews).push(Arc::clone(&preview));
        preview
    }

    fn build_video_capture(
        &self,
        recorder: Arc<dyn Recorder>,
        rotation: Rotation,
    ) -> Arc<LoopbackVideoCapture> {
        let capture = Arc::new(LoopbackVideoCapture::new(
            recorder,
            rotation,
            self.config.lens_facing,
        ));
        lock(&self.video_captures).push(Arc::clone(&capture));
        capture
    }

    /// Queues the result code for the next surface request; unscripted
    /// requests succeed.
    pub fn script_result(&self, code: ResultCode) {
        lock(&self.results.0).push_back(code);
    }

    fn settle_resolution(&self, spec: &PreviewSpec) -> Size {
        if let Some(size) = spec.target_resolution {
            return size;
        }
        let Size { width, height } = self.config.sensor_size;
        let (num, den) = match spec.resolution_selector.aspect_ratio {
            AspectRatio::Ratio16x9 => (16, 9),
            AspectRatio::Ratio4x3 => (4, 3),
        };
        if width * den / num <= height {
            Size::new(width, width * den / num)
        } else {
            Size::new(height * num / den, height)
        }
    }
}

impl dogma::Named for LoopbackCameraX {
    fn name(&self) -> Cow<'_, str> {
        "loopback".into()
    }
}

impl CameraXProxy for LoopbackCameraX {
    fn create_preview(&self, spec: PreviewSpec) -> BridgeResult<Arc<dyn Preview>> {
        Ok(self.build_preview(spec))
    }

    fn create_video_capture(&self, spec: VideoCaptureSpec) -> BridgeResult<Arc<dyn VideoCapture>> {
        let recorder = Arc::new(LoopbackRecorder {
            quality_selector: spec.quality_selector,
        });
        Ok(self.build_video_capture(recorder, spec.target_rotation))
    }

    fn video_capture_with_output(
        &self,
        recorder: Arc<dyn Recorder>,
    ) -> BridgeResult<Arc<dyn VideoCapture>> {
        Ok(self.build_video_capture(recorder, Rotation::Rotation0))
    }

    fn create_recorder(
        &self,
        quality_selector: Option<Arc<dyn QualitySelector>>,
    ) -> BridgeResult<Arc<dyn Recorder>> {
        Ok(Arc::new(LoopbackRecorder { quality_selector }))
    }

    fn create_quality_selector(&self, quality: Quality) -> BridgeResult<Arc<dyn QualitySelector>> {
        Ok(Arc::new(LoopbackQualitySelector { quality }))
    }
}

pub struct LoopbackPreview {
    spec: PreviewSpec,
    resolution: Size,
    rotation: Mutex<Rotation>,
    lens_facing: LensFacing,
    results: Arc<ResultScript>,
    provider: Mutex<Option<Arc<SurfaceProvider>>>,
    transformation: Arc<Mutex<Option<TransformationInfo>>>,
}

impl LoopbackPreview {
    pub fn spec(&self) -> &PreviewSpec {
        &self.spec
    }

    pub fn target_rotation(&self) -> Rotation {
        *lock(&self.rotation)
    }

    /// Transform attached to the last surface request that got a surface.
    pub fn last_transformation(&self) -> Option<TransformationInfo> {
        *lock(&self.transformation)
    }
}

impl Preview for LoopbackPreview {
    fn set_surface_provider(&self, provider: Arc<SurfaceProvider>) {
        *lock(&self.provider) = Some(Arc::clone(&provider));

        provider.on_surface_requested(Box::new(LoopbackSurfaceRequest {
            resolution: self.resolution,
            lens_facing: self.lens_facing,
            transformation: TransformationInfo::default(),
            code: self.results.next(),
            provided: Arc::clone(&self.transformation),
        }));
    }

    fn resolution(&self) -> Option<Size> {
        Some(self.resolution)
    }

    fn set_target_rotation(&self, rotation: Rotation) {
        *lock(&self.rotation) = rotation;
    }
}

struct LoopbackSurfaceRequest {
    resolution: Size,
    lens_facing: LensFacing,
    transformation: TransformationInfo,
    code: ResultCode,
    provided: Arc<Mutex<Option<TransformationInfo>>>,
}

impl SurfaceRequest for LoopbackSurfaceRequest {
    fn resolution(&self) -> Size {
        self.resolution
    }

    fn lens_facing(&self) -> LensFacing {
        self.lens_facing
    }

    fn set_transformation_info(&mut self, info: TransformationInfo) {
        self.transformation = info;
    }

    fn provide_surface(
        self: Box<Self>,
        surface: Box<dyn Surface>,
        executor: Arc<dyn Executor>,
        listener: ResultListener,
    ) {
        *lock(&self.provided) = Some(self.transformation);
        let code = self.code;
        executor.execute(Box::new(move || listener(SurfaceResult { code, surface })));
    }

    fn will_not_provide_surface(self: Box<Self>) {}
}

pub struct LoopbackRecorder {
    quality_selector: Option<Arc<dyn QualitySelector>>,
}

impl Recorder for LoopbackRecorder {
    fn quality_selector(&self) -> Option<Arc<dyn QualitySelector>> {
        self.quality_selector.clone()
    }
}

pub struct LoopbackQualitySelector {
    quality: Quality,
}

impl QualitySelector for LoopbackQualitySelector {
    fn quality(&self) -> Quality {
        self.quality
    }
}

pub struct LoopbackVideoCapture {
    recorder: Arc<dyn Recorder>,
    rotation: Mutex<Rotation>,
    transformation: Mutex<Option<TransformationInfo>>,
    lens_facing: LensFacing,
}

impl LoopbackVideoCapture {
    fn new(recorder: Arc<dyn Recorder>, rotation: Rotation, lens_facing: LensFacing) -> Self {
        Self {
            recorder,
            rotation: Mutex::new(rotation),
            transformation: Mutex::new(None),
            lens_facing,
        }
    }

    pub fn target_rotation(&self) -> Rotation {
        *lock(&self.rotation)
    }

    pub fn transformation(&self) -> Option<TransformationInfo> {
        *lock(&self.transformation)
    }
}

impl VideoCapture for LoopbackVideoCapture {
    fn output(&self) -> Arc<dyn Recorder> {
        Arc::clone(&self.recorder)
    }

    fn set_target_rotation(&self, rotation: Rotation) {
        *lock(&self.rotation) = rotation;
    }

    fn set_transformation_info(&self, info: TransformationInfo) {
        *lock(&self.transformation) = Some(info);
    }

    fn lens_facing(&self) -> Option<LensFacing> {
        Some(self.lens_facing)
    }
}

/// Texture registry whose producers count their surfaces.
#[derive(Debug)]
pub struct LoopbackTextureRegistry {
    next_id: AtomicI64,
    producers: Mutex<Vec<Arc<LoopbackSurfaceProducer>>>,
}

impl Default for LoopbackTextureRegistry {
    fn default() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            producers: Mutex::new(Vec::new()),
        }
    }
}

impl LoopbackTextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn producers(&self) -> Vec<Arc<LoopbackSurfaceProducer>> {
        lock(&self.producers).clone()
    }

    pub fn producer(&self, id: i64) -> Option<Arc<LoopbackSurfaceProducer>> {
        lock(&self.producers).iter().find(|p| p.id == id).cloned()
    }
}

impl TextureRegistry for LoopbackTextureRegistry {
    fn create_surface_producer(&self) -> BridgeResult<Arc<dyn SurfaceProducer>> {
        let producer = Arc::new(LoopbackSurfaceProducer {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            texture: Arc::default(),
            releases: Counter::default(),
        });
        lock(&self.producers).push(Arc::clone(&producer));
        Ok(producer)
    }
}

#[derive(Debug)]
pub struct LoopbackSurfaceProducer {
    id: i64,
    texture: Arc<LoopbackSurfaceTexture>,
    releases: Counter,
}

impl LoopbackSurfaceProducer {
    pub fn texture(&self) -> &LoopbackSurfaceTexture {
        &self.texture
    }

    pub fn releases(&self) -> &Counter {
        &self.releases
    }
}

impl SurfaceProducer for LoopbackSurfaceProducer {
    fn id(&self) -> i64 {
        self.id
    }

    fn surface_texture(&self) -> Arc<dyn SurfaceTexture> {
        self.texture.clone()
    }

    fn release(&self) {
        self.texture.abandoned.store(true, Ordering::SeqCst);
        self.releases.increment();
    }
}

#[derive(Debug, Default)]
pub struct LoopbackSurfaceTexture {
    buffer_size: Mutex<Option<Size>>,
    abandoned: AtomicBool,
    surfaces_created: Counter,
    surfaces_released: Arc<Counter>,
}

impl LoopbackSurfaceTexture {
    pub fn buffer_size(&self) -> Option<Size> {
        *lock(&self.buffer_size)
    }

    pub fn surfaces_created(&self) -> &Counter {
        &self.surfaces_created
    }

    pub fn surfaces_released(&self) -> &Counter {
        &self.surfaces_released
    }
}

impl SurfaceTexture for LoopbackSurfaceTexture {
    fn set_default_buffer_size(&self, size: Size) {
        *lock(&self.buffer_size) = Some(size);
    }

    fn create_surface(&self) -> BridgeResult<Box<dyn Surface>> {
        if self.abandoned.load(Ordering::SeqCst) {
            return Err(BridgeError::not_ready("surface texture was released"));
        }
        self.surfaces_created.increment();
        Ok(Box::new(LoopbackSurface {
            released: Arc::clone(&self.surfaces_released),
        }))
    }
}

struct LoopbackSurface {
    released: Arc<Counter>,
}

impl Surface for LoopbackSurface {
    fn release(self: Box<Self>) {
        self.released.increment();
    }
}
