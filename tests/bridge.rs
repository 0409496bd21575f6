// This is free and unencumbered software released into the public domain.

use asimov_camerax_bridge::shared::{
    Bridge, BridgeConfig, Envelope, HostReply, LensFacing, QueueMessenger, RemoteEvent,
    ResultCode, Rotation, Size,
    drivers::loopback::{LoopbackCameraX, LoopbackConfig, LoopbackTextureRegistry},
};
use serde_json::{Value, json};
use std::{
    sync::{Arc, mpsc::Receiver},
    time::Duration,
};

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    bridge: Bridge,
    camerax: Arc<LoopbackCameraX>,
    textures: Arc<LoopbackTextureRegistry>,
    events: Receiver<Envelope>,
}

impl Harness {
    fn new() -> Self {
        Self::with_camera(LoopbackConfig::default())
    }

    fn with_camera(config: LoopbackConfig) -> Self {
        Self::build(BridgeConfig::default(), config)
    }

    fn build(bridge_config: BridgeConfig, config: LoopbackConfig) -> Self {
        let camerax = Arc::new(LoopbackCameraX::new(config));
        let textures = Arc::new(LoopbackTextureRegistry::new());
        let (messenger, events) = QueueMessenger::new(32);
        let bridge = Bridge::new(
            bridge_config,
            camerax.clone(),
            textures.clone(),
            Arc::new(messenger),
        );
        Self {
            bridge,
            camerax,
            textures,
            events,
        }
    }

    fn call(&self, message: Value) -> HostReply {
        let reply = self.bridge.handle_message(message.to_string().as_bytes());
        HostReply::decode(&reply).unwrap()
    }

    fn ok(&self, message: Value) -> Value {
        match self.call(message.clone()) {
            HostReply::Ok { result } => result,
            HostReply::Error { code, message: msg } => {
                panic!("{message} failed with {code}: {msg}")
            },
        }
    }

    fn error_code(&self, message: Value) -> String {
        match self.call(message.clone()) {
            HostReply::Error { code, .. } => code,
            HostReply::Ok { result } => panic!("{message} unexpectedly returned {result}"),
        }
    }

    fn next_event(&self) -> (String, RemoteEvent) {
        let envelope = self.events.recv_timeout(WAIT).unwrap();
        let event = RemoteEvent::decode(&envelope.payload).unwrap();
        (envelope.channel, event)
    }

    fn create_preview(&self, identifier: i64) {
        self.ok(json!({"method": "PreviewHostApi.create", "identifier": identifier}));
    }

    fn set_surface_provider(&self, identifier: i64) -> i64 {
        self.ok(json!({"method": "PreviewHostApi.setSurfaceProvider", "identifier": identifier}))
            .as_i64()
            .unwrap()
    }
}

#[test]
fn resolution_info_reports_the_native_resolution() {
    let harness = Harness::new();
    harness.create_preview(1);

    let info = harness.ok(json!({"method": "PreviewHostApi.getResolutionInfo", "identifier": 1}));
    assert_eq!(info, json!({"width": 1920, "height": 1080}));
}

#[test]
fn target_resolutions_are_forwarded() {
    let harness = Harness::new();
    harness.ok(json!({
        "method": "PreviewHostApi.create",
        "identifier": 1,
        "rotation": 1,
        "target_resolution": {"width": 640, "height": 480},
    }));

    let previews = harness.camerax.previews();
    let preview = &previews[0];
    assert_eq!(preview.spec().target_resolution, Some(Size::new(640, 480)));
    assert_eq!(preview.target_rotation(), Rotation::Rotation90);
}

#[test]
fn unknown_identifiers_are_reported() {
    let harness = Harness::new();
    let code = harness.error_code(json!({"method": "PreviewHostApi.getResolutionInfo", "identifier": 9}));
    assert_eq!(code, "not-found");
}

#[test]
fn identifiers_of_the_wrong_kind_are_reported() {
    let harness = Harness::new();
    harness.ok(json!({"method": "QualitySelectorHostApi.create", "identifier": 4, "quality": "hd"}));
    let code = harness.error_code(json!({"method": "PreviewHostApi.getResolutionInfo", "identifier": 4}));
    assert_eq!(code, "wrong-kind");
}

#[test]
fn identifiers_cannot_be_reused() {
    let harness = Harness::new();
    harness.create_preview(1);
    let code = harness.error_code(json!({"method": "PreviewHostApi.create", "identifier": 1}));
    assert_eq!(code, "identifier-in-use");
}

#[test]
fn malformed_messages_get_an_error_reply() {
    let harness = Harness::new();
    let reply = harness.bridge.handle_message(b"{not json");
    match HostReply::decode(&reply).unwrap() {
        HostReply::Error { code, .. } => assert_eq!(code, "malformed-message"),
        other => panic!("unexpected reply {other:?}"),
    }
}

#[test]
fn replacing_a_surface_provider_releases_the_old_producer() {
    let harness = Harness::new();
    harness.create_preview(1);

    let first = harness.set_surface_provider(1);
    let second = harness.set_surface_provider(1);
    assert_ne!(first, second);

    let first = harness.textures.producer(first).unwrap();
    let second = harness.textures.producer(second).unwrap();
    assert_eq!(first.releases().get(), 1);
    assert_eq!(second.releases().get(), 0);
    assert_eq!(second.texture().buffer_size(), Some(Size::new(1920, 1080)));
}

#[test]
fn releasing_the_flutter_texture_releases_the_latest_producer() {
    let harness = Harness::new();
    harness.create_preview(1);
    let producer = harness.set_surface_provider(1);

    harness.ok(json!({"method": "PreviewHostApi.releaseFlutterSurfaceTexture"}));
    let producer = harness.textures.producer(producer).unwrap();
    assert_eq!(producer.releases().get(), 1);

    harness.ok(json!({"method": "PreviewHostApi.releaseFlutterSurfaceTexture"}));
    assert_eq!(producer.releases().get(), 1);
}

#[test]
fn disposing_a_preview_releases_its_producer() {
    let harness = Harness::new();
    harness.create_preview(1);
    let producer = harness.set_surface_provider(1);

    harness.ok(json!({"method": "InstanceManagerHostApi.dispose", "identifier": 1}));
    assert_eq!(harness.textures.producer(producer).unwrap().releases().get(), 1);

    let code = harness.error_code(json!({"method": "PreviewHostApi.getResolutionInfo", "identifier": 1}));
    assert_eq!(code, "not-found");
}

#[test]
fn clearing_releases_every_producer() {
    let harness = Harness::new();
    harness.create_preview(1);
    harness.create_preview(2);
    harness.set_surface_provider(1);
    harness.set_surface_provider(2);

    harness.ok(json!({"method": "InstanceManagerHostApi.clear"}));
    for producer in harness.textures.producers() {
        assert_eq!(producer.releases().get(), 1);
    }
    assert!(harness.bridge.instance_manager().is_empty());
}

#[test]
fn unusable_surfaces_are_reported_as_camera_errors() {
    let harness = Harness::new();
    harness.camerax.script_result(ResultCode::INVALID_SURFACE);
    harness.create_preview(1);
    let producer = harness.set_surface_provider(1);

    let (channel, event) = harness.next_event();
    assert_eq!(channel, "SystemServicesFlutterApi.onCameraError");
    assert_eq!(
        event,
        RemoteEvent::CameraError {
            description: "2: Provided surface could not be used by the camera.".into()
        }
    );

    let texture = harness.textures.producer(producer).unwrap();
    assert!(texture.texture().surfaces_released().wait_for(1, WAIT));
    assert_eq!(texture.texture().surfaces_created().get(), 1);
}

#[test]
fn front_facing_previews_are_mirrored() {
    let harness = Harness::with_camera(LoopbackConfig::default().with_lens_facing(LensFacing::Front));
    harness.create_preview(1);
    harness.set_surface_provider(1);

    let transform = harness.camerax.previews()[0].last_transformation().unwrap();
    assert!(transform.horizontal_flip);
}

#[test]
fn video_captures_wrap_registered_recorders() {
    let harness = Harness::new();
    harness.ok(json!({"method": "QualitySelectorHostApi.create", "identifier": 10, "quality": "fhd"}));
    harness.ok(json!({"method": "RecorderHostApi.create", "identifier": 11, "quality_selector_id": 10}));

    let capture = harness
        .ok(json!({"method": "VideoCaptureHostApi.withOutput", "output_id": 11}))
        .as_i64()
        .unwrap();
    assert!(capture >= 65536);

    let (channel, event) = harness.next_event();
    assert_eq!(channel, "VideoCaptureFlutterApi.create");
    assert_eq!(event, RemoteEvent::VideoCaptureCreated { identifier: capture });

    let output = harness.ok(json!({"method": "VideoCaptureHostApi.getOutput", "identifier": capture}));
    assert_eq!(output, json!(11));
}

#[test]
fn outputs_without_an_identifier_are_reported() {
    let harness = Harness::new();
    harness.ok(json!({"method": "VideoCaptureHostApi.create", "identifier": 5}));
    let code = harness.error_code(json!({"method": "VideoCaptureHostApi.getOutput", "identifier": 5}));
    assert_eq!(code, "unregistered");
}

#[test]
fn video_capture_rotation_is_validated() {
    let harness = Harness::with_camera(LoopbackConfig::default().with_lens_facing(LensFacing::Front));
    harness.ok(json!({"method": "VideoCaptureHostApi.create", "identifier": 5, "rotation": 2}));

    let captures = harness.camerax.video_captures();
    let capture = &captures[0];
    assert_eq!(capture.target_rotation(), Rotation::Rotation180);
    assert!(capture.transformation().unwrap().horizontal_flip);

    harness.ok(json!({"method": "VideoCaptureHostApi.setTargetRotation", "identifier": 5, "rotation": 3}));
    assert_eq!(capture.target_rotation(), Rotation::Rotation270);

    let code = harness.error_code(json!({"method": "VideoCaptureHostApi.setTargetRotation", "identifier": 5, "rotation": 7}));
    assert_eq!(code, "invalid-argument");
    assert_eq!(capture.target_rotation(), Rotation::Rotation270);
}

#[test]
fn preview_rotation_is_validated() {
    let harness = Harness::new();
    harness.create_preview(1);

    harness.ok(json!({"method": "PreviewHostApi.setTargetRotation", "identifier": 1, "rotation": 1}));
    let previews = harness.camerax.previews();
    assert_eq!(previews[0].target_rotation(), Rotation::Rotation90);

    let code = harness.error_code(json!({"method": "PreviewHostApi.setTargetRotation", "identifier": 1, "rotation": 4}));
    assert_eq!(code, "invalid-argument");
    assert_eq!(previews[0].target_rotation(), Rotation::Rotation90);
}

#[test]
fn diagnostics_leave_replies_unchanged() {
    let harness = Harness::build(
        BridgeConfig::default().with_diagnostics(true),
        LoopbackConfig::default(),
    );
    assert!(harness.bridge.diagnostics());
    assert!(!Harness::new().bridge.diagnostics());

    harness.create_preview(1);
    let info = harness.ok(json!({"method": "PreviewHostApi.getResolutionInfo", "identifier": 1}));
    assert_eq!(info, json!({"width": 1920, "height": 1080}));
    let code = harness.error_code(json!({"method": "PreviewHostApi.getResolutionInfo", "identifier": 2}));
    assert_eq!(code, "not-found");
}

#[test]
fn remote_identifiers_cannot_enter_the_host_range() {
    let harness = Harness::new();
    let code = harness.error_code(json!({"method": "PreviewHostApi.create", "identifier": 65536}));
    assert_eq!(code, "invalid-argument");
}
