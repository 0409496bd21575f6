// This is free and unencumbered software released into the public domain.

mod bridge;
pub use bridge::*;

mod codec;
pub use codec::*;

mod config;
pub use config::*;

pub mod drivers {
    pub mod loopback;
}

mod error;
pub use error::*;

mod executor;
pub use executor::*;

mod flutter_api;
pub use flutter_api::*;

mod instance_manager;
pub use instance_manager::*;

mod messenger;
pub use messenger::*;

mod native;
pub use native::*;

mod preview;
pub use preview::*;

mod provider;
pub use provider::*;

mod recorder;
pub use recorder::*;

mod surface;
pub use surface::*;

mod types;
pub use types::*;

mod video_capture;
pub use video_capture::*;
