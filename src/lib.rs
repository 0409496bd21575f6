// This is free and unencumbered software released into the public domain.

//! Host-side bridge between a remote UI runtime and a CameraX-style native
//! camera framework.
//!
//! Native pipeline objects are addressed across the message boundary by
//! integer identifiers kept in an [`InstanceManager`](shared::InstanceManager).
//! Remote calls arrive as JSON messages and are dispatched by
//! [`Bridge`](shared::Bridge); notifications flow back as one-way events.

extern crate alloc;

pub mod cli;
pub mod shared;
