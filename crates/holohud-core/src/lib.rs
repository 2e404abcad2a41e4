//! HoloHUD Core - Per-frame overlay logic shared by the browser app and the CLI
//!
//! This crate holds everything that does not depend on a renderer or a browser:
//! - Bounding-box normalization for loaded 3D assets
//! - MediaPipe landmark result types
//! - Pose mappers for the helmet, computer and city demos
//! - Video-time frame gating and the staged startup sequence
//! - Procedural city layout
//! - HUD clock formatting and configuration

pub mod bounds;
pub mod city;
pub mod config;
pub mod demo;
pub mod error;
pub mod hud;
pub mod keys;
pub mod landmark;
pub mod mapper;
pub mod render_loop;
pub mod smooth;
pub mod source;
pub mod startup;

pub use bounds::{Bounds, Normalization, NormalizePolicy};
pub use city::{Building, CityLayout};
pub use config::Config;
pub use demo::Demo;
pub use error::{ConfigError, HoloError, Result, StartupError, TrackingError};
pub use hud::{HudClock, HudText};
pub use keys::{Keyboard, VirtualKey};
pub use landmark::{HandLandmark, Landmark, LandmarkFrame, LandmarkSet};
pub use mapper::{CityYaw, FaceFollow, HandOrbit, Mapper, Pose};
pub use render_loop::{Controller, FrameGate, LoopStats, RenderLoop};
pub use source::{parse_replay, read_replay, LandmarkSource, ReplayFrame, ReplaySource, RunningMode, SessionOptions};
pub use startup::{CameraBackend, CameraConstraints, Stage, Startup, VisionBackend};
