//! Staged start sequence
//!
//! `Idle -> SessionReady -> CameraReady -> Running`. The vision session is opened
//! first, then the camera; any failure moves to `Failed` and is returned to the
//! caller instead of leaving the demo half-started.

use std::fmt;
use tracing::{error, info};

use crate::config::{CameraConfig, Config};
use crate::demo::Demo;
use crate::error::StartupError;
use crate::render_loop::RenderLoop;
use crate::source::{LandmarkSource, SessionOptions};

/// Resolution requested for the helmet demo when the config leaves it unset
pub const HELMET_RESOLUTION: (u32, u32) = (1280, 720);

/// Opens landmarker sessions
#[allow(async_fn_in_trait)]
pub trait VisionBackend {
    type Session: LandmarkSource;

    async fn open_session(
        &self,
        wasm_base_url: &str,
        options: &SessionOptions,
    ) -> Result<Self::Session, StartupError>;
}

/// Acquires the webcam
#[allow(async_fn_in_trait)]
pub trait CameraBackend {
    type Stream;

    async fn acquire(&self, constraints: &CameraConstraints) -> Result<Self::Stream, StartupError>;
}

/// Video constraints; both unset means `video: true`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraConstraints {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl CameraConstraints {
    pub fn for_demo(demo: Demo, camera: &CameraConfig) -> Self {
        let (width, height) = match demo {
            Demo::Helmet => (
                Some(camera.width.unwrap_or(HELMET_RESOLUTION.0)),
                Some(camera.height.unwrap_or(HELMET_RESOLUTION.1)),
            ),
            _ => (camera.width, camera.height),
        };
        Self { width, height }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Idle,
    SessionReady,
    CameraReady,
    Running,
    Failed(StartupError),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::SessionReady => write!(f, "session ready"),
            Self::CameraReady => write!(f, "camera ready"),
            Self::Running => write!(f, "running"),
            Self::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Drives one demo from the start button to a running loop
#[derive(Debug)]
pub struct Startup {
    demo: Demo,
    wasm_base_url: String,
    options: SessionOptions,
    constraints: CameraConstraints,
    stage: Stage,
}

impl Startup {
    pub fn new(demo: Demo, config: &Config) -> Self {
        Self {
            demo,
            wasm_base_url: config.vision.wasm_base_url.clone(),
            options: SessionOptions::for_demo(demo, &config.vision),
            constraints: CameraConstraints::for_demo(demo, &config.camera),
            stage: Stage::Idle,
        }
    }

    pub fn demo(&self) -> Demo {
        self.demo
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn constraints(&self) -> CameraConstraints {
        self.constraints
    }

    /// Open the session, then the camera. Runs at most once.
    pub async fn run<V, C>(
        &mut self,
        vision: &V,
        camera: &C,
    ) -> Result<(RenderLoop<V::Session>, C::Stream), StartupError>
    where
        V: VisionBackend,
        C: CameraBackend,
    {
        if self.stage != Stage::Idle {
            return Err(StartupError::AlreadyStarted(self.stage.to_string()));
        }

        info!(demo = %self.demo, model = %self.options.base_options.model_asset_path, "Opening vision session");
        let mut session = match vision.open_session(&self.wasm_base_url, &self.options).await {
            Ok(session) => session,
            Err(e) => return Err(self.fail(e)),
        };
        self.stage = Stage::SessionReady;

        info!(width = ?self.constraints.width, height = ?self.constraints.height, "Requesting camera");
        let stream = match camera.acquire(&self.constraints).await {
            Ok(stream) => stream,
            Err(e) => {
                session.close();
                return Err(self.fail(e));
            }
        };
        self.stage = Stage::CameraReady;

        let render_loop = RenderLoop::new(session);
        self.stage = Stage::Running;
        info!(demo = %self.demo, "Demo running");
        Ok((render_loop, stream))
    }

    fn fail(&mut self, e: StartupError) -> StartupError {
        error!(demo = %self.demo, stage = %self.stage, "Startup failed: {}", e);
        self.stage = Stage::Failed(e.clone());
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackingError;
    use crate::landmark::LandmarkFrame;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Debug)]
    struct FakeSession {
        log: Log,
    }

    impl LandmarkSource for FakeSession {
        type Frame = ();

        fn detect(&mut self, _: &(), _: f64) -> Result<LandmarkFrame, TrackingError> {
            Ok(LandmarkFrame::default())
        }

        fn close(&mut self) {
            self.log.borrow_mut().push("close".to_string());
        }
    }

    struct FakeVision {
        log: Log,
        fail: bool,
    }

    impl VisionBackend for FakeVision {
        type Session = FakeSession;

        async fn open_session(&self, _: &str, options: &SessionOptions) -> Result<FakeSession, StartupError> {
            self.log
                .borrow_mut()
                .push(format!("session {:?}", options.num_hands));
            tokio::task::yield_now().await;
            if self.fail {
                return Err(StartupError::Session("model download failed".to_string()));
            }
            Ok(FakeSession { log: self.log.clone() })
        }
    }

    struct FakeCamera {
        log: Log,
        fail: bool,
    }

    impl CameraBackend for FakeCamera {
        type Stream = &'static str;

        async fn acquire(&self, constraints: &CameraConstraints) -> Result<&'static str, StartupError> {
            self.log
                .borrow_mut()
                .push(format!("camera {:?}x{:?}", constraints.width, constraints.height));
            if self.fail {
                return Err(StartupError::Camera("NotAllowedError".to_string()));
            }
            Ok("webcam")
        }
    }

    fn backends(session_fails: bool, camera_fails: bool) -> (Log, FakeVision, FakeCamera) {
        let log: Log = Rc::default();
        let vision = FakeVision {
            log: log.clone(),
            fail: session_fails,
        };
        let camera = FakeCamera {
            log: log.clone(),
            fail: camera_fails,
        };
        (log, vision, camera)
    }

    #[test]
    fn test_camera_constraints() {
        let camera = CameraConfig::default();
        assert_eq!(
            CameraConstraints::for_demo(Demo::Helmet, &camera),
            CameraConstraints {
                width: Some(1280),
                height: Some(720)
            }
        );
        assert!(CameraConstraints::for_demo(Demo::Computer, &camera).is_unconstrained());

        let custom = CameraConfig {
            width: Some(640),
            height: None,
        };
        assert_eq!(CameraConstraints::for_demo(Demo::Helmet, &custom).width, Some(640));
        assert_eq!(CameraConstraints::for_demo(Demo::City, &custom).width, Some(640));
    }

    #[tokio::test]
    async fn test_session_then_camera() {
        let (log, vision, camera) = backends(false, false);
        let mut startup = Startup::new(Demo::City, &Config::default());

        let (render_loop, stream) = startup.run(&vision, &camera).await.unwrap();
        assert_eq!(stream, "webcam");
        assert_eq!(*startup.stage(), Stage::Running);
        assert_eq!(render_loop.stats().frames, 0);
        assert_eq!(*log.borrow(), ["session Some(2)", "camera NonexNone"]);
    }

    #[tokio::test]
    async fn test_session_failure_skips_camera() {
        let (log, vision, camera) = backends(true, false);
        let mut startup = Startup::new(Demo::Helmet, &Config::default());

        let err = startup.run(&vision, &camera).await.unwrap_err();
        assert!(matches!(err, StartupError::Session(_)));
        assert_eq!(*startup.stage(), Stage::Failed(err));
        assert_eq!(*log.borrow(), ["session None"]);
    }

    #[tokio::test]
    async fn test_camera_failure_closes_session() {
        let (log, vision, camera) = backends(false, true);
        let mut startup = Startup::new(Demo::Helmet, &Config::default());

        let err = startup.run(&vision, &camera).await.unwrap_err();
        assert_eq!(err, StartupError::Camera("NotAllowedError".to_string()));
        assert_eq!(
            *log.borrow(),
            ["session None", "camera Some(1280)xSome(720)", "close"]
        );
    }

    #[tokio::test]
    async fn test_run_only_once() {
        let (_, vision, camera) = backends(false, false);
        let mut startup = Startup::new(Demo::Computer, &Config::default());

        startup.run(&vision, &camera).await.unwrap();
        let err = startup.run(&vision, &camera).await.unwrap_err();
        assert_eq!(err, StartupError::AlreadyStarted("running".to_string()));
    }
}
