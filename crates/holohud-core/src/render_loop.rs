//! Frame-gated detection loop
//!
//! Display frames arrive faster than video frames. Detection runs only when the
//! video's current time moved since the last detection, and the mapper is applied
//! once per detection.

use tracing::{debug, warn};

use crate::error::TrackingError;
use crate::landmark::LandmarkFrame;
use crate::mapper::Mapper;
use crate::source::LandmarkSource;

/// Remembers the last video time a detection ran for
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameGate {
    last_video_time: Option<f64>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true (and records the time) when `video_time` differs from the last one
    pub fn advance(&mut self, video_time: f64) -> bool {
        if self.last_video_time == Some(video_time) {
            return false;
        }
        self.last_video_time = Some(video_time);
        true
    }

    pub fn last_video_time(&self) -> Option<f64> {
        self.last_video_time
    }

    pub fn reset(&mut self) {
        self.last_video_time = None;
    }
}

/// Loop counters, logged on stop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Display frames seen
    pub frames: u64,
    /// Frames that ran detection
    pub detections: u64,
    /// Detections that failed
    pub errors: u64,
}

impl LoopStats {
    pub fn skipped(&self) -> u64 {
        self.frames - self.detections
    }
}

/// Owns the landmark source and the frame gate
#[derive(Debug)]
pub struct RenderLoop<S> {
    source: S,
    gate: FrameGate,
    stats: LoopStats,
}

impl<S: LandmarkSource> RenderLoop<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            gate: FrameGate::new(),
            stats: LoopStats::default(),
        }
    }

    /// One display frame: `None` when the video has not advanced
    pub fn tick(
        &mut self,
        frame: &S::Frame,
        video_time: f64,
        now_ms: f64,
    ) -> Result<Option<LandmarkFrame>, TrackingError> {
        self.stats.frames += 1;
        if !self.gate.advance(video_time) {
            return Ok(None);
        }

        self.stats.detections += 1;
        match self.source.detect(frame, now_ms) {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                self.stats.errors += 1;
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Close the source and return the final counters
    pub fn close(mut self) -> LoopStats {
        self.source.close();
        debug!(
            frames = self.stats.frames,
            detections = self.stats.detections,
            errors = self.stats.errors,
            "Render loop closed"
        );
        self.stats
    }
}

/// Top-level owner of a running demo: render loop plus the demo's mapper
#[derive(Debug)]
pub struct Controller<S> {
    render_loop: RenderLoop<S>,
    mapper: Mapper,
}

impl<S: LandmarkSource> Controller<S> {
    pub fn new(render_loop: RenderLoop<S>, mapper: Mapper) -> Self {
        Self { render_loop, mapper }
    }

    /// Run one display frame; returns true when the mapper's state changed.
    ///
    /// A failed detection leaves the mapper untouched.
    pub fn frame(&mut self, frame: &S::Frame, video_time: f64, now_ms: f64) -> Result<bool, TrackingError> {
        let Some(result) = self.render_loop.tick(frame, video_time, now_ms)? else {
            return Ok(false);
        };
        self.mapper.apply(&result)
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn mapper_mut(&mut self) -> &mut Mapper {
        &mut self.mapper
    }

    pub fn stats(&self) -> LoopStats {
        self.render_loop.stats()
    }

    /// Stop the demo, closing the session
    pub fn stop(self) -> (Mapper, LoopStats) {
        let stats = self.render_loop.close();
        if stats.errors > 0 {
            warn!(errors = stats.errors, "Demo stopped with failed detections");
        }
        (self.mapper, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::Demo;
    use crate::landmark::{Landmark, LandmarkSet};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Returns whatever frame it is handed and records timestamps
    #[derive(Default)]
    struct EchoSource {
        timestamps: Vec<f64>,
        fail: bool,
        closed: Rc<Cell<bool>>,
    }

    impl LandmarkSource for EchoSource {
        type Frame = LandmarkFrame;

        fn detect(&mut self, frame: &LandmarkFrame, timestamp_ms: f64) -> Result<LandmarkFrame, TrackingError> {
            self.timestamps.push(timestamp_ms);
            if self.fail {
                return Err(TrackingError::Detect("model not ready".to_string()));
            }
            Ok(frame.clone())
        }

        fn close(&mut self) {
            self.closed.set(true);
        }
    }

    fn one_hand(x: f32) -> LandmarkFrame {
        LandmarkFrame::with_sets(vec![LandmarkSet::new(vec![Landmark::new(x, 0.5, 0.0)])])
    }

    #[test]
    fn test_gate_skips_repeated_video_time() {
        let mut gate = FrameGate::new();
        assert!(gate.advance(0.0));
        assert!(!gate.advance(0.0));
        assert!(gate.advance(0.033));
        assert!(!gate.advance(0.033));
        assert!(gate.advance(0.0));
        gate.reset();
        assert!(gate.advance(0.0));
    }

    #[test]
    fn test_tick_detects_once_per_video_frame() {
        let mut render_loop = RenderLoop::new(EchoSource::default());
        let frame = LandmarkFrame::default();

        assert!(render_loop.tick(&frame, 1.0, 10.0).unwrap().is_some());
        assert!(render_loop.tick(&frame, 1.0, 26.0).unwrap().is_none());
        assert!(render_loop.tick(&frame, 1.0, 42.0).unwrap().is_none());
        assert!(render_loop.tick(&frame, 1.04, 58.0).unwrap().is_some());

        assert_eq!(render_loop.source().timestamps, [10.0, 58.0]);
        let stats = render_loop.stats();
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.detections, 2);
        assert_eq!(stats.skipped(), 2);
    }

    #[test]
    fn test_controller_applies_mapper_once_per_detection() {
        let mut controller = Controller::new(
            RenderLoop::new(EchoSource::default()),
            Mapper::for_demo(Demo::City),
        );
        let frame = one_hand(1.0);

        assert!(controller.frame(&frame, 0.1, 1.0).unwrap());
        let Mapper::City(city) = controller.mapper() else {
            panic!("expected city mapper");
        };
        let yaw = city.yaw();
        assert_eq!(yaw, 0.1);

        // same video time: no detection, yaw unchanged
        assert!(!controller.frame(&frame, 0.1, 2.0).unwrap());
        let Mapper::City(city) = controller.mapper() else {
            panic!("expected city mapper");
        };
        assert_eq!(city.yaw(), yaw);
    }

    #[test]
    fn test_failed_detection_keeps_pose() {
        let mut controller = Controller::new(
            RenderLoop::new(EchoSource::default()),
            Mapper::for_demo(Demo::City),
        );
        controller.frame(&one_hand(1.0), 0.1, 1.0).unwrap();
        let before = controller.mapper().anchor_pose();

        controller.render_loop.source_mut().fail = true;
        assert!(controller.frame(&one_hand(0.0), 0.2, 2.0).is_err());
        assert_eq!(controller.mapper().anchor_pose(), before);
        assert_eq!(controller.stats().errors, 1);
    }

    #[test]
    fn test_stop_closes_source() {
        let closed = Rc::new(Cell::new(false));
        let mut render_loop = RenderLoop::new(EchoSource {
            closed: closed.clone(),
            ..Default::default()
        });
        render_loop.tick(&LandmarkFrame::default(), 0.0, 1.0).unwrap();
        assert!(!closed.get());

        let controller = Controller::new(render_loop, Mapper::for_demo(Demo::Computer));
        let (mapper, stats) = controller.stop();
        assert_eq!(mapper.demo(), Demo::Computer);
        assert_eq!(stats.detections, 1);
        assert!(closed.get());
    }
}
