//! Replay recorded landmark streams through a demo's mapper

use anyhow::{Context, Result};
use holohud_core::{
    parse_replay, read_replay, Bounds, Controller, Demo, HudClock, LoopStats, Mapper, Normalization, Pose, RenderLoop,
    ReplayFrame, ReplaySource,
};
use std::path::Path;
use std::time::Duration;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::warn;

/// Where a replay ended up
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub demo: Demo,
    pub stats: LoopStats,
    pub pose: Option<Pose>,
    pub camera_depth: Option<f32>,
    pub dual_hand: bool,
    pub active_keys: Vec<String>,
    pub status: Option<&'static str>,
}

impl ReplayReport {
    fn from_stopped(mapper: Mapper, stats: LoopStats) -> Self {
        Self {
            demo: mapper.demo(),
            stats,
            pose: mapper.anchor_pose(),
            camera_depth: mapper.camera_depth(),
            dual_hand: mapper.dual_hand(),
            active_keys: mapper
                .keyboard()
                .map(|k| k.active_labels().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
            status: mapper.status_line(),
        }
    }

    pub fn print(&self) {
        println!("Replayed {} demo:", self.demo);
        println!(
            "  frames {}, detections {}, skipped {}, errors {}",
            self.stats.frames,
            self.stats.detections,
            self.stats.skipped(),
            self.stats.errors
        );
        match &self.pose {
            Some(pose) => {
                let (x, y, z) = pose.rotation.to_euler(glam::EulerRot::XYZ);
                println!("  translation {:.3?}", pose.translation.to_array());
                println!(
                    "  rotation (deg) [{:.1}, {:.1}, {:.1}]",
                    x.to_degrees(),
                    y.to_degrees(),
                    z.to_degrees()
                );
                println!("  scale {:.4}", pose.scale);
            }
            None => println!("  no pose (model never attached)"),
        }
        if let Some(depth) = self.camera_depth {
            println!("  camera depth {:.3}", depth);
        }
        if self.demo == Demo::City {
            println!("  dual hand {}", self.dual_hand);
        }
        if !self.active_keys.is_empty() {
            println!("  active keys {}", self.active_keys.join(" "));
        }
        if let Some(status) = self.status {
            println!("  {}", status);
        }
    }
}

/// Read and parse a JSON-lines recording
pub fn load(path: &Path) -> Result<Vec<ReplayFrame>> {
    read_replay(path).with_context(|| format!("Failed to read recording {}", path.display()))
}

/// Controller over a replay source, with the model bounds standing in for a loaded asset
pub fn controller(demo: Demo, model_bounds: &Bounds) -> Controller<ReplaySource> {
    let mut mapper = Mapper::for_demo(demo);
    if let Some(policy) = demo.normalize_policy() {
        mapper.attach_asset(Normalization::from_bounds(model_bounds, policy));
    }
    Controller::new(RenderLoop::new(ReplaySource::new()), mapper)
}

fn step(controller: &mut Controller<ReplaySource>, frame: &ReplayFrame) {
    if let Err(e) = controller.frame(frame, frame.video_time, frame.timestamp_ms) {
        warn!(video_time = frame.video_time, "Detection failed, keeping last pose: {}", e);
    }
}

/// Feed every frame as fast as possible
pub fn run(frames: &[ReplayFrame], demo: Demo, model_bounds: &Bounds) -> ReplayReport {
    let mut controller = controller(demo, model_bounds);
    for frame in frames {
        step(&mut controller, frame);
    }
    let (mapper, stats) = controller.stop();
    ReplayReport::from_stopped(mapper, stats)
}

/// Feed frames at their recorded pace while the HUD clock ticks alongside
pub async fn run_realtime(
    frames: &[ReplayFrame],
    demo: Demo,
    model_bounds: &Bounds,
    hud_refresh: Duration,
) -> Result<ReplayReport> {
    let mut controller = controller(demo, model_bounds);
    let mut hud = interval(hud_refresh);
    hud.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let start = Instant::now();
    let first = frames.first().map(|f| f.timestamp_ms).unwrap_or_default();

    for frame in frames {
        let due = due_at(start, frame.timestamp_ms - first).with_context(|| {
            format!(
                "Frame at {} ms is too far from the first frame to replay in real time",
                frame.timestamp_ms
            )
        })?;
        loop {
            tokio::select! {
                _ = sleep_until(due) => break,
                _ = hud.tick() => print_hud(),
            }
        }
        step(&mut controller, frame);
    }

    let (mapper, stats) = controller.stop();
    Ok(ReplayReport::from_stopped(mapper, stats))
}

/// When a frame `offset_ms` after the first one is due; `None` if that is not representable
fn due_at(start: Instant, offset_ms: f64) -> Option<Instant> {
    let offset = Duration::try_from_secs_f64((offset_ms / 1000.0).max(0.0)).ok()?;
    start.checked_add(offset)
}

pub fn print_hud() {
    let text = HudClock::now();
    println!("{}  {}", text.time, text.date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::io::Write;

    const CITY_RECORDING: &str = r#"# two hands on two frames, then a repeated video frame
{"videoTime": 0.033, "timestampMs": 1.0, "landmarks": [[{"x": 1.0, "y": 0.5}], [{"x": 0.2, "y": 0.5}]]}
{"videoTime": 0.066, "timestampMs": 2.0, "landmarks": [[{"x": 1.0, "y": 0.5}], [{"x": 0.2, "y": 0.5}]]}
{"videoTime": 0.066, "timestampMs": 3.0, "landmarks": []}
"#;

    fn write_recording(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn unit_bounds() -> Bounds {
        Bounds::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    #[test]
    fn test_replay_city_from_file() {
        let file = write_recording(CITY_RECORDING);
        let frames = load(file.path()).unwrap();
        assert_eq!(frames.len(), 3);

        let report = run(&frames, Demo::City, &unit_bounds());
        assert_eq!(report.stats.frames, 3);
        assert_eq!(report.stats.detections, 2);
        assert_eq!(report.stats.skipped(), 1);
        assert_eq!(report.stats.errors, 0);
        assert!(report.dual_hand);

        // two smoothing steps toward (1.0 - 0.5) * 2 = 1.0
        let (yaw, _, _) = report.pose.unwrap().rotation.to_euler(glam::EulerRot::YXZ);
        assert!((yaw - 0.19).abs() < 1e-4, "yaw {}", yaw);
    }

    #[test]
    fn test_replay_counts_stale_timestamps() {
        let text = r#"{"videoTime": 0.1, "timestampMs": 50.0, "landmarks": []}
{"videoTime": 0.2, "timestampMs": 50.0, "landmarks": [[{"x": 0.5, "y": 0.5}], [{"x": 0.5, "y": 0.5}]]}
"#;
        let frames = parse_replay(text).unwrap();
        let report = run(&frames, Demo::City, &unit_bounds());
        assert_eq!(report.stats.detections, 2);
        assert_eq!(report.stats.errors, 1);
        // the rejected frame never reached the mapper
        assert!(!report.dual_hand);
    }

    #[test]
    fn test_replay_computer_attaches_bounds() {
        let report = run(&[], Demo::Computer, &Bounds::new(Vec3::ZERO, Vec3::new(7.0, 1.0, 1.0)));
        let pose = report.pose.unwrap();
        assert!((pose.scale - 0.5).abs() < 1e-6);
        assert_eq!(report.camera_depth, Some(holohud_core::mapper::INITIAL_CAMERA_DEPTH));
        assert!(report.active_keys.is_empty());
    }

    #[test]
    fn test_missing_recording() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.jsonl")).unwrap_err();
        assert!(err.to_string().contains("Failed to read recording"));
    }

    #[tokio::test]
    async fn test_realtime_replay_matches_fast_replay() {
        let frames = parse_replay(CITY_RECORDING).unwrap();
        let fast = run(&frames, Demo::City, &unit_bounds());
        let paced = run_realtime(&frames, Demo::City, &unit_bounds(), Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(paced.stats, fast.stats);
        assert_eq!(paced.pose, fast.pose);
    }

    #[tokio::test]
    async fn test_realtime_rejects_unreachable_timestamp() {
        let text = r#"{"videoTime": 0.1, "timestampMs": 0.0, "landmarks": []}
{"videoTime": 0.2, "timestampMs": 1e300, "landmarks": []}
"#;
        let frames = parse_replay(text).unwrap();
        let err = run_realtime(&frames, Demo::City, &unit_bounds(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("too far from the first frame"), "{}", err);
    }

    #[test]
    fn test_due_at_bounds() {
        let start = Instant::now();
        assert_eq!(due_at(start, -5.0), Some(start));
        assert_eq!(due_at(start, 1500.0), Some(start + Duration::from_millis(1500)));
        assert_eq!(due_at(start, 1e300), None);
        assert_eq!(due_at(start, f64::INFINITY), None);
    }
}
