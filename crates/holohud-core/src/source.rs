//! Landmark sources
//!
//! A source turns one video frame into a [`LandmarkFrame`]. The browser build
//! wraps a MediaPipe landmarker session; the CLI replays recorded results.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::config::VisionConfig;
use crate::demo::Demo;
use crate::error::TrackingError;
use crate::landmark::LandmarkFrame;

/// Per-frame landmark detector
///
/// Timestamps passed to [`detect`](LandmarkSource::detect) must be strictly
/// increasing for the lifetime of the session.
pub trait LandmarkSource {
    /// Whatever the detector reads pixels (or recorded results) from
    type Frame: ?Sized;

    fn detect(&mut self, frame: &Self::Frame, timestamp_ms: f64) -> Result<LandmarkFrame, TrackingError>;

    /// Release the underlying session
    fn close(&mut self) {}
}

/// MediaPipe running mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunningMode {
    Image,
    #[default]
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseOptions {
    pub model_asset_path: String,
}

/// Landmarker creation options, serialized as the JS options object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    pub base_options: BaseOptions,
    pub running_mode: RunningMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_hands: Option<u32>,
    #[serde(default)]
    pub output_facial_transformation_matrixes: bool,
}

impl SessionOptions {
    pub fn for_demo(demo: Demo, vision: &VisionConfig) -> Self {
        Self {
            base_options: BaseOptions {
                model_asset_path: vision.model_url(demo).to_string(),
            },
            running_mode: RunningMode::Video,
            num_hands: demo.num_hands(),
            output_facial_transformation_matrixes: demo.tracks_face(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// One recorded detection, as written by the capture tooling (one JSON object per line)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayFrame {
    /// `video.currentTime` in seconds
    pub video_time: f64,
    pub timestamp_ms: f64,
    #[serde(flatten)]
    pub result: LandmarkFrame,
}

/// Parse a JSON-lines recording; blank lines and `#` comments are skipped
pub fn parse_replay(text: &str) -> Result<Vec<ReplayFrame>, TrackingError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            serde_json::from_str(line)
                .map_err(|e| TrackingError::Parse(format!("line {}: {}", n + 1, e)))
        })
        .collect()
}

/// Read and parse a recording file
pub fn read_replay(path: &Path) -> crate::Result<Vec<ReplayFrame>> {
    let text = std::fs::read_to_string(path)?;
    let frames = parse_replay(&text)?;
    debug!(path = %path.display(), frames = frames.len(), "Loaded recording");
    Ok(frames)
}

/// Source that hands back recorded results, enforcing the timestamp contract
#[derive(Debug, Default)]
pub struct ReplaySource {
    last_timestamp: Option<f64>,
    detections: u64,
    closed: bool,
}

impl ReplaySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detections(&self) -> u64 {
        self.detections
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl LandmarkSource for ReplaySource {
    type Frame = ReplayFrame;

    fn detect(&mut self, frame: &ReplayFrame, timestamp_ms: f64) -> Result<LandmarkFrame, TrackingError> {
        if self.closed {
            return Err(TrackingError::Detect("replay source is closed".to_string()));
        }
        if let Some(previous) = self.last_timestamp {
            if timestamp_ms <= previous {
                return Err(TrackingError::NonMonotonicTimestamp {
                    previous,
                    current: timestamp_ms,
                });
            }
        }
        self.last_timestamp = Some(timestamp_ms);
        self.detections += 1;
        Ok(frame.result.clone())
    }

    fn close(&mut self) {
        debug!(detections = self.detections, "Closing replay source");
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HoloError;

    #[test]
    fn test_options_json_shape() {
        let vision = VisionConfig::default();

        let hand: serde_json::Value =
            serde_json::from_str(&SessionOptions::for_demo(Demo::City, &vision).to_json().unwrap()).unwrap();
        assert_eq!(hand["runningMode"], "VIDEO");
        assert_eq!(hand["numHands"], 2);
        assert_eq!(hand["outputFacialTransformationMatrixes"], false);
        assert_eq!(hand["baseOptions"]["modelAssetPath"], vision.hand_model_url.as_str());

        let face: serde_json::Value =
            serde_json::from_str(&SessionOptions::for_demo(Demo::Helmet, &vision).to_json().unwrap()).unwrap();
        assert!(face.get("numHands").is_none());
        assert_eq!(face["outputFacialTransformationMatrixes"], true);
        assert_eq!(face["baseOptions"]["modelAssetPath"], vision.face_model_url.as_str());
    }

    #[test]
    fn test_parse_replay() {
        let text = r#"
# recorded with two hands
{"videoTime": 0.033, "timestampMs": 100.0, "landmarks": [[{"x": 0.5, "y": 0.5}], [{"x": 0.1, "y": 0.1}]]}

{"videoTime": 0.066, "timestampMs": 133.0, "landmarks": []}
"#;
        let frames = parse_replay(text).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].result.set_count(), 2);
        assert_eq!(frames[1].timestamp_ms, 133.0);
        assert!(frames[1].result.is_empty());
    }

    #[test]
    fn test_read_replay_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = read_replay(&dir.path().join("absent.jsonl")).unwrap_err();
        assert!(matches!(missing, HoloError::Io(_)));

        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "{oops}\n").unwrap();
        let bad = read_replay(&path).unwrap_err();
        assert!(matches!(bad, HoloError::Tracking(TrackingError::Parse(_))));

        std::fs::write(&path, "{\"videoTime\": 0.1, \"timestampMs\": 5.0}\n").unwrap();
        assert_eq!(read_replay(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_replay_reports_line() {
        let err = parse_replay("{\"videoTime\": 0.0, \"timestampMs\": 1.0}\n{oops}\n").unwrap_err();
        match err {
            TrackingError::Parse(message) => assert!(message.starts_with("line 2"), "{}", message),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_replay_rejects_non_monotonic_timestamps() {
        let frame = ReplayFrame {
            video_time: 0.0,
            timestamp_ms: 0.0,
            result: LandmarkFrame::default(),
        };
        let mut source = ReplaySource::new();

        source.detect(&frame, 10.0).unwrap();
        source.detect(&frame, 11.0).unwrap();
        assert_eq!(
            source.detect(&frame, 11.0),
            Err(TrackingError::NonMonotonicTimestamp {
                previous: 11.0,
                current: 11.0
            })
        );
        assert!(source.detect(&frame, 5.0).is_err());
        assert_eq!(source.detections(), 2);
    }

    #[test]
    fn test_replay_closed() {
        let mut source = ReplaySource::new();
        source.close();
        assert!(source.is_closed());
        let frame = ReplayFrame {
            video_time: 0.0,
            timestamp_ms: 0.0,
            result: LandmarkFrame::default(),
        };
        assert!(matches!(source.detect(&frame, 1.0), Err(TrackingError::Detect(_))));
    }
}
