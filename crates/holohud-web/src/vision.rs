//! MediaPipe Tasks Vision bridge
//!
//! The host page exposes `FilesetResolver`, `FaceLandmarker` and `HandLandmarker`
//! as globals. Options go in as JSON, results come back through
//! `JSON.stringify` and parse straight into [`LandmarkFrame`].

use holohud_core::{Demo, LandmarkFrame, LandmarkSource, SessionOptions, StartupError, TrackingError, VisionBackend};
use js_sys::{Promise, JSON};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlVideoElement;

#[wasm_bindgen]
extern "C" {
    type FilesetResolver;

    #[wasm_bindgen(static_method_of = FilesetResolver, js_name = forVisionTasks, catch)]
    fn for_vision_tasks(base_path: &str) -> Result<Promise, JsValue>;
}

#[wasm_bindgen]
extern "C" {
    type HandLandmarker;

    #[wasm_bindgen(static_method_of = HandLandmarker, js_name = createFromOptions, catch)]
    fn create_hand_landmarker(fileset: &JsValue, options: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, js_name = detectForVideo, catch)]
    fn detect_for_video(this: &HandLandmarker, video: &HtmlVideoElement, timestamp: f64) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method)]
    fn close(this: &HandLandmarker);
}

#[wasm_bindgen]
extern "C" {
    type FaceLandmarker;

    #[wasm_bindgen(static_method_of = FaceLandmarker, js_name = createFromOptions, catch)]
    fn create_face_landmarker(fileset: &JsValue, options: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, js_name = detectForVideo, catch)]
    fn detect_for_video(this: &FaceLandmarker, video: &HtmlVideoElement, timestamp: f64) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method)]
    fn close(this: &FaceLandmarker);
}

/// Readable message for a thrown JS value
pub fn js_error(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

enum Landmarker {
    Hand(HandLandmarker),
    Face(FaceLandmarker),
}

/// Open landmarker session fed from the webcam video element
pub struct MediaPipeSession {
    landmarker: Landmarker,
    closed: bool,
}

impl LandmarkSource for MediaPipeSession {
    type Frame = HtmlVideoElement;

    fn detect(&mut self, video: &HtmlVideoElement, timestamp_ms: f64) -> Result<LandmarkFrame, TrackingError> {
        if self.closed {
            return Err(TrackingError::Detect("session is closed".to_string()));
        }
        let result = match &self.landmarker {
            Landmarker::Hand(hand) => hand.detect_for_video(video, timestamp_ms),
            Landmarker::Face(face) => face.detect_for_video(video, timestamp_ms),
        }
        .map_err(|e| TrackingError::Detect(js_error(&e)))?;

        let json = JSON::stringify(&result).map_err(|e| TrackingError::Parse(js_error(&e)))?;
        LandmarkFrame::from_json(&String::from(json))
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        match &self.landmarker {
            Landmarker::Hand(hand) => hand.close(),
            Landmarker::Face(face) => face.close(),
        }
        self.closed = true;
        tracing::info!("Landmarker closed");
    }
}

/// Creates the face landmarker for the helmet and the hand landmarker otherwise
pub struct MediaPipeVision {
    demo: Demo,
}

impl MediaPipeVision {
    pub fn new(demo: Demo) -> Self {
        Self { demo }
    }
}

impl VisionBackend for MediaPipeVision {
    type Session = MediaPipeSession;

    async fn open_session(
        &self,
        wasm_base_url: &str,
        options: &SessionOptions,
    ) -> Result<MediaPipeSession, StartupError> {
        let session_error = |e: JsValue| StartupError::Session(js_error(&e));

        let fileset = JsFuture::from(FilesetResolver::for_vision_tasks(wasm_base_url).map_err(session_error)?)
            .await
            .map_err(session_error)?;

        let json = options
            .to_json()
            .map_err(|e| StartupError::Session(e.to_string()))?;
        let options = JSON::parse(&json).map_err(session_error)?;

        let landmarker = if self.demo.tracks_face() {
            let created = JsFuture::from(FaceLandmarker::create_face_landmarker(&fileset, &options).map_err(session_error)?)
                .await
                .map_err(session_error)?;
            Landmarker::Face(created.unchecked_into())
        } else {
            let created = JsFuture::from(HandLandmarker::create_hand_landmarker(&fileset, &options).map_err(session_error)?)
                .await
                .map_err(session_error)?;
            Landmarker::Hand(created.unchecked_into())
        };

        Ok(MediaPipeSession {
            landmarker,
            closed: false,
        })
    }
}
