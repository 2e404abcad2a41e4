//! Webcam acquisition through `getUserMedia`

use holohud_core::{CameraBackend, CameraConstraints, StartupError};
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack};

use crate::vision::js_error;

/// Streams the webcam into the page's `<video>` element
pub struct BrowserCamera {
    video: HtmlVideoElement,
}

impl BrowserCamera {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self { video }
    }
}

fn video_constraints(constraints: &CameraConstraints) -> Result<JsValue, JsValue> {
    if constraints.is_unconstrained() {
        return Ok(JsValue::TRUE);
    }
    let video = Object::new();
    if let Some(width) = constraints.width {
        Reflect::set(&video, &"width".into(), &JsValue::from(width))?;
    }
    if let Some(height) = constraints.height {
        Reflect::set(&video, &"height".into(), &JsValue::from(height))?;
    }
    Ok(video.into())
}

impl CameraBackend for BrowserCamera {
    type Stream = MediaStream;

    async fn acquire(&self, constraints: &CameraConstraints) -> Result<MediaStream, StartupError> {
        let camera_error = |e: JsValue| StartupError::Camera(js_error(&e));

        let window = web_sys::window().ok_or_else(|| StartupError::Camera("No window".to_string()))?;
        let devices = window.navigator().media_devices().map_err(camera_error)?;

        let request = MediaStreamConstraints::new();
        request.set_video(&video_constraints(constraints).map_err(camera_error)?);

        let promise = devices
            .get_user_media_with_constraints(&request)
            .map_err(camera_error)?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(camera_error)?
            .dyn_into()
            .map_err(|_| StartupError::Camera("getUserMedia did not return a MediaStream".to_string()))?;

        self.video.set_src_object(Some(&stream));
        // autoplay may be blocked; the click that started us usually allows it
        if let Err(e) = self.video.play() {
            tracing::warn!("Video play() failed: {}", js_error(&e));
        }
        Ok(stream)
    }
}

/// Stop every track so the browser releases the camera
pub fn stop_stream(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}
