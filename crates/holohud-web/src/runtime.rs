//! Browser runtime: start button, staged startup and per-frame detection
//!
//! The landmarker and the media stream are JS handles, so they live in a
//! non-send resource. Startup runs in `spawn_local` and reports back through a
//! mailbox drained once per frame.

use bevy::prelude::*;
use holohud_core::{Config, Demo, RenderLoop, Startup, StartupError};
use holohud_scene::{DetectionInbox, HoloSet, StatusLine};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlVideoElement, MediaStream};

use crate::camera::{stop_stream, BrowserCamera};
use crate::page::{self, START_BUTTON_ID, VIDEO_ID};
use crate::vision::{MediaPipeSession, MediaPipeVision};

/// `HTMLMediaElement.HAVE_CURRENT_DATA`
const HAVE_CURRENT_DATA: u16 = 2;

const STANDBY: &str = "JARVIS: STANDING BY. PRESS START.";
const INITIALIZING: &str = "JARVIS: INITIALIZING VISION CORE...";

/// Messages from the startup task to the app
pub enum StartupUpdate {
    Progress(String),
    Ready(RenderLoop<MediaPipeSession>, MediaStream),
    Failed(StartupError),
}

type Mailbox = Rc<RefCell<VecDeque<StartupUpdate>>>;

/// JS-side state of the running demo
pub struct BrowserDemo {
    demo: Demo,
    config: Config,
    mailbox: Mailbox,
    video: Option<HtmlVideoElement>,
    render_loop: Option<RenderLoop<MediaPipeSession>>,
    stream: Option<MediaStream>,
}

impl BrowserDemo {
    pub fn new(demo: Demo, config: Config) -> Self {
        Self {
            demo,
            config,
            mailbox: Rc::default(),
            video: page::video_element(),
            render_loop: None,
            stream: None,
        }
    }

    /// Close the landmarker and release the camera
    pub fn stop(&mut self) {
        if let Some(render_loop) = self.render_loop.take() {
            let stats = render_loop.close();
            tracing::info!(
                detections = stats.detections,
                skipped = stats.skipped(),
                errors = stats.errors,
                "Demo stopped"
            );
        }
        if let Some(stream) = self.stream.take() {
            stop_stream(&stream);
            if let Some(video) = &self.video {
                video.set_src_object(None);
            }
        }
    }
}

impl Drop for BrowserDemo {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct RuntimePlugin {
    pub demo: Demo,
    pub config: Config,
}

impl Plugin for RuntimePlugin {
    fn build(&self, app: &mut App) {
        app.insert_non_send_resource(BrowserDemo::new(self.demo, self.config.clone()))
            .add_systems(Startup, bind_start_button)
            .add_systems(
                Update,
                (receive_startup, detect_frame).chain().in_set(HoloSet::Detect),
            )
            .add_systems(Last, stop_on_exit);
    }
}

/// Wire `#startBtn` to the start sequence; it runs at most once
fn bind_start_button(demo: NonSend<BrowserDemo>, mut status: ResMut<StatusLine>) {
    let Some(button) = page::element(START_BUTTON_ID) else {
        tracing::error!("Start button #{} not found", START_BUTTON_ID);
        status.error(format!("Start button #{} not found", START_BUTTON_ID));
        return;
    };
    let Some(video) = demo.video.clone() else {
        tracing::error!("Video element #{} not found", VIDEO_ID);
        status.error(format!("Video element #{} not found", VIDEO_ID));
        return;
    };
    status.info(STANDBY);

    let kind = demo.demo;
    let config = demo.config.clone();
    let mailbox = demo.mailbox.clone();
    let started = Rc::new(Cell::new(false));
    let button_handle = button.clone();

    let on_click = Closure::wrap(Box::new(move || {
        if started.replace(true) {
            return;
        }
        page::set_display(&button_handle, "none");

        let config = config.clone();
        let mailbox = mailbox.clone();
        let video = video.clone();
        wasm_bindgen_futures::spawn_local(async move {
            mailbox
                .borrow_mut()
                .push_back(StartupUpdate::Progress(INITIALIZING.to_string()));

            let mut startup = Startup::new(kind, &config);
            let vision = MediaPipeVision::new(kind);
            let camera = BrowserCamera::new(video);
            let update = match startup.run(&vision, &camera).await {
                Ok((render_loop, stream)) => StartupUpdate::Ready(render_loop, stream),
                Err(e) => StartupUpdate::Failed(e),
            };
            mailbox.borrow_mut().push_back(update);
        });
    }) as Box<dyn FnMut()>);

    button.set_onclick(Some(on_click.as_ref().unchecked_ref()));
    on_click.forget();
}

fn receive_startup(mut demo: NonSendMut<BrowserDemo>, mut status: ResMut<StatusLine>) {
    loop {
        let update = demo.mailbox.borrow_mut().pop_front();
        let Some(update) = update else { break };

        match update {
            StartupUpdate::Progress(message) => status.info(message),
            StartupUpdate::Ready(render_loop, stream) => {
                tracing::info!(demo = %demo.demo, "Tracking started");
                status.clear();
                demo.render_loop = Some(render_loop);
                demo.stream = Some(stream);
            }
            StartupUpdate::Failed(e) => {
                tracing::error!("Demo failed to start: {}", e);
                status.error(format!("JARVIS: {}", e));
            }
        }
    }
}

/// One detection per new video frame, results go to the scene's inbox
fn detect_frame(mut demo: NonSendMut<BrowserDemo>, mut inbox: ResMut<DetectionInbox>) {
    let demo = &mut *demo;
    let (Some(render_loop), Some(video)) = (demo.render_loop.as_mut(), demo.video.as_ref()) else {
        return;
    };
    if video.ready_state() < HAVE_CURRENT_DATA {
        return;
    }

    match render_loop.tick(video, video.current_time(), page::now_ms()) {
        Ok(Some(frame)) => inbox.push(frame),
        Ok(None) => {}
        Err(e) => tracing::warn!("Detection failed, keeping last pose: {}", e),
    }
}

fn stop_on_exit(mut exit: MessageReader<AppExit>, mut demo: NonSendMut<BrowserDemo>) {
    if exit.read().next().is_some() {
        demo.stop();
    }
}
