//! Host page: URL parameters and DOM lookups

use holohud_core::Demo;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlVideoElement};

pub const CANVAS_SELECTOR: &str = "#holohud-canvas";
pub const START_BUTTON_ID: &str = "startBtn";
pub const VIDEO_ID: &str = "webcam";

/// Overrides read from `?demo=`, `?model=` and `?seed=`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageParams {
    pub demo: Option<Demo>,
    pub model: Option<String>,
    pub seed: Option<u64>,
}

impl PageParams {
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let demo = get("demo").and_then(|value| match value.parse::<Demo>() {
            Ok(demo) => Some(demo),
            Err(e) => {
                tracing::warn!("Ignoring demo parameter: {}", e);
                None
            }
        });
        let model = get("model").filter(|m| !m.trim().is_empty());
        let seed = get("seed").and_then(|s| s.parse().ok());
        Self { demo, model, seed }
    }

    /// Parameters of the current page, empty outside a browser
    pub fn from_location() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let Ok(href) = window.location().href() else {
            return Self::default();
        };
        match web_sys::Url::new(&href) {
            Ok(url) => {
                let params = url.search_params();
                Self::from_lookup(|key| params.get(key))
            }
            Err(_) => Self::default(),
        }
    }
}

pub fn video_element() -> Option<HtmlVideoElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(VIDEO_ID)?
        .dyn_into::<HtmlVideoElement>()
        .ok()
}

pub fn element(id: &str) -> Option<HtmlElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .dyn_into::<HtmlElement>()
        .ok()
}

pub fn set_display(element: &HtmlElement, display: &str) {
    element.style().set_property("display", display).ok();
}

/// `performance.now()` in milliseconds
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn params(pairs: &[(&str, &str)]) -> PageParams {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PageParams::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_demo_and_model() {
        let p = params(&[("demo", "Helmet"), ("model", "assets/mk42.glb")]);
        assert_eq!(p.demo, Some(Demo::Helmet));
        assert_eq!(p.model.as_deref(), Some("assets/mk42.glb"));
        assert_eq!(p.seed, None);
    }

    #[test]
    fn test_invalid_values_are_dropped() {
        let p = params(&[("demo", "tower"), ("model", "  "), ("seed", "abc")]);
        assert_eq!(p, PageParams::default());
        assert_eq!(params(&[("seed", "12")]).seed, Some(12));
    }
}
