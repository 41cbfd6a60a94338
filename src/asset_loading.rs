//! Asset loading: progress tracking, the player model and its fallback
//!
//! Nothing here is required for play. A model that fails to fetch or parse
//! is replaced by a procedural ghost, and a failed resource still counts as
//! finished so the loading screen never hangs.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while fetching or decoding an asset
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("model file is not valid JSON")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
    #[error("model has no triangles")]
    Empty,
    #[error("model index count {0} is not a multiple of 3")]
    RaggedIndices(usize),
    #[error("model index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },
    #[error("model has {colors} colors for {vertices} vertices")]
    ColorCount { colors: usize, vertices: usize },
}

/// Named loading notifications
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    Start(String),
    /// Percent complete, 0..=100
    Progress(String, f32),
    Complete(String),
    Error(String, String),
}

#[derive(Debug, Clone, PartialEq)]
struct Resource {
    name: String,
    progress: f32,
    done: bool,
    error: Option<String>,
}

/// Aggregates per-resource progress for the loading screen
#[derive(Debug, Clone, Default)]
pub struct LoadingTracker {
    resources: Vec<Resource>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event. Progress or completion for a resource that was never
    /// started is ignored.
    pub fn handle(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Start(name) => {
                if self.find(&name).is_none() {
                    log::debug!("Loading {}", name);
                    self.resources.push(Resource {
                        name,
                        progress: 0.0,
                        done: false,
                        error: None,
                    });
                }
            }
            LoadEvent::Progress(name, pct) => {
                if let Some(res) = self.find(&name) {
                    if !res.done {
                        res.progress = pct.clamp(0.0, 100.0);
                    }
                }
            }
            LoadEvent::Complete(name) => {
                if let Some(res) = self.find(&name) {
                    res.progress = 100.0;
                    res.done = true;
                    log::debug!("Loaded {}", res.name);
                }
            }
            LoadEvent::Error(name, reason) => {
                if let Some(res) = self.find(&name) {
                    log::warn!("Failed to load {}: {}", res.name, reason);
                    res.progress = 100.0;
                    res.done = true;
                    res.error = Some(reason);
                }
            }
        }
    }

    fn find(&mut self, name: &str) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.name == name)
    }

    /// Overall percent: mean of every started resource
    pub fn progress(&self) -> f32 {
        if self.resources.is_empty() {
            return 0.0;
        }
        self.resources.iter().map(|r| r.progress).sum::<f32>() / self.resources.len() as f32
    }

    /// At least one resource started and every started one is done or failed
    pub fn is_finished(&self) -> bool {
        !self.resources.is_empty() && self.resources.iter().all(|r| r.done)
    }

    /// Names and reasons of resources that failed
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.resources
            .iter()
            .filter_map(|r| r.error.as_deref().map(|e| (r.name.as_str(), e)))
    }
}

/// Mesh as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelData {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Per-vertex RGB; the ghost body color is used when absent
    #[serde(default)]
    pub colors: Option<Vec<[f32; 3]>>,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl ModelData {
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let data: ModelData = serde_json::from_str(json).map_err(|source| AssetError::Parse { source })?;
        data.validate()?;
        Ok(data)
    }

    pub fn validate(&self) -> Result<(), AssetError> {
        if self.indices.is_empty() {
            return Err(AssetError::Empty);
        }
        if self.indices.len() % 3 != 0 {
            return Err(AssetError::RaggedIndices(self.indices.len()));
        }
        let vertices = self.positions.len();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertices) {
            return Err(AssetError::IndexOutOfRange { index, vertices });
        }
        if let Some(colors) = &self.colors {
            if colors.len() != vertices {
                return Err(AssetError::ColorCount {
                    colors: colors.len(),
                    vertices,
                });
            }
        }
        Ok(())
    }
}

/// Ghost body purple
pub const BODY_COLOR: [f32; 3] = [0.42, 0.24, 0.62];
const EYE_COLOR: [f32; 3] = [0.95, 0.15, 0.2];
const GRIN_COLOR: [f32; 3] = [0.95, 0.95, 0.95];

/// Player mesh in model space: feet at y = 0, front facing +Z
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerModel {
    pub positions: Vec<Vec3>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// True when the procedural stand-in is in use
    pub is_fallback: bool,
}

impl PlayerModel {
    pub fn from_data(data: &ModelData) -> Self {
        let positions = data
            .positions
            .iter()
            .map(|&p| Vec3::from(p) * data.scale)
            .collect::<Vec<_>>();
        let colors = data
            .colors
            .clone()
            .unwrap_or_else(|| vec![BODY_COLOR; positions.len()]);
        Self {
            positions,
            colors,
            indices: data.indices.clone(),
            is_fallback: false,
        }
    }

    /// Use the loaded model, or the procedural ghost if loading failed
    pub fn from_result(result: Result<ModelData, AssetError>) -> Self {
        match result {
            Ok(data) => Self::from_data(&data),
            Err(e) => {
                log::warn!("Player model unavailable ({}), using fallback", e);
                Self::fallback()
            }
        }
    }

    /// Round purple ghost with spikes, red eyes and a white grin
    pub fn fallback() -> Self {
        let mut model = Self {
            positions: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
            is_fallback: true,
        };
        model.add_sphere(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.8, 0.75, 0.7), 12, BODY_COLOR);
        for (x, tilt) in [(-0.45, -0.5), (0.0, 0.0), (0.45, 0.5)] {
            model.add_spike(Vec3::new(x, 1.55, -0.1), 0.18, 0.45, tilt, BODY_COLOR);
        }
        for x in [-0.28, 0.28] {
            model.add_sphere(Vec3::new(x, 1.2, 0.6), Vec3::splat(0.12), 6, EYE_COLOR);
        }
        model.add_sphere(Vec3::new(0.0, 0.85, 0.62), Vec3::new(0.4, 0.08, 0.1), 8, GRIN_COLOR);
        model
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Ellipsoid with per-axis radii
    fn add_sphere(&mut self, center: Vec3, radii: Vec3, segments: u32, color: [f32; 3]) {
        let base = self.positions.len() as u32;
        let rings = segments.max(3);
        let sectors = segments.max(3) * 2;
        for i in 0..=rings {
            let theta = i as f32 / rings as f32 * std::f32::consts::PI;
            for j in 0..=sectors {
                let phi = j as f32 / sectors as f32 * std::f32::consts::TAU;
                let unit = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                self.positions.push(center + unit * radii);
                self.colors.push(color);
            }
        }
        let stride = sectors + 1;
        for i in 0..rings {
            for j in 0..sectors {
                let a = base + i * stride + j;
                let b = a + stride;
                let c = b + 1;
                let d = a + 1;
                self.indices.extend_from_slice(&[a, c, b, a, d, c]);
            }
        }
    }

    /// Four-sided spike pointing up, leaning sideways by `tilt`
    fn add_spike(&mut self, base_center: Vec3, radius: f32, height: f32, tilt: f32, color: [f32; 3]) {
        let base = self.positions.len() as u32;
        let apex = base_center + Vec3::new(tilt * height * 0.5, height, 0.0);
        self.positions.push(apex);
        self.colors.push(color);
        const SIDES: u32 = 4;
        for k in 0..SIDES {
            let phi = k as f32 / SIDES as f32 * std::f32::consts::TAU;
            self.positions.push(base_center + Vec3::new(phi.cos(), 0.0, phi.sin()) * radius);
            self.colors.push(color);
        }
        for k in 0..SIDES {
            let cur = base + 1 + k;
            let next = base + 1 + (k + 1) % SIDES;
            self.indices.extend_from_slice(&[base, next, cur]);
        }
    }
}

/// Fetch a text resource, reporting through `on_event`
#[cfg(target_arch = "wasm32")]
pub async fn fetch_text(url: &str, mut on_event: impl FnMut(LoadEvent)) -> Result<String, AssetError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fail = |reason: String| AssetError::Fetch {
        url: url.to_string(),
        reason,
    };

    on_event(LoadEvent::Start(url.to_string()));
    let result = async {
        let window = web_sys::window().ok_or_else(|| fail("no window".into()))?;
        let response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| fail(format!("{:?}", e)))?;
        let response: web_sys::Response = response.dyn_into().map_err(|_| fail("not a Response".into()))?;
        if !response.ok() {
            return Err(fail(format!("HTTP {}", response.status())));
        }
        on_event(LoadEvent::Progress(url.to_string(), 50.0));
        let text = response.text().map_err(|e| fail(format!("{:?}", e)))?;
        let text = JsFuture::from(text).await.map_err(|e| fail(format!("{:?}", e)))?;
        text.as_string().ok_or_else(|| fail("body is not text".into()))
    }
    .await;

    match &result {
        Ok(_) => on_event(LoadEvent::Complete(url.to_string())),
        Err(e) => on_event(LoadEvent::Error(url.to_string(), e.to_string())),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_progress_and_finish() {
        let mut tracker = LoadingTracker::new();
        assert!(!tracker.is_finished());

        tracker.handle(LoadEvent::Start("model".into()));
        tracker.handle(LoadEvent::Start("tuning".into()));
        tracker.handle(LoadEvent::Progress("model".into(), 50.0));
        assert_eq!(tracker.progress(), 25.0);
        assert!(!tracker.is_finished());

        tracker.handle(LoadEvent::Complete("model".into()));
        tracker.handle(LoadEvent::Error("tuning".into(), "404".into()));
        assert_eq!(tracker.progress(), 100.0);
        assert!(tracker.is_finished());
        assert_eq!(tracker.failures().collect::<Vec<_>>(), vec![("tuning", "404")]);
    }

    #[test]
    fn test_tracker_ignores_unknown_and_duplicates() {
        let mut tracker = LoadingTracker::new();
        tracker.handle(LoadEvent::Complete("ghost".into()));
        assert!(!tracker.is_finished());

        tracker.handle(LoadEvent::Start("a".into()));
        tracker.handle(LoadEvent::Start("a".into()));
        tracker.handle(LoadEvent::Complete("a".into()));
        tracker.handle(LoadEvent::Complete("a".into()));
        assert!(tracker.is_finished());
        assert_eq!(tracker.progress(), 100.0);

        // Late progress doesn't reopen a finished resource
        tracker.handle(LoadEvent::Progress("a".into(), 10.0));
        assert_eq!(tracker.progress(), 100.0);
    }

    #[test]
    fn test_model_json_round() {
        let json = r#"{
            "positions": [[0,0,0],[1,0,0],[0,1,0]],
            "indices": [0,1,2],
            "scale": 2.0
        }"#;
        let data = ModelData::from_json(json).unwrap();
        let model = PlayerModel::from_data(&data);
        assert_eq!(model.positions[1], Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(model.colors, vec![BODY_COLOR; 3]);
        assert!(!model.is_fallback);
    }

    #[test]
    fn test_model_validation() {
        let bad_index = r#"{ "positions": [[0,0,0]], "indices": [0,0,5] }"#;
        assert!(matches!(
            ModelData::from_json(bad_index),
            Err(AssetError::IndexOutOfRange { index: 5, vertices: 1 })
        ));
        let ragged = r#"{ "positions": [[0,0,0]], "indices": [0,0] }"#;
        assert!(matches!(ModelData::from_json(ragged), Err(AssetError::RaggedIndices(2))));
        assert!(matches!(ModelData::from_json("[]"), Err(AssetError::Parse { .. })));
        let colors = r#"{ "positions": [[0,0,0]], "indices": [0,0,0], "colors": [] }"#;
        assert!(matches!(ModelData::from_json(colors), Err(AssetError::ColorCount { .. })));
    }

    #[test]
    fn test_fallback_on_error() {
        let model = PlayerModel::from_result(Err(AssetError::Empty));
        assert!(model.is_fallback);
        assert!(model.triangle_count() > 0);
        assert_eq!(model.positions.len(), model.colors.len());
        assert!(model.indices.iter().all(|&i| (i as usize) < model.positions.len()));
        // Stands on the ground
        let min_y = model.positions.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!(min_y >= 0.0);
    }

    #[test]
    fn test_shipped_model_parses() {
        let json = include_str!("../assets/ghost.json");
        let data = ModelData::from_json(json).unwrap();
        assert!(!PlayerModel::from_data(&data).positions.is_empty());
    }
}
