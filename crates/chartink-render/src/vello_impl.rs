//! Vello painter.

use crate::renderer::{Painter, TextLabel};
use kurbo::{Affine, BezPath, Stroke};
use peniko::{Color, Fill};
use vello::Scene;

/// Paints primitives into a Vello scene.
///
/// Text is not shaped here: labels are collected for the host's text layer.
pub struct VelloPainter {
    scene: Scene,
    labels: Vec<TextLabel>,
    transform: Affine,
}

impl Default for VelloPainter {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloPainter {
    pub fn new() -> Self {
        Self::with_transform(Affine::IDENTITY)
    }

    /// Painter placing pane pixels with `transform`, e.g. the pane's offset
    /// inside the window.
    pub fn with_transform(transform: Affine) -> Self {
        Self {
            scene: Scene::new(),
            labels: Vec::new(),
            transform,
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    pub fn take_labels(&mut self) -> Vec<TextLabel> {
        std::mem::take(&mut self.labels)
    }

    /// Clear the scene and labels for the next frame.
    pub fn reset(&mut self) {
        self.scene.reset();
        self.labels.clear();
    }
}

impl Painter for VelloPainter {
    fn stroke(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        self.scene.stroke(stroke, self.transform, color, None, path);
    }

    fn fill(&mut self, path: &BezPath, color: Color) {
        self.scene.fill(Fill::NonZero, self.transform, color, None, path);
    }

    fn text(&mut self, label: TextLabel) {
        let position = self.transform * label.position;
        self.labels.push(TextLabel { position, ..label });
    }
}
