use eframe::egui::{Pos2, Vec2};

pub(crate) const MIN_SCALE: f32 = 0.1;
pub(crate) const MAX_SCALE: f32 = 8.0;

/// Pan/zoom mapping from layout space to canvas space:
/// `screen = world * scale + translation`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Viewport {
    scale: f32,
    translation: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: Vec2::ZERO,
        }
    }
}

impl Viewport {
    pub(crate) fn scale(&self) -> f32 {
        self.scale
    }

    pub(crate) fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Scales around `focal` (canvas space) so the layout point under it does
    /// not move. The resulting scale is clamped to the zoom bounds.
    pub(crate) fn zoom_by(&mut self, factor: f32, focal: Pos2) {
        if !factor.is_finite() || factor <= 0.0 || !focal.is_finite() {
            return;
        }

        let world_focal = self.to_world(focal);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.translation = focal.to_vec2() - world_focal * self.scale;
    }

    pub(crate) fn pan_by(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.translation += delta;
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn to_screen(&self, world: Vec2) -> Pos2 {
        (world * self.scale + self.translation).to_pos2()
    }

    pub(crate) fn to_world(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.translation) / self.scale
    }
}
