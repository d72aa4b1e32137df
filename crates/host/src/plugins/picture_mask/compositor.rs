use scenepatch_protocol::PictureId;
use tracing::debug;

use crate::host::RenderLayer;

/// Reflects mask associations onto the engine's sprites.
///
/// Holds no state of its own: every call resolves ids against the render layer as it is now, so
/// stale ids after a scene rebuild are skipped rather than reported.
pub struct CompositorBinding<'r> {
    render: &'r mut dyn RenderLayer,
}

impl<'r> CompositorBinding<'r> {
    pub fn new(render: &'r mut dyn RenderLayer) -> Self {
        Self { render }
    }

    /// Returns whether both sprites resolved and the mask was applied.
    pub fn apply(&mut self, subject: PictureId, mask: PictureId) -> bool {
        let (Some(subject_visual), Some(mask_visual)) = (
            self.render.resolve_visual(subject),
            self.render.resolve_visual(mask),
        ) else {
            debug!(%subject, %mask, "sprite not found, mask not applied");
            return false;
        };

        self.render.set_mask(subject_visual, Some(mask_visual));
        true
    }

    pub fn remove(&mut self, subject: PictureId) -> bool {
        let Some(subject_visual) = self.render.resolve_visual(subject) else {
            debug!(%subject, "sprite not found, nothing to unmask");
            return false;
        };

        self.render.set_mask(subject_visual, None);
        true
    }
}
