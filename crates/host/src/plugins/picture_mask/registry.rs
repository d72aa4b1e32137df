use std::collections::{BTreeMap, BTreeSet};

use scenepatch_protocol::PictureId;
use tracing::debug;

use super::compositor::CompositorBinding;
use crate::host::HostContext;

/// Which picture masks which. The sprites' mask pointers are always derived from this map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaskRegistry {
    masks: BTreeMap<PictureId, PictureId>,
}

impl MaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, subject: PictureId) -> Option<PictureId> {
        self.masks.get(&subject).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PictureId, PictureId)> + '_ {
        self.masks.iter().map(|(subject, mask)| (*subject, *mask))
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Masks `subject` with `mask`, replacing any previous mask.
    ///
    /// Does nothing when `subject` isn't displayed. `mask` doesn't need to be displayed.
    /// Returns whether the association was recorded.
    pub fn set_mask(
        &mut self,
        ctx: &mut HostContext<'_>,
        subject: PictureId,
        mask: PictureId,
    ) -> bool {
        if !ctx.pictures.is_displayed(subject) {
            debug!(%subject, %mask, "subject is not displayed, ignoring mask");
            return false;
        }

        self.masks.insert(subject, mask);
        CompositorBinding::new(&mut *ctx.render).apply(subject, mask);
        true
    }

    pub fn clear_mask(&mut self, ctx: &mut HostContext<'_>, subject: PictureId) {
        self.masks.remove(&subject);

        if ctx.pictures.is_displayed(subject) {
            CompositorBinding::new(&mut *ctx.render).remove(subject);
        }
    }

    /// Clears every displayed picture and every registered subject.
    pub fn clear_all(&mut self, ctx: &mut HostContext<'_>) {
        let subjects: BTreeSet<_> = ctx
            .pictures
            .displayed_picture_ids()
            .into_iter()
            .chain(self.masks.keys().copied())
            .collect();

        for subject in subjects {
            self.clear_mask(ctx, subject);
        }
    }

    /// Must run before the engine erases `subject`, while its sprite still resolves.
    pub fn on_subject_erased(&mut self, ctx: &mut HostContext<'_>, subject: PictureId) {
        self.clear_mask(ctx, subject);
    }

    pub(super) fn reset(&mut self) {
        self.masks.clear();
    }

    /// Records an association without touching sprites.
    pub(super) fn restore(&mut self, subject: PictureId, mask: PictureId) {
        self.masks.insert(subject, mask);
    }
}
