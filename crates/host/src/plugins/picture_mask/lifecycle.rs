use scenepatch_protocol::PictureId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{compositor::CompositorBinding, registry::MaskRegistry};
use crate::host::HostContext;

/// Mask ids by picture slot, as written to durable state. Slot 0 is always empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MaskSnapshot(Vec<Option<PictureId>>);

impl MaskSnapshot {
    /// A snapshot with one empty slot per picture the screen can hold.
    pub fn empty(max_pictures: usize) -> Self {
        Self(vec![None; max_pictures + 1])
    }

    pub fn capture(registry: &MaskRegistry, max_pictures: usize) -> Self {
        let mut snapshot = Self::empty(max_pictures);
        for (subject, mask) in registry.iter() {
            snapshot.set(subject, Some(mask), max_pictures);
        }

        snapshot
    }

    /// Writes `mask` into `subject`'s slot. Returns false for subjects past `max_pictures`,
    /// which have no slot.
    pub fn set(
        &mut self,
        subject: PictureId,
        mask: Option<PictureId>,
        max_pictures: usize,
    ) -> bool {
        let slot = subject.slot();
        if slot > max_pictures {
            if let Some(mask) = mask {
                warn!(
                    %subject,
                    %mask,
                    max_pictures,
                    "picture has no snapshot slot, mask is not kept"
                );
            }
            return false;
        }

        if slot >= self.0.len() {
            self.0.resize(slot + 1, None);
        }

        self.0[slot] = mask;
        true
    }

    pub fn entries(&self) -> impl Iterator<Item = (PictureId, PictureId)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(slot, mask)| Some((PictureId::from_slot(slot)?, (*mask)?)))
    }
}

/// Carries the registry across scene teardown: sprites are destroyed when a scene stops and
/// rebuilt when the next one starts, while the associations must outlive them.
///
/// Once stored, the snapshot mirrors the registry. Changes made while the scene is suspended
/// are written through with [`LifecycleBridge::record`] so that the next resume sees them.
pub struct LifecycleBridge<'k> {
    key: &'k str,
}

impl<'k> LifecycleBridge<'k> {
    pub fn new(key: &'k str) -> Self {
        Self { key }
    }

    pub fn suspend(&self, registry: &MaskRegistry, ctx: &mut HostContext<'_>) {
        let snapshot = MaskSnapshot::capture(registry, ctx.pictures.max_pictures());
        self.store(ctx, &snapshot);
    }

    /// Replays the stored snapshot onto the freshly created sprites and rebuilds `registry` from
    /// it. Subjects that are no longer displayed are replayed but not kept, and are dropped from
    /// the stored snapshot as well.
    pub fn resume(&self, registry: &mut MaskRegistry, ctx: &mut HostContext<'_>) {
        registry.reset();

        let Some(snapshot) = self.stored(ctx) else {
            debug!(key = self.key, "no mask snapshot to restore");
            return;
        };

        let mut compositor = CompositorBinding::new(&mut *ctx.render);
        for (subject, mask) in snapshot.entries() {
            compositor.apply(subject, mask);

            if ctx.pictures.is_displayed(subject) {
                registry.restore(subject, mask);
            }
        }

        self.suspend(registry, ctx);
    }

    /// Writes one registry change into the stored snapshot. Does nothing before the first
    /// snapshot was stored.
    pub fn record(
        &self,
        ctx: &mut HostContext<'_>,
        subject: PictureId,
        mask: Option<PictureId>,
    ) {
        let Some(mut snapshot) = self.stored(ctx) else {
            return;
        };

        if snapshot.set(subject, mask, ctx.pictures.max_pictures()) {
            self.store(ctx, &snapshot);
        }
    }

    /// Empties the stored snapshot, if there is one.
    pub fn record_cleared(&self, ctx: &mut HostContext<'_>) {
        if ctx.state.get(self.key).is_some() {
            let snapshot = MaskSnapshot::empty(ctx.pictures.max_pictures());
            self.store(ctx, &snapshot);
        }
    }

    fn stored(&self, ctx: &mut HostContext<'_>) -> Option<MaskSnapshot> {
        let value = ctx.state.get(self.key)?;

        match MaskSnapshot::deserialize(value) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                warn!(%error, key = self.key, "discarding unreadable mask snapshot");
                ctx.state.remove(self.key);
                None
            }
        }
    }

    fn store(&self, ctx: &mut HostContext<'_>, snapshot: &MaskSnapshot) {
        match serde_json::to_value(snapshot) {
            Ok(value) => ctx.state.insert(self.key, value),
            Err(error) => warn!(%error, key = self.key, "failed to serialize mask snapshot"),
        }
    }
}
