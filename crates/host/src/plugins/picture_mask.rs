use scenepatch_protocol::{
    CommandArgs, CommandError, MaskCommand, PictureId,
    command::{PICTURE_MASK, PICTURE_MASK_ALIAS},
    config::PictureMaskSection,
};
use tracing::{debug, instrument};

use crate::{
    host::{HostContext, SceneKind},
    plugins::Plugin,
};

pub mod compositor;
pub mod lifecycle;
pub mod registry;

pub use self::{
    compositor::CompositorBinding,
    lifecycle::{LifecycleBridge, MaskSnapshot},
    registry::MaskRegistry,
};

/// Lets one picture act as the visibility mask of another.
///
/// Associations persist across map scene transitions and save/load through a snapshot kept in
/// the engine's durable state.
#[derive(Debug)]
pub struct PictureMaskPlugin {
    registry: MaskRegistry,
    snapshot_key: String,
}

impl PictureMaskPlugin {
    pub fn new(config: &PictureMaskSection) -> Self {
        Self {
            registry: MaskRegistry::new(),
            snapshot_key: config.snapshot_key().to_owned(),
        }
    }

    pub fn registry(&self) -> &MaskRegistry {
        &self.registry
    }
}

impl Plugin for PictureMaskPlugin {
    fn name(&self) -> &'static str {
        PICTURE_MASK
    }

    fn aliases(&self) -> &'static [&'static str] {
        &[PICTURE_MASK_ALIAS]
    }

    #[instrument(name = "picture_mask", skip_all, fields(command = name))]
    fn command(
        &mut self,
        ctx: &mut HostContext<'_>,
        name: &str,
        args: &CommandArgs,
    ) -> Result<(), CommandError> {
        let bridge = LifecycleBridge::new(&self.snapshot_key);

        match MaskCommand::parse(name, args)? {
            MaskCommand::Set { subject, mask } => {
                if self.registry.set_mask(ctx, subject, mask) {
                    bridge.record(ctx, subject, Some(mask));
                }
            }
            MaskCommand::Clear { subject } => {
                self.registry.clear_mask(ctx, subject);
                bridge.record(ctx, subject, None);
            }
            MaskCommand::ClearAll => {
                self.registry.clear_all(ctx);
                bridge.record_cleared(ctx);
            }
        }

        Ok(())
    }

    fn after_scene_start(&mut self, ctx: &mut HostContext<'_>, scene: SceneKind) {
        if scene == SceneKind::Map {
            LifecycleBridge::new(&self.snapshot_key).resume(&mut self.registry, ctx);

            debug!(restored = self.registry.len(), "restored picture masks");
        }
    }

    fn before_scene_stop(&mut self, ctx: &mut HostContext<'_>, scene: SceneKind) {
        if scene == SceneKind::Map {
            LifecycleBridge::new(&self.snapshot_key).suspend(&self.registry, ctx);
        }
    }

    fn before_picture_erase(&mut self, ctx: &mut HostContext<'_>, id: PictureId) {
        self.registry.on_subject_erased(ctx, id);
        LifecycleBridge::new(&self.snapshot_key).record(ctx, id, None);
    }
}

#[cfg(test)]
mod test {
    use scenepatch_protocol::{CommandArgs, PictureId, config::PictureMaskSection};

    use super::PictureMaskPlugin;
    use crate::{
        host::{DurableState, Host, SceneKind},
        plugins::Plugin,
        sim::SimHost,
    };

    fn id(id: u32) -> PictureId {
        PictureId::new(id).unwrap()
    }

    fn plugin() -> PictureMaskPlugin {
        PictureMaskPlugin::new(&PictureMaskSection::default())
    }

    fn set(plugin: &mut PictureMaskPlugin, host: &mut SimHost, subject: u32, mask: u32) {
        let args = CommandArgs::new()
            .with("textureId", subject)
            .with("maskId", mask);

        plugin
            .command(&mut host.context(), "SET_MASK", &args)
            .unwrap();
    }

    #[test]
    fn commands_drive_the_registry() {
        let mut host = SimHost::default();
        for picture in 1..=3 {
            host.show_picture(id(picture));
        }
        let mut plugin = plugin();

        set(&mut plugin, &mut host, 1, 2);
        set(&mut plugin, &mut host, 3, 2);
        plugin
            .command(
                &mut host.context(),
                "CLEAR_MASK",
                &CommandArgs::new().with("textureId", 1),
            )
            .unwrap();

        assert_eq!(None, host.visual_mask(id(1)));
        assert_eq!(Some(id(2)), host.visual_mask(id(3)));

        plugin
            .command(&mut host.context(), "CLEAR_ALL_MASK", &CommandArgs::new())
            .unwrap();

        assert!(plugin.registry().is_empty());
        assert_eq!(None, host.visual_mask(id(3)));
    }

    #[test]
    fn malformed_arguments_change_nothing() {
        let mut host = SimHost::default();
        host.show_picture(id(1));
        let mut plugin = plugin();

        let result = plugin.command(
            &mut host.context(),
            "SET_MASK",
            &CommandArgs::new().with("textureId", 1),
        );

        assert!(result.is_err());
        assert!(plugin.registry().is_empty());
    }

    #[test]
    fn suspend_resume_restores_surviving_subjects() {
        let mut host = SimHost::default();
        for picture in 1..=4 {
            host.show_picture(id(picture));
        }
        let mut plugin = plugin();

        set(&mut plugin, &mut host, 1, 2);
        set(&mut plugin, &mut host, 3, 4);

        plugin.before_scene_stop(&mut host.context(), SceneKind::Map);
        host.teardown();
        host.remove_picture(id(3));
        host.rebuild();
        plugin.after_scene_start(&mut host.context(), SceneKind::Map);

        assert_eq!(Some(id(2)), host.visual_mask(id(1)));
        assert_eq!(None, host.visual_mask(id(3)));
        assert_eq!(Some(id(2)), plugin.registry().get(id(1)));
        assert_eq!(None, plugin.registry().get(id(3)));
    }

    fn suspend(plugin: &mut PictureMaskPlugin, host: &mut SimHost) {
        plugin.before_scene_stop(&mut host.context(), SceneKind::Map);
        host.teardown();
    }

    fn resume(plugin: &mut PictureMaskPlugin, host: &mut SimHost) {
        host.rebuild();
        plugin.after_scene_start(&mut host.context(), SceneKind::Map);
    }

    #[test]
    fn cleared_while_suspended_stays_cleared() {
        let mut host = SimHost::default();
        host.show_picture(id(1));
        host.show_picture(id(2));
        let mut plugin = plugin();

        set(&mut plugin, &mut host, 1, 2);
        suspend(&mut plugin, &mut host);
        plugin
            .command(
                &mut host.context(),
                "CLEAR_MASK",
                &CommandArgs::new().with("textureId", 1),
            )
            .unwrap();
        resume(&mut plugin, &mut host);

        assert_eq!(None, plugin.registry().get(id(1)));
        assert_eq!(None, host.visual_mask(id(1)));
    }

    #[test]
    fn clear_all_while_suspended_stays_cleared() {
        let mut host = SimHost::default();
        for picture in 1..=4 {
            host.show_picture(id(picture));
        }
        let mut plugin = plugin();

        set(&mut plugin, &mut host, 1, 2);
        set(&mut plugin, &mut host, 3, 4);
        suspend(&mut plugin, &mut host);
        plugin
            .command(&mut host.context(), "CLEAR_ALL_MASK", &CommandArgs::new())
            .unwrap();
        resume(&mut plugin, &mut host);

        assert!(plugin.registry().is_empty());
        assert_eq!(None, host.visual_mask(id(1)));
        assert_eq!(None, host.visual_mask(id(3)));
    }

    #[test]
    fn erased_then_redisplayed_id_starts_unmasked() {
        let mut host = SimHost::default();
        host.show_picture(id(1));
        host.show_picture(id(2));
        let mut plugin = plugin();

        set(&mut plugin, &mut host, 1, 2);
        suspend(&mut plugin, &mut host);
        plugin.before_picture_erase(&mut host.context(), id(1));
        host.remove_picture(id(1));
        host.show_picture(id(1));
        resume(&mut plugin, &mut host);

        assert_eq!(None, plugin.registry().get(id(1)));
        assert_eq!(None, host.visual_mask(id(1)));
    }

    #[test]
    fn set_while_suspended_survives_resume() {
        let mut host = SimHost::default();
        for picture in 1..=4 {
            host.show_picture(id(picture));
        }
        let mut plugin = plugin();

        set(&mut plugin, &mut host, 1, 2);
        suspend(&mut plugin, &mut host);
        set(&mut plugin, &mut host, 3, 4);
        resume(&mut plugin, &mut host);

        assert_eq!(Some(id(2)), host.visual_mask(id(1)));
        assert_eq!(Some(id(4)), host.visual_mask(id(3)));
        assert_eq!(Some(id(4)), plugin.registry().get(id(3)));
    }

    #[test]
    fn mask_on_picture_without_slot_is_dropped_on_resume() {
        let mut host = SimHost::default();
        host.show_picture(id(1));
        host.show_picture(id(u32::MAX));
        let mut plugin = plugin();

        set(&mut plugin, &mut host, u32::MAX, 1);
        suspend(&mut plugin, &mut host);
        resume(&mut plugin, &mut host);

        assert!(plugin.registry().is_empty());
    }

    #[test]
    fn other_scenes_do_not_snapshot() {
        let mut host = SimHost::default();
        host.show_picture(id(1));
        host.show_picture(id(2));
        let mut plugin = plugin();

        set(&mut plugin, &mut host, 1, 2);
        plugin.before_scene_stop(&mut host.context(), SceneKind::Battle);

        assert!(host.state.get("pictureMasks").is_none());
    }

    #[test]
    fn loaded_snapshot_replaces_session_state() {
        let mut host = SimHost::default();
        for picture in 1..=4 {
            host.show_picture(id(picture));
        }
        let mut plugin = plugin();

        set(&mut plugin, &mut host, 1, 2);
        host.state
            .insert("pictureMasks", serde_json::json!([null, null, null, 4]));

        host.teardown();
        host.rebuild();
        plugin.after_scene_start(&mut host.context(), SceneKind::Map);

        assert_eq!(None, host.visual_mask(id(1)));
        assert_eq!(Some(id(4)), host.visual_mask(id(3)));
        assert_eq!(None, plugin.registry().get(id(1)));
        assert_eq!(Some(id(4)), plugin.registry().get(id(3)));
    }
}
