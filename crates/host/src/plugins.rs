use std::any::Any;

use scenepatch_protocol::{CommandArgs, CommandError, PictureId};

use crate::host::{HostContext, SceneKind};

pub mod choice_position;
pub mod load_event;
pub mod picture_mask;
pub mod savefile_list;
pub mod title_menu;

pub use self::{
    choice_position::{ChoicePositionPlugin, Size, WindowRect},
    load_event::LoadEventPlugin,
    picture_mask::PictureMaskPlugin,
    savefile_list::{GridLayout, SavefileListPlugin},
    title_menu::{TitleCommand, TitleMenuPlugin, TitleSymbol},
};

/// A patch over one piece of engine behaviour.
///
/// Every hook defaults to leaving the engine's behaviour untouched, so a plugin only overrides
/// the hooks it patches. Hooks run in plugin registration order.
pub trait Plugin: Any {
    /// Name plugin commands are addressed to.
    fn name(&self) -> &'static str;

    /// Other names commands may be addressed to.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn command(
        &mut self,
        _ctx: &mut HostContext<'_>,
        name: &str,
        _args: &CommandArgs,
    ) -> Result<(), CommandError> {
        Err(CommandError::UnknownCommand {
            plugin: self.name().to_owned(),
            command: name.to_owned(),
        })
    }

    /// Runs before the engine starts `scene`.
    fn before_scene_start(&mut self, _ctx: &mut HostContext<'_>, _scene: SceneKind) {}

    /// Runs after the engine started `scene` and created its sprites.
    fn after_scene_start(&mut self, _ctx: &mut HostContext<'_>, _scene: SceneKind) {}

    /// Runs before the engine stops `scene` and discards its sprites.
    fn before_scene_stop(&mut self, _ctx: &mut HostContext<'_>, _scene: SceneKind) {}

    fn before_load_success(&mut self, _ctx: &mut HostContext<'_>) {}

    fn after_load_success(&mut self, _ctx: &mut HostContext<'_>) {}

    /// Runs while picture `id` is still displayed, right before the engine erases it.
    fn before_picture_erase(&mut self, _ctx: &mut HostContext<'_>, _id: PictureId) {}

    fn message_cleared(&mut self) {}

    fn title_commands(&self, _commands: &mut Vec<TitleCommand>) {}

    fn savefile_layout(&self, _layout: &mut GridLayout) {}

    fn choice_visible_rows(&self, _rows: &mut usize, _choice_count: usize) {}

    fn choice_placement(&mut self, _rect: &mut WindowRect, _bounds: Size) {}
}
