use scenepatch_protocol::PictureId;
use serde_json::Value;
use strum::{Display, EnumString};

/// Opaque handle to a visual object owned by the engine's rendering layer.
///
/// Handles are only valid for the lifetime of the scene that created them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisualHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SceneKind {
    Title,
    Map,
    Menu,
    Save,
    Load,
    Battle,
    Other,
}

/// The engine's picture bookkeeping for the current screen.
pub trait PictureDisplay {
    fn is_displayed(&self, id: PictureId) -> bool;

    fn displayed_picture_ids(&self) -> Vec<PictureId>;

    /// Number of picture slots on the screen, i.e. the highest valid picture id.
    fn max_pictures(&self) -> usize;
}

/// The engine's sprites for the current scene.
pub trait RenderLayer {
    fn resolve_visual(&self, id: PictureId) -> Option<VisualHandle>;

    /// Points `subject`'s mask at `mask`, or removes its mask.
    fn set_mask(&mut self, subject: VisualHandle, mask: Option<VisualHandle>);

    fn mask_of(&self, subject: VisualHandle) -> Option<VisualHandle>;
}

/// Scene-local values that travel with the engine's save data.
pub trait DurableState {
    fn get(&self, key: &str) -> Option<&Value>;

    fn insert(&mut self, key: &str, value: Value);

    fn remove(&mut self, key: &str) -> Option<Value>;
}

pub trait Interpreter {
    fn is_running(&self) -> bool;

    /// Advances the interpreter by one step.
    fn update(&mut self);
}

pub trait EventHost {
    /// Prepares a fresh interpreter for common event `id`, or `None` if no such event exists.
    fn start_common_event(&mut self, id: u32) -> Option<Box<dyn Interpreter + '_>>;

    /// Queues common event `id` on the engine's own interpreter.
    fn reserve_common_event(&mut self, id: u32);
}

/// Everything a patch may touch during a single hook invocation.
pub struct HostContext<'a> {
    pub pictures: &'a dyn PictureDisplay,
    pub render: &'a mut dyn RenderLayer,
    pub state: &'a mut dyn DurableState,
    pub events: &'a mut dyn EventHost,
}

/// Implemented by engine adapters to lend out their collaborators for a hook invocation.
pub trait Host {
    fn context(&mut self) -> HostContext<'_>;
}
