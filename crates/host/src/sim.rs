//! An in-memory engine used to drive patches without a running game.
//!
//! Visual handles are handed out from a counter and never reused, so a torn down and rebuilt
//! scene never sees its old sprites again.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use scenepatch_protocol::PictureId;
use serde_json::Value;

use crate::host::{
    DurableState, EventHost, Host, HostContext, Interpreter, PictureDisplay, RenderLayer,
    VisualHandle,
};

const DEFAULT_MAX_PICTURES: usize = 100;

#[derive(Debug)]
pub struct SimHost {
    pub screen: SimScreen,
    pub sprites: SimSprites,
    pub state: SimState,
    pub events: SimEvents,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::with_max_pictures(DEFAULT_MAX_PICTURES)
    }
}

impl SimHost {
    pub fn with_max_pictures(max_pictures: usize) -> Self {
        Self {
            screen: SimScreen {
                displayed: BTreeSet::new(),
                max_pictures,
            },
            sprites: SimSprites::default(),
            state: SimState::default(),
            events: SimEvents::default(),
        }
    }

    /// Shows picture `id`, creating its sprite if the scene has none yet.
    pub fn show_picture(&mut self, id: PictureId) {
        self.screen.displayed.insert(id);
        self.sprites.ensure_visual(id);
    }

    /// Erases picture `id` together with its sprite.
    pub fn remove_picture(&mut self, id: PictureId) {
        self.screen.displayed.remove(&id);
        self.sprites.discard(id);
    }

    /// Discards every sprite, as the engine does when a scene stops.
    pub fn teardown(&mut self) {
        self.sprites.visuals.clear();
        self.sprites.masks.clear();
    }

    /// Creates fresh sprites for the displayed pictures, as the engine does when a scene starts.
    pub fn rebuild(&mut self) {
        self.teardown();
        for id in &self.screen.displayed {
            self.sprites.ensure_visual(*id);
        }
    }

    /// The picture currently masking picture `id`'s sprite.
    pub fn visual_mask(&self, id: PictureId) -> Option<PictureId> {
        let subject = self.sprites.resolve_visual(id)?;
        let mask = self.sprites.mask_of(subject)?;

        self.sprites
            .visuals
            .iter()
            .find_map(|(picture, visual)| (*visual == mask).then_some(*picture))
    }
}

impl Host for SimHost {
    fn context(&mut self) -> HostContext<'_> {
        HostContext {
            pictures: &self.screen,
            render: &mut self.sprites,
            state: &mut self.state,
            events: &mut self.events,
        }
    }
}

#[derive(Debug)]
pub struct SimScreen {
    displayed: BTreeSet<PictureId>,
    max_pictures: usize,
}

impl SimScreen {
    pub fn contains(&self, id: PictureId) -> bool {
        self.displayed.contains(&id)
    }
}

impl PictureDisplay for SimScreen {
    fn is_displayed(&self, id: PictureId) -> bool {
        self.contains(id)
    }

    fn displayed_picture_ids(&self) -> Vec<PictureId> {
        self.displayed.iter().copied().collect()
    }

    fn max_pictures(&self) -> usize {
        self.max_pictures
    }
}

#[derive(Debug, Default)]
pub struct SimSprites {
    visuals: BTreeMap<PictureId, VisualHandle>,
    masks: HashMap<VisualHandle, VisualHandle>,
    next_handle: u64,
}

impl SimSprites {
    fn ensure_visual(&mut self, id: PictureId) {
        if !self.visuals.contains_key(&id) {
            self.next_handle += 1;
            self.visuals.insert(id, VisualHandle(self.next_handle));
        }
    }

    fn discard(&mut self, id: PictureId) {
        if let Some(visual) = self.visuals.remove(&id) {
            self.masks.remove(&visual);
            self.masks.retain(|_, mask| *mask != visual);
        }
    }
}

impl RenderLayer for SimSprites {
    fn resolve_visual(&self, id: PictureId) -> Option<VisualHandle> {
        self.visuals.get(&id).copied()
    }

    fn set_mask(&mut self, subject: VisualHandle, mask: Option<VisualHandle>) {
        match mask {
            Some(mask) => self.masks.insert(subject, mask),
            None => self.masks.remove(&subject),
        };
    }

    fn mask_of(&self, subject: VisualHandle) -> Option<VisualHandle> {
        self.masks.get(&subject).copied()
    }
}

#[derive(Debug, Default)]
pub struct SimState {
    values: HashMap<String, Value>,
}

impl DurableState for SimState {
    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn insert(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }
}

/// Common events whose commands are plain strings, recorded as they execute.
///
/// The command `loop` jumps back to the start of its event.
#[derive(Debug, Default)]
pub struct SimEvents {
    common_events: HashMap<u32, Vec<String>>,
    pub executed: Vec<String>,
    pub reserved: Vec<u32>,
}

impl SimEvents {
    pub fn define<I, S>(&mut self, id: u32, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.common_events
            .insert(id, commands.into_iter().map(Into::into).collect());
    }
}

impl EventHost for SimEvents {
    fn start_common_event(&mut self, id: u32) -> Option<Box<dyn Interpreter + '_>> {
        let commands = self.common_events.get(&id)?;

        Some(Box::new(SimInterpreter {
            commands,
            index: 0,
            executed: &mut self.executed,
        }))
    }

    fn reserve_common_event(&mut self, id: u32) {
        self.reserved.push(id);
    }
}

struct SimInterpreter<'a> {
    commands: &'a [String],
    index: usize,
    executed: &'a mut Vec<String>,
}

impl Interpreter for SimInterpreter<'_> {
    fn is_running(&self) -> bool {
        self.index < self.commands.len()
    }

    fn update(&mut self) {
        let Some(command) = self.commands.get(self.index) else {
            return;
        };

        self.executed.push(command.clone());
        self.index = match command.as_str() {
            "loop" => 0,
            _ => self.index + 1,
        };
    }
}
