use scenepatch_protocol::config::SavefileListSection;

use crate::plugins::Plugin;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub visible_rows: u32,
}

/// Lays the save file list out as a grid.
#[derive(Debug)]
pub struct SavefileListPlugin {
    layout: GridLayout,
}

impl SavefileListPlugin {
    pub fn new(config: &SavefileListSection) -> Self {
        Self {
            layout: GridLayout {
                columns: config.columns().max(1),
                visible_rows: config.visible_rows().max(1),
            },
        }
    }
}

impl Plugin for SavefileListPlugin {
    fn name(&self) -> &'static str {
        "SavefileList"
    }

    fn savefile_layout(&self, layout: &mut GridLayout) {
        *layout = self.layout;
    }
}
