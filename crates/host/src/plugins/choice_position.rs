use scenepatch_protocol::{
    ChoiceCommand, ChoicePlacement, CommandArgs, CommandError,
    command::{CHOICE_POSITION, CHOICE_POSITION_ALIAS},
};
use tracing::debug;

use crate::{host::HostContext, plugins::Plugin};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Overrides the placement of the next choice window only.
///
/// The placement is consumed when the window is placed and dropped when the message state is
/// cleared, whichever happens first.
#[derive(Debug, Default)]
pub struct ChoicePositionPlugin {
    pending: Option<ChoicePlacement>,
}

impl ChoicePositionPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&ChoicePlacement> {
        self.pending.as_ref()
    }
}

impl Plugin for ChoicePositionPlugin {
    fn name(&self) -> &'static str {
        CHOICE_POSITION
    }

    fn aliases(&self) -> &'static [&'static str] {
        &[CHOICE_POSITION_ALIAS]
    }

    fn command(
        &mut self,
        _ctx: &mut HostContext<'_>,
        name: &str,
        args: &CommandArgs,
    ) -> Result<(), CommandError> {
        let ChoiceCommand::SetPosition(placement) = ChoiceCommand::parse(name, args)?;
        debug!(?placement, "next choice window placement set");

        self.pending = Some(placement);
        Ok(())
    }

    fn message_cleared(&mut self) {
        self.pending = None;
    }

    fn choice_visible_rows(&self, rows: &mut usize, choice_count: usize) {
        if let Some(pending) = self.pending.as_ref().and_then(ChoicePlacement::rows) {
            *rows = pending.min(choice_count);
        }
    }

    fn choice_placement(&mut self, rect: &mut WindowRect, bounds: Size) {
        let Some(placement) = self.pending.take() else {
            return;
        };

        if let Some(width) = placement.width() {
            rect.width = width.min(bounds.width);
        }

        if let Some(height) = placement.height() {
            rect.height = height.min(bounds.height);
        }

        if let Some(x) = placement.x() {
            rect.x = clamp_origin(x, bounds.width, rect.width);
        }

        if let Some(y) = placement.y() {
            rect.y = clamp_origin(y, bounds.height, rect.height);
        }
    }
}

/// Keeps a window of `extent` starting at `origin` inside `bound` where possible.
fn clamp_origin(origin: u32, bound: u32, extent: u32) -> i32 {
    let origin = origin.min(bound.saturating_sub(extent));
    i32::try_from(origin).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod test {
    use scenepatch_protocol::CommandArgs;

    use super::{ChoicePositionPlugin, Size, WindowRect};
    use crate::{host::Host, plugins::Plugin, sim::SimHost};

    const SCREEN: Size = Size {
        width: 816,
        height: 624,
    };

    const PLACED: WindowRect = WindowRect {
        x: 500,
        y: 300,
        width: 240,
        height: 180,
    };

    fn with_position(args: CommandArgs) -> ChoicePositionPlugin {
        let mut host = SimHost::default();
        let mut plugin = ChoicePositionPlugin::new();
        plugin
            .command(&mut host.context(), "SET_POSITION", &args)
            .unwrap();
        plugin
    }

    #[test]
    fn untouched_without_a_pending_placement() {
        let mut plugin = ChoicePositionPlugin::new();
        let mut rect = PLACED;
        let mut rows = 4;

        plugin.choice_visible_rows(&mut rows, 6);
        plugin.choice_placement(&mut rect, SCREEN);

        assert_eq!(4, rows);
        assert_eq!(PLACED, rect);
    }

    #[test]
    fn rows_never_exceed_choices() {
        let plugin = with_position(CommandArgs::new().with("row", 8));
        let mut rows = 4;

        plugin.choice_visible_rows(&mut rows, 3);

        assert_eq!(3, rows);
    }

    #[test]
    fn placement_is_clamped_to_the_screen() {
        let mut plugin = with_position(
            CommandArgs::new()
                .with("x", 700)
                .with("y", 10)
                .with("width", 1000)
                .with("height", -1),
        );
        let mut rect = PLACED;

        plugin.choice_placement(&mut rect, SCREEN);

        assert_eq!(
            WindowRect {
                x: 0,
                y: 10,
                width: 816,
                height: 180,
            },
            rect
        );
    }

    #[test]
    fn placement_is_used_once() {
        let mut plugin = with_position(CommandArgs::new().with("x", 20).with("row", 2));
        let mut first = PLACED;
        let mut second = PLACED;

        plugin.choice_placement(&mut first, SCREEN);
        plugin.choice_placement(&mut second, SCREEN);

        assert_eq!(20, first.x);
        assert_eq!(PLACED, second);
        assert!(plugin.pending().is_none());
    }

    #[test]
    fn clearing_the_message_drops_the_placement() {
        let mut plugin = with_position(CommandArgs::new().with("row", 2));

        plugin.message_cleared();
        let mut rows = 4;
        plugin.choice_visible_rows(&mut rows, 6);

        assert_eq!(4, rows);
    }
}
