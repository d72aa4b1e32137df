use scenepatch_protocol::config::TitleMenuSection;

use crate::plugins::Plugin;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TitleSymbol {
    NewGame,
    Continue,
    Options,
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleCommand {
    pub symbol: TitleSymbol,
    pub label: String,
    pub enabled: bool,
}

impl TitleCommand {
    pub fn new<L: Into<String>>(symbol: TitleSymbol, label: L) -> Self {
        Self {
            symbol,
            label: label.into(),
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Hides the "Options" entry of the title screen unless configured to keep it.
#[derive(Debug)]
pub struct TitleMenuPlugin {
    show_options: bool,
}

impl TitleMenuPlugin {
    pub fn new(config: &TitleMenuSection) -> Self {
        Self {
            show_options: config.show_options(),
        }
    }
}

impl Plugin for TitleMenuPlugin {
    fn name(&self) -> &'static str {
        "TitleMenu"
    }

    fn title_commands(&self, commands: &mut Vec<TitleCommand>) {
        if !self.show_options {
            commands.retain(|command| command.symbol != TitleSymbol::Options);
        }
    }
}
