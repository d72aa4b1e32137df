use clap::Subcommand;

use self::{config::ConfigArgs, run::RunArgs};

pub mod config;
pub mod run;

#[derive(Subcommand, Debug)]
#[command(flatten_help = true)]
pub enum Commands {
    /// Replay a script of engine events through the enabled plugins.
    #[clap(disable_version_flag = true)]
    Run(RunArgs),

    /// Show the resolved plugin configuration and where it was searched for.
    #[clap(disable_version_flag = true)]
    Config(ConfigArgs),
}
