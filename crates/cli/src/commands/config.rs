use clap::{ArgAction, Args};
use scenepatch_protocol::PluginConfig;

use crate::{config::Config, output::OutputBuilder};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print the merged configuration as TOML instead.
    #[clap(long, action = ArgAction::SetTrue)]
    toml: bool,
}

#[tracing::instrument(skip(config))]
pub fn show(config: &Config, args: ConfigArgs) -> color_eyre::Result<()> {
    if args.toml {
        print!("{}", config.plugins.to_toml()?);
        return Ok(());
    }

    let mut output = describe(&config.plugins);

    output.section("Configuration search paths", |builder| {
        for (index, path) in config.known_dirs.config_files().enumerate() {
            builder.property(index, path.to_string_lossy());
        }
    });

    print!("{}", output.build());

    Ok(())
}

fn describe(plugins: &PluginConfig) -> OutputBuilder {
    let mut output = OutputBuilder::new("Configuration");

    output.section("Picture masks", |builder| {
        let section = &plugins.picture_mask;
        builder.property("Enabled", section.enabled());
        builder.property("Snapshot key", section.snapshot_key());
    });

    output.section("Load event", |builder| {
        let section = &plugins.load_event;
        builder.property("Enabled", section.enabled());
        builder.property("Common event", section.common_event_id());
        builder.property("Mode", section.mode());
        builder.property("Update limit", section.max_updates());
    });

    output.section("Choice position", |builder| {
        builder.property("Enabled", plugins.choice_position.enabled());
    });

    output.section("Title menu", |builder| {
        let section = &plugins.title_menu;
        builder.property("Enabled", section.enabled());
        builder.property("Show options", section.show_options());
    });

    output.section("Savefile list", |builder| {
        let section = &plugins.savefile_list;
        builder.property("Enabled", section.enabled());
        builder.property("Columns", section.columns());
        builder.property("Visible rows", section.visible_rows());
    });

    output
}
