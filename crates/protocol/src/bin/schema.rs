use schemars::schema_for;
use scenepatch_protocol::PluginConfig;

pub fn main() {
    let schema = schema_for!(PluginConfig);
    println!(
        "{}",
        serde_json::to_string_pretty(&schema).expect("failed to generate schema JSON")
    );
}
