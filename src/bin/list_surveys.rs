use anyhow::Result;
use ipedsduck::Registry;
use std::env;

/// Print the built-in survey families, their table patterns and their
/// format history. `--json` emits the full definitions instead.
fn main() -> Result<()> {
    let registry = Registry::builtin();

    if env::args().any(|a| a == "--json") {
        let defs: Vec<_> = registry.defs().collect();
        println!("{}", serde_json::to_string_pretty(&defs)?);
        return Ok(());
    }

    for def in registry.defs() {
        println!("{}  [{}]", def.id, def.pattern);
        println!("    {}", def.description);
        for change in &def.format_changes {
            println!("    {}: {}", change.era, change.description);
        }
        println!();
    }
    Ok(())
}
