//! Status command - show collection sizes.

use crate::app::App;
use quickfill_core::{Collection, Config, Kind};

/// Run the status command.
pub fn run(config: Config, url: Option<String>, kind: Kind) -> anyhow::Result<()> {
    let app = App::new(config, url)?;
    let stats = Collection::new(&app.store, &app.keys, kind.clone()).stats()?;

    println!("Collection \"{}\"", kind);
    println!("==================");

    if stats.is_empty() {
        println!("Collection is empty. Run 'quickfill load {}' to fill it.", kind);
        return Ok(());
    }

    println!("  Records:  {}", stats.records);
    println!("  Prefixes: {}", stats.prefixes);
    println!();
    println!("Store:     {}", app.store.url());
    println!("Namespace: {}", app.keys.namespace());

    Ok(())
}
