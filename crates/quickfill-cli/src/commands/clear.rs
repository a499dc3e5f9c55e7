//! Clear command - remove a collection.

use crate::app::App;
use quickfill_core::{Collection, Config, Kind};
use std::io::{self, Write};

/// Run the clear command.
pub fn run(config: Config, url: Option<String>, kind: Kind, skip_confirm: bool) -> anyhow::Result<()> {
    let app = App::new(config, url)?;
    let collection = Collection::new(&app.store, &app.keys, kind.clone());

    if collection.stats()?.is_empty() {
        println!("Collection \"{}\" is empty. Nothing to clear.", kind);
        return Ok(());
    }

    if !skip_confirm {
        print!("This will delete all data for \"{}\". Are you sure? [y/N] ", kind);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    collection.clear()?;
    println!("Collection \"{}\" cleared.", kind);

    Ok(())
}
