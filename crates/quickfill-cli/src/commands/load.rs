//! Load command - rebuild a collection from stdin.

use crate::app::App;
use quickfill_core::{Config, Kind, Loader};
use std::io;

/// Run the load command.
pub fn run(config: Config, url: Option<String>, kind: Kind) -> anyhow::Result<()> {
    let app = App::new(config, url)?;

    eprintln!("Loading items of type \"{}\"...", kind);

    let loader = Loader::new(&app.store, &app.keys, app.config.load.clone());
    let report = loader.load(&kind, io::stdin().lock())?;

    println!("Loaded a total of {} items.", report.records);
    eprintln!(
        "  Prefixes: {}  Time: {:.2}s  Rate: {:.0} items/sec",
        report.prefixes,
        report.elapsed.as_secs_f64(),
        report.rate()
    );

    Ok(())
}
