mod cli;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level())).init();

    let mut progress = Progress::new();
    // --- Configuration -------------------------------------------------------------
    progress.start("Reading configuration");
    let config = read_config_file(&args.config)?;
    let pipeline = Pipeline::from_config(&config)?;
    progress.done_with_message(&format!("{} layers", config.layers.len()));

    // Before starting the potentially long computation, make sure that we can
    // write the result to the requested destination.
    if let Some(dir) = args.out.parent() { create_dir_all(dir)? }

    // --- Input ---------------------------------------------------------------------
    progress.start("Reading hits");
    let events = read_events(&args.hits)?;
    let n_hits: usize = events.iter().map(|e| e.hits.len()).sum();
    progress.done_with_message(&format!("{} hits in {} events", group_digits(n_hits), group_digits(events.len())));

    // --- Process events ------------------------------------------------------------
    let bar = ProgressBar::new(events.len() as u64);
    bar.set_style(ProgressStyle::default_bar()
                  .template("Processing events\n[{elapsed_precise}] {wide_bar} {pos}/{len} ({eta_precise})")?
    );
    let pool = rayon::ThreadPoolBuilder::new().num_threads(args.threads).build()?;
    let outputs: Vec<EventOutput> = pool.install(|| {
        events.par_iter()
            .map_init(|| pipeline.fresh_binner(),
                      |binner, event| {
                          let output = pipeline.process_with(binner, event);
                          bar.inc(1);
                          output
                      })
            .collect()
    });
    bar.finish();

    // --- Output --------------------------------------------------------------------
    progress.start(&format!("Writing towers to {}", args.out.display()));
    write_towers(&args.out, &outputs)?;
    progress.done();

    report(&outputs);
    Ok(())
}

fn report(outputs: &[EventOutput]) {
    let mut stats = BinningStats::default();
    let (mut n_cells, mut n_raw, mut n_calibrated, mut mismatches) = (0, 0, 0, 0);
    let (mut e_cells, mut e_calibrated) = (0.0, 0.0);
    for out in outputs {
        stats        += out.stats;
        n_cells      += out.cells.len();
        n_raw        += out.raw_towers.len();
        n_calibrated += out.calibrated.len();
        e_cells      += out.cells.total_edep();
        e_calibrated += out.calibrated.total_energy();
        if out.conservation.map_or(false, |c| !c.ok) { mismatches += 1 }
    }
    let g = group_digits;
    println!("Events:                {:>12}", g(outputs.len()));
    println!("Deposits:              {:>12}", g(stats.deposits));
    println!("  out of acceptance:   {:>12}", g(stats.out_of_acceptance));
    println!("  in unknown layers:   {:>12}", g(stats.unknown_layer));
    println!("Non-finite cell sums:  {:>12}", g(stats.non_finite));
    println!("Cells:                 {:>12}   {e_cells:.6} GeV", g(n_cells));
    println!("Raw towers:            {:>12}", g(n_raw));
    println!("Calibrated towers:     {:>12}   {e_calibrated:.6} GeV", g(n_calibrated));
    println!("Conservation failures: {:>12}", g(mismatches));
    info!("{} events processed", outputs.len());
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::error::Error;
use std::fs::create_dir_all;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::prelude::*;

use calocell::{EventOutput, Pipeline};
use calocell::binner::BinningStats;
use calocell::config::read_config_file;
use calocell::io::{read_events, write_towers};
use calocell::utils::{group_digits, timing::Progress};

use cli::Cli;
