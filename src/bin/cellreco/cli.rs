use std::path::PathBuf;

#[derive(clap::Parser, Debug, Clone)]
#[clap(
    name = "cellreco",
    about = "Bin calorimeter hits into cells and calibrate the resulting towers",
)]
pub (super) struct Cli {
    /// TOML file describing layers, calibration, digitization and auditing
    pub config: PathBuf,

    /// Text file with one hit per line: event layer hit_id x0 y0 z0 x1 y1 z1 edep [light_yield]
    pub hits: PathBuf,

    /// Where to write the calibrated towers
    #[clap(short, long, default_value = "towers.txt")]
    pub out: PathBuf,

    /// Maximum number of rayon threads
    #[clap(short = 'j', long, default_value = "4")]
    pub threads: usize,

    /// More log output (-v info, -vv debug, -vvv trace). Overridden by RUST_LOG
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub (super) fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
