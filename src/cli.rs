//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Authoritative dog-walker game server")]
pub struct Args {
    /// Path to the map configuration file
    #[arg(short = 'c', long = "config-file", value_name = "file")]
    pub config_file: PathBuf,

    /// Root directory for static files
    #[arg(short = 'w', long = "www-root", value_name = "dir")]
    pub www_root: PathBuf,

    /// Tick period in milliseconds; enables auto-tick mode
    #[arg(
        short = 't',
        long = "tick-period",
        value_name = "milliseconds",
        value_parser = parse_tick_period
    )]
    pub tick_period_ms: Option<u64>,

    /// Spawn dogs at random road positions instead of the first road origin
    #[arg(long = "randomize-spawn-points")]
    pub randomize_spawn_points: bool,
}

fn parse_tick_period(value: &str) -> Result<u64, String> {
    let ms: u64 = value
        .parse()
        .map_err(|_| "tick period must be an integer number of milliseconds".to_owned())?;
    if ms == 0 {
        return Err("tick period must be positive".to_owned());
    }
    Ok(ms)
}
