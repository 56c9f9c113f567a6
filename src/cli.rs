use clap::Parser;
use register::Bank;
use std::time::Duration;

/// Seconds, fractions allowed
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("'{}' is not a number of seconds. [{}]", s, e))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("Invalid interval '{}'. [{}]", s, e))
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct ArgParser {
    /// Path to a JSON or TOML settings file providing bank windows and watch flags.
    #[arg(long)]
    pub config: Option<String>,

    /// Start in server role instead of client role.
    #[arg(long, default_value_t = false)]
    pub server: bool,

    /// Refresh interval in seconds, fractions allowed. 0 refreshes only on request.
    #[arg(long, value_parser = parse_interval)]
    pub interval: Option<Duration>,

    /// Banks to watch from the start (coil, discrete_input, holding_register, input_register).
    #[arg(long, num_args = 1..)]
    pub watch: Vec<Bank>,

    /// Run without the terminal UI and print refreshed values to stdout.
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Stop after this many refresh cycles in headless mode.
    #[arg(long, requires = "headless")]
    pub ticks: Option<usize>,

    #[command(flatten)]
    pub net: net::Config,
}
