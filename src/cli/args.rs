//! CLI argument definitions via clap derive.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum};

/// spkstate: state vector of a target relative to an observer from NAIF kernels.
///
/// With no arguments, prints the state of JWST relative to the Sun on
/// 2024-12-31 (UTC) in J2000, using kernels found in the current directory.
#[derive(Debug, Parser)]
#[command(name = "spkstate", version, about)]
pub struct Cli {
    /// Directory holding the kernel files.
    #[arg(long, value_name = "DIR", env = "SPKSTATE_KERNEL_DIR", default_value = ".")]
    pub kernel_dir: Utf8PathBuf,

    /// Kernel file to load, relative to --kernel-dir. Repeat for several files;
    /// they are loaded in order.
    #[arg(
        long = "kernel",
        value_name = "FILE",
        default_values = ["naif0012.tls", "de440s.bsp", "jwst_rec.bsp"]
    )]
    pub kernels: Vec<Utf8PathBuf>,

    /// Observation epoch, e.g. 2024-12-31 or "2024-12-31T12:00:00 TDB".
    #[arg(long, default_value = "2024-12-31")]
    pub epoch: String,

    /// Target body name or NAIF code.
    #[arg(long, default_value = "JWST")]
    pub target: String,

    /// Observing body name or NAIF code.
    #[arg(long, default_value = "SUN")]
    pub observer: String,

    /// Reference frame of the output state (J2000 or ECLIPJ2000).
    #[arg(long, default_value = "J2000")]
    pub frame: String,

    /// Aberration correction (NONE, LT or CN).
    #[arg(long, default_value = "NONE")]
    pub abcorr: String,

    /// Output format.
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: OutputFormat,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace).
    /// RUST_LOG takes precedence when set.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Kernel paths with relative entries resolved against --kernel-dir.
    pub fn kernel_paths(&self) -> Vec<Utf8PathBuf> {
        self.kernels
            .iter()
            .map(|kernel| {
                if kernel.is_absolute() {
                    kernel.clone()
                } else {
                    self.kernel_dir.join(kernel)
                }
            })
            .collect()
    }

    /// Default log filter for the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Output format variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Two lines: position then velocity.
    #[default]
    Text,
    /// Pretty-printed JSON object with the query and the state.
    Json,
}
