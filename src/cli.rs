use clap::Parser;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_NUMBER"));

#[derive(Parser, Debug)]
#[command(name = "runlog", version = VERSION, about = "Task run log viewer TUI")]
pub struct Cli {
    /// Dashboard server base URL
    #[arg(short = 'S', long, default_value = "http://127.0.0.1:8080")]
    pub server: String,

    /// Run id to watch
    #[arg(short, long)]
    pub run: u64,

    /// Poll interval in milliseconds
    #[arg(short, long, default_value_t = crate::run::POLL_INTERVAL_DEFAULT_MS)]
    pub interval: u64,

    /// Override reflow width in characters (defaults to terminal width)
    #[arg(short, long)]
    pub width: Option<usize>,

    /// Start with autoscroll disabled
    #[arg(long)]
    pub no_follow: bool,
}
