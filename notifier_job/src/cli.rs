use clap::Parser;

/// School bus outage notifier.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "bus_outage_notifier", version, about, long_about = None)]
pub struct Cli {
    /// Keep a copy of the fetched schedule page
    #[arg(short, long)]
    pub log: bool,

    /// Only send what changed since the previous run
    #[arg(short, long)]
    pub compare: bool,

    /// Text put in front of every message
    #[arg(short, long)]
    pub prefix: Option<String>,
}
