use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apdiff")]
#[command(about = "Compare access point status before and after maintenance")]
#[command(version)]
pub struct Cli {
    /// Path to config.toml (defaults to the per-user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding before.json and after.json
    #[arg(long, global = true)]
    pub snapshot_dir: Option<PathBuf>,

    /// Log requests and snapshot handling to stderr
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store AP status before maintenance
    Before(BeforeArgs),

    /// Store AP status after maintenance
    After,

    /// Compare the before and after snapshots
    Compare(CompareArgs),

    /// Show the BSS table of a named controller
    Bss(BssArgs),

    /// List APs the controller currently reports as down
    Down(DownArgs),

    /// Show the switch port an AP is connected to (LLDP neighbors)
    Lldp(LldpArgs),
}

#[derive(Args)]
pub struct BeforeArgs {
    /// Overwrite an existing before snapshot without asking
    #[arg(long, short = 'y', default_value_t = false)]
    pub yes: bool,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Only show APs that were up before but are down now
    #[arg(long, default_value_t = false)]
    pub down: bool,

    /// Output as JSON instead of table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Disable colored status text
    #[arg(long, default_value_t = false)]
    pub no_color: bool,
}

#[derive(Args)]
pub struct BssArgs {
    /// Controller hostname, reached at https://<name>:4343/v1
    #[arg(long)]
    pub controller: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct DownArgs {
    /// Query a named controller instead of the conductor
    #[arg(long)]
    pub controller: Option<String>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Disable colored status text
    #[arg(long, default_value_t = false)]
    pub no_color: bool,
}

#[derive(Args)]
pub struct LldpArgs {
    /// AP name as listed in the AP database
    #[arg(long)]
    pub ap: String,

    /// Query a named controller instead of the conductor
    #[arg(long)]
    pub controller: Option<String>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
