use apdiff::capture::{self, CaptureOutcome};
use apdiff::cli::{BssArgs, Cli, Command, CompareArgs, DownArgs, LldpArgs};
use apdiff::config::Config;
use apdiff::controller::{ControllerClient, ControllerKind};
use apdiff::logging;
use apdiff::report::{self, ReportOptions};
use apdiff::snapshot::Role;
use apdiff::store::diff::{self, CompareMode};
use apdiff::store::SnapshotStore;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::Path;

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

fn confirm_overwrite(path: &Path) -> bool {
    print!("{} already exists. Do you want to overwrite it? (y/n): ", path.display());
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

fn connect(config: &Config, kind: ControllerKind) -> ControllerClient {
    let settings = config.controller_settings().unwrap_or_else(|e| fail(format!("{e:#}")));
    let base_url = config.base_url_for(&kind).unwrap_or_else(|e| fail(format!("{e:#}")));
    ControllerClient::new(kind, &base_url, &settings).unwrap_or_else(|e| fail(e))
}

/// Conductor unless a controller name was given.
fn target(controller: Option<&str>) -> ControllerKind {
    match controller {
        Some(name) => ControllerKind::Controller { name: name.to_string() },
        None => ControllerKind::Conductor,
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(e),
    }
}

fn run_capture(config: &Config, store: &SnapshotStore, role: Role, assume_yes: bool) {
    // building the client makes no request, login happens on the first fetch
    let mut client = connect(config, ControllerKind::Conductor);
    let outcome = capture::capture(&mut client, store, role, |path| {
        assume_yes || confirm_overwrite(path)
    });

    if let Err(e) = client.logout() {
        tracing::warn!(error = %e, "logout failed");
    }

    match outcome {
        Ok(CaptureOutcome::Stored { path, count }) => {
            println!("Stored {count} APs to {}", path.display());
        }
        Ok(CaptureOutcome::Skipped { .. }) => println!("Operation cancelled."),
        Err(e) => fail(e),
    }
}

fn run_compare(store: &SnapshotStore, args: &CompareArgs) {
    let before = store.load(Role::Before).unwrap_or_else(|e| fail(e));
    let after = store.load(Role::After).unwrap_or_else(|e| fail(e));

    let mode = if args.down {
        CompareMode::OnlyDownTransitions
    } else {
        CompareMode::All
    };

    let result = diff::compare(&before, &after, mode);
    let opts = ReportOptions {
        json: args.json,
        color: !args.no_color,
    };

    if let Err(e) = report::print(&result, &opts) {
        fail(format!("failed to render comparison: {e}"));
    }
}

fn run_bss(config: &Config, args: &BssArgs) {
    let kind = ControllerKind::Controller {
        name: args.controller.clone(),
    };
    let mut client = connect(config, kind);
    let table = client.read_bss_table();

    if let Err(e) = client.logout() {
        tracing::warn!(error = %e, "logout failed");
    }

    let table = table.unwrap_or_else(|e| fail(e));
    if args.json {
        print_json(&table);
    } else {
        print!("{}", report::table::render_bss(&table));
    }
}

fn run_down(config: &Config, args: &DownArgs) {
    let mut client = connect(config, target(args.controller.as_deref()));
    let down = client.read_down_aps();

    if let Err(e) = client.logout() {
        tracing::warn!(error = %e, "logout failed");
    }

    let down = down.unwrap_or_else(|e| fail(e));
    if args.json {
        print_json(&down);
    } else {
        print!("{}", report::table::render_down(&down, !args.no_color));
    }
}

fn run_lldp(config: &Config, args: &LldpArgs) {
    let mut client = connect(config, target(args.controller.as_deref()));
    let neighbors = client.read_lldp_neighbors(&args.ap);

    if let Err(e) = client.logout() {
        tracing::warn!(error = %e, "logout failed");
    }

    let neighbors = neighbors.unwrap_or_else(|e| fail(e));
    if args.json {
        print_json(&neighbors);
    } else {
        print!("{}", report::table::render_lldp(&args.ap, &neighbors));
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| fail(format!("{e:#}")));
    if let Some(dir) = cli.snapshot_dir {
        config.snapshot_dir = dir;
    }

    let store = SnapshotStore::new(config.snapshot_dir.clone());
    tracing::debug!(dir = %store.dir().display(), "using snapshot directory");

    match cli.command {
        Command::Before(args) => run_capture(&config, &store, Role::Before, args.yes),
        Command::After => run_capture(&config, &store, Role::After, true),
        Command::Compare(args) => run_compare(&store, &args),
        Command::Bss(args) => run_bss(&config, &args),
        Command::Down(args) => run_down(&config, &args),
        Command::Lldp(args) => run_lldp(&config, &args),
    }
}
