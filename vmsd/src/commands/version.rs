//! Version command

use clap::Args;

/// Arguments for the version command.
#[derive(Args)]
pub struct VersionArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the version command.
pub fn run(args: &VersionArgs) {
    let version = env!("CARGO_PKG_VERSION");

    if args.json {
        println!(r#"{{"version":"{version}"}}"#);
    } else {
        println!("qs-vmsd {version}");
    }
}
