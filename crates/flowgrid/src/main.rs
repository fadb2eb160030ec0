use clap::Parser;
use colored::Colorize;

use flowgrid::FlowError;
use flowgrid::cli::{Cli, init_logging};

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose, cli.quiet);

    if let Err(err) = cli.run() {
        let internal = err
            .downcast_ref::<FlowError>()
            .is_some_and(FlowError::is_internal);
        eprintln!("{} {err:#}", "error:".red().bold());
        if internal {
            tracing::error!("layout engine invariant violated; please report this input");
            std::process::exit(2);
        }
        std::process::exit(1);
    }
}
