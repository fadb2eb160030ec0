pub mod completion;
pub mod config;
pub mod layout;

use colored::Colorize;

/// Print the name and version line.
pub fn print_version() {
    println!(
        "{} {}",
        "flowgrid".bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
}
