use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    let options = config.layout_options()?;
    let size = config.shape_size()?;

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "  (not created yet; showing built-in defaults)".dimmed());
    }
    println!();
    println!("{}", "Effective settings".bold());
    println!("  defaults.start        {}", options.start);
    println!("  defaults.width        {}", size.width);
    println!("  defaults.height       {}", size.height);
    println!("  defaults.pad          {}", options.cell_padding);
    println!("  defaults.gap          {}", options.vertical_gap);
    println!("  routing.true_bend     {}", options.routing.true_bend);
    println!("  routing.false_bend    {}", options.routing.false_bend);
    println!(
        "  routing.arrow_length  {}",
        options
            .routing
            .arrow_length
            .map_or_else(|| "auto".to_string(), |l| l.to_string())
    );
    println!(
        "  routing.arrowhead     {}",
        options.routing.arrowhead.is_some()
    );
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = match Config::load() {
        Ok(config) => config,
        Err(_) if !Config::path()?.exists() => Config::default(),
        Err(e) => return Err(e),
    };
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    );
    Ok(())
}
