use crate::config::ConfigLoader;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show effective configuration (user + project merged)
    Show,
    /// Show configuration file paths
    Path,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(),
        ConfigCommands::Path => show_paths(),
    }
}

fn show_config() -> Result<()> {
    let config = ConfigLoader::load()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn show_paths() -> Result<()> {
    let describe = |path: &std::path::Path| {
        if path.exists() {
            format!("{}", path.display())
        } else {
            format!("{} (not found)", path.display())
        }
    };
    println!("User config:    {}", describe(&ConfigLoader::user_config_path()));
    println!("Project config: {}", describe(&ConfigLoader::project_config_path()));
    Ok(())
}
