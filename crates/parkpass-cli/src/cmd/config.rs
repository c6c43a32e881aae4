use crate::context::Context;
use crate::output::print_json;
use anyhow::bail;
use clap::Subcommand;
use parkpass_core::config::{Config, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Check the configuration for problems
    Validate,
}

pub fn run(ctx: &Context, subcommand: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            if json {
                return print_json(&ctx.config);
            }
            println!("# {}", ctx.config_path.display());
            println!("# database: {}", ctx.db_path.display());
            print!("{}", serde_yaml::to_string(&ctx.config)?);
            Ok(())
        }

        ConfigSubcommand::Init { force } => {
            if ctx.config_path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    ctx.config_path.display()
                );
            }
            Config::default().save(&ctx.config_path)?;
            println!("wrote {}", ctx.config_path.display());
            Ok(())
        }

        ConfigSubcommand::Validate => {
            let warnings = ctx.config.validate();
            if json {
                print_json(&warnings)?;
            } else if warnings.is_empty() {
                println!("config OK");
            } else {
                for w in &warnings {
                    let tag = match w.level {
                        WarnLevel::Warning => "warning",
                        WarnLevel::Error => "error",
                    };
                    println!("{tag}: {}", w.message);
                }
            }
            if warnings.iter().any(|w| w.level == WarnLevel::Error) {
                bail!("config has errors");
            }
            Ok(())
        }
    }
}
