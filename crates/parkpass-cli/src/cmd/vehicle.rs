use crate::context::Context;
use crate::output::{print_json, print_table};
use anyhow::bail;
use clap::Subcommand;
use parkpass_core::types::Vehicle;

#[derive(Subcommand)]
pub enum VehicleSubcommand {
    /// List registered vehicles
    List,
    /// Register a vehicle
    Add {
        /// Short name used in messages (stored lowercase)
        name: String,
        /// Plate, e.g. "А606ВО 797"
        plate: String,
        /// Make or model shown on the pass
        model: String,
    },
    /// Remove a vehicle by name; a numeric target with no such name is tried as an id
    Remove {
        target: String,
        /// Treat TARGET as an id only, skipping the name lookup
        #[arg(long)]
        id: bool,
    },
    /// Show a single vehicle
    Show { name: String },
}

pub fn run(ctx: &Context, subcmd: VehicleSubcommand, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let vehicles = store.vehicles();

    match subcmd {
        VehicleSubcommand::List => {
            let all = vehicles.list_all()?;
            if json {
                return print_json(&all);
            }
            if all.is_empty() {
                println!("no vehicles registered");
                println!("\nAdd one:  parkpass vehicle add <name> <plate> <model>");
                return Ok(());
            }
            print_table(&["ID", "NAME", "PLATE", "MODEL"], all.iter().map(row).collect());
            Ok(())
        }

        VehicleSubcommand::Add { name, plate, model } => {
            let v = vehicles.add(&name, &plate, &model)?;
            if json {
                return print_json(&v);
            }
            println!("added vehicle '{}' (id {})", v.name, v.id);
            Ok(())
        }

        VehicleSubcommand::Remove { target, id } => {
            let numeric = target.trim().parse::<i64>().ok();
            let removed = if id {
                let Some(id) = numeric else {
                    bail!("--id expects a numeric id, got '{target}'");
                };
                vehicles.delete_by_id(id)?
            } else {
                vehicles.delete_by_name(&target)?
                    || match numeric {
                        Some(id) => vehicles.delete_by_id(id)?,
                        None => false,
                    }
            };
            if !removed {
                bail!("vehicle not found: {target}");
            }
            if json {
                return print_json(&serde_json::json!({ "removed": target }));
            }
            println!("removed vehicle '{target}'");
            Ok(())
        }

        VehicleSubcommand::Show { name } => {
            let Some(v) = vehicles.find_by_name(&name)? else {
                bail!("vehicle not found: {name}");
            };
            if json {
                return print_json(&v);
            }
            println!("{v}");
            Ok(())
        }
    }
}

fn row(v: &Vehicle) -> Vec<String> {
    vec![
        v.id.to_string(),
        v.name.clone(),
        v.plate.clone(),
        v.model.clone(),
    ]
}
