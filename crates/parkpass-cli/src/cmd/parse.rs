use super::fmt_time;
use crate::context::Context;
use crate::output::print_json;
use parkpass_core::{parser, ParkpassError};

pub fn run(ctx: &Context, text: &str, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let vehicles = store.vehicles().list_all()?;
    let parsed = parser::parse_message_now(text, &vehicles);

    if json {
        print_json(&parsed)?;
    } else {
        println!(
            "vehicle:    {}",
            parsed.vehicle.as_deref().unwrap_or("(unresolved)")
        );
        println!(
            "entry time: {}",
            parsed
                .entry_time
                .map(fmt_time)
                .unwrap_or_else(|| "(not recognised)".to_string())
        );
    }

    if parsed.entry_time.is_none() {
        return Err(ParkpassError::ParseFailure(text.to_string()).into());
    }
    Ok(())
}
