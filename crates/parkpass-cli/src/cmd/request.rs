use super::fmt_time;
use crate::context::Context;
use crate::output::print_json;
use anyhow::{anyhow, bail};
use parkpass_core::adapter::{Submit, SubmissionAdapter};
use parkpass_core::types::{ParsedRequest, VehicleRef};
use parkpass_core::{parser, ParkpassError};

pub fn run(ctx: &Context, text: &str, vehicle: Option<&str>, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let vehicles = store.vehicles().list_all()?;
    let parsed = parser::parse_message_now(text, &vehicles);

    let Some(entry_time) = parsed.entry_time else {
        bail!(
            "{}\nexamples: \"15:30\", \"завтра 10:00\", \"секвойя 18:45\"",
            ParkpassError::ParseFailure(text.to_string())
        );
    };

    let wanted = parsed
        .vehicle
        .or_else(|| vehicle.map(str::to_string))
        .or_else(|| ctx.config.default_vehicle.clone());
    let request = ParsedRequest {
        vehicle: match wanted {
            Some(name) => match store.vehicles().find_by_name(&name)? {
                Some(v) => VehicleRef::Resolved(v),
                None => return Err(ParkpassError::VehicleNotFound(name).into()),
            },
            None => VehicleRef::Unresolved,
        },
        entry_time,
    };
    let Some(v) = request.vehicle.as_vehicle() else {
        bail!("message names no vehicle and no default is configured; pass --vehicle <name>");
    };

    if !json {
        println!("vehicle:    {v}");
        println!("entry time: {}", fmt_time(request.entry_time));
    }

    let adapter = SubmissionAdapter::from_config(&ctx.config);
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(adapter.submit(&v.plate, &v.model, request.entry_time));

    let order_id = store.orders().append(
        &v.name,
        &v.plate,
        &v.model,
        request.entry_time,
        &result.message,
    )?;

    if json {
        print_json(&serde_json::json!({
            "order_id": order_id,
            "vehicle": v,
            "entry_time": request.entry_time,
            "success": result.success,
            "message": result.message,
        }))?;
    } else {
        println!("order:      #{order_id}");
        println!("\n{}", result.message);
    }

    if !result.success {
        return Err(anyhow!("pass request failed (recorded as order #{order_id})"));
    }
    Ok(())
}
