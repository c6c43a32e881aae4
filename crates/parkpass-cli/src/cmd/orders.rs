use super::fmt_time;
use crate::context::Context;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use parkpass_core::orders::DEFAULT_RECENT_LIMIT;
use parkpass_core::types::OrderRecord;

#[derive(Subcommand)]
pub enum OrdersSubcommand {
    /// Orders whose entry time has not passed yet
    Active,
    /// Most recently created orders
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
}

pub fn run(ctx: &Context, subcmd: OrdersSubcommand, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let (orders, empty_msg) = match subcmd {
        OrdersSubcommand::Active => (store.orders().list_active()?, "no active orders"),
        OrdersSubcommand::Recent { limit } => (store.orders().list_recent(limit)?, "no orders yet"),
    };

    if json {
        return print_json(&orders);
    }
    if orders.is_empty() {
        println!("{empty_msg}");
        return Ok(());
    }
    print_table(
        &["ID", "VEHICLE", "PLATE", "ENTRY", "CREATED", "RESPONSE"],
        orders.iter().map(row).collect(),
    );
    Ok(())
}

fn row(o: &OrderRecord) -> Vec<String> {
    let response: String = o.response_text.chars().take(60).collect();
    vec![
        o.id.to_string(),
        o.vehicle_name.clone(),
        o.plate.clone(),
        fmt_time(o.entry_time),
        fmt_time(o.created_at),
        response,
    ]
}
