use crate::context::Context;
use parkpass_core::adapter::SubmissionAdapter;
use parkpass_core::dispatch::{Dispatcher, Reply};
use std::io::{BufRead, Write};

/// Read one message per line from stdin and print the bot's replies.
pub fn run(ctx: &Context, user: i64) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let adapter = SubmissionAdapter::from_config(&ctx.config);
    let mut bot = Dispatcher::new(&store, adapter)
        .with_default_vehicle(ctx.config.default_vehicle.clone())
        .with_pending_ttl(ctx.config.pending_ttl());

    let rt = tokio::runtime::Runtime::new()?;
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    tracing::info!(user, db = %ctx.db_path.display(), "chat session started");
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        for reply in rt.block_on(bot.handle(user, &line)) {
            render(&mut stdout, &reply)?;
        }
        stdout.flush()?;
    }
    Ok(())
}

fn render(out: &mut impl Write, reply: &Reply) -> std::io::Result<()> {
    match reply {
        Reply::Text(text) => writeln!(out, "{text}\n"),
        Reply::ChooseVehicle { prompt, vehicles } => {
            writeln!(out, "{prompt}")?;
            for v in vehicles {
                writeln!(out, "  [{}] {v}", v.id)?;
            }
            writeln!(out)
        }
    }
}
