use crate::context::Context;
use crate::output::print_json;
use anyhow::bail;
use parkpass_core::adapter::SubmissionAdapter;

pub fn run(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let adapter = SubmissionAdapter::from_config(&ctx.config);
    let rt = tokio::runtime::Runtime::new()?;
    let reachable = rt.block_on(adapter.check_site());

    if json {
        print_json(&serde_json::json!({
            "site_url": ctx.config.site_url,
            "reachable": reachable,
        }))?;
    } else if reachable {
        println!("{} is reachable", ctx.config.site_url);
    }

    if !reachable {
        bail!("{} is not reachable", ctx.config.site_url);
    }
    Ok(())
}
