use anyhow::{Context, Result};
use clap::Args;

use enklipse_models::{ConnectionType, PublishRequest};

use crate::context::AppContext;

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Clip to publish
    pub clip_id: String,
}

pub async fn run(args: PublishArgs, ctx: &AppContext) -> Result<()> {
    let request = PublishRequest::youtube(args.clip_id);
    ctx.client
        .publish(&request)
        .await
        .context("Failed to publish clip")?;

    let targets: Vec<&str> = request
        .connection_types
        .iter()
        .map(ConnectionType::display_name)
        .collect();
    println!("Published clip {} to {}", request.clip_id, targets.join(", "));
    Ok(())
}
