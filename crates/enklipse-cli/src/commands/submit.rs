use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use enklipse_models::{CreateClipRequest, DEFAULT_NARRATOR};

use super::watch::{self, WatchArgs};
use crate::context::AppContext;

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Clip title (3-30 characters)
    #[arg(long)]
    pub title: String,

    /// Script text (100-500 words)
    #[arg(long, conflicts_with = "script_file", required_unless_present = "script_file")]
    pub script: Option<String>,

    /// Read the script from a file
    #[arg(long)]
    pub script_file: Option<PathBuf>,

    /// Narrator voice id (see `enklipse voices`)
    #[arg(long, default_value = DEFAULT_NARRATOR)]
    pub narrator: String,

    /// Render without burned-in captions
    #[arg(long)]
    pub no_captions: bool,

    /// Follow the render after submitting
    #[arg(long)]
    pub watch: bool,
}

pub async fn run(args: SubmitArgs, ctx: &AppContext) -> Result<()> {
    let script = match (&args.script, &args.script_file) {
        (Some(script), _) => script.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script file: {}", path.display()))?,
        (None, None) => anyhow::bail!("Either --script or --script-file is required"),
    };

    let request = CreateClipRequest::new(args.title, script)
        .with_narrator(args.narrator)
        .with_captions(!args.no_captions);

    let created = ctx
        .client
        .create_clip(&request)
        .await
        .context("Failed to submit clip")?;
    println!("Submitted clip {}", created.clip_id);

    if args.watch {
        watch::run(
            WatchArgs {
                clip_id: created.clip_id.to_string(),
                json: false,
            },
            ctx,
        )
        .await?;
    }
    Ok(())
}
