//! CLI subcommands.

use anyhow::Result;
use clap::Subcommand;

use crate::context::AppContext;

mod list;
mod publish;
mod submit;
mod voices;
mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a script for rendering
    Submit(submit::SubmitArgs),
    /// Follow a clip until it finishes rendering
    Watch(watch::WatchArgs),
    /// List your clips
    List(list::ListArgs),
    /// Publish a finished clip to YouTube
    Publish(publish::PublishArgs),
    /// Show the narrator voice catalog
    Voices,
}

pub async fn run(command: Command, ctx: &AppContext) -> Result<()> {
    match command {
        Command::Submit(args) => submit::run(args, ctx).await,
        Command::Watch(args) => watch::run(args, ctx).await,
        Command::List(args) => list::run(args, ctx).await,
        Command::Publish(args) => publish::run(args, ctx).await,
        Command::Voices => {
            voices::run();
            Ok(())
        }
    }
}
