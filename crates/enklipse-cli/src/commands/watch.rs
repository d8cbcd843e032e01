use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use enklipse_models::ClipId;
use enklipse_status::{
    ApiClipStatusController, ChannelSink, ClipView, ControllerConfig, DisplayModel, NotificationLevel, Outcome,
    ViewState,
};

use crate::context::AppContext;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Clip to follow
    pub clip_id: String,

    /// Print the final view as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WatchArgs, ctx: &AppContext) -> Result<()> {
    let (sink, mut notifications) = ChannelSink::new();
    let controller = ApiClipStatusController::with_client(
        Arc::clone(&ctx.client),
        Arc::new(sink),
        ControllerConfig::from_env(),
    );

    let printer = tokio::spawn(async move {
        while let Some(n) = notifications.recv().await {
            let prefix = match n.level {
                NotificationLevel::Info => "info",
                NotificationLevel::Warning => "warning",
                NotificationLevel::Error => "error",
            };
            eprintln!("{}: {}: {}", prefix, n.title, n.description);
        }
    });

    let mut views = controller.subscribe();
    let quiet = args.json;
    let renderer = tokio::spawn(async move {
        let mut last = String::new();
        while views.changed().await.is_ok() {
            let line = render(&views.borrow_and_update());
            if !quiet && !line.is_empty() && line != last {
                println!("{}", line);
                last = line;
            }
        }
    });

    controller
        .initialize(ClipId::from(args.clip_id), ctx.identity.clone())
        .await
        .context("Failed to start watching clip")?;

    let view = tokio::select! {
        view = controller.settled() => view,
        _ = tokio::signal::ctrl_c() => {
            debug!("Interrupted, closing status stream");
            controller.dispose();
            controller.view()
        }
    };

    drop(controller);
    let _ = renderer.await;
    let _ = printer.await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    match view.state {
        ViewState::Ready {
            outcome: Outcome::Succeeded,
        } => Ok(()),
        _ if view.disposed && !view.state.is_terminal() => Ok(()),
        _ => anyhow::bail!("Clip did not finish rendering ({})", view.state.as_str()),
    }
}

fn render(view: &ClipView) -> String {
    match view.display() {
        DisplayModel::Empty => String::new(),
        DisplayModel::Spinner => match view.state {
            ViewState::Reconnecting { attempt } => format!("Reconnecting (attempt {})...", attempt),
            _ => "Waiting for progress...".to_string(),
        },
        DisplayModel::Progress { percentage, message } => format!("[{:>3}%] {}", percentage, message),
        DisplayModel::Player { media_url } => match media_url {
            Some(url) => format!("Ready: {}", url),
            None => "Ready".to_string(),
        },
        DisplayModel::Failed { message } => format!("Failed: {}", message),
        DisplayModel::Error { message } => format!("Error: {}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enklipse_models::ProgressSnapshot;

    #[test]
    fn test_render_progress_and_reconnect() {
        let mut view = ClipView {
            state: ViewState::Reconnecting { attempt: 2 },
            ..Default::default()
        };
        assert_eq!(render(&view), "Reconnecting (attempt 2)...");

        view.state = ViewState::Streaming;
        view.progress = Some(ProgressSnapshot::new(7, "Writing script"));
        assert_eq!(render(&view), "[  7%] Writing script");
    }

    #[test]
    fn test_render_idle_is_empty() {
        assert!(render(&ClipView::default()).is_empty());
    }
}
