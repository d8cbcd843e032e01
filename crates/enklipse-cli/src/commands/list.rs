use anyhow::{Context, Result};
use clap::Args;

use enklipse_models::PageRequest;

use crate::context::AppContext;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page number (the first page is 0)
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// Clips per page (1-100)
    #[arg(long)]
    pub page_size: Option<u32>,
}

pub async fn run(args: ListArgs, ctx: &AppContext) -> Result<()> {
    let request = PageRequest::new(args.page, args.page_size);
    let page = ctx
        .client
        .list_clips(request)
        .await
        .context("Failed to list clips")?;

    if page.clips.is_empty() {
        println!("No clips found.");
        return Ok(());
    }

    println!("{:<38} {:<11} {:<32} URL", "ID", "STATUS", "TITLE");
    for clip in &page.clips {
        println!(
            "{:<38} {:<11} {:<32} {}",
            clip.id.as_str(),
            clip.status.as_str(),
            clip.title,
            clip.playable_url().unwrap_or("-")
        );
    }

    println!("Page {} of {}", request.page_number + 1, page.total_pages.max(1));
    if page.has_more(&request) {
        println!("More: enklipse list --page {}", request.next().page_number);
    }
    Ok(())
}
