//! Content command - read projects and posts out of the cache

use crate::cli::args::{ContentArgs, OutputFormat};
use crate::cli::WorkerHost;
use crate::content::{parse_posts, parse_projects, Post, Project};
use crate::error::{OffcacheError, OffcacheResult};
use crate::request::resolve_url;
use crate::ui::{self, UiContext};
use crate::worker::OfflineCacheManager;
use console::style;
use serde::Serialize;
use url::Url;

#[derive(Debug, Serialize)]
struct ContentListing {
    projects: Vec<Project>,
    posts: Vec<Post>,
}

/// Execute the content command
pub async fn execute(args: ContentArgs, host: &WorkerHost) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let config = host.config();
    let origin = Url::parse(&config.origin.base_url).map_err(|e| OffcacheError::InvalidUrl {
        url: config.origin.base_url.clone(),
        reason: e.to_string(),
    })?;
    let worker = host.new_worker()?;

    let projects_url = resolve_url(&origin, &config.content.projects)?;
    let projects = match cached_body(&worker, &projects_url).await? {
        Some(body) => parse_projects(projects_url.as_str(), &body)?,
        None => {
            ui::step_warn_hint(
                &ctx,
                &format!("{} is not cached", projects_url),
                "Run: offcache install",
            );
            vec![]
        }
    };

    let posts_url = resolve_url(&origin, &config.content.posts)?;
    let mut posts = match cached_body(&worker, &posts_url).await? {
        Some(body) => parse_posts(posts_url.as_str(), &body)?,
        None => {
            ui::step_warn_hint(
                &ctx,
                &format!("{} is not cached", posts_url),
                "Run: offcache install",
            );
            vec![]
        }
    };
    posts.sort_by(|a, b| b.date.cmp(&a.date));

    let listing = ContentListing {
        projects: projects
            .into_iter()
            .filter(|p| p.in_category(&args.category))
            .collect(),
        posts,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Plain => {
            for project in &listing.projects {
                println!("project\t{}\t{}", project.id, project.title);
            }
            for post in &listing.posts {
                println!("post\t{}\t{}", post.date, post.title);
            }
        }
        OutputFormat::Table => print_table(&ctx, &listing),
    }

    Ok(())
}

async fn cached_body(worker: &OfflineCacheManager, url: &Url) -> OffcacheResult<Option<Vec<u8>>> {
    Ok(worker
        .lookup(url)
        .await?
        .map(|entry| entry.response.body.to_vec()))
}

fn print_table(ctx: &UiContext, listing: &ContentListing) {
    ui::section(ctx, &format!("Projects ({})", listing.projects.len()));
    for project in &listing.projects {
        println!(
            "  {:<28} {:<12} {}",
            project.title,
            style(&project.category).cyan(),
            style(project.tags.join(", ")).dim()
        );
    }

    ui::section(ctx, &format!("Posts ({})", listing.posts.len()));
    for post in &listing.posts {
        println!("  {}  {}", style(post.date).dim(), post.title);
    }
}
