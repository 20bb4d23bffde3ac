//! Fetch command - route one request through the worker

use crate::cli::args::FetchArgs;
use crate::cli::WorkerHost;
use crate::error::{OffcacheError, OffcacheResult};
use crate::fetch::Fetcher;
use crate::request::{Request, Response};
use crate::ui::{self, UiContext};
use crate::worker::{FetchOutcome, ResponseSource};
use http::Method;
use std::io::Write;
use tokio::fs;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, host: &WorkerHost) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let (manager, _) = host.resume().await?;

    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| OffcacheError::User(format!("Invalid HTTP method: {}", args.method)))?;
    let mut request = Request::resolve(manager.policy().origin(), &args.url)?.with_method(method);
    if let Some(destination) = args.destination {
        request = request.with_destination(destination);
    }

    let outcome = manager.handle_fetch(request.clone()).await?;
    let (response, source) = match outcome {
        FetchOutcome::Respond { response, source } => (response, describe(source)),
        FetchOutcome::PassThrough => (host.fetcher().fetch(&request).await?, "passed through"),
    };

    ui::step_ok_detail(
        &ctx,
        &format!("{} {} -> {}", request.method, request.url, response.status),
        source,
    );
    ui::key_value(&ctx, "destination", request.destination.as_str());
    ui::key_value(&ctx, "content-type", response.content_type().unwrap_or("-"));
    ui::key_value(&ctx, "bytes", &response.body.len().to_string());

    write_body(&args, &response).await?;

    // Let a document revalidation started by this request complete
    manager.settle().await;

    Ok(())
}

fn describe(source: ResponseSource) -> &'static str {
    match source {
        ResponseSource::Cache => "cache",
        ResponseSource::Network => "network",
        ResponseSource::Fallback => "offline fallback",
    }
}

async fn write_body(args: &FetchArgs, response: &Response) -> OffcacheResult<()> {
    if let Some(ref path) = args.output {
        fs::write(path, &response.body)
            .await
            .map_err(|e| OffcacheError::io(format!("writing {}", path.display()), e))?;
    } else if args.print {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(&response.body)
            .and_then(|_| stdout.flush())
            .map_err(|e| OffcacheError::io("writing response body", e))?;
    }
    Ok(())
}
