use chrono::Local;
use clap::Parser;
use page_scribe::output::OutputTarget;
use page_scribe::{CrawlError, Pages};
use std::future::Future;
use std::process::ExitCode;

mod args;
use args::Args;

/// Exit status after Ctrl-C
const INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let default_filter = if args.verbose {
        "page_scribe=debug"
    } else {
        "page_scribe=info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match args.crawl_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.force_render || config.expand_tabs {
        ::log::info!(
            "Browser rendering needs a WebDriver server at {} (set WEBDRIVER_URL to change it)",
            config.webdriver_url
        );
    }

    let mut pages = Pages::new(&config.start_url).with_config(config);
    let start_time = std::time::Instant::now();

    let outcome = tokio::select! {
        result = run(&mut pages, &args) => Some(result),
        () = wait_for_interrupt(tokio::signal::ctrl_c()) => None,
    };

    // The browser is released on every exit path
    pages.shutdown().await;

    match outcome {
        Some(Ok(())) => {
            ::log::info!("Done in {:.2} seconds", start_time.elapsed().as_secs_f64());
            ExitCode::SUCCESS
        }
        Some(Err(e)) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
        None => {
            ::log::warn!("Interrupted, nothing was saved");
            ExitCode::from(INTERRUPTED)
        }
    }
}

/// Resolves once `signal` reports Ctrl-C; never resolves if it cannot be installed
async fn wait_for_interrupt<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        ::log::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run(pages: &mut Pages, args: &Args) -> Result<(), CrawlError> {
    let target = OutputTarget::default().with_file(args.output.clone());

    if args.crawl {
        let config = pages.config();
        ::log::info!(
            "Crawling {} (max {} pages{}{}{})",
            config.start_url,
            config.max_pages,
            config
                .max_depth
                .map(|d| format!(", depth {}", d))
                .unwrap_or_default(),
            config
                .path_prefix
                .as_ref()
                .map(|p| format!(", prefix '{}'", p))
                .unwrap_or_default(),
            if config.expand_tabs { ", tab expansion" } else { "" }
        );

        let report = pages.crawl().await?;
        let start_url = &pages.config().start_url;
        let now = Local::now().naive_local();

        if args.separate {
            target.write_separate(start_url, &report.pages, now)?;
        } else {
            target.write_combined(start_url, &report.pages, now)?;
        }
        ::log::info!(
            "{} pages saved, {} internal links found",
            report.pages.len(),
            report.links.len()
        );
    } else {
        let page = pages.scrape().await?;
        let url = &pages.config().start_url;
        let now = Local::now().naive_local();
        target.write_single_page(url, &page.title, &page.content, &page.links, now)?;
    }

    Ok(())
}
