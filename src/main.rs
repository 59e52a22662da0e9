// src/main.rs
// =============================================================================
// Entry point.
//
// 1. Parse command-line arguments (clap handles --help and --version)
// 2. Set up logging on stderr; stdout only carries result lines
// 3. Walk the sitemap and probe every link
// 4. Exit with 0 = all links alive or tolerated, 1 = dead links found,
//    2 = the run itself failed (sitemap or page could not be fetched)
// =============================================================================

mod checker; // src/checker/ - link probing, policy, coordination
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - sitemap and page fetching
mod report; // src/report.rs - result lines

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

use crawl::SitemapChecker;
use report::Reporter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", report::error_chain(&*e));
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32> {
    // No sitemap given: show usage on stdout and succeed.
    let Some(config) = cli.check_config() else {
        println!("{}", cli::usage());
        return Ok(0);
    };

    let checker = SitemapChecker::new(&config)?;
    let reporter = Reporter::new(std::io::stdout(), cli.output_format());

    let (summary, _) = checker.run(&config.sitemap_url, reporter).await?;

    if summary.failed() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// RUST_LOG wins when set; otherwise -v/-vv pick the level.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("deadsniper={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
