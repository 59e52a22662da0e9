// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
//   deadsniper <SITEMAP_URL>
//   deadsniper -s|--strict <SITEMAP_URL>
//   deadsniper -h|--help
//   deadsniper -V|--version
//
// Without a sitemap URL the usage text goes to stdout and the exit code is 0.
//
// The flags are resolved into a CheckConfig exactly once, before anything
// touches the network.
// =============================================================================

use clap::{ArgAction, CommandFactory, Parser};

use crate::checker::{ExtractorKind, TolerancePolicy};
use crate::crawl::CheckConfig;
use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "deadsniper",
    version,
    about = "Checks every link on every page of a sitemap",
    long_about = "deadsniper fetches a sitemap, visits each page it lists and probes every \
                  https:// link found on those pages. It exits with 1 if any link is dead, \
                  which makes it handy in CI."
)]
pub struct Cli {
    /// URL of the sitemap.xml to check
    pub sitemap_url: Option<String>,

    /// Strict mode: only 200 OK counts as alive
    ///
    /// Without this flag 400, 403, 429 and 202 are tolerated, since sites
    /// often answer bots with them.
    #[arg(short, long)]
    pub strict: bool,

    /// Print one JSON object per result instead of a text line
    #[arg(long)]
    pub json: bool,

    /// Maximum number of links probed at the same time (default: no limit)
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// How links are found in a page
    #[arg(long, value_enum, default_value_t = ExtractorKind::Quoted)]
    pub extractor: ExtractorKind,

    /// Skip pages that can't be fetched instead of aborting the run
    #[arg(long)]
    pub keep_going: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// The run configuration, or None when no sitemap URL was given.
    pub fn check_config(&self) -> Option<CheckConfig> {
        let sitemap_url = self.sitemap_url.clone()?;
        Some(CheckConfig {
            extractor: self.extractor,
            concurrency: self.concurrency.filter(|&limit| limit > 0),
            keep_going: self.keep_going,
            ..CheckConfig::new(sitemap_url, TolerancePolicy::from_strict_flag(self.strict))
        })
    }
}

/// Full help text, printed to stdout when the tool is run without a URL.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_normal_mode() {
        let cli = Cli::try_parse_from(["deadsniper", "https://example.com/sitemap.xml"]).unwrap();
        let config = cli.check_config().unwrap();
        assert_eq!(config.sitemap_url, "https://example.com/sitemap.xml");
        assert!(!config.policy.is_strict());
        assert_eq!(config.extractor, ExtractorKind::Quoted);
        assert_eq!(config.concurrency, None);
        assert_eq!(cli.output_format(), OutputFormat::Text);
    }

    #[test]
    fn test_strict_short_and_long() {
        for flag in ["-s", "--strict"] {
            let cli = Cli::try_parse_from(["deadsniper", flag, "https://example.com/sitemap.xml"])
                .unwrap();
            assert!(cli.check_config().unwrap().policy.is_strict());
        }
    }

    #[test]
    fn test_strict_after_url() {
        let cli =
            Cli::try_parse_from(["deadsniper", "https://example.com/sitemap.xml", "-s"]).unwrap();
        assert!(cli.check_config().unwrap().policy.is_strict());
    }

    #[test]
    fn test_optional_flags() {
        let cli = Cli::try_parse_from([
            "deadsniper",
            "--json",
            "--concurrency",
            "16",
            "--extractor",
            "html",
            "--keep-going",
            "-vv",
            "https://example.com/sitemap.xml",
        ])
        .unwrap();
        let config = cli.check_config().unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Json);
        assert_eq!(config.concurrency, Some(16));
        assert_eq!(config.extractor, ExtractorKind::Html);
        assert!(config.keep_going);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_zero_concurrency_means_unbounded() {
        let cli = Cli::try_parse_from(["deadsniper", "--concurrency", "0", "https://x.example/"])
            .unwrap();
        assert_eq!(cli.check_config().unwrap().concurrency, None);
    }

    #[test]
    fn test_help_and_version_are_not_errors() {
        use clap::error::ErrorKind;

        let err = Cli::try_parse_from(["deadsniper", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["deadsniper", "-V"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_missing_url_falls_back_to_usage() {
        let cli = Cli::try_parse_from(["deadsniper"]).unwrap();
        assert!(cli.sitemap_url.is_none());
        assert!(cli.check_config().is_none());

        let usage = usage();
        assert!(usage.contains("Usage: deadsniper"));
        assert!(usage.contains("--strict"));
    }

    #[test]
    fn test_strict_without_url_falls_back_to_usage() {
        let cli = Cli::try_parse_from(["deadsniper", "-s"]).unwrap();
        assert!(cli.strict);
        assert!(cli.check_config().is_none());
    }
}
