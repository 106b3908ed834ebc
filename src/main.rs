use blogsmith::config::{self, Site};
use blogsmith::{draft, generate, indexnow, output, sitemap};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blogsmith")]
#[command(about = "Keyword-ledger blog generator with sitemap and IndexNow tooling")]
#[command(long_about = "\
Keyword-ledger blog generator with sitemap and IndexNow tooling

A CSV ledger lists one post per row; a content file per slug supplies the
body. Pages are rendered into the blog directory, then the whole site is
indexed into sitemap.xml and robots.txt and pushed to IndexNow.

Site structure:

  site-root/
  ├── site.toml                    # Config (optional, sparse over defaults)
  ├── index.html                   # Hand-written pages, listed in the sitemap
  ├── blog/                        # Generated pages land here
  └── blog-scripts/
      ├── keywords.csv             # The ledger
      ├── keywords-template.csv    # Seeds keywords.csv when it is missing
      ├── generated-urls.txt       # Written by generate, read by indexnow
      └── content/
          ├── my-post.json         # Structured sections (checked first)
          ├── my-post.html         # Raw markup
          └── my-post.md           # Light markdown (checked last)

Typical run:
  blogsmith draft        # optional: fill missing content via the Anthropic API
  blogsmith generate
  blogsmith sitemap
  blogsmith indexnow

Run 'blogsmith gen-config' to print a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (default: <root>/site.toml, optional)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug diagnostics on stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a page for every ledger row that has content
    Generate {
        /// Report what would be written without writing
        #[arg(long)]
        dry_run: bool,
        /// Only render this slug
        #[arg(long, value_name = "SLUG")]
        single: Option<String>,
    },
    /// Write sitemap.xml and robots.txt for the whole site
    Sitemap {
        /// Only list blog pages
        #[arg(long)]
        blogs_only: bool,
    },
    /// Submit URLs to IndexNow (default: the URLs from the last generate)
    Indexnow {
        /// Generate and save a new key
        #[arg(long, conflicts_with_all = ["all", "url"])]
        setup: bool,
        /// Submit every page in the blog directory
        #[arg(long, conflicts_with = "url")]
        all: bool,
        /// Submit a single URL or site path (e.g. /blog/my-post)
        #[arg(long, value_name = "PATH")]
        url: Option<String>,
    },
    /// Draft missing content files with the Anthropic API
    Draft {
        /// List what would be drafted without calling the API
        #[arg(long)]
        dry_run: bool,
        /// Only draft this slug
        #[arg(long, value_name = "SLUG")]
        single: Option<String>,
        /// Model short name from [drafting.models]
        #[arg(long)]
        model: Option<String>,
        /// Redraft slugs that already have content
        #[arg(long)]
        overwrite: bool,
    },
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "blogsmith=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let load_site = || Site::load(&cli.root, cli.config.as_deref());
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Command::Generate { dry_run, single } => {
            let site = load_site()?;
            let options = generate::GenerateOptions {
                dry_run,
                single,
                today,
            };
            let report = generate::generate(&site, &options)?;
            output::print_generate_output(&report, &site.root);
        }
        Command::Sitemap { blogs_only } => {
            let site = load_site()?;
            let options = sitemap::SitemapOptions { blogs_only, today };
            let report = sitemap::write_sitemap(&site, &options)?;
            output::print_sitemap_output(&report, &site.root);
        }
        Command::Indexnow { setup, all, url } => {
            let site = load_site()?;
            if setup {
                let key = indexnow::setup(&site)?;
                output::print_setup_output(&key, &site.root);
                return Ok(());
            }
            let urls = match (url, all) {
                (Some(path), _) => vec![site.absolute_url(&path)],
                (None, true) => indexnow::all_blog_urls(&site)?,
                (None, false) => indexnow::published_urls(&site)?,
            };
            let transport = indexnow::HttpTransport::new(Duration::from_secs(
                site.config.indexnow.timeout_secs,
            ))?;
            let report = indexnow::submit(&site, &transport, &urls)?;
            output::print_submit_output(&report);
        }
        Command::Draft {
            dry_run,
            single,
            model,
            overwrite,
        } => {
            let site = load_site()?;
            let drafting = &site.config.drafting;
            let api_key = draft::api_key_from_env(&drafting.api_key_env)?;
            let drafter = draft::AnthropicDrafter::new(api_key, drafting)?;
            let options = draft::DraftOptions {
                dry_run,
                single,
                model,
                overwrite,
            };
            let report = draft::draft_all(&site, &drafter, &options)?;
            output::print_draft_output(&report, &site.root);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
