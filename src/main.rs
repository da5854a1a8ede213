use clap::Parser;
use page_from_wiki::config::{self, DEFAULT_CONFIG_FILE};
use page_from_wiki::fetch::WikiClient;
use page_from_wiki::output;
use page_from_wiki::pipeline::{self, PipelineError, Report, Request};
use page_from_wiki::publish::{DirectoryStore, ObjectStore, S3Store};
use page_from_wiki::render::SiteTemplates;
use page_from_wiki::types::PageKind;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "page-from-wiki")]
#[command(about = "Parse a wiki page and publish it as static HTML")]
#[command(long_about = "\
Parse a wiki page and publish it as static HTML

Fetches the rendered page from the wiki API, rewrites wiki links to
/<Title>.html, drops links to pages that do not exist, fills the page
template and writes <Title>.html (spaces become underscores).

Without --s3 the page is written to the output directory (default: dist/).
With --s3 it is uploaded to the configured bucket as public-read text/html.

Run 'page-from-wiki --print-config' for a documented config file.")]
#[command(version)]
struct Cli {
    /// The name of the wiki page to parse
    #[arg(required_unless_present = "print_config")]
    wikipage: Option<String>,

    /// The name of the file to upload/write to, without .html
    output_file_name: Option<String>,

    /// The name of the remote page to redirect to
    #[arg(short, long)]
    redirect: Option<String>,

    /// Upload the page to the S3 website bucket
    #[arg(long)]
    s3: bool,

    /// Fetch and render, but write or upload nothing
    #[arg(long)]
    dryrun: bool,

    /// Treat the page as a category page (member listing included)
    #[arg(long)]
    category: bool,

    /// Config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output directory, overrides publish.output_dir
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log requests and rewrite counts to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print a stock config file with all options documented
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.print_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(report) => {
            output::print_report(&report);
            ExitCode::SUCCESS
        }
        Err(PipelineError::Remote(err)) => {
            output::print_api_error(&err);
            eprintln!("Error in parsed page.");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Report, PipelineError> {
    let request = Request {
        title: cli.wikipage.clone().unwrap_or_default(),
        output_name: cli.output_file_name.clone(),
        redirect: cli.redirect.clone(),
        kind: if cli.category {
            PageKind::Category
        } else {
            PageKind::Article
        },
    };
    pipeline::validate_request(&request)?;

    let mut config = config::load_config(&cli.config)?;
    if let Some(dir) = &cli.output {
        config.publish.output_dir = dir.display().to_string();
    }

    let client = WikiClient::new(&config.wiki)?;
    let templates = SiteTemplates::new(&config.site);

    let store: Box<dyn ObjectStore> = if cli.s3 {
        Box::new(S3Store::new(config.publish.region.as_deref()))
    } else {
        Box::new(DirectoryStore::new(&config.publish.output_dir))
    };
    pipeline::run(
        &config,
        &request,
        &client,
        &templates,
        store.as_ref(),
        cli.dryrun,
    )
}

/// Our own diagnostics at `warn` (or `debug` with `--verbose`); `RUST_LOG` wins.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,page_from_wiki={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
