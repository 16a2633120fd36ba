use clap::{Parser, Subcommand};
use env_logger::Env;
use folio::{config, export, output, serve, site::Site};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Server-rendered portfolio and blog")]
#[command(long_about = "\
Server-rendered portfolio and blog

Posts are Markdown files with a YAML front-matter block. The file name is
the slug, and every page is rendered from the sources on request.

Content structure:

  folio.toml                       # Site config (optional)
  content/
  ├── hello-world.mdx              # → /blog/hello-world
  └── on-craft.mdx                 # → /blog/on-craft
  public/
  └── images/banner.png            # → /images/banner.png

Post front-matter:

  ---
  title: On craft                  # required
  date: 2024-03-01                 # required, YYYY-MM-DD or RFC 3339
  description: Caring about the work
  bannerUrl: /images/banner.png
  bannerCredit: Photo by someone
  meta:
    keywords: [craft, mindset]
  ---

Run 'folio gen-config' to generate a documented folio.toml.")]
#[command(version)]
struct Cli {
    /// Site config file
    #[arg(long, default_value = "folio.toml", global = true)]
    config: PathBuf,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Render every route to static files
    Build {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Compile every post and report failures
    Check,
    /// Print the post listing, newest first
    List {
        /// Show at most this many posts
        #[arg(long)]
        limit: Option<usize>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Serve => {
            let site = load_site(&cli.config)?;
            serve::serve_site(Arc::new(site))?;
        }
        Command::Build { output: out_dir } => {
            let site = load_site(&cli.config)?;
            let report = export::export(&site, &out_dir)?;
            output::print_export(&report);
        }
        Command::Check => {
            let site = load_site(&cli.config)?;
            let outcomes = site.compiler().compile_all();
            output::print_check(&outcomes);
            if outcomes.iter().any(Result::is_err) {
                std::process::exit(1);
            }
        }
        Command::List { limit, json } => {
            let site = load_site(&cli.config)?;
            let listing = site.listing(limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&listing.posts)?);
            } else {
                output::print_listing(&listing);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `folio.toml` and scan the content directory.
fn load_site(config_path: &Path) -> Result<Site, Box<dyn std::error::Error>> {
    let site_config = config::load_config(config_path)?;
    init_thread_pool(&site_config.server);
    Ok(Site::load(site_config)?)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

/// Initialize the rayon thread pool used for listing compilation.
///
/// Sized like the request workers, so one listing can use every core.
fn init_thread_pool(server: &config::ServerConfig) {
    let threads = config::effective_threads(server);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
