use asciidoc_pages::pipeline::{self, BuildError};
use asciidoc_pages::{config, output, scroll};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "asciidoc-pages")]
#[command(about = "Turn Asciidoc documents into page nodes for a static site")]
#[command(long_about = "\
Turn Asciidoc documents into page nodes for a static site

Every file with a configured extension is converted to HTML and described by
a node: title parts, revision, author, front matter, and any `:page-*:`
attributes decoded as YAML. The nodes are written to nodes.json for the site
generator to query.

Content structure:

  content/
  ├── asciidoc-pages.toml          # Config (optional)
  ├── index.adoc                   # → node
  ├── guides/
  │   ├── install.asciidoc         # → node (front matter allowed)
  │   └── diagram.png              # Not Asciidoc: skipped
  └── .drafts/                     # Hidden: not scanned

Page attributes:
  :page-order: 3                   → pageAttributes.order = 3
  :page-tags: [a, b]               → pageAttributes.tags = [\"a\", \"b\"]
  :page-draft:                     → pageAttributes.draft = \"\" (empty marker)

Run 'asciidoc-pages gen-config' to generate a documented asciidoc-pages.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Override the configured path prefix (e.g. "/docs")
    #[arg(long, global = true)]
    path_prefix: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transform every document and write nodes.json
    Build,
    /// Transform every document without writing anything
    Check,
    /// Print a stock asciidoc-pages.toml with all options documented
    GenConfig,
    /// Print the scroll restoration script for anchor links
    ScrollScript {
        /// Write the script into the output directory instead of printing it
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let config = load_config(&cli.source, cli.path_prefix.as_deref())?;

            println!("==> Stage 1: Scanning {}", cli.source.display());
            output::print_config_output(&config, has_config_file(&cli.source));

            println!("==> Stage 2: Transforming documents");
            let report = exit_on_fatal(pipeline::run(&cli.source, Some(&cli.output), &config))?;
            output::print_build_output(&report);

            println!("==> Stage 3: Writing nodes → {}", cli.output.display());
            let path = pipeline::write_manifest(&report.manifest, &cli.output)?;
            println!("==> Build complete: {}", path.display());
        }
        Command::Check => {
            let config = load_config(&cli.source, cli.path_prefix.as_deref())?;
            println!("==> Checking {}", cli.source.display());
            output::print_config_output(&config, has_config_file(&cli.source));
            let report = exit_on_fatal(pipeline::run(&cli.source, Some(&cli.output), &config))?;
            output::print_build_output(&report);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::ScrollScript { write } => {
            if write {
                std::fs::create_dir_all(&cli.output)?;
                let path = cli.output.join(scroll::SCROLL_SCRIPT_FILENAME);
                std::fs::write(&path, scroll::SCROLL_RESTORE_SCRIPT)?;
                println!("==> Wrote {}", path.display());
            } else {
                print!("{}", scroll::SCROLL_RESTORE_SCRIPT);
            }
        }
    }

    Ok(())
}

/// Load config from the content root, applying the CLI path prefix override.
fn load_config(
    source: &Path,
    path_prefix: Option<&str>,
) -> Result<config::SiteConfig, config::ConfigError> {
    let mut site_config = config::load_config(source)?;
    if let Some(prefix) = path_prefix {
        site_config.path_prefix = prefix.to_string();
        site_config.validate()?;
    }
    Ok(site_config)
}

fn has_config_file(source: &Path) -> bool {
    source.join(config::CONFIG_FILENAME).exists()
}

/// Print every fatal report and exit non-zero; pass other results through.
fn exit_on_fatal<T>(result: Result<T, BuildError>) -> Result<T, BuildError> {
    if let Err(BuildError::Fatal(reports)) = &result {
        output::print_fatal_errors(reports);
        std::process::exit(1);
    }
    result
}
