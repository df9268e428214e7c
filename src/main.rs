use clap::{Parser, Subcommand};
use colophon::schema::SchemaRegistry;
use colophon::{config, generate, load, output, resolve};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "colophon")]
#[command(about = "Content-collection build pipeline for personal sites")]
#[command(long_about = "\
Content-collection build pipeline for personal sites

Your filesystem is the data source. One directory per collection, one
markdown file per record, TOML front matter validated against the
collection schema before anything renders.

Content structure:

  content/
  ├── site.toml                    # Site config (optional)
  ├── posts/
  │   ├── hello-world.md           # +++ front matter +++ body
  │   └── 2024/year-in-review.md   # Nested dirs become route segments
  ├── talks/
  │   └── ship-it-safely.md        # events = [\"rustconf-2024\"]
  ├── events/                      # Data-only: referenced, never routed
  ├── sponsors/
  ├── hardware/
  ├── services/
  ├── software/
  └── testimonials/

Every record must satisfy its collection schema; a missing field, bad
date, dangling reference, or slug collision aborts the build.

Run 'colophon gen-config' to print a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".colophon-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load and validate all collections into a manifest
    Load,
    /// Validate content and references without building
    Check,
    /// Run the full pipeline: load → resolve → generate
    Build,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let schemas = SchemaRegistry::builtin();

    match cli.command {
        Command::Load => {
            let manifest = load::load_all(&cli.source, &schemas)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let manifest_path = cli.temp_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_load_output(&manifest);
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = load::load_all(&cli.source, &schemas)?;

            // Slug uniqueness and reference resolution are part of the
            // validity gate, not just build steps.
            let registry = resolve::CollectionRegistry::from_manifest(&manifest)?;
            for def in schemas.iter() {
                resolve::resolve_references(
                    manifest.records(&def.name),
                    &def.schema,
                    &registry,
                )?;
            }

            output::print_load_output(&manifest);
            println!("==> Content is valid");
        }
        Command::Build => {
            println!("==> Stage 1: Loading {}", cli.source.display());
            let manifest = load::load_all(&cli.source, &schemas)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let manifest_path = cli.temp_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_load_output(&manifest);

            println!("==> Stage 2+3: Generating HTML → {}", cli.output.display());
            let summary = generate::generate(&manifest, &schemas, &cli.output)?;
            output::print_build_output(&summary);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
