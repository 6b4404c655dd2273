use clap::{Parser, Subcommand};
use device_pages::template::OpenBekenTemplate;
use device_pages::{config, output, publish, site};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "device-pages")]
#[command(about = "Static page generator for IoT device catalogs")]
#[command(long_about = "\
Static page generator for IoT device catalogs

The project directory is mirrored into the publish directory, then one HTML
page is generated per device in the catalog, each listing the devices with the
most similar pin assignments. A sitemap covering every device page and the
listing page is written last.

Project structure:

  webapp/
  ├── site.toml                    # Config (optional)
  ├── devices.json                 # Catalog: {\"devices\": [ ... ]}
  ├── index.html                   # Copied verbatim
  ├── devicesList.html             # Listing page, linked from every device page
  └── gh-pages/                    # Publish directory, rebuilt from scratch
      ├── devices/<name>.html      # One page per device
      └── sitemap.xml

Run 'device-pages gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Publish directory [default: <source>/<output_dir from site.toml>]
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: publish → device pages → sitemap
    Build,
    /// Mirror the project into the publish directory only
    Publish,
    /// Load the catalog and list the pages a build would write
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let site_config = config::load_config(&cli.source)?;
            let output_dir = resolve_output(&cli.source, cli.output.as_deref(), &site_config);

            println!(
                "==> Building {} \u{2192} {}",
                cli.source.display(),
                output_dir.display()
            );
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_build_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = site::build(
                &cli.source,
                &output_dir,
                &site_config,
                &OpenBekenTemplate,
                Some(tx),
            );
            printer.join().ok();
            let report = result?;
            output::print_build_summary(&report);

            println!("==> Build complete: {}", output_dir.display());
        }
        Command::Publish => {
            let site_config = config::load_config(&cli.source)?;
            let output_dir = resolve_output(&cli.source, cli.output.as_deref(), &site_config);

            println!("==> Publishing {}", cli.source.display());
            let mirror = publish::publish(&cli.source, &output_dir, &site_config.publish.exclude)?;
            output::print_publish_output(&mirror, &output_dir);
        }
        Command::Check => {
            let site_config = config::load_config(&cli.source)?;
            println!("==> Checking {}", cli.source.display());
            let report = site::check(&cli.source, &site_config, &OpenBekenTemplate)?;
            output::print_check_output(&report);
            println!("==> Catalog is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// The publish directory: `--output` if given, else `output_dir` under the
/// project root.
fn resolve_output(source: &Path, cli_output: Option<&Path>, site_config: &config::SiteConfig) -> PathBuf {
    match cli_output {
        Some(path) => path.to_path_buf(),
        None => source.join(&site_config.output_dir),
    }
}
