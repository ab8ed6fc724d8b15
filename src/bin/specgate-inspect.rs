//! Load an API description and print the resulting endpoint registry as JSON.

use anyhow::Context;
use clap::{Arg, Command};
use serde_json::json;
use specgate::internal::parser::{Adjuster, SpecParser};

fn main() -> anyhow::Result<()> {
    let matches = Command::new("specgate-inspect")
        .version(specgate::internal::config::VERSION)
        .about("Print the GET endpoints and parameters registered from an API description")
        .arg(
            Arg::new("spec-file")
                .long("spec-file")
                .short('s')
                .required(true)
                .help("Path to the OpenAPI description (JSON or YAML)"),
        )
        .arg(
            Arg::new("adjustments-file")
                .long("adjustments-file")
                .help("Path to the adjustments file"),
        )
        .get_matches();

    let mut adjuster = Adjuster::new();
    if let Some(file) = matches.get_one::<String>("adjustments-file") {
        adjuster.load(file)?;
    }

    let spec_file = matches
        .get_one::<String>("spec-file")
        .context("--spec-file is required")?;
    let registry = SpecParser::new(adjuster)
        .parse_file(spec_file)
        .with_context(|| format!("Failed to load {}", spec_file))?;

    let output = json!({
        "count": registry.len(),
        "endpoints": registry.endpoints(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
