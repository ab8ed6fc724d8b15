use clap::{Arg, ArgMatches, Command};

use crate::internal::config::config::{AppConfig, ServerMode};

pub fn build_cli() -> Command {
    // Leak the version string to get a 'static lifetime
    let version: &'static str =
        Box::leak(crate::internal::config::get_version_info().into_boxed_str());

    Command::new("specgate")
        .version(version)
        .about("MCP server for searching and calling the GET endpoints of an OpenAPI description")
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_parser(["stdio", "http"])
                .help("Server mode (stdio|http) [default: stdio]"),
        )
        .arg(
            Arg::new("spec-file")
                .long("spec-file")
                .short('s')
                .help("Path to the OpenAPI description (JSON or YAML)"),
        )
        .arg(
            Arg::new("adjustments-file")
                .long("adjustments-file")
                .help("Path to the adjustments file"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to config file (default: ./config.yaml, /etc/specgate/config.yaml)"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .help("Server host for http mode [default: 127.0.0.1]"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_parser(clap::value_parser!(u16))
                .help("Server port for http mode [default: 8000]"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .short('e')
                .alias("endpoint")
                .help("Upstream API base URL (e.g., https://api.example.com)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_parser(clap::value_parser!(f64))
                .help("Upstream request timeout in seconds [default: 30]"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log level (trace|debug|info|warn|error) [default: info]"),
        )
}

/// Layered configuration with command line flags on top.
pub fn parse_config(matches: &ArgMatches) -> anyhow::Result<AppConfig> {
    let config_file = matches.get_one::<String>("config").map(String::as_str);
    let mut config = AppConfig::load(config_file)?;

    if let Some(mode) = matches.get_one::<String>("mode") {
        config.server.mode = match mode.as_str() {
            "http" => ServerMode::Http,
            _ => ServerMode::Stdio,
        };
    }
    if let Some(spec_file) = matches.get_one::<String>("spec-file") {
        config.spec_file = spec_file.clone();
    }
    if let Some(adjustments_file) = matches.get_one::<String>("adjustments-file") {
        config.adjustments_file = Some(adjustments_file.clone());
    }
    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }
    if let Some(url) = matches.get_one::<String>("base-url") {
        config.endpoint.base_url = url.clone();
    }
    if let Some(timeout) = matches.get_one::<f64>("timeout") {
        config.endpoint.timeout_seconds = *timeout;
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    config.validate()?;
    Ok(config)
}
