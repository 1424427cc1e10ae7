use std::path::PathBuf;

use clap::Parser;

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|parse_error| format!("failed to parse integer: {parse_error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "revbot",
    about = "Auto-response monitor for a project comment thread",
    version
)]
/// Public struct `Cli` for the revbot binary.
pub struct Cli {
    #[arg(
        long,
        env = "REVBOT_CONFIG",
        default_value = "config.json",
        help = "Path to the monitor JSON configuration file."
    )]
    pub config: PathBuf,

    #[arg(
        long = "poll-interval-seconds",
        env = "REVBOT_POLL_INTERVAL_SECONDS",
        value_parser = parse_positive_u64,
        help = "Override the poll interval from the configuration file."
    )]
    pub poll_interval_seconds: Option<u64>,

    #[arg(long, help = "Run exactly one poll tick and exit.")]
    pub poll_once: bool,

    #[arg(
        long = "request-timeout-ms",
        env = "REVBOT_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Per-request HTTP timeout in milliseconds."
    )]
    pub request_timeout_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn unit_cli_defaults_apply_without_flags() {
        let cli = Cli::try_parse_from(["revbot"]).expect("parse");
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.poll_interval_seconds, None);
        assert!(!cli.poll_once);
        assert_eq!(cli.request_timeout_ms, 30_000);
    }

    #[test]
    fn functional_cli_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "revbot",
            "--config",
            "/etc/revbot/monitor.json",
            "--poll-interval-seconds",
            "30",
            "--poll-once",
        ])
        .expect("parse");
        assert_eq!(cli.config, PathBuf::from("/etc/revbot/monitor.json"));
        assert_eq!(cli.poll_interval_seconds, Some(30));
        assert!(cli.poll_once);
    }

    #[test]
    fn regression_cli_rejects_zero_poll_interval() {
        let parse_error = Cli::try_parse_from(["revbot", "--poll-interval-seconds", "0"])
            .expect_err("zero interval should fail");
        assert!(parse_error.to_string().contains("greater than 0"));
    }
}
