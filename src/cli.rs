use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytbrief",
    about = "YouTube transcript summarizer backend",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Address to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to config file [default: ~/.config/ytbrief/config.toml]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print effective configuration at startup
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from(["ytbrief", "--host", "0.0.0.0", "-p", "8080", "-v"]).unwrap();
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(8080));
        assert!(cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["ytbrief"]).unwrap();
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(!cli.verbose);
    }
}
