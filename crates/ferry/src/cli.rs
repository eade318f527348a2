use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(name = "ferry", about = "A minimal SOCKS5 relay for transparent TCP tunneling")]
pub struct Cli {
    /// Bind address
    #[arg(short, long, default_value = "localhost")]
    pub bind: String,

    /// Port
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Socket idle timeout in seconds
    #[arg(short, long, default_value_t = 300)]
    pub timeout: u32,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ferry"]);
        assert_eq!(cli.bind, "localhost");
        assert_eq!(cli.port, 8000);
        assert_eq!(cli.timeout, 300);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["ferry", "-b", "0.0.0.0", "-p", "1080", "-t", "60", "-vv"]);
        assert_eq!(cli.bind, "0.0.0.0");
        assert_eq!(cli.port, 1080);
        assert_eq!(cli.timeout, 60);
        assert_eq!(cli.verbose, 2);
    }
}
