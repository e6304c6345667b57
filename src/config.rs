//! Command-line and environment configuration

use clap::Parser;
use log::LevelFilter;

use crate::command::ScaleFactors;
use crate::publish::SinkTarget;

/// Default publish sink
pub const DEFAULT_SINK: &str = "udp://127.0.0.1:7400";

/// Startup configuration, read once
#[derive(Parser, Clone, Debug)]
#[command(name = "key_teleop", version, about = "Drive a robot from the keyboard")]
pub struct Config {
    /// Magnitude of every emitted velocity
    #[arg(long = "scale-linear", env = "TELEOP_SCALE_LINEAR",
        default_value_t = ScaleFactors::DEFAULT_LINEAR, allow_negative_numbers = true)]
    pub scale_linear: f64,

    /// Angular scale factor; accepted for compatibility, no key uses it
    #[arg(long = "scale-angular", env = "TELEOP_SCALE_ANGULAR",
        default_value_t = ScaleFactors::DEFAULT_ANGULAR, allow_negative_numbers = true)]
    pub scale_angular: f64,

    /// Where commands are published: `udp://HOST:PORT`, `-` for stderr, or a file path
    #[arg(long, env = "TELEOP_SINK", default_value = DEFAULT_SINK)]
    pub sink: SinkTarget,

    /// Publish a zero command whenever the scale changes
    #[arg(long)]
    pub publish_on_scale: bool,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, short, default_value = "warn")]
    pub log_level: String,
}

impl Config {
    /// Returns the initial scale factors.
    pub fn scales(&self) -> ScaleFactors {
        ScaleFactors::new(self.scale_linear, self.scale_angular)
    }

    /// Returns the configured log level, falling back to `Warn` if it does
    /// not parse.
    pub fn log_level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Warn)
    }
}

#[cfg(test)]
mod test {
    use clap::Parser;
    use log::LevelFilter;

    use crate::command::ScaleFactors;
    use crate::publish::SinkTarget;
    use super::Config;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(&["key_teleop"]).unwrap();

        assert_eq!(config.scales(), ScaleFactors::default());
        assert_eq!(config.sink, SinkTarget::Udp("127.0.0.1:7400".to_owned()));
        assert!(!config.publish_on_scale);
        assert_eq!(config.log_level_filter(), LevelFilter::Warn);
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from(&[
            "key_teleop",
            "--scale-linear", "0.25",
            "--scale-angular", "-2",
            "--sink", "-",
            "--publish-on-scale",
            "-l", "debug",
        ]).unwrap();

        assert_eq!(config.scales(), ScaleFactors::new(0.25, -2.0));
        assert_eq!(config.sink, SinkTarget::Stderr);
        assert!(config.publish_on_scale);
        assert_eq!(config.log_level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::try_parse_from(&["key_teleop", "--scale-linear", "fast"]).is_err());
        assert!(Config::try_parse_from(&["key_teleop", "--sink", "udp://nowhere"]).is_err());

        let config = Config::try_parse_from(&["key_teleop", "-l", "loud"]).unwrap();
        assert_eq!(config.log_level_filter(), LevelFilter::Warn);
    }
}
