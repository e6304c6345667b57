use std::io;
use std::process::exit;

use clap::Parser;
use log::info;

use key_teleop::{
    Config, Error, PrepareConfig, Shutdown, Teleop, Terminal, TOPIC,
};

fn main() {
    let config = Config::parse();

    env_logger::Builder::new()
        .filter_level(config.log_level_filter())
        .parse_default_env()
        .init();

    match run(&config) {
        Ok(shutdown) => {
            info!("session ended: {:?}", shutdown);
        }
        Err(e) => {
            eprintln!("{}", e);
            exit(e.exit_code());
        }
    }
}

fn run(config: &Config) -> Result<Shutdown, Error> {
    info!("scale_linear = {}, scale_angular = {}, sink = {}",
        config.scale_linear, config.scale_angular, config.sink);

    let publisher = config.sink.open(TOPIC).map_err(|source| Error::Transport{
        topic: TOPIC.to_owned(),
        target: config.sink.to_string(),
        source,
    })?;

    let mut teleop = Teleop::new(config.scales(), publisher, io::stdout())
        .publish_on_scale(config.publish_on_scale);

    let mut terminal = Terminal::stdin().map_err(Error::Setup)?;
    let state = terminal.prepare(PrepareConfig::default()).map_err(Error::Setup)?;

    if let Err(e) = teleop.banner() {
        info!("failed to write banner: {}", e);
    }

    let outcome = teleop.run(&mut terminal);

    // Restore on every path, including a failed read
    let restored = terminal.restore(state).map_err(Error::Restore);

    let shutdown = outcome?;
    restored?;

    Ok(shutdown)
}
