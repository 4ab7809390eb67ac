use argh::FromArgs;
use log::LevelFilter;
use minishell::{Config, Interpreter, logging};
use std::path::PathBuf;

/// A small line-oriented shell with pipes, redirections and sourced scripts.
#[derive(FromArgs)]
struct Args {
    /// run a single command line and exit
    #[argh(option, short = 'c')]
    command: Option<String>,

    /// configuration file (default: ~/.config/minishell/config.toml)
    #[argh(option)]
    config: Option<PathBuf>,

    /// log level: off, error, warn, info, debug or trace
    #[argh(option)]
    log_level: Option<LevelFilter>,

    /// script to run instead of reading standard input
    #[argh(positional)]
    script: Option<PathBuf>,
}

fn main() {
    let args: Args = argh::from_env();

    let (mut config, config_error) = match Config::resolve(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    if let Err(err) = logging::init(config.log_level, config.log_file.as_deref()) {
        eprintln!("minishell: {err:#}");
    }
    if let Some(err) = config_error {
        log::warn!("using default configuration: {err:#}");
    }

    let mut shell = Interpreter::new(config);
    if let Some(line) = args.command {
        shell.run_command(&line);
    } else if let Some(script) = args.script {
        shell.run_script(&script);
    } else if let Err(err) = shell.repl() {
        log::error!("{err:#}");
        eprintln!("minishell: {err:#}");
    }
}
