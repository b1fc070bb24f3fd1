use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use scicalc::calculator::{AngleMode, ERROR_MARKER, evaluate_expression};
use scicalc::config::Config;
use scicalc::keypad::{Display, Key, Keypad, Layout};

#[derive(Parser, Debug)]
#[command(name = "scicalc", version, about = "Keypad calculator")]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/scicalc/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one expression and print the result
    Eval {
        expression: String,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Interactive keypad: one key label or typed fragment per line
    Session {
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// List the keys of a layout
    Keys {
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Deg,
    Rad,
}

impl ModeArg {
    fn to_angle_mode(self) -> AngleMode {
        match self {
            ModeArg::Deg => AngleMode::Degrees,
            ModeArg::Rad => AngleMode::Radians,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LayoutArg {
    Basic,
    Scientific,
}

impl LayoutArg {
    fn to_layout(self) -> Layout {
        match self {
            LayoutArg::Basic => Layout::Basic,
            LayoutArg::Scientific => Layout::Scientific,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command.unwrap_or(Command::Session {
        layout: None,
        mode: None,
    }) {
        Command::Eval { expression, mode } => {
            let mode = mode.map_or(config.angle_mode, ModeArg::to_angle_mode);
            let result = evaluate_expression(&expression, mode, config.thousands_separators);
            println!("{}", result.display());
            if !result.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Session { layout, mode } => {
            if let Some(layout) = layout {
                config.layout = layout.to_layout();
            }
            if let Some(mode) = mode {
                config.angle_mode = mode.to_angle_mode();
            }
            run_session(Keypad::from_config(&config))?;
        }
        Command::Keys { layout } => {
            let layout = layout.map_or(config.layout, LayoutArg::to_layout);
            for row in layout.rows() {
                println!("{}", row.join("  "));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_session(mut keypad: Keypad) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    writeln!(
        stdout,
        "{} keypad, {}. Enter key labels or expressions; 'quit' to exit.",
        keypad.layout(),
        keypad.mode()
    )?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let outcome = match line.parse::<Key>() {
            Ok(key) => keypad.press(key).map(|_| ()),
            Err(_) => keypad.type_text(line),
        };

        match outcome {
            Ok(()) => print_display(&mut stdout, &keypad.display())?,
            Err(e) => writeln!(stdout, "{ERROR_MARKER}: {e}")?,
        }
    }

    Ok(())
}

fn print_display(out: &mut impl Write, display: &Display) -> io::Result<()> {
    writeln!(out, "[{}] {}", display.mode, display.expression)?;
    writeln!(out, "  {}", display.input)
}
