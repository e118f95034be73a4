use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use plainqr::{
    config::{self, Config},
    decode::QrDecoder,
    format_host,
    frame::{ImageFiles, RawLumaStream, Rotation},
    is_valid_url_with,
    logging::{self, LogTarget},
    opener::{LinkOpener, PrintOpener, SystemOpener},
    prompt::{AutoPrompter, Prompter, TerminalPrompter},
    scan::{AfterVisit, Decision, Session, SessionSummary},
    SchemeMatch,
};

/// Top-level CLI for the plainqr link scanner.
#[derive(Debug, Parser)]
#[command(name = "plainqr", version)]
#[command(about = "Scan QR codes and open the links they carry, after asking", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/plainqr/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs to stderr instead of the log file.
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Scan images or a raw luminance stream for QR links.
    Scan(ScanArgs),

    /// Check whether texts are links that would be offered, printing their hosts.
    Check {
        /// Texts to check.
        #[arg(required = true)]
        texts: Vec<String>,

        /// Override the configured scheme matching.
        #[arg(long, value_enum)]
        scheme_match: Option<SchemeMatch>,
    },
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Image file, directory of images, or `-` for raw 8-bit luminance frames on stdin.
    pub input: PathBuf,

    /// Frame width of the raw stream.
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Frame height of the raw stream.
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Clockwise rotation that brings raw frames upright.
    #[arg(long, default_value = "0", value_parser = parse_rotation)]
    pub rotation: Rotation,

    /// Answer every link with this decision instead of asking.
    #[arg(long, value_enum)]
    pub auto: Option<Decision>,

    /// Print links instead of opening them.
    #[arg(long)]
    pub dry_run: bool,

    /// Override the configured scheme matching.
    #[arg(long, value_enum)]
    pub scheme_match: Option<SchemeMatch>,

    /// Override what happens after a link is visited.
    #[arg(long, value_enum)]
    pub after_visit: Option<AfterVisit>,

    /// Stop after the first decision.
    #[arg(long)]
    pub once: bool,

    /// Do not ring the bell when a link is presented.
    #[arg(long)]
    pub no_bell: bool,
}

fn parse_rotation(s: &str) -> std::result::Result<Rotation, String> {
    let deg: u32 = s.parse().map_err(|_| format!("`{s}` is not a number of degrees"))?;
    Rotation::try_from(deg).map_err(|e| e.to_string())
}

impl ScanArgs {
    fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}

impl Cli {
    pub fn log_target(&self) -> Result<LogTarget> {
        if self.log_stderr {
            return Ok(LogTarget::Stderr);
        }
        Ok(LogTarget::File(logging::default_log_path()?))
    }

    fn load_config(&self) -> Result<Config> {
        let cfg = match &self.config {
            Some(path) => config::load(path)?,
            None => config::load_or_init(&config::config_path()?)?,
        };
        tracing::debug!("loaded config: {:?}", cfg);
        Ok(cfg)
    }

    pub fn run(self) -> Result<ExitCode> {
        let cfg = self.load_config()?;

        match self.command {
            CliCommand::Scan(args) => scan(args, &cfg),
            CliCommand::Check { texts, scheme_match } => {
                let policy = scheme_match.unwrap_or(cfg.scheme_match);
                let all_valid = check(&texts, policy, &mut io::stdout().lock())?;
                Ok(if all_valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
        }
    }
}

// Check
//------------------------------------------------------------------------------

/// Prints one line per text, returning whether all of them were valid.
fn check<W: Write>(texts: &[String], policy: SchemeMatch, out: &mut W) -> Result<bool> {
    let mut all_valid = true;
    for text in texts {
        if is_valid_url_with(text, policy) {
            writeln!(out, "valid {}", format_host(text))?;
        } else {
            all_valid = false;
            writeln!(out, "invalid {text}")?;
        }
    }
    Ok(all_valid)
}

// Scan
//------------------------------------------------------------------------------

fn scan(args: ScanArgs, cfg: &Config) -> Result<ExitCode> {
    let mut opts = cfg.session_options();
    opts.scheme_match = args.scheme_match.unwrap_or(opts.scheme_match);
    opts.after_visit = args.after_visit.unwrap_or(opts.after_visit);
    opts.once = args.once;

    let prompter = prompter(&args, cfg.bell && !args.no_bell)?;
    let opener: Box<dyn LinkOpener> = if args.dry_run {
        Box::new(PrintOpener::new(io::stdout()))
    } else {
        Box::new(SystemOpener::new(cfg.browser()))
    };

    let mut session = Session::new(opts, prompter, opener);
    let summary = if args.reads_stdin() {
        let (Some(width), Some(height)) = (args.width, args.height) else {
            return Err(anyhow!("--width and --height are required to scan raw frames from stdin"));
        };
        let stream = RawLumaStream::new(io::stdin(), width, height, args.rotation)?;
        session.run(stream, QrDecoder::new())?
    } else {
        let files = ImageFiles::open(&args.input)
            .with_context(|| format!("cannot scan {}", args.input.display()))?;
        tracing::info!("scanning {} image(s) under {}", files.remaining(), args.input.display());
        session.run(files, QrDecoder::new())?
    };

    report(&summary);
    Ok(ExitCode::SUCCESS)
}

fn prompter(args: &ScanArgs, bell: bool) -> Result<Box<dyn Prompter>> {
    if let Some(decision) = args.auto {
        return Ok(Box::new(AutoPrompter::new(decision, io::stdout())));
    }
    if !args.reads_stdin() {
        return Ok(Box::new(TerminalPrompter::stdio().bell(bell)));
    }

    // Frames own stdin, answers come from the controlling terminal
    let tty = File::open(tty_path())
        .context("no terminal to ask on; pass --auto visit or --auto exit")?;
    Ok(Box::new(TerminalPrompter::new(BufReader::new(tty), io::stdout()).bell(bell)))
}

#[cfg(windows)]
fn tty_path() -> &'static Path {
    Path::new("CONIN$")
}

#[cfg(not(windows))]
fn tty_path() -> &'static Path {
    Path::new("/dev/tty")
}

fn report(summary: &SessionSummary) {
    if let Some(stats) = &summary.worker {
        tracing::info!("worker stats: {:?}", stats);
        if stats.presented == 0 {
            eprintln!("No QR links found.");
        }
    }
}
