//! Asking the user what to do with a scanned link.

use std::io::{self, BufRead, Write};

use crate::{link::ValidatedUrl, scan::Decision};

pub trait Prompter {
    /// Presents `url` and waits for a decision. `None` means no more answers
    /// will come, e.g. the input was closed.
    fn prompt(&mut self, url: &ValidatedUrl) -> io::Result<Option<Decision>>;
}

impl<P: Prompter + ?Sized> Prompter for Box<P> {
    fn prompt(&mut self, url: &ValidatedUrl) -> io::Result<Option<Decision>> {
        (**self).prompt(url)
    }
}

// Terminal
//------------------------------------------------------------------------------

pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    bell: bool,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, bell: false }
    }

    /// Rings the terminal bell whenever a link is presented.
    pub fn bell(mut self, bell: bool) -> Self {
        self.bell = bell;
        self
    }
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

fn parse_answer(line: &str) -> Option<Decision> {
    match line.trim().to_ascii_lowercase().as_str() {
        "v" | "visit" | "y" | "yes" => Some(Decision::Visit),
        "e" | "exit" | "n" | "no" => Some(Decision::Exit),
        _ => None,
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn prompt(&mut self, url: &ValidatedUrl) -> io::Result<Option<Decision>> {
        if self.bell {
            write!(self.output, "\x07")?;
        }
        writeln!(self.output, "\nScanned site:\n  {}", url.host())?;

        let mut line = String::new();
        loop {
            write!(self.output, "[v]isit / [e]xit > ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(None);
            }
            if let Some(decision) = parse_answer(&line) {
                return Ok(Some(decision));
            }
            writeln!(self.output, "Please answer v (visit) or e (exit).")?;
        }
    }
}

// Automatic
//------------------------------------------------------------------------------

/// Answers every prompt with the same decision and logs each link as a
/// `<decision> <url>` line, for unattended scans.
pub struct AutoPrompter<W> {
    decision: Decision,
    output: W,
}

impl<W: Write> AutoPrompter<W> {
    pub fn new(decision: Decision, output: W) -> Self {
        Self { decision, output }
    }
}

impl<W: Write> Prompter for AutoPrompter<W> {
    fn prompt(&mut self, url: &ValidatedUrl) -> io::Result<Option<Decision>> {
        let verb = match self.decision {
            Decision::Visit => "visit",
            Decision::Exit => "exit",
        };
        writeln!(self.output, "{verb} {url}")?;
        Ok(Some(self.decision))
    }
}
