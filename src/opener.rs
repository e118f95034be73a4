//! Handing a confirmed link to something that can show it.

use std::{
    io::Write,
    process::{Child, Command, ExitStatus},
    thread::{self, JoinHandle},
};

use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    link::ValidatedUrl,
};

pub trait LinkOpener {
    fn open(&mut self, url: &ValidatedUrl) -> Result<()>;
}

impl<O: LinkOpener + ?Sized> LinkOpener for Box<O> {
    fn open(&mut self, url: &ValidatedUrl) -> Result<()> {
        (**self).open(url)
    }
}

/// Opens links in a browser without waiting for it.
///
/// With a `browser` command set, that command is run with the link as its only
/// argument; otherwise the platform opener is used.
#[derive(Debug, Clone, Default)]
pub struct SystemOpener {
    browser: Option<String>,
}

impl SystemOpener {
    pub fn new(browser: Option<String>) -> Self {
        Self { browser: browser.filter(|b| !b.trim().is_empty()) }
    }

    fn command(&self, url: &str) -> Result<Command> {
        if let Some(browser) = &self.browser {
            let mut cmd = Command::new(browser);
            cmd.arg(url);
            return Ok(cmd);
        }
        platform_command(url)
    }
}

#[cfg(target_os = "macos")]
fn platform_command(url: &str) -> Result<Command> {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    Ok(cmd)
}

#[cfg(target_os = "windows")]
fn platform_command(url: &str) -> Result<Command> {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    Ok(cmd)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_command(url: &str) -> Result<Command> {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    Ok(cmd)
}

#[cfg(not(any(unix, target_os = "windows")))]
fn platform_command(_url: &str) -> Result<Command> {
    Err(Error::NoOpener)
}

impl LinkOpener for SystemOpener {
    fn open(&mut self, url: &ValidatedUrl) -> Result<()> {
        let mut cmd = self.command(url.as_str())?;
        info!("Opening {} with {:?}", url.host(), cmd.get_program());
        let child =
            cmd.spawn().map_err(|source| Error::OpenLink { url: url.to_string(), source })?;
        watch(child);
        Ok(())
    }
}

/// Waits for an opener process on a detached thread so it gets reaped once it
/// exits. The handle yields the exit status, if it could be collected.
fn watch(mut child: Child) -> Option<JoinHandle<Option<ExitStatus>>> {
    let pid = child.id();
    let spawned = thread::Builder::new().name("plainqr-opener".into()).spawn(move || {
        match child.wait() {
            Ok(status) => {
                if !status.success() {
                    warn!("Opener process {pid} exited with {status}");
                }
                Some(status)
            }
            Err(e) => {
                warn!("Failed to wait for opener process {pid}: {e}");
                None
            }
        }
    });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Cannot watch opener process {pid}: {e}");
            None
        }
    }
}

/// Writes `open <url>` lines instead of launching anything.
#[derive(Debug)]
pub struct PrintOpener<W> {
    out: W,
}

impl<W: Write> PrintOpener<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> LinkOpener for PrintOpener<W> {
    fn open(&mut self, url: &ValidatedUrl) -> Result<()> {
        writeln!(self.out, "open {url}")?;
        Ok(())
    }
}
