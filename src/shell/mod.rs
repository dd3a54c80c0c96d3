//! Interactive command loop.
//!
//! A line is split on whitespace into a command name and positional
//! arguments, checked against a fixed command table (name, aliases, arity)
//! and run. Bad input is reported inline; only `exit` or end of input ends
//! the loop.

use crate::config::AppConfig;
use crate::error::{BrowserError, DispatchError};
use crate::pipeline::Scanner;
use crate::render::render_table;
use crate::scraper::{BrowserSession, PageScraper, SessionFactory, TokenFeed};
use anyhow::{Context, Result};
use colored::*;
use std::io::Write;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info, warn};

pub const PROMPT: &str = "Enter a command (help): ";

// ── Commands ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Scan { address: String },
    ScanAuto,
    Rugcheck { address: String },
    Exit,
}

struct CommandSpec {
    name: &'static str,
    aliases: &'static [&'static str],
    args: &'static [&'static str],
    about: &'static str,
    build: fn(&[String]) -> Command,
}

impl CommandSpec {
    fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }

    fn usage(&self) -> String {
        self.args
            .iter()
            .fold(self.name.to_string(), |acc, a| format!("{} <{}>", acc, a))
    }
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "help",
        aliases: &[],
        args: &[],
        about: "Show this help message",
        build: |_| Command::Help,
    },
    CommandSpec {
        name: "scan",
        aliases: &["sc"],
        args: &["address"],
        about: "Scan one token by address",
        build: |args| Command::Scan {
            address: args[0].clone(),
        },
    },
    CommandSpec {
        name: "scan-auto",
        aliases: &["sca", "scan_auto"],
        args: &[],
        about: "Scan every fresh token profile from DexScreener",
        build: |_| Command::ScanAuto,
    },
    CommandSpec {
        name: "rugcheck",
        aliases: &["rc"],
        args: &["address"],
        about: "Print the rugcheck.xyz link for a token",
        build: |args| Command::Rugcheck {
            address: args[0].clone(),
        },
    },
    CommandSpec {
        name: "exit",
        aliases: &[],
        args: &[],
        about: "Close the browser and exit",
        build: |_| Command::Exit,
    },
];

/// Parse one input line. An empty line means `help`.
pub fn parse_command(line: &str) -> Result<Command, DispatchError> {
    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return Ok(Command::Help);
    };
    let args: Vec<String> = parts.map(str::to_string).collect();

    let spec = COMMANDS
        .iter()
        .find(|c| c.matches(name))
        .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;

    if args.len() != spec.args.len() {
        return Err(DispatchError::Arity {
            command: spec.name,
            expected: spec.args.len(),
            got: args.len(),
        });
    }

    Ok((spec.build)(&args))
}

// ── Shell ─────────────────────────────────────────────────────────────────────

pub struct Shell<F: SessionFactory> {
    config: AppConfig,
    feed: Arc<dyn TokenFeed>,
    factory: F,
    scanner: Scanner,
    sessions: Vec<F::Session>,
}

impl<F: SessionFactory> Shell<F> {
    pub fn new(config: AppConfig, feed: Arc<dyn TokenFeed>, factory: F) -> Self {
        let scanner = Scanner::new(PageScraper::new(&config.sites, &config.browser));
        Self {
            config,
            feed,
            factory,
            scanner,
            sessions: Vec::new(),
        }
    }

    /// Prompt/read/dispatch until `exit` or end of input. Browser sessions
    /// are released on every way out, including I/O errors.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let result = self.read_loop(input, out).await;
        self.shutdown().await;
        result
    }

    /// Run a single command line, then release the browser.
    pub async fn run_once<W: Write>(&mut self, line: &str, out: &mut W) -> Result<()> {
        let result = self.execute(line, out).await.map(|_| ());
        self.shutdown().await;
        result
    }

    async fn read_loop<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        loop {
            write!(out, "\n{}", PROMPT)?;
            out.flush()?;

            let Some(line) = lines.next_line().await.context("Failed to read command")? else {
                writeln!(out)?;
                info!("End of input, leaving");
                return Ok(());
            };

            if self.execute(&line, out).await?.is_break() {
                return Ok(());
            }
        }
    }

    /// Dispatch one line. Only output failures are returned as errors.
    pub async fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<ControlFlow<()>> {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e @ DispatchError::UnknownCommand(_)) => {
                writeln!(out, "{} Type {} for available commands.", self.error_text(&e.to_string()), "help")?;
                return Ok(ControlFlow::Continue(()));
            }
            Err(e) => {
                writeln!(out, "{}", self.error_text(&e.to_string()))?;
                return Ok(ControlFlow::Continue(()));
            }
        };

        match command {
            Command::Help => self.print_help(out)?,
            Command::Scan { address } => self.scan_one(&address, out).await?,
            Command::ScanAuto => self.scan_auto(out).await?,
            Command::Rugcheck { address } => {
                writeln!(out, "{}", self.config.sites.risk_check_url(&address))?;
            }
            Command::Exit => {
                writeln!(out, "{}", self.paint("Exiting the app...", |s| s.red().bold()))?;
                return Ok(ControlFlow::Break(()));
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn print_help<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{}", self.paint("Available Commands:", |s| s.green().bold()))?;
        for spec in COMMANDS {
            let aliases = if spec.aliases.is_empty() {
                String::new()
            } else {
                format!(" ({})", spec.aliases.join(", "))
            };
            writeln!(out, "  - {}{}: {}", spec.usage(), aliases, spec.about)?;
        }
        Ok(())
    }

    async fn scan_one<W: Write>(&mut self, address: &str, out: &mut W) -> Result<()> {
        if let Err(e) = self.ensure_sessions(1).await {
            writeln!(out, "{}", self.error_text(&format!("Browser unavailable: {}", e)))?;
            return Ok(());
        }

        match self.scanner.scan_one(&mut self.sessions[0], address).await {
            Some(record) => writeln!(out, "{}", render_table(&[record], &self.config.render))?,
            None => writeln!(
                out,
                "{}",
                self.error_text(&format!("Failed to scan token {}", address))
            )?,
        }
        Ok(())
    }

    async fn scan_auto<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let chain = self.config.feed.chain.clone();
        let candidates = match self.feed.fetch_candidates(&chain).await {
            Ok(c) => c,
            Err(e) => {
                error!("Feed fetch failed: {}", e);
                writeln!(out, "{}", self.error_text(&format!("Failed to fetch token feed: {}", e)))?;
                return Ok(());
            }
        };

        if candidates.is_empty() {
            writeln!(out, "No {} tokens in feed.", chain)?;
            return Ok(());
        }

        let wanted = self.config.scan.concurrency.min(candidates.len());
        if let Err(e) = self.ensure_sessions(wanted).await {
            writeln!(out, "{}", self.error_text(&format!("Browser unavailable: {}", e)))?;
            return Ok(());
        }

        let color = self.config.render.color;
        let progress = move |left: usize| {
            let text = format!("{} coin(s) left to scan.", left);
            if color {
                eprint!("\r{}   ", text.blue());
            } else {
                eprint!("\r{}   ", text);
            }
        };

        let report = self
            .scanner
            .scan_all_pooled(self.sessions.as_mut_slice(), &candidates, &progress)
            .await;
        eprint!("\r{}\r", " ".repeat(40));

        if !report.records.is_empty() {
            writeln!(out, "{}", render_table(&report.records, &self.config.render))?;
        }
        for failure in &report.failures {
            writeln!(
                out,
                "{}",
                self.paint(&format!("Skipped {}", failure), |s| s.yellow())
            )?;
        }
        writeln!(out, "Scanned {}/{} tokens", report.records.len(), report.total)?;
        Ok(())
    }

    /// Open sessions until `wanted` are live. Only the first one is
    /// mandatory; later failures shrink the pool. Sessions that died since
    /// the last command are dropped and replaced.
    async fn ensure_sessions(&mut self, wanted: usize) -> Result<(), BrowserError> {
        let before = self.sessions.len();
        self.sessions.retain(|session| session.is_alive());
        if self.sessions.len() < before {
            warn!("Dropped {} lost browser session(s)", before - self.sessions.len());
        }

        while self.sessions.len() < wanted {
            match self.factory.open().await {
                Ok(session) => self.sessions.push(session),
                Err(e) if self.sessions.is_empty() => return Err(e),
                Err(e) => {
                    warn!(
                        "Could not open browser session {} of {}: {}; continuing with {}",
                        self.sessions.len() + 1,
                        wanted,
                        e,
                        self.sessions.len()
                    );
                    break;
                }
            }
        }
        Ok(())
    }

    async fn shutdown(&mut self) {
        for mut session in self.sessions.drain(..) {
            if let Err(e) = session.close().await {
                warn!("Failed to close browser session: {}", e);
            }
        }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.config.render.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn error_text(&self, message: &str) -> String {
        self.paint(message, |s| s.red().bold())
    }
}
