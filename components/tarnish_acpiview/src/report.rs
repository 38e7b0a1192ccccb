//! Report Sink and Parse Context.
//!
//! The inspector's user-visible output is a serial append log of
//! severity-tagged lines. Severities are the five trace tags (`good`,
//! `info`, `warn`, `bad`, `item`), the error taxonomy (`csum`, `value`,
//! `length`, `parse`, `cross`), and `fatal`. Everything the engine emits
//! flows through a [`ReportSink`]; indentation is owned by the
//! [`ViewContext`] and scoped around each generic-parser invocation.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::string::String;
use core::fmt::{self, Write};

use crate::config::ViewConfig;

/// Error taxonomy of the inspector. These are report categories, not Rust
/// error types: the engine reports and continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The byte-sum of an entire table is non-zero.
    Checksum,
    /// A field violates a spec-stated constraint.
    Value,
    /// A declared length is zero, exceeds the enclosing buffer, or
    /// underflows the fixed header.
    Length,
    /// A descriptor table disagrees with the accumulated offset, or a
    /// required captured field is missing.
    Parse,
    /// Uniqueness, reference, cycle, or cardinality violations between
    /// sub-structures.
    Cross,
}

impl ErrorKind {
    pub fn tag(self) -> &'static str {
        match self {
            ErrorKind::Checksum => "csum",
            ErrorKind::Value => "value",
            ErrorKind::Length => "length",
            ErrorKind::Parse => "parse",
            ErrorKind::Cross => "cross",
        }
    }
}

/// Severity of one report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Good,
    Info,
    Warn,
    Bad,
    Item,
    Error(ErrorKind),
    Fatal,
}

impl Severity {
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Good => "good",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Bad => "bad",
            Severity::Item => "item",
            Severity::Error(kind) => kind.tag(),
            Severity::Fatal => "fatal",
        }
    }

    fn is_suppressible(self) -> bool {
        matches!(self, Severity::Warn | Severity::Bad | Severity::Error(_) | Severity::Fatal)
    }
}

/// Receiver of report lines. The sink is the only externally visible shared
/// resource of the inspector and is treated as a serial append log.
pub trait ReportSink {
    fn line(&mut self, severity: Severity, indent: usize, args: fmt::Arguments);
}

/// Sink that renders lines into an owned `String`. Deterministic, so two
/// runs over the same table compare byte-equal.
#[derive(Default)]
pub struct StringSink {
    out: String,
}

impl StringSink {
    pub fn new() -> Self {
        StringSink::default()
    }

    pub fn output(&self) -> &str {
        &self.out
    }
}

impl ReportSink for StringSink {
    fn line(&mut self, severity: Severity, indent: usize, args: fmt::Arguments) {
        for _ in 0..indent * 2 {
            self.out.push(' ');
        }
        match severity {
            Severity::Warn => {
                let _ = write!(self.out, "WARNING: {args}");
            }
            Severity::Bad => {
                let _ = write!(self.out, "BAD: {args}");
            }
            Severity::Error(kind) => {
                let _ = write!(self.out, "ERROR ({}): {args}", kind.tag());
            }
            Severity::Fatal => {
                let _ = write!(self.out, "FATAL: {args}");
            }
            _ => {
                let _ = write!(self.out, "{args}");
            }
        }
        self.out.push('\n');
    }
}

/// Sink that forwards lines to the `log` crate.
#[derive(Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn line(&mut self, severity: Severity, indent: usize, args: fmt::Arguments) {
        let pad = indent * 2;
        match severity {
            Severity::Error(kind) => log::error!("{:pad$}[{tag}] {args}", "", pad = pad, tag = kind.tag()),
            Severity::Fatal => log::error!("{:pad$}[fatal] {args}", "", pad = pad),
            Severity::Warn | Severity::Bad => log::warn!("{:pad$}{args}", "", pad = pad),
            _ => log::info!("{:pad$}{args}", "", pad = pad),
        }
    }
}

/// Parse context shared by the generic parser, the table dispatchers, and
/// the validators: the report sink, the indent counter, the configuration,
/// and the error/warning tallies.
pub struct ViewContext<'a> {
    sink: &'a mut dyn ReportSink,
    config: ViewConfig,
    indent: usize,
    /// Revision of the table currently being parsed; dispatchers set this
    /// before walking sub-structures so validators can consult it.
    pub revision: u8,
    errors: u32,
    warnings: u32,
    errors_by_kind: [u32; 5],
}

impl<'a> ViewContext<'a> {
    pub fn new(sink: &'a mut dyn ReportSink, mut config: ViewConfig) -> Self {
        if config.quiet {
            config.consistency = false;
        }
        ViewContext { sink, config, indent: 0, revision: 0, errors: 0, warnings: 0, errors_by_kind: [0; 5] }
    }

    pub fn trace(&self) -> bool {
        self.config.trace
    }

    pub fn consistency(&self) -> bool {
        self.config.consistency
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Emit one line at the current indent. Warnings and errors are tallied
    /// here and, under quiet mode, dropped before reaching the sink.
    pub fn line(&mut self, severity: Severity, args: fmt::Arguments) {
        match severity {
            Severity::Warn => self.warnings += 1,
            Severity::Error(kind) => {
                self.errors += 1;
                self.errors_by_kind[kind as usize] += 1;
            }
            Severity::Fatal => self.errors += 1,
            _ => {}
        }
        if self.config.quiet && severity.is_suppressible() {
            return;
        }
        self.sink.line(severity, self.indent, args);
    }

    pub fn item(&mut self, args: fmt::Arguments) {
        self.line(Severity::Item, args);
    }

    pub fn info(&mut self, args: fmt::Arguments) {
        self.line(Severity::Info, args);
    }

    pub fn warn(&mut self, args: fmt::Arguments) {
        self.line(Severity::Warn, args);
    }

    pub fn error(&mut self, kind: ErrorKind, args: fmt::Arguments) {
        self.line(Severity::Error(kind), args);
    }

    pub fn fatal(&mut self, args: fmt::Arguments) {
        self.line(Severity::Fatal, args);
    }

    /// Run `f` one indent level deeper. The counter is restored on every
    /// exit path; this is the scoped acquisition the generic parser wraps
    /// around each invocation.
    pub fn with_indent<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.indent += 1;
        let result = f(self);
        self.indent -= 1;
        result
    }

    pub fn error_count(&self) -> u32 {
        self.errors
    }

    pub fn warning_count(&self) -> u32 {
        self.warnings
    }

    pub fn error_count_of(&self, kind: ErrorKind) -> u32 {
        self.errors_by_kind[kind as usize]
    }
}
