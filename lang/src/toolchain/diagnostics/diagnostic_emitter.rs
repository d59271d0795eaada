use std::fmt;
use std::io::Write;

use bstr::BString;

use super::diagnostic_kind::DiagnosticKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Note,
    Warning,
    Error,
}

/// A location in code referred to by the diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticLocation {
    pub file_name: String,

    /// 1-based line number, or 0 if unknown.
    pub line_number: u32,

    /// 1-based byte column on the line, or 0 if unknown.
    pub column_number: u32,

    /// The text of the line, without its terminator. May be empty if unavailable.
    pub line: BString,
}

impl fmt::Display for DiagnosticLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name)?;
        if self.line_number > 0 {
            f.write_fmt(format_args!(":{}", self.line_number))?;
        }
        if self.column_number > 0 {
            f.write_fmt(format_args!(":{}", self.column_number))?;
        }
        Ok(())
    }
}

/// A single diagnostic message, part of a larger Diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub kind: DiagnosticKind,
    pub location: DiagnosticLocation,
    pub body: String,
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}: {}", self.location, self.body))
    }
}

/// A complete Diagnostic, including a main message and optional notes, plus the level.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: DiagnosticMessage,
    pub notes: Vec<DiagnosticMessage>,
}

impl Diagnostic {
    pub fn new(
        level: DiagnosticLevel,
        message: DiagnosticMessage,
        notes: Vec<DiagnosticMessage>,
    ) -> Diagnostic {
        Diagnostic { level, message, notes }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.level {
            DiagnosticLevel::Error => "ERROR: ",
            DiagnosticLevel::Warning => "WARNING: ",
            DiagnosticLevel::Note => "",
        };
        f.write_fmt(format_args!("{}: {}{}", self.message.location, prefix, self.message.body))?;
        for note in &self.notes {
            f.write_fmt(format_args!("\nnote: {}", note))?;
        }
        Ok(())
    }
}

/// An interface for an object that can receive diagnostics from the toolchain as they are emitted.
pub trait DiagnosticConsumer {
    fn handle_diagnostic(&mut self, diag: Diagnostic);
    fn flush(&mut self);
}

/// Discards every diagnostic. Useful when only the token stream is of interest.
pub struct NullDiagnosticConsumer {}

impl DiagnosticConsumer for NullDiagnosticConsumer {
    fn handle_diagnostic(&mut self, _diag: Diagnostic) {}
    fn flush(&mut self) {}
}

/// Retains every diagnostic, giving the caller an owned, in-order error list.
#[derive(Default)]
pub struct VecDiagnosticConsumer {
    pub diagnostics: Vec<Diagnostic>,
}

impl VecDiagnosticConsumer {
    pub fn new() -> VecDiagnosticConsumer {
        VecDiagnosticConsumer { diagnostics: Vec::new() }
    }
}

impl DiagnosticConsumer for VecDiagnosticConsumer {
    fn handle_diagnostic(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }
    fn flush(&mut self) {}
}

pub struct StreamDiagnosticConsumer<W: Write> {
    stream: std::io::BufWriter<W>,
}

impl<W: Write> StreamDiagnosticConsumer<W> {
    pub fn new(stream: W) -> StreamDiagnosticConsumer<W> {
        StreamDiagnosticConsumer { stream: std::io::BufWriter::new(stream) }
    }
}

impl<W: Write> DiagnosticConsumer for StreamDiagnosticConsumer<W> {
    fn handle_diagnostic(&mut self, diag: Diagnostic) {
        let _ = writeln!(self.stream, "{}", diag);
    }
    fn flush(&mut self) {
        let _ = self.stream.flush();
    }
}

pub fn console_diagnostic_consumer() -> StreamDiagnosticConsumer<impl Write> {
    StreamDiagnosticConsumer::new(std::io::stderr())
}

pub trait DiagnosticLocationTranslator<LocationT> {
    fn get_location(&self, loc: LocationT) -> DiagnosticLocation;
}
