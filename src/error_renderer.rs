//! Error and warning rendering using ariadne
//!
//! Diagnostics only carry byte spans, so every function here takes the
//! program source the spans point into.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use molt::{Engine, EngineOptions, render_error};
///
/// let mut engine = Engine::new(EngineOptions::default());
/// let source = "if (x";
/// if let Err(e) = engine.compile(source) {
///     render_error(&e, source);
/// }
/// ```
pub fn render_error(error: &Error, source: &str) {
    render_error_to_writer(error, source, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, source: &str, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, source, writer, true)
}

/// Render an error to a String (useful for logs, web UIs, etc.)
pub fn render_error_to_string(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render warnings (or any diagnostics) to a String without color codes
///
/// # Example
/// ```
/// use molt::{Engine, EngineOptions, render_diagnostics_to_string_no_color};
///
/// let mut engine = Engine::new(EngineOptions::default());
/// let program = engine.compile("if (c(TRUE, FALSE)) 1L").unwrap();
/// engine.run(&program).unwrap();
///
/// let output = render_diagnostics_to_string_no_color(engine.warnings(), program.source());
/// assert!(output.contains("length > 1"));
/// ```
pub fn render_diagnostics_to_string_no_color(diagnostics: &[Diagnostic], source: &str) -> String {
    let mut buf = Vec::new();
    render_diagnostics(source, diagnostics, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Compilation { diagnostics } => {
            render_diagnostics(source, diagnostics, writer, use_color)
        }
        Error::Runtime { diagnostic } => {
            render_diagnostics(source, std::slice::from_ref(diagnostic), writer, use_color)
        }
        Error::ResourceExceeded(msg) => {
            writeln!(writer, "Resource limit exceeded: {}", msg)
        }
        Error::Api(msg) => {
            writeln!(writer, "API error: {}", msg)
        }
    }
}

fn render_diagnostics(
    source: &str,
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in diagnostics {
        let mut colors = ColorGenerator::new();
        colors.next(); // Skip the first color.

        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        };

        let mut report = Report::build(kind, ("<program>", diag.span.0.clone()))
            .with_message(&diag.message)
            .with_config(ariadne::Config::default().with_color(use_color));

        if let Some(code) = &diag.code {
            report = report.with_code(code);
        }

        let color = colors.next();
        report = report.with_label(
            Label::new(("<program>", diag.span.0.clone()))
                .with_message(&diag.message)
                .with_color(color),
        );

        if let Some(help) = &diag.help {
            report = report.with_help(help);
        }

        // Reborrow so the writer is not moved
        report
            .finish()
            .write(("<program>", Source::from(source)), &mut *writer)?;
    }

    Ok(())
}
