//! Colored, human-readable rendering of diagnostics for the CLI. Pure
//! formatting: nothing here affects compiler behaviour, only what a
//! terminal sees.

use super::{Diagnostic, Severity};
use colored::Colorize;

/// Renders one diagnostic against the original source, with a caret under
/// the offending span when one is known.
pub fn render(diagnostic: &Diagnostic, source: &str, use_color: bool) -> String {
    let mut out = String::new();

    let header = format!("{}[{}]: {}", diagnostic.severity, diagnostic.rule, diagnostic.message);
    out.push_str(&colorize_header(&header, diagnostic.severity, use_color));
    out.push('\n');

    if let Some(span) = diagnostic.span {
        if let Some(line_text) = source.lines().nth(span.line.saturating_sub(1)) {
            out.push_str(&format!("  --> {}\n", span));
            out.push_str(&format!("   | {}\n", line_text));
            let caret_offset = span.column.saturating_sub(1);
            let caret = "^".repeat(span.length.max(1));
            out.push_str(&format!("   | {}{}\n", " ".repeat(caret_offset), colorize_caret(&caret, diagnostic.severity, use_color)));
        }
    }

    if let Some(suggestion) = &diagnostic.suggestion {
        out.push_str(&format!("  help: {}\n", suggestion));
    }

    out
}

/// Renders every diagnostic in a sink, in order, separated by blank lines.
pub fn render_all(diagnostics: &[Diagnostic], source: &str, use_color: bool) -> String {
    diagnostics
        .iter()
        .map(|d| render(d, source, use_color))
        .collect::<Vec<_>>()
        .join("\n")
}

fn colorize_header(header: &str, severity: Severity, use_color: bool) -> String {
    if !use_color {
        return header.to_string();
    }
    match severity {
        Severity::Error => header.red().bold().to_string(),
        Severity::Warning => header.yellow().bold().to_string(),
        Severity::Info => header.blue().to_string(),
    }
}

fn colorize_caret(caret: &str, severity: Severity, use_color: bool) -> String {
    if !use_color {
        return caret.to_string();
    }
    match severity {
        Severity::Error => caret.red().bold().to_string(),
        Severity::Warning => caret.yellow().bold().to_string(),
        Severity::Info => caret.blue().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{rules, Span};

    #[test]
    fn renders_caret_under_span() {
        let diagnostic = Diagnostic::error(rules::SEM_UNRESOLVED_NAME, "unresolved name 'foo'")
            .with_span(Span::new(1, 8, 3));
        let rendered = render(&diagnostic, "let x = foo\n", false);
        assert!(rendered.contains("let x = foo"));
        assert!(rendered.contains("^^^"));
    }
}
