//! Syntax errors rendered with miette.

use miette::{LabeledSpan, NamedSource, Severity, SourceCode, SourceSpan};
use rbparse::{Diagnostic, DiagnosticCategory};
use std::fmt;

/// One parse diagnostic with the source it points into.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxDiagnostic {
    pub message: String,
    pub code: u32,
    pub category: DiagnosticCategory,
    pub src: NamedSource<Vec<u8>>,
    pub span: SourceSpan,
}

impl SyntaxDiagnostic {
    pub fn new(diagnostic: &Diagnostic, path: &str, source: &[u8]) -> Self {
        let location = diagnostic.location;
        Self {
            message: diagnostic.message.clone(),
            code: diagnostic.code,
            category: diagnostic.category,
            src: NamedSource::new(path, source.to_vec()),
            span: (location.start as usize, location.len() as usize).into(),
        }
    }
}

impl miette::Diagnostic for SyntaxDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("rbparse::E{:04}", self.code)))
    }

    fn severity(&self) -> Option<Severity> {
        Some(match self.category {
            DiagnosticCategory::Error => Severity::Error,
            DiagnosticCategory::Warning => Severity::Warning,
        })
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = match self.category {
            DiagnosticCategory::Error => "error here",
            DiagnosticCategory::Warning => "warning here",
        };
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(label.to_string()),
            self.span,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbparse::Location;

    fn error(start: u32, end: u32) -> Diagnostic {
        Diagnostic {
            message: "Expected collection.".to_string(),
            location: Location::new(start, end),
            code: 2108,
            category: DiagnosticCategory::Error,
        }
    }

    #[test]
    fn test_span_from_location() {
        let diagnostic = SyntaxDiagnostic::new(&error(4, 7), "a.rb", b"for end");
        assert_eq!(diagnostic.span.offset(), 4);
        assert_eq!(diagnostic.span.len(), 3);
        assert_eq!(diagnostic.to_string(), "Expected collection.");
    }

    #[test]
    fn test_code_and_severity() {
        use miette::Diagnostic as _;
        let diagnostic = SyntaxDiagnostic::new(&error(0, 0), "a.rb", b"");
        assert_eq!(diagnostic.code().map(|code| code.to_string()), Some("rbparse::E2108".to_string()));
        assert_eq!(diagnostic.severity(), Some(Severity::Error));
        assert_eq!(diagnostic.labels().map(|labels| labels.count()), Some(1));
    }
}
