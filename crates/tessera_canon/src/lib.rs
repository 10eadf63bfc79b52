//! # tessera_canon
//!
//! Canon - The standard of correctness for Tessera.
//!
//! ## Name Origin
//!
//! **Canon** (/ˈkænən/) in art refers to a set of ideal proportions or standards
//! that define perfection. `tessera_canon` holds every use of a synthesized component
//! to its canon: calls must name real methods with fitting arguments, and elements must
//! be built from props the component declares.
//!
//! ## Architecture
//!
//! ```text
//! +----------------------------------------------------------+
//! |                     tessera_canon                        |
//! +----------------------------------------------------------+
//! |                                                          |
//! |  +-------------------+     +------------------------+    |
//! |  | UsageChecker      |---->| InferContext           |    |
//! |  | - method calls    |     | - literals, locals     |    |
//! |  | - statics         |     | - elements, members    |    |
//! |  | - elements / JSX  |     +------------------------+    |
//! |  +-------------------+                                   |
//! |           |                                              |
//! |           v                                              |
//! |  +-------------------+     +------------------------+    |
//! |  | CheckResult       |     | DiagnosticGuard        |    |
//! |  | - error/warning   |     | - host stream filter   |    |
//! |  +-------------------+     +------------------------+    |
//! |                                                          |
//! +----------------------------------------------------------+
//! ```

pub mod checker;
pub mod guard;
pub mod infer;

pub use checker::{check_program, UsageReport};
pub use guard::{DiagnosticGuard, GuardRule};
pub use infer::InferContext;

use serde::Serialize;
use tessera_carton::{Diagnostic, Severity};

/// Diagnostics of one check run, with counts.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.add_diagnostic(diagnostic);
        }
    }

    /// Merge another result, keeping its order after ours.
    pub fn merge(&mut self, other: CheckResult) {
        self.extend(other.diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_carton::{DiagnosticCode, FileId, Site};

    #[test]
    fn test_counts() {
        let site = Site::new(FileId(0), 0, 1);
        let mut result = CheckResult::new();
        result.add_diagnostic(Diagnostic::error(DiagnosticCode::UnknownMethod, "a", site));
        result.add_diagnostic(Diagnostic::warning(DiagnosticCode::MissingChildren, "b", site));
        assert!(result.has_errors());
        assert_eq!((result.error_count, result.warning_count), (1, 1));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["errorCount"], 1);
        assert_eq!(json["diagnostics"][1]["code"], "missing-children");
    }
}
