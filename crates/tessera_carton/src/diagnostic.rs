//! Diagnostics.
//!
//! A single record type serves both the diagnostics this pass raises and the ones the
//! host checker emits; the guard filters the latter using the same catalogue.

use serde::{Deserialize, Serialize};

use crate::source::Site;

/// A diagnostic attached to a source site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic code.
    pub code: DiagnosticCode,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Primary location.
    pub site: Site,
    /// Related locations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, site: Site) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            site,
            related: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, site: Site) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message: message.into(),
            site,
            related: Vec::new(),
        }
    }

    /// Add related information.
    pub fn with_related(mut self, message: impl Into<String>, site: Site) -> Self {
        self.related.push(RelatedInfo {
            message: message.into(),
            site,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - fails the compilation.
    Error,
    /// Warning - may indicate a problem.
    Warning,
}

/// Related information for a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedInfo {
    pub message: String,
    pub site: Site,
}

/// Diagnostic codes.
///
/// `1xxx` are structural errors in factory declarations, `2xxx` are usage-site errors,
/// `3xxx` are synthesis warnings and `9xxx` are host checker categories the guard knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u32)]
pub enum DiagnosticCode {
    /// A mixin transitively includes itself.
    CyclicMixin = 1001,
    /// Two sibling mixins define the same method and nothing overrides it.
    AmbiguousMixinMethod = 1002,
    /// Two sibling mixins define the same static and nothing overrides it.
    AmbiguousMixinStatic = 1003,
    /// No render is available for a component.
    MissingRender = 1004,
    /// More than one mixin supplies render to a component without its own.
    RenderConflict = 1005,
    /// render declares parameters.
    RenderArity = 1006,
    /// Chained hook definitions disagree on their annotated signature.
    HookSignatureConflict = 1007,
    /// A mixins entry does not name a known mixin.
    UnknownMixin = 1008,
    /// An included mixin failed to resolve.
    MixinSurfaceUnavailable = 1009,
    /// shouldComponentUpdate defined alongside PureRenderMixin.
    PureRenderMixinOverride = 1010,
    /// A factory was called with the wrong number of arguments.
    FactoryArity = 1011,
    /// The same name is bound to more than one factory call.
    DuplicateFactory = 1012,
    /// Method not found on a component instance.
    UnknownMethod = 2001,
    /// Static not found on a component constructor.
    UnknownStatic = 2002,
    /// Prop not declared by the component.
    UnknownProp = 2003,
    /// Required prop missing at element construction.
    MissingRequiredProp = 2004,
    /// Prop value does not match its declared type.
    PropTypeMismatch = 2005,
    /// Method argument does not match its declared type.
    ArgumentTypeMismatch = 2006,
    /// Wrong number of arguments to a method.
    ArgumentCount = 2007,
    /// createElement called without arguments.
    CreateElementArity = 2008,
    /// Required children were not passed.
    MissingChildren = 2009,
    /// State field not declared by the initial state.
    UnknownStateField = 2010,
    /// A prop validator could not be understood.
    UnknownPropType = 3001,
    /// getInitialState is annotated with a non-record type.
    UnexpectedStateType = 3002,
    /// Host: type mismatch.
    TypeMismatch = 9001,
    /// Host: property may be undefined.
    PossiblyUndefinedProperty = 9002,
    /// Host: property never defined on a type.
    InexistentProperty = 9003,
    /// Host: unrecognized JSDoc tag.
    #[serde(rename = "unknown-jsdoc-tag")]
    UnknownJsDocTag = 9004,
    /// Host: dangerous use of `this`.
    DangerousThisUsage = 9005,
    /// Host: statement has no effect.
    UselessCode = 9006,
    /// Host: anything else.
    Other = 9999,
}

impl DiagnosticCode {
    /// Get the numeric code.
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable name for the code.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CyclicMixin => "cyclic-mixin",
            Self::AmbiguousMixinMethod => "ambiguous-mixin-method",
            Self::AmbiguousMixinStatic => "ambiguous-mixin-static",
            Self::MissingRender => "missing-render",
            Self::RenderConflict => "render-conflict",
            Self::RenderArity => "render-arity",
            Self::HookSignatureConflict => "hook-signature-conflict",
            Self::UnknownMixin => "unknown-mixin",
            Self::MixinSurfaceUnavailable => "mixin-surface-unavailable",
            Self::PureRenderMixinOverride => "pure-render-mixin-override",
            Self::FactoryArity => "factory-arity",
            Self::DuplicateFactory => "duplicate-factory",
            Self::UnknownMethod => "unknown-method",
            Self::UnknownStatic => "unknown-static",
            Self::UnknownProp => "unknown-prop",
            Self::MissingRequiredProp => "missing-required-prop",
            Self::PropTypeMismatch => "prop-type-mismatch",
            Self::ArgumentTypeMismatch => "argument-type-mismatch",
            Self::ArgumentCount => "argument-count",
            Self::CreateElementArity => "create-element-arity",
            Self::MissingChildren => "missing-children",
            Self::UnknownStateField => "unknown-state-field",
            Self::UnknownPropType => "unknown-prop-type",
            Self::UnexpectedStateType => "unexpected-state-type",
            Self::TypeMismatch => "type-mismatch",
            Self::PossiblyUndefinedProperty => "possibly-undefined-property",
            Self::InexistentProperty => "inexistent-property",
            Self::UnknownJsDocTag => "unknown-jsdoc-tag",
            Self::DangerousThisUsage => "dangerous-this-usage",
            Self::UselessCode => "useless-code",
            Self::Other => "other",
        }
    }

    /// Whether the code is one the host checker emits.
    pub fn is_host(&self) -> bool {
        self.code() >= 9000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileId;

    #[test]
    fn test_diagnostic_creation() {
        let site = Site::new(FileId(0), 0, 3);
        let diag = Diagnostic::error(DiagnosticCode::CyclicMixin, "cycle", site)
            .with_related("included here", Site::new(FileId(0), 10, 12));
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.related.len(), 1);
        assert!(!Diagnostic::warning(DiagnosticCode::UnknownPropType, "w", site).is_error());
    }

    #[test]
    fn test_error_code() {
        assert_eq!(DiagnosticCode::AmbiguousMixinMethod.code(), 1002);
        assert_eq!(
            DiagnosticCode::AmbiguousMixinMethod.name(),
            "ambiguous-mixin-method"
        );
        assert!(DiagnosticCode::UselessCode.is_host());
        assert!(!DiagnosticCode::UnknownMethod.is_host());
    }

    #[test]
    fn test_serde_name_matches() {
        let json = serde_json::to_string(&DiagnosticCode::PossiblyUndefinedProperty).unwrap();
        assert_eq!(json, "\"possibly-undefined-property\"");
        let code: DiagnosticCode = serde_json::from_str("\"unknown-jsdoc-tag\"").unwrap();
        assert_eq!(code, DiagnosticCode::UnknownJsDocTag);
    }
}
