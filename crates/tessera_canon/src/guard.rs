//! Diagnostic guard.
//!
//! Filters a host checker's diagnostic stream, removing the false positives the factory
//! idiom provokes. The guard is strictly subtractive: the output is a subsequence of the
//! input in the original order.

use once_cell::sync::Lazy;
use regex::Regex;
use tessera_carton::{Diagnostic, DiagnosticCode, Site, SourceFiles};
use tessera_croquis::factory::MemberKind;
use tessera_croquis::lifecycle::{standard_method_names, LifecycleHook};
use tessera_croquis::nominal::{ComponentType, TypeRegistry};
use tessera_croquis::options::PassOptions;
use tessera_croquis::registry::CallRegistry;

static PROPERTY_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"Property (\w+)").ok());

static NEVER_DEFINED_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"Property (\w+) never defined on (\S+)").ok());

static PROPS_VALIDATOR_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"actual parameter 1 of (.+)\$\$PropsValidator does not match formal parameter")
        .ok()
});

/// A suppression rule, in the order the guard tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardRule {
    /// Unknown JSDoc tags inside the UI library's own sources.
    LibraryJsDoc,
    /// `this` inside a method of a factory specification.
    SpecMethodThis,
    /// Lifecycle hooks read inside a specification, which the runtime dispatches.
    DispatchedLifecycleHook,
    /// Members the host cannot see because synthesis added them.
    SynthesizedMember,
    /// The bare statement declaring a mixin abstract method.
    MixinAbstractDeclaration,
    /// The host's props validator mismatch, already reported legibly by the usage checker.
    PropsValidatorMismatch,
}

impl GuardRule {
    pub const ALL: [GuardRule; 6] = [
        GuardRule::LibraryJsDoc,
        GuardRule::SpecMethodThis,
        GuardRule::DispatchedLifecycleHook,
        GuardRule::SynthesizedMember,
        GuardRule::MixinAbstractDeclaration,
        GuardRule::PropsValidatorMismatch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LibraryJsDoc => "library-jsdoc",
            Self::SpecMethodThis => "spec-method-this",
            Self::DispatchedLifecycleHook => "dispatched-lifecycle-hook",
            Self::SynthesizedMember => "synthesized-member",
            Self::MixinAbstractDeclaration => "mixin-abstract-declaration",
            Self::PropsValidatorMismatch => "props-validator-mismatch",
        }
    }
}

/// Host diagnostic filter over one compilation's registries.
pub struct DiagnosticGuard<'g> {
    registry: &'g CallRegistry,
    types: &'g dyn TypeRegistry,
    files: &'g SourceFiles,
    options: &'g PassOptions,
}

impl<'g> DiagnosticGuard<'g> {
    pub fn new(
        registry: &'g CallRegistry,
        types: &'g dyn TypeRegistry,
        files: &'g SourceFiles,
        options: &'g PassOptions,
    ) -> Self {
        Self {
            registry,
            types,
            files,
            options,
        }
    }

    /// Drop every diagnostic a rule matches, keeping the rest in order.
    pub fn filter(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        let before = diagnostics.len();
        let kept: Vec<Diagnostic> = diagnostics
            .into_iter()
            .filter(|d| match self.rule_for(d) {
                Some(rule) => {
                    tracing::trace!(rule = rule.name(), message = %d.message, "suppressed");
                    false
                }
                None => true,
            })
            .collect();
        tracing::info!(
            suppressed = before - kept.len(),
            kept = kept.len(),
            "filtered host diagnostics"
        );
        kept
    }

    /// The first rule suppressing `diagnostic`, if any.
    pub fn rule_for(&self, diagnostic: &Diagnostic) -> Option<GuardRule> {
        GuardRule::ALL
            .into_iter()
            .find(|rule| self.matches(*rule, diagnostic))
    }

    fn matches(&self, rule: GuardRule, d: &Diagnostic) -> bool {
        match rule {
            GuardRule::LibraryJsDoc => {
                d.code == DiagnosticCode::UnknownJsDocTag
                    && self
                        .options
                        .is_library_source(self.files.name(d.site.file))
            }
            GuardRule::SpecMethodThis => {
                d.code == DiagnosticCode::DangerousThisUsage && self.in_spec_method(&d.site)
            }
            GuardRule::DispatchedLifecycleHook => {
                matches!(
                    d.code,
                    DiagnosticCode::PossiblyUndefinedProperty | DiagnosticCode::InexistentProperty
                ) && capture(&PROPERTY_RE, &d.message, 1).is_some_and(is_dispatched)
                    && self.registry.calls().any(|c| c.spec_site.contains(&d.site))
            }
            GuardRule::SynthesizedMember => {
                d.code == DiagnosticCode::InexistentProperty && self.is_synthesized(&d.message)
            }
            GuardRule::MixinAbstractDeclaration => {
                d.code == DiagnosticCode::UselessCode
                    && self.registry.abstract_sites().iter().any(|s| {
                        // Hosts may or may not include the trailing semicolon.
                        s.file == d.site.file
                            && s.start == d.site.start
                            && s.end.abs_diff(d.site.end) <= 1
                    })
            }
            GuardRule::PropsValidatorMismatch => {
                d.code == DiagnosticCode::TypeMismatch
                    && capture(&PROPS_VALIDATOR_RE, &d.message, 1)
                        .is_some_and(|name| self.types.component(name).is_some())
            }
        }
    }

    fn in_spec_method(&self, at: &Site) -> bool {
        self.registry.calls().any(|call| {
            call.spec.members.values().any(|member| {
                matches!(&member.kind, MemberKind::Method { function_site, .. } if function_site.contains(at))
            })
        })
    }

    fn is_synthesized(&self, message: &str) -> bool {
        let Some(caps) = NEVER_DEFINED_RE.as_ref().and_then(|re| re.captures(message)) else {
            return false;
        };
        let (Some(property), Some(owner)) = (caps.get(1), caps.get(2)) else {
            return false;
        };
        let owner = owner
            .as_str()
            .trim_start_matches(['!', '?'])
            .trim_end_matches(['.', ','])
            .trim_end_matches(".prototype");
        self.component_named(owner).is_some_and(|component| {
            component.has_member(property.as_str())
                || component.static_member(property.as_str()).is_some()
        })
    }

    /// A component by its name or its interface name.
    fn component_named(&self, name: &str) -> Option<&'g ComponentType> {
        let types = self.types;
        types.component(name).or_else(|| {
            let base = name.strip_suffix("Interface")?;
            self.registry
                .components()
                .find(|call| call.name.replace('.', "_") == base)
                .and_then(|call| types.component(&call.name))
        })
    }
}

fn capture<'m>(re: &Lazy<Option<Regex>>, message: &'m str, group: usize) -> Option<&'m str> {
    let re = re.as_ref()?;
    Some(re.captures(message)?.get(group)?.as_str())
}

fn is_dispatched(name: &str) -> bool {
    LifecycleHook::from_name(name).is_some() || standard_method_names().any(|n| n == name)
}
