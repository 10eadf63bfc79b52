//! Reference graph and the side-effect-free signal for unused factory calls.
//!
//! A factory call has no observable effect when nothing reads its bound name. Readers
//! located inside the specification of another unread factory call do not count, so
//! a mixin used only by a dead component is dead as well.

use oxc_ast::ast::{IdentifierReference, JSXMemberExpression, Program, StaticMemberExpression};
use oxc_ast_visit::{walk, Visit};
use tessera_carton::{CompactString, FileId, FxIndexMap, Site};

use crate::registry::CallRegistry;
use crate::syntax::{jsx_member_name, qualified_name, site};

/// A read of a factory-bound name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: CompactString,
    pub site: Site,
}

/// Reads of factory-bound names across a compilation.
#[derive(Debug, Default)]
pub struct ReferenceGraph {
    references: Vec<Reference>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the reads in one program. The registry must already hold every call.
    pub fn collect(&mut self, program: &Program<'_>, file: FileId, registry: &CallRegistry) {
        let mut collector = ReferenceCollector {
            file,
            registry,
            references: &mut self.references,
        };
        collector.visit_program(program);
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn readers_of<'g>(&'g self, name: &'g str) -> impl Iterator<Item = &'g Reference> + 'g {
        self.references.iter().filter(move |r| r.name == name)
    }
}

struct ReferenceCollector<'r> {
    file: FileId,
    registry: &'r CallRegistry,
    references: &'r mut Vec<Reference>,
}

impl ReferenceCollector<'_> {
    fn record(&mut self, name: &str, site: Site) {
        let Some(call) = self.registry.lookup(name) else {
            return;
        };
        // The binding itself and abstract declaration statements are not reads.
        let in_abstract = self
            .registry
            .abstract_sites()
            .iter()
            .any(|s| s.contains(&site));
        if call.decl_site.contains(&site) || in_abstract {
            return;
        }
        self.references.push(Reference {
            name: name.into(),
            site,
        });
    }
}

impl<'a> Visit<'a> for ReferenceCollector<'_> {
    fn visit_identifier_reference(&mut self, id: &IdentifierReference<'a>) {
        self.record(id.name.as_str(), site(self.file, id.span));
    }

    fn visit_static_member_expression(&mut self, member: &StaticMemberExpression<'a>) {
        if let Some(mut name) = qualified_name(&member.object) {
            name.push('.');
            name.push_str(member.property.name.as_str());
            self.record(&name, site(self.file, member.span));
        }
        walk::walk_static_member_expression(self, member);
    }

    fn visit_jsx_member_expression(&mut self, member: &JSXMemberExpression<'a>) {
        if let Some(name) = jsx_member_name(member) {
            self.record(&name, site(self.file, member.span));
        }
        walk::walk_jsx_member_expression(self, member);
    }
}

/// Per declared name, whether the factory call bound to it may be removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideEffectFacts {
    facts: FxIndexMap<CompactString, bool>,
}

impl SideEffectFacts {
    /// Compute the facts as a greatest fixpoint: start from every unexported call being
    /// unread, then revive calls with a reader outside all still-unread specifications.
    pub fn compute(registry: &CallRegistry, graph: &ReferenceGraph) -> Self {
        let mut dead: Vec<bool> = registry.calls().map(|c| !c.exported).collect();

        loop {
            let mut changed = false;
            for call in registry.calls() {
                if !dead[call.id.index()] {
                    continue;
                }
                let live_reader = graph.readers_of(&call.name).any(|r| {
                    !call.spec_site.contains(&r.site)
                        && !registry.calls().any(|other| {
                            dead[other.id.index()] && other.spec_site.contains(&r.site)
                        })
                });
                if live_reader {
                    dead[call.id.index()] = false;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let facts: FxIndexMap<CompactString, bool> = registry
            .calls()
            .map(|c| (c.name.clone(), dead[c.id.index()]))
            .collect();
        tracing::info!(
            removable = facts.values().filter(|free| **free).count(),
            total = facts.len(),
            "computed side-effect facts"
        );
        Self { facts }
    }

    /// Whether the factory call bound to `name` has no observable side effect.
    pub fn is_side_effect_free(&self, name: &str) -> bool {
        self.facts.get(name).copied().unwrap_or(false)
    }

    /// Names marked side-effect-free, in declaration order.
    pub fn removable(&self) -> impl Iterator<Item = &str> {
        self.facts
            .iter()
            .filter(|(_, free)| **free)
            .map(|(name, _)| name.as_str())
    }
}
