//! Compilation-wide registry of factory calls.

use tessera_carton::{
    CompactString, Diagnostic, DiagnosticCode, FxHashMap, FxHashSet, Site,
};

use crate::factory::{
    FactoryCall, FactoryId, FactoryKind, MemberKind, OpaqueCall, OpaqueReason, SpecMember,
};
use crate::jsdoc::JsDoc;
use crate::types::{Param, Signature, SynthType};

/// A `/** ... */ Owner.name;` statement awaiting its mixin.
#[derive(Debug, Clone)]
pub struct AbstractDecl {
    pub owner: CompactString,
    pub name: CompactString,
    pub site: Site,
    pub doc: JsDoc,
}

/// Every factory call of one compilation, keyed by bound name.
///
/// Populated by collection over all files, then frozen with [`CallRegistry::finish`]
/// before any resolution runs.
#[derive(Debug, Default)]
pub struct CallRegistry {
    calls: Vec<FactoryCall>,
    by_name: FxHashMap<CompactString, FactoryId>,
    opaque: Vec<OpaqueCall>,
    opaque_names: FxHashSet<CompactString>,
    pending_abstract: Vec<AbstractDecl>,
    abstract_sites: Vec<Site>,
    diagnostics: Vec<Diagnostic>,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next inserted call will receive.
    pub fn next_id(&self) -> FactoryId {
        FactoryId(self.calls.len() as u32)
    }

    /// Record a call. A name bound twice keeps its first call.
    pub fn insert(&mut self, call: FactoryCall) -> Option<FactoryId> {
        if let Some(&first) = self.by_name.get(&call.name) {
            let first_site = self.calls[first.index()].decl_site;
            self.diagnostics.push(
                Diagnostic::warning(
                    DiagnosticCode::DuplicateFactory,
                    format!(
                        "`{}` is already bound to a factory call; this {} is not checked",
                        call.name,
                        call.kind.label()
                    ),
                    call.decl_site,
                )
                .with_related("first bound here", first_site),
            );
            self.record_opaque(OpaqueCall {
                name: Some(call.name),
                kind: call.kind,
                site: call.site,
                reason: OpaqueReason::Duplicate,
            });
            return None;
        }

        debug_assert_eq!(call.id, self.next_id());
        let id = call.id;
        tracing::debug!(name = %call.name, kind = call.kind.label(), "recorded factory call");
        self.by_name.insert(call.name.clone(), id);
        self.calls.push(call);
        Some(id)
    }

    pub fn record_opaque(&mut self, call: OpaqueCall) {
        tracing::debug!(
            name = call.name.as_deref().unwrap_or("<unbound>"),
            reason = call.reason.describe(),
            "factory call excluded from synthesis"
        );
        if let Some(name) = &call.name {
            if !self.by_name.contains_key(name) {
                self.opaque_names.insert(name.clone());
            }
        }
        self.opaque.push(call);
    }

    pub fn add_abstract(&mut self, decl: AbstractDecl) {
        self.pending_abstract.push(decl);
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Attach abstract declarations to their mixins.
    pub fn finish(&mut self) {
        for decl in std::mem::take(&mut self.pending_abstract) {
            let Some(&id) = self.by_name.get(&decl.owner) else {
                continue;
            };
            let call = &mut self.calls[id.index()];
            if call.kind != FactoryKind::Mixin {
                continue;
            }
            let signature = abstract_signature(&decl.doc);
            self.abstract_sites.push(decl.site);

            if let Some(existing) = call.spec.members.get_mut(&decl.name) {
                // A concrete definition wins but takes the declared signature.
                if let MemberKind::Method {
                    signature: slot @ None,
                    ..
                } = &mut existing.kind
                {
                    *slot = signature;
                }
                continue;
            }

            let def = call.spec.allocate_def(id);
            call.spec.members.insert(
                decl.name.clone(),
                SpecMember {
                    def,
                    name: decl.name,
                    site: decl.site,
                    kind: MemberKind::Abstract { signature },
                    private: decl.doc.private,
                },
            );
        }
    }

    pub fn get(&self, id: FactoryId) -> &FactoryCall {
        &self.calls[id.index()]
    }

    pub fn id_of(&self, name: &str) -> Option<FactoryId> {
        self.by_name.get(name).copied()
    }

    pub fn lookup(&self, name: &str) -> Option<&FactoryCall> {
        self.id_of(name).map(|id| self.get(id))
    }

    pub fn calls(&self) -> impl Iterator<Item = &FactoryCall> {
        self.calls.iter()
    }

    pub fn components(&self) -> impl Iterator<Item = &FactoryCall> {
        self.calls.iter().filter(|c| c.is_component())
    }

    pub fn mixins(&self) -> impl Iterator<Item = &FactoryCall> {
        self.calls.iter().filter(|c| c.is_mixin())
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Whether the name is bound to a factory call that opted out of synthesis.
    pub fn is_opaque(&self, name: &str) -> bool {
        self.opaque_names.contains(name)
    }

    pub fn opaque(&self) -> &[OpaqueCall] {
        &self.opaque
    }

    /// Sites of abstract method declaration statements.
    pub fn abstract_sites(&self) -> &[Site] {
        &self.abstract_sites
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

fn abstract_signature(doc: &JsDoc) -> Option<Signature> {
    if !doc.has_type_annotations() {
        return None;
    }
    if let Some(crate::jsdoc::TypeTag {
        ty: SynthType::Function(sig),
        ..
    }) = &doc.type_tag
    {
        return Some((**sig).clone());
    }
    let params = doc
        .params
        .iter()
        .map(|p| Param {
            name: p.name.clone(),
            ty: p.ty.clone(),
            optional: p.optional,
            rest: p.rest,
        })
        .collect();
    Some(Signature::new(
        params,
        doc.returns.clone().unwrap_or(SynthType::Unknown),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::FactorySpec;
    use tessera_carton::FileId;

    fn call(registry: &CallRegistry, name: &str, kind: FactoryKind, at: u32) -> FactoryCall {
        let site = Site::new(FileId(0), at, at + 10);
        FactoryCall {
            id: registry.next_id(),
            kind,
            name: name.into(),
            site,
            decl_site: site,
            spec_site: site,
            exported: false,
            spec: FactorySpec::default(),
        }
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut registry = CallRegistry::new();
        let first = call(&registry, "Widget", FactoryKind::Component, 0);
        assert_eq!(registry.insert(first), Some(FactoryId(0)));
        let second = call(&registry, "Widget", FactoryKind::Component, 50);
        assert_eq!(registry.insert(second), None);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("Widget").unwrap().site.start, 0);
        assert!(!registry.is_opaque("Widget"));
        assert_eq!(registry.diagnostics().len(), 1);
        assert_eq!(registry.diagnostics()[0].code, DiagnosticCode::DuplicateFactory);
    }

    #[test]
    fn test_abstract_declarations_attach_to_mixins() {
        let mut registry = CallRegistry::new();
        let mixin = call(&registry, "Sortable", FactoryKind::Mixin, 0);
        registry.insert(mixin);
        registry.add_abstract(AbstractDecl {
            owner: "Sortable".into(),
            name: "compare".into(),
            site: Site::new(FileId(0), 100, 120),
            doc: JsDoc::parse("@param {number} a @param {number} b @return {number}"),
        });
        registry.add_abstract(AbstractDecl {
            owner: "Missing".into(),
            name: "x".into(),
            site: Site::new(FileId(0), 130, 140),
            doc: JsDoc::default(),
        });
        registry.finish();

        let member = registry.lookup("Sortable").unwrap().spec.member("compare").unwrap();
        assert!(member.is_abstract());
        assert_eq!(member.signature().unwrap().min_arity(), 2);
        assert_eq!(registry.abstract_sites().len(), 1);
    }

    #[test]
    fn test_opaque_names() {
        let mut registry = CallRegistry::new();
        registry.record_opaque(OpaqueCall {
            name: Some("Dynamic".into()),
            kind: FactoryKind::Mixin,
            site: Site::new(FileId(0), 0, 5),
            reason: OpaqueReason::NonLiteralSpec,
        });
        assert!(registry.is_opaque("Dynamic"));
        assert_eq!(registry.opaque().len(), 1);
    }
}
