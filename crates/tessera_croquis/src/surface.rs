//! Merged member surfaces.
//!
//! Plain data: what a mixin or component exposes after flattening its `mixins` list.
//! The resolver builds these; the synthesizer and checker only read them.

use tessera_carton::{CompactString, FxHashSet, FxIndexMap, Site, SmallVec};

use crate::factory::{DefId, FactoryId, MemberKind, SpecMember, StaticDef};
use crate::lifecycle::LifecycleHook;
use crate::types::{Signature, SynthType};

/// One definition of a member, remembered with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDefinition {
    pub def: DefId,
    /// The factory whose specification contains the definition.
    pub origin: FactoryId,
    pub site: Site,
    pub kind: MemberKind,
    pub private: bool,
}

impl MemberDefinition {
    pub fn from_spec(member: &SpecMember) -> Self {
        Self {
            def: member.def,
            origin: member.def.owner,
            site: member.site,
            kind: member.kind.clone(),
            private: member.private,
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        match &self.kind {
            MemberKind::Method { signature, .. } | MemberKind::Abstract { signature } => {
                signature.as_ref()
            }
            MemberKind::Value(_) => None,
        }
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, MemberKind::Abstract { .. })
    }

    /// Give an unannotated definition a signature declared elsewhere.
    pub fn inherit_signature(&mut self, from: &MemberDefinition) {
        if let (MemberKind::Method { signature: slot @ None, .. }, Some(sig)) =
            (&mut self.kind, from.signature())
        {
            *slot = Some(sig.clone());
        }
    }
}

/// A named member of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMember {
    pub name: CompactString,
    pub hook: Option<LifecycleHook>,
    /// One definition for ordinary members; the chain in call order for hooks.
    pub definitions: SmallVec<[MemberDefinition; 1]>,
}

impl SurfaceMember {
    /// The definition a call reaches; the first of a hook chain.
    pub fn primary(&self) -> Option<&MemberDefinition> {
        self.definitions.first()
    }

    /// The first annotated signature among the definitions.
    pub fn declared_signature(&self) -> Option<&Signature> {
        self.definitions.iter().find_map(MemberDefinition::signature)
    }

    pub fn is_value(&self) -> bool {
        self.definitions
            .iter()
            .all(|d| matches!(d.kind, MemberKind::Value(_)))
    }

    pub fn value_type(&self) -> Option<&SynthType> {
        match &self.primary()?.kind {
            MemberKind::Value(ty) => Some(ty),
            _ => None,
        }
    }
}

/// A merged static.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMember {
    pub def: DefId,
    pub name: CompactString,
    pub origin: FactoryId,
    pub site: Site,
    pub ty: SynthType,
}

impl StaticMember {
    pub fn from_spec(def: &StaticDef) -> Self {
        Self {
            def: def.def,
            name: def.name.clone(),
            origin: def.def.owner,
            site: def.site,
            ty: def.ty.clone(),
        }
    }
}

/// A collision between sibling mixins that nothing has overridden yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Ambiguity {
    pub name: CompactString,
    pub is_static: bool,
    /// `(origin, definition site)`, in merge order.
    pub origins: Vec<(FactoryId, Site)>,
}

/// The flattened member set of a mixin or component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixinSurface {
    pub members: FxIndexMap<CompactString, SurfaceMember>,
    pub statics: FxIndexMap<CompactString, StaticMember>,
    /// Unresolved sibling collisions, carried to whoever includes this surface.
    pub ambiguities: Vec<Ambiguity>,
    /// Every mixin reachable through `mixins`, transitively.
    pub includes: FxHashSet<FactoryId>,
    /// Includes a library-provided pure render mixin.
    pub pure_render: bool,
}

impl MixinSurface {
    pub fn member(&self, name: &str) -> Option<&SurfaceMember> {
        self.members.get(name)
    }

    /// The chain of definitions for a lifecycle hook, in call order.
    pub fn hook_chain(&self, hook: LifecycleHook) -> &[MemberDefinition] {
        self.members
            .get(hook.name())
            .map(|m| m.definitions.as_slice())
            .unwrap_or(&[])
    }
}
