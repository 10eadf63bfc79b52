//! Factory call records.
//!
//! A [`FactoryCall`] is the owned, read-only description of one `createClass` or
//! `createMixin` call, extracted from the AST during collection. Nothing downstream
//! touches the AST of a specification again.

use tessera_carton::{CompactString, FxHashSet, FxIndexMap, Site};

use crate::lifecycle::LifecycleHook;
use crate::types::{Signature, SynthType};
use crate::validator::ValidatorDescriptor;

/// Identity of a recorded factory call within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactoryId(pub u32);

impl FactoryId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which factory produced the declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactoryKind {
    Component,
    Mixin,
}

impl FactoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Mixin => "mixin",
        }
    }
}

/// A recorded factory call bound to a name.
#[derive(Debug, Clone)]
pub struct FactoryCall {
    pub id: FactoryId,
    pub kind: FactoryKind,
    /// Bound name, dotted for namespace assignments.
    pub name: CompactString,
    /// The call expression.
    pub site: Site,
    /// The binding the result is assigned to.
    pub decl_site: Site,
    /// The specification object literal.
    pub spec_site: Site,
    /// Declared with `export`.
    pub exported: bool,
    pub spec: FactorySpec,
}

impl FactoryCall {
    pub fn is_component(&self) -> bool {
        self.kind == FactoryKind::Component
    }

    pub fn is_mixin(&self) -> bool {
        self.kind == FactoryKind::Mixin
    }
}

/// The structured contents of a specification object.
#[derive(Debug, Clone, Default)]
pub struct FactorySpec {
    /// Methods and plain values, in source order.
    pub members: FxIndexMap<CompactString, SpecMember>,
    pub mixins: Vec<MixinRef>,
    pub statics: FxIndexMap<CompactString, StaticDef>,
    pub prop_types: Option<FxIndexMap<CompactString, PropTypeDef>>,
    pub display_name: Option<CompactString>,
    /// Keys of the object literal returned by `getDefaultProps`.
    pub default_props: FxHashSet<CompactString>,
    /// What `getInitialState` says about the state shape.
    pub state_hint: Option<StateHint>,
    /// Definitions handed out so far, including overwritten duplicate keys.
    next_def: u32,
}

impl FactorySpec {
    /// A fresh definition identity owned by `owner`.
    pub fn allocate_def(&mut self, owner: FactoryId) -> DefId {
        let id = DefId {
            owner,
            index: self.next_def,
        };
        self.next_def += 1;
        id
    }

    pub fn member(&self, name: &str) -> Option<&SpecMember> {
        self.members.get(name)
    }
}

/// Identity of one member definition, stable across merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId {
    pub owner: FactoryId,
    pub index: u32,
}

/// A member of a specification.
#[derive(Debug, Clone)]
pub struct SpecMember {
    pub def: DefId,
    pub name: CompactString,
    /// The property (or abstract declaration statement).
    pub site: Site,
    pub kind: MemberKind,
    /// Marked `@private`.
    pub private: bool,
}

impl SpecMember {
    pub fn hook(&self) -> Option<LifecycleHook> {
        LifecycleHook::from_name(&self.name)
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
}

/// What a member is.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    /// A function-valued property.
    Method {
        /// Signature from JSDoc, if annotated.
        signature: Option<Signature>,
        /// Declared parameter count.
        arity: usize,
        /// The function expression, used to recognize `this` inside it.
        function_site: Site,
    },
    /// `/** @param ... */ Mixin.name;` after a mixin declaration.
    Abstract { signature: Option<Signature> },
    /// Any other value.
    Value(SynthType),
}

/// An entry of a `mixins` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinRef {
    pub name: CompactString,
    pub site: Site,
}

/// An entry of a `statics` record.
#[derive(Debug, Clone)]
pub struct StaticDef {
    pub def: DefId,
    pub name: CompactString,
    pub site: Site,
    pub ty: SynthType,
}

/// An entry of a `propTypes` record.
#[derive(Debug, Clone)]
pub struct PropTypeDef {
    pub name: CompactString,
    pub site: Site,
    pub validator: ValidatorDescriptor,
    /// An explicit `@type` on the key replaces the validator's type.
    pub type_override: Option<SynthType>,
}

/// State shape evidence from `getInitialState`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateHint {
    pub ty: SynthType,
    /// From a `@return` annotation rather than the returned literal.
    pub annotated: bool,
    pub site: Site,
}

/// Why a factory call was excluded from synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueReason {
    /// The call result is not bound to a name.
    Unbound,
    /// The specification is not an object literal.
    NonLiteralSpec,
    /// `mixins` is not an array literal.
    ComputedMixins,
    /// A `mixins` entry is not a name.
    ComputedMixinEntry,
    /// `statics` is not an object literal.
    ComputedStatics,
    /// The name was already bound to another factory call.
    Duplicate,
}

impl OpaqueReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Unbound => "result is not bound to a name",
            Self::NonLiteralSpec => "specification is not an object literal",
            Self::ComputedMixins => "mixins is not an array literal",
            Self::ComputedMixinEntry => "mixins entry is not a name",
            Self::ComputedStatics => "statics is not an object literal",
            Self::Duplicate => "name is already bound to a factory call",
        }
    }
}

/// A factory call excluded from synthesis.
#[derive(Debug, Clone)]
pub struct OpaqueCall {
    pub name: Option<CompactString>,
    pub kind: FactoryKind,
    pub site: Site,
    pub reason: OpaqueReason,
}
