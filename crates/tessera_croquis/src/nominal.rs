//! Synthesized nominal types and the registry they are published to.

use tessera_carton::{CompactString, FxHashMap, FxIndexMap, Site};

use crate::factory::{DefId, FactoryId};
use crate::lifecycle::LifecycleHook;
use crate::types::{Record, Signature, SynthType};

/// Where an instance method comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodSource {
    /// Defined by the component or one of its mixins.
    Defined(FactoryId),
    /// Declared on a mixin but implemented nowhere.
    Abstract(FactoryId),
    /// Supplied by the runtime (`setState`, a pure render mixin, ...).
    Builtin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodType {
    pub name: CompactString,
    /// `None` accepts any arguments and returns an unconstrained value.
    pub signature: Option<Signature>,
    pub source: MethodSource,
    pub site: Option<Site>,
    pub private: bool,
}

/// A field of a props record.
#[derive(Debug, Clone, PartialEq)]
pub struct PropField {
    pub ty: SynthType,
    pub required: bool,
    /// Supplied by `getDefaultProps`, so it may be omitted.
    pub has_default: bool,
    pub site: Option<Site>,
}

impl PropField {
    /// Must be passed at element construction.
    pub fn must_be_passed(&self) -> bool {
        self.required && !self.has_default
    }
}

/// The props a component accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropsRecord {
    pub fields: FxIndexMap<CompactString, PropField>,
    /// Built from `propTypes`; an undeclared record accepts any key.
    pub declared: bool,
}

/// Keys every element accepts regardless of `propTypes`.
pub const RESERVED_PROPS: [&str; 3] = ["key", "ref", "children"];

impl PropsRecord {
    pub fn field(&self, name: &str) -> Option<&PropField> {
        self.fields.get(name)
    }

    pub fn accepts(&self, name: &str) -> bool {
        !self.declared || RESERVED_PROPS.contains(&name) || self.fields.contains_key(name)
    }

    pub fn children(&self) -> Option<&PropField> {
        self.fields.get("children")
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        for (name, field) in &self.fields {
            record = record.with_field(name.clone(), field.ty.clone(), !field.required);
        }
        record
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticType {
    pub name: CompactString,
    pub ty: SynthType,
    /// `None` for statics every component has.
    pub origin: Option<FactoryId>,
    pub site: Option<Site>,
}

/// One link of a lifecycle hook chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookLink {
    pub def: DefId,
    pub origin: FactoryId,
    pub site: Site,
}

/// The synthesized type of a component factory call.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentType {
    pub id: FactoryId,
    pub name: CompactString,
    pub site: Site,
    pub methods: FxIndexMap<CompactString, MethodType>,
    /// Non-function specification values.
    pub fields: FxIndexMap<CompactString, SynthType>,
    pub props: PropsRecord,
    /// `None` when the state shape could not be determined.
    pub state: Option<Record>,
    pub statics: FxIndexMap<CompactString, StaticType>,
    /// Hooks in runtime call order; `render` holds the one effective definition.
    pub hooks: Vec<(LifecycleHook, Vec<HookLink>)>,
    pub pure_render: bool,
}

impl ComponentType {
    pub fn method(&self, name: &str) -> Option<&MethodType> {
        self.methods.get(name)
    }

    pub fn static_member(&self, name: &str) -> Option<&StaticType> {
        self.statics.get(name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.methods.contains_key(name)
            || self.fields.contains_key(name)
            || matches!(name, "props" | "state")
    }

    pub fn hook_chain(&self, hook: LifecycleHook) -> &[HookLink] {
        self.hooks
            .iter()
            .find(|(h, _)| *h == hook)
            .map(|(_, links)| links.as_slice())
            .unwrap_or(&[])
    }

    pub fn interface_name(&self) -> String {
        format!("{}Interface", self.name.replace('.', "_"))
    }

    pub fn instance_type(&self) -> SynthType {
        SynthType::Named(self.name.clone())
    }

    pub fn element_type(&self) -> SynthType {
        SynthType::Element(Some(self.name.clone()))
    }
}

/// A mixin, published as an interface.
#[derive(Debug, Clone, PartialEq)]
pub struct MixinType {
    pub id: FactoryId,
    pub name: CompactString,
    pub site: Site,
    pub methods: FxIndexMap<CompactString, Option<Signature>>,
    pub statics: FxIndexMap<CompactString, SynthType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NominalType {
    Component(ComponentType),
    Mixin(MixinType),
}

impl NominalType {
    pub fn name(&self) -> &CompactString {
        match self {
            Self::Component(c) => &c.name,
            Self::Mixin(m) => &m.name,
        }
    }

    pub fn site(&self) -> Site {
        match self {
            Self::Component(c) => c.site,
            Self::Mixin(m) => m.site,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentType> {
        match self {
            Self::Component(c) => Some(c),
            Self::Mixin(_) => None,
        }
    }
}

/// The host's type registry as the pass sees it.
pub trait TypeRegistry {
    /// Register a type under its declared name. A name registers once.
    fn register(&mut self, ty: NominalType) -> bool;

    fn lookup(&self, name: &str) -> Option<&NominalType>;

    /// Attach a type to the expression at `site`.
    fn attach(&mut self, site: Site, ty: SynthType);

    fn attached(&self, site: &Site) -> Option<&SynthType>;

    fn component(&self, name: &str) -> Option<&ComponentType> {
        self.lookup(name).and_then(NominalType::as_component)
    }
}

/// In-memory [`TypeRegistry`], scoped to one compilation.
#[derive(Debug, Default)]
pub struct NominalRegistry {
    types: FxIndexMap<CompactString, NominalType>,
    attached: FxHashMap<Site, SynthType>,
}

impl NominalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &NominalType> {
        self.types.values()
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentType> {
        self.types.values().filter_map(NominalType::as_component)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeRegistry for NominalRegistry {
    fn register(&mut self, ty: NominalType) -> bool {
        if self.types.contains_key(ty.name()) {
            return false;
        }
        tracing::debug!(name = %ty.name(), "registered nominal type");
        self.types.insert(ty.name().clone(), ty);
        true
    }

    fn lookup(&self, name: &str) -> Option<&NominalType> {
        self.types.get(name)
    }

    fn attach(&mut self, site: Site, ty: SynthType) {
        self.attached.insert(site, ty);
    }

    fn attached(&self, site: &Site) -> Option<&SynthType> {
        self.attached.get(site)
    }
}
