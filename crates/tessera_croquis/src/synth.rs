//! Component synthesizer.
//!
//! Turns each resolved component into a [`ComponentType`] and publishes it, together with
//! one interface per resolved mixin, to a [`TypeRegistry`]. Components are independent
//! once all mixins are flattened, so synthesis may run on the rayon pool; registration is
//! always sequential and in declaration order.

use rayon::prelude::*;
use tessera_carton::{CompactString, Diagnostic, DiagnosticCode, FxIndexMap};

use crate::factory::{FactoryCall, FactoryId};
use crate::lifecycle::{instance_api, instance_api_names, standard_signature, LifecycleHook};
use crate::nominal::{
    ComponentType, HookLink, MethodSource, MethodType, MixinType, NominalType, PropField,
    PropsRecord, StaticType, TypeRegistry,
};
use crate::options::PassOptions;
use crate::registry::CallRegistry;
use crate::resolver::ResolvedSurfaces;
use crate::surface::{MemberDefinition, MixinSurface, SurfaceMember};
use crate::types::{Record, SynthType};

/// Statics every component constructor carries.
fn builtin_statics() -> [(&'static str, SynthType); 3] {
    [
        ("displayName", SynthType::string()),
        ("propTypes", SynthType::AnyObject),
        ("defaultProps", SynthType::AnyObject),
    ]
}

/// Synthesis result.
#[derive(Debug, Default)]
pub struct SynthesisOutput {
    /// Components registered, in declaration order.
    pub components: Vec<FactoryId>,
    pub mixins: Vec<FactoryId>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ComponentSynthesizer<'a> {
    registry: &'a CallRegistry,
    surfaces: &'a ResolvedSurfaces,
    options: &'a PassOptions,
}

impl<'a> ComponentSynthesizer<'a> {
    pub fn new(
        registry: &'a CallRegistry,
        surfaces: &'a ResolvedSurfaces,
        options: &'a PassOptions,
    ) -> Self {
        Self {
            registry,
            surfaces,
            options,
        }
    }

    /// Synthesize every resolved component and register it with `types`.
    pub fn run<R: TypeRegistry>(&self, types: &mut R) -> SynthesisOutput {
        let mut output = SynthesisOutput::default();

        for mixin in self.registry.mixins() {
            let Some(surface) = self.surfaces.surface(mixin.id) else {
                continue;
            };
            if types.register(NominalType::Mixin(mixin_type(mixin, surface))) {
                output.mixins.push(mixin.id);
            }
        }

        let pending: Vec<(&FactoryCall, &MixinSurface)> = self
            .registry
            .components()
            .filter_map(|c| self.surfaces.surface(c.id).map(|s| (c, s)))
            .collect();

        let synthesized: Vec<(ComponentType, Vec<Diagnostic>)> = if self.options.parallel_synthesis
        {
            pending
                .par_iter()
                .map(|(call, surface)| self.synthesize(call, surface))
                .collect()
        } else {
            pending
                .iter()
                .map(|(call, surface)| self.synthesize(call, surface))
                .collect()
        };

        for (component, diagnostics) in synthesized {
            output.diagnostics.extend(diagnostics);
            let (id, name) = (component.id, component.name.clone());
            let site = self.registry.get(id).site;
            if types.register(NominalType::Component(component)) {
                types.attach(site, SynthType::Constructor(name));
                output.components.push(id);
            }
        }

        tracing::info!(
            components = output.components.len(),
            mixins = output.mixins.len(),
            "synthesized component types"
        );
        output
    }

    /// Build the type of one component from its resolved surface.
    pub fn synthesize(
        &self,
        call: &FactoryCall,
        surface: &MixinSurface,
    ) -> (ComponentType, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let (methods, fields) = instance_members(surface);
        let props = self.props(call, surface, &mut diagnostics);
        let state = self.state(call, surface, &mut diagnostics);

        let mut statics: FxIndexMap<CompactString, StaticType> = surface
            .statics
            .values()
            .map(|s| {
                (
                    s.name.clone(),
                    StaticType {
                        name: s.name.clone(),
                        ty: s.ty.clone(),
                        origin: Some(s.origin),
                        site: Some(s.site),
                    },
                )
            })
            .collect();
        for (name, ty) in builtin_statics() {
            statics.entry(name.into()).or_insert_with(|| StaticType {
                name: name.into(),
                ty,
                origin: None,
                site: None,
            });
        }

        let hooks = LifecycleHook::ALL
            .iter()
            .filter_map(|&hook| {
                let links = hook_links(call, surface, hook);
                (!links.is_empty()).then_some((hook, links))
            })
            .collect();

        tracing::trace!(component = %call.name, methods = methods.len(), "synthesized");
        let component = ComponentType {
            id: call.id,
            name: call.name.clone(),
            site: call.decl_site,
            methods,
            fields,
            props,
            state,
            statics,
            hooks,
            pure_render: surface.pure_render,
        };
        (component, diagnostics)
    }

    fn props(
        &self,
        call: &FactoryCall,
        surface: &MixinSurface,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> PropsRecord {
        let defaults = self.default_props(call, surface);
        let mut props = PropsRecord::default();

        let prop_types = call
            .spec
            .prop_types
            .as_ref()
            .filter(|_| self.options.check_prop_types);
        if let Some(prop_types) = prop_types {
            props.declared = true;
            for def in prop_types.values() {
                let (ty, required) = match &def.type_override {
                    Some(ty) => (ty.clone(), !ty.admits_nullish()),
                    None if def.validator.is_resolved() => {
                        (def.validator.to_type(), def.validator.is_required())
                    }
                    None => {
                        diagnostics.push(Diagnostic::warning(
                            DiagnosticCode::UnknownPropType,
                            format!(
                                "cannot determine the type of prop `{}` of `{}`; it is left unchecked",
                                def.name, call.name
                            ),
                            def.site,
                        ));
                        (SynthType::Unknown, false)
                    }
                };
                props.fields.insert(
                    def.name.clone(),
                    PropField {
                        ty,
                        required,
                        has_default: defaults.contains(&def.name),
                        site: Some(def.site),
                    },
                );
            }
        }

        props.fields.entry("children".into()).or_insert(PropField {
            ty: SynthType::Renderable,
            required: false,
            has_default: false,
            site: None,
        });
        props
    }

    /// Names supplied by any `getDefaultProps` in the chain.
    fn default_props(&self, call: &FactoryCall, surface: &MixinSurface) -> Vec<CompactString> {
        let mut names: Vec<CompactString> = Vec::new();
        let origins = surface
            .hook_chain(LifecycleHook::GetDefaultProps)
            .iter()
            .map(|d| d.origin)
            .chain(std::iter::once(call.id));
        for origin in origins {
            for name in &self.registry.get(origin).spec.default_props {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    fn state(
        &self,
        call: &FactoryCall,
        surface: &MixinSurface,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Record> {
        let chain = surface.hook_chain(LifecycleHook::GetInitialState);
        if chain.is_empty() {
            return None;
        }

        let mut state = Record::new();
        let mut known = true;
        for def in chain {
            let Some(hint) = &self.registry.get(def.origin).spec.state_hint else {
                known = false;
                continue;
            };
            match hint.ty.non_nullish() {
                SynthType::Record(record) => state.extend(&record),
                other => {
                    known = false;
                    let warn = hint.annotated
                        && def.origin == call.id
                        && !other.is_unknown()
                        && !matches!(hint.ty, SynthType::Null);
                    if warn {
                        diagnostics.push(Diagnostic::warning(
                            DiagnosticCode::UnexpectedStateType,
                            format!(
                                "getInitialState of `{}` should return a record type, found {}",
                                call.name, hint.ty
                            ),
                            hint.site,
                        ));
                    }
                }
            }
        }
        known.then_some(state)
    }
}

fn instance_members(
    surface: &MixinSurface,
) -> (FxIndexMap<CompactString, MethodType>, FxIndexMap<CompactString, SynthType>) {
    let mut methods = FxIndexMap::default();
    let mut fields = FxIndexMap::default();

    for (name, member) in &surface.members {
        if member.is_value() {
            if let Some(ty) = member.value_type() {
                fields.insert(name.clone(), ty.clone());
            }
            continue;
        }
        let Some(primary) = member.primary() else {
            continue;
        };
        let signature = member
            .declared_signature()
            .or_else(|| standard_signature(name))
            .cloned();
        methods.insert(
            name.clone(),
            MethodType {
                name: name.clone(),
                signature,
                source: source_of(member, primary),
                site: Some(primary.site),
                private: primary.private,
            },
        );
    }

    for name in instance_api_names() {
        methods.entry(name.into()).or_insert_with(|| builtin_method(name, instance_api(name)));
    }
    if surface.pure_render {
        methods
            .entry("shouldComponentUpdate".into())
            .or_insert_with(|| {
                builtin_method("shouldComponentUpdate", standard_signature("shouldComponentUpdate"))
            });
    }
    (methods, fields)
}

fn source_of(member: &SurfaceMember, primary: &MemberDefinition) -> MethodSource {
    if member.definitions.iter().all(MemberDefinition::is_abstract) {
        MethodSource::Abstract(primary.origin)
    } else {
        MethodSource::Defined(primary.origin)
    }
}

fn builtin_method(name: &str, signature: Option<&crate::types::Signature>) -> MethodType {
    MethodType {
        name: name.into(),
        signature: signature.cloned(),
        source: MethodSource::Builtin,
        site: None,
        private: false,
    }
}

/// The runtime call order of `hook`. Render runs one definition: the component's own
/// when present, otherwise the single mixin render.
fn hook_links(call: &FactoryCall, surface: &MixinSurface, hook: LifecycleHook) -> Vec<HookLink> {
    let chain = surface.hook_chain(hook);
    let links = chain.iter().map(|d| HookLink {
        def: d.def,
        origin: d.origin,
        site: d.site,
    });
    if hook == LifecycleHook::Render {
        let own = chain.iter().position(|d| d.origin == call.id);
        return match own {
            Some(index) => links.skip(index).take(1).collect(),
            None => links.take(1).collect(),
        };
    }
    links.collect()
}

fn mixin_type(call: &FactoryCall, surface: &MixinSurface) -> MixinType {
    let methods = surface
        .members
        .iter()
        .filter(|(_, m)| !m.is_value())
        .map(|(name, m)| {
            let signature = m
                .declared_signature()
                .or_else(|| standard_signature(name))
                .cloned();
            (name.clone(), signature)
        })
        .collect();
    let statics = surface
        .statics
        .iter()
        .map(|(name, s)| (name.clone(), s.ty.clone()))
        .collect();
    MixinType {
        id: call.id,
        name: call.name.clone(),
        site: call.decl_site,
        methods,
        statics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_program;
    use crate::nominal::NominalRegistry;
    use crate::resolver::MixinResolver;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;
    use tessera_carton::FileId;

    struct Synthesized {
        types: NominalRegistry,
        output: SynthesisOutput,
    }

    fn synthesize_with(source: &str, options: PassOptions) -> Synthesized {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
        assert!(!ret.panicked);
        let mut registry = CallRegistry::new();
        collect_program(&ret.program, source, FileId(0), &options, &mut registry);
        registry.finish();
        let resolved = MixinResolver::new(&registry, &options).resolve();
        assert!(resolved.diagnostics.is_empty(), "{:?}", resolved.diagnostics);
        let mut types = NominalRegistry::new();
        let output =
            ComponentSynthesizer::new(&registry, &resolved.surfaces, &options).run(&mut types);
        Synthesized { types, output }
    }

    fn synthesize(source: &str) -> Synthesized {
        synthesize_with(source, PassOptions::default())
    }

    #[test]
    fn test_props_record() {
        let result = synthesize(
            r#"
var Button = React.createClass({
  propTypes: {
    label: React.PropTypes.string.isRequired,
    size: React.PropTypes.oneOf(['small', 'large']),
    onClick: React.PropTypes.func
  },
  render: function() {}
});
"#,
        );
        let button = result.types.component("Button").unwrap();
        assert!(button.props.declared);
        insta::assert_snapshot!(
            button.props.to_record().to_string(),
            @r#"{label: string, size: ("small"|"large"|undefined), onClick: (!Function|undefined), children: (ReactChild|undefined)}"#
        );
        assert!(button.props.field("label").unwrap().must_be_passed());
    }

    #[test]
    fn test_defaults_type_overrides_and_unknown_validators() {
        let result = synthesize(
            r#"
var Panel = React.createClass({
  propTypes: {
    title: PropTypes.string.isRequired,
    /** @type {?number} */
    width: PropTypes.number.isRequired,
    /** @type {!Array<string>} */
    tags: PropTypes.array,
    custom: checkCustom
  },
  getDefaultProps: function() { return { title: 'Untitled' }; },
  render: function() {}
});
"#,
        );
        let panel = result.types.component("Panel").unwrap();
        let title = panel.props.field("title").unwrap();
        assert!(title.required && title.has_default && !title.must_be_passed());
        assert!(!panel.props.field("width").unwrap().required);
        assert!(panel.props.field("tags").unwrap().required);
        assert!(panel.props.field("custom").unwrap().ty.is_unknown());
        let codes: Vec<_> = result.output.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::UnknownPropType]);
    }

    #[test]
    fn test_undeclared_props_accept_anything() {
        let result = synthesize("var Plain = React.createClass({ render: function() {} });");
        let plain = result.types.component("Plain").unwrap();
        assert!(!plain.props.declared);
        assert!(plain.props.accepts("whatever"));
        assert!(plain.props.children().is_some());
    }

    #[test]
    fn test_methods_hooks_and_instance_api() {
        let result = synthesize(
            r#"
var Logger = React.createMixin({
  componentDidMount: function() {},
  /** @param {string} message */
  log: function(message) {}
});
var Widget = React.createClass({
  mixins: [Logger, React.addons.PureRenderMixin],
  componentDidMount: function() {},
  componentWillReceiveProps: function(next) {},
  count: 0,
  render: function() {}
});
"#,
        );
        let widget = result.types.component("Widget").unwrap();
        let log = widget.method("log").unwrap();
        assert_eq!(log.signature.as_ref().unwrap().to_string(), "function(string): ?");
        assert_eq!(
            widget
                .method("componentWillReceiveProps")
                .and_then(|m| m.signature.as_ref())
                .map(ToString::to_string)
                .as_deref(),
            Some("function(?): undefined")
        );
        assert_eq!(widget.method("setState").unwrap().source, MethodSource::Builtin);
        assert_eq!(
            widget.method("shouldComponentUpdate").unwrap().source,
            MethodSource::Builtin
        );
        assert_eq!(widget.fields.get("count"), Some(&SynthType::number()));
        assert_eq!(widget.hook_chain(LifecycleHook::ComponentDidMount).len(), 2);
        assert_eq!(widget.hook_chain(LifecycleHook::Render).len(), 1);
        assert_eq!(result.output.mixins.len(), 1);
    }

    #[test]
    fn test_render_from_single_mixin() {
        let result = synthesize(
            r#"
var Template = React.createMixin({ render: function() {} });
var Page = React.createClass({ mixins: [Template] });
"#,
        );
        let page = result.types.component("Page").unwrap();
        let render = page.hook_chain(LifecycleHook::Render);
        assert_eq!(render.len(), 1);
        assert_eq!(render[0].origin, FactoryId(0));
        assert!(page.method("render").is_some());
    }

    #[test]
    fn test_state_from_initial_state() {
        let result = synthesize(
            r#"
var Counter = React.createClass({
  getInitialState: function() { return { count: 0, label: 'x' }; },
  render: function() {}
});
var Annotated = React.createClass({
  /** @return {{open: boolean}} */
  getInitialState: function() { return makeState(); },
  render: function() {}
});
var Odd = React.createClass({
  /** @return {number} */
  getInitialState: function() { return 1; },
  render: function() {}
});
var Stateless = React.createClass({ render: function() {} });
"#,
        );
        let counter = result.types.component("Counter").unwrap();
        assert_eq!(
            counter.state.as_ref().unwrap().to_string(),
            "{count: number, label: string}"
        );
        let annotated = result.types.component("Annotated").unwrap();
        assert!(annotated.state.as_ref().unwrap().get("open").is_some());
        assert!(result.types.component("Odd").unwrap().state.is_none());
        assert!(result.types.component("Stateless").unwrap().state.is_none());
        let codes: Vec<_> = result.output.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::UnexpectedStateType]);
    }

    #[test]
    fn test_statics_and_constructor_link() {
        let result = synthesize(
            r#"
var Registry = React.createMixin({ statics: { lookup: function(id) {} } });
var Store = React.createClass({
  mixins: [Registry],
  statics: { version: 2 },
  render: function() {}
});
"#,
        );
        let store = result.types.component("Store").unwrap();
        assert!(store.static_member("lookup").is_some());
        assert_eq!(store.static_member("version").unwrap().ty, SynthType::number());
        assert!(store.static_member("displayName").unwrap().origin.is_none());
        assert_eq!(result.output.components.len(), 1);
    }

    #[test]
    fn test_parallel_synthesis_matches_sequential() {
        let source = r#"
var A = React.createClass({ propTypes: { a: PropTypes.number }, render: function() {} });
var B = React.createClass({ propTypes: { b: PropTypes.string }, render: function() {} });
var C = React.createClass({ render: function() {} });
"#;
        let sequential = synthesize(source);
        let parallel = synthesize_with(
            source,
            PassOptions {
                parallel_synthesis: true,
                ..PassOptions::default()
            },
        );
        assert_eq!(sequential.output.components, parallel.output.components);
        let left: Vec<_> = sequential.types.types().cloned().collect();
        let right: Vec<_> = parallel.types.types().cloned().collect();
        assert_eq!(left, right);
    }
}
