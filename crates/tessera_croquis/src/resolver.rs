//! Mixin resolver.
//!
//! Builds the `mixins` dependency graph, rejects cycles, then flattens every mixin in
//! dependency order and every component after all mixins. Merge policy:
//!
//! - ordinary members: a later source replaces an earlier one, except that two sibling
//!   mixins (neither including the other) defining the same name leave an ambiguity
//!   that only an own definition resolves
//! - lifecycle hooks: chained in merge order, each definition once
//! - abstract declarations never conflict; a concrete definition takes their signature
//!
//! ```text
//!   Focusable ──┐
//!               ├──▶ Field ──▶ TextInput (component)
//!   Validated ──┘                 ▲
//!                  Labelled ──────┘
//! ```

use tessera_carton::{
    closest_match, CompactString, Diagnostic, DiagnosticCode, FxIndexMap, Site,
};

use crate::factory::{FactoryCall, FactoryId, MemberKind};
use crate::lifecycle::LifecycleHook;
use crate::options::PassOptions;
use crate::registry::CallRegistry;
use crate::surface::{Ambiguity, MemberDefinition, MixinSurface, StaticMember, SurfaceMember};

/// Outcome of resolving one factory call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(MixinSurface),
    /// Depends on an opaque mixin; excluded from synthesis without a diagnostic.
    Opaque,
    /// A structural error was reported for this call or a mixin it includes.
    Failed,
}

/// Resolutions of every recorded call, indexed by [`FactoryId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSurfaces {
    entries: Vec<Resolution>,
}

impl ResolvedSurfaces {
    pub fn get(&self, id: FactoryId) -> &Resolution {
        &self.entries[id.index()]
    }

    pub fn surface(&self, id: FactoryId) -> Option<&MixinSurface> {
        match self.entries.get(id.index())? {
            Resolution::Resolved(surface) => Some(surface),
            _ => None,
        }
    }

    pub fn is_failed(&self, id: FactoryId) -> bool {
        matches!(self.entries.get(id.index()), Some(Resolution::Failed))
    }
}

/// Resolver result.
#[derive(Debug, Clone)]
pub struct ResolverOutput {
    pub surfaces: ResolvedSurfaces,
    /// Mixins in the order they were flattened.
    pub mixin_order: Vec<FactoryId>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy)]
enum Dependency {
    Mixin(FactoryId, Site),
    PureRender,
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

pub struct MixinResolver<'r> {
    registry: &'r CallRegistry,
    options: &'r PassOptions,
}

impl<'r> MixinResolver<'r> {
    pub fn new(registry: &'r CallRegistry, options: &'r PassOptions) -> Self {
        Self { registry, options }
    }

    pub fn resolve(&self) -> ResolverOutput {
        let count = self.registry.len();
        let mut diagnostics = Vec::new();

        let (dependencies, invalid) = self.dependencies(&mut diagnostics);

        let mut marks = vec![Mark::Unvisited; count];
        let mut in_cycle = vec![false; count];
        let mut order = Vec::new();
        let mut path = Vec::new();
        for mixin in self.registry.mixins() {
            if marks[mixin.id.index()] == Mark::Unvisited {
                self.visit(
                    mixin.id,
                    &dependencies,
                    &mut marks,
                    &mut path,
                    &mut in_cycle,
                    &mut order,
                    &mut diagnostics,
                );
            }
        }

        let mut entries: Vec<Option<Resolution>> = vec![None; count];
        for &id in &order {
            let resolution = if in_cycle[id.index()] || invalid[id.index()] {
                Resolution::Failed
            } else {
                self.flatten(self.registry.get(id), &dependencies[id.index()], &entries, &mut diagnostics)
            };
            entries[id.index()] = Some(resolution);
        }

        for component in self.registry.components() {
            let resolution = if invalid[component.id.index()] {
                Resolution::Failed
            } else {
                self.flatten(
                    component,
                    &dependencies[component.id.index()],
                    &entries,
                    &mut diagnostics,
                )
            };
            entries[component.id.index()] = Some(resolution);
        }

        tracing::info!(
            mixins = order.len(),
            components = self.registry.components().count(),
            diagnostics = diagnostics.len(),
            "resolved mixin graph"
        );

        ResolverOutput {
            surfaces: ResolvedSurfaces {
                entries: entries
                    .into_iter()
                    .map(|e| e.unwrap_or(Resolution::Failed))
                    .collect(),
            },
            mixin_order: order,
            diagnostics,
        }
    }

    /// Resolve each `mixins` entry; calls with an unusable entry are invalid.
    fn dependencies(&self, diagnostics: &mut Vec<Diagnostic>) -> (Vec<Vec<Dependency>>, Vec<bool>) {
        let mut dependencies = Vec::with_capacity(self.registry.len());
        let mut invalid = vec![false; self.registry.len()];
        let mixin_names: Vec<&str> = self.registry.mixins().map(|m| m.name.as_str()).collect();

        for call in self.registry.calls() {
            let mut deps = Vec::with_capacity(call.spec.mixins.len());
            for entry in &call.spec.mixins {
                if self.options.is_pure_render_mixin(&entry.name) {
                    deps.push(Dependency::PureRender);
                } else if let Some(target) = self.registry.lookup(&entry.name) {
                    if target.is_mixin() {
                        deps.push(Dependency::Mixin(target.id, entry.site));
                    } else {
                        invalid[call.id.index()] = true;
                        diagnostics.push(
                            Diagnostic::error(
                                DiagnosticCode::UnknownMixin,
                                format!("`{}` is a component, not a mixin", entry.name),
                                entry.site,
                            )
                            .with_related("declared here", target.decl_site),
                        );
                    }
                } else if self.registry.is_opaque(&entry.name) {
                    deps.push(Dependency::Opaque);
                } else {
                    invalid[call.id.index()] = true;
                    let mut message = format!("unknown mixin `{}`", entry.name);
                    if let Some(suggestion) =
                        closest_match(&entry.name, mixin_names.iter().copied())
                    {
                        message.push_str(&format!("; did you mean `{suggestion}`?"));
                    }
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCode::UnknownMixin,
                        message,
                        entry.site,
                    ));
                }
            }
            dependencies.push(deps);
        }

        (dependencies, invalid)
    }

    #[allow(clippy::too_many_arguments)]
    fn visit(
        &self,
        id: FactoryId,
        dependencies: &[Vec<Dependency>],
        marks: &mut [Mark],
        path: &mut Vec<(FactoryId, Site)>,
        in_cycle: &mut [bool],
        order: &mut Vec<FactoryId>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        marks[id.index()] = Mark::InProgress;

        for dep in &dependencies[id.index()] {
            let Dependency::Mixin(target, site) = *dep else {
                continue;
            };
            match marks[target.index()] {
                Mark::Unvisited => {
                    path.push((id, site));
                    self.visit(target, dependencies, marks, path, in_cycle, order, diagnostics);
                    path.pop();
                }
                Mark::InProgress => {
                    let start = path
                        .iter()
                        .position(|(node, _)| *node == target)
                        .unwrap_or(path.len());
                    let mut cycle: Vec<(FactoryId, Site)> = path[start..].to_vec();
                    cycle.push((id, site));
                    if cycle.iter().any(|(node, _)| !in_cycle[node.index()]) {
                        diagnostics.push(self.cycle_diagnostic(&cycle));
                    }
                    for (node, _) in &cycle {
                        in_cycle[node.index()] = true;
                    }
                }
                Mark::Done => {}
            }
        }

        marks[id.index()] = Mark::Done;
        order.push(id);
    }

    /// `cycle` lists each node with the `mixins` entry leading to the next node; the
    /// last entry leads back to the first.
    fn cycle_diagnostic(&self, cycle: &[(FactoryId, Site)]) -> Diagnostic {
        let mut names: Vec<&str> = cycle
            .iter()
            .map(|(node, _)| self.registry.get(*node).name.as_str())
            .collect();
        if let Some(first) = names.first().copied() {
            names.push(first);
        }
        let (_, closing) = cycle[cycle.len() - 1];
        let mut diagnostic = Diagnostic::error(
            DiagnosticCode::CyclicMixin,
            format!("cyclic mixin inclusion: {}", names.join(" -> ")),
            closing,
        );
        for (node, site) in &cycle[..cycle.len() - 1] {
            diagnostic = diagnostic.with_related(
                format!("`{}` includes the next mixin here", self.registry.get(*node).name),
                *site,
            );
        }
        diagnostic
    }

    fn flatten(
        &self,
        call: &FactoryCall,
        dependencies: &[Dependency],
        entries: &[Option<Resolution>],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Resolution {
        let mut unavailable = Vec::new();
        let mut opaque = false;
        let mut pure_render = false;
        let mut included = Vec::new();

        for dep in dependencies {
            match *dep {
                Dependency::Mixin(target, site) => match &entries[target.index()] {
                    Some(Resolution::Resolved(surface)) => included.push((target, surface)),
                    Some(Resolution::Opaque) => opaque = true,
                    Some(Resolution::Failed) | None => unavailable.push((target, site)),
                },
                Dependency::PureRender => pure_render = true,
                Dependency::Opaque => opaque = true,
            }
        }

        if !unavailable.is_empty() {
            let names: Vec<String> = unavailable
                .iter()
                .map(|(t, _)| format!("`{}`", self.registry.get(*t).name))
                .collect();
            let mut diagnostic = Diagnostic::error(
                DiagnosticCode::MixinSurfaceUnavailable,
                format!(
                    "{} `{}` cannot be checked because mixin {} failed to resolve",
                    call.kind.label(),
                    call.name,
                    names.join(", ")
                ),
                call.decl_site,
            );
            for (_, site) in &unavailable {
                diagnostic = diagnostic.with_related("included here", *site);
            }
            diagnostics.push(diagnostic);
            return Resolution::Failed;
        }
        if opaque {
            tracing::debug!(name = %call.name, "includes an opaque mixin; excluded from synthesis");
            return Resolution::Opaque;
        }

        let mut builder = SurfaceBuilder::new(entries);
        builder.surface.pure_render = pure_render;
        for (target, surface) in included {
            builder.include(target, surface);
        }
        builder.own(call);
        self.finish(call, builder, diagnostics)
    }

    fn finish(
        &self,
        call: &FactoryCall,
        builder: SurfaceBuilder<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Resolution {
        let SurfaceBuilder {
            mut surface,
            pending,
            hook_conflicts,
            ..
        } = builder;
        let before = diagnostics.len();

        for (name, earlier, later) in hook_conflicts {
            let earlier_sig = earlier.signature().map(ToString::to_string).unwrap_or_default();
            let later_sig = later.signature().map(ToString::to_string).unwrap_or_default();
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::HookSignatureConflict,
                    format!(
                        "`{name}` is declared as {later_sig} here but as {earlier_sig} by `{}`",
                        self.registry.get(earlier.origin).name
                    ),
                    later.site,
                )
                .with_related("conflicting declaration", earlier.site),
            );
        }

        if let Some(render) = call.spec.member("render") {
            if let MemberKind::Method { arity, .. } = render.kind {
                if arity > 0 {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCode::RenderArity,
                        format!("render takes no parameters, but `{}` declares {arity}", call.name),
                        render.site,
                    ));
                }
            }
        }

        if surface.pure_render {
            if let Some(def) = surface
                .member("shouldComponentUpdate")
                .and_then(SurfaceMember::primary)
            {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::PureRenderMixinOverride,
                    "shouldComponentUpdate must not be defined alongside PureRenderMixin",
                    def.site,
                ));
            }
        }

        if call.is_component() {
            for ambiguity in pending.values() {
                diagnostics.push(self.ambiguity_diagnostic(call, ambiguity));
            }

            let own_render = call
                .spec
                .member("render")
                .is_some_and(|m| !m.is_abstract());
            if !own_render {
                let renders = surface.hook_chain(LifecycleHook::Render);
                match renders.len() {
                    1 => {}
                    0 => diagnostics.push(Diagnostic::error(
                        DiagnosticCode::MissingRender,
                        format!(
                            "component `{}` has no render and none of its mixins supplies one",
                            call.name
                        ),
                        call.decl_site,
                    )),
                    _ => {
                        let origins: Vec<String> = renders
                            .iter()
                            .map(|d| format!("`{}`", self.registry.get(d.origin).name))
                            .collect();
                        let mut diagnostic = Diagnostic::error(
                            DiagnosticCode::RenderConflict,
                            format!(
                                "component `{}` receives render from several mixins: {}",
                                call.name,
                                origins.join(", ")
                            ),
                            call.decl_site,
                        );
                        for def in renders {
                            diagnostic = diagnostic.with_related("render defined here", def.site);
                        }
                        diagnostics.push(diagnostic);
                    }
                }
            }
        } else {
            surface.ambiguities = pending.into_values().collect();
        }

        if diagnostics.len() > before {
            Resolution::Failed
        } else {
            Resolution::Resolved(surface)
        }
    }

    fn ambiguity_diagnostic(&self, call: &FactoryCall, ambiguity: &Ambiguity) -> Diagnostic {
        let names: Vec<String> = ambiguity
            .origins
            .iter()
            .map(|(origin, _)| format!("`{}`", self.registry.get(*origin).name))
            .collect();
        let (code, what) = if ambiguity.is_static {
            (DiagnosticCode::AmbiguousMixinStatic, "static")
        } else {
            (DiagnosticCode::AmbiguousMixinMethod, "method")
        };
        let mut diagnostic = Diagnostic::error(
            code,
            format!(
                "{what} `{}` of component `{}` is defined by sibling mixins {}; define it on the component to choose",
                ambiguity.name,
                call.name,
                names.join(" and ")
            ),
            call.decl_site,
        );
        for (origin, site) in &ambiguity.origins {
            diagnostic = diagnostic.with_related(
                format!("defined by `{}`", self.registry.get(*origin).name),
                *site,
            );
        }
        diagnostic
    }
}

/// Key for pending ambiguities: `(is_static, name)`.
type AmbiguityKey = (bool, CompactString);

struct SurfaceBuilder<'e> {
    entries: &'e [Option<Resolution>],
    surface: MixinSurface,
    pending: FxIndexMap<AmbiguityKey, Ambiguity>,
    /// `(hook name, earlier, later)` pairs with differing annotations.
    hook_conflicts: Vec<(CompactString, MemberDefinition, MemberDefinition)>,
}

impl<'e> SurfaceBuilder<'e> {
    fn new(entries: &'e [Option<Resolution>]) -> Self {
        Self {
            entries,
            surface: MixinSurface::default(),
            pending: FxIndexMap::default(),
            hook_conflicts: Vec::new(),
        }
    }

    /// Whether mixin `outer` transitively includes mixin `inner`.
    fn includes(&self, outer: FactoryId, inner: FactoryId) -> bool {
        match self.entries.get(outer.index()) {
            Some(Some(Resolution::Resolved(surface))) => surface.includes.contains(&inner),
            _ => false,
        }
    }

    fn include(&mut self, target: FactoryId, included: &MixinSurface) {
        self.surface.includes.insert(target);
        self.surface.includes.extend(included.includes.iter().copied());
        self.surface.pure_render |= included.pure_render;

        for ambiguity in &included.ambiguities {
            for (origin, site) in &ambiguity.origins {
                self.note_ambiguity(&ambiguity.name, ambiguity.is_static, *origin, *site);
            }
        }
        for (name, member) in &included.members {
            match member.hook {
                Some(hook) => {
                    for def in &member.definitions {
                        self.chain(name, hook, def.clone());
                    }
                }
                None => {
                    if let Some(def) = member.primary() {
                        self.merge(name, def.clone());
                    }
                }
            }
        }
        for static_member in included.statics.values() {
            self.merge_static(static_member.clone());
        }
    }

    fn own(&mut self, call: &FactoryCall) {
        for member in call.spec.members.values() {
            let def = MemberDefinition::from_spec(member);
            match member.hook() {
                Some(_) if def.is_abstract() => {}
                Some(hook) => self.chain(&member.name, hook, def),
                None => self.override_with(&member.name, def),
            }
        }
        for static_def in call.spec.statics.values() {
            let key = (true, static_def.name.clone());
            self.pending.shift_remove(&key);
            self.surface
                .statics
                .insert(static_def.name.clone(), StaticMember::from_spec(static_def));
        }
    }

    fn chain(&mut self, name: &CompactString, hook: LifecycleHook, def: MemberDefinition) {
        let member = self
            .surface
            .members
            .entry(name.clone())
            .or_insert_with(|| SurfaceMember {
                name: name.clone(),
                hook: Some(hook),
                definitions: Default::default(),
            });
        if member.definitions.iter().any(|d| d.def == def.def) {
            return;
        }
        if let Some(sig) = def.signature() {
            let conflict = member
                .definitions
                .iter()
                .find(|d| d.signature().is_some_and(|other| other != sig));
            if let Some(earlier) = conflict {
                if !self.hook_conflicts.iter().any(|(n, _, _)| n == name) {
                    self.hook_conflicts
                        .push((name.clone(), earlier.clone(), def.clone()));
                }
            }
        }
        tracing::trace!(hook = hook.name(), origin = def.origin.0, "chained lifecycle hook");
        member.definitions.push(def);
    }

    fn merge(&mut self, name: &CompactString, incoming: MemberDefinition) {
        let Some(existing) = self
            .surface
            .members
            .get(name)
            .and_then(SurfaceMember::primary)
            .cloned()
        else {
            self.set(name, incoming);
            return;
        };

        if existing.def == incoming.def {
            return;
        }
        if incoming.is_abstract() {
            if !existing.is_abstract() {
                let mut kept = existing;
                kept.inherit_signature(&incoming);
                self.set(name, kept);
            }
            return;
        }
        if existing.is_abstract() {
            let mut replacement = incoming;
            replacement.inherit_signature(&existing);
            self.set(name, replacement);
            return;
        }

        if self.includes(incoming.origin, existing.origin) {
            let key = (false, name.clone());
            let resolves = self.pending.get(&key).is_some_and(|a| {
                a.origins
                    .iter()
                    .all(|(o, _)| *o == incoming.origin || self.includes(incoming.origin, *o))
            });
            if resolves {
                self.pending.shift_remove(&key);
            }
            self.set(name, incoming);
        } else if self.includes(existing.origin, incoming.origin) {
            tracing::trace!(member = %name, "kept definition of including mixin");
        } else {
            self.note_ambiguity(name, false, existing.origin, existing.site);
            self.note_ambiguity(name, false, incoming.origin, incoming.site);
            self.set(name, incoming);
        }
    }

    fn override_with(&mut self, name: &CompactString, own: MemberDefinition) {
        let existing = self
            .surface
            .members
            .get(name)
            .and_then(SurfaceMember::primary)
            .cloned();
        match existing {
            Some(mut existing) if own.is_abstract() => {
                if !existing.is_abstract() {
                    existing.inherit_signature(&own);
                    self.set(name, existing);
                } else {
                    self.set(name, own);
                }
            }
            Some(existing) => {
                let mut own = own;
                if existing.is_abstract() {
                    own.inherit_signature(&existing);
                }
                self.pending.shift_remove(&(false, name.clone()));
                self.set(name, own);
            }
            None => self.set(name, own),
        }
    }

    fn merge_static(&mut self, incoming: StaticMember) {
        let Some(existing) = self.surface.statics.get(&incoming.name).cloned() else {
            self.surface.statics.insert(incoming.name.clone(), incoming);
            return;
        };
        if existing.def == incoming.def || self.includes(existing.origin, incoming.origin) {
            return;
        }
        if !self.includes(incoming.origin, existing.origin) {
            self.note_ambiguity(&incoming.name, true, existing.origin, existing.site);
            self.note_ambiguity(&incoming.name, true, incoming.origin, incoming.site);
        }
        self.surface.statics.insert(incoming.name.clone(), incoming);
    }

    fn set(&mut self, name: &CompactString, def: MemberDefinition) {
        let member = SurfaceMember {
            name: name.clone(),
            hook: None,
            definitions: std::iter::once(def).collect(),
        };
        self.surface.members.insert(name.clone(), member);
    }

    fn note_ambiguity(&mut self, name: &CompactString, is_static: bool, origin: FactoryId, site: Site) {
        let ambiguity = self
            .pending
            .entry((is_static, name.clone()))
            .or_insert_with(|| Ambiguity {
                name: name.clone(),
                is_static,
                origins: Vec::new(),
            });
        if !ambiguity.origins.iter().any(|(o, _)| *o == origin) {
            ambiguity.origins.push((origin, site));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_program;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;
    use tessera_carton::FileId;

    fn registry(source: &str) -> CallRegistry {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
        assert!(!ret.panicked);
        let mut registry = CallRegistry::new();
        collect_program(
            &ret.program,
            source,
            FileId(0),
            &PassOptions::default(),
            &mut registry,
        );
        registry.finish();
        registry
    }

    fn resolve(registry: &CallRegistry) -> ResolverOutput {
        MixinResolver::new(registry, &PassOptions::default()).resolve()
    }

    fn codes(output: &ResolverOutput) -> Vec<DiagnosticCode> {
        output.diagnostics.iter().map(|d| d.code).collect()
    }

    fn origin_names(registry: &CallRegistry, defs: &[MemberDefinition]) -> Vec<String> {
        defs.iter()
            .map(|d| registry.get(d.origin).name.to_string())
            .collect()
    }

    #[test]
    fn test_hook_chain_order() {
        let registry = registry(
            r#"
var A = React.createMixin({ componentDidMount: function() {} });
var B = React.createMixin({ mixins: [A], componentDidMount: function() {} });
var C = React.createMixin({ componentDidMount: function() {} });
var Comp = React.createClass({
  mixins: [B, C, A],
  componentDidMount: function() {},
  render: function() {}
});
"#,
        );
        let output = resolve(&registry);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let comp = registry.id_of("Comp").unwrap();
        let surface = output.surfaces.surface(comp).unwrap();
        let chain = surface.hook_chain(LifecycleHook::ComponentDidMount);
        assert_eq!(origin_names(&registry, chain), vec!["A", "B", "C", "Comp"]);
    }

    #[test]
    fn test_sibling_collision_is_one_error_naming_both() {
        let registry = registry(
            r#"
var Left = React.createMixin({ toggle: function() {} });
var Right = React.createMixin({ toggle: function() {} });
var Comp = React.createClass({ mixins: [Left, Right], render: function() {} });
"#,
        );
        let output = resolve(&registry);
        assert_eq!(codes(&output), vec![DiagnosticCode::AmbiguousMixinMethod]);
        let message = &output.diagnostics[0].message;
        assert!(message.contains("`Left`") && message.contains("`Right`"), "{message}");
        assert_eq!(output.diagnostics[0].related.len(), 2);
        let comp = registry.id_of("Comp").unwrap();
        assert!(output.surfaces.is_failed(comp));
    }

    #[test]
    fn test_own_definition_resolves_collision() {
        let registry = registry(
            r#"
var Left = React.createMixin({ toggle: function() {} });
var Right = React.createMixin({ toggle: function() {} });
var Comp = React.createClass({
  mixins: [Left, Right],
  toggle: function() {},
  render: function() {}
});
"#,
        );
        let output = resolve(&registry);
        assert!(output.diagnostics.is_empty());
        let comp = registry.id_of("Comp").unwrap();
        let toggle = output.surfaces.surface(comp).unwrap().member("toggle").unwrap();
        assert_eq!(toggle.primary().unwrap().origin, comp);
    }

    #[test]
    fn test_including_mixin_wins_over_included() {
        let registry = registry(
            r#"
var Base = React.createMixin({ describe: function() {} });
var Derived = React.createMixin({ mixins: [Base], describe: function() {} });
var Comp = React.createClass({ mixins: [Derived, Base], render: function() {} });
var Diamond = React.createClass({ mixins: [Base, Derived], render: function() {} });
"#,
        );
        let output = resolve(&registry);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let derived = registry.id_of("Derived").unwrap();
        for name in ["Comp", "Diamond"] {
            let id = registry.id_of(name).unwrap();
            let member = output.surfaces.surface(id).unwrap().member("describe").unwrap();
            assert_eq!(member.primary().unwrap().origin, derived, "{name}");
        }
    }

    #[test]
    fn test_render_rules() {
        let registry = registry(
            r#"
var Renders = React.createMixin({ render: function() {} });
var AlsoRenders = React.createMixin({ render: function() {} });
var One = React.createClass({ mixins: [Renders] });
var Two = React.createClass({ mixins: [Renders, AlsoRenders] });
var None = React.createClass({ displayName: 'None' });
var Own = React.createClass({ mixins: [Renders, AlsoRenders], render: function() {} });
var Arity = React.createClass({ render: function(props) {} });
"#,
        );
        let output = resolve(&registry);
        assert_eq!(
            codes(&output),
            vec![
                DiagnosticCode::RenderConflict,
                DiagnosticCode::MissingRender,
                DiagnosticCode::RenderArity,
            ]
        );
        assert!(output.surfaces.surface(registry.id_of("One").unwrap()).is_some());
        assert!(output.surfaces.surface(registry.id_of("Own").unwrap()).is_some());
        assert!(output.surfaces.is_failed(registry.id_of("Two").unwrap()));
    }

    #[test]
    fn test_cycle_names_path_and_fails_dependents() {
        let registry = registry(
            r#"
var A = React.createMixin({ mixins: [B] });
var B = React.createMixin({ mixins: [A] });
var User = React.createClass({ mixins: [A], render: function() {} });
var Fine = React.createClass({ render: function() {} });
"#,
        );
        let output = resolve(&registry);
        assert_eq!(
            codes(&output),
            vec![DiagnosticCode::CyclicMixin, DiagnosticCode::MixinSurfaceUnavailable]
        );
        assert!(output.diagnostics[0].message.contains("A -> B -> A"));
        assert!(output.surfaces.is_failed(registry.id_of("User").unwrap()));
        assert!(output.surfaces.surface(registry.id_of("Fine").unwrap()).is_some());
    }

    #[test]
    fn test_self_inclusion_is_a_cycle() {
        let registry = registry("var Loop = React.createMixin({ mixins: [Loop] });");
        let output = resolve(&registry);
        assert_eq!(codes(&output), vec![DiagnosticCode::CyclicMixin]);
        assert!(output.diagnostics[0].message.contains("Loop -> Loop"));
    }

    #[test]
    fn test_unknown_and_opaque_mixins() {
        let registry = registry(
            r#"
var Dynamic = React.createMixin(makeSpec());
var Known = React.createMixin({ helper: function() {} });
var UsesDynamic = React.createClass({ mixins: [Dynamic], render: function() {} });
var Typo = React.createClass({ mixins: [Knwn], render: function() {} });
var NotMixin = React.createClass({ mixins: [UsesDynamic], render: function() {} });
"#,
        );
        let output = resolve(&registry);
        assert_eq!(
            codes(&output),
            vec![DiagnosticCode::UnknownMixin, DiagnosticCode::UnknownMixin]
        );
        assert!(output.diagnostics[0].message.contains("did you mean `Known`"));
        assert_eq!(
            output.surfaces.get(registry.id_of("UsesDynamic").unwrap()),
            &Resolution::Opaque
        );
    }

    #[test]
    fn test_hook_signature_conflict() {
        let registry = registry(
            r#"
var Typed = React.createMixin({
  /** @param {number} next */
  componentWillReceiveProps: function(next) {}
});
var Comp = React.createClass({
  mixins: [Typed],
  /** @param {string} next */
  componentWillReceiveProps: function(next) {},
  render: function() {}
});
"#,
        );
        let output = resolve(&registry);
        assert_eq!(codes(&output), vec![DiagnosticCode::HookSignatureConflict]);
        assert_eq!(output.diagnostics[0].related.len(), 1);
    }

    #[test]
    fn test_abstract_methods_take_concrete_definitions() {
        let registry = registry(
            r#"
var Sortable = React.createMixin({ sort: function() {} });
/** @param {number} a @return {number} */
Sortable.weight;
var List = React.createClass({
  mixins: [Sortable],
  weight: function(a) { return a; },
  render: function() {}
});
"#,
        );
        let output = resolve(&registry);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let list = registry.id_of("List").unwrap();
        let weight = output.surfaces.surface(list).unwrap().member("weight").unwrap();
        let def = weight.primary().unwrap();
        assert_eq!(def.origin, list);
        assert_eq!(def.signature().unwrap().to_string(), "function(number): number");
    }

    #[test]
    fn test_static_collisions() {
        let registry = registry(
            r#"
var Left = React.createMixin({ statics: { create: function() {} } });
var Right = React.createMixin({ statics: { create: function() {} } });
var Ambiguous = React.createClass({ mixins: [Left, Right], render: function() {} });
var Overrides = React.createClass({
  mixins: [Left, Right],
  statics: { create: function() {} },
  render: function() {}
});
"#,
        );
        let output = resolve(&registry);
        assert_eq!(codes(&output), vec![DiagnosticCode::AmbiguousMixinStatic]);
        assert!(output.surfaces.surface(registry.id_of("Overrides").unwrap()).is_some());
    }

    #[test]
    fn test_pure_render_override() {
        let registry = registry(
            r#"
var Pure = React.createClass({
  mixins: [React.addons.PureRenderMixin],
  shouldComponentUpdate: function() { return true; },
  render: function() {}
});
var Fine = React.createClass({ mixins: [React.addons.PureRenderMixin], render: function() {} });
"#,
        );
        let output = resolve(&registry);
        assert_eq!(codes(&output), vec![DiagnosticCode::PureRenderMixinOverride]);
        let fine = output.surfaces.surface(registry.id_of("Fine").unwrap()).unwrap();
        assert!(fine.pure_render);
    }

    #[test]
    fn test_flattening_is_deterministic() {
        let source = r#"
var A = React.createMixin({ a: function() {}, componentWillMount: function() {} });
var B = React.createMixin({ mixins: [A], b: function() {} });
var C = React.createMixin({ mixins: [A], c: function() {}, componentWillMount: function() {} });
var Comp = React.createClass({ mixins: [B, C], render: function() {} });
"#;
        let registry = registry(source);
        let first = resolve(&registry);
        let second = resolve(&registry);
        assert_eq!(first.surfaces, second.surfaces);
        assert_eq!(first.mixin_order, second.mixin_order);
        assert!(first.diagnostics.is_empty());
    }
}
