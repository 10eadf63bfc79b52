//! Collection sweep.
//!
//! One walk over a parsed program records every class-factory and mixin-factory call
//! bound to a name. Calls that cannot be described statically are recorded as opaque
//! and excluded from synthesis without a diagnostic.

use oxc_ast::ast::{
    ArrowFunctionExpression, AssignmentExpression, AssignmentTarget, BindingPattern,
    CallExpression, Declaration, Expression, ExportNamedDeclaration, ExpressionStatement,
    FormalParameters, FunctionBody, ObjectExpression, ObjectPropertyKind, Program, Statement,
    VariableDeclarator,
};
use oxc_ast_visit::{walk, Visit};
use oxc_span::{GetSpan, Span};
use tessera_carton::{
    CompactString, Diagnostic, DiagnosticCode, FileId, FxHashSet, FxIndexMap,
};

use crate::factory::{
    FactoryCall, FactoryId, FactoryKind, FactorySpec, MemberKind, MixinRef, OpaqueCall,
    OpaqueReason, PropTypeDef, SpecMember, StateHint, StaticDef,
};
use crate::jsdoc::{comment_content, JsDoc};
use crate::options::PassOptions;
use crate::registry::{AbstractDecl, CallRegistry};
use crate::syntax::{leading_jsdoc, property_key_name, qualified_name, site, unparenthesize};
use crate::types::{Record, SynthType};
use crate::validator::ValidatorDescriptor;

/// Record the factory calls of one program into the registry.
pub fn collect_program(
    program: &Program<'_>,
    source: &str,
    file: FileId,
    options: &PassOptions,
    registry: &mut CallRegistry,
) {
    let comments = program
        .comments
        .iter()
        .map(|c| (c.span.start, c.span.end))
        .collect();
    let mut collector = Collector {
        source,
        file,
        options,
        registry,
        comments,
        bound_calls: FxHashSet::default(),
        exported: FxHashSet::default(),
    };
    collector.visit_program(program);
}

struct Collector<'s, 'o, 'r> {
    source: &'s str,
    file: FileId,
    options: &'o PassOptions,
    registry: &'r mut CallRegistry,
    comments: Vec<(u32, u32)>,
    /// Start offsets of factory calls claimed by a binding.
    bound_calls: FxHashSet<u32>,
    /// Names declared by `export var ...`.
    exported: FxHashSet<CompactString>,
}

impl<'s, 'o, 'r> Collector<'s, 'o, 'r> {
    fn factory_kind(&self, call: &CallExpression<'_>) -> Option<FactoryKind> {
        let callee = qualified_name(&call.callee)?;
        if self.options.is_class_factory(&callee) {
            Some(FactoryKind::Component)
        } else if self.options.is_mixin_factory(&callee) {
            Some(FactoryKind::Mixin)
        } else {
            None
        }
    }

    fn jsdoc_at(&self, offset: u32) -> JsDoc {
        leading_jsdoc(self.source, &self.comments, offset)
            .map(|text| JsDoc::parse(comment_content(text)))
            .unwrap_or_default()
    }

    /// Record a factory call bound to `name`, if `init` is one.
    fn bind(&mut self, name: CompactString, decl_span: Span, init: &Expression<'_>) {
        let Expression::CallExpression(call) = unparenthesize(init) else {
            return;
        };
        let Some(kind) = self.factory_kind(call) else {
            return;
        };
        self.bound_calls.insert(call.span.start);

        let call_site = site(self.file, call.span);
        if call.arguments.len() != 1 {
            self.registry.report(Diagnostic::error(
                DiagnosticCode::FactoryArity,
                format!(
                    "{} factory expects exactly one specification argument, found {}",
                    kind.label(),
                    call.arguments.len()
                ),
                call_site,
            ));
        }

        let spec_obj = match call.arguments.first().and_then(|a| a.as_expression()) {
            Some(expr) => match unparenthesize(expr) {
                Expression::ObjectExpression(obj) => Some(obj),
                _ => None,
            },
            None => None,
        };
        let Some(obj) = spec_obj else {
            self.registry.record_opaque(OpaqueCall {
                name: Some(name),
                kind,
                site: call_site,
                reason: OpaqueReason::NonLiteralSpec,
            });
            return;
        };

        let id = self.registry.next_id();
        match self.build_spec(id, kind, obj) {
            Ok(spec) => {
                let exported = self.exported.contains(&name);
                self.registry.insert(FactoryCall {
                    id,
                    kind,
                    name,
                    site: call_site,
                    decl_site: site(self.file, decl_span),
                    spec_site: site(self.file, obj.span),
                    exported,
                    spec,
                });
            }
            Err(reason) => self.registry.record_opaque(OpaqueCall {
                name: Some(name),
                kind,
                site: call_site,
                reason,
            }),
        }
    }

    fn build_spec(
        &self,
        owner: FactoryId,
        kind: FactoryKind,
        obj: &ObjectExpression<'_>,
    ) -> Result<FactorySpec, OpaqueReason> {
        let mut spec = FactorySpec::default();

        for property in &obj.properties {
            let ObjectPropertyKind::ObjectProperty(p) = property else {
                return Err(OpaqueReason::NonLiteralSpec);
            };
            let Some(key) = property_key_name(&p.key) else {
                return Err(OpaqueReason::NonLiteralSpec);
            };
            let value = unparenthesize(&p.value);

            match key.as_str() {
                "mixins" => {
                    let Expression::ArrayExpression(arr) = value else {
                        return Err(OpaqueReason::ComputedMixins);
                    };
                    for element in &arr.elements {
                        let entry = element.as_expression().and_then(|e| {
                            qualified_name(e).map(|name| MixinRef {
                                name,
                                site: site(self.file, e.span()),
                            })
                        });
                        spec.mixins
                            .push(entry.ok_or(OpaqueReason::ComputedMixinEntry)?);
                    }
                }
                "statics" => {
                    let Expression::ObjectExpression(statics) = value else {
                        return Err(OpaqueReason::ComputedStatics);
                    };
                    for entry in &statics.properties {
                        let ObjectPropertyKind::ObjectProperty(s) = entry else {
                            return Err(OpaqueReason::ComputedStatics);
                        };
                        let Some(name) = property_key_name(&s.key) else {
                            return Err(OpaqueReason::ComputedStatics);
                        };
                        let doc = self.jsdoc_at(s.span.start);
                        let ty = match doc.type_tag {
                            Some(tag) => tag.ty,
                            None => self.member_type(&s.value, &doc),
                        };
                        let def = spec.allocate_def(owner);
                        spec.statics.insert(
                            name.clone(),
                            StaticDef {
                                def,
                                name,
                                site: site(self.file, s.span),
                                ty,
                            },
                        );
                    }
                }
                "propTypes" if kind == FactoryKind::Component => {
                    spec.prop_types = self.prop_types(value);
                }
                "propTypes" => {
                    tracing::debug!("propTypes on a mixin are ignored");
                }
                "displayName" => {
                    if let Expression::StringLiteral(s) = value {
                        spec.display_name = Some(s.value.as_str().into());
                    }
                }
                _ => {
                    let doc = self.jsdoc_at(p.span.start);
                    let member_kind = match value {
                        Expression::FunctionExpression(f) => MemberKind::Method {
                            signature: signature_of(&doc, &f.params),
                            arity: arity_of(&f.params),
                            function_site: site(self.file, f.span),
                        },
                        Expression::ArrowFunctionExpression(f) => MemberKind::Method {
                            signature: signature_of(&doc, &f.params),
                            arity: arity_of(&f.params),
                            function_site: site(self.file, f.span),
                        },
                        other => MemberKind::Value(match &doc.type_tag {
                            Some(tag) => tag.ty.clone(),
                            None => value_type(other),
                        }),
                    };

                    match key.as_str() {
                        "getDefaultProps" => {
                            if let Some(returned) = returned_object(value) {
                                spec.default_props = returned
                                    .properties
                                    .iter()
                                    .filter_map(|p| match p {
                                        ObjectPropertyKind::ObjectProperty(p) => {
                                            property_key_name(&p.key)
                                        }
                                        ObjectPropertyKind::SpreadProperty(_) => None,
                                    })
                                    .collect();
                            }
                        }
                        "getInitialState" => {
                            spec.state_hint = self.state_hint(value, &doc, p.span);
                        }
                        _ => {}
                    }

                    let def = spec.allocate_def(owner);
                    spec.members.insert(
                        key.clone(),
                        SpecMember {
                            def,
                            name: key,
                            site: site(self.file, p.span),
                            kind: member_kind,
                            private: doc.private,
                        },
                    );
                }
            }
        }

        Ok(spec)
    }

    fn member_type(&self, value: &Expression<'_>, doc: &JsDoc) -> SynthType {
        match unparenthesize(value) {
            Expression::FunctionExpression(f) => signature_of(doc, &f.params)
                .map(|sig| SynthType::Function(Box::new(sig)))
                .unwrap_or(SynthType::AnyFunction),
            Expression::ArrowFunctionExpression(f) => signature_of(doc, &f.params)
                .map(|sig| SynthType::Function(Box::new(sig)))
                .unwrap_or(SynthType::AnyFunction),
            other => value_type(other),
        }
    }

    fn prop_types(&self, value: &Expression<'_>) -> Option<FxIndexMap<CompactString, PropTypeDef>> {
        let Expression::ObjectExpression(obj) = value else {
            tracing::debug!("propTypes is not an object literal; props are unchecked");
            return None;
        };
        let mut props = FxIndexMap::default();
        for property in &obj.properties {
            let ObjectPropertyKind::ObjectProperty(p) = property else {
                tracing::debug!("spread in propTypes; props are unchecked");
                return None;
            };
            let name = property_key_name(&p.key)?;
            let doc = self.jsdoc_at(p.span.start);
            props.insert(
                name.clone(),
                PropTypeDef {
                    name,
                    site: site(self.file, p.span),
                    validator: ValidatorDescriptor::from_expression(&p.value, self.options),
                    type_override: doc.type_tag.map(|tag| tag.ty),
                },
            );
        }
        Some(props)
    }

    fn state_hint(&self, value: &Expression<'_>, doc: &JsDoc, span: Span) -> Option<StateHint> {
        if let Some(returns) = &doc.returns {
            return Some(StateHint {
                ty: returns.clone(),
                annotated: true,
                site: site(self.file, span),
            });
        }
        let returned = returned_object(value)?;
        let mut record = Record::new();
        for property in &returned.properties {
            let ObjectPropertyKind::ObjectProperty(p) = property else {
                return None;
            };
            let name = property_key_name(&p.key)?;
            record = record.with_field(name, value_type(&p.value), false);
        }
        Some(StateHint {
            ty: SynthType::Record(record),
            annotated: false,
            site: site(self.file, span),
        })
    }
}

impl<'a> Visit<'a> for Collector<'_, '_, '_> {
    fn visit_export_named_declaration(&mut self, export: &ExportNamedDeclaration<'a>) {
        if let Some(Declaration::VariableDeclaration(decl)) = &export.declaration {
            for declarator in &decl.declarations {
                if let BindingPattern::BindingIdentifier(id) = &declarator.id {
                    self.exported.insert(id.name.as_str().into());
                }
            }
        }
        walk::walk_export_named_declaration(self, export);
    }

    fn visit_variable_declarator(&mut self, declarator: &VariableDeclarator<'a>) {
        if let (BindingPattern::BindingIdentifier(id), Some(init)) =
            (&declarator.id, &declarator.init)
        {
            self.bind(id.name.as_str().into(), id.span, init);
        }
        walk::walk_variable_declarator(self, declarator);
    }

    fn visit_assignment_expression(&mut self, assign: &AssignmentExpression<'a>) {
        let target = match &assign.left {
            AssignmentTarget::AssignmentTargetIdentifier(id) => {
                Some((CompactString::new(id.name.as_str()), id.span))
            }
            AssignmentTarget::StaticMemberExpression(member) => {
                qualified_name(&member.object).map(|mut name| {
                    name.push('.');
                    name.push_str(member.property.name.as_str());
                    (name, member.span)
                })
            }
            _ => None,
        };
        if let Some((name, span)) = target {
            self.bind(name, span, &assign.right);
        }
        walk::walk_assignment_expression(self, assign);
    }

    fn visit_expression_statement(&mut self, stmt: &ExpressionStatement<'a>) {
        if let Expression::StaticMemberExpression(member) = &stmt.expression {
            if let Some(owner) = qualified_name(&member.object) {
                let doc = leading_jsdoc(self.source, &self.comments, stmt.span.start);
                if let Some(text) = doc {
                    self.registry.add_abstract(AbstractDecl {
                        owner,
                        name: member.property.name.as_str().into(),
                        site: site(self.file, stmt.span),
                        doc: JsDoc::parse(comment_content(text)),
                    });
                }
            }
        }
        walk::walk_expression_statement(self, stmt);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if !self.bound_calls.contains(&call.span.start) {
            if let Some(kind) = self.factory_kind(call) {
                self.registry.record_opaque(OpaqueCall {
                    name: None,
                    kind,
                    site: site(self.file, call.span),
                    reason: OpaqueReason::Unbound,
                });
            }
        }
        walk::walk_call_expression(self, call);
    }
}

fn param_names(params: &FormalParameters<'_>) -> Vec<CompactString> {
    let mut names: Vec<CompactString> = params
        .items
        .iter()
        .map(|p| match &p.pattern {
            BindingPattern::BindingIdentifier(id) => id.name.as_str().into(),
            _ => CompactString::new("_"),
        })
        .collect();
    if let Some(rest) = &params.rest {
        names.push(match &rest.rest.argument {
            BindingPattern::BindingIdentifier(id) => id.name.as_str().into(),
            _ => CompactString::new("_"),
        });
    }
    names
}

fn arity_of(params: &FormalParameters<'_>) -> usize {
    params.items.len() + usize::from(params.rest.is_some())
}

fn signature_of(doc: &JsDoc, params: &FormalParameters<'_>) -> Option<crate::types::Signature> {
    doc.signature_for(&param_names(params), params.rest.is_some())
}

/// Type of a plain value as far as its syntax shows.
pub fn value_type(expr: &Expression<'_>) -> SynthType {
    match unparenthesize(expr) {
        Expression::StringLiteral(_) | Expression::TemplateLiteral(_) => SynthType::string(),
        Expression::NumericLiteral(_) => SynthType::number(),
        Expression::BooleanLiteral(_) => SynthType::boolean(),
        Expression::ArrayExpression(_) => SynthType::Array(Box::new(SynthType::Unknown)),
        Expression::ObjectExpression(_) => SynthType::AnyObject,
        Expression::FunctionExpression(_) | Expression::ArrowFunctionExpression(_) => {
            SynthType::AnyFunction
        }
        Expression::UnaryExpression(u) if matches!(u.argument, Expression::NumericLiteral(_)) => {
            SynthType::number()
        }
        _ => SynthType::Unknown,
    }
}

/// The object literal a function returns from its top level, if any.
fn returned_object<'e, 'a>(function: &'e Expression<'a>) -> Option<&'e ObjectExpression<'a>> {
    fn from_body<'e, 'a>(body: &'e FunctionBody<'a>) -> Option<&'e ObjectExpression<'a>> {
        body.statements.iter().rev().find_map(|stmt| match stmt {
            Statement::ReturnStatement(ret) => match ret.argument.as_ref().map(unparenthesize) {
                Some(Expression::ObjectExpression(obj)) => Some(&**obj),
                _ => None,
            },
            _ => None,
        })
    }

    match function {
        Expression::FunctionExpression(f) => from_body(f.body.as_ref()?),
        Expression::ArrowFunctionExpression(arrow) => arrow_returned_object(arrow),
        _ => None,
    }
}

fn arrow_returned_object<'e, 'a>(
    arrow: &'e ArrowFunctionExpression<'a>,
) -> Option<&'e ObjectExpression<'a>> {
    if arrow.expression {
        if let Some(Statement::ExpressionStatement(stmt)) = arrow.body.statements.first() {
            if let Expression::ObjectExpression(obj) = unparenthesize(&stmt.expression) {
                return Some(&**obj);
            }
        }
        return None;
    }
    arrow.body.statements.iter().rev().find_map(|stmt| match stmt {
        Statement::ReturnStatement(ret) => match ret.argument.as_ref().map(unparenthesize) {
            Some(Expression::ObjectExpression(obj)) => Some(&**obj),
            _ => None,
        },
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn collect(source: &str) -> CallRegistry {
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

    #[test]
    fn test_collects_component_members() {
        let registry = collect(
            r#"
var Widget = React.createClass({
  displayName: 'Widget',
  mixins: [Focusable],
  statics: { VERSION: 2 },
  propTypes: { label: React.PropTypes.string.isRequired },
  /** @param {number} n @return {string} */
  format: function(n) { return String(n); },
  count: 0,
  render() { return null; }
});
"#,
        );
        let widget = registry.lookup("Widget").unwrap();
        assert!(widget.is_component());
        assert_eq!(widget.spec.display_name.as_deref(), Some("Widget"));
        assert_eq!(widget.spec.mixins[0].name, "Focusable");
        assert_eq!(widget.spec.statics["VERSION"].ty, SynthType::number());
        assert!(widget.spec.prop_types.as_ref().unwrap()["label"].validator.is_required());

        let format = widget.spec.member("format").unwrap();
        assert_eq!(format.signature().unwrap().to_string(), "function(number): string");
        assert!(matches!(
            widget.spec.member("count").unwrap().kind,
            MemberKind::Value(SynthType::Primitive(_))
        ));
        let render = widget.spec.member("render").unwrap();
        assert!(matches!(render.kind, MemberKind::Method { arity: 0, .. }));
    }

    #[test]
    fn test_bindings() {
        let registry = collect(
            r#"
export const Exported = React.createClass({ render: function() {} });
ns.Nested = React.createMixin({ helper: function() {} });
let Later;
Later = React.createClass({ render: function() {} });
"#,
        );
        assert!(registry.lookup("Exported").unwrap().exported);
        assert!(registry.lookup("ns.Nested").unwrap().is_mixin());
        assert!(registry.lookup("Later").is_some());
        assert!(registry.opaque().is_empty());
    }

    #[test]
    fn test_opaque_calls() {
        let registry = collect(
            r#"
var FromVar = React.createClass(spec);
var Computed = React.createMixin({ mixins: getMixins() });
var BadEntry = React.createClass({ mixins: [mixins[0]] });
var BadStatics = React.createClass({ statics: makeStatics() });
React.createClass({ render: function() {} });
"#,
        );
        assert!(registry.is_empty());
        let reasons: Vec<_> = registry.opaque().iter().map(|o| o.reason).collect();
        assert_eq!(
            reasons,
            vec![
                OpaqueReason::NonLiteralSpec,
                OpaqueReason::ComputedMixins,
                OpaqueReason::ComputedMixinEntry,
                OpaqueReason::ComputedStatics,
                OpaqueReason::Unbound,
            ]
        );
        assert!(registry.is_opaque("FromVar"));
        assert!(registry.diagnostics().is_empty());
    }

    #[test]
    fn test_factory_arity() {
        let registry = collect("var Two = React.createClass({ render: function() {} }, extra);");
        assert!(registry.lookup("Two").is_some());
        assert_eq!(registry.diagnostics()[0].code, DiagnosticCode::FactoryArity);
    }

    #[test]
    fn test_default_props_and_state() {
        let registry = collect(
            r#"
var Counter = React.createClass({
  getDefaultProps: function() { return { step: 1 }; },
  getInitialState: function() { return { count: 0, label: 'x' }; },
  render: function() {}
});
var Typed = React.createClass({
  /** @return {{open: boolean}} */
  getInitialState: function() { return { open: false }; },
  render: function() {}
});
"#,
        );
        let counter = registry.lookup("Counter").unwrap();
        assert!(counter.spec.default_props.contains("step"));
        let hint = counter.spec.state_hint.as_ref().unwrap();
        assert!(!hint.annotated);
        assert_eq!(hint.ty.to_string(), "{count: number, label: string}");

        let typed = registry.lookup("Typed").unwrap();
        let hint = typed.spec.state_hint.as_ref().unwrap();
        assert!(hint.annotated);
        assert_eq!(hint.ty.to_string(), "{open: boolean}");
    }

    #[test]
    fn test_abstract_methods() {
        let registry = collect(
            r#"
var Sortable = React.createMixin({ sort: function() { return this.compare(1, 2); } });
/**
 * @param {number} a
 * @param {number} b
 * @return {number}
 */
Sortable.compare;
"#,
        );
        let compare = registry.lookup("Sortable").unwrap().spec.member("compare").unwrap();
        assert!(compare.is_abstract());
        assert_eq!(registry.abstract_sites().len(), 1);
    }

    #[test]
    fn test_definitions_stay_distinct_with_repeated_keys() {
        let registry = collect(
            r#"
var Sortable = React.createMixin({
  sort: function() {},
  sort: function() {},
  statics: { by: 1 },
  reverse: function() {}
});
/** @param {number} a */
Sortable.compare;
"#,
        );
        let spec = &registry.lookup("Sortable").unwrap().spec;
        let defs: Vec<_> = spec
            .members
            .values()
            .map(|m| m.def)
            .chain(spec.statics.values().map(|s| s.def))
            .collect();
        assert_eq!(defs.len(), 4);
        let unique: FxHashSet<_> = defs.iter().copied().collect();
        assert_eq!(unique.len(), defs.len());
        assert_eq!(spec.member("compare").unwrap().def.index, 4);
    }
}
