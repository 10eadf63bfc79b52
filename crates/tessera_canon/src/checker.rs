//! Usage-site checker.
//!
//! Walks a program after synthesis and validates:
//! - method calls on component instances (existence, arity, argument types)
//! - static member reads and calls on component constructors
//! - `this.props.x`, `this.state.x` and `this.setState({...})` inside component methods
//! - element construction through the element factory or JSX

use oxc_ast::ast::{
    Argument, AssignmentExpression, AssignmentTarget, BindingPattern, CallExpression,
    Expression, Function, JSXAttributeItem, JSXAttributeName, JSXAttributeValue, JSXChild,
    JSXElement, ObjectPropertyKind, Program, StaticMemberExpression, VariableDeclaration,
};
use oxc_ast_visit::{walk, Visit};
use oxc_span::GetSpan;
use oxc_syntax::scope::ScopeFlags;
use tessera_carton::{
    closest_match, CompactString, Diagnostic, DiagnosticCode, FileId, FxHashMap, Site,
};
use tessera_croquis::factory::MemberKind;
use tessera_croquis::jsdoc::{comment_content, JsDoc};
use tessera_croquis::nominal::{ComponentType, TypeRegistry};
use tessera_croquis::options::PassOptions;
use tessera_croquis::registry::CallRegistry;
use tessera_croquis::syntax::{
    leading_jsdoc, property_key_name, qualified_name, site, unparenthesize,
};
use tessera_croquis::types::{is_assignable, Literal, Signature, SynthType};

use crate::infer::InferContext;
use crate::CheckResult;

/// Statics every function has.
const FUNCTION_STATICS: [&str; 4] = ["prototype", "call", "apply", "bind"];

/// Checker output for one program.
#[derive(Debug, Default)]
pub struct UsageReport {
    pub result: CheckResult,
    /// Types to attach to expressions, such as element types at construction sites.
    pub attachments: Vec<(Site, SynthType)>,
}

/// Check every usage site in `program`.
pub fn check_program(
    program: &Program<'_>,
    source: &str,
    file: FileId,
    registry: &CallRegistry,
    types: &dyn TypeRegistry,
    options: &PassOptions,
) -> UsageReport {
    let mut methods = FxHashMap::default();
    for call in registry.components() {
        if types.component(&call.name).is_none() {
            continue;
        }
        for member in call.spec.members.values() {
            if let MemberKind::Method { function_site, .. } = &member.kind {
                if function_site.file == file {
                    methods.insert(function_site.start, (call.name.clone(), member.name.clone()));
                }
            }
        }
    }

    let mut checker = UsageChecker {
        file,
        source,
        comments: program
            .comments
            .iter()
            .map(|c| (c.span.start, c.span.end))
            .collect(),
        types,
        options,
        methods,
        this_stack: Vec::new(),
        scopes: vec![FxHashMap::default()],
        report: UsageReport::default(),
    };
    checker.visit_program(program);
    tracing::debug!(
        file = file.0,
        errors = checker.report.result.error_count,
        warnings = checker.report.result.warning_count,
        "checked usage sites"
    );
    checker.report
}

/// Props passed at an element construction site.
#[derive(Debug, Default)]
struct GivenProps {
    entries: Vec<(CompactString, SynthType, Site)>,
    /// A spread or computed key may supply anything.
    open: bool,
}

impl GivenProps {
    fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _, _)| n == name)
    }
}

struct UsageChecker<'c> {
    file: FileId,
    source: &'c str,
    comments: Vec<(u32, u32)>,
    types: &'c dyn TypeRegistry,
    options: &'c PassOptions,
    /// Function start offset of each component method in this file.
    methods: FxHashMap<u32, (CompactString, CompactString)>,
    /// Component bound to `this`, per enclosing non-arrow function.
    this_stack: Vec<Option<CompactString>>,
    scopes: Vec<FxHashMap<CompactString, SynthType>>,
    report: UsageReport,
}

impl<'c> UsageChecker<'c> {
    fn this_component(&self) -> Option<&'c ComponentType> {
        let types = self.types;
        let name = self.this_stack.last()?.as_ref()?;
        types.component(name)
    }

    fn context(&self) -> InferContext<'_> {
        InferContext {
            types: self.types,
            options: self.options,
            scopes: &self.scopes,
            this_component: self.this_component(),
        }
    }

    fn infer(&self, expr: &Expression<'_>) -> SynthType {
        self.context().infer(expr)
    }

    fn site(&self, span: oxc_span::Span) -> Site {
        site(self.file, span)
    }

    fn error(&mut self, code: DiagnosticCode, message: String, at: Site) {
        self.report
            .result
            .add_diagnostic(Diagnostic::error(code, message, at));
    }

    fn declare(&mut self, name: &str, ty: SynthType) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), ty);
        }
    }

    fn instance_of(&self, ty: &SynthType) -> Option<&'c ComponentType> {
        let types = self.types;
        match ty.non_nullish() {
            SynthType::Named(name) => types.component(&name),
            _ => None,
        }
    }

    fn constructor_of(&self, ty: &SynthType) -> Option<&'c ComponentType> {
        let types = self.types;
        match ty {
            SynthType::Constructor(name) => types.component(name),
            _ => None,
        }
    }

    fn is_class_factory_call(&self, expr: &Expression<'_>) -> bool {
        let Expression::CallExpression(call) = unparenthesize(expr) else {
            return false;
        };
        qualified_name(&call.callee).is_some_and(|name| self.options.is_class_factory(&name))
    }

    fn check_instance_call(
        &mut self,
        component: &'c ComponentType,
        member: &StaticMemberExpression<'_>,
        arguments: &[Argument<'_>],
    ) {
        let name = member.property.name.as_str();
        let at = self.site(member.property.span);
        let Some(method) = component.method(name) else {
            if !component.has_member(name) {
                let candidates = component
                    .methods
                    .keys()
                    .chain(component.fields.keys())
                    .map(CompactString::as_str);
                let mut message =
                    format!("unknown method `{name}` on component `{}`", component.name);
                if let Some(suggestion) = closest_match(name, candidates) {
                    message.push_str(&format!("; did you mean `{suggestion}`?"));
                }
                self.error(DiagnosticCode::UnknownMethod, message, at);
            }
            return;
        };

        if name == "setState" {
            self.check_set_state(component, arguments);
        }
        if let Some(signature) = &method.signature {
            let label = format!("{}.prototype.{name}", component.name);
            self.check_arguments(&label, signature, arguments, at);
        }
    }

    fn check_static(&mut self, component: &'c ComponentType, name: &str, at: Site) -> bool {
        if component.static_member(name).is_some() || FUNCTION_STATICS.contains(&name) {
            return true;
        }
        let candidates = component.statics.keys().map(CompactString::as_str);
        let mut message = format!("unknown static `{name}` on component `{}`", component.name);
        if let Some(suggestion) = closest_match(name, candidates) {
            message.push_str(&format!("; did you mean `{suggestion}`?"));
        }
        self.error(DiagnosticCode::UnknownStatic, message, at);
        false
    }

    fn check_static_call(
        &mut self,
        component: &'c ComponentType,
        member: &StaticMemberExpression<'_>,
        arguments: &[Argument<'_>],
    ) {
        let name = member.property.name.as_str();
        let at = self.site(member.property.span);
        if !self.check_static(component, name, at) {
            return;
        }
        if let Some(SynthType::Function(signature)) = component.static_member(name).map(|s| &s.ty) {
            let label = format!("{}.{name}", component.name);
            self.check_arguments(&label, signature, arguments, at);
        }
    }

    fn check_arguments(
        &mut self,
        label: &str,
        signature: &Signature,
        arguments: &[Argument<'_>],
        at: Site,
    ) {
        let spread = arguments
            .iter()
            .any(|a| matches!(a, Argument::SpreadElement(_)));
        let count = arguments.len();
        let too_few = count < signature.min_arity();
        let too_many = signature.max_arity().is_some_and(|max| count > max);
        if !spread && (too_few || too_many) {
            let bounds = match signature.max_arity() {
                Some(max) if max == signature.min_arity() => format!("exactly {max}"),
                Some(max) => format!("at least {} and no more than {max}", signature.min_arity()),
                None => format!("at least {}", signature.min_arity()),
            };
            self.error(
                DiagnosticCode::ArgumentCount,
                format!(
                    "Function {label}: called with {count} argument(s). Function requires {bounds} argument(s)."
                ),
                at,
            );
        }

        for (index, argument) in arguments.iter().enumerate() {
            let Some(expr) = argument.as_expression() else {
                break;
            };
            let Some(param) = signature.param_for(index) else {
                break;
            };
            let found = self.infer(expr);
            let required = if param.optional {
                SynthType::union([param.ty.clone(), SynthType::Undefined])
            } else {
                param.ty.clone()
            };
            if !is_assignable(&found, &required) {
                self.error(
                    DiagnosticCode::ArgumentTypeMismatch,
                    format!(
                        "actual parameter {} of {label} does not match formal parameter\nfound   : {found}\nrequired: {}",
                        index + 1,
                        param.ty
                    ),
                    self.site(expr.span()),
                );
            }
        }
    }

    fn check_set_state(&mut self, component: &'c ComponentType, arguments: &[Argument<'_>]) {
        let Some(state) = &component.state else {
            return;
        };
        let Some(Expression::ObjectExpression(obj)) =
            arguments.first().and_then(Argument::as_expression).map(unparenthesize)
        else {
            return;
        };
        for property in &obj.properties {
            let ObjectPropertyKind::ObjectProperty(p) = property else {
                continue;
            };
            let Some(key) = property_key_name(&p.key) else {
                continue;
            };
            let at = self.site(p.key.span());
            match state.get(&key) {
                None => self.error(
                    DiagnosticCode::UnknownStateField,
                    format!("unknown state field `{key}` of component `{}`", component.name),
                    at,
                ),
                Some(field) => {
                    let found = self.infer(&p.value);
                    if !is_assignable(&found, &field.ty) {
                        self.error(
                            DiagnosticCode::ArgumentTypeMismatch,
                            format!(
                                "state field \"{key}\" was expected to be of type {}, instead was {found}",
                                field.ty
                            ),
                            at,
                        );
                    }
                }
            }
        }
    }

    fn check_create_element(&mut self, call: &CallExpression<'_>) {
        let at = self.site(call.span);
        let Some(tag) = call.arguments.first().and_then(Argument::as_expression) else {
            if call.arguments.is_empty() {
                self.error(
                    DiagnosticCode::CreateElementArity,
                    "createElement requires at least the element type".to_string(),
                    at,
                );
            }
            return;
        };

        let element = self.context().element_of(Some(tag));
        self.report.attachments.push((at, element.clone()));
        let SynthType::Element(Some(name)) = element else {
            return;
        };
        let types = self.types;
        let Some(component) = types.component(&name) else {
            return;
        };

        let given = self.given_props(call.arguments.get(1).and_then(Argument::as_expression));
        let children: Vec<(SynthType, Site)> = call
            .arguments
            .iter()
            .skip(2)
            .map(|a| match a.as_expression() {
                Some(e) => (self.infer(e), self.site(e.span())),
                None => (SynthType::Unknown, self.site(a.span())),
            })
            .collect();
        self.check_element(component, &given, &children, at);
    }

    fn given_props(&self, arg: Option<&Expression<'_>>) -> GivenProps {
        let mut given = GivenProps::default();
        match arg.map(unparenthesize) {
            None | Some(Expression::NullLiteral(_)) => {}
            Some(Expression::ObjectExpression(obj)) => {
                for property in &obj.properties {
                    let ObjectPropertyKind::ObjectProperty(p) = property else {
                        given.open = true;
                        continue;
                    };
                    let Some(key) = property_key_name(&p.key) else {
                        given.open = true;
                        continue;
                    };
                    given
                        .entries
                        .push((key, self.infer(&p.value), self.site(p.key.span())));
                }
            }
            Some(other) => match self.infer(other) {
                SynthType::Record(record) => {
                    let at = self.site(other.span());
                    for (name, field) in record.fields {
                        given.entries.push((name, field.ty, at));
                    }
                }
                SynthType::Undefined => {}
                _ => given.open = true,
            },
        }
        given
    }

    fn check_element(
        &mut self,
        component: &'c ComponentType,
        given: &GivenProps,
        children: &[(SynthType, Site)],
        at: Site,
    ) {
        let props = &component.props;
        for (name, found, prop_site) in &given.entries {
            if !props.accepts(name) {
                let candidates = props.fields.keys().map(CompactString::as_str);
                let mut message =
                    format!("unknown prop `{name}` for component `{}`", component.name);
                if let Some(suggestion) = closest_match(name, candidates) {
                    message.push_str(&format!("; did you mean `{suggestion}`?"));
                }
                self.error(DiagnosticCode::UnknownProp, message, *prop_site);
                continue;
            }
            let Some(field) = props.field(name) else {
                continue;
            };
            let expected = if field.required {
                field.ty.clone()
            } else {
                SynthType::union([field.ty.clone(), SynthType::Null, SynthType::Undefined])
            };
            if !is_assignable(found, &expected) {
                self.error(
                    DiagnosticCode::PropTypeMismatch,
                    format!(
                        "\"{name}\" was expected to be of type {}, instead was {found}",
                        field.ty
                    ),
                    *prop_site,
                );
            }
        }

        if let Some(field) = props.children() {
            if let [(found, child_site)] = children {
                if !is_assignable(found, &field.ty) {
                    self.error(
                        DiagnosticCode::PropTypeMismatch,
                        format!(
                            "\"children\" was expected to be of type {}, instead was {found}",
                            field.ty
                        ),
                        *child_site,
                    );
                }
            } else {
                for (found, child_site) in children {
                    if !is_assignable(found, &SynthType::Renderable) {
                        self.error(
                            DiagnosticCode::PropTypeMismatch,
                            format!("child was expected to be of type ReactChild, instead was {found}"),
                            *child_site,
                        );
                    }
                }
            }
        }

        if !props.declared || given.open {
            return;
        }
        let children_given = !children.is_empty() || given.has("children");
        for (name, field) in &props.fields {
            if !field.must_be_passed() {
                continue;
            }
            if name == "children" {
                if !children_given {
                    self.report.result.add_diagnostic(Diagnostic::warning(
                        DiagnosticCode::MissingChildren,
                        format!("component `{}` requires children, but none were passed", component.name),
                        at,
                    ));
                }
                continue;
            }
            if !given.has(name) {
                self.error(
                    DiagnosticCode::MissingRequiredProp,
                    format!("\"{name}\" was missing, expected to be of type {}", field.ty),
                    at,
                );
            }
        }
    }

    fn check_jsx(&mut self, element: &JSXElement<'_>) {
        let at = self.site(element.span);
        let ty = self.context().jsx_element(element);
        self.report.attachments.push((at, ty.clone()));
        let SynthType::Element(Some(name)) = ty else {
            return;
        };
        let types = self.types;
        let Some(component) = types.component(&name) else {
            return;
        };

        let mut given = GivenProps::default();
        for item in &element.opening_element.attributes {
            match item {
                JSXAttributeItem::Attribute(attr) => {
                    let JSXAttributeName::Identifier(id) = &attr.name else {
                        continue;
                    };
                    let found = match &attr.value {
                        None => SynthType::Literal(Literal::Bool(true)),
                        Some(JSXAttributeValue::StringLiteral(s)) => {
                            SynthType::Literal(Literal::Str(s.value.as_str().into()))
                        }
                        Some(JSXAttributeValue::ExpressionContainer(container)) => container
                            .expression
                            .as_expression()
                            .map_or(SynthType::Unknown, |e| self.infer(e)),
                        Some(JSXAttributeValue::Element(inner)) => self.context().jsx_element(inner),
                        Some(JSXAttributeValue::Fragment(_)) => SynthType::Element(None),
                    };
                    given
                        .entries
                        .push((id.name.as_str().into(), found, self.site(attr.span)));
                }
                JSXAttributeItem::SpreadAttribute(_) => given.open = true,
            }
        }

        let mut children = Vec::new();
        for child in &element.children {
            let found = match child {
                JSXChild::Text(text) => {
                    let trimmed = text.value.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    SynthType::Literal(Literal::Str(trimmed.into()))
                }
                JSXChild::Element(inner) => self.context().jsx_element(inner),
                JSXChild::Fragment(_) => SynthType::Element(None),
                JSXChild::ExpressionContainer(container) => {
                    match container.expression.as_expression() {
                        Some(e) => self.infer(e),
                        None => continue,
                    }
                }
                JSXChild::Spread(_) => SynthType::Unknown,
            };
            children.push((found, self.site(child.span())));
        }

        self.check_element(component, &given, &children, at);
    }

    /// `this.props.x` and `this.state.x` inside a component method.
    fn check_this_member(&mut self, member: &StaticMemberExpression<'_>) {
        let Expression::StaticMemberExpression(inner) = unparenthesize(&member.object) else {
            return;
        };
        if !matches!(unparenthesize(&inner.object), Expression::ThisExpression(_)) {
            return;
        }
        let Some(component) = self.this_component() else {
            return;
        };
        let name = member.property.name.as_str();
        let at = self.site(member.property.span);
        match inner.property.name.as_str() {
            "props" if !component.props.accepts(name) => {
                let candidates = component.props.fields.keys().map(CompactString::as_str);
                let mut message =
                    format!("unknown prop `{name}` for component `{}`", component.name);
                if let Some(suggestion) = closest_match(name, candidates) {
                    message.push_str(&format!("; did you mean `{suggestion}`?"));
                }
                self.error(DiagnosticCode::UnknownProp, message, at);
            }
            "state" => {
                if let Some(state) = &component.state {
                    if state.get(name).is_none() {
                        self.error(
                            DiagnosticCode::UnknownStateField,
                            format!(
                                "unknown state field `{name}` of component `{}`",
                                component.name
                            ),
                            at,
                        );
                    }
                }
            }
            _ => {}
        }
    }

    fn bind_params(&mut self, func: &Function<'_>, signature: &Signature) {
        for (index, param) in func.params.items.iter().enumerate() {
            if let BindingPattern::BindingIdentifier(id) = &param.pattern {
                let ty = signature
                    .param_for(index)
                    .map_or(SynthType::Unknown, |p| p.ty.clone());
                self.declare(id.name.as_str(), ty);
            }
        }
    }
}

impl<'a> Visit<'a> for UsageChecker<'_> {
    fn visit_function(&mut self, func: &Function<'a>, flags: ScopeFlags) {
        let owner = self.methods.get(&func.span.start).cloned();
        self.scopes.push(FxHashMap::default());
        self.this_stack.push(owner.as_ref().map(|(component, _)| component.clone()));

        if let Some((_, method)) = &owner {
            let signature = self
                .this_component()
                .and_then(|c| c.method(method))
                .and_then(|m| m.signature.clone());
            if let Some(signature) = signature {
                self.bind_params(func, &signature);
            }
        }

        walk::walk_function(self, func, flags);
        self.this_stack.pop();
        self.scopes.pop();
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration<'a>) {
        walk::walk_variable_declaration(self, decl);

        let declared = leading_jsdoc(self.source, &self.comments, decl.span.start)
            .map(|text| JsDoc::parse(comment_content(text)))
            .and_then(|doc| doc.type_tag)
            .map(|tag| tag.ty);
        for declarator in &decl.declarations {
            let BindingPattern::BindingIdentifier(id) = &declarator.id else {
                continue;
            };
            let ty = match (&declared, &declarator.init) {
                (Some(ty), _) if decl.declarations.len() == 1 => ty.clone(),
                (_, Some(init)) => self.infer(init),
                _ => SynthType::Unknown,
            };
            // The binding of a class factory call is the component's constructor.
            let binds_component = ty == SynthType::Unknown
                && declarator
                    .init
                    .as_ref()
                    .is_some_and(|init| self.is_class_factory_call(init))
                && self.types.component(id.name.as_str()).is_some();
            let ty = if binds_component {
                SynthType::Constructor(id.name.as_str().into())
            } else {
                ty
            };
            self.declare(id.name.as_str(), ty);
        }
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        let callee = qualified_name(&call.callee);
        if callee
            .as_deref()
            .is_some_and(|name| self.options.is_element_factory(name))
        {
            self.check_create_element(call);
            walk::walk_call_expression(self, call);
            return;
        }

        let Expression::StaticMemberExpression(member) = unparenthesize(&call.callee) else {
            walk::walk_call_expression(self, call);
            return;
        };
        let receiver = self.infer(&member.object);
        if let Some(component) = self.instance_of(&receiver) {
            self.check_instance_call(component, member, &call.arguments);
        } else if let Some(component) = self.constructor_of(&receiver) {
            self.check_static_call(component, member, &call.arguments);
        } else {
            walk::walk_call_expression(self, call);
            return;
        }

        // The callee member itself is checked above.
        self.visit_expression(&member.object);
        for argument in &call.arguments {
            self.visit_argument(argument);
        }
    }

    fn visit_static_member_expression(&mut self, member: &StaticMemberExpression<'a>) {
        self.check_this_member(member);
        if qualified_name(&member.object).is_some() {
            let object = self.infer(&member.object);
            if let Some(component) = self.constructor_of(&object) {
                let at = self.site(member.property.span);
                self.check_static(component, member.property.name.as_str(), at);
            }
        }
        walk::walk_static_member_expression(self, member);
    }

    fn visit_assignment_expression(&mut self, assign: &AssignmentExpression<'a>) {
        // Assigning a static or a field defines it rather than reading it.
        if let AssignmentTarget::StaticMemberExpression(member) = &assign.left {
            self.visit_expression(&member.object);
            self.visit_expression(&assign.right);
            return;
        }
        walk::walk_assignment_expression(self, assign);
    }

    fn visit_jsx_element(&mut self, element: &JSXElement<'a>) {
        self.check_jsx(element);
        walk::walk_jsx_element(self, element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;
    use tessera_croquis::collect::collect_program;
    use tessera_croquis::nominal::NominalRegistry;
    use tessera_croquis::resolver::MixinResolver;
    use tessera_croquis::synth::ComponentSynthesizer;

    fn check(source: &str) -> UsageReport {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::mjs().with_jsx(true)).parse();
        assert!(!ret.panicked);
        let options = PassOptions::default();
        let mut registry = CallRegistry::new();
        collect_program(&ret.program, source, FileId(0), &options, &mut registry);
        registry.finish();
        let resolved = MixinResolver::new(&registry, &options).resolve();
        let mut types = NominalRegistry::new();
        ComponentSynthesizer::new(&registry, &resolved.surfaces, &options).run(&mut types);
        check_program(&ret.program, source, FileId(0), &registry, &types, &options)
    }

    fn codes(report: &UsageReport) -> Vec<DiagnosticCode> {
        report.result.diagnostics.iter().map(|d| d.code).collect()
    }

    const LABEL: &str = r#"
var Label = React.createClass({
  propTypes: { label: React.PropTypes.string.isRequired },
  render: function() { return null; }
});
"#;

    #[test]
    fn test_required_prop() {
        let missing = check(&format!("{LABEL}React.createElement(Label, {{}});"));
        assert_eq!(codes(&missing), vec![DiagnosticCode::MissingRequiredProp]);
        insta::assert_snapshot!(missing.result.diagnostics[0].message, @r#""label" was missing, expected to be of type string"#);

        let wrong = check(&format!("{LABEL}React.createElement(Label, {{label: 123}});"));
        assert_eq!(codes(&wrong), vec![DiagnosticCode::PropTypeMismatch]);
        insta::assert_snapshot!(wrong.result.diagnostics[0].message, @r#""label" was expected to be of type string, instead was 123"#);

        let ok = check(&format!("{LABEL}React.createElement(Label, {{label: \"ok\"}});"));
        assert!(ok.result.diagnostics.is_empty());
        assert_eq!(ok.attachments.len(), 1);
        assert_eq!(ok.attachments[0].1.to_string(), "ReactElement<Label>");
    }

    #[test]
    fn test_unknown_prop_and_spread() {
        let report = check(&format!(
            "{LABEL}React.createElement(Label, {{lable: 'x'}});\nReact.createElement(Label, {{...rest}});\nReact.createElement(Label, {{label: 'x', key: 'k'}});"
        ));
        assert_eq!(
            codes(&report),
            vec![DiagnosticCode::UnknownProp, DiagnosticCode::MissingRequiredProp]
        );
        assert!(report.result.diagnostics[0].message.contains("did you mean `label`"));
    }

    #[test]
    fn test_jsx_elements() {
        let report = check(&format!(
            "{LABEL}var a = <Label label=\"ok\" />;\nvar b = <Label label={{1}} />;\nvar c = <Label />;\nvar d = <div anything={{1}} />;"
        ));
        assert_eq!(
            codes(&report),
            vec![DiagnosticCode::PropTypeMismatch, DiagnosticCode::MissingRequiredProp]
        );
    }

    #[test]
    fn test_instance_methods() {
        let report = check(
            r#"
var Counter = React.createClass({
  /** @param {number} by */
  increment: function(by) {},
  render: function() {
    this.increment(1);
    this.increment('one');
    this.incremnt(1);
    this.increment();
    this.setState({});
    return null;
  }
});
"#,
        );
        assert_eq!(
            codes(&report),
            vec![
                DiagnosticCode::ArgumentTypeMismatch,
                DiagnosticCode::UnknownMethod,
                DiagnosticCode::ArgumentCount,
            ]
        );
        insta::assert_snapshot!(report.result.diagnostics[0].message, @r#"
        actual parameter 1 of Counter.prototype.increment does not match formal parameter
        found   : "one"
        required: number
        "#);
        assert!(report.result.diagnostics[1].message.contains("did you mean `increment`"));
    }

    #[test]
    fn test_typed_locals_and_rendered_instances() {
        let report = check(
            r#"
var Player = React.createClass({
  /** @param {string} url */
  load: function(url) {},
  render: function() { return null; }
});
var player = ReactDOM.render(React.createElement(Player), root);
player.load(42);
/** @type {Player} */
var other = lookup();
other.stop();
"#,
        );
        assert_eq!(
            codes(&report),
            vec![DiagnosticCode::ArgumentTypeMismatch, DiagnosticCode::UnknownMethod]
        );
    }

    #[test]
    fn test_statics() {
        let report = check(
            r#"
var Store = React.createClass({
  statics: {
    /** @param {string} id */
    find: function(id) {}
  },
  render: function() { return null; }
});
Store.find('a');
Store.find(1);
Store.missing();
var name = Store.displayName;
var bad = Store.nope;
Store.later = 1;
"#,
        );
        assert_eq!(
            codes(&report),
            vec![
                DiagnosticCode::ArgumentTypeMismatch,
                DiagnosticCode::UnknownStatic,
                DiagnosticCode::UnknownStatic,
            ]
        );
        assert!(report.result.diagnostics[0].message.contains("of Store.find does not match"));
    }

    #[test]
    fn test_props_and_state_access() {
        let report = check(
            r#"
var Toggle = React.createClass({
  propTypes: { on: React.PropTypes.bool },
  getInitialState: function() { return { open: false }; },
  render: function() {
    var a = this.props.on;
    var b = this.props.of;
    var c = this.state.open;
    var d = this.state.closed;
    this.setState({ open: true });
    this.setState({ open: 'yes', extra: 1 });
    return null;
  }
});
"#,
        );
        assert_eq!(
            codes(&report),
            vec![
                DiagnosticCode::UnknownProp,
                DiagnosticCode::UnknownStateField,
                DiagnosticCode::ArgumentTypeMismatch,
                DiagnosticCode::UnknownStateField,
            ]
        );
    }

    #[test]
    fn test_inherited_instance_api() {
        let report = check(
            r#"
var Drawer = React.createClass({
  propTypes: { open: React.PropTypes.bool },
  componentDidMount: function() {
    this.setProps({ open: true });
    this.replaceProps({}, function() {});
    this.forceUpdate();
    this.setProps();
  },
  render: function() { return null; }
});
"#,
        );
        assert_eq!(codes(&report), vec![DiagnosticCode::ArgumentCount]);
    }

    #[test]
    fn test_children() {
        let report = check(
            r#"
var Frame = React.createClass({
  propTypes: { children: React.PropTypes.element.isRequired },
  render: function() { return null; }
});
React.createElement(Frame, null);
React.createElement(Frame, null, 'text');
React.createElement(Frame, null, React.createElement('span'));
React.createElement();
"#,
        );
        assert_eq!(
            codes(&report),
            vec![
                DiagnosticCode::MissingChildren,
                DiagnosticCode::PropTypeMismatch,
                DiagnosticCode::CreateElementArity,
            ]
        );
        assert!(!report.result.diagnostics[0].is_error());
    }
}
