//! Expression type inference for usage sites.
//!
//! Deliberately shallow: literals, object and array literals, element construction,
//! locals, and members of synthesized types. Anything else is `?`, which is compatible
//! with everything.

use oxc_ast::ast::{
    Argument, ArrayExpressionElement, CallExpression, Expression, JSXElement, ObjectPropertyKind,
};
use oxc_syntax::operator::{BinaryOperator, UnaryOperator};
use tessera_carton::{CompactString, FxHashMap};
use tessera_croquis::nominal::{ComponentType, TypeRegistry};
use tessera_croquis::options::PassOptions;
use tessera_croquis::syntax::{jsx_element_name, property_key_name, qualified_name, unparenthesize};
use tessera_croquis::types::{Literal, Primitive, Record, SynthType};

/// Lexical scopes, innermost last.
pub type Scopes = [FxHashMap<CompactString, SynthType>];

pub struct InferContext<'c> {
    pub types: &'c dyn TypeRegistry,
    pub options: &'c PassOptions,
    pub scopes: &'c Scopes,
    /// The component whose method encloses the expression, for `this`.
    pub this_component: Option<&'c ComponentType>,
}

impl<'c> InferContext<'c> {
    pub fn infer(&self, expr: &Expression<'_>) -> SynthType {
        match expr {
            Expression::StringLiteral(s) => SynthType::Literal(Literal::Str(s.value.as_str().into())),
            Expression::NumericLiteral(n) => SynthType::Literal(Literal::number(n.value)),
            Expression::BooleanLiteral(b) => SynthType::Literal(Literal::Bool(b.value)),
            Expression::NullLiteral(_) => SynthType::Null,
            Expression::TemplateLiteral(_) => SynthType::string(),
            Expression::RegExpLiteral(_) => SynthType::Named("RegExp".into()),
            Expression::ParenthesizedExpression(paren) => self.infer(&paren.expression),
            Expression::Identifier(id) => self.identifier(id.name.as_str()),
            Expression::ThisExpression(_) => self
                .this_component
                .map_or(SynthType::Unknown, ComponentType::instance_type),
            Expression::StaticMemberExpression(_) => self.member(expr),
            Expression::ArrayExpression(arr) => {
                let mut elements = Vec::with_capacity(arr.elements.len());
                for element in &arr.elements {
                    if let ArrayExpressionElement::SpreadElement(_) | ArrayExpressionElement::Elision(_) =
                        element
                    {
                        return SynthType::Array(Box::new(SynthType::Unknown));
                    }
                    if let Some(e) = element.as_expression() {
                        elements.push(self.infer(e));
                    }
                }
                SynthType::Array(Box::new(SynthType::union(elements)))
            }
            Expression::ObjectExpression(obj) => {
                let mut record = Record::new();
                for property in &obj.properties {
                    let ObjectPropertyKind::ObjectProperty(p) = property else {
                        return SynthType::AnyObject;
                    };
                    let Some(key) = property_key_name(&p.key) else {
                        return SynthType::AnyObject;
                    };
                    record = record.with_field(key, self.infer(&p.value), false);
                }
                SynthType::Record(record)
            }
            Expression::FunctionExpression(_) | Expression::ArrowFunctionExpression(_) => {
                SynthType::AnyFunction
            }
            Expression::UnaryExpression(unary) => match unary.operator {
                UnaryOperator::UnaryNegation => match unparenthesize(&unary.argument) {
                    Expression::NumericLiteral(n) => SynthType::Literal(Literal::number(-n.value)),
                    _ => SynthType::number(),
                },
                UnaryOperator::UnaryPlus | UnaryOperator::BitwiseNot => SynthType::number(),
                UnaryOperator::LogicalNot | UnaryOperator::Delete => SynthType::boolean(),
                UnaryOperator::Typeof => SynthType::string(),
                UnaryOperator::Void => SynthType::Undefined,
            },
            Expression::BinaryExpression(binary) => match binary.operator {
                BinaryOperator::Addition => {
                    let left = self.infer(&binary.left);
                    let right = self.infer(&binary.right);
                    if is_stringish(&left) || is_stringish(&right) {
                        SynthType::string()
                    } else if is_numberish(&left) && is_numberish(&right) {
                        SynthType::number()
                    } else {
                        SynthType::Unknown
                    }
                }
                BinaryOperator::Equality
                | BinaryOperator::Inequality
                | BinaryOperator::StrictEquality
                | BinaryOperator::StrictInequality
                | BinaryOperator::LessThan
                | BinaryOperator::LessEqualThan
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterEqualThan
                | BinaryOperator::In
                | BinaryOperator::Instanceof => SynthType::boolean(),
                _ => SynthType::number(),
            },
            Expression::ConditionalExpression(cond) => SynthType::union([
                self.infer(&cond.consequent),
                self.infer(&cond.alternate),
            ]),
            Expression::NewExpression(new) => qualified_name(&new.callee)
                .map_or(SynthType::Unknown, SynthType::Named),
            Expression::CallExpression(call) => self.call(call),
            Expression::JSXElement(element) => self.jsx_element(element),
            Expression::JSXFragment(_) => SynthType::Element(None),
            _ => SynthType::Unknown,
        }
    }

    /// Type of an element built from a JSX tag.
    pub fn jsx_element(&self, element: &JSXElement<'_>) -> SynthType {
        let name = jsx_element_name(&element.opening_element.name)
            .filter(|name| self.types.component(name).is_some());
        SynthType::Element(name)
    }

    /// Type of an element built by the element factory from its first argument.
    pub fn element_of(&self, tag: Option<&Expression<'_>>) -> SynthType {
        match tag.map(unparenthesize) {
            None => SynthType::Unknown,
            Some(Expression::StringLiteral(_)) => SynthType::Element(None),
            Some(expr) => match self.infer(expr) {
                SynthType::Constructor(name) => SynthType::Element(Some(name)),
                _ => SynthType::Element(None),
            },
        }
    }

    /// The component `ty` is an instance of.
    pub fn instance_of(&self, ty: &SynthType) -> Option<&'c ComponentType> {
        match ty.non_nullish() {
            SynthType::Named(name) => self.types.component(&name),
            _ => None,
        }
    }

    /// The component `ty` is the constructor of.
    pub fn constructor_of(&self, ty: &SynthType) -> Option<&'c ComponentType> {
        match ty {
            SynthType::Constructor(name) => self.types.component(name),
            _ => None,
        }
    }

    fn identifier(&self, name: &str) -> SynthType {
        if name == "undefined" {
            return SynthType::Undefined;
        }
        if let Some(ty) = self.scopes.iter().rev().find_map(|scope| scope.get(name)) {
            return ty.clone();
        }
        if self.types.component(name).is_some() {
            return SynthType::Constructor(name.into());
        }
        SynthType::Unknown
    }

    fn member(&self, expr: &Expression<'_>) -> SynthType {
        let Expression::StaticMemberExpression(member) = expr else {
            return SynthType::Unknown;
        };
        if let Some(name) = qualified_name(expr) {
            if self.types.component(&name).is_some() {
                return SynthType::Constructor(name);
            }
        }

        let property = member.property.name.as_str();
        let object = self.infer(&member.object);
        if let Some(component) = self.instance_of(&object) {
            return instance_member(component, property);
        }
        if let Some(component) = self.constructor_of(&object) {
            return component
                .static_member(property)
                .map_or(SynthType::Unknown, |s| s.ty.clone());
        }
        match object.non_nullish() {
            SynthType::Record(record) => match record.get(property) {
                Some(field) if field.optional => {
                    SynthType::union([field.ty.clone(), SynthType::Undefined])
                }
                Some(field) => field.ty.clone(),
                None => SynthType::Unknown,
            },
            SynthType::Array(_) if property == "length" => SynthType::number(),
            ref s if property == "length" && is_stringish(s) => SynthType::number(),
            _ => SynthType::Unknown,
        }
    }

    fn call(&self, call: &CallExpression<'_>) -> SynthType {
        if let Some(callee) = qualified_name(&call.callee) {
            if self.options.is_element_factory(&callee) {
                return self.element_of(call.arguments.first().and_then(Argument::as_expression));
            }
            if self.options.is_render_function(&callee) {
                let element = call
                    .arguments
                    .first()
                    .and_then(Argument::as_expression)
                    .map(|e| self.infer(e));
                return match element {
                    Some(SynthType::Element(Some(name))) => SynthType::Named(name),
                    _ => SynthType::Unknown,
                };
            }
        }

        let Expression::StaticMemberExpression(member) = unparenthesize(&call.callee) else {
            return SynthType::Unknown;
        };
        let property = member.property.name.as_str();
        let receiver = self.infer(&member.object);
        let signature = if let Some(component) = self.instance_of(&receiver) {
            component.method(property).and_then(|m| m.signature.as_ref())
        } else if let Some(component) = self.constructor_of(&receiver) {
            match component.static_member(property).map(|s| &s.ty) {
                Some(SynthType::Function(sig)) => Some(&**sig),
                _ => None,
            }
        } else {
            None
        };
        signature.map_or(SynthType::Unknown, |sig| sig.returns.clone())
    }
}

/// Type of `instance.property` on a synthesized component.
fn instance_member(component: &ComponentType, property: &str) -> SynthType {
    match property {
        "props" if component.props.declared => SynthType::Record(component.props.to_record()),
        "state" => component
            .state
            .clone()
            .map_or(SynthType::Unknown, SynthType::Record),
        _ => {
            if let Some(ty) = component.fields.get(property) {
                return ty.clone();
            }
            match component.method(property).and_then(|m| m.signature.clone()) {
                Some(sig) => SynthType::Function(Box::new(sig)),
                None => SynthType::Unknown,
            }
        }
    }
}

fn is_stringish(ty: &SynthType) -> bool {
    match ty {
        SynthType::Primitive(Primitive::String) => true,
        SynthType::Literal(l) => l.primitive() == Primitive::String,
        _ => false,
    }
}

fn is_numberish(ty: &SynthType) -> bool {
    match ty {
        SynthType::Primitive(Primitive::Number) => true,
        SynthType::Literal(l) => l.primitive() == Primitive::Number,
        _ => false,
    }
}
