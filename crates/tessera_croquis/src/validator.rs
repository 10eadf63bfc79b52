//! Prop validator descriptors.
//!
//! `propTypes` entries are read into a closed descriptor set and turned into props
//! record field types. Anything outside the set is [`ValidatorDescriptor::Unresolved`].

use oxc_ast::ast::{Expression, ObjectPropertyKind};
use phf::phf_map;
use tessera_carton::{CompactString, FxIndexMap};

use crate::options::PassOptions;
use crate::syntax::{property_key_name, qualified_name, unparenthesize};
use crate::types::{Literal, Record, SynthType};

/// Primitive validator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Array,
    Bool,
    Func,
    Number,
    Object,
    String,
    Symbol,
    Any,
    Node,
    Element,
}

static PRIMITIVE_VALIDATORS: phf::Map<&'static str, PrimitiveKind> = phf_map! {
    "array" => PrimitiveKind::Array,
    "bool" => PrimitiveKind::Bool,
    "func" => PrimitiveKind::Func,
    "number" => PrimitiveKind::Number,
    "object" => PrimitiveKind::Object,
    "string" => PrimitiveKind::String,
    "symbol" => PrimitiveKind::Symbol,
    "any" => PrimitiveKind::Any,
    "node" => PrimitiveKind::Node,
    "element" => PrimitiveKind::Element,
};

impl PrimitiveKind {
    pub fn from_name(name: &str) -> Option<Self> {
        PRIMITIVE_VALIDATORS.get(name).copied()
    }

    pub fn to_type(self) -> SynthType {
        match self {
            Self::Array => SynthType::Array(Box::new(SynthType::Unknown)),
            Self::Bool => SynthType::boolean(),
            Self::Func => SynthType::AnyFunction,
            Self::Number => SynthType::number(),
            Self::Object => SynthType::AnyObject,
            Self::String => SynthType::string(),
            Self::Symbol => SynthType::Primitive(crate::types::Primitive::Symbol),
            Self::Any => SynthType::union([
                SynthType::number(),
                SynthType::string(),
                SynthType::boolean(),
                SynthType::AnyObject,
            ]),
            Self::Node => SynthType::Renderable,
            Self::Element => SynthType::Element(None),
        }
    }
}

/// A prop validator, recursively composed.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorDescriptor {
    Primitive(PrimitiveKind),
    ArrayOf(Box<ValidatorDescriptor>),
    ObjectOf(Box<ValidatorDescriptor>),
    InstanceOf(CompactString),
    OneOf(Vec<Literal>),
    OneOfType(Vec<ValidatorDescriptor>),
    Shape(FxIndexMap<CompactString, ValidatorDescriptor>),
    Required(Box<ValidatorDescriptor>),
    /// Not a recognizable validator expression.
    Unresolved,
}

impl ValidatorDescriptor {
    /// Read a validator expression such as `React.PropTypes.string.isRequired`.
    pub fn from_expression(expr: &Expression<'_>, options: &PassOptions) -> Self {
        match unparenthesize(expr) {
            Expression::StaticMemberExpression(member) => {
                let property = member.property.name.as_str();
                if property == "isRequired" {
                    return match Self::from_expression(&member.object, options) {
                        Self::Unresolved => Self::Unresolved,
                        required @ Self::Required(_) => required,
                        inner => Self::Required(Box::new(inner)),
                    };
                }
                let in_namespace = qualified_name(&member.object)
                    .is_some_and(|ns| options.is_prop_types_namespace(&ns));
                match PrimitiveKind::from_name(property) {
                    Some(kind) if in_namespace => Self::Primitive(kind),
                    _ => Self::Unresolved,
                }
            }
            Expression::CallExpression(call) => {
                let Some(callee) = qualified_name(&call.callee) else {
                    return Self::Unresolved;
                };
                let Some((ns, builder)) = callee.rsplit_once('.') else {
                    return Self::Unresolved;
                };
                if !options.is_prop_types_namespace(ns) {
                    return Self::Unresolved;
                }
                let Some(arg) = call.arguments.first().and_then(|a| a.as_expression()) else {
                    return Self::Unresolved;
                };
                Self::from_builder(builder, unparenthesize(arg), options)
            }
            _ => Self::Unresolved,
        }
    }

    fn from_builder(builder: &str, arg: &Expression<'_>, options: &PassOptions) -> Self {
        match (builder, arg) {
            ("arrayOf", _) => Self::ArrayOf(Box::new(Self::from_expression(arg, options))),
            ("objectOf", _) => Self::ObjectOf(Box::new(Self::from_expression(arg, options))),
            ("instanceOf", _) => match qualified_name(arg) {
                Some(name) => Self::InstanceOf(name),
                None => Self::Unresolved,
            },
            ("oneOf", Expression::ArrayExpression(arr)) => {
                let mut values = Vec::with_capacity(arr.elements.len());
                for element in &arr.elements {
                    match element.as_expression().map(unparenthesize) {
                        Some(Expression::StringLiteral(s)) => {
                            values.push(Literal::Str(s.value.as_str().into()))
                        }
                        Some(Expression::NumericLiteral(n)) => values.push(Literal::number(n.value)),
                        Some(Expression::BooleanLiteral(b)) => values.push(Literal::Bool(b.value)),
                        _ => return Self::Unresolved,
                    }
                }
                Self::OneOf(values)
            }
            ("oneOfType", Expression::ArrayExpression(arr)) => {
                let mut types = Vec::with_capacity(arr.elements.len());
                for element in &arr.elements {
                    let Some(expr) = element.as_expression() else {
                        return Self::Unresolved;
                    };
                    types.push(Self::from_expression(expr, options));
                }
                Self::OneOfType(types)
            }
            ("shape", Expression::ObjectExpression(obj)) => {
                let mut fields = FxIndexMap::default();
                for property in &obj.properties {
                    let ObjectPropertyKind::ObjectProperty(p) = property else {
                        return Self::Unresolved;
                    };
                    let Some(key) = property_key_name(&p.key) else {
                        return Self::Unresolved;
                    };
                    fields.insert(key, Self::from_expression(&p.value, options));
                }
                Self::Shape(fields)
            }
            _ => Self::Unresolved,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required(_))
    }

    /// Whether the outermost validator (under `isRequired`) was understood.
    pub fn is_resolved(&self) -> bool {
        match self {
            Self::Required(inner) => inner.is_resolved(),
            Self::Unresolved => false,
            _ => true,
        }
    }

    /// The field type this validator admits.
    pub fn to_type(&self) -> SynthType {
        match self {
            Self::Primitive(kind) => kind.to_type(),
            Self::ArrayOf(inner) => SynthType::Array(Box::new(inner.to_type())),
            Self::ObjectOf(inner) => SynthType::Map(Box::new(inner.to_type())),
            Self::InstanceOf(name) => SynthType::Named(name.clone()),
            Self::OneOf(values) => {
                SynthType::union(values.iter().cloned().map(SynthType::Literal))
            }
            Self::OneOfType(types) => SynthType::union(types.iter().map(Self::to_type)),
            Self::Shape(fields) => {
                let mut record = Record::new();
                for (name, validator) in fields {
                    record = record.with_field(
                        name.clone(),
                        validator.to_type(),
                        !validator.is_required(),
                    );
                }
                SynthType::Record(record)
            }
            Self::Required(inner) => inner.to_type(),
            Self::Unresolved => SynthType::Unknown,
        }
    }
}
