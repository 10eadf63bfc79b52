//! Checker-visible type model.
//!
//! Types are written in the Closure JSDoc dialect (`?`, `!Object`, `Array<T>`,
//! `function(number): string`) because that is what factory specifications are
//! annotated with.

use std::fmt;

use tessera_carton::{CompactString, FxIndexMap};

/// Scalar primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Number,
    String,
    Boolean,
    Symbol,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Symbol => "symbol",
        }
    }
}

/// A literal value, as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Str(CompactString),
    /// Canonical numeric text.
    Num(CompactString),
    Bool(bool),
}

impl Literal {
    pub fn number(value: f64) -> Self {
        let text = if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            format!("{value}")
        };
        Self::Num(text.into())
    }

    pub fn primitive(&self) -> Primitive {
        match self {
            Self::Str(_) => Primitive::String,
            Self::Num(_) => Primitive::Number,
            Self::Bool(_) => Primitive::Boolean,
        }
    }
}

/// A record field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub ty: SynthType,
    pub optional: bool,
}

/// A record type. Field order is declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub fields: FxIndexMap<CompactString, Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<CompactString>, ty: SynthType, optional: bool) -> Self {
        self.fields.insert(name.into(), Field { ty, optional });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Overlay `other`'s fields; later fields replace earlier ones.
    pub fn extend(&mut self, other: &Record) {
        for (name, field) in &other.fields {
            self.fields.insert(name.clone(), field.clone());
        }
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: CompactString,
    pub ty: SynthType,
    pub optional: bool,
    pub rest: bool,
}

/// A function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub returns: SynthType,
}

impl Signature {
    pub fn new(params: Vec<Param>, returns: SynthType) -> Self {
        Self { params, returns }
    }

    /// Number of arguments a call must pass.
    pub fn min_arity(&self) -> usize {
        self.params
            .iter()
            .take_while(|p| !p.optional && !p.rest)
            .count()
    }

    /// Number of arguments a call may pass, `None` for variadic.
    pub fn max_arity(&self) -> Option<usize> {
        if self.params.iter().any(|p| p.rest) {
            None
        } else {
            Some(self.params.len())
        }
    }

    /// Parameter accepting the argument at `index`.
    pub fn param_for(&self, index: usize) -> Option<&Param> {
        self.params
            .get(index)
            .or_else(|| self.params.last().filter(|p| p.rest))
    }
}

/// A type as seen by the usage checker.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthType {
    /// Unconstrained; nothing is checked against it.
    Unknown,
    Primitive(Primitive),
    Literal(Literal),
    Null,
    Undefined,
    Array(Box<SynthType>),
    /// String-keyed map with uniform values.
    Map(Box<SynthType>),
    Record(Record),
    Union(Vec<SynthType>),
    Function(Box<Signature>),
    /// Any function (`!Function`).
    AnyFunction,
    /// Any object (`!Object`).
    AnyObject,
    /// A nominal type by name.
    Named(CompactString),
    /// The constructor of a named component.
    Constructor(CompactString),
    /// An element, optionally of a known component.
    Element(Option<CompactString>),
    /// The recursive renderable child union.
    Renderable,
}

impl SynthType {
    pub fn number() -> Self {
        Self::Primitive(Primitive::Number)
    }

    pub fn string() -> Self {
        Self::Primitive(Primitive::String)
    }

    pub fn boolean() -> Self {
        Self::Primitive(Primitive::Boolean)
    }

    /// Build a union, flattening nested unions and dropping duplicates.
    pub fn union(members: impl IntoIterator<Item = SynthType>) -> Self {
        let mut flat: Vec<SynthType> = Vec::new();
        for member in members {
            match member {
                Self::Union(inner) => {
                    for m in inner {
                        if !flat.contains(&m) {
                            flat.push(m);
                        }
                    }
                }
                Self::Unknown => return Self::Unknown,
                m => {
                    if !flat.contains(&m) {
                        flat.push(m);
                    }
                }
            }
        }
        match flat.len() {
            0 => Self::Unknown,
            1 => flat.pop().unwrap_or(Self::Unknown),
            _ => Self::Union(flat),
        }
    }

    pub fn nullable(self) -> Self {
        Self::union([self, Self::Null])
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Whether `null` or `undefined` inhabit this type.
    pub fn admits_nullish(&self) -> bool {
        match self {
            Self::Unknown | Self::Null | Self::Undefined => true,
            Self::Union(members) => members.iter().any(Self::admits_nullish),
            _ => false,
        }
    }

    /// The type without `null`/`undefined` members.
    pub fn non_nullish(&self) -> SynthType {
        match self {
            Self::Union(members) => SynthType::union(
                members
                    .iter()
                    .filter(|m| !matches!(m, Self::Null | Self::Undefined))
                    .cloned(),
            ),
            other => other.clone(),
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<Primitive> for SynthType {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Num(n) => f.write_str(n),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("function(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if param.rest {
                write!(f, "...{}", param.ty)?;
            } else if param.optional {
                write!(f, "{}=", param.ty)?;
            } else {
                write!(f, "{}", param.ty)?;
            }
        }
        write!(f, "): {}", self.returns)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, field)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if field.optional && !field.ty.admits_nullish() {
                let widened = SynthType::union([field.ty.clone(), SynthType::Undefined]);
                write!(f, "{name}: {widened}")?;
            } else {
                write!(f, "{name}: {}", field.ty)?;
            }
        }
        f.write_str("}")
    }
}

impl fmt::Display for SynthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("?"),
            Self::Primitive(p) => f.write_str(p.name()),
            Self::Literal(l) => write!(f, "{l}"),
            Self::Null => f.write_str("null"),
            Self::Undefined => f.write_str("undefined"),
            Self::Array(inner) => write!(f, "Array<{inner}>"),
            Self::Map(inner) => write!(f, "Object<string, {inner}>"),
            Self::Record(record) => write!(f, "{record}"),
            Self::Union(members) => {
                f.write_str("(")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{m}")?;
                }
                f.write_str(")")
            }
            Self::Function(sig) => write!(f, "{sig}"),
            Self::AnyFunction => f.write_str("!Function"),
            Self::AnyObject => f.write_str("!Object"),
            Self::Named(name) => f.write_str(name),
            Self::Constructor(name) => write!(f, "function(new:{name})"),
            Self::Element(Some(name)) => write!(f, "ReactElement<{name}>"),
            Self::Element(None) => f.write_str("ReactElement"),
            Self::Renderable => f.write_str("ReactChild"),
        }
    }
}

/// Whether a value of type `value` may be used where `target` is expected.
///
/// Unknown on either side is always compatible. Named types are compared by name only,
/// and unannotated objects are accepted wherever an object is expected.
pub fn is_assignable(value: &SynthType, target: &SynthType) -> bool {
    use SynthType as T;

    match (value, target) {
        (T::Unknown, _) | (_, T::Unknown) => true,
        (T::Union(members), _) => members.iter().all(|m| is_assignable(m, target)),
        (_, T::Union(members)) => members.iter().any(|m| is_assignable(value, m)),

        (T::Primitive(a), T::Primitive(b)) => a == b,
        (T::Literal(l), T::Primitive(p)) => l.primitive() == *p,
        (T::Literal(a), T::Literal(b)) => a == b,
        (T::Null, T::Null) | (T::Undefined, T::Undefined) => true,
        (T::Null, T::Named(_)) => true,

        (T::Array(a), T::Array(b)) | (T::Map(a), T::Map(b)) => is_assignable(a, b),
        (T::Record(r), T::Map(b)) => r.fields.values().all(|f| is_assignable(&f.ty, b)),
        (T::AnyObject, T::Array(_) | T::Map(_) | T::Record(_) | T::Named(_)) => true,
        (T::Record(value), T::Record(target)) => record_assignable(value, target),

        (T::Function(_) | T::AnyFunction | T::Constructor(_), T::Function(_) | T::AnyFunction) => {
            true
        }
        (
            T::Array(_)
            | T::Map(_)
            | T::Record(_)
            | T::AnyObject
            | T::Named(_)
            | T::Function(_)
            | T::AnyFunction
            | T::Constructor(_)
            | T::Element(_),
            T::AnyObject,
        ) => true,

        (T::Named(a), T::Named(b)) => a == b,
        (T::Constructor(a), T::Constructor(b)) => a == b,

        (T::Element(_), T::Element(None)) => true,
        (T::Element(a), T::Element(Some(b))) => a.as_ref().is_none_or(|a| a == b),

        (value, T::Renderable) => is_renderable(value),

        _ => false,
    }
}

fn record_assignable(value: &Record, target: &Record) -> bool {
    target.fields.iter().all(|(name, field)| match value.get(name) {
        Some(v) => is_assignable(&v.ty, &field.ty),
        None => field.optional,
    })
}

fn is_renderable(value: &SynthType) -> bool {
    match value {
        SynthType::Unknown
        | SynthType::Renderable
        | SynthType::Element(_)
        | SynthType::Null
        | SynthType::Undefined
        | SynthType::Literal(_) => true,
        SynthType::Primitive(p) => *p != Primitive::Symbol,
        SynthType::Array(inner) => is_renderable(inner),
        SynthType::Union(members) => members.iter().all(is_renderable),
        _ => false,
    }
}
