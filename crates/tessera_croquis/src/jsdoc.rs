//! JSDoc annotations.
//!
//! Only the tags that shape checker-visible types are read: `@param`, `@return(s)`,
//! `@type`, `@private` and `@abstract`. Type expressions use the Closure dialect.

use tessera_carton::CompactString;

use crate::types::{Literal, Param, Primitive, Record, Signature, SynthType};

/// A `@param` tag.
#[derive(Debug, Clone, PartialEq)]
pub struct JsDocParam {
    pub name: CompactString,
    pub ty: SynthType,
    pub optional: bool,
    pub rest: bool,
}

/// Parsed JSDoc block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsDoc {
    pub params: Vec<JsDocParam>,
    pub returns: Option<SynthType>,
    pub type_tag: Option<TypeTag>,
    pub private: bool,
}

/// A `@type` tag keeps the optional marker so record fields can use it.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeTag {
    pub ty: SynthType,
    pub optional: bool,
}

impl JsDoc {
    /// Parse the inner text of a `/** ... */` block.
    pub fn parse(content: &str) -> Self {
        let mut doc = JsDoc::default();

        for tag in split_tags(content) {
            let (name, rest) = match tag.split_once(char::is_whitespace) {
                Some((name, rest)) => (name, rest.trim()),
                None => (tag.as_str(), ""),
            };
            match name {
                "@param" => {
                    let Some((ty_text, after)) = braced(rest) else {
                        continue;
                    };
                    let param_name = after
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .trim_start_matches('[')
                        .trim_end_matches(']');
                    let parsed = TypeParser::new(ty_text).parse_param();
                    doc.params.push(JsDocParam {
                        name: param_name.into(),
                        ty: parsed.ty,
                        optional: parsed.optional,
                        rest: parsed.rest,
                    });
                }
                "@return" | "@returns" => {
                    if let Some((ty_text, _)) = braced(rest) {
                        doc.returns = Some(parse_type(ty_text));
                    }
                }
                "@type" | "@const" => {
                    if let Some((ty_text, _)) = braced(rest) {
                        let parsed = TypeParser::new(ty_text).parse_param();
                        doc.type_tag = Some(TypeTag {
                            ty: parsed.ty,
                            optional: parsed.optional,
                        });
                    }
                }
                "@private" => doc.private = true,
                _ => {}
            }
        }

        doc
    }

    /// Whether the block says anything about types.
    pub fn has_type_annotations(&self) -> bool {
        !self.params.is_empty() || self.returns.is_some() || self.type_tag.is_some()
    }

    /// Build a signature for a function with the given parameter names.
    ///
    /// A `@type {function(...)}` tag wins; otherwise `@param` tags are matched by
    /// name and unmatched parameters stay unconstrained.
    pub fn signature_for(&self, param_names: &[CompactString], has_rest: bool) -> Option<Signature> {
        if let Some(TypeTag {
            ty: SynthType::Function(sig),
            ..
        }) = &self.type_tag
        {
            return Some((**sig).clone());
        }
        if self.params.is_empty() && self.returns.is_none() {
            return None;
        }

        let last = param_names.len().saturating_sub(1);
        let params = param_names
            .iter()
            .enumerate()
            .map(|(i, name)| match self.params.iter().find(|p| &p.name == name) {
                Some(p) => Param {
                    name: name.clone(),
                    ty: p.ty.clone(),
                    optional: p.optional,
                    rest: p.rest,
                },
                None => Param {
                    name: name.clone(),
                    ty: SynthType::Unknown,
                    optional: false,
                    rest: has_rest && i == last,
                },
            })
            .collect();

        Some(Signature::new(
            params,
            self.returns.clone().unwrap_or(SynthType::Unknown),
        ))
    }
}

/// Strip the `/**`, `*/` and leading `*` decoration from a block comment.
pub fn comment_content(raw: &str) -> &str {
    let raw = raw.trim();
    let raw = raw.strip_prefix("/**").unwrap_or(raw);
    raw.strip_suffix("*/").unwrap_or(raw)
}

fn split_tags(content: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim_start();
        let line = line.strip_prefix('*').unwrap_or(line).trim();
        for (i, piece) in split_inline_tags(line).into_iter().enumerate() {
            if piece.starts_with('@') {
                if let Some(tag) = current.take() {
                    tags.push(tag);
                }
                current = Some(piece.to_string());
            } else if let Some(tag) = current.as_mut() {
                tag.push(if i == 0 { '\n' } else { ' ' });
                tag.push_str(piece);
            }
        }
    }
    if let Some(tag) = current {
        tags.push(tag);
    }

    tags
}

/// Split `@param {a} x @return {b}` written on one line at tag boundaries outside braces.
fn split_inline_tags(line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let bytes = line.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            b'@' if depth == 0 && i > start && bytes[i - 1].is_ascii_whitespace() => {
                pieces.push(line[start..i].trim());
                start = i;
            }
            _ => {}
        }
    }
    pieces.push(line[start..].trim());
    pieces.retain(|p| !p.is_empty());
    pieces
}

/// Split `{type} rest` into the brace contents and what follows.
fn braced(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if !text.starts_with('{') {
        return None;
    }
    let mut depth = 0;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[1..i], text[i + 1..].trim_start()));
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a Closure type expression. Malformed input yields [`SynthType::Unknown`].
pub fn parse_type(text: &str) -> SynthType {
    TypeParser::new(text).parse_param().ty
}

struct ParsedParam {
    ty: SynthType,
    optional: bool,
    rest: bool,
}

struct TypeParser<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> TypeParser<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    fn parse_param(&mut self) -> ParsedParam {
        self.skip_ws();
        let rest = self.eat("...");
        let ty = self.parse_union().unwrap_or(SynthType::Unknown);
        self.skip_ws();
        let optional = self.eat("=");
        self.skip_ws();
        if self.pos < self.src.len() {
            return ParsedParam {
                ty: SynthType::Unknown,
                optional,
                rest,
            };
        }
        ParsedParam { ty, optional, rest }
    }

    fn parse_union(&mut self) -> Option<SynthType> {
        let mut members = vec![self.parse_prefixed()?];
        loop {
            self.skip_ws();
            if self.eat("|") {
                members.push(self.parse_prefixed()?);
            } else {
                break;
            }
        }
        Some(SynthType::union(members))
    }

    fn parse_prefixed(&mut self) -> Option<SynthType> {
        self.skip_ws();
        if self.eat("!") {
            return self.parse_primary();
        }
        if self.eat("?") {
            self.skip_ws();
            // A bare `?` is the unknown type.
            if self.at_end() || matches!(self.peek(), Some(',' | ')' | '>' | '}' | '|' | '=')) {
                return Some(SynthType::Unknown);
            }
            return Some(self.parse_primary()?.nullable());
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Option<SynthType> {
        self.skip_ws();
        match self.peek()? {
            '(' => {
                self.pos += 1;
                let ty = self.parse_union()?;
                self.skip_ws();
                self.expect(")")?;
                Some(ty)
            }
            '{' => self.parse_record(),
            '*' => {
                self.pos += 1;
                Some(SynthType::Unknown)
            }
            '"' | '\'' => self.parse_string_literal(),
            _ => {
                let name = self.ident()?;
                if name == "function" {
                    return self.parse_function();
                }
                let args = self.type_args()?;
                Some(named_type(name, args))
            }
        }
    }

    fn parse_record(&mut self) -> Option<SynthType> {
        self.expect("{")?;
        let mut record = Record::new();
        loop {
            self.skip_ws();
            if self.eat("}") {
                break;
            }
            let key = self.ident()?;
            self.skip_ws();
            let (ty, optional) = if self.eat(":") {
                let ty = self.parse_union()?;
                self.skip_ws();
                let optional = self.eat("=") || ty.admits_nullish();
                (ty, optional)
            } else {
                (SynthType::Unknown, true)
            };
            record = record.with_field(key, ty, optional);
            self.skip_ws();
            if !self.eat(",") {
                self.skip_ws();
                self.expect("}")?;
                break;
            }
        }
        Some(SynthType::Record(record))
    }

    fn parse_function(&mut self) -> Option<SynthType> {
        self.skip_ws();
        self.expect("(")?;
        let mut params = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(")") {
                break;
            }
            // `this:` and `new:` markers describe the receiver, not a parameter.
            let checkpoint = self.pos;
            if let Some(word) = self.ident() {
                if (word == "this" || word == "new") && self.eat(":") {
                    self.parse_union()?;
                    self.skip_ws();
                    if !self.eat(",") {
                        self.expect(")")?;
                        break;
                    }
                    continue;
                }
            }
            self.pos = checkpoint;

            let rest = self.eat("...");
            let ty = self.parse_union()?;
            self.skip_ws();
            let optional = self.eat("=");
            params.push(Param {
                name: format!("p{}", params.len()).into(),
                ty,
                optional,
                rest,
            });
            self.skip_ws();
            if !self.eat(",") {
                self.expect(")")?;
                break;
            }
        }
        self.skip_ws();
        let returns = if self.eat(":") {
            self.parse_prefixed()?
        } else {
            SynthType::Unknown
        };
        Some(SynthType::Function(Box::new(Signature::new(params, returns))))
    }

    fn parse_string_literal(&mut self) -> Option<SynthType> {
        let quote = self.peek()?;
        self.pos += 1;
        let start = self.pos;
        let end = self.src[start..].find(quote)? + start;
        self.pos = end + 1;
        Some(SynthType::Literal(Literal::Str(self.src[start..end].into())))
    }

    fn type_args(&mut self) -> Option<Vec<SynthType>> {
        self.skip_ws();
        let checkpoint = self.pos;
        self.eat(".");
        if !self.eat("<") {
            self.pos = checkpoint;
            return Some(Vec::new());
        }
        let mut args = Vec::new();
        loop {
            args.push(self.parse_union()?);
            self.skip_ws();
            if self.eat(">") {
                break;
            }
            self.expect(",")?;
        }
        Some(args)
    }

    fn ident(&mut self) -> Option<&'s str> {
        self.skip_ws();
        let start = self.pos;
        for (i, c) in self.src[start..].char_indices() {
            let ok = c.is_alphanumeric() || c == '_' || c == '$' || (c == '.' && i > 0);
            if !ok {
                break;
            }
            // Stop before `.<` so generic arguments stay with the name.
            if c == '.' && self.src[start + i + 1..].starts_with('<') {
                break;
            }
            self.pos = start + i + c.len_utf8();
        }
        (self.pos > start).then(|| &self.src[start..self.pos])
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.src[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Option<()> {
        self.skip_ws();
        self.eat(token).then_some(())
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }
}

fn named_type(name: &str, mut args: Vec<SynthType>) -> SynthType {
    match name {
        "number" => Primitive::Number.into(),
        "string" => Primitive::String.into(),
        "boolean" => Primitive::Boolean.into(),
        "symbol" => Primitive::Symbol.into(),
        "null" => SynthType::Null,
        "undefined" | "void" => SynthType::Undefined,
        "Function" => SynthType::AnyFunction,
        "Array" => SynthType::Array(Box::new(args.pop().unwrap_or(SynthType::Unknown))),
        "Object" if args.is_empty() => SynthType::AnyObject,
        "Object" => SynthType::Map(Box::new(args.pop().unwrap_or(SynthType::Unknown))),
        "ReactElement" => match args.pop() {
            Some(SynthType::Named(component)) => SynthType::Element(Some(component)),
            _ => SynthType::Element(None),
        },
        "ReactChild" | "ReactNode" => SynthType::Renderable,
        other => SynthType::Named(other.into()),
    }
}
