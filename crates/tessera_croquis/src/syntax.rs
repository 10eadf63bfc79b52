//! Small AST helpers shared by the collection and checking walks.

use oxc_ast::ast::{
    Expression, JSXElementName, JSXMemberExpression, JSXMemberExpressionObject,
    ObjectExpression, ObjectPropertyKind, PropertyKey,
};
use oxc_span::Span;
use tessera_carton::{CompactString, FileId, Site};

/// `a`, `a.b.c` for identifier and static member chains.
pub fn qualified_name(expr: &Expression<'_>) -> Option<CompactString> {
    match expr {
        Expression::Identifier(id) => Some(CompactString::new(id.name.as_str())),
        Expression::StaticMemberExpression(member) => {
            let mut name = qualified_name(&member.object)?;
            name.push('.');
            name.push_str(member.property.name.as_str());
            Some(name)
        }
        Expression::ParenthesizedExpression(paren) => qualified_name(&paren.expression),
        _ => None,
    }
}

/// `Comp` or `ns.Comp` for a JSX tag naming a component. Intrinsic tags are `None`.
pub fn jsx_element_name(name: &JSXElementName<'_>) -> Option<CompactString> {
    match name {
        JSXElementName::IdentifierReference(id) => Some(CompactString::new(id.name.as_str())),
        JSXElementName::MemberExpression(member) => jsx_member_name(member),
        _ => None,
    }
}

pub fn jsx_member_name(member: &JSXMemberExpression<'_>) -> Option<CompactString> {
    let mut name = match &member.object {
        JSXMemberExpressionObject::IdentifierReference(id) => CompactString::new(id.name.as_str()),
        JSXMemberExpressionObject::MemberExpression(inner) => jsx_member_name(inner)?,
        JSXMemberExpressionObject::ThisExpression(_) => return None,
    };
    name.push('.');
    name.push_str(member.property.name.as_str());
    Some(name)
}

/// Static name of an object key: `a`, `"a"` or `1`.
pub fn property_key_name(key: &PropertyKey<'_>) -> Option<CompactString> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(CompactString::new(id.name.as_str())),
        PropertyKey::StringLiteral(s) => Some(CompactString::new(s.value.as_str())),
        PropertyKey::NumericLiteral(n) => Some(CompactString::new(n.value.to_string())),
        _ => None,
    }
}

/// Strip parentheses.
pub fn unparenthesize<'e, 'a>(expr: &'e Expression<'a>) -> &'e Expression<'a> {
    match expr {
        Expression::ParenthesizedExpression(paren) => unparenthesize(&paren.expression),
        other => other,
    }
}

/// Whether the object literal contains a spread.
pub fn has_spread(obj: &ObjectExpression<'_>) -> bool {
    obj.properties
        .iter()
        .any(|p| matches!(p, ObjectPropertyKind::SpreadProperty(_)))
}

pub fn site(file: FileId, span: Span) -> Site {
    Site::new(file, span.start, span.end)
}

/// The JSDoc block immediately preceding `offset`, separated only by whitespace.
///
/// `comments` are sorted `(start, end)` ranges of block comments. Ranges may or may not
/// include the `/*` `*/` delimiters; both are accepted.
pub fn leading_jsdoc<'s>(source: &'s str, comments: &[(u32, u32)], offset: u32) -> Option<&'s str> {
    let idx = comments.partition_point(|&(_, end)| end <= offset);
    let &(start, end) = comments.get(idx.checked_sub(1)?)?;
    let (mut start, mut end) = (start as usize, end as usize);

    if !source.get(start..)?.starts_with("/*") {
        start = start.checked_sub(2)?;
        end += 2;
    }
    let text = source.get(start..end)?;
    if !text.starts_with("/**") || text.starts_with("/***") {
        return None;
    }
    let between = source.get(end..offset as usize)?;
    if !between.trim().is_empty() {
        return None;
    }
    Some(text)
}
