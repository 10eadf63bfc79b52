//! Declaration scaffolding.
//!
//! Renders synthesized types as Closure-style externs: one `@interface` per component
//! or mixin, typedefs for props, state and elements, and a declaration per static.
//! Output is for reading and diffing, not for feeding back into the pass.

use crate::nominal::{ComponentType, MethodSource, MixinType, NominalRegistry, NominalType};
use crate::types::{Signature, SynthType};

/// Render every registered type, in registration order.
pub fn render_declarations(types: &NominalRegistry) -> String {
    let mut out = String::new();
    for ty in types.types() {
        if !out.is_empty() {
            out.push('\n');
        }
        match ty {
            NominalType::Component(component) => out.push_str(&render_component(component)),
            NominalType::Mixin(mixin) => out.push_str(&render_mixin(mixin)),
        }
    }
    out
}

pub fn render_component(component: &ComponentType) -> String {
    let base = identifier(&component.name);
    let interface = component.interface_name();
    let mut ts = String::new();

    ts.push_str(&format!("// {}\n", component.name));
    ts.push_str("/**\n * @interface\n * @extends {ReactComponent}\n */\n");
    ts.push_str(&format!("function {interface}() {{}}\n\n"));

    ts.push_str(&format!("/** @type {{{base}Props}} */\n"));
    ts.push_str(&format!("{interface}.prototype.props;\n\n"));
    let state_type = if component.state.is_some() {
        format!("{base}State")
    } else {
        "?".to_string()
    };
    ts.push_str(&format!("/** @type {{{state_type}}} */\n"));
    ts.push_str(&format!("{interface}.prototype.state;\n\n"));

    for (name, ty) in &component.fields {
        ts.push_str(&format!("/** @type {{{ty}}} */\n"));
        ts.push_str(&format!("{interface}.prototype.{name};\n\n"));
    }
    for method in component.methods.values() {
        // Built-ins are declared on ReactComponent.
        if method.source == MethodSource::Builtin {
            continue;
        }
        ts.push_str(&method_stub(
            &interface,
            &method.name,
            method.signature.as_ref(),
            method.private,
        ));
    }

    ts.push_str(&format!(
        "/** @typedef {{{}}} */\nvar {base}Props;\n\n",
        component.props.to_record()
    ));
    if let Some(state) = &component.state {
        ts.push_str(&format!("/** @typedef {{{state}}} */\nvar {base}State;\n\n"));
    }
    ts.push_str(&format!(
        "/** @typedef {{{}}} */\nvar {base}Element;\n",
        component.element_type()
    ));

    for static_member in component.statics.values() {
        if static_member.origin.is_none() {
            continue;
        }
        ts.push_str(&format!(
            "\n/** @type {{{}}} */\n{}.{};\n",
            static_member.ty, component.name, static_member.name
        ));
    }
    ts
}

pub fn render_mixin(mixin: &MixinType) -> String {
    let interface = format!("{}Interface", identifier(&mixin.name));
    let mut ts = String::new();

    ts.push_str(&format!("// {} (mixin)\n", mixin.name));
    ts.push_str("/** @interface */\n");
    ts.push_str(&format!("function {interface}() {{}}\n"));
    for (name, signature) in &mixin.methods {
        ts.push('\n');
        let stub = method_stub(&interface, name, signature.as_ref(), false);
        ts.push_str(stub.trim_end());
        ts.push('\n');
    }
    for (name, ty) in &mixin.statics {
        ts.push_str(&format!("\n/** @type {{{ty}}} */\n{}.{name};\n", mixin.name));
    }
    ts
}

fn method_stub(interface: &str, name: &str, signature: Option<&Signature>, private: bool) -> String {
    let Some(signature) = signature else {
        let mut ts = String::from("/** @type {!Function}");
        if private {
            ts.push_str(" @private");
        }
        ts.push_str(&format!(" */\n{interface}.prototype.{name};\n\n"));
        return ts;
    };

    let mut ts = String::from("/**\n");
    let mut names = Vec::with_capacity(signature.params.len());
    for (i, param) in signature.params.iter().enumerate() {
        let param_name = if param.name.is_empty() {
            format!("p{i}")
        } else {
            param.name.to_string()
        };
        let ty = if param.rest {
            format!("...{}", param.ty)
        } else if param.optional {
            format!("{}=", param.ty)
        } else {
            param.ty.to_string()
        };
        let declared = if param.rest {
            "var_args".to_string()
        } else {
            param_name
        };
        ts.push_str(&format!(" * @param {{{ty}}} {declared}\n"));
        names.push(declared);
    }
    if !matches!(signature.returns, SynthType::Undefined) {
        ts.push_str(&format!(" * @return {{{}}}\n", signature.returns));
    }
    if private {
        ts.push_str(" * @private\n");
    }
    ts.push_str(" */\n");
    ts.push_str(&format!(
        "{interface}.prototype.{name} = function({}) {{}};\n\n",
        names.join(", ")
    ));
    ts
}

/// `ns.Button` becomes `ns_Button`.
fn identifier(name: &str) -> String {
    name.replace('.', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::FactoryId;
    use crate::nominal::{MethodType, PropField, PropsRecord, StaticType};
    use crate::types::{Param, Record};
    use tessera_carton::{FileId, FxIndexMap, Site};

    fn counter() -> ComponentType {
        let site = Site::new(FileId(0), 0, 7);
        let mut methods = FxIndexMap::default();
        methods.insert(
            "increment".into(),
            MethodType {
                name: "increment".into(),
                signature: Some(Signature::new(
                    vec![Param {
                        name: "by".into(),
                        ty: SynthType::number(),
                        optional: true,
                        rest: false,
                    }],
                    SynthType::Undefined,
                )),
                source: MethodSource::Defined(FactoryId(0)),
                site: Some(site),
                private: false,
            },
        );
        methods.insert(
            "setState".into(),
            MethodType {
                name: "setState".into(),
                signature: None,
                source: MethodSource::Builtin,
                site: None,
                private: false,
            },
        );
        let mut props = PropsRecord {
            declared: true,
            ..PropsRecord::default()
        };
        props.fields.insert(
            "start".into(),
            PropField {
                ty: SynthType::number(),
                required: true,
                has_default: false,
                site: None,
            },
        );
        let mut statics = FxIndexMap::default();
        statics.insert(
            "step".into(),
            StaticType {
                name: "step".into(),
                ty: SynthType::number(),
                origin: Some(FactoryId(0)),
                site: Some(site),
            },
        );
        ComponentType {
            id: FactoryId(0),
            name: "Counter".into(),
            site,
            methods,
            fields: FxIndexMap::default(),
            props,
            state: Some(Record::new().with_field("count", SynthType::number(), false)),
            statics,
            hooks: Vec::new(),
            pure_render: false,
        }
    }

    #[test]
    fn test_render_component() {
        insta::assert_snapshot!(render_component(&counter()), @r#"
        // Counter
        /**
         * @interface
         * @extends {ReactComponent}
         */
        function CounterInterface() {}

        /** @type {CounterProps} */
        CounterInterface.prototype.props;

        /** @type {CounterState} */
        CounterInterface.prototype.state;

        /**
         * @param {number=} by
         */
        CounterInterface.prototype.increment = function(by) {};

        /** @typedef {{start: number}} */
        var CounterProps;

        /** @typedef {{count: number}} */
        var CounterState;

        /** @typedef {ReactElement<Counter>} */
        var CounterElement;

        /** @type {number} */
        Counter.step;
        "#);
    }

    #[test]
    fn test_qualified_names_and_unannotated_methods() {
        let mut component = counter();
        component.name = "ui.Counter".into();
        component.state = None;
        component.methods.get_mut("increment").unwrap().signature = None;
        let text = render_component(&component);
        assert!(text.contains("function ui_CounterInterface() {}"));
        assert!(text.contains("/** @type {?} */\nui_CounterInterface.prototype.state;"));
        assert!(text.contains("/** @type {!Function} */\nui_CounterInterface.prototype.increment;"));
        assert!(text.contains("var ui_CounterElement;"));
        assert!(!text.contains("var ui_CounterState;"));
    }

    #[test]
    fn test_render_mixin() {
        let mut methods = FxIndexMap::default();
        methods.insert(
            "focus".into(),
            Some(Signature::new(Vec::new(), SynthType::boolean())),
        );
        let mixin = MixinType {
            id: FactoryId(1),
            name: "Focusable".into(),
            site: Site::new(FileId(0), 0, 9),
            methods,
            statics: FxIndexMap::default(),
        };
        let text = render_mixin(&mixin);
        assert!(text.starts_with("// Focusable (mixin)\n/** @interface */\nfunction FocusableInterface() {}\n"));
        assert!(text.contains(" * @return {boolean}\n */\nFocusableInterface.prototype.focus = function() {};\n"));
    }
}
