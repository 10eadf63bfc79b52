//! Lifecycle hooks and the fixed component method catalogue.
//!
//! Lifecycle hooks are chained across mixins instead of overridden. The standard
//! component methods have fixed signatures that apply whenever a definition carries
//! no annotation of its own.

use once_cell::sync::Lazy;
use phf::phf_map;
use tessera_carton::FxHashMap;

use crate::jsdoc::parse_type;
use crate::types::{Signature, SynthType};

/// A chained lifecycle hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecycleHook {
    GetDefaultProps,
    GetInitialState,
    ComponentWillMount,
    ComponentDidMount,
    ComponentWillReceiveProps,
    ComponentWillUpdate,
    ComponentDidUpdate,
    ComponentWillUnmount,
    Render,
}

static LIFECYCLE_HOOKS: phf::Map<&'static str, LifecycleHook> = phf_map! {
    "getDefaultProps" => LifecycleHook::GetDefaultProps,
    "getInitialState" => LifecycleHook::GetInitialState,
    "componentWillMount" => LifecycleHook::ComponentWillMount,
    "componentDidMount" => LifecycleHook::ComponentDidMount,
    "componentWillReceiveProps" => LifecycleHook::ComponentWillReceiveProps,
    "componentWillUpdate" => LifecycleHook::ComponentWillUpdate,
    "componentDidUpdate" => LifecycleHook::ComponentDidUpdate,
    "componentWillUnmount" => LifecycleHook::ComponentWillUnmount,
    "render" => LifecycleHook::Render,
};

impl LifecycleHook {
    pub const ALL: [LifecycleHook; 9] = [
        Self::GetDefaultProps,
        Self::GetInitialState,
        Self::ComponentWillMount,
        Self::ComponentDidMount,
        Self::ComponentWillReceiveProps,
        Self::ComponentWillUpdate,
        Self::ComponentDidUpdate,
        Self::ComponentWillUnmount,
        Self::Render,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        LIFECYCLE_HOOKS.get(name).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GetDefaultProps => "getDefaultProps",
            Self::GetInitialState => "getInitialState",
            Self::ComponentWillMount => "componentWillMount",
            Self::ComponentDidMount => "componentDidMount",
            Self::ComponentWillReceiveProps => "componentWillReceiveProps",
            Self::ComponentWillUpdate => "componentWillUpdate",
            Self::ComponentDidUpdate => "componentDidUpdate",
            Self::ComponentWillUnmount => "componentWillUnmount",
            Self::Render => "render",
        }
    }
}

/// Signatures of methods a component may implement.
const STANDARD_METHODS: &[(&str, &str)] = &[
    ("render", "function(): ?ReactElement"),
    ("getInitialState", "function(): ?"),
    ("getDefaultProps", "function(): ?"),
    ("componentWillMount", "function(): undefined"),
    ("componentDidMount", "function(): undefined"),
    ("componentWillReceiveProps", "function(?): undefined"),
    ("shouldComponentUpdate", "function(?, ?): boolean"),
    ("componentWillUpdate", "function(?, ?): undefined"),
    ("componentDidUpdate", "function(?, ?): undefined"),
    ("componentWillUnmount", "function(): undefined"),
];

/// Methods every component instance has without defining them.
const INSTANCE_API: &[(&str, &str)] = &[
    ("setState", "function((!Object|!Function), !Function=): undefined"),
    ("replaceState", "function(!Object, !Function=): undefined"),
    ("setProps", "function(!Object, !Function=): undefined"),
    ("replaceProps", "function(!Object, !Function=): undefined"),
    ("forceUpdate", "function(!Function=): undefined"),
    ("isMounted", "function(): boolean"),
    ("getDOMNode", "function(): Element"),
];

fn signature_table(entries: &[(&'static str, &str)]) -> FxHashMap<&'static str, Signature> {
    entries
        .iter()
        .filter_map(|(name, text)| match parse_type(text) {
            SynthType::Function(sig) => Some((*name, *sig)),
            _ => None,
        })
        .collect()
}

static STANDARD_SIGNATURES: Lazy<FxHashMap<&'static str, Signature>> =
    Lazy::new(|| signature_table(STANDARD_METHODS));

static INSTANCE_SIGNATURES: Lazy<FxHashMap<&'static str, Signature>> =
    Lazy::new(|| signature_table(INSTANCE_API));

/// Fixed signature of a standard component method.
pub fn standard_signature(name: &str) -> Option<&'static Signature> {
    STANDARD_SIGNATURES.get(name)
}

/// Signature of a built-in instance method.
pub fn instance_api(name: &str) -> Option<&'static Signature> {
    INSTANCE_SIGNATURES.get(name)
}

/// Names of the built-in instance methods, in declaration order.
pub fn instance_api_names() -> impl Iterator<Item = &'static str> {
    INSTANCE_API.iter().map(|(name, _)| *name)
}

/// Names of the standard component methods, in declaration order.
pub fn standard_method_names() -> impl Iterator<Item = &'static str> {
    STANDARD_METHODS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_lookup() {
        assert_eq!(
            LifecycleHook::from_name("componentDidMount"),
            Some(LifecycleHook::ComponentDidMount)
        );
        assert_eq!(LifecycleHook::from_name("shouldComponentUpdate"), None);
        for hook in LifecycleHook::ALL {
            assert_eq!(LifecycleHook::from_name(hook.name()), Some(hook));
        }
    }

    #[test]
    fn test_standard_signatures_parse() {
        assert_eq!(standard_signature("shouldComponentUpdate").unwrap().min_arity(), 2);
        assert_eq!(
            standard_signature("render").unwrap().returns,
            SynthType::Element(None).nullable()
        );
        assert_eq!(standard_method_names().count(), STANDARD_SIGNATURES.len());
    }

    #[test]
    fn test_instance_api() {
        let set_state = instance_api("setState").unwrap();
        assert_eq!(set_state.min_arity(), 1);
        assert_eq!(set_state.max_arity(), Some(2));
        assert_eq!(instance_api_names().count(), INSTANCE_SIGNATURES.len());
        assert!(instance_api("render").is_none());

        let set_props = instance_api("setProps").unwrap();
        assert_eq!((set_props.min_arity(), set_props.max_arity()), (1, Some(2)));
        assert!(instance_api("replaceProps").is_some());
    }
}
