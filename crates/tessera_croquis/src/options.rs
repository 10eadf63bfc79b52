//! Pass options.

use serde::{Deserialize, Serialize};
use tessera_carton::CompactString;

/// Names and switches that shape what the pass recognizes.
///
/// Every field has a default matching the stock React API, so an empty JSON object
/// deserializes to a usable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PassOptions {
    /// Callees that create component classes.
    pub class_factories: Vec<CompactString>,
    /// Callees that create mixins.
    pub mixin_factories: Vec<CompactString>,
    /// Callees that construct elements.
    pub element_factories: Vec<CompactString>,
    /// Callees that mount an element and return the component instance.
    pub render_functions: Vec<CompactString>,
    /// Namespaces holding prop validators.
    pub prop_types_namespaces: Vec<CompactString>,
    /// Mixins provided by the library that implement `shouldComponentUpdate`.
    pub pure_render_mixins: Vec<CompactString>,
    /// File name suffixes of the UI library's own sources.
    pub library_sources: Vec<CompactString>,
    /// Check element construction against declared prop types.
    pub check_prop_types: bool,
    /// Synthesize components on the rayon thread pool.
    pub parallel_synthesis: bool,
}

impl Default for PassOptions {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<CompactString> {
            list.iter().map(|s| CompactString::new(s)).collect()
        }

        Self {
            class_factories: names(&["React.createClass", "createReactClass"]),
            mixin_factories: names(&["React.createMixin"]),
            element_factories: names(&["React.createElement"]),
            render_functions: names(&["ReactDOM.render", "React.render"]),
            prop_types_namespaces: names(&["React.PropTypes", "PropTypes"]),
            pure_render_mixins: names(&["React.addons.PureRenderMixin", "PureRenderMixin"]),
            library_sources: names(&[
                "react.js",
                "react.min.js",
                "react-dom.js",
                "react-dom.min.js",
                "react-dom-server.js",
                "react-dom-server.min.js",
                "react-with-addons.js",
                "react-with-addons.min.js",
            ]),
            check_prop_types: true,
            parallel_synthesis: false,
        }
    }
}

impl PassOptions {
    pub fn is_class_factory(&self, callee: &str) -> bool {
        contains(&self.class_factories, callee)
    }

    pub fn is_mixin_factory(&self, callee: &str) -> bool {
        contains(&self.mixin_factories, callee)
    }

    pub fn is_element_factory(&self, callee: &str) -> bool {
        contains(&self.element_factories, callee)
    }

    pub fn is_render_function(&self, callee: &str) -> bool {
        contains(&self.render_functions, callee)
    }

    pub fn is_prop_types_namespace(&self, name: &str) -> bool {
        contains(&self.prop_types_namespaces, name)
    }

    pub fn is_pure_render_mixin(&self, name: &str) -> bool {
        contains(&self.pure_render_mixins, name)
    }

    /// Whether a file path names one of the library's own sources.
    pub fn is_library_source(&self, path: &str) -> bool {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        contains(&self.library_sources, file_name)
    }
}

fn contains(list: &[CompactString], name: &str) -> bool {
    list.iter().any(|n| n == name)
}
