//! End-to-end tests over whole compilations.

use tessera::carton::{Diagnostic, DiagnosticCode, FileId, Site};
use tessera::croquis::{LifecycleHook, PassOptions, TypeRegistry};
use tessera::{Analysis, Compilation};

fn compile(sources: &[(&str, &str)]) -> Compilation {
    let mut compilation = Compilation::new(PassOptions::default());
    for (name, text) in sources {
        compilation.add_file(*name, *text);
    }
    compilation
}

fn codes(analysis: &Analysis<'_>) -> Vec<DiagnosticCode> {
    analysis.result.diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn hooks_chain_in_mixin_order_then_own() {
    let compilation = compile(&[(
        "app.js",
        r#"
var First = React.createMixin({ componentDidMount: function() {} });
var Second = React.createMixin({ componentDidMount: function() {} });
var App = React.createClass({
  mixins: [First, Second],
  componentDidMount: function() {},
  render: function() { return null; }
});
"#,
    )]);
    let analysis = compilation.run().unwrap();
    assert!(codes(&analysis).is_empty());

    let app = analysis.types.component("App").unwrap();
    let chain: Vec<&str> = app
        .hook_chain(LifecycleHook::ComponentDidMount)
        .iter()
        .map(|link| analysis.registry.get(link.origin).name.as_str())
        .collect();
    assert_eq!(chain, vec!["First", "Second", "App"]);
}

#[test]
fn sibling_collision_is_reported_once() {
    let compilation = compile(&[(
        "app.js",
        r#"
var Left = React.createMixin({ toggle: function() {} });
var Right = React.createMixin({ toggle: function() {} });
var Broken = React.createClass({ mixins: [Left, Right], render: function() { return null; } });
var Fixed = React.createClass({
  mixins: [Left, Right],
  toggle: function() {},
  render: function() { return null; }
});
"#,
    )]);
    let analysis = compilation.run().unwrap();
    assert_eq!(codes(&analysis), vec![DiagnosticCode::AmbiguousMixinMethod]);
    let message = &analysis.result.diagnostics[0].message;
    assert!(message.contains("`Left`") && message.contains("`Right`"), "{message}");

    // The broken component opts out; its sibling is still synthesized.
    assert!(analysis.types.component("Broken").is_none());
    assert!(analysis.types.component("Fixed").is_some());
}

#[test]
fn render_supplied_by_mixins() {
    let compilation = compile(&[(
        "app.js",
        r#"
var Renders = React.createMixin({ render: function() { return null; } });
var AlsoRenders = React.createMixin({ render: function() { return null; } });
var Single = React.createClass({ mixins: [Renders] });
var Double = React.createClass({ mixins: [Renders, AlsoRenders] });
"#,
    )]);
    let analysis = compilation.run().unwrap();
    assert_eq!(codes(&analysis), vec![DiagnosticCode::RenderConflict]);
    assert!(analysis.types.component("Single").is_some());
    assert!(analysis.types.component("Double").is_none());
}

#[test]
fn failed_mixin_propagates_to_dependents() {
    let compilation = compile(&[(
        "app.js",
        r#"
var Ping = React.createMixin({ mixins: [Pong] });
var Pong = React.createMixin({ mixins: [Ping] });
var User = React.createClass({ mixins: [Ping], render: function() { return null; } });
var Bystander = React.createClass({ render: function() { return null; } });
"#,
    )]);
    let analysis = compilation.run().unwrap();
    assert_eq!(
        codes(&analysis),
        vec![
            DiagnosticCode::CyclicMixin,
            DiagnosticCode::MixinSurfaceUnavailable
        ]
    );
    assert!(analysis.types.component("User").is_none());
    assert!(analysis.types.component("Bystander").is_some());
}

#[test]
fn required_props_at_element_construction() {
    let usage = r#"
React.createElement(Label, {});
React.createElement(Label, { label: 123 });
React.createElement(Label, { label: "ok" });
"#;
    let compilation = compile(&[
        (
            "label.js",
            r#"
var Label = React.createClass({
  propTypes: { label: React.PropTypes.string.isRequired },
  render: function() { return null; }
});
"#,
        ),
        ("use.js", usage),
    ]);
    let analysis = compilation.run().unwrap();
    assert_eq!(
        codes(&analysis),
        vec![
            DiagnosticCode::MissingRequiredProp,
            DiagnosticCode::PropTypeMismatch
        ]
    );
    assert_eq!(analysis.location(&analysis.result.diagnostics[0].site), "use.js:2:1");

    let call = r#"React.createElement(Label, { label: "ok" })"#;
    let start = usage.find(call).unwrap() as u32;
    let site = Site::new(FileId(1), start, start + call.len() as u32);
    assert_eq!(
        analysis.types.attached(&site).map(ToString::to_string),
        Some("ReactElement<Label>".to_string())
    );
}

#[test]
fn usage_checked_in_the_declaring_file() {
    let source = r#"
var Label = React.createClass({
  propTypes: { label: React.PropTypes.string.isRequired },
  statics: { find: function() {} },
  /** @param {number} by */
  grow: function(by) {},
  render: function() { return null; }
});
React.createElement(Label, {});
React.createElement(Label, { label: 123 });
Label.find();
Label.nope();
var inst = ReactDOM.render(React.createElement(Label, { label: "ok" }), root);
inst.grow('x');
"#;
    let compilation = compile(&[("label.js", source)]);
    let analysis = compilation.run().unwrap();
    assert_eq!(
        codes(&analysis),
        vec![
            DiagnosticCode::MissingRequiredProp,
            DiagnosticCode::PropTypeMismatch,
            DiagnosticCode::UnknownStatic,
            DiagnosticCode::ArgumentTypeMismatch,
        ]
    );
    assert_eq!(analysis.location(&analysis.result.diagnostics[2].site), "label.js:12:7");

    let call = r#"React.createElement(Label, { label: "ok" })"#;
    let start = source.find(call).unwrap() as u32;
    let site = Site::new(FileId(0), start, start + call.len() as u32);
    assert_eq!(
        analysis.types.attached(&site).map(ToString::to_string),
        Some("ReactElement<Label>".to_string())
    );
}

#[test]
fn instance_method_calls() {
    let compilation = compile(&[(
        "app.js",
        r#"
var Counter = React.createClass({
  /** @param {number} by */
  add: function(by) {},
  render: function() { return null; }
});
var counter = ReactDOM.render(React.createElement(Counter), root);
counter.add(1);
counter.add("one");
counter.reset();
"#,
    )]);
    let analysis = compilation.run().unwrap();
    assert_eq!(
        codes(&analysis),
        vec![
            DiagnosticCode::ArgumentTypeMismatch,
            DiagnosticCode::UnknownMethod
        ]
    );
    assert!(analysis.result.has_errors());
}

#[test]
fn unread_declarations_are_side_effect_free() {
    let compilation = compile(&[(
        "app.js",
        r#"
var Helper = React.createMixin({ help: function() {} });
var Unused = React.createClass({ mixins: [Helper], render: function() { return null; } });
var Used = React.createClass({ render: function() { return null; } });
ReactDOM.render(<Used />, root);
"#,
    )]);
    let analysis = compilation.run().unwrap();
    assert!(analysis.facts.is_side_effect_free("Helper"));
    assert!(analysis.facts.is_side_effect_free("Unused"));
    assert!(!analysis.facts.is_side_effect_free("Used"));
}

#[test]
fn guard_output_is_an_ordered_subsequence() {
    let source = r#"
var Box = React.createClass({
  componentDidMount: function() { this.setState({}); },
  render: function() { return null; }
});
"#;
    let compilation = compile(&[("box.js", source)]);
    let analysis = compilation.run().unwrap();

    let this_at = source.find("this.setState").unwrap() as u32;
    let inside = Site::new(FileId(0), this_at, this_at + 4);
    let outside = Site::new(FileId(0), 0, 1);
    let input = vec![
        Diagnostic::warning(DiagnosticCode::Other, "a", outside),
        Diagnostic::warning(DiagnosticCode::DangerousThisUsage, "dangerous use of this", inside),
        Diagnostic::warning(DiagnosticCode::DangerousThisUsage, "b", outside),
        Diagnostic::error(
            DiagnosticCode::InexistentProperty,
            "Property setState never defined on BoxInterface",
            outside,
        ),
        Diagnostic::error(DiagnosticCode::TypeMismatch, "c", outside),
    ];

    let kept = analysis.filter_host_diagnostics(input.clone());
    let messages: Vec<&str> = kept.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["a", "b", "c"]);

    let mut rest = input.iter();
    assert!(kept.iter().all(|d| rest.any(|i| i == d)));
}

#[test]
fn runs_are_deterministic() {
    let sources = [(
        "app.js",
        r#"
var A = React.createMixin({ componentWillMount: function() {}, a: function() {} });
var B = React.createMixin({ mixins: [A], b: function() {} });
var C = React.createClass({ mixins: [B, A], render: function() { return null; } });
var D = React.createClass({
  propTypes: { size: React.PropTypes.oneOf(['s', 'm']) },
  render: function() { return null; }
});
"#,
    )];
    let first = compile(&sources);
    let second = compile(&sources);
    let (first, second) = (first.run().unwrap(), second.run().unwrap());
    assert_eq!(first.declarations(), second.declarations());
    assert_eq!(first.result.diagnostics, second.result.diagnostics);

    let mut parallel = Compilation::new(PassOptions {
        parallel_synthesis: true,
        ..PassOptions::default()
    });
    parallel.add_file(sources[0].0, sources[0].1);
    assert_eq!(parallel.run().unwrap().declarations(), first.declarations());
}

#[test]
fn emitted_declarations() {
    let compilation = compile(&[(
        "app.js",
        r#"
var Greeting = React.createClass({
  propTypes: { name: React.PropTypes.string.isRequired },
  /** @return {string} */
  message: function() { return 'hi'; },
  render: function() { return null; }
});
"#,
    )]);
    let analysis = compilation.run().unwrap();
    let text = analysis.declarations();
    assert!(text.contains("function GreetingInterface() {}"));
    assert!(text.contains("var GreetingProps;"));
    assert!(text.contains("/** @typedef {ReactElement<Greeting>} */"));
    assert!(text.contains("GreetingInterface.prototype.message = function() {};"));
}
