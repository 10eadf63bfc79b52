//! # tessera_croquis
//!
//! Croquis - The semantic analysis layer for Tessera.
//!
//! ## Name Origin
//!
//! **Croquis** (/kʁɔ.ki/) is a French term for a quick, sketchy drawing that captures
//! the essential features of a subject. `tessera_croquis` sketches what a component
//! factory call will produce at runtime: which members it ends up with once its mixins
//! are folded in, what props it accepts, and what its instances look like.
//!
//! ## Purpose
//!
//! - **Collection**: record every class and mixin factory call bound to a name
//! - **Mixin Resolution**: flatten mixin graphs in dependency order, chaining lifecycle hooks
//! - **Synthesis**: build instance, props, state and constructor types per component
//! - **Scaffolding**: render the synthesized types as Closure-style declarations
//! - **Dead Factories**: mark unread factory calls side-effect-free
//!
//! ## Architecture
//!
//! ```text
//!   oxc_parser (Parse)
//!         ↓
//!   collect → CallRegistry
//!         ↓
//!   MixinResolver → ResolvedSurfaces
//!         ↓
//!   ComponentSynthesizer → TypeRegistry     ReferenceGraph → SideEffectFacts
//!         ↓
//!   tessera_canon (Check)
//! ```

pub mod collect;
pub mod factory;
pub mod jsdoc;
pub mod lifecycle;
pub mod nominal;
pub mod options;
pub mod references;
pub mod registry;
pub mod resolver;
pub mod scaffold;
pub mod surface;
pub mod synth;
pub mod syntax;
pub mod types;
pub mod validator;

pub use collect::collect_program;
pub use factory::{FactoryCall, FactoryId, FactoryKind, OpaqueReason};
pub use lifecycle::LifecycleHook;
pub use nominal::{ComponentType, MixinType, NominalRegistry, NominalType, TypeRegistry};
pub use options::PassOptions;
pub use references::{ReferenceGraph, SideEffectFacts};
pub use registry::CallRegistry;
pub use resolver::{MixinResolver, Resolution, ResolvedSurfaces, ResolverOutput};
pub use surface::MixinSurface;
pub use synth::{ComponentSynthesizer, SynthesisOutput};
pub use types::{is_assignable, Signature, SynthType};
