//! # Tessera
//!
//! Type synthesis and checking for React class and mixin factories.
//!
//! ## Name Origin
//!
//! **Tessera** (/ˈtɛsərə/) is a single tile of a mosaic. A component assembled with
//! `createClass` is a mosaic of its own specification and every mixin it pulls in;
//! tessera works out the finished picture so each use of the component can be checked.
//!
//! This crate drives the whole pass over one compilation and re-exports the layers.
//!
//! ## Crates
//!
//! - [`carton`] - Shared toolbox: sites, diagnostics, name suggestions
//! - [`croquis`] - Collection, mixin resolution, synthesis, dead-factory signal
//! - [`canon`] - Usage-site checking and the host diagnostic guard

pub mod config;
pub mod error;

/// Shared toolbox: sites, diagnostics, name suggestions.
pub use tessera_carton as carton;

/// Collection, mixin resolution, synthesis, dead-factory signal.
pub use tessera_croquis as croquis;

/// Usage-site checking and the host diagnostic guard.
pub use tessera_canon as canon;

pub use error::{TesseraError, TesseraResult};

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use tessera_canon::{check_program, CheckResult, DiagnosticGuard};
use tessera_carton::{CompactString, Diagnostic, FileId, Site, SourceFiles};
use tessera_croquis::scaffold::render_declarations;
use tessera_croquis::{
    collect_program, CallRegistry, ComponentSynthesizer, MixinResolver, NominalRegistry,
    PassOptions, ReferenceGraph, SideEffectFacts, TypeRegistry,
};

/// One compilation: a set of source files checked together.
///
/// Factory calls are collected from every file before any mixin is resolved, so a
/// component may use a mixin declared later or in another file.
#[derive(Debug, Default)]
pub struct Compilation {
    options: PassOptions,
    files: SourceFiles,
}

impl Compilation {
    pub fn new(options: PassOptions) -> Self {
        Self {
            options,
            files: SourceFiles::new(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<CompactString>, text: impl Into<String>) -> FileId {
        self.files.add(name, text)
    }

    pub fn files(&self) -> &SourceFiles {
        &self.files
    }

    pub fn options(&self) -> &PassOptions {
        &self.options
    }

    /// Run every stage over all files.
    pub fn run(&self) -> TesseraResult<Analysis<'_>> {
        let allocator = Allocator::default();
        let mut programs = Vec::with_capacity(self.files.len());
        for file in self.files.iter() {
            let source_type = SourceType::mjs().with_jsx(true);
            let ret = Parser::new(&allocator, &file.text, source_type).parse();
            if ret.panicked || !ret.errors.is_empty() {
                let message = ret
                    .errors
                    .first()
                    .map_or_else(|| "unrecoverable syntax".to_string(), ToString::to_string);
                return Err(TesseraError::Parse {
                    file: file.name.to_string(),
                    message,
                });
            }
            programs.push((file, ret.program));
        }

        let mut result = CheckResult::new();

        let mut registry = CallRegistry::new();
        for (file, program) in &programs {
            collect_program(program, &file.text, file.id, &self.options, &mut registry);
        }
        registry.finish();
        result.extend(registry.take_diagnostics());
        tracing::info!(
            components = registry.components().count(),
            mixins = registry.mixins().count(),
            opaque = registry.opaque().len(),
            "collected factory calls"
        );

        let resolved = MixinResolver::new(&registry, &self.options).resolve();
        result.extend(resolved.diagnostics);

        let mut types = NominalRegistry::new();
        let synthesis =
            ComponentSynthesizer::new(&registry, &resolved.surfaces, &self.options).run(&mut types);
        result.extend(synthesis.diagnostics);

        let mut graph = ReferenceGraph::new();
        for (file, program) in &programs {
            graph.collect(program, file.id, &registry);
        }
        let facts = SideEffectFacts::compute(&registry, &graph);

        for (file, program) in &programs {
            let report = check_program(
                program,
                &file.text,
                file.id,
                &registry,
                &types,
                &self.options,
            );
            result.merge(report.result);
            for (site, ty) in report.attachments {
                types.attach(site, ty);
            }
        }

        tracing::info!(
            errors = result.error_count,
            warnings = result.warning_count,
            "compilation checked"
        );

        Ok(Analysis {
            compilation: self,
            result,
            registry,
            types,
            facts,
        })
    }
}

/// Everything one run produced.
#[derive(Debug)]
pub struct Analysis<'c> {
    compilation: &'c Compilation,
    /// Diagnostics of this pass, in stage order.
    pub result: CheckResult,
    pub registry: CallRegistry,
    pub types: NominalRegistry,
    pub facts: SideEffectFacts,
}

impl Analysis<'_> {
    /// Closure-style declarations of every synthesized type.
    pub fn declarations(&self) -> String {
        render_declarations(&self.types)
    }

    /// Filter a host checker's diagnostics through the guard.
    pub fn filter_host_diagnostics(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        DiagnosticGuard::new(
            &self.registry,
            &self.types,
            &self.compilation.files,
            &self.compilation.options,
        )
        .filter(diagnostics)
    }

    /// `file:line:col` of a site.
    pub fn location(&self, site: &Site) -> String {
        match self.compilation.files.get(site.file) {
            Some(file) => {
                let (line, col) = file.lines.line_col(site.start);
                format!("{}:{line}:{col}", file.name)
            }
            None => format!("<file {}>:{}", site.file.0, site.start),
        }
    }
}
