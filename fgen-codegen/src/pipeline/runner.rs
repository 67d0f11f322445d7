//! Pipeline orchestrator.

use std::{collections::HashMap, sync::Arc};

use eyre::{Result, bail, eyre};
use fgen_core::{FileId, Project, SourceFile};
use fgen_syntax::{CompilationUnit, parse, walk};
use log::{debug, error, info, warn};

use super::{CompilationContext, Diagnostic, FileOutcome, FileReport, GenerationReport, Phase};
use crate::{
    directive::{DirectiveMap, scan},
    emit::{Emitter, WriteStatus},
    generator::{GenerationContext, GenerationResult, Generator},
    registry::{GeneratorDescriptor, Registry},
};

/// Drives every registered generator over every file of a project.
///
/// Files are processed one at a time, in project order. For each file that
/// carries at least one directive, the generators run in registry order,
/// each consuming the text and tree produced by the last one that applied.
/// If any generator applied, the final text is handed to the [`Emitter`].
///
/// # Example
///
/// ```ignore
/// let report = Pipeline::new().run(&project)?;
///
/// for diag in report.warnings() {
///     eprintln!("warning: {}", diag.message);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    registry: Registry,
    emitter: Emitter,
}

/// The text and tree of one file as it moves through the generators.
struct FileState {
    text: String,
    tree: Arc<CompilationUnit>,
    expected_name: Option<String>,
    applied: Vec<&'static str>,
    diagnostics: Vec<Diagnostic>,
}

impl FileState {
    fn new(source: &SourceFile, tree: Arc<CompilationUnit>) -> Self {
        Self {
            text: source.content.clone(),
            tree,
            expected_name: None,
            applied: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// The state after `generator` produced `result`.
    fn apply(mut self, generator: &'static str, result: GenerationResult) -> Result<Self> {
        let GenerationResult::Generated(generated) = result else {
            return Ok(self);
        };
        let tree = match generated.tree {
            Some(tree) => tree,
            None => parse(&generated.source)
                .map_err(|e| eyre!("output does not parse (line {}): {}", e.line, e.message))?,
        };
        self.text = generated.source;
        self.tree = Arc::new(tree);
        if generated.expected_name.is_some() {
            self.expected_name = generated.expected_name;
        }
        self.applied.push(generator);
        self.diagnostics.extend(generated.diagnostics);
        Ok(self)
    }
}

struct GeneratorFailure {
    generator: &'static str,
    error: eyre::Report,
}

impl Pipeline {
    /// A pipeline with the builtin generators and default output layout.
    pub fn new() -> Self {
        Self {
            registry: Registry::builtin(),
            emitter: Emitter::default(),
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Generate and write artifacts for `project`.
    ///
    /// Problems with single files (parse errors, failing generators, paths
    /// that cannot be written) are recorded in the report and never stop
    /// the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the project has no build target.
    pub fn run(&self, project: &Project) -> Result<GenerationReport> {
        self.execute(project, false)
    }

    /// Same as [`run`](Pipeline::run) without writing anything.
    pub fn preview(&self, project: &Project) -> Result<GenerationReport> {
        self.execute(project, true)
    }

    fn execute(&self, project: &Project, dry_run: bool) -> Result<GenerationReport> {
        if project.build_targets().is_empty() {
            bail!("project `{}` has no target framework", project.name);
        }

        let ctx = CompilationContext::build(project);
        let mut report = GenerationReport::new(&project.name, dry_run);
        let mut emitted: HashMap<String, FileId> = HashMap::new();

        for (id, source) in project.files() {
            let location = source.path.display().to_string();
            let outcome = match ctx.tree(id) {
                Some(tree) => self.process(&ctx, id, source, tree, &mut report, dry_run),
                None => {
                    let message = ctx
                        .parse_error(id)
                        .map(|e| format!("line {}: {}", e.line, e.message))
                        .unwrap_or_else(|| "file was not parsed".to_string());
                    report.add_diagnostic(
                        Diagnostic::error(Phase::Parse, message.clone()).at(&location),
                    );
                    FileOutcome::ParseFailed { message }
                }
            };

            if let FileOutcome::Emitted { artifact, .. } = &outcome {
                if let Some(previous) = emitted.insert(artifact.file_name.clone(), id) {
                    let previous = project
                        .get(previous)
                        .map(|f| f.path.display().to_string())
                        .unwrap_or_default();
                    warn!("{} from {location} replaces the one from {previous}", artifact.file_name);
                    report.add_diagnostic(
                        Diagnostic::warning(
                            Phase::Emit,
                            format!("{} also generated from {previous}; this copy wins", artifact.file_name),
                        )
                        .at(&location),
                    );
                }
            }

            report.files.push(FileReport {
                file: id,
                path: source.path.clone(),
                outcome,
            });
        }

        info!(
            "{}: {} artifact(s), {} error(s), {} warning(s)",
            project.name,
            report.artifacts().count(),
            report.error_count(),
            report.warning_count()
        );
        Ok(report)
    }

    fn process(
        &self,
        ctx: &CompilationContext<'_>,
        id: FileId,
        source: &SourceFile,
        tree: &Arc<CompilationUnit>,
        report: &mut GenerationReport,
        dry_run: bool,
    ) -> FileOutcome {
        let location = source.path.display().to_string();

        let directives = scan(id, tree);
        for malformed in directives.malformed() {
            report.add_diagnostic(malformed.to_diagnostic(&location));
        }
        if directives.is_empty() {
            debug!("{location}: no directives");
            return FileOutcome::NoDirectives;
        }

        let state = match self.fold(ctx, id, source, tree, &directives) {
            Ok(state) => state,
            Err(failure) => {
                let message = format!("{:#}", failure.error);
                error!("{location}: generator `{}` failed: {message}", failure.generator);
                report.add_diagnostic(
                    Diagnostic::error(
                        Phase::Generate,
                        format!("generator `{}` failed: {message}", failure.generator),
                    )
                    .at(&location),
                );
                return FileOutcome::Failed {
                    generator: failure.generator.to_string(),
                    message,
                };
            }
        };

        for diagnostic in state.diagnostics {
            report.add_diagnostic(diagnostic.or_at(&location));
        }
        if state.applied.is_empty() {
            debug!("{location}: no generator applied");
            return FileOutcome::Skipped;
        }

        let name = state
            .expected_name
            .unwrap_or_else(|| source.stem().to_string());
        let artifact = match self.emitter.artifact(&name, &state.text) {
            Ok(artifact) => artifact,
            Err(e) => {
                let message = format!("{e:#}");
                error!("{location}: cannot emit `{name}`: {message}");
                report.add_diagnostic(Diagnostic::error(Phase::Emit, message.clone()).at(&location));
                return FileOutcome::Failed {
                    generator: state.applied.last().copied().unwrap_or_default().to_string(),
                    message,
                };
            }
        };

        let writes = if dry_run {
            self.emitter.plan(ctx.project(), &artifact)
        } else {
            self.emitter.write(ctx.project(), &artifact)
        };
        for write in &writes {
            if let WriteStatus::Failed(reason) = &write.status {
                report.add_diagnostic(
                    Diagnostic::error(Phase::Emit, format!("{} not written: {reason}", artifact.file_name))
                        .at(write.path.display().to_string()),
                );
            }
        }
        info!(
            "{location}: {} by {}",
            artifact.file_name,
            state.applied.join(", ")
        );

        FileOutcome::Emitted {
            artifact,
            generators: state.applied.iter().map(|g| g.to_string()).collect(),
            writes,
        }
    }

    /// Run every generator over one file, threading the state through.
    fn fold(
        &self,
        ctx: &CompilationContext<'_>,
        id: FileId,
        source: &SourceFile,
        tree: &Arc<CompilationUnit>,
        directives: &DirectiveMap,
    ) -> Result<FileState, GeneratorFailure> {
        let mut state = FileState::new(source, Arc::clone(tree));
        for descriptor in self.registry.descriptors() {
            let fail = |error| GeneratorFailure {
                generator: descriptor.name,
                error,
            };
            let result = {
                let cx = GenerationContext {
                    file: id,
                    source,
                    text: &state.text,
                    tree: &state.tree,
                    directives,
                    compilation: ctx,
                };
                run_generator(descriptor, &cx).map_err(fail)?
            };
            if result.is_skipped() {
                debug!("{}: skipped by `{}`", source.name, descriptor.name);
            }
            state = state.apply(descriptor.name, result).map_err(fail)?;
        }
        Ok(state)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn run_generator(
    descriptor: &GeneratorDescriptor,
    cx: &GenerationContext<'_>,
) -> Result<GenerationResult> {
    let mut generator: Box<dyn Generator> = descriptor.instantiate();
    generator.prepare(cx)?;
    walk(cx.tree, &mut |node, scope| generator.visit(node, scope));
    generator.generate()
}
