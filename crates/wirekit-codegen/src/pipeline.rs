//! Per-file generation pipeline
//!
//! Ties the stages together for one source file at a time:
//! gate → parse → scan → synthesize → render → write. Batches run
//! sequentially; a file that fails to parse aborts only that file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use wirekit_core::{CachedParser, Config};

use crate::checksum::{Decision, Reason, RegenerationGate, content_hash};
use crate::classifiers::{ClassifierRegistry, SynthesisContext};
use crate::codecs::CodecRegistry;
use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::model::Warning;
use crate::resolver::Resolver;
use crate::scanner::{ScannedUnit, Scanner};
use crate::synthesis::Synthesizer;

/// Options for a generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Directory for artifacts; next to each source when `None`
    pub output_dir: Option<PathBuf>,

    /// Regenerate even when the checksum matches
    pub force: bool,

    /// Render but do not write
    pub dry_run: bool,
}

/// What happened to one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Checksum matched; nothing was scanned
    Skipped,
    /// Artifact written
    Generated,
    /// No valid handlers; nothing written
    NoHandlers,
    /// Artifact rendered but not written
    DryRun,
}

/// Result of processing one source file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// Source file
    pub source: PathBuf,
    /// Artifact path, whether or not it was written
    pub artifact: PathBuf,
    /// What happened
    pub status: FileStatus,
    /// Why the gate asked for regeneration
    pub reason: Option<Reason>,
    /// Handlers wrapped
    pub handlers: usize,
    /// Scanner warnings
    pub warnings: Vec<Warning>,
    /// Rendered artifact, when one was produced
    pub content: Option<String>,
}

/// A file that failed within a batch
#[derive(Debug)]
pub struct FileFailure {
    /// Source file
    pub source: PathBuf,
    /// What went wrong
    pub error: Error,
}

/// Results of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files processed, in input order
    pub outcomes: Vec<FileOutcome>,
    /// Files that failed
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    /// Number of outcomes with `status`
    pub fn count(&self, status: FileStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Whether every file was processed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The generation pipeline
pub struct Pipeline {
    config: Config,
    options: GenerateOptions,
    cache: CachedParser,
    scanner: Scanner,
    codecs: CodecRegistry,
    classifiers: ClassifierRegistry,
    generator: Generator,
}

impl Pipeline {
    /// Create a pipeline with built-in codecs and classifiers plus any
    /// codecs declared in `config`
    pub fn new(config: Config, options: GenerateOptions) -> Result<Self> {
        config.validate()?;
        let mut codecs = CodecRegistry::with_builtins(&config.runtime_crate);
        codecs.register_config(&config.codecs)?;

        Ok(Self {
            cache: CachedParser::default(),
            scanner: Scanner::new(),
            classifiers: ClassifierRegistry::with_builtins(),
            generator: Generator::new()?,
            codecs,
            config,
            options,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Codec registry, for registering codecs programmatically
    pub fn codecs_mut(&mut self) -> &mut CodecRegistry {
        &mut self.codecs
    }

    /// Classifier registry, for registering classifiers programmatically
    pub fn classifiers_mut(&mut self) -> &mut ClassifierRegistry {
        &mut self.classifiers
    }

    /// Artifact path for `source`: `<stem><suffix>.rs`
    pub fn artifact_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = format!("{}{}.rs", stem, self.config.output_suffix);
        match &self.options.output_dir {
            Some(dir) => dir.join(name),
            None => source.with_file_name(name),
        }
    }

    /// Parse and scan `source` without generating anything
    pub fn scan_file(&self, source: &Path) -> Result<ScannedUnit> {
        self.cache.invalidate(source);
        let unit = self.cache.parse(source)?;
        let mut resolver = Resolver::new(&self.cache);
        let scanned = self.scanner.scan(&unit, &mut resolver);
        debug!(
            source = %source.display(),
            handlers = scanned.handlers.len(),
            foreign_modules = resolver.loaded_modules(),
            "Scanned source"
        );
        Ok(scanned)
    }

    /// Why `source` needs regeneration, or `None` when its artifact is current
    ///
    /// A file without handlers never needs an artifact.
    pub fn check_file(&self, source: &Path) -> Result<Option<Reason>> {
        let bytes = read_source(source)?;
        let gate = RegenerationGate::new(false);
        match gate.decide(&bytes, &self.artifact_path(source)) {
            Decision::Skip => Ok(None),
            Decision::Regenerate(reason) => {
                let scanned = self.scan_file(source)?;
                Ok((!scanned.handlers.is_empty()).then_some(reason))
            }
        }
    }

    /// Run every stage for one source file
    pub fn process_file<P: AsRef<Path>>(&self, source: P) -> Result<FileOutcome> {
        let source = source.as_ref();
        let artifact = self.artifact_path(source);
        let bytes = read_source(source)?;

        let mut outcome = FileOutcome {
            source: source.to_path_buf(),
            artifact: artifact.clone(),
            status: FileStatus::Skipped,
            reason: None,
            handlers: 0,
            warnings: Vec::new(),
            content: None,
        };

        let gate = RegenerationGate::new(self.options.force);
        match gate.decide(&bytes, &artifact) {
            Decision::Skip => {
                debug!(source = %source.display(), "Artifact up to date");
                return Ok(outcome);
            }
            Decision::Regenerate(reason) => outcome.reason = Some(reason),
        }

        let scanned = self.scan_file(source)?;
        for warning in &scanned.warnings {
            warn!("{}", warning);
        }
        outcome.warnings = scanned.warnings;
        outcome.handlers = scanned.handlers.len();

        if scanned.handlers.is_empty() {
            debug!(source = %source.display(), "No handlers");
            outcome.status = FileStatus::NoHandlers;
            return Ok(outcome);
        }

        let ctx = SynthesisContext {
            codecs: &self.codecs,
            runtime: &self.config.runtime_crate,
        };
        let code = Synthesizer::new(&self.classifiers, ctx, self.config.multipart_max_memory)
            .unit(&scanned.handlers);
        let rendered = self
            .generator
            .render(&scanned.module, &content_hash(&bytes), code)?;

        if self.options.dry_run {
            outcome.status = FileStatus::DryRun;
        } else {
            write_artifact(&artifact, &rendered.content)?;
            info!(
                source = %source.display(),
                artifact = %artifact.display(),
                handlers = outcome.handlers,
                "Generated request wrappers"
            );
            outcome.status = FileStatus::Generated;
        }
        outcome.content = Some(rendered.content);
        Ok(outcome)
    }

    /// Process `sources` in order, collecting per-file failures
    pub fn process_all(&self, sources: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();
        for source in sources {
            match self.process_file(source) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(error) => {
                    warn!(source = %source.display(), %error, "Generation failed");
                    report.failures.push(FileFailure {
                        source: source.clone(),
                        error,
                    });
                }
            }
        }
        report
    }
}

/// Expand files and directories into sorted `.rs` sources, skipping
/// artifacts, hidden directories and `target/`
pub fn collect_sources(paths: &[PathBuf], suffix: &str) -> Result<Vec<PathBuf>> {
    let artifact_suffix = format!("{}.rs", suffix);
    let is_source = |path: &Path| {
        path.extension().is_some_and(|ext| ext == "rs")
            && !path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(&artifact_suffix))
    };

    let mut sources = Vec::new();
    for path in paths {
        if path.is_file() {
            if is_source(path) {
                sources.push(path.clone());
            }
            continue;
        }
        if !path.is_dir() {
            return Err(Error::SourceNotFound {
                path: path.display().to_string(),
            });
        }

        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !(e.file_type().is_dir()
                        && e.file_name()
                            .to_str()
                            .is_some_and(|name| name.starts_with('.') || name == "target"))
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_source(e.path()))
        {
            sources.push(entry.into_path());
        }
    }

    sources.sort();
    sources.dedup();
    Ok(sources)
}

fn read_source(source: &Path) -> Result<Vec<u8>> {
    std::fs::read(source).map_err(|err| {
        Error::Core(wirekit_core::Error::Read {
            path: source.display().to_string(),
            source: err,
        })
    })
}

fn write_artifact(path: &Path, content: &str) -> Result<()> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    };
    write().map_err(|source| Error::WriteArtifact {
        path: path.display().to_string(),
        source,
    })
}
