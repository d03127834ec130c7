//! Build Orchestrator - main application service.
//!
//! This service coordinates one code generation cycle per host event:
//! 1. Decide whether anything tracked changed
//! 2. Pre-build: ensure the workspace, track source models, run stage 1
//! 3. Generate: track archetypes, run stage 2 on the stage-1 artifact
//!
//! It implements the driving port (incoming) and uses driven ports (outgoing).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{Span, debug, error, field, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{
            BuildContext, BuildLifecycle, DependencySink, FileCollector, FileHandler,
            Filesystem, PreconditionChecker, ProcessRunner,
        },
    },
    domain::{
        BuildTrigger, CodegenOptions, DependencySet, DomainValidator as validator, Invocation,
        Stage, Toolchain, paths,
    },
    error::{CodegenError, CodegenResult},
};

/// Result of one `before_run` / `watch_run` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No tracked file changed; no process was started.
    Skipped,
    /// Both stages ran and exited 0.
    Regenerated(BuildTrigger),
}

/// Adapters the orchestrator drives.
pub struct OrchestratorPorts {
    pub runner: Box<dyn ProcessRunner>,
    pub collector: Box<dyn FileCollector>,
    pub filesystem: Box<dyn Filesystem>,
    pub environment: Box<dyn PreconditionChecker>,
}

/// Drives the two-stage toolchain from host lifecycle events.
///
/// Owns the [`DependencySet`] for its whole lifetime. The set only grows;
/// a fresh orchestrator starts with an empty one.
pub struct BuildOrchestrator {
    options: CodegenOptions,
    toolchain: Arc<Toolchain>,
    runner: Box<dyn ProcessRunner>,
    collector: Box<dyn FileCollector>,
    filesystem: Box<dyn Filesystem>,
    environment: Arc<dyn PreconditionChecker>,
    dependencies: Arc<Mutex<DependencySet>>,
    environment_checked: Mutex<bool>,
    in_flight: AtomicBool,
    cycles: AtomicU64,
}

impl BuildOrchestrator {
    /// Create an orchestrator. Fails if `options` are invalid.
    pub fn new(
        options: CodegenOptions,
        toolchain: Toolchain,
        ports: OrchestratorPorts,
    ) -> CodegenResult<Self> {
        validator::validate_options(&options)?;

        Ok(Self {
            options,
            toolchain: Arc::new(toolchain),
            runner: ports.runner,
            collector: ports.collector,
            filesystem: ports.filesystem,
            environment: Arc::from(ports.environment),
            dependencies: Arc::new(Mutex::new(DependencySet::new())),
            environment_checked: Mutex::new(false),
            in_flight: AtomicBool::new(false),
            cycles: AtomicU64::new(0),
        })
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Snapshot of the currently tracked files.
    pub fn dependencies(&self) -> CodegenResult<DependencySet> {
        Ok(self.lock_dependencies()?.clone())
    }

    pub fn workspace_dir(&self, project_root: &Path) -> PathBuf {
        paths::resolve(project_root, &self.options.gen_workspace)
    }

    /// Where stage 1 writes and stage 2 reads the intermediate artifact.
    pub fn artifact_path(&self, project_root: &Path) -> PathBuf {
        self.workspace_dir(project_root)
            .join(&self.options.prebuild_output)
    }

    /// Verify the toolchain runtime. Runs the checker at most once
    /// successfully; later calls return immediately.
    pub fn check_environment(&self) -> CodegenResult<()> {
        let mut checked = self.lock_environment_checked()?;
        if *checked {
            return Ok(());
        }

        if let Err(e) = self.environment.check() {
            error!(error = %e, "Toolchain precondition not met");
            return Err(e);
        }

        debug!("Toolchain preconditions satisfied");
        *checked = true;
        Ok(())
    }

    /// Run one cycle: decide, then pre-build and generate if needed.
    ///
    /// Rejects with `BuildInProgress` if another cycle is running on this
    /// orchestrator.
    #[instrument(
        skip_all,
        fields(
            cycle = field::Empty,
            watch = ctx.watch_mode,
            root = %ctx.project_root.display()
        )
    )]
    pub async fn execute_build(&self, ctx: &BuildContext) -> CodegenResult<CycleOutcome> {
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        Span::current().record("cycle", cycle);

        let _guard = CycleGuard::acquire(&self.in_flight)?;
        self.ensure_environment().await?;

        let trigger = {
            let dependencies = self.lock_dependencies()?;
            BuildTrigger::decide(ctx.watch_mode, &dependencies, &ctx.modified_files)
        };

        let Some(trigger) = trigger else {
            debug!(
                modified = ctx.modified_files.len(),
                "No tracked file changed, skipping code generation"
            );
            return Ok(CycleOutcome::Skipped);
        };

        debug!(%trigger, "Regenerating");
        self.prebuild(ctx).await?;
        self.generate(ctx).await?;

        Ok(CycleOutcome::Regenerated(trigger))
    }

    /// Number of `before_run` / `watch_run` events received so far.
    pub fn cycles_started(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Push every tracked path into the host's dependency graph.
    ///
    /// Only in watch mode; otherwise nothing is published and 0 is returned.
    pub fn publish_dependencies(
        &self,
        ctx: &BuildContext,
        sink: &mut dyn DependencySink,
    ) -> CodegenResult<usize> {
        if !ctx.watch_mode {
            return Ok(0);
        }

        let dependencies = self.lock_dependencies()?;
        for path in dependencies.iter() {
            sink.add_file_dependency(path);
        }

        debug!(count = dependencies.len(), "Published file dependencies");
        Ok(dependencies.len())
    }

    // -------------------------------------------------------------------------
    // Stages
    // -------------------------------------------------------------------------

    async fn prebuild(&self, ctx: &BuildContext) -> CodegenResult<()> {
        info!("Starting pre-build...");

        let workspace = self.workspace_dir(&ctx.project_root);
        self.filesystem.create_dir_all(&workspace).await?;

        let models = paths::resolve_all(&ctx.project_root, &self.options.source_models);

        // Rescan on every watch cycle so models added later get tracked.
        if ctx.watch_mode {
            self.track_models(&models).await?;
        }

        let invocation = self.toolchain.prebuild(
            &self.artifact_path(&ctx.project_root),
            &models,
            self.options.quiet.stdio(),
        );
        self.run_stage(Stage::Prebuild, invocation).await?;

        info!("Done.");
        Ok(())
    }

    async fn generate(&self, ctx: &BuildContext) -> CodegenResult<()> {
        info!("Starting code generation...");

        let archetypes = paths::resolve_all(&ctx.project_root, &self.options.archetypes);

        // Archetypes are leaf files, tracked as configured.
        if ctx.watch_mode {
            let added = self.lock_dependencies()?.extend(archetypes.iter().cloned());
            debug!(added, "Tracked archetypes");
        }

        let invocation = self.toolchain.generate(
            &self.artifact_path(&ctx.project_root),
            &archetypes,
            self.options.quiet.stdio(),
        );
        self.run_stage(Stage::Generate, invocation).await?;

        info!("Done.");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    async fn track_models(&self, models: &[PathBuf]) -> CodegenResult<()> {
        let before = self.lock_dependencies()?.len();

        for model in models {
            let toolchain = Arc::clone(&self.toolchain);
            let dependencies = Arc::clone(&self.dependencies);
            let handler: FileHandler = Arc::new(move |path: &Path| -> CodegenResult<()> {
                if toolchain.is_model(path) {
                    dependencies
                        .lock()
                        .map_err(|_| ApplicationError::StateLockError)?
                        .insert(path);
                }
                Ok(())
            });

            self.collector.for_each_file(model, handler).await?;
        }

        let after = self.lock_dependencies()?.len();
        debug!(added = after - before, tracked = after, "Tracked source models");
        Ok(())
    }

    async fn run_stage(&self, stage: Stage, invocation: Invocation) -> CodegenResult<()> {
        debug!(%stage, command = %invocation, "Launching toolchain");

        match self.runner.run(&invocation).await {
            Ok(_) => Ok(()),
            Err(CodegenError::Application(ApplicationError::ProcessExited {
                code, signal, ..
            })) => {
                error!(%stage, ?code, ?signal, "Toolchain stage failed");
                Err(ApplicationError::StageFailed {
                    stage,
                    code,
                    signal,
                }
                .into())
            }
            Err(e) => {
                error!(%stage, error = %e, "Toolchain stage could not run");
                Err(e)
            }
        }
    }

    /// Fallback for hosts that never fired `environment`. Checkers may launch
    /// processes, so the check runs on the blocking pool.
    async fn ensure_environment(&self) -> CodegenResult<()> {
        let checked = *self.lock_environment_checked()?;
        if checked {
            return Ok(());
        }

        let checker = Arc::clone(&self.environment);
        let result = match tokio::task::spawn_blocking(move || checker.check()).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                return Err(CodegenError::Internal {
                    message: format!("environment check was cancelled: {}", e),
                });
            }
        };
        if let Err(e) = result {
            error!(error = %e, "Toolchain precondition not met");
            return Err(e);
        }

        debug!("Toolchain preconditions satisfied");
        *self.lock_environment_checked()? = true;
        Ok(())
    }

    fn lock_environment_checked(&self) -> CodegenResult<MutexGuard<'_, bool>> {
        self.environment_checked
            .lock()
            .map_err(|_| ApplicationError::StateLockError.into())
    }

    fn lock_dependencies(&self) -> CodegenResult<MutexGuard<'_, DependencySet>> {
        self.dependencies
            .lock()
            .map_err(|_| ApplicationError::StateLockError.into())
    }
}

#[async_trait]
impl BuildLifecycle for BuildOrchestrator {
    fn environment(&self) -> CodegenResult<()> {
        self.check_environment()
    }

    async fn before_run(&self, ctx: &BuildContext) -> CodegenResult<CycleOutcome> {
        self.execute_build(ctx).await
    }

    async fn watch_run(&self, ctx: &BuildContext) -> CodegenResult<CycleOutcome> {
        self.execute_build(ctx).await
    }

    fn after_compile(
        &self,
        ctx: &BuildContext,
        sink: &mut dyn DependencySink,
    ) -> CodegenResult<usize> {
        self.publish_dependencies(ctx, sink)
    }
}

/// Holds the single in-flight slot for the duration of a cycle.
struct CycleGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> CycleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> CodegenResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self { flag })
            .map_err(|_| ApplicationError::BuildInProgress.into())
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use tokio::sync::Semaphore;

    use super::*;
    use crate::application::ports::output::{
        MockPreconditionChecker, MockProcessRunner, ProcessExit,
    };
    use crate::domain::OptionsOverrides;

    const ROOT: &str = "/p";
    const SCHEMA: &str = "/opt/xtumlgen/schema/schema.sql";

    // ── fakes ─────────────────────────────────────────────────────────────

    /// Records every launch; optionally fails the Nth one with an exit code.
    #[derive(Clone, Default)]
    struct RecordingRunner {
        calls: Arc<Mutex<Vec<Invocation>>>,
        fail_call: Option<(usize, i32)>,
    }

    impl RecordingRunner {
        fn failing(call: usize, code: i32) -> Self {
            Self {
                fail_call: Some((call, code)),
                ..Self::default()
            }
        }

        fn commands(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|i| i.to_string())
                .collect()
        }
    }

    #[async_trait]
    impl ProcessRunner for RecordingRunner {
        async fn run(&self, invocation: &Invocation) -> CodegenResult<ProcessExit> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(invocation.clone());
                calls.len() - 1
            };
            match self.fail_call {
                Some((call, code)) if call == index => Err(ApplicationError::ProcessExited {
                    program: invocation.program_name(),
                    code: Some(code),
                    signal: None,
                }
                .into()),
                _ => Ok(ProcessExit {
                    code: Some(0),
                    signal: None,
                }),
            }
        }
    }

    /// Serves a fixed file tree keyed by scan root.
    #[derive(Clone, Default)]
    struct TreeCollector {
        trees: Arc<Mutex<HashMap<PathBuf, Vec<PathBuf>>>>,
        scans: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl TreeCollector {
        fn with(self, root: &str, files: &[&str]) -> Self {
            self.trees.lock().unwrap().insert(
                PathBuf::from(root),
                files.iter().map(PathBuf::from).collect(),
            );
            self
        }

        fn scan_count(&self) -> usize {
            self.scans.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl FileCollector for TreeCollector {
        async fn for_each_file(&self, root: &Path, handler: FileHandler) -> CodegenResult<()> {
            self.scans.lock().unwrap().push(root.to_path_buf());
            let files = self.trees.lock().unwrap().get(root).cloned().ok_or_else(|| {
                CodegenError::from(ApplicationError::FilesystemError {
                    path: root.to_path_buf(),
                    reason: "No such file or directory".into(),
                })
            })?;
            for file in files {
                handler(&file)?;
            }
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingFilesystem {
        created: Arc<Mutex<Vec<PathBuf>>>,
    }

    #[async_trait]
    impl Filesystem for RecordingFilesystem {
        async fn create_dir_all(&self, path: &Path) -> CodegenResult<()> {
            self.created.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    /// Parks every launch until a permit is released.
    struct GatedRunner {
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl ProcessRunner for GatedRunner {
        async fn run(&self, _invocation: &Invocation) -> CodegenResult<ProcessExit> {
            self.gate.acquire().await.unwrap().forget();
            Ok(ProcessExit::default())
        }
    }

    fn satisfied_environment() -> Box<MockPreconditionChecker> {
        let mut environment = MockPreconditionChecker::new();
        environment.expect_check().returning(|| Ok(()));
        Box::new(environment)
    }

    fn scenario_options() -> CodegenOptions {
        CodegenOptions::from_overrides(OptionsOverrides {
            source_models: Some(vec!["models/a.xtuml".into()]),
            archetypes: Some(vec!["t/x.arc".into()]),
            gen_workspace: Some("out".into()),
            prebuild_output: Some("p.sql".into()),
            ..OptionsOverrides::default()
        })
        .unwrap()
    }

    fn orchestrator(
        options: CodegenOptions,
        runner: impl ProcessRunner + 'static,
        collector: TreeCollector,
        filesystem: RecordingFilesystem,
    ) -> BuildOrchestrator {
        BuildOrchestrator::new(
            options,
            Toolchain::bridgepoint(SCHEMA),
            OrchestratorPorts {
                runner: Box::new(runner),
                collector: Box::new(collector),
                filesystem: Box::new(filesystem),
                environment: satisfied_environment(),
            },
        )
        .unwrap()
    }

    fn tracked(orchestrator: &BuildOrchestrator) -> Vec<PathBuf> {
        orchestrator
            .dependencies()
            .unwrap()
            .iter()
            .map(Path::to_path_buf)
            .collect()
    }

    // ── first build ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn first_build_runs_both_stages_in_order() {
        let runner = RecordingRunner::default();
        let filesystem = RecordingFilesystem::default();
        let orch = orchestrator(
            scenario_options(),
            runner.clone(),
            TreeCollector::default(),
            filesystem.clone(),
        );

        let outcome = orch.before_run(&BuildContext::single_run(ROOT)).await.unwrap();

        assert_eq!(outcome, CycleOutcome::Regenerated(BuildTrigger::FirstBuild));
        assert_eq!(
            runner.commands(),
            vec![
                "python -m bridgepoint.prebuild -o /p/out/p.sql /p/models/a.xtuml".to_string(),
                format!(
                    "python -m rsl.gen_erate -nopersist -import {SCHEMA} \
                     -import /p/out/p.sql -arch /p/t/x.arc"
                ),
            ]
        );
        assert_eq!(*filesystem.created.lock().unwrap(), vec![PathBuf::from("/p/out")]);
    }

    #[tokio::test]
    async fn single_shot_build_tracks_nothing() {
        let collector = TreeCollector::default().with("/p/models/a.xtuml", &["/p/models/a.xtuml"]);
        let orch = orchestrator(
            scenario_options(),
            RecordingRunner::default(),
            collector.clone(),
            RecordingFilesystem::default(),
        );

        orch.before_run(&BuildContext::single_run(ROOT)).await.unwrap();

        assert!(orch.dependencies().unwrap().is_empty());
        assert_eq!(collector.scan_count(), 0);
    }

    #[tokio::test]
    async fn watch_build_tracks_models_and_archetypes() {
        let collector = TreeCollector::default().with("/p/models/a.xtuml", &["/p/models/a.xtuml"]);
        let orch = orchestrator(
            scenario_options(),
            RecordingRunner::default(),
            collector,
            RecordingFilesystem::default(),
        );

        let outcome = orch
            .watch_run(&BuildContext::watching(ROOT, Vec::<PathBuf>::new()))
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::Regenerated(BuildTrigger::FirstBuild));
        assert_eq!(
            tracked(&orch),
            vec![PathBuf::from("/p/models/a.xtuml"), PathBuf::from("/p/t/x.arc")]
        );
    }

    #[tokio::test]
    async fn only_model_suffix_files_are_tracked_from_directories() {
        let options = CodegenOptions::from_overrides(OptionsOverrides {
            source_models: Some(vec!["models".into()]),
            ..OptionsOverrides::default()
        })
        .unwrap();
        let collector = TreeCollector::default().with(
            "/p/models",
            &["/p/models/a.xtuml", "/p/models/pkg/b.xtuml", "/p/models/notes.txt"],
        );
        let orch = orchestrator(
            options,
            RecordingRunner::default(),
            collector,
            RecordingFilesystem::default(),
        );

        orch.watch_run(&BuildContext::watching(ROOT, Vec::<PathBuf>::new()))
            .await
            .unwrap();

        assert_eq!(
            tracked(&orch),
            vec![
                PathBuf::from("/p/models/a.xtuml"),
                PathBuf::from("/p/models/pkg/b.xtuml")
            ]
        );
    }

    // ── watch triggers ────────────────────────────────────────────────────

    #[tokio::test]
    async fn disjoint_modification_spawns_nothing() {
        let runner = RecordingRunner::default();
        let collector = TreeCollector::default().with("/p/models/a.xtuml", &["/p/models/a.xtuml"]);
        let orch = orchestrator(
            scenario_options(),
            runner.clone(),
            collector.clone(),
            RecordingFilesystem::default(),
        );
        orch.watch_run(&BuildContext::watching(ROOT, Vec::<PathBuf>::new()))
            .await
            .unwrap();

        let outcome = orch
            .watch_run(&BuildContext::watching(ROOT, ["/p/src/index.js"]))
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::Skipped);
        assert_eq!(runner.commands().len(), 2);
        assert_eq!(collector.scan_count(), 1);
    }

    #[tokio::test]
    async fn tracked_modification_rebuilds_and_picks_up_new_models() {
        let runner = RecordingRunner::default();
        let options = CodegenOptions::from_overrides(OptionsOverrides {
            source_models: Some(vec!["models".into()]),
            ..OptionsOverrides::default()
        })
        .unwrap();
        let collector = TreeCollector::default().with("/p/models", &["/p/models/a.xtuml"]);
        let orch = orchestrator(
            options,
            runner.clone(),
            collector.clone(),
            RecordingFilesystem::default(),
        );
        orch.watch_run(&BuildContext::watching(ROOT, Vec::<PathBuf>::new()))
            .await
            .unwrap();
        let after_first = orch.dependencies().unwrap().len();

        // a model file appears after the first build
        let collector = collector.with("/p/models", &["/p/models/a.xtuml", "/p/models/b.xtuml"]);
        let outcome = orch
            .watch_run(&BuildContext::watching(ROOT, ["/p/models/a.xtuml"]))
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::Regenerated(BuildTrigger::WatchTrigger));
        assert_eq!(runner.commands().len(), 4);
        assert_eq!(collector.scan_count(), 2);
        assert!(orch.dependencies().unwrap().len() >= after_first);
        assert!(
            orch.dependencies()
                .unwrap()
                .contains(Path::new("/p/models/b.xtuml"))
        );
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn stage_one_failure_never_reaches_stage_two() {
        let mut runner = MockProcessRunner::new();
        runner.expect_run().times(1).returning(|invocation| {
            Err(ApplicationError::ProcessExited {
                program: invocation.program_name(),
                code: Some(2),
                signal: None,
            }
            .into())
        });
        let orch = BuildOrchestrator::new(
            scenario_options(),
            Toolchain::bridgepoint(SCHEMA),
            OrchestratorPorts {
                runner: Box::new(runner),
                collector: Box::new(TreeCollector::default()),
                filesystem: Box::new(RecordingFilesystem::default()),
                environment: satisfied_environment(),
            },
        )
        .unwrap();

        let err = orch
            .before_run(&BuildContext::single_run(ROOT))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CodegenError::Application(ApplicationError::StageFailed {
                stage: Stage::Prebuild,
                code: Some(2),
                signal: None,
            })
        );
    }

    #[tokio::test]
    async fn stage_two_failure_is_fatal() {
        let runner = RecordingRunner::failing(1, 1);
        let orch = orchestrator(
            scenario_options(),
            runner.clone(),
            TreeCollector::default(),
            RecordingFilesystem::default(),
        );

        let err = orch
            .before_run(&BuildContext::single_run(ROOT))
            .await
            .unwrap_err();

        assert!(err.is_stage_failure());
        assert!(err.to_string().contains("code generation failed"));
        assert_eq!(runner.commands().len(), 2);
    }

    #[tokio::test]
    async fn missing_source_model_aborts_before_any_process() {
        let runner = RecordingRunner::default();
        let orch = orchestrator(
            scenario_options(),
            runner.clone(),
            TreeCollector::default(),
            RecordingFilesystem::default(),
        );

        let err = orch
            .watch_run(&BuildContext::watching(ROOT, Vec::<PathBuf>::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CodegenError::Application(ApplicationError::FilesystemError { .. })
        ));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn failed_cycle_releases_the_in_flight_slot() {
        let orch = orchestrator(
            scenario_options(),
            RecordingRunner::failing(0, 3),
            TreeCollector::default(),
            RecordingFilesystem::default(),
        );
        let ctx = BuildContext::single_run(ROOT);

        assert!(orch.before_run(&ctx).await.unwrap_err().is_stage_failure());
        // only the first launch fails; the next cycle gets the slot and succeeds
        assert!(orch.before_run(&ctx).await.is_ok());
    }

    // ── environment ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn environment_is_checked_once() {
        let mut environment = MockPreconditionChecker::new();
        environment.expect_check().times(1).returning(|| Ok(()));
        let orch = BuildOrchestrator::new(
            scenario_options(),
            Toolchain::bridgepoint(SCHEMA),
            OrchestratorPorts {
                runner: Box::new(RecordingRunner::default()),
                collector: Box::new(TreeCollector::default()),
                filesystem: Box::new(RecordingFilesystem::default()),
                environment: Box::new(environment),
            },
        )
        .unwrap();

        orch.environment().unwrap();
        orch.environment().unwrap();
        orch.before_run(&BuildContext::single_run(ROOT)).await.unwrap();
    }

    #[tokio::test]
    async fn missing_interpreter_blocks_every_build() {
        let runner = RecordingRunner::default();
        let mut environment = MockPreconditionChecker::new();
        environment.expect_check().returning(|| {
            Err(ApplicationError::InterpreterMissing {
                interpreter: "python".into(),
            }
            .into())
        });
        let orch = BuildOrchestrator::new(
            scenario_options(),
            Toolchain::bridgepoint(SCHEMA),
            OrchestratorPorts {
                runner: Box::new(runner.clone()),
                collector: Box::new(TreeCollector::default()),
                filesystem: Box::new(RecordingFilesystem::default()),
                environment: Box::new(environment),
            },
        )
        .unwrap();

        assert!(matches!(
            orch.environment(),
            Err(CodegenError::Application(ApplicationError::InterpreterMissing { .. }))
        ));
        assert!(orch.before_run(&BuildContext::single_run(ROOT)).await.is_err());
        assert!(runner.commands().is_empty());
    }

    /// Remembers which thread ran the check.
    #[derive(Clone, Default)]
    struct ThreadRecordingChecker {
        threads: Arc<Mutex<Vec<std::thread::ThreadId>>>,
    }

    impl PreconditionChecker for ThreadRecordingChecker {
        fn check(&self) -> CodegenResult<()> {
            self.threads
                .lock()
                .unwrap()
                .push(std::thread::current().id());
            Ok(())
        }
    }

    #[tokio::test]
    async fn skipped_environment_hook_checks_on_the_blocking_pool() {
        let checker = ThreadRecordingChecker::default();
        let orch = BuildOrchestrator::new(
            scenario_options(),
            Toolchain::bridgepoint(SCHEMA),
            OrchestratorPorts {
                runner: Box::new(RecordingRunner::default()),
                collector: Box::new(TreeCollector::default()),
                filesystem: Box::new(RecordingFilesystem::default()),
                environment: Box::new(checker.clone()),
            },
        )
        .unwrap();

        orch.before_run(&BuildContext::single_run(ROOT)).await.unwrap();
        orch.before_run(&BuildContext::single_run(ROOT)).await.unwrap();

        let threads = checker.threads.lock().unwrap().clone();
        assert_eq!(threads.len(), 1);
        assert_ne!(threads[0], std::thread::current().id());
    }

    #[tokio::test]
    async fn cycle_counter_advances_without_a_subscriber() {
        let orch = orchestrator(
            scenario_options(),
            RecordingRunner::default(),
            TreeCollector::default(),
            RecordingFilesystem::default(),
        );
        let ctx = BuildContext::single_run(ROOT);

        orch.before_run(&ctx).await.unwrap();
        orch.watch_run(&ctx).await.unwrap();

        assert_eq!(orch.cycles_started(), 2);
    }

    // ── concurrency guard ─────────────────────────────────────────────────

    #[tokio::test]
    async fn overlapping_cycle_is_rejected() {
        let gate = Arc::new(Semaphore::new(0));
        let orch = orchestrator(
            scenario_options(),
            GatedRunner {
                gate: Arc::clone(&gate),
            },
            TreeCollector::default(),
            RecordingFilesystem::default(),
        );
        let ctx = BuildContext::single_run(ROOT);

        // both cycles are polled before the toolchain is released
        let (first, second, ()) = tokio::join!(orch.before_run(&ctx), orch.before_run(&ctx), async {
            tokio::task::yield_now().await;
            gate.add_permits(2);
        });

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(CodegenError::Application(ApplicationError::BuildInProgress))
        )));
    }

    // ── publication ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn after_compile_publishes_only_in_watch_mode() {
        let collector = TreeCollector::default().with("/p/models/a.xtuml", &["/p/models/a.xtuml"]);
        let orch = orchestrator(
            scenario_options(),
            RecordingRunner::default(),
            collector,
            RecordingFilesystem::default(),
        );
        let watching = BuildContext::watching(ROOT, Vec::<PathBuf>::new());
        orch.watch_run(&watching).await.unwrap();

        let mut host_graph: BTreeSet<PathBuf> = BTreeSet::new();
        assert_eq!(
            orch.after_compile(&BuildContext::single_run(ROOT), &mut host_graph)
                .unwrap(),
            0
        );
        assert!(host_graph.is_empty());

        assert_eq!(orch.after_compile(&watching, &mut host_graph).unwrap(), 2);
        // idempotent
        assert_eq!(orch.after_compile(&watching, &mut host_graph).unwrap(), 2);
        assert_eq!(host_graph.len(), 2);
        assert!(host_graph.contains(Path::new("/p/t/x.arc")));
    }

    #[test]
    fn invalid_options_are_rejected_at_construction() {
        let options = CodegenOptions {
            prebuild_output: String::new(),
            ..CodegenOptions::default()
        };
        let result = BuildOrchestrator::new(
            options,
            Toolchain::bridgepoint(SCHEMA),
            OrchestratorPorts {
                runner: Box::new(RecordingRunner::default()),
                collector: Box::new(TreeCollector::default()),
                filesystem: Box::new(RecordingFilesystem::default()),
                environment: Box::new(MockPreconditionChecker::new()),
            },
        );
        assert!(matches!(result, Err(CodegenError::Domain(_))));
    }

    #[test]
    fn artifact_lives_in_workspace() {
        let orch = orchestrator(
            scenario_options(),
            RecordingRunner::default(),
            TreeCollector::default(),
            RecordingFilesystem::default(),
        );
        assert_eq!(
            orch.artifact_path(Path::new(ROOT)),
            PathBuf::from("/p/out/p.sql")
        );
    }
}
