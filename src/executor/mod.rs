//! Timing harness: the run loop over all eligible modules
//!
//! Modules are timed strictly one after another, and runs follow each other
//! without overlap, so no two loads ever compete for CPU or I/O. A module
//! that fails in any run is evicted: it is never timed again and every
//! sample it had already produced is discarded.

use crate::error::LoadError;
use crate::loader::{Decision, IsolationSelector, ModuleLoader};
use crate::models::{ModuleSet, RunConfig, Summary, TimingRecords};
use crate::stats;
use crate::types::LoadStrategy;
use async_trait::async_trait;

/// One successful sample, as reported to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress<'a> {
    /// 1-based run index
    pub run: u32,
    pub runs: u32,
    pub module: &'a str,
    pub nanos: u64,
    pub strategy: LoadStrategy,
}

/// A failed load that evicted its module, as reported to observers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eviction<'a> {
    /// 1-based run index
    pub run: u32,
    pub runs: u32,
    pub module: &'a str,
    pub error: &'a LoadError,
}

/// Hooks for progress output and warnings; every method defaults to a no-op
#[async_trait]
pub trait HarnessObserver: Send {
    async fn on_decision(&mut self, _module: &str, _path: &str, _decision: &Decision) {}

    async fn on_sample(&mut self, _progress: Progress<'_>) {}

    async fn on_evicted(&mut self, _eviction: Eviction<'_>) {}
}

/// Observer that ignores everything
pub struct SilentObserver;

impl HarnessObserver for SilentObserver {}

/// Owns the eligible module set and the timing records for one session
pub struct Harness<L> {
    loader: L,
    selector: IsolationSelector,
    run_config: RunConfig,
    modules: ModuleSet,
    records: TimingRecords,
    evicted: Vec<String>,
    attempts: usize,
}

impl<L: ModuleLoader> Harness<L> {
    pub fn new(loader: L, run_config: RunConfig, modules: ModuleSet) -> Self {
        Self {
            loader,
            selector: IsolationSelector::new(run_config.force_isolated),
            run_config,
            modules,
            records: TimingRecords::new(),
            evicted: Vec::new(),
            attempts: 0,
        }
    }

    /// Execute every run. Load failures never abort the loop.
    pub async fn run<O: HarnessObserver + ?Sized>(&mut self, observer: &mut O) {
        let runs = self.run_config.runs.max(1);

        for run in 1..=runs {
            for module in self.modules.snapshot() {
                self.time_module(&module, run, runs, observer).await;
            }
        }
    }

    async fn time_module<O: HarnessObserver + ?Sized>(
        &mut self,
        module: &str,
        run: u32,
        runs: u32,
        observer: &mut O,
    ) {
        let path = self
            .loader
            .resolve(module)
            .await
            .unwrap_or_else(|| module.to_string());

        let decision = self.selector.decide(&mut self.loader, &path).await;
        observer.on_decision(module, &path, &decision).await;

        self.attempts += 1;
        match self.loader.time(&path, decision.strategy).await {
            Ok(nanos) => {
                self.records.record(module, nanos, decision.strategy);
                observer
                    .on_sample(Progress {
                        run,
                        runs,
                        module,
                        nanos,
                        strategy: decision.strategy,
                    })
                    .await;
            }
            Err(error) => {
                self.modules.remove(module);
                self.records.evict(module);
                self.evicted.push(module.to_string());
                observer
                    .on_evicted(Eviction {
                        run,
                        runs,
                        module,
                        error: &error,
                    })
                    .await;
            }
        }
    }

    /// Aggregate the records collected so far
    pub fn summary(&self) -> Summary {
        stats::aggregate(&self.records, self.run_config.runs)
    }

    pub fn records(&self) -> &TimingRecords {
        &self.records
    }

    /// Modules that have not been evicted
    pub fn modules(&self) -> &ModuleSet {
        &self.modules
    }

    /// Modules dropped after a failed load, in eviction order
    pub fn evicted(&self) -> &[String] {
        &self.evicted
    }

    /// Number of timed loads attempted, probes excluded
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn into_loader(self) -> L {
        self.loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModuleKind;
    use std::collections::HashMap;

    /// Scripted loader: per module, a queue of outcomes consumed one per load
    #[derive(Default)]
    struct ScriptedLoader {
        outcomes: HashMap<String, Vec<Result<u64, LoadError>>>,
        kinds: HashMap<String, Result<ModuleKind, LoadError>>,
        resolved: HashMap<String, String>,
        loads: Vec<(String, LoadStrategy)>,
        probes: usize,
    }

    impl ScriptedLoader {
        fn script(mut self, module: &str, outcomes: Vec<Result<u64, LoadError>>) -> Self {
            self.outcomes.insert(module.to_string(), outcomes);
            self
        }

        fn kind(mut self, path: &str, kind: Result<ModuleKind, LoadError>) -> Self {
            self.kinds.insert(path.to_string(), kind);
            self
        }

        fn resolves(mut self, module: &str, path: &str) -> Self {
            self.resolved.insert(module.to_string(), path.to_string());
            self
        }

        fn next(&mut self, path: &str, strategy: LoadStrategy) -> Result<u64, LoadError> {
            self.loads.push((path.to_string(), strategy));
            let module = self
                .resolved
                .iter()
                .find(|(_, p)| p.as_str() == path)
                .map(|(m, _)| m.clone())
                .unwrap_or_else(|| path.to_string());
            match self.outcomes.get_mut(&module) {
                Some(queue) if !queue.is_empty() => queue.remove(0),
                _ => Err(LoadError::module(format!("Cannot find module '{}'", module))),
            }
        }
    }

    #[async_trait]
    impl ModuleLoader for ScriptedLoader {
        async fn resolve(&mut self, module: &str) -> Option<String> {
            self.resolved.get(module).cloned()
        }

        async fn probe(&mut self, path: &str) -> Result<ModuleKind, LoadError> {
            self.probes += 1;
            self.kinds.get(path).cloned().unwrap_or(Ok(ModuleKind::CommonJs))
        }

        async fn load_in_process(&mut self, path: &str) -> Result<u64, LoadError> {
            self.next(path, LoadStrategy::InProcess)
        }

        async fn load_isolated(&mut self, path: &str) -> Result<u64, LoadError> {
            self.next(path, LoadStrategy::Isolated)
        }
    }

    #[derive(Default)]
    struct Recorder {
        samples: Vec<(u32, String, u64)>,
        evictions: Vec<(String, u32, LoadError)>,
    }

    #[async_trait]
    impl HarnessObserver for Recorder {
        async fn on_sample(&mut self, progress: Progress<'_>) {
            self.samples.push((progress.run, progress.module.to_string(), progress.nanos));
        }

        async fn on_evicted(&mut self, eviction: Eviction<'_>) {
            assert!(eviction.run <= eviction.runs);
            self.evictions
                .push((eviction.module.to_string(), eviction.run, eviction.error.clone()));
        }
    }

    fn modules(names: &[&str]) -> ModuleSet {
        names.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_every_module_timed_every_run() {
        let loader = ScriptedLoader::default()
            .script("a", vec![Ok(10), Ok(20), Ok(30)])
            .script("b", vec![Ok(5), Ok(5), Ok(5)]);
        let mut harness = Harness::new(loader, RunConfig::new(3, false, false), modules(&["a", "b"]));
        let mut recorder = Recorder::default();

        harness.run(&mut recorder).await;

        assert_eq!(harness.attempts(), 6);
        assert_eq!(harness.records().get("a").unwrap().samples, vec![10, 20, 30]);
        assert_eq!(harness.records().get("b").unwrap().samples, vec![5, 5, 5]);
        let order: Vec<_> = recorder.samples.iter().map(|(run, m, _)| (*run, m.as_str())).collect();
        assert_eq!(order, vec![(1, "a"), (1, "b"), (2, "a"), (2, "b"), (3, "a"), (3, "b")]);
    }

    #[tokio::test]
    async fn test_failure_on_later_run_evicts_retroactively() {
        let loader = ScriptedLoader::default()
            .script("flaky", vec![Ok(100), Err(LoadError::module("boom"))])
            .script("steady", vec![Ok(1); 5]);
        let mut harness = Harness::new(loader, RunConfig::new(5, false, false), modules(&["flaky", "steady"]));
        let mut recorder = Recorder::default();

        harness.run(&mut recorder).await;

        assert!(harness.records().get("flaky").is_none());
        assert!(!harness.modules().contains("flaky"));
        assert_eq!(harness.evicted(), ["flaky".to_string()]);
        assert_eq!(recorder.evictions, vec![("flaky".to_string(), 2, LoadError::module("boom"))]);

        // Two attempts for flaky, five for steady, none after eviction
        assert_eq!(harness.attempts(), 7);

        let summary = harness.summary();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].name, "steady");
        assert_eq!(summary.total_nanos, 5);
    }

    #[tokio::test]
    async fn test_closed_worker_is_treated_as_failure() {
        let loader = ScriptedLoader::default()
            .script("esm", vec![Err(LoadError::ClosedBeforeResult)])
            .kind("esm", Ok(ModuleKind::Module));
        let mut harness = Harness::new(loader, RunConfig::new(2, false, false), modules(&["esm"]));
        let mut recorder = Recorder::default();

        harness.run(&mut recorder).await;

        assert!(harness.modules().is_empty());
        assert!(harness.summary().is_empty());
        assert_eq!(harness.attempts(), 1);
        assert_eq!(recorder.evictions[0].2, LoadError::ClosedBeforeResult);
    }

    #[tokio::test]
    async fn test_strategy_follows_probe() {
        let loader = ScriptedLoader::default()
            .script("cjs", vec![Ok(1)])
            .script("esm", vec![Ok(2)])
            .script("broken-probe", vec![Ok(3)])
            .kind("esm", Ok(ModuleKind::Module))
            .kind("broken-probe", Err(LoadError::module("ERR_REQUIRE_ESM")));
        let mut harness = Harness::new(
            loader,
            RunConfig::new(1, false, false),
            modules(&["cjs", "esm", "broken-probe"]),
        );

        harness.run(&mut SilentObserver).await;

        let loader = harness.into_loader();
        assert_eq!(loader.probes, 3);
        assert_eq!(
            loader.loads,
            vec![
                ("cjs".to_string(), LoadStrategy::InProcess),
                ("esm".to_string(), LoadStrategy::Isolated),
                ("broken-probe".to_string(), LoadStrategy::Isolated),
            ]
        );
    }

    #[tokio::test]
    async fn test_forced_isolation() {
        let loader = ScriptedLoader::default().script("cjs", vec![Ok(1), Ok(1)]);
        let mut harness = Harness::new(loader, RunConfig::new(2, false, true), modules(&["cjs"]));

        harness.run(&mut SilentObserver).await;

        assert_eq!(harness.records().get("cjs").unwrap().strategy, LoadStrategy::Isolated);
        let loader = harness.into_loader();
        assert_eq!(loader.probes, 0);
        assert!(loader.loads.iter().all(|(_, s)| *s == LoadStrategy::Isolated));
    }

    #[tokio::test]
    async fn test_resolved_path_is_loaded_and_raw_name_is_fallback() {
        let loader = ScriptedLoader::default()
            .resolves("pkg", "/project/node_modules/pkg/index.js")
            .script("pkg", vec![Ok(7)])
            .script("unresolvable", vec![Ok(8)]);
        let mut harness = Harness::new(
            loader,
            RunConfig::new(1, false, false),
            modules(&["pkg", "unresolvable"]),
        );

        harness.run(&mut SilentObserver).await;

        // Records are keyed by module name, not by resolved path
        assert_eq!(harness.records().get("pkg").unwrap().samples, vec![7]);
        let loader = harness.into_loader();
        assert_eq!(loader.loads[0].0, "/project/node_modules/pkg/index.js");
        assert_eq!(loader.loads[1].0, "unresolvable");
    }

    #[tokio::test]
    async fn test_empty_module_set_does_no_work() {
        let mut harness = Harness::new(
            ScriptedLoader::default(),
            RunConfig::new(5, false, false),
            ModuleSet::new(),
        );

        harness.run(&mut SilentObserver).await;

        assert_eq!(harness.attempts(), 0);
        assert_eq!(harness.loader().probes, 0);
        assert!(harness.summary().is_empty());
    }
}
