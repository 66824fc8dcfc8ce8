//! The provisioning engine.
//!
//! A run discovers the host toolchain, merges what it found into the
//! configuration and then brings each managed dependency to its pinned
//! state, strictly in order. The first failing dependency ends the run;
//! dependencies provisioned before it stay installed.

use crate::core::dependency::Dependency;
use crate::error::ProvisionError;
use crate::fetch::{FetchContext, FetchOutcome, Fetcher};
use crate::sources::http::{Downloader, HttpDownloader};
use crate::toolchain::{self, CompilerDiscoveryResult, ExecutableResolver, PathResolver};
use crate::util::config::Config;
use crate::util::process::{CommandRunner, SystemRunner};

use super::teardown::{teardown, TeardownReport};

/// Outcome of one dependency within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyOutcome {
    pub name: String,
    pub outcome: FetchOutcome,
}

/// Result of a successful provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    /// Whether the buildable library used the accelerator profile
    pub accelerator: bool,

    /// What compiler discovery found
    pub toolchain: CompilerDiscoveryResult,

    /// Per-dependency outcomes, in run order
    pub outcomes: Vec<DependencyOutcome>,
}

impl ProvisionReport {
    /// Number of dependencies fetched during this run.
    pub fn installed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == FetchOutcome::Installed)
            .count()
    }
}

/// Drives compiler discovery and the dependency fetchers.
pub struct ProvisioningEngine {
    config: Config,
    downloader: Box<dyn Downloader>,
    runner: Box<dyn CommandRunner>,
    resolver: Box<dyn ExecutableResolver>,
}

impl ProvisioningEngine {
    /// Create an engine over explicit collaborators.
    pub fn new(
        config: Config,
        downloader: Box<dyn Downloader>,
        runner: Box<dyn CommandRunner>,
        resolver: Box<dyn ExecutableResolver>,
    ) -> Self {
        ProvisioningEngine {
            config,
            downloader,
            runner,
            resolver,
        }
    }

    /// Engine talking to the real network, shell and `PATH`.
    pub fn for_host(config: Config) -> Result<Self, ProvisionError> {
        Ok(ProvisioningEngine::new(
            config,
            Box::new(HttpDownloader::new()?),
            Box::new(SystemRunner::new()),
            Box::new(PathResolver),
        ))
    }

    /// The configuration, including any merged discovery results.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run compiler discovery and merge the result into the configuration.
    pub fn discover(&mut self) -> CompilerDiscoveryResult {
        let result = toolchain::discover(&self.config.toolchain, self.resolver.as_ref());
        self.config.apply_discovery(&result);
        result
    }

    /// Bring every managed dependency to its pinned state.
    ///
    /// The accelerator profile is used only when `accelerator_requested` is
    /// set and discovery found an accelerator compiler.
    pub fn provision(
        &mut self,
        accelerator_requested: bool,
    ) -> Result<ProvisionReport, ProvisionError> {
        let toolchain = self.discover();

        let accelerator = accelerator_requested && toolchain.accelerator_available();
        if accelerator_requested && !accelerator {
            tracing::warn!("accelerator requested but not available, building for CPU");
        }

        let deps = Dependency::standard_set(&self.config);
        let fetchers: Vec<&dyn Fetcher> = deps.iter().map(|d| d as &dyn Fetcher).collect();

        let ctx = FetchContext {
            config: &self.config,
            downloader: self.downloader.as_ref(),
            runner: self.runner.as_ref(),
            toolchain: &toolchain,
            accelerator,
        };
        let outcomes = run_fetchers(&fetchers, &ctx)?;

        Ok(ProvisionReport {
            accelerator,
            toolchain,
            outcomes,
        })
    }

    /// Remove every managed install location.
    pub fn teardown(&self) -> Result<TeardownReport, ProvisionError> {
        teardown(&self.config)
    }
}

/// Run `fetchers` in order, stopping at the first error.
pub fn run_fetchers(
    fetchers: &[&dyn Fetcher],
    ctx: &FetchContext<'_>,
) -> Result<Vec<DependencyOutcome>, ProvisionError> {
    let mut outcomes = Vec::with_capacity(fetchers.len());

    for fetcher in fetchers {
        tracing::debug!("provisioning {}", fetcher.name());
        let outcome = fetcher.fetch(ctx)?;
        outcomes.push(DependencyOutcome {
            name: fetcher.name().to_string(),
            outcome,
        });
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::Path;

    use super::*;
    use crate::test_support::{tarball, versioned_tarball, MapResolver, MockDownloader, MockRunner};
    use tempfile::TempDir;

    const BASIS_SET: &[u8] = b"{\"elements\": {}}\n";

    fn downloader_for(config: &Config) -> MockDownloader {
        MockDownloader::new()
            .with("json.hpp", b"// json.hpp".to_vec())
            .with(
                "eigen-",
                versioned_tarball(
                    "eigen",
                    &config.versions.eigen,
                    "signature_of_eigen3_matrix_library",
                ),
            )
            .with(
                "libxc-",
                tarball(&[(
                    format!("libxc-{}/configure.ac", config.versions.libxc).as_str(),
                    "AC_INIT",
                )]),
            )
            .with("basissetexchange", BASIS_SET.to_vec())
    }

    fn host_resolver() -> MapResolver {
        MapResolver::new()
            .with("clang", "/usr/bin/clang")
            .with("clang++", "/usr/bin/clang++")
            .with("nvcc", "/usr/local/cuda/bin/nvcc")
    }

    fn engine(
        config: Config,
        downloader: &MockDownloader,
        runner: &MockRunner,
        resolver: MapResolver,
    ) -> ProvisioningEngine {
        ProvisioningEngine::new(
            config,
            Box::new(downloader.clone()),
            Box::new(runner.clone()),
            Box::new(resolver),
        )
    }

    /// Relative paths of every file under `root`, with their contents.
    fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
        fn walk(root: &Path, dir: &Path, out: &mut Vec<(String, Vec<u8>)>) {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return;
            };
            for entry in entries {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(root, &path, out);
                } else {
                    let rel = path.strip_prefix(root).unwrap().display().to_string();
                    out.push((rel, std::fs::read(&path).unwrap()));
                }
            }
        }

        let mut files = Vec::new();
        walk(root, root, &mut files);
        files.sort();
        files
    }

    #[test]
    fn test_first_run_installs_everything_in_order() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());
        let downloader = downloader_for(&config);
        let runner = MockRunner::new();
        let mut engine = engine(config, &downloader, &runner, host_resolver());

        let report = engine.provision(false).unwrap();

        let names: Vec<_> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["nlohmann", "eigen", "libxc", "sto-3g"]);
        assert_eq!(report.installed_count(), 4);
        assert!(!report.accelerator);

        let ext = tmp.path().join("external");
        assert!(ext.join("nlohmann/3.11.3").is_file());
        assert!(ext.join("eigen/3.4.0").is_file());
        assert!(ext.join("eigen/signature_of_eigen3_matrix_library").is_file());
        assert!(ext.join("libxc/6.2.2").is_file());
        assert_eq!(
            std::fs::read(tmp.path().join("basis-set/sto-3g.json")).unwrap(),
            BASIS_SET
        );
    }

    #[test]
    fn test_second_run_does_no_work() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());
        let downloader = downloader_for(&config);
        let runner = MockRunner::new();
        let mut engine = engine(config, &downloader, &runner, host_resolver());

        engine.provision(false).unwrap();
        downloader.clear_requests();
        runner.clear_calls();

        let report = engine.provision(false).unwrap();
        assert_eq!(report.installed_count(), 0);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.outcome == FetchOutcome::Skipped));
        assert!(downloader.requests().is_empty());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_version_change_refetches_only_that_dependency() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());
        let downloader = downloader_for(&config);
        let runner = MockRunner::new();
        engine(config.clone(), &downloader, &runner, host_resolver())
            .provision(false)
            .unwrap();

        let mut bumped = config;
        bumped.versions.eigen = "3.4.1".to_string();
        let downloader = downloader_for(&bumped);
        runner.clear_calls();

        let report = engine(bumped, &downloader, &runner, host_resolver())
            .provision(false)
            .unwrap();

        let installed: Vec<_> = report
            .outcomes
            .iter()
            .filter(|o| o.outcome == FetchOutcome::Installed)
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(installed, ["eigen"]);
        assert_eq!(downloader.requests().len(), 1);
        assert!(downloader.requests()[0].contains("3.4.1"));

        let eigen = tmp.path().join("external/eigen");
        assert!(eigen.join("3.4.1").is_file());
        // The archive recipe replaces the whole directory, old marker included.
        assert!(!eigen.join("3.4.0").exists());
    }

    #[test]
    fn test_header_version_bump_and_revert() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::with_root(tmp.path());
        config.versions.nlohmann_json = "3.11.2".to_string();
        let runner = MockRunner::new();
        let downloader = MockDownloader::new()
            .with("v3.11.2/json.hpp", b"OLD".to_vec())
            .with("v3.11.3/json.hpp", b"NEW".to_vec())
            .with("eigen-", versioned_tarball("eigen", "3.4.0", "Eigen"))
            .with("libxc-", versioned_tarball("libxc", "6.2.2", "configure.ac"))
            .with("basissetexchange", BASIS_SET.to_vec());
        let dir = tmp.path().join("external/nlohmann");

        engine(config.clone(), &downloader, &runner, host_resolver())
            .provision(false)
            .unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("json.hpp")).unwrap(), "OLD");

        config.versions.nlohmann_json = "3.11.3".to_string();
        downloader.clear_requests();
        engine(config.clone(), &downloader, &runner, host_resolver())
            .provision(false)
            .unwrap();
        assert_eq!(downloader.requests().len(), 1);
        assert_eq!(std::fs::read_to_string(dir.join("json.hpp")).unwrap(), "NEW");
        assert_eq!(std::fs::read_to_string(dir.join("3.11.3")).unwrap(), "3.11.3\n");
        assert!(!dir.join("3.11.2").exists());

        config.versions.nlohmann_json = "3.11.2".to_string();
        downloader.clear_requests();
        let report = engine(config, &downloader, &runner, host_resolver())
            .provision(false)
            .unwrap();
        assert_eq!(report.outcomes[0].outcome, FetchOutcome::Installed);
        assert_eq!(
            downloader.requests(),
            vec!["https://github.com/nlohmann/json/releases/download/v3.11.2/json.hpp"]
        );
        assert_eq!(std::fs::read_to_string(dir.join("json.hpp")).unwrap(), "OLD");
        assert!(!dir.join("3.11.3").exists());
    }

    #[test]
    fn test_buildable_version_bump_and_revert() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::with_root(tmp.path());
        let runner = MockRunner::new();
        let downloader = MockDownloader::new()
            .with("json.hpp", b"// json.hpp".to_vec())
            .with("eigen-", versioned_tarball("eigen", "3.4.0", "Eigen"))
            .with("libxc-6.2.2", versioned_tarball("libxc", "6.2.2", "configure.ac"))
            .with("libxc-7.0.0", versioned_tarball("libxc", "7.0.0", "configure.ac"))
            .with("basissetexchange", BASIS_SET.to_vec());
        let dir = tmp.path().join("external/libxc");

        engine(config.clone(), &downloader, &runner, host_resolver())
            .provision(false)
            .unwrap();
        assert!(dir.join("6.2.2").is_file());

        for version in ["7.0.0", "6.2.2"] {
            config.versions.libxc = version.to_string();
            runner.clear_calls();

            let report = engine(config.clone(), &downloader, &runner, host_resolver())
                .provision(false)
                .unwrap();

            let installed: Vec<_> = report
                .outcomes
                .iter()
                .filter(|o| o.outcome == FetchOutcome::Installed)
                .map(|o| o.name.as_str())
                .collect();
            assert_eq!(installed, ["libxc"]);
            assert!(runner.calls().iter().any(|c| c == "make install"));

            let markers: Vec<_> = std::fs::read_dir(&dir)
                .unwrap()
                .map(|e| e.unwrap().file_name().into_string().unwrap())
                .collect();
            assert_eq!(markers, [version]);
            assert_eq!(
                std::fs::read_to_string(dir.join(version)).unwrap(),
                format!("{}\n", version)
            );
        }
    }

    #[test]
    fn test_teardown_then_provision_reproduces_layout() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());
        let downloader = downloader_for(&config);
        let runner = MockRunner::new();
        let mut engine = engine(config, &downloader, &runner, host_resolver());

        engine.provision(false).unwrap();
        let first = snapshot(tmp.path());

        let removed = engine.teardown().unwrap();
        assert_eq!(removed.removed.len(), 4);

        let report = engine.provision(false).unwrap();
        assert_eq!(report.installed_count(), 4);
        assert_eq!(snapshot(tmp.path()), first);
    }

    #[test]
    fn test_teardown_twice_is_noop() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());
        let downloader = downloader_for(&config);
        let runner = MockRunner::new();
        let mut engine = engine(config, &downloader, &runner, host_resolver());

        engine.provision(false).unwrap();
        engine.teardown().unwrap();

        let second = engine.teardown().unwrap();
        assert!(second.removed.is_empty());
    }

    #[test]
    fn test_accelerator_requested_and_available() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());
        let downloader = downloader_for(&config);
        let runner = MockRunner::new();
        let mut engine = engine(config, &downloader, &runner, host_resolver());

        let report = engine.provision(true).unwrap();
        assert!(report.accelerator);

        let configure = runner
            .calls()
            .into_iter()
            .find(|c| c.contains("configure "))
            .unwrap();
        assert!(configure.contains("/usr/local/cuda/bin/nvcc -x cu -ccbin /usr/bin/clang"));
        assert!(configure.contains("arch=compute_80"));
        assert!(configure.contains("arch=compute_70"));
        assert!(configure.contains("--enable-cuda"));
        assert!(engine.config().accelerator_invocation.is_some());
    }

    #[test]
    fn test_accelerator_not_requested_uses_cpu_profile() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());
        let downloader = downloader_for(&config);
        let runner = MockRunner::new();
        let mut engine = engine(config, &downloader, &runner, host_resolver());

        let report = engine.provision(false).unwrap();
        assert!(!report.accelerator);

        for call in runner.calls() {
            assert!(!call.contains("nvcc"), "unexpected accelerator call: {call}");
            assert!(!call.contains("compute_"), "unexpected codegen flag: {call}");
        }
    }

    #[test]
    fn test_unresolved_accelerator_falls_back_to_cpu() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());
        let downloader = downloader_for(&config);
        let runner = MockRunner::new();
        let resolver = MapResolver::new()
            .with("clang", "/usr/bin/clang")
            .with("clang++", "/usr/bin/clang++");
        let mut engine = engine(config, &downloader, &runner, resolver);

        let report = engine.provision(true).unwrap();
        assert!(!report.accelerator);
        assert!(!report.toolchain.accelerator_available());
        assert!(runner.calls().iter().all(|c| !c.contains("nvcc")));
        assert!(engine.config().test_flags().is_empty());
    }

    #[test]
    fn test_failure_propagates_unchanged_and_keeps_earlier_installs() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());
        let downloader = downloader_for(&config);
        let runner = MockRunner::new().failing("make install");
        let mut engine = engine(config, &downloader, &runner, host_resolver());

        let err = engine.provision(false).unwrap_err();
        assert!(matches!(err, ProvisionError::Build { code: Some(2), .. }));

        let ext = tmp.path().join("external");
        assert!(ext.join("nlohmann/3.11.3").is_file());
        assert!(ext.join("eigen/3.4.0").is_file());
        assert!(!ext.join("libxc/6.2.2").exists());
        assert!(!tmp.path().join("basis-set/sto-3g.json").exists());
    }

    struct CountingFetcher {
        name: &'static str,
        fail: bool,
        calls: Cell<usize>,
    }

    impl CountingFetcher {
        fn new(name: &'static str, fail: bool) -> Self {
            CountingFetcher {
                name,
                fail,
                calls: Cell::new(0),
            }
        }
    }

    impl Fetcher for CountingFetcher {
        fn name(&self) -> &str {
            self.name
        }

        fn fetch(&self, _ctx: &FetchContext<'_>) -> Result<FetchOutcome, ProvisionError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ProvisionError::transfer(self.name, "HTTP 500"));
            }
            Ok(FetchOutcome::Installed)
        }
    }

    #[test]
    fn test_run_fetchers_stops_at_first_failure() {
        let config = Config::with_root("/project");
        let downloader = MockDownloader::new();
        let runner = MockRunner::new();
        let toolchain = CompilerDiscoveryResult::default();
        let ctx = FetchContext {
            config: &config,
            downloader: &downloader,
            runner: &runner,
            toolchain: &toolchain,
            accelerator: false,
        };

        let fetchers = [
            CountingFetcher::new("first", false),
            CountingFetcher::new("second", true),
            CountingFetcher::new("third", false),
            CountingFetcher::new("fourth", false),
        ];
        let refs: Vec<&dyn Fetcher> = fetchers.iter().map(|f| f as &dyn Fetcher).collect();

        let err = run_fetchers(&refs, &ctx).unwrap_err();
        match err {
            ProvisionError::Transfer { url, .. } => assert_eq!(url, "second"),
            other => panic!("unexpected error: {other}"),
        }

        let calls: Vec<_> = fetchers.iter().map(|f| f.calls.get()).collect();
        assert_eq!(calls, [1, 1, 0, 0]);
    }
}
