//! Validate every document and the collection as a whole

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::error::Severity;
use crate::Site;

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Outcome of a check
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub records: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn passed(&self, deny_warnings: bool) -> bool {
        self.count(Severity::Error) == 0 && (!deny_warnings || self.count(Severity::Warning) == 0)
    }
}

/// Load the site, then cross-validate what loaded
pub fn check(site: &Site) -> Result<Report> {
    let (collection, load_errors) = site.load()?;
    let assets = site.assets();
    let policy = site.config.asset_policy;

    let mut diagnostics: Vec<Diagnostic> = load_errors
        .into_iter()
        .map(|e| Diagnostic {
            severity: Severity::Error,
            message: e.to_string(),
        })
        .collect();

    diagnostics.extend(collection.validate(&assets).map(|e| Diagnostic {
        severity: e.severity(policy),
        message: e.to_string(),
    }));

    Ok(Report {
        records: collection.len(),
        diagnostics,
    })
}

/// Run the check and print the findings
pub fn run(site: &Site, deny_warnings: bool) -> Result<()> {
    let start = Instant::now();
    let report = check(site)?;

    for diagnostic in &report.diagnostics {
        println!("{}: {}", diagnostic.severity, diagnostic.message);
    }

    let errors = report.count(Severity::Error);
    let warnings = report.count(Severity::Warning);
    println!(
        "Checked {} records: {} error(s), {} warning(s)",
        report.records, errors, warnings
    );
    tracing::info!("Checked in {:.2}s", start.elapsed().as_secs_f64());

    if !report.passed(deny_warnings) {
        anyhow::bail!("check failed with {} error(s), {} warning(s)", errors, warnings);
    }

    Ok(())
}

/// Watch the content directory and re-run the check once each burst of
/// changes has settled
pub async fn watch(site: &Site, deny_warnings: bool) -> Result<()> {
    let base_dir = site.base_dir.clone();
    let content_dir = site.content_dir.clone();
    tokio::task::spawn_blocking(move || watch_blocking(&base_dir, &content_dir, deny_warnings))
        .await?
}

fn watch_blocking(base_dir: &Path, content_dir: &Path, deny_warnings: bool) -> Result<()> {
    let (tx, rx) = channel::<DebounceEventResult>();

    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(content_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", content_dir);

    let config_path = base_dir.join("_config.yml");
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let batches = rx.into_iter().filter_map(|res| match res {
        Ok(events) => Some(events.into_iter().map(|e| e.path).collect()),
        Err(e) => {
            tracing::warn!("Watch error: {:?}", e);
            None
        }
    });
    check_batches(base_dir, batches, deny_warnings);

    Ok(())
}

/// Re-check the site once per settled batch of changed paths. Returns the
/// number of checks run.
fn check_batches<I>(base_dir: &Path, batches: I, deny_warnings: bool) -> usize
where
    I: IntoIterator<Item = Vec<PathBuf>>,
{
    let mut runs = 0;

    for paths in batches {
        let relevant: Vec<&PathBuf> = paths
            .iter()
            .filter(|p| is_relevant(base_dir, p))
            .collect();
        if relevant.is_empty() {
            continue;
        }

        for path in &relevant {
            tracing::debug!("Changed: {}", path.display());
        }
        tracing::info!("Content changed, checking...");
        runs += 1;

        // Config edits take effect on the next check
        let site = match Site::new(base_dir) {
            Ok(site) => site,
            Err(e) => {
                tracing::error!("Failed to reload config: {}", e);
                continue;
            }
        };
        if let Err(e) = run(&site, deny_warnings) {
            tracing::error!("{}", e);
        }
    }

    runs
}

/// Editor backups and dot-directories (`.git`, `.obsidian`) are not content
fn is_relevant(base_dir: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    let hidden = relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));
    !hidden && !relative.to_string_lossy().ends_with('~')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn doc(title: &str, extra: &str) -> String {
        format!(
            "---\nauthor: yuhao\ntitle: {}\ndate: 2025-02-17\n{}---\nBody\n",
            title, extra
        )
    }

    #[test]
    fn test_clean_site_passes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "content/posts/a/index.md", &doc("A", "image: cover.png\n"));
        write(dir.path(), "content/posts/a/cover.png", "png");

        let site = Site::new(dir.path()).unwrap();
        let report = check(&site).unwrap();
        assert_eq!(report.records, 1);
        assert!(report.diagnostics.is_empty());
        assert!(report.passed(true));
    }

    #[test]
    fn test_dangling_image_is_a_warning_by_default() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "content/posts/a/index.md", &doc("A", "image: cover.png\n"));

        let site = Site::new(dir.path()).unwrap();
        let report = check(&site).unwrap();
        assert_eq!(report.count(Severity::Warning), 1);
        assert!(report.passed(false));
        assert!(!report.passed(true));
    }

    #[test]
    fn test_asset_policy_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "_config.yml", "asset_policy: error\n");
        write(dir.path(), "content/posts/a/index.md", &doc("A", "image: cover.png\n"));

        let site = Site::new(dir.path()).unwrap();
        let report = check(&site).unwrap();
        assert_eq!(report.count(Severity::Error), 1);
        assert!(!report.passed(false));
    }

    #[test]
    fn test_collects_document_and_collection_errors() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "content/posts/a/index.md", &doc("A", "aliases: [foo]\n"));
        write(dir.path(), "content/posts/b/index.md", &doc("B", "aliases: [foo]\n"));
        write(dir.path(), "content/posts/c/index.md", "---\ntitle: C\n---\n");

        let site = Site::new(dir.path()).unwrap();
        let report = check(&site).unwrap();
        assert_eq!(report.records, 2);
        assert_eq!(report.count(Severity::Error), 2);
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.message.contains("posts/c/index.md")));
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.message.contains("alias \"foo\"")));
        assert!(run(&site, false).is_err());
    }

    #[test]
    fn test_every_settled_batch_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let post = dir.path().join("content/posts/a/index.md");
        write(dir.path(), "content/posts/a/index.md", &doc("A", ""));

        // Two saves in quick succession arrive as two batches; neither is dropped
        let batches = vec![vec![post.clone()], vec![post.clone()]];
        assert_eq!(check_batches(dir.path(), batches, false), 2);
    }

    #[test]
    fn test_failing_check_keeps_watching() {
        let dir = tempfile::tempdir().unwrap();
        let post = dir.path().join("content/posts/a/index.md");
        write(dir.path(), "content/posts/a/index.md", "no front matter\n");

        let batches = vec![vec![post.clone()], vec![post]];
        assert_eq!(check_batches(dir.path(), batches, false), 2);
    }

    #[test]
    fn test_irrelevant_changes_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let batches = vec![
            vec![dir.path().join("content/.git/index")],
            vec![dir.path().join("content/posts/a/index.md~")],
            Vec::new(),
        ];
        assert_eq!(check_batches(dir.path(), batches, false), 0);

        assert!(is_relevant(dir.path(), &dir.path().join("content/posts/a/index.md")));
        assert!(is_relevant(dir.path(), &dir.path().join("_config.yml")));
    }
}
