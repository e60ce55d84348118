//! Cross-record validation

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::ContentRecord;
use crate::error::ValidationError;
use crate::helpers::{is_remote, normalize_path, normalize_route};

/// Answers whether an asset exists, given its path relative to the content
/// directory
pub trait AssetLookup {
    fn exists(&self, path: &Path) -> bool;
}

/// Looks assets up on disk under a content directory
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl AssetLookup for FsAssets {
    fn exists(&self, path: &Path) -> bool {
        self.root.join(path).is_file()
    }
}

/// An in-memory asset listing
impl AssetLookup for HashSet<PathBuf> {
    fn exists(&self, path: &Path) -> bool {
        self.contains(path)
    }
}

/// Where a record's cover image should live, relative to the content
/// directory. `None` for remote images, which are not checked.
///
/// A leading `/` anchors the path at the content directory instead of the
/// document's own directory.
pub fn image_path(record: &ContentRecord) -> Option<PathBuf> {
    let image = record.image.as_deref()?.trim();
    if is_remote(image) {
        return None;
    }

    let joined = match image.strip_prefix('/') {
        Some(rooted) => PathBuf::from(rooted),
        None => record.dir().join(image),
    };
    Some(normalize_path(&joined))
}

fn dangling_image(record: &ContentRecord, assets: &dyn AssetLookup) -> Option<ValidationError> {
    let path = image_path(record)?;
    if assets.exists(&path) {
        return None;
    }
    tracing::debug!("{}: no asset at {:?}", record.source, path);
    Some(ValidationError::DanglingAssetReference {
        document: record.source.clone(),
        image: record.image.clone().unwrap_or_default(),
    })
}

/// Check the invariants that span the whole collection.
///
/// The first record to declare an alias owns it; every later record that
/// declares it yields one `DuplicateAlias`. Each `image` is resolved
/// through `assets`. Errors are produced lazily and never stop the pass.
///
/// Aliases shadowing another record's primary route need the routes, so
/// that check lives in [`Collection::validate`](super::Collection::validate).
pub fn validate_collection<'a, I>(
    records: I,
    assets: &'a dyn AssetLookup,
) -> impl Iterator<Item = ValidationError> + 'a
where
    I: IntoIterator<Item = &'a ContentRecord>,
    I::IntoIter: 'a,
{
    let mut owners: HashMap<String, &'a str> = HashMap::new();

    records.into_iter().flat_map(move |record| {
        let mut found = Vec::new();
        let mut own = HashSet::new();

        for alias in record.aliases() {
            let key = normalize_route(alias);
            if !own.insert(key.clone()) {
                continue;
            }
            match owners.entry(key) {
                Entry::Occupied(entry) => {
                    if *entry.get() != record.source {
                        found.push(ValidationError::DuplicateAlias {
                            alias: alias.clone(),
                            first: entry.get().to_string(),
                            second: record.source.clone(),
                        });
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(record.source.as_str());
                }
            }
        }

        found.extend(dangling_image(record, assets));
        found
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, extra: &str) -> ContentRecord {
        let text = format!(
            "---\nauthor: yuhao\ntitle: {}\ndate: 2025-02-17\n{}---\nbody\n",
            source, extra
        );
        ContentRecord::parse(&text).unwrap().with_source(source)
    }

    fn assets(paths: &[&str]) -> HashSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_duplicate_alias_reported_once() {
        let records = vec![
            record("posts/a/index.md", "aliases: [foo]\n"),
            record("posts/b/index.md", "aliases: [foo]\n"),
        ];
        let errors: Vec<_> = validate_collection(&records, &assets(&[])).collect();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateAlias {
                alias: "foo".to_string(),
                first: "posts/a/index.md".to_string(),
                second: "posts/b/index.md".to_string(),
            }]
        );
    }

    #[test]
    fn test_alias_normalization() {
        let records = vec![
            record("a.md", "aliases: [/Foo/]\n"),
            record("b.md", "aliases: [foo]\n"),
            record("c.md", "aliases: [bar]\n"),
        ];
        let errors: Vec<_> = validate_collection(&records, &assets(&[])).collect();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_alias_repeated_within_one_record() {
        let records = vec![record("a.md", "aliases: [foo, /foo/]\n")];
        assert_eq!(validate_collection(&records, &assets(&[])).count(), 0);
    }

    #[test]
    fn test_three_way_duplicate() {
        let records = vec![
            record("a.md", "aliases: [foo]\n"),
            record("b.md", "aliases: [foo]\n"),
            record("c.md", "aliases: [foo]\n"),
        ];
        let seconds: Vec<String> = validate_collection(&records, &assets(&[]))
            .map(|e| match e {
                ValidationError::DuplicateAlias { first, second, .. } => {
                    assert_eq!(first, "a.md");
                    second
                }
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(seconds, vec!["b.md", "c.md"]);
    }

    #[test]
    fn test_dangling_image() {
        let records = vec![
            record("posts/a/index.md", "image: cover.png\n"),
            record("posts/b/index.md", "image: missing.png\n"),
            record("posts/c/index.md", ""),
        ];
        let errors: Vec<_> =
            validate_collection(&records, &assets(&["posts/a/cover.png"])).collect();
        assert_eq!(
            errors,
            vec![ValidationError::DanglingAssetReference {
                document: "posts/b/index.md".to_string(),
                image: "missing.png".to_string(),
            }]
        );
    }

    #[test]
    fn test_image_paths() {
        let r = record("posts/a/index.md", "image: ./img/../cover.png\n");
        assert_eq!(image_path(&r), Some(PathBuf::from("posts/a/cover.png")));

        let r = record("posts/a/index.md", "image: /images/shared.png\n");
        assert_eq!(image_path(&r), Some(PathBuf::from("images/shared.png")));

        let r = record("posts/a/index.md", "image: https://cdn.example.com/x.png\n");
        assert_eq!(image_path(&r), None);
    }

    #[test]
    fn test_collects_everything() {
        let records = vec![
            record("a.md", "aliases: [foo]\nimage: a.png\n"),
            record("b.md", "aliases: [foo]\nimage: b.png\n"),
        ];
        assert_eq!(validate_collection(&records, &assets(&[])).count(), 3);
    }

    #[test]
    fn test_is_lazy() {
        let records = vec![
            record("a.md", "image: a.png\n"),
            record("b.md", "image: b.png\n"),
        ];
        let lookup = assets(&[]);
        let mut errors = validate_collection(&records, &lookup);
        assert!(errors.next().is_some());
        assert!(errors.next().is_some());
        assert!(errors.next().is_none());
    }

    #[test]
    fn test_fs_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("posts/a")).unwrap();
        std::fs::write(dir.path().join("posts/a/cover.png"), b"png").unwrap();

        let lookup = FsAssets::new(dir.path());
        assert!(lookup.exists(Path::new("posts/a/cover.png")));
        assert!(!lookup.exists(Path::new("posts/a/other.png")));
        assert!(!lookup.exists(Path::new("posts/a")));
    }
}
