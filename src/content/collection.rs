//! The parsed records of one site and the views derived from them

use std::collections::{BTreeMap, HashMap};

use super::record::newest_first;
use super::validate::{validate_collection, AssetLookup};
use super::ContentRecord;
use crate::error::ValidationError;
use crate::helpers::{display_route, expand_permalink, normalize_route};

/// A label (tag, category, language) with the number of records using it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Count {
    pub name: String,
    pub count: usize,
}

/// All records of a site, newest first, with their routes
#[derive(Debug, Clone, Default)]
pub struct Collection {
    records: Vec<ContentRecord>,
    /// Primary route of `records[i]`, in display form
    routes: Vec<String>,
    /// Normalized route or alias -> record index; primary routes win
    index: HashMap<String, usize>,
}

impl Collection {
    /// Build the collection once every document has been parsed
    pub fn new(mut records: Vec<ContentRecord>, permalink: &str) -> Self {
        records.sort_by(newest_first);

        let routes: Vec<String> = records
            .iter()
            .map(|r| {
                expand_permalink(
                    permalink,
                    &r.date,
                    &r.slug(),
                    r.categories.first().map(String::as_str),
                )
            })
            .collect();

        let mut index = HashMap::new();
        for (i, route) in routes.iter().enumerate() {
            index.entry(normalize_route(route)).or_insert(i);
        }
        for (i, record) in records.iter().enumerate() {
            for alias in record.aliases() {
                index.entry(normalize_route(alias)).or_insert(i);
            }
        }

        Self {
            records,
            routes,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records, most recent first
    pub fn posts(&self) -> &[ContentRecord] {
        &self.records
    }

    /// Records paired with their primary route
    pub fn entries(&self) -> impl Iterator<Item = (&ContentRecord, &str)> {
        self.records
            .iter()
            .zip(self.routes.iter().map(String::as_str))
    }

    /// Find a record by its primary route or one of its aliases
    pub fn resolve(&self, path: &str) -> Option<&ContentRecord> {
        self.index
            .get(&normalize_route(path))
            .map(|&i| &self.records[i])
    }

    pub fn tags(&self) -> Vec<Count> {
        counts(self.records.iter().flat_map(|r| r.tags.iter().cloned()))
    }

    pub fn categories(&self) -> Vec<Count> {
        counts(self.records.iter().flat_map(|r| r.categories.iter().cloned()))
    }

    /// Code block languages across all bodies
    pub fn languages(&self) -> Vec<Count> {
        counts(self.records.iter().flat_map(|r| r.code_languages()))
    }

    pub fn tagged(&self, tag: &str) -> Vec<&ContentRecord> {
        self.records
            .iter()
            .filter(|r| r.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Records filed under a category at any level
    pub fn in_category(&self, category: &str) -> Vec<&ContentRecord> {
        self.records
            .iter()
            .filter(|r| r.categories.iter().any(|c| c == category))
            .collect()
    }

    /// Every series name with its posts in reading order (oldest first)
    pub fn series(&self) -> BTreeMap<&str, Vec<&ContentRecord>> {
        let mut series: BTreeMap<&str, Vec<&ContentRecord>> = BTreeMap::new();
        for record in self.records.iter().rev() {
            for name in record.series() {
                series.entry(name.as_str()).or_default().push(record);
            }
        }
        series
    }

    /// Records grouped by year, newest year first
    pub fn archives(&self) -> Vec<(i32, Vec<&ContentRecord>)> {
        let mut years: Vec<(i32, Vec<&ContentRecord>)> = Vec::new();
        for record in &self.records {
            if let Some((year, posts)) = years.last_mut() {
                if *year == record.year() {
                    posts.push(record);
                    continue;
                }
            }
            years.push((record.year(), vec![record]));
        }
        years
    }

    /// Cross-record validation, plus aliases that collide with another
    /// record's primary route
    pub fn validate<'a>(
        &'a self,
        assets: &'a dyn AssetLookup,
    ) -> impl Iterator<Item = ValidationError> + 'a {
        validate_collection(&self.records, assets).chain(self.shadowed_routes())
    }

    fn shadowed_routes(&self) -> impl Iterator<Item = ValidationError> + '_ {
        self.records.iter().flat_map(move |record| {
            record.aliases().iter().filter_map(move |alias| {
                let owner = self.routes.iter().position(|route| {
                    normalize_route(route) == normalize_route(alias)
                })?;
                let owner = &self.records[owner];
                (owner.source != record.source).then(|| ValidationError::AliasShadowsRoute {
                    document: record.source.clone(),
                    alias: display_route(alias),
                    owner: owner.source.clone(),
                })
            })
        })
    }
}

/// Count labels, most used first, then by name
fn counts<I: Iterator<Item = String>>(labels: I) -> Vec<Count> {
    let mut map: HashMap<String, usize> = HashMap::new();
    for label in labels {
        *map.entry(label).or_insert(0) += 1;
    }
    let mut counts: Vec<Count> = map
        .into_iter()
        .map(|(name, count)| Count { name, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn record(source: &str, date: &str, extra: &str) -> ContentRecord {
        let text = format!(
            "---\nauthor: yuhao\ntitle: {}\ndate: {}\n{}---\n```csharp\nx();\n```\n",
            source, date, extra
        );
        ContentRecord::parse(&text).unwrap().with_source(source)
    }

    fn sample() -> Collection {
        Collection::new(
            vec![
                record(
                    "posts/di-basics/index.md",
                    "2024-11-02",
                    "tags: [csharp, di]\ncategories: [dotnet]\nseries: [DI]\naliases: [/old/di/]\n",
                ),
                record(
                    "posts/di-lifetimes/index.md",
                    "2025-02-17",
                    "tags: [csharp, di]\ncategories: [dotnet]\nseries: [DI]\n",
                ),
                record(
                    "posts/strings/index.md",
                    "2025-01-05",
                    "tags: [csharp]\ncategories: [dotnet, strings]\n",
                ),
            ],
            ":year/:month/:slug/",
        )
    }

    #[test]
    fn test_sorted_newest_first() {
        let collection = sample();
        let sources: Vec<&str> = collection.posts().iter().map(|r| r.source.as_str()).collect();
        assert_eq!(
            sources,
            vec![
                "posts/di-lifetimes/index.md",
                "posts/strings/index.md",
                "posts/di-basics/index.md"
            ]
        );
    }

    #[test]
    fn test_routes_and_resolve() {
        let collection = sample();
        let (first, route) = collection.entries().next().unwrap();
        assert_eq!(first.source, "posts/di-lifetimes/index.md");
        assert_eq!(route, "/2025/02/di-lifetimes/");

        assert_eq!(
            collection.resolve("/2025/02/di-lifetimes").unwrap().source,
            "posts/di-lifetimes/index.md"
        );
        assert_eq!(
            collection.resolve("old/di").unwrap().source,
            "posts/di-basics/index.md"
        );
        assert!(collection.resolve("/nope/").is_none());
    }

    #[test]
    fn test_counts() {
        let collection = sample();
        assert_eq!(
            collection.tags(),
            vec![
                Count {
                    name: "csharp".to_string(),
                    count: 3
                },
                Count {
                    name: "di".to_string(),
                    count: 2
                },
            ]
        );
        assert_eq!(collection.categories()[0].name, "dotnet");
        assert_eq!(collection.languages()[0].count, 3);
        assert_eq!(collection.tagged("di").len(), 2);
        assert_eq!(collection.in_category("strings").len(), 1);
    }

    #[test]
    fn test_series_in_reading_order() {
        let collection = sample();
        let series = collection.series();
        let di: Vec<&str> = series["DI"].iter().map(|r| r.source.as_str()).collect();
        assert_eq!(
            di,
            vec!["posts/di-basics/index.md", "posts/di-lifetimes/index.md"]
        );
    }

    #[test]
    fn test_archives() {
        let collection = sample();
        let archives = collection.archives();
        assert_eq!(archives.len(), 2);
        assert_eq!(archives[0].0, 2025);
        assert_eq!(archives[0].1.len(), 2);
        assert_eq!(archives[1].0, 2024);
    }

    #[test]
    fn test_alias_shadowing_route() {
        let collection = Collection::new(
            vec![
                record("posts/a/index.md", "2025-01-01", ""),
                record("posts/b/index.md", "2025-01-02", "aliases: [/2025/01/a/]\n"),
            ],
            ":year/:month/:slug/",
        );
        let errors: Vec<_> = collection.validate(&HashSet::<PathBuf>::new()).collect();
        assert_eq!(
            errors,
            vec![ValidationError::AliasShadowsRoute {
                document: "posts/b/index.md".to_string(),
                alias: "/2025/01/a/".to_string(),
                owner: "posts/a/index.md".to_string(),
            }]
        );
        // The primary route keeps resolving to its own record
        assert_eq!(
            collection.resolve("/2025/01/a/").unwrap().source,
            "posts/a/index.md"
        );
    }

    #[test]
    fn test_empty_collection() {
        let collection = Collection::new(Vec::new(), ":slug/");
        assert!(collection.is_empty());
        assert_eq!(collection.validate(&HashSet::<PathBuf>::new()).count(), 0);
        assert!(collection.archives().is_empty());
    }
}
