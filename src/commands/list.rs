//! List site content

use anyhow::Result;

use crate::content::Count;
use crate::helpers::format_date;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let (collection, errors) = site.load()?;
    if !errors.is_empty() {
        tracing::warn!(
            "{} document(s) failed to load; run `postcheck check` for details",
            errors.len()
        );
    }

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", collection.len());
            for (post, route) in collection.entries() {
                println!(
                    "  {} - {} [{}] {}",
                    format_date(&post.date, &site.config.date_format),
                    post.title,
                    post.source,
                    route
                );
            }
        }
        "tag" | "tags" => print_counts("Tags", &collection.tags()),
        "category" | "categories" => print_counts("Categories", &collection.categories()),
        "language" | "languages" => print_counts("Languages", &collection.languages()),
        "series" => {
            let series = collection.series();
            println!("Series ({}):", series.len());
            for (name, posts) in series {
                println!("  {}", name);
                for (i, post) in posts.iter().enumerate() {
                    println!("    {}. {}", i + 1, post.title);
                }
            }
        }
        "alias" | "aliases" => {
            println!("Aliases:");
            for (post, route) in collection.entries() {
                for alias in post.aliases() {
                    println!("  {} -> {}", alias, route);
                }
            }
        }
        "archive" | "archives" => {
            for (year, posts) in collection.archives() {
                println!("{} ({})", year, posts.len());
                for post in posts {
                    println!(
                        "  {} - {}",
                        format_date(&post.date, &site.config.date_format),
                        post.title
                    );
                }
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category, series, alias, archive, language",
                content_type
            );
        }
    }

    Ok(())
}

fn print_counts(heading: &str, counts: &[Count]) {
    println!("{} ({}):", heading, counts.len());
    for Count { name, count } in counts {
        println!("  {} ({})", name, count);
    }
}
