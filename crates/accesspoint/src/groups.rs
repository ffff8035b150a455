//! `groups` subcommand.

use std::path::Path;

use accesspoint_console::GroupCatalog;
use miette::Result;

/// Print the known groups, or the ones matching `query`.
pub async fn run(groups_dir: &Path, query: Option<&str>) -> Result<()> {
    let catalog = GroupCatalog::load_dir(groups_dir)
        .await
        .map_err(|e| miette::miette!("failed to load groups: {}", e))?;

    for name in matching(&catalog, query) {
        println!("{}", name);
    }
    Ok(())
}

fn matching(catalog: &GroupCatalog, query: Option<&str>) -> Vec<String> {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => catalog.tag_input().suggest(query),
        None => catalog.names().to_vec(),
    }
}
