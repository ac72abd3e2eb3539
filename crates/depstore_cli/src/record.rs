//! `depstore record`: write the dependency record from a manifest.
//!
//! Each extension handled by a supported loader is hashed by reading its
//! artifact through the content store; the store then decides whether the
//! record needs rewriting.

use std::collections::BTreeMap;
use std::path::Path;

use depstore_cache::StoreOutcome;
use depstore_common::VirtualPath;

use crate::manifest::ExtensionManifest;
use crate::project::Project;
use crate::{GlobalArgs, RecordArgs};

/// Runs the `depstore record` command.
///
/// Returns exit code 0 on success. Missing artifacts fail the command
/// before anything is written.
pub fn run(
    args: &RecordArgs,
    project: &Project,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let manifest = ExtensionManifest::load(Path::new(&args.manifest))?;
    let descriptors = manifest.descriptors();

    let mut hashes: BTreeMap<&str, String> = BTreeMap::new();
    for descriptor in descriptors
        .iter()
        .filter(|d| project.store.is_supported_loader(&d.loader_name))
    {
        if hashes.contains_key(descriptor.virtual_path.as_str()) {
            continue;
        }
        let path = project
            .content
            .resolve_virtual_path(&VirtualPath::root(), &descriptor.virtual_path);
        let hash = project.content.content_hash(&path).map_err(|e| {
            format!(
                "cannot hash {} for extension '{}' ({}): {e}",
                path,
                descriptor.name,
                project.content.map_to_physical_path(&path).display()
            )
        })?;
        hashes.insert(descriptor.virtual_path.as_str(), hash.to_hex());
    }

    let outcome = project.store.store_dependencies(&descriptors, |d| {
        hashes
            .get(d.virtual_path.as_str())
            .cloned()
            .unwrap_or_default()
    })?;

    match outcome {
        StoreOutcome::Written { entries } => println!("wrote {entries} entries"),
        StoreOutcome::Unchanged => println!("unchanged"),
    }
    if !global.quiet {
        eprintln!(
            "     Record {}",
            project
                .content
                .map_to_physical_path(project.store.record_path())
                .display()
        );
    }
    Ok(0)
}
