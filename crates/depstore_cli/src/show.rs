//! `depstore show`: print the recorded dependency of one extension.

use depstore_cache::ActivatedExtensionDescriptor;

use crate::project::Project;
use crate::{OutputFormat, ShowArgs};

/// Runs the `depstore show` command.
///
/// Returns exit code 0 if the extension is recorded, 1 otherwise.
pub fn run(args: &ShowArgs, project: &Project) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(descriptor) = project.store.get_descriptor(&args.extension_id)? else {
        eprintln!(
            "error: no dependency recorded for extension '{}'",
            args.extension_id
        );
        return Ok(1);
    };
    println!("{}", render(&descriptor, args.format)?);
    Ok(0)
}

fn render(
    descriptor: &ActivatedExtensionDescriptor,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format!(
            "ExtensionId: {}\nLoaderName:  {}\nVirtualPath: {}\nHash:        {}",
            descriptor.extension_id,
            descriptor.loader_name,
            descriptor.virtual_path,
            descriptor.hash
        )),
        OutputFormat::Json => serde_json::to_string_pretty(descriptor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GlobalArgs;
    use depstore_cache::DependencyDescriptor;

    fn descriptor() -> ActivatedExtensionDescriptor {
        ActivatedExtensionDescriptor {
            extension_id: "Blog".to_string(),
            loader_name: "DynamicExtensionLoader".to_string(),
            virtual_path: "~/Modules/Blog/Blog.csproj".to_string(),
            hash: "h1".to_string(),
        }
    }

    #[test]
    fn text_lists_every_field() {
        let text = render(&descriptor(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("ExtensionId: Blog"));
        assert!(text.contains("LoaderName:  DynamicExtensionLoader"));
        assert!(text.ends_with("Hash:        h1"));
    }

    #[test]
    fn json_is_a_single_object() {
        let json = render(&descriptor(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["VirtualPath"], "~/Modules/Blog/Blog.csproj");
    }

    #[test]
    fn exit_code_reflects_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(dir.path().display().to_string()),
            root: None,
        };
        let project = Project::open(&global).unwrap();
        project
            .store
            .store_dependencies(
                &[DependencyDescriptor::new(
                    "Blog",
                    "DynamicExtensionLoader",
                    "~/Modules/Blog/Blog.csproj",
                )],
                |_| "h1".to_string(),
            )
            .unwrap();

        let found = ShowArgs {
            extension_id: "BLOG".to_string(),
            format: OutputFormat::Text,
        };
        assert_eq!(run(&found, &project).unwrap(), 0);

        let missing = ShowArgs {
            extension_id: "Pages".to_string(),
            format: OutputFormat::Text,
        };
        assert_eq!(run(&missing, &project).unwrap(), 1);
    }
}
