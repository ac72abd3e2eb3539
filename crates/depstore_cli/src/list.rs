//! `depstore list`: print every recorded dependency.

use depstore_cache::ActivatedExtensionDescriptor;

use crate::project::Project;
use crate::{ListArgs, OutputFormat};

/// Runs the `depstore list` command. Returns exit code 0.
pub fn run(args: &ListArgs, project: &Project) -> Result<i32, Box<dyn std::error::Error>> {
    let descriptors = project.store.load_descriptors()?;
    println!("{}", render(&descriptors, args.format)?);
    Ok(0)
}

/// Renders descriptors as one tab-separated line each, or a JSON array.
pub fn render(
    descriptors: &[ActivatedExtensionDescriptor],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(descriptors
            .iter()
            .map(|d| {
                format!(
                    "{}\t{}\t{}\t{}",
                    d.extension_id, d.loader_name, d.virtual_path, d.hash
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(descriptors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ActivatedExtensionDescriptor> {
        vec![
            ActivatedExtensionDescriptor {
                extension_id: "Blog".to_string(),
                loader_name: "DynamicExtensionLoader".to_string(),
                virtual_path: "~/Modules/Blog/Blog.csproj".to_string(),
                hash: "h1".to_string(),
            },
            ActivatedExtensionDescriptor {
                extension_id: "Pages".to_string(),
                loader_name: "PrecompiledExtensionLoader".to_string(),
                virtual_path: "~/Modules/Pages/bin/Pages.dll".to_string(),
                hash: "h2".to_string(),
            },
        ]
    }

    #[test]
    fn text_is_one_line_per_descriptor() {
        let text = render(&sample(), OutputFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Blog\tDynamicExtensionLoader\t~/Modules/Blog/Blog.csproj\th1"
        );
    }

    #[test]
    fn json_uses_record_field_names() {
        let json = render(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["ExtensionId"], "Pages");
        assert_eq!(value[1]["Hash"], "h2");
    }

    #[test]
    fn empty_json_is_an_empty_array() {
        assert_eq!(render(&[], OutputFormat::Json).unwrap(), "[]");
    }
}
