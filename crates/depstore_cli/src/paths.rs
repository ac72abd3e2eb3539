//! `depstore paths`: print the virtual paths an extension depends on.

use crate::project::Project;
use crate::PathsArgs;

/// Runs the `depstore paths` command. Prints zero or one line and returns
/// exit code 0 either way.
pub fn run(args: &PathsArgs, project: &Project) -> Result<i32, Box<dyn std::error::Error>> {
    for line in render(args, project)? {
        println!("{line}");
    }
    Ok(0)
}

fn render(args: &PathsArgs, project: &Project) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    Ok(project
        .store
        .virtual_path_dependencies(&args.extension_id)?
        .map(|path| path.to_string())
        .collect())
}
