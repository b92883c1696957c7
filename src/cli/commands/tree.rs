//! Tree command - print the project tree embedded in the manifest.

use anyhow::Context;

use crate::config::Settings;
use crate::tree::TreeRenderer;

pub fn run(settings: &Settings) -> anyhow::Result<()> {
    let root = settings.project_root();
    let root = root
        .canonicalize()
        .with_context(|| format!("project root {} is not accessible", root.display()))?;

    let renderer = TreeRenderer::new(settings.tree.exclude.iter().cloned());
    let rendered = renderer.render(&root);
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}
