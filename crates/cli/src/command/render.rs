use anyhow::Result;
use clap::Parser;
use journal_render::AssetAwareRenderer;
use std::io::Write;
use std::path::PathBuf;

/// Render an entry body to sanitized HTML.
#[derive(Parser, Debug, Clone)]
pub struct Render {
    /// Markdown file to render, stdin is read if omitted.
    #[clap(index = 1)]
    input: Option<PathBuf>,

    /// Print the rendered entry as JSON, along with its assets.
    #[clap(long)]
    json: bool,
}

impl Render {
    pub fn run(&self, renderer: &AssetAwareRenderer) -> Result<()> {
        let body = crate::read_input(self.input.as_deref())?;

        let stdout = std::io::stdout();
        let mut lock = stdout.lock();

        if self.json {
            let entry = renderer.render_entry(&body);
            tracing::debug!(
                assets = entry.assets.len(),
                featured_image = ?entry.featured_image,
                "Rendered entry"
            );
            writeln!(lock, "{}", serde_json::to_string(&entry)?)?;
        } else {
            write!(lock, "{}", renderer.render(&body))?;
        }

        Ok(())
    }
}
