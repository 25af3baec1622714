use anyhow::Result;
use clap::Parser;
use journal_render::{references, AssetUrlResolver};
use std::io::Write;
use std::path::PathBuf;

/// Print the server-side assets referenced by an entry body, one per line.
#[derive(Parser, Debug, Clone)]
pub struct Refs {
    /// Markdown file, stdin is read if omitted.
    #[clap(index = 1)]
    input: Option<PathBuf>,
}

impl Refs {
    pub fn run(&self) -> Result<()> {
        let body = crate::read_input(self.input.as_deref())?;

        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        for reference in references::extract_references(&body) {
            writeln!(lock, "{reference}")?;
        }

        Ok(())
    }
}

/// Print the entry body with asset references appended.
#[derive(Parser, Debug, Clone)]
pub struct Append {
    /// Markdown file, stdin is read if omitted.
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// Asset filenames or URLs to append.
    #[clap(required = true)]
    refs: Vec<String>,
}

impl Append {
    pub fn run(&self) -> Result<()> {
        let body = crate::read_input(self.input.as_deref())?;
        let body = references::append_references(&body, &self.refs);
        write!(std::io::stdout().lock(), "{body}")?;
        Ok(())
    }
}

/// Print the entry body with every mention of an asset removed.
#[derive(Parser, Debug, Clone)]
pub struct Remove {
    /// Markdown file, stdin is read if omitted.
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// Asset filename or URL to remove.
    reference: String,
}

impl Remove {
    pub fn run(&self) -> Result<()> {
        let body = crate::read_input(self.input.as_deref())?;
        let body = references::remove_reference(&body, &self.reference);
        write!(std::io::stdout().lock(), "{body}")?;
        Ok(())
    }
}

/// Print the URL of the first non-video image of an entry body.
#[derive(Parser, Debug, Clone)]
pub struct Featured {
    /// Markdown file, stdin is read if omitted.
    #[clap(index = 1)]
    input: Option<PathBuf>,
}

impl Featured {
    pub fn run(&self, resolver: &AssetUrlResolver) -> Result<()> {
        let body = crate::read_input(self.input.as_deref())?;
        if let Some(url) = references::featured_image(&body, resolver) {
            writeln!(std::io::stdout().lock(), "{url}")?;
        }
        Ok(())
    }
}

/// Print the media of an entry body as a JSON array.
#[derive(Parser, Debug, Clone)]
pub struct Media {
    /// Markdown file, stdin is read if omitted.
    #[clap(index = 1)]
    input: Option<PathBuf>,
}

impl Media {
    pub fn run(&self, resolver: &AssetUrlResolver) -> Result<()> {
        let body = crate::read_input(self.input.as_deref())?;
        let media = references::collect_media(&body, resolver);
        writeln!(
            std::io::stdout().lock(),
            "{}",
            serde_json::to_string(&media)?
        )?;
        Ok(())
    }
}
