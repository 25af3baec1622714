use crate::command;
use crate::logger;
use anyhow::Result;
use clap::{Parser, Subcommand};
use journal_config::Config;
use journal_render::{AssetAwareRenderer, AssetUrlResolver, AssetUrlScheme};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum RunCmd {
    /// Render an entry body to sanitized HTML.
    #[clap(name = "render")]
    Render(command::render::Render),
    /// List the server-side assets referenced by an entry body.
    #[clap(name = "refs")]
    Refs(command::references::Refs),
    /// Append asset references to an entry body.
    #[clap(name = "append")]
    Append(command::references::Append),
    /// Remove an asset reference from an entry body.
    #[clap(name = "remove")]
    Remove(command::references::Remove),
    /// Print the URL of the image featured for an entry.
    #[clap(name = "featured")]
    Featured(command::references::Featured),
    /// List the media of an entry as JSON.
    #[clap(name = "media")]
    Media(command::references::Media),
}

/// Global CLI arguments.
#[derive(Parser, Debug, Clone, Default)]
pub struct Args {
    /// Enable the logging system.
    #[clap(long, global = true)]
    pub log: Option<PathBuf>,

    /// Specify the path of the config file.
    #[clap(long, global = true)]
    pub config_file: Option<PathBuf>,

    /// Override the asset base URL from the config file.
    #[clap(long, global = true)]
    pub asset_base_url: Option<String>,

    /// Override how asset filenames are attached to the base URL (path or query).
    #[clap(long, global = true)]
    pub url_scheme: Option<AssetUrlScheme>,
}

impl Args {
    /// Asset resolver from the config, with the command line overrides applied.
    pub fn asset_resolver(&self, config: &Config) -> AssetUrlResolver {
        if self.asset_base_url.is_none() && self.url_scheme.is_none() {
            return config.asset_resolver();
        }

        let base_url = self
            .asset_base_url
            .clone()
            .unwrap_or_else(|| config.assets.base_url.clone());
        let scheme = self.url_scheme.unwrap_or(config.assets.url_scheme);
        AssetUrlResolver::new(base_url, scheme)
    }

    /// Renderer built from the config and the command line overrides.
    pub fn renderer(&self, config: &Config) -> Result<AssetAwareRenderer> {
        Ok(AssetAwareRenderer::with_options(
            self.asset_resolver(config),
            config.sanitization_policy()?,
            config.markdown_options(),
        ))
    }
}

impl RunCmd {
    pub fn run(self, args: Args) -> Result<()> {
        let (config, config_err) = journal_config::load_config_on_startup(args.config_file.clone());

        let _guard = logger::init(args.log.clone(), &config.log)?;

        if let Some(err) = config_err {
            tracing::warn!(?err, "Failed to load config, falling back to the defaults");
        }

        let renderer = args.renderer(config)?;

        tracing::debug!(
            base_url = renderer.resolver().base_url(),
            scheme = ?renderer.resolver().scheme(),
            "Running {self:?}"
        );

        match self {
            Self::Render(render) => render.run(&renderer),
            Self::Refs(refs) => refs.run(),
            Self::Append(append) => append.run(),
            Self::Remove(remove) => remove.run(),
            Self::Featured(featured) => featured.run(renderer.resolver()),
            Self::Media(media) => media.run(renderer.resolver()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_config::SanitizeConfig;

    #[test]
    fn test_asset_resolver_overrides() {
        let config = Config::default();

        let args = Args::default();
        assert_eq!(args.asset_resolver(&config).resolve("a.jpg"), "/web/assets/a.jpg");

        let args = Args {
            asset_base_url: Some("https://h/v1/assets".into()),
            url_scheme: Some(AssetUrlScheme::Query),
            ..Default::default()
        };
        assert_eq!(
            args.asset_resolver(&config).resolve("a.jpg"),
            "https://h/v1/assets?path=a.jpg"
        );
    }

    #[test]
    fn test_renderer_rejects_unsafe_policy() {
        let config = Config {
            sanitize: SanitizeConfig {
                allowed_attributes: Some(vec!["href".into(), "onload".into()]),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = Args::default().renderer(&config).unwrap_err();
        assert!(err.to_string().contains("onload"));

        let config = Config {
            sanitize: SanitizeConfig {
                allowed_tags: Some(vec!["p".into(), "img".into()]),
                ..Default::default()
            },
            ..Default::default()
        };
        let renderer = Args::default().renderer(&config).unwrap();
        let html = renderer.render("# Title\n\n![](a.jpg)");
        assert!(!html.as_str().contains("<h1>"));
        assert!(html.as_str().contains(r#"<img src="/web/assets/a.jpg""#));
    }

    #[test]
    fn test_parse_subcommands() {
        #[derive(Parser, Debug)]
        struct TestApp {
            #[clap(flatten)]
            args: Args,
            #[clap(subcommand)]
            command: RunCmd,
        }

        let app = TestApp::parse_from([
            "journal",
            "append",
            "--input",
            "entry.md",
            "a.jpg",
            "b.mp4",
            "--url-scheme",
            "query",
        ]);
        assert_eq!(app.args.url_scheme, Some(AssetUrlScheme::Query));
        assert!(matches!(app.command, RunCmd::Append(_)));

        let app = TestApp::parse_from(["journal", "render", "--json"]);
        assert!(matches!(app.command, RunCmd::Render(_)));
    }
}
