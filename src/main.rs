use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use posterkit::catalog::{InMemoryCatalog, PosterTemplate, TemplateSource};
use posterkit::pipeline::{AlbumPlacement, PipelineOutcome};
use posterkit::platform::{self, ConsoleFeedback, Platform, PlatformKind, PermissionStatus, StaticPermission};
use posterkit::rendering::FrameStyle;
use posterkit::resolver::{DecodingProbe, TemplateResolver};
use posterkit::{CapturePipeline, CompositionView, CustomizationSession, StudioConfig};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "posterkit")]
#[command(about = "Compose campaign posters and save them into a photo album")]
struct Cli {
    /// JSON config file; missing fields take their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Machine-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List poster templates
    Templates {
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive title search
        #[arg(long, default_value = "")]
        query: String,
        /// Poster API base URL instead of the built-in catalog
        #[arg(long)]
        catalog_url: Option<String>,
    },
    /// Render a poster to a PNG file
    Preview {
        #[command(flatten)]
        poster: PosterArgs,
        #[arg(long)]
        out: PathBuf,
    },
    /// Run the full capture pipeline and save into the album
    Download {
        #[command(flatten)]
        poster: PosterArgs,
        /// Media library directory
        #[arg(long)]
        library: Option<PathBuf>,
        #[arg(long)]
        album: Option<String>,
        /// Answer the storage permission prompt with "deny"
        #[arg(long)]
        deny_permission: bool,
    },
    /// Cut the background out of a profile photo
    RemoveBg {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        platform: Option<PlatformKind>,
    },
}

#[derive(Args)]
struct PosterArgs {
    /// Template id (see `posterkit templates`)
    #[arg(long)]
    template: String,
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    role: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    mobile: String,
    #[arg(long, default_value = "")]
    address: String,
    /// Social handle, e.g. @samajwadiparty
    #[arg(long, default_value = "")]
    social: String,
    /// Profile photo: path, file:// or http(s) URL, or data URI
    #[arg(long)]
    photo: Option<String>,
    #[arg(long, default_value = "classic")]
    frame: FrameStyle,
    #[arg(long)]
    catalog_url: Option<String>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

#[cfg_attr(not(feature = "remote"), allow(unused_variables))]
async fn load_templates(catalog_url: Option<&str>, config: &StudioConfig) -> anyhow::Result<Vec<PosterTemplate>> {
    match catalog_url {
        #[cfg(feature = "remote")]
        Some(url) => Ok(posterkit::catalog::HttpCatalog::new(url, config)?.templates().await?),
        #[cfg(not(feature = "remote"))]
        Some(_) => anyhow::bail!("--catalog-url needs the `remote` feature"),
        None => Ok(InMemoryCatalog::builtin().templates().await?),
    }
}

/// Open a session for the requested template, resolve its ratio and lay out the view
async fn compose(
    poster: &PosterArgs,
    config: &StudioConfig,
    platform: &Platform,
) -> anyhow::Result<(CustomizationSession, CompositionView)> {
    let templates = load_templates(poster.catalog_url.as_deref(), config).await?;
    let template = templates
        .into_iter()
        .find(|t| t.id == poster.template)
        .ok_or_else(|| anyhow!("no template with id '{}'", poster.template))?;

    let mut session = CustomizationSession::open(template, config.fallback_aspect_ratio);
    session.set_name(poster.name.as_str());
    session.set_role(poster.role.as_str());
    session.set_description(poster.description.as_str());
    session.set_mobile(poster.mobile.as_str());
    session.set_address(poster.address.as_str());
    session.set_social(poster.social.as_str());
    session.set_frame(poster.frame);
    if let Some(photo) = &poster.photo {
        session.select_profile_image(photo.as_str());
    }

    let resolver = TemplateResolver::new(Arc::new(DecodingProbe::new(platform.loader.clone())));
    resolver.refresh(&mut session).await;

    let mut view = CompositionView::new(config.canvas_width, config.campaign.clone());
    view.load_assets(&session, platform.loader.as_ref()).await;
    view.update(&session);
    Ok((session, view))
}

fn print_outcome(outcome: &PipelineOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        let value = match outcome {
            PipelineOutcome::Saved(saved) => {
                let album = match &saved.album {
                    AlbumPlacement::Created(a) | AlbumPlacement::Added(a) => serde_json::json!(a),
                    AlbumPlacement::Failed(msg) => serde_json::json!({ "error": msg }),
                };
                serde_json::json!({
                    "status": "saved",
                    "asset": saved.asset,
                    "album": album,
                    "digest": saved.artifact_digest,
                })
            }
            PipelineOutcome::Rejected(invalid) => serde_json::json!({
                "status": "rejected",
                "missing": invalid.missing.iter().map(|f| f.label()).collect::<Vec<_>>(),
            }),
            PipelineOutcome::Failed(kind) => serde_json::json!({
                "status": "failed",
                "reason": format!("{:?}", kind).to_lowercase(),
            }),
            PipelineOutcome::Busy => serde_json::json!({ "status": "busy" }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if let PipelineOutcome::Saved(saved) = outcome {
        println!("{}", saved.asset.uri);
        match &saved.album {
            AlbumPlacement::Created(a) => println!("album '{}' created", a.title),
            AlbumPlacement::Added(a) => println!("added to album '{}'", a.title),
            AlbumPlacement::Failed(msg) => println!("not added to an album: {}", msg),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => StudioConfig::from_json_file(path)?,
        None => StudioConfig::default(),
    };

    match cli.command {
        Commands::Templates {
            category,
            query,
            catalog_url,
        } => {
            let templates = load_templates(catalog_url.as_deref(), &config).await?;
            let matches = posterkit::catalog::filter_templates(&templates, category.as_deref(), &query);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                for t in &matches {
                    println!("{:<20} {:<12} {:>6}  {}", t.id, t.category, t.download_count, t.title);
                }
            }
        }
        Commands::Preview { poster, out } => {
            let platform = Platform::for_kind(PlatformKind::detect(), &config)?;
            let (_session, view) = compose(&poster, &config, &platform).await?;
            let pixels = view.render()?;
            pixels
                .save_with_format(&out, image::ImageFormat::Png)
                .with_context(|| format!("writing {}", out.display()))?;
            if !cli.json {
                println!("{} ({}x{})", out.display(), pixels.width(), pixels.height());
            }
        }
        Commands::Download {
            poster,
            library,
            album,
            deny_permission,
        } => {
            if let Some(dir) = library {
                config.library_root = Some(dir);
            }
            if let Some(name) = album {
                config.album_name = name;
            }
            config.validate()?;

            let mut platform = platform::bootstrap(&config)?.clone();
            if !cli.json {
                platform = platform.with_feedback(Arc::new(ConsoleFeedback));
            }
            if deny_permission {
                platform.permission = Arc::new(StaticPermission(PermissionStatus::Denied));
            }

            let (session, view) = compose(&poster, &config, &platform).await?;
            let mut pipeline = CapturePipeline::from_platform(&platform, &config);
            let outcome = pipeline.download(&session, &view).await;
            print_outcome(&outcome, cli.json)?;
            if !matches!(outcome, PipelineOutcome::Saved(_)) {
                std::process::exit(1);
            }
        }
        Commands::RemoveBg {
            input,
            output,
            endpoint,
            platform: kind,
        } => {
            if endpoint.is_some() {
                config.background_removal.endpoint = endpoint;
            }
            let kind = kind.unwrap_or_else(PlatformKind::detect);
            let platform = Platform::for_kind(kind, &config)?;
            let remover = platform
                .background_remover
                .ok_or_else(|| anyhow!("no background removal endpoint configured (use --endpoint)"))?;
            let bytes = tokio::fs::read(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let cut = remover.remove_background(&bytes).await?;
            tokio::fs::write(&output, &cut)
                .await
                .with_context(|| format!("writing {}", output.display()))?;
            if !cli.json {
                println!("Background removed successfully: {}", output.display());
            }
        }
    }

    Ok(())
}
