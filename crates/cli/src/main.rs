use anyhow::{anyhow, Context, Result};
use api_client::{ClientConfig, GenerationApi, HttpGenerationClient, Model};
use clap::{Parser, Subcommand};
use prompt::{clean_ai_response, step_count, Resolution};
use session::{Orientation, PromptMode, ResponseState, Session, VideoHandoff, VideoSession};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "animegen-cli")]
#[command(about = "Headless client for the anime image/video generation backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL
    #[arg(long, global = true, default_value = "http://127.0.0.1:5000")]
    api_url: String,

    /// Client configuration file (JSON); overrides --api-url
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate images from a direct prompt
    Generate {
        prompt: String,

        /// Output resolution as WxH
        #[arg(long, default_value = "1024x1024")]
        resolution: String,

        /// Generation seed (random when omitted)
        #[arg(long)]
        seed: Option<u32>,

        /// Image model (lumina, chroma)
        #[arg(long, default_value = "lumina")]
        model: String,

        /// Enrich the prompt with AI before generating
        #[arg(long)]
        improve: bool,
    },

    /// Run the step-by-step prompt wizard on stdin
    Wizard {
        /// Output resolution as WxH
        #[arg(long, default_value = "1024x1024")]
        resolution: String,

        /// Image model (lumina, chroma)
        #[arg(long, default_value = "lumina")]
        model: String,

        /// Convert the final prompt to natural language
        #[arg(long)]
        improve: bool,

        /// Show tag suggestions before each step
        #[arg(long)]
        suggest: bool,
    },

    /// List tag suggestions for a wizard step category
    Tags {
        category: String,

        /// Tags to exclude from the listing
        #[arg(long)]
        excluded: Vec<String>,
    },

    /// Rewrite a tag prompt as natural language
    Enrich { prompt: String },

    /// Generate a video from a previously generated image
    Video {
        prompt: String,

        /// Source image filename on the backend
        #[arg(long)]
        filename: String,

        /// Source image subfolder
        #[arg(long, default_value = "")]
        subfolder: String,

        /// Framing preset (square, portrait, landscape)
        #[arg(long, default_value = "square")]
        orientation: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("load client config {}", path.display()))?,
        None => ClientConfig::new(cli.api_url.clone()),
    };
    let base_url = config.base_url.clone();
    let client: Arc<dyn GenerationApi> = Arc::new(HttpGenerationClient::new(config)?);

    match cli.command {
        Commands::Generate {
            prompt,
            resolution,
            seed,
            model,
            improve,
        } => generate_command(client, &base_url, &prompt, &resolution, seed, &model, improve).await,
        Commands::Wizard {
            resolution,
            model,
            improve,
            suggest,
        } => wizard_command(client, &base_url, &resolution, &model, improve, suggest).await,
        Commands::Tags { category, excluded } => tags_command(client, &category, &excluded).await,
        Commands::Enrich { prompt } => enrich_command(client, &prompt).await,
        Commands::Video {
            prompt,
            filename,
            subfolder,
            orientation,
        } => video_command(client, &base_url, &prompt, &filename, &subfolder, &orientation).await,
    }
}

async fn generate_command(
    client: Arc<dyn GenerationApi>,
    base_url: &str,
    prompt_text: &str,
    resolution: &str,
    seed: Option<u32>,
    model: &str,
    improve: bool,
) -> Result<()> {
    let resolution: Resolution = resolution.parse()?;
    let model: Model = model.parse().map_err(|e: String| anyhow!(e))?;

    let mut session = Session::new(client, PromptMode::Direct);
    session.set_resolution(resolution);
    session.set_model(model);
    session.set_seed(seed);
    session.set_improve_with_ai(improve);

    session.submit_direct(prompt_text).await?;
    report_last_message(&session, base_url)
}

async fn wizard_command(
    client: Arc<dyn GenerationApi>,
    base_url: &str,
    resolution: &str,
    model: &str,
    improve: bool,
    suggest: bool,
) -> Result<()> {
    let resolution: Resolution = resolution.parse()?;
    let model: Model = model.parse().map_err(|e: String| anyhow!(e))?;

    let mut session = Session::new(client, PromptMode::Interactive);
    session.set_resolution(resolution);
    session.set_model(model);
    session.set_improve_with_ai(improve);

    info!(seed = session.current_seed(), "starting prompt wizard");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !session.flow_completed() {
        let Some(step) = session.current_step_info() else {
            break;
        };
        println!(
            "[{}/{}] {}: {}",
            session.current_step() + 1,
            step_count(),
            step.name,
            step.placeholder
        );

        if suggest {
            if let Err(err) = session.load_tags().await {
                warn!("tag suggestions unavailable: {err}");
            } else if !session.tags().displayed().is_empty() {
                println!("  suggestions: {}", session.tags().displayed().join(", "));
            }
        }

        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let input = line?;
        let before = session.chat().len();
        session.submit_step(&input).await?;
        if session.chat().len() > before {
            report_last_message(&session, base_url)?;
        }
    }

    if session.flow_completed() {
        println!("Flow completed. Final prompt: {}", session.accumulated_prompt());
    }
    Ok(())
}

async fn tags_command(
    client: Arc<dyn GenerationApi>,
    category: &str,
    excluded: &[String],
) -> Result<()> {
    let response = client.tags(category, excluded).await?;
    if !response.success {
        return Err(anyhow!(response
            .error
            .unwrap_or_else(|| "tag listing failed".into())));
    }
    if response.tags.is_empty() {
        println!("No tags for category {category:?}");
    }
    for tag in response.tags {
        println!("{tag}");
    }
    Ok(())
}

async fn enrich_command(client: Arc<dyn GenerationApi>, prompt_text: &str) -> Result<()> {
    let response = client.to_natural_language(prompt_text).await?;
    if !response.success {
        return Err(anyhow!(response
            .error
            .unwrap_or_else(|| "conversion failed".into())));
    }
    let cleaned = response
        .natural_language_prompt
        .map(|text| clean_ai_response(&text))
        .filter(|text| !text.is_empty())
        .ok_or_else(|| anyhow!("conversion produced no usable text"))?;
    println!("{cleaned}");
    Ok(())
}

async fn video_command(
    client: Arc<dyn GenerationApi>,
    base_url: &str,
    prompt_text: &str,
    filename: &str,
    subfolder: &str,
    orientation: &str,
) -> Result<()> {
    let handoff = VideoHandoff {
        image: api_client::MediaDescriptor::output(filename, subfolder),
        original_name: None,
        mime_type: None,
        prompt: prompt_text.to_string(),
        resolution: orientation.to_string(),
    };
    let mut video = VideoSession::from_handoff(client, handoff);
    info!(
        orientation = Orientation::from_raw(orientation).label(),
        "generating video"
    );
    video.generate().await;

    if let Some(err) = video.last_error() {
        return Err(anyhow!(err.to_string()));
    }
    for media in video.results() {
        println!("{}", media.url(base_url, false));
    }
    Ok(())
}

fn report_last_message(session: &Session, base_url: &str) -> Result<()> {
    let Some(message) = session.chat().messages().last() else {
        return Ok(());
    };
    match &message.response {
        ResponseState::Success(media) => {
            for item in media {
                println!("{}", item.url(base_url, false));
            }
        }
        ResponseState::Error(err) => warn!("generation failed: {err}"),
        ResponseState::Cancelled => info!("generation cancelled"),
        ResponseState::Loading => {}
    }
    Ok(())
}
