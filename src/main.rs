use clap::Parser;
use recommender::{
    api::{routes, AppState},
    cli::{commands, Cli, Commands},
    config::PipelineKind,
    embed::{Embedder, OpenAiEmbedder},
    engine::Recommender,
    generate::RecipeGenerator,
    index::PineconeIndex,
    recipe::Corpus,
    Error, Result, Settings,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    // Silently ignore if file doesn't exist
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recommender=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_env()?;

    // Handle commands
    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Recommend {
            ingredients,
            filter,
            extras,
            server,
        } => {
            let server_url = server.unwrap_or_else(|| settings.server_url());
            commands::recommend(&server_url, &ingredients, filter, extras).await?;
        }
        Commands::Recipes { server } => {
            let server_url = server.unwrap_or_else(|| settings.server_url());
            commands::list_recipes(&server_url).await?;
        }
        Commands::Upload {
            recipes,
            batch_size,
        } => {
            upload(settings, recipes, batch_size).await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }
    settings.validate()?;

    info!("Starting recipe recommender");
    info!("Recipes: {}", settings.corpus.path.display());
    info!("Pipeline: {}", settings.pipeline);

    let corpus = Arc::new(Corpus::load(&settings.corpus.path).await?);
    if corpus.is_empty() {
        warn!("Recipe dataset is empty - every query will return no results");
    }

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(
        &settings.embedding,
        settings.upstream_timeout(),
    )?);
    info!(
        "Embedding model: {} at {}",
        embedder.model_name(),
        settings.embedding.base_url
    );

    let recommender = match settings.pipeline {
        PipelineKind::Local => Recommender::local(corpus, embedder).await?,
        PipelineKind::Index => {
            let index = PineconeIndex::new(&settings.index, settings.upstream_timeout())?;
            info!("Vector index ready (top_k: {})", settings.index.top_k);
            Recommender::with_index(corpus, embedder, Arc::new(index), settings.index.top_k)
        }
    };

    let generator = RecipeGenerator::new(&settings.generation, settings.upstream_timeout())?;
    if !generator.is_configured() {
        warn!("OPENAI_API_KEY not set - /ai_recipe will return an error");
    }

    // Create application state
    let state = AppState {
        recommender: Arc::new(recommender),
        generator: Arc::new(generator),
        settings: settings.clone(),
    };

    let app = routes::create_router(state.clone(), &settings);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Recipe Recommender");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!("Recipes: {}", state.recommender.corpus().len());
    println!("Pipeline: {}", settings.pipeline);
    println!(
        "AI recipes: {}",
        if state.generator.is_configured() {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    println!("\nAPI Endpoints:");
    println!("  POST /recommend");
    println!("  GET  /all_recipes");
    println!("  POST /ai_recipe");
    println!("  GET  /health");
    println!("  GET  /ready");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

async fn upload(settings: Settings, recipes: Option<PathBuf>, batch_size: usize) -> Result<()> {
    settings.validate()?;
    let path = recipes.unwrap_or_else(|| settings.corpus.path.clone());

    info!("Uploading {} to the vector index", path.display());
    let written = commands::upload(&settings, &path, batch_size).await?;

    println!("\u{2713} Uploaded {written} recipes");
    Ok(())
}
