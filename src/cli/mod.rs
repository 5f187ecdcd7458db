pub mod commands;

use crate::filter::FilterPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "recommender")]
#[command(about = "Recipe recommender - find recipes for the ingredients you have", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the recommendation server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Ask a running server for recipe recommendations
    Recommend {
        /// Ingredients, separated by spaces or commas
        #[arg(required = true)]
        ingredients: Vec<String>,

        /// Filter type: strict, flexible or loose
        #[arg(short, long, default_value = "strict")]
        filter: FilterPolicy,

        /// Extra ingredients allowed by the flexible filter
        #[arg(short, long, default_value_t = 0)]
        extras: usize,

        /// Server URL (defaults to the configured host and port)
        #[arg(long)]
        server: Option<String>,
    },

    /// List every recipe known to a running server
    Recipes {
        /// Server URL (defaults to the configured host and port)
        #[arg(long)]
        server: Option<String>,
    },

    /// Embed the recipe dataset and upload it to the vector index
    Upload {
        /// Recipe dataset (defaults to RECIPES_PATH)
        #[arg(short, long)]
        recipes: Option<PathBuf>,

        /// Vectors per upsert request
        #[arg(long, default_value_t = crate::index::DEFAULT_UPSERT_BATCH)]
        batch_size: usize,
    },
}
