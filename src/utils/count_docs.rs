use clap::Parser;
use gamestore_backend::{
    store::{DocumentStore, FirestoreStore, Filter},
    Tracing,
};

/// Gamestore util for counting documents in the catalog collections.
#[derive(Parser)]
struct Opts {
    /// Google Cloud project id hosting the catalog.
    #[clap(long, default_value = "gamestore")]
    project_id: String,

    #[clap(default_value = "games")]
    collections: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    Tracing::setup("utils/count_docs")?;

    let opts: Opts = Opts::parse();
    let store = FirestoreStore::connect(&opts.project_id).await?;

    for collection in &opts.collections {
        let docs = store.find(collection, Filter::All).await?;
        println!("Found {} documents in {collection}", docs.len());
    }

    Ok(())
}
