use chrono::{TimeZone, Utc};
use clap::Parser;
use gamestore_backend::{
    catalog::{platforms, Associations},
    documents::{GameInput, PlatformInput, PlatformLogo},
    store::FirestoreStore,
    util::slug::slugify,
    Tracing,
};

/// Gamestore util that seeds a fresh environment with a few platforms and a
/// game wired through the association sync pipeline.
#[derive(Parser)]
struct Opts {
    /// Google Cloud project id hosting the catalog.
    #[clap(long, default_value = "gamestore")]
    project_id: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    Tracing::setup("utils/seed_catalog")?;

    let opts: Opts = Opts::parse();
    let store = FirestoreStore::connect(&opts.project_id).await?;

    for name in ["Nintendo Switch", "PlayStation 4", "Xbox 360"] {
        let platform = platforms::insert(
            &store,
            PlatformInput {
                name: name.to_owned(),
                slug: slugify(name),
                platform_logo: PlatformLogo {
                    height: 128,
                    width: 128,
                    url: format!("https://images.gamestore.example/logos/{}.png", slugify(name)),
                },
            },
        )
        .await?;
        println!("Inserted platform '{}' as '{}'", platform.name, platform.id);
    }

    let input = GameInput {
        name: "Minecraft".to_owned(),
        slug: slugify("Minecraft"),
        summary: "Build, mine and survive in a procedurally generated world of blocks.".to_owned(),
        url: "https://www.minecraft.net".to_owned(),
        cover_url: "https://images.gamestore.example/covers/minecraft.png".to_owned(),
        first_release_date: Some(
            Utc.with_ymd_and_hms(2011, 11, 18, 0, 0, 0)
                .unwrap()
                .timestamp(),
        ),
        platform_slugs: vec![
            "nintendo-switch".to_owned(),
            "playstation-4".to_owned(),
            "xbox-360".to_owned(),
        ],
        ..Default::default()
    };

    let (game, report) = Associations::create_game(&store, input).await?;
    println!("Inserted game '{}' as '{}'", game.name, game.id);
    if !report.dropped.is_empty() {
        println!("Dropped unknown platform slugs: {:?}", report.dropped);
    }
    if !report.failed.is_empty() {
        println!("Platforms left unsynced: {:?}", report.failed);
    }

    Ok(())
}
