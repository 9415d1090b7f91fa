use std::sync::Arc;

use movie_catalog::{
    controllers::{ListSnapshot, Playback, TrailerState},
    Config, DetailController, MovieProvider, SearchController, TmdbProvider,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_catalog=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let provider: Arc<dyn MovieProvider> = Arc::new(TmdbProvider::from_config(&config));

    let search = SearchController::new(Arc::clone(&provider));
    let detail = DetailController::new(provider);

    search.load_popular().await;
    print_list(&search.snapshot().await);
    println!("Type to search, ':open N' for details, ':trailer', ':back', ':quit'");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.split_once(' ').unwrap_or((line.as_str(), "")) {
            (":quit", _) => break,
            (":back", _) => {
                detail.close().await;
                print_list(&search.snapshot().await);
            }
            (":trailer", _) => match detail.play_trailer().await {
                Playback::Play { embed_url } => println!("Playing {}", embed_url),
                Playback::Notice(notice) => println!("{}", notice),
            },
            (":open", index) => {
                let snapshot = search.snapshot().await;
                let movie = index
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| snapshot.movies.get(i).cloned());

                let Some(movie) = movie else {
                    println!("No such movie");
                    continue;
                };

                println!("{} ({})", movie.title, movie.vote_average);
                if let Some(year) = movie.release_year() {
                    println!("Released {}", year);
                }
                if let Some(poster) = movie.poster_url(&config.tmdb_image_url) {
                    println!("Poster {}", poster);
                }
                println!("{}", movie.overview);

                detail.select(movie).await;
                detail.settled().await;
                if let TrailerState::Available(key) = detail.trailer().await {
                    println!("Trailer ready ({})", key);
                }
            }
            _ => {
                search.set_query(&line).await;
                print_list(&search.snapshot().await);
            }
        }
    }

    Ok(())
}

fn print_list(snapshot: &ListSnapshot) {
    if let Some(failure) = snapshot.failure {
        println!("{}", failure.message());
    }
    for (i, movie) in snapshot.movies.iter().enumerate() {
        println!("{:>3}. {} [{:.1}]", i + 1, movie.title, movie.vote_average);
    }
}
