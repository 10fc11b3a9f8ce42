pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{Router, routing::get};

pub fn build_api_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/api/songs",
            get(handlers::list_songs).post(handlers::create_song),
        )
        .route("/api/songs/filtered", get(handlers::list_filtered_songs))
        .route("/api/songs/artists", get(handlers::list_songs_by_artist))
        .route(
            "/api/songs/{id}",
            get(handlers::get_song)
                .put(handlers::update_song)
                .delete(handlers::delete_song),
        )
        .route("/api/songs/{id}/lyrics", get(handlers::get_song_lyrics))
}
