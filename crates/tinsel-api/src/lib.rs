pub mod auth;
pub mod elves;
pub mod error;
pub mod letters;
pub mod middleware;
pub mod parent;
pub mod reply;

use axum::{
    Router,
    routing::{get, post},
};

use crate::auth::AppState;

/// Assemble the API routes. The caller (server binary or tests) adds the
/// CORS and trace layers.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth", post(auth::dispatch))
        // GET is public; POST checks the kid token itself
        .route("/api/elves", get(elves::list_elves).post(elves::select_elf))
        .with_state(state.clone());

    let letter_routes = Router::new()
        .route(
            "/api/letters",
            get(letters::get_letters).post(letters::send_letter),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state.clone());

    let parent_routes = Router::new()
        .route(
            "/api/parent",
            get(parent::get_dispatch)
                .post(parent::post_dispatch)
                .put(parent::put_dispatch),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_parent_auth,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(letter_routes)
        .merge(parent_routes)
}
