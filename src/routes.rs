use std::sync::Arc;

use slog::{error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, Reply, WithStatus};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod query;
mod rejection;
mod response;

pub use internal::*;

/// The largest JSON body to accept. Mood entries and playlists are
/// small, so anything past this is a mistake.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024;

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if rej.find::<reject::InvalidQuery>().is_some() {
        let r = rejection::Rejection::new(
            rejection::Context::parse_query(),
            BackendError::MalformedQuery,
        );
        let status = status_code_for(&r.error);
        error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status);

        return Ok(with_status(json(&r.flatten(false)), status));
    }

    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        let status = status_code_for(e);
        error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        let flattened = r.flatten(status.is_server_error());

        return Ok(with_status(json(&flattened), status));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        Validation(..) | InvalidId(..) | MissingQuery | InvalidLimit(..) | MalformedQuery => {
            StatusCode::BAD_REQUEST
        }
        NonExistentId(..) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Combines every public route and turns our rejections into JSON
/// error responses.
pub fn make_api(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();

    make_create_route(environment.clone())
        .or(make_list_route(environment.clone()))
        .or(make_recent_route(environment.clone()))
        .or(make_detail_route(environment.clone()))
        .or(make_recommendations_route(environment.clone()))
        .or(make_refresh_route(environment.clone()))
        .or(make_save_playlist_route(environment.clone()))
        .or(make_playlists_route(environment.clone()))
        .or(make_affirmation_route(environment.clone()))
        .or(make_search_route(environment.clone()))
        .or(make_genres_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
}

mod internal {
    use serde_json::Value;
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{body, get as g, path as p, path::param as par, post, query};

    use super::{handlers, query as q, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    /// An entry ID segment. `recent` belongs to the recent list, so it is
    /// never taken as an ID, even when the recent list rejects the request.
    fn entry_id() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
        par::<String>().and_then(|id: String| async move {
            if id == "recent" {
                Err(warp::reject::not_found())
            } else {
                Ok(id)
            }
        })
    }

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let $route_variable = warp::any().map(move || environment.clone());

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_create_route => create_mood_entry, rt; p("mood-entries"), end(), post(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<Value>());
    route!(make_list_route => list_mood_entries, rt; p("mood-entries"), end(), g());
    route!(make_recent_route => list_recent_mood_entries, rt; p("mood-entries"), p("recent"), end(), g(), query::<q::RecentQuery>());
    route!(make_detail_route => retrieve_mood_entry, rt; p("mood-entries"), entry_id(), end(), g());
    route!(make_recommendations_route => list_recommendations, rt; p!("mood-entries" / String / "recommendations"), end(), g());
    route!(make_refresh_route => refresh_recommendations, rt; p!("mood-entries" / String / "refresh-recommendations"), end(), post());
    route!(make_save_playlist_route => save_playlist, rt; p("playlists"), p("save"), end(), post(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<Value>());
    route!(make_playlists_route => list_playlists, rt; p("playlists"), end(), g());
    route!(make_affirmation_route => affirmation, rt; p("affirmation"), end(), g());
    route!(make_search_route => search_tracks, rt; p("spotify"), p("search"), end(), g(), query::<q::SearchQuery>());
    route!(make_genres_route => list_genres, rt; p("spotify"), p("genres"), end(), g());
}
