//! City service routes

use axum::{
    Extension, Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{require_user, resolve},
    models::{Credentials, NewCity, User},
    pages, password,
    state::AppState,
    validation,
};

/// Raw "add city" form; numbers are parsed by validation
#[derive(Debug, Deserialize)]
pub struct CityForm {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
}

/// Create the router for the city service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/cities/add", post(add_city))
        .route("/cities/remove/:city_id", post(remove_city))
        .route("/cities/reset", post(reset_cities))
        .route("/cities/update", post(update_weather))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(index))
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", get(logout).post(logout))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database { "ok" } else { "degraded" },
            "service": "cities",
            "database": database,
        })),
    )
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((state.session_service.cookie_name().to_string(), token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            state.session_service.max_age_seconds(),
        ))
        .build()
}

fn start_session(state: &AppState, jar: CookieJar, user: &User) -> ApiResult<Response> {
    let token = state.session_service.issue(user.id).map_err(|e| {
        error!("Failed to issue session token: {}", e);
        ApiError::InternalServerError
    })?;

    let jar = jar.add(session_cookie(state, token));
    Ok((jar, Redirect::to("/")).into_response())
}

/// Login form
pub async fn login_page() -> Html<String> {
    Html(pages::login_page())
}

/// Registration form
pub async fn register_page() -> Html<String> {
    Html(pages::register_page())
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<Credentials>,
) -> ApiResult<Response> {
    info!("Registration attempt for user: {}", form.username);

    validation::validate_username(&form.username).map_err(ApiError::BadRequest)?;
    validation::validate_password(&form.password).map_err(ApiError::BadRequest)?;

    let password_hash = password::hash_password(&form.password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::InternalServerError
    })?;

    let user = match state
        .user_repository
        .register(&form.username, &password_hash)
        .await
    {
        Ok(user) => user,
        Err(e) if e.is_unique_violation() => {
            info!("Username {} already taken", form.username);
            return Err(ApiError::UsernameTaken);
        }
        Err(e) => return Err(e.into()),
    };

    start_session(&state, jar, &user)
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<Credentials>,
) -> ApiResult<Response> {
    info!("Login attempt for user: {}", form.username);

    let user = state
        .user_repository
        .find_by_username(&form.username)
        .await?
        .filter(|user| password::verify_password(&form.password, &user.password_hash))
        .ok_or_else(|| {
            warn!("Invalid credentials for user: {}", form.username);
            ApiError::InvalidCredentials
        })?;

    start_session(&state, jar, &user)
}

/// Logout endpoint
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    // Sent even when the request carried no cookie, so any stale one is dropped
    let mut removal = Cookie::build((state.session_service.cookie_name().to_string(), ""))
        .path("/")
        .http_only(true)
        .build();
    removal.make_removal();

    (jar.add(removal), Redirect::to("/login"))
}

/// City list for the signed-in user, warmest first
pub async fn index(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Response> {
    let Some(user) = resolve(&state, &jar).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let cities = state.city_repository.list_for(user.id).await?;

    Ok(Html(pages::index_page(&user, &cities)).into_response())
}

/// Add a city to the user's list
pub async fn add_city(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Form(form): Form<CityForm>,
) -> ApiResult<Redirect> {
    let city = validation::validate_city(&form.name, &form.latitude, &form.longitude)
        .map_err(ApiError::BadRequest)?;

    state.city_repository.add(user.id, &city).await?;

    Ok(Redirect::to("/"))
}

/// Remove one of the user's cities; other users' cities are left alone
///
/// An id that is not a UUID matches no city and is treated like any other
/// unknown id.
pub async fn remove_city(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(city_id): Path<String>,
) -> ApiResult<Redirect> {
    let Ok(city_id) = Uuid::parse_str(&city_id) else {
        debug!("Ignoring removal of malformed city id {:?}", city_id);
        return Ok(Redirect::to("/"));
    };

    state.city_repository.remove(user.id, city_id).await?;

    Ok(Redirect::to("/"))
}

/// Replace the user's list with the default cities
pub async fn reset_cities(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<Redirect> {
    let templates: Vec<NewCity> = state
        .default_city_repository
        .all()
        .await?
        .iter()
        .map(NewCity::from)
        .collect();

    state.city_repository.reset_to(user.id, &templates).await?;

    Ok(Redirect::to("/"))
}

/// Refetch temperatures for the user's stale cities
pub async fn update_weather(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<Redirect> {
    let summary = state
        .weather_refresher
        .refresh_stale(user.id, Utc::now())
        .await?;

    if !summary.failed.is_empty() {
        warn!(
            "{} of {} temperature lookups failed for user {}",
            summary.failed.len(),
            summary.failed.len() + summary.updated,
            user.id
        );
    }

    Ok(Redirect::to("/"))
}
