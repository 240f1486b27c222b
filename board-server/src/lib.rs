use std::convert::Infallible;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use board_core::{Board, BoardError};
use board_types::{ClaimRequest, CreateUserRequest, ErrorResponse, HealthResponse, HistoryQuery};

pub mod config;

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub fn create_routes(
    board: Arc<Board>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let board_filter = warp::any().map({
        let board = board.clone();
        move || board.clone()
    });

    // Ranked user list
    let list_users = warp::path!("api" / "users")
        .and(warp::get())
        .and(board_filter.clone())
        .and_then(handle_list_users);

    let create_user = warp::path!("api" / "users")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<CreateUserRequest>())
        .and(board_filter.clone())
        .and_then(handle_create_user);

    let claim = warp::path!("api" / "claim")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<ClaimRequest>())
        .and(board_filter.clone())
        .and_then(handle_claim);

    let history = warp::path!("api" / "history")
        .and(warp::get())
        .and(warp::query::<HistoryQuery>())
        .and(board_filter.clone())
        .and_then(handle_history);

    let health = warp::path!("api" / "health")
        .and(warp::get())
        .map(|| warp::reply::json(&HealthResponse::healthy()));

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    list_users
        .or(create_user)
        .or(claim)
        .or(history)
        .or(health)
        .recover(handle_rejection)
        .with(cors)
        .with(warp::log("points_board"))
}

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(body), status)
}

fn error_status(err: &BoardError) -> StatusCode {
    match err {
        BoardError::Validation(_) => StatusCode::BAD_REQUEST,
        BoardError::NotFound { .. } => StatusCode::NOT_FOUND,
        BoardError::Conflict(_) => StatusCode::SERVICE_UNAVAILABLE,
        BoardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_reply(context: &str, err: BoardError) -> WithStatus<Json> {
    let status = error_status(&err);
    if status.is_server_error() {
        tracing::error!("{}: {}", context, err);
    }
    json_reply(&ErrorResponse::new(err.to_string()), status)
}

async fn handle_list_users(board: Arc<Board>) -> Result<impl warp::Reply, warp::Rejection> {
    match board.ranked_users().await {
        Ok(users) => Ok(json_reply(&users, StatusCode::OK)),
        Err(err) => Ok(error_reply("Failed to fetch users", err)),
    }
}

async fn handle_create_user(
    request: CreateUserRequest,
    board: Arc<Board>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match board.add_user(&request.name).await {
        Ok(user) => Ok(json_reply(&user, StatusCode::OK)),
        Err(err) => Ok(error_reply("Failed to add user", err)),
    }
}

async fn handle_claim(
    request: ClaimRequest,
    board: Arc<Board>,
) -> Result<impl warp::Reply, warp::Rejection> {
    // A malformed id cannot name any user
    let user_id = match Uuid::parse_str(&request.user_id) {
        Ok(uuid) => uuid,
        Err(_) => {
            return Ok(error_reply(
                "Failed to claim points",
                BoardError::user_not_found(&request.user_id),
            ));
        }
    };

    match board.claim(user_id).await {
        Ok(result) => Ok(json_reply(&result, StatusCode::OK)),
        Err(err) => Ok(error_reply("Failed to claim points", err)),
    }
}

async fn handle_history(
    query: HistoryQuery,
    board: Arc<Board>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match board.history(query.limit).await {
        Ok(records) => Ok(json_reply(&records, StatusCode::OK)),
        Err(err) => Ok(error_reply("Failed to fetch history", err)),
    }
}

/// Turns warp's own rejections into the same `{detail}` body the handlers use.
async fn handle_rejection(rejection: warp::Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, detail) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", err))
    } else if rejection.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string".to_string())
    } else if rejection.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Request body must be JSON".to_string(),
        )
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large".to_string(),
        )
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "Content-Length header required".to_string(),
        )
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        tracing::error!("Unhandled rejection: {:?}", rejection);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(json_reply(&ErrorResponse::new(detail), status))
}
