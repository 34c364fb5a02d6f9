// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod live;
mod session;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use clap::Parser;
use kermesse_api::{
    ApiError, BuyTicketRequest, ChangePasswordRequest, CreateKermesseRequest,
    CreateParticipationRequest, CreateStandRequest, CreateTombolaRequest, DrawResult, ErrorKind,
    InviteChildRequest, InviteChildResponse, KermesseQuery, LinkStandRequest, LinkUserRequest,
    LinkUserResponse, ListStandsQuery, LoginRequest, ModifyKermesseRequest, ModifyStandRequest,
    ModifyTombolaRequest, ParticipationReceipt, RecordOutcomeRequest, RegisterRequest,
    SendJetonRequest, SendJetonResponse, TicketQuery, TicketReceipt, TopUpRequest, TopUpResponse,
    handlers::{kermesses, participations, stands, tombolas, users},
};
use kermesse_domain::{
    Kermesse, KermesseStatistics, Participation, Stand, Ticket, Tombola, User,
};
use kermesse_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::live::{LiveEventBroadcaster, live_events_handler};
use crate::session::SessionActor;

/// Kermesse Server - HTTP server for the kermesse engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The store. Handlers hold the lock for the whole command.
    persistence: Arc<Mutex<Persistence>>,
    /// Organizer notification hub.
    broadcaster: Arc<LiveEventBroadcaster>,
}

impl AppState {
    fn new(persistence: Persistence) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            broadcaster: Arc::new(LiveEventBroadcaster::new()),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error kind, e.g. `not_found`.
    error: String,
    /// Error message.
    message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error classification.
    kind: ErrorKind,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: self.kind.as_str().to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Maps an error kind to its HTTP status.
const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let kind: ErrorKind = err.kind();
        if kind == ErrorKind::Internal {
            error!(error = %err, "Internal error");
        } else {
            debug!(kind = %kind, error = %err, "Request rejected");
        }
        Self {
            status: status_for(kind),
            kind,
            message: err.to_string(),
        }
    }
}

type HttpResult<T> = Result<Json<T>, HttpError>;
type Created<T> = Result<(StatusCode, Json<T>), HttpError>;

// ============================================================================
// Users
// ============================================================================

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

async fn handle_register(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Created<User> {
    info!(email = %req.email, role = %req.role, "Handling register request");
    let mut persistence = app_state.persistence.lock().await;
    let user: User = users::register(&mut persistence, req)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> HttpResult<User> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(users::login(&mut persistence, &req)?))
}

async fn handle_me(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> HttpResult<User> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(users::me(&mut persistence, &actor)?))
}

async fn handle_change_password(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    users::change_password(&mut persistence, &actor, &req)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_list_students(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> HttpResult<Vec<User>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(users::list_students(&mut persistence, &actor)?))
}

async fn handle_invite_child(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<InviteChildRequest>,
) -> Created<InviteChildResponse> {
    let mut persistence = app_state.persistence.lock().await;
    let response: InviteChildResponse = users::invite_child(&mut persistence, &actor, req)?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_send_jeton(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<SendJetonRequest>,
) -> HttpResult<SendJetonResponse> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(users::send_jeton(&mut persistence, &actor, &req)?))
}

/// Handler for POST `/webhook/top-up`.
///
/// Called by the payment provider integration once a payment is confirmed.
async fn handle_top_up(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<TopUpRequest>,
) -> HttpResult<TopUpResponse> {
    info!(user_id = req.user_id, reference = %req.reference, "Handling top-up webhook");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(users::top_up(&mut persistence, &req)?))
}

// ============================================================================
// Stands
// ============================================================================

async fn handle_list_stands(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_actor): SessionActor,
    Query(query): Query<ListStandsQuery>,
) -> HttpResult<Vec<Stand>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(stands::list_stands(&mut persistence, query)?))
}

async fn handle_create_stand(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateStandRequest>,
) -> Created<Stand> {
    let mut persistence = app_state.persistence.lock().await;
    let stand: Stand = stands::create_stand(&mut persistence, &actor, req)?;
    Ok((StatusCode::CREATED, Json(stand)))
}

async fn handle_get_own_stand(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> HttpResult<Stand> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(stands::get_own_stand(&mut persistence, &actor)?))
}

async fn handle_modify_own_stand(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<ModifyStandRequest>,
) -> HttpResult<Stand> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(stands::modify_stand(&mut persistence, &actor, req)?))
}

async fn handle_get_stand(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_actor): SessionActor,
    Path(stand_id): Path<i64>,
) -> HttpResult<Stand> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(stands::get_stand(&mut persistence, stand_id)?))
}

// ============================================================================
// Kermesses
// ============================================================================

async fn handle_list_kermesses(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> HttpResult<Vec<Kermesse>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(kermesses::list_kermesses(&mut persistence, &actor)?))
}

async fn handle_create_kermesse(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateKermesseRequest>,
) -> Created<Kermesse> {
    let mut persistence = app_state.persistence.lock().await;
    let kermesse: Kermesse = kermesses::create_kermesse(&mut persistence, &actor, req)?;
    Ok((StatusCode::CREATED, Json(kermesse)))
}

async fn handle_get_kermesse(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_actor): SessionActor,
    Path(kermesse_id): Path<i64>,
) -> HttpResult<Kermesse> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(kermesses::get_kermesse(&mut persistence, kermesse_id)?))
}

async fn handle_modify_kermesse(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(kermesse_id): Path<i64>,
    Json(req): Json<ModifyKermesseRequest>,
) -> HttpResult<Kermesse> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(kermesses::modify_kermesse(
        &mut persistence,
        &actor,
        kermesse_id,
        req,
    )?))
}

async fn handle_complete_kermesse(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(kermesse_id): Path<i64>,
) -> HttpResult<Kermesse> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(kermesses::complete_kermesse(
        &mut persistence,
        &actor,
        kermesse_id,
    )?))
}

async fn handle_link_user(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(kermesse_id): Path<i64>,
    Json(req): Json<LinkUserRequest>,
) -> HttpResult<LinkUserResponse> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(kermesses::link_user(
        &mut persistence,
        &actor,
        kermesse_id,
        req,
    )?))
}

async fn handle_link_stand(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(kermesse_id): Path<i64>,
    Json(req): Json<LinkStandRequest>,
) -> HttpResult<Kermesse> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(kermesses::link_stand(
        &mut persistence,
        &actor,
        kermesse_id,
        req,
    )?))
}

async fn handle_users_for_invitation(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(kermesse_id): Path<i64>,
) -> HttpResult<Vec<User>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(kermesses::users_for_invitation(
        &mut persistence,
        &actor,
        kermesse_id,
    )?))
}

async fn handle_kermesse_statistics(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(kermesse_id): Path<i64>,
) -> HttpResult<KermesseStatistics> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(kermesses::kermesse_statistics(
        &mut persistence,
        &actor,
        kermesse_id,
    )?))
}

// ============================================================================
// Participations
// ============================================================================

async fn handle_list_participations(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Query(query): Query<KermesseQuery>,
) -> HttpResult<Vec<Participation>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(participations::list_participations(
        &mut persistence,
        &actor,
        query,
    )?))
}

async fn handle_create_participation(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateParticipationRequest>,
) -> Created<ParticipationReceipt> {
    let mut persistence = app_state.persistence.lock().await;
    let receipt: ParticipationReceipt = participations::create_participation(
        &mut persistence,
        app_state.broadcaster.as_ref(),
        &actor,
        req,
    )?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn handle_get_participation(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_actor): SessionActor,
    Path(participation_id): Path<i64>,
) -> HttpResult<Participation> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(participations::get_participation(
        &mut persistence,
        participation_id,
    )?))
}

async fn handle_record_outcome(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(participation_id): Path<i64>,
    Json(req): Json<RecordOutcomeRequest>,
) -> HttpResult<Participation> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(participations::record_outcome(
        &mut persistence,
        &actor,
        participation_id,
        req,
    )?))
}

// ============================================================================
// Tombolas & Tickets
// ============================================================================

async fn handle_list_tombolas(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_actor): SessionActor,
    Query(query): Query<KermesseQuery>,
) -> HttpResult<Vec<Tombola>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tombolas::list_tombolas(&mut persistence, query)?))
}

async fn handle_create_tombola(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateTombolaRequest>,
) -> Created<Tombola> {
    let mut persistence = app_state.persistence.lock().await;
    let tombola: Tombola = tombolas::create_tombola(&mut persistence, &actor, req)?;
    Ok((StatusCode::CREATED, Json(tombola)))
}

async fn handle_get_tombola(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_actor): SessionActor,
    Path(tombola_id): Path<i64>,
) -> HttpResult<Tombola> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tombolas::get_tombola(&mut persistence, tombola_id)?))
}

async fn handle_modify_tombola(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(tombola_id): Path<i64>,
    Json(req): Json<ModifyTombolaRequest>,
) -> HttpResult<Tombola> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tombolas::modify_tombola(
        &mut persistence,
        &actor,
        tombola_id,
        req,
    )?))
}

/// Handler for PATCH `/tombolas/{id}/finish-winner`.
///
/// Closes the tombola and draws its winner.
async fn handle_finish_tombola(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(tombola_id): Path<i64>,
) -> HttpResult<DrawResult> {
    info!(tombola_id, actor_id = actor.id, "Handling tombola draw");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tombolas::finish_tombola(
        &mut persistence,
        app_state.broadcaster.as_ref(),
        &actor,
        tombola_id,
    )?))
}

async fn handle_list_tickets(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Query(query): Query<TicketQuery>,
) -> HttpResult<Vec<Ticket>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tombolas::list_tickets(&mut persistence, &actor, query)?))
}

async fn handle_buy_ticket(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<BuyTicketRequest>,
) -> Created<TicketReceipt> {
    let mut persistence = app_state.persistence.lock().await;
    let receipt: TicketReceipt = tombolas::buy_ticket(
        &mut persistence,
        app_state.broadcaster.as_ref(),
        &actor,
        req,
    )?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn handle_get_ticket(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_actor): SessionActor,
    Path(ticket_id): Path<i64>,
) -> HttpResult<Ticket> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tombolas::get_ticket(&mut persistence, ticket_id)?))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/register", post(handle_register))
        .route("/login", post(handle_login))
        .route("/me", get(handle_me))
        .route("/me/password", patch(handle_change_password))
        .route("/users/students", get(handle_list_students))
        .route("/users/invite-child", post(handle_invite_child))
        .route("/users/send-jeton", patch(handle_send_jeton))
        .route("/webhook/top-up", post(handle_top_up))
        .route("/stands", get(handle_list_stands).post(handle_create_stand))
        .route(
            "/stands/owner",
            get(handle_get_own_stand).patch(handle_modify_own_stand),
        )
        .route("/stands/{id}", get(handle_get_stand))
        .route(
            "/kermesses",
            get(handle_list_kermesses).post(handle_create_kermesse),
        )
        .route(
            "/kermesses/{id}",
            get(handle_get_kermesse).patch(handle_modify_kermesse),
        )
        .route("/kermesses/{id}/complete", patch(handle_complete_kermesse))
        .route("/kermesses/{id}/add-user", patch(handle_link_user))
        .route("/kermesses/{id}/add-stand", patch(handle_link_stand))
        .route("/kermesses/{id}/users", get(handle_users_for_invitation))
        .route(
            "/kermesses/{id}/statistics",
            get(handle_kermesse_statistics),
        )
        .route(
            "/participations",
            get(handle_list_participations).post(handle_create_participation),
        )
        .route(
            "/participations/{id}",
            get(handle_get_participation).patch(handle_record_outcome),
        )
        .route(
            "/tombolas",
            get(handle_list_tombolas).post(handle_create_tombola),
        )
        .route(
            "/tombolas/{id}",
            get(handle_get_tombola).patch(handle_modify_tombola),
        )
        .route("/tombolas/{id}/finish-winner", patch(handle_finish_tombola))
        .route("/tickets", get(handle_list_tickets).post(handle_buy_ticket))
        .route("/tickets/{id}", get(handle_get_ticket))
        .route("/ws", get(live_events_handler))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing kermesse server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app: Router = build_router(AppState::new(persistence));

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
