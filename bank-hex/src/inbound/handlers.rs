//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use bank_types::{
    AccountResponse, ApiKeyResponse, ApiKeyStore, BankRepository, CardNumber, ChangeStatusRequest,
    CreateAccountRequest, CreatePaymentRequest, IdentifierGenerator, IssueApiKeyRequest,
    LedgerError, MessageLog, MessageLogStore, PaymentId, Principal, RepoError, Role,
    SecretVerifier, SendPaymentRequest, SettlementResponse, StatusResponse, TopUpRequest,
};

use crate::{LedgerService, PaymentService, StatusChange};

/// Application state shared across handlers.
pub struct AppState<R, V, G>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    pub ledger: LedgerService<R, V, G>,
    pub payments: PaymentService<R, V>,
    pub repo: Arc<R>,
    /// Client name of the key issued by `/api/bootstrap`
    pub admin_name: String,
}

/// Wrapper to implement IntoResponse for LedgerError (orphan rule workaround).
#[derive(Debug)]
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        ApiError(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LedgerError::InvalidAmount
            | LedgerError::InsufficientFunds { .. }
            | LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::WrongSecret => StatusCode::UNAUTHORIZED,
            LedgerError::Forbidden => StatusCode::FORBIDDEN,
            LedgerError::AccountNotFound(_) | LedgerError::PaymentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            LedgerError::AccountLocked
            | LedgerError::AlreadySent
            | LedgerError::DuplicateIdentifier(_)
            | LedgerError::BalanceConflict => StatusCode::CONFLICT,
            LedgerError::Secret(_) | LedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Appends an audit line for `client`. A failed write does not fail the
/// request, the operation it describes has already happened.
async fn record<R: MessageLogStore>(repo: &R, client: &str, message: String) {
    if let Err(e) = repo.append(MessageLog::new(client, message)).await {
        tracing::warn!(client, error = %e, "failed to write message log");
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

/// Open an account owned by the caller.
#[tracing::instrument(skip(state, req), fields(client = %principal.name))]
pub async fn create_account<R, V, G>(
    State(state): State<Arc<AppState<R, V, G>>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    let account = state.ledger.create_account(&principal.name, req).await?;
    record(state.repo.as_ref(), &principal.name, account.audit_message()).await;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// Credit an account.
#[tracing::instrument(skip(state), fields(client = %principal.name))]
pub async fn top_up<R, V, G>(
    State(state): State<Arc<AppState<R, V, G>>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<TopUpRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    let receipt = state.ledger.top_up(req).await?;
    record(state.repo.as_ref(), &principal.name, receipt.audit_message()).await;
    Ok(Json(AccountResponse::from(receipt.account)))
}

#[tracing::instrument(skip(state, req), fields(client = %principal.name, card = %req.card_number))]
pub async fn lock<R, V, G>(
    State(state): State<Arc<AppState<R, V, G>>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    let card = req.card_number.clone();
    let change = state.ledger.lock(&principal, req).await?;
    status_response(&state, &principal, &card, change).await
}

#[tracing::instrument(skip(state, req), fields(client = %principal.name, card = %req.card_number))]
pub async fn unlock<R, V, G>(
    State(state): State<Arc<AppState<R, V, G>>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    let card = req.card_number.clone();
    let change = state.ledger.unlock(&principal, req).await?;
    status_response(&state, &principal, &card, change).await
}

async fn status_response<R, V, G>(
    state: &AppState<R, V, G>,
    principal: &Principal,
    card: &CardNumber,
    change: StatusChange,
) -> Result<Json<StatusResponse>, ApiError>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    if let Some(line) = change.audit_message(card) {
        record(state.repo.as_ref(), &principal.name, line).await;
    }

    Ok(Json(StatusResponse {
        outcome: change.outcome(),
        status: change.status(),
        message: change.message(),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

/// Prepare a payment. No funds move until it is sent.
#[tracing::instrument(skip(state), fields(client = %principal.name))]
pub async fn create_payment<R, V, G>(
    State(state): State<Arc<AppState<R, V, G>>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    let payment = state.payments.create_payment(req).await?;
    record(state.repo.as_ref(), &principal.name, payment.audit_message()).await;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Send a prepared payment, debiting the source account.
#[tracing::instrument(skip(state, req), fields(client = %principal.name, payment_id = %id))]
pub async fn send_payment<R, V, G>(
    State(state): State<Arc<AppState<R, V, G>>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<SendPaymentRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    let payment_id: PaymentId = id
        .parse()
        .map_err(|_| LedgerError::Validation("Invalid payment ID".into()))?;

    let settlement = state.payments.send_payment(payment_id, &req.secret).await?;
    record(
        state.repo.as_ref(),
        &principal.name,
        settlement.audit_message(),
    )
    .await;

    Ok(Json(SettlementResponse {
        payment_id: settlement.payment.id,
        status: settlement.payment.status,
        balance: settlement.account.balance,
        message: settlement.message(),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Message log
// ─────────────────────────────────────────────────────────────────────────────

/// The caller's message log, newest first.
#[tracing::instrument(skip(state), fields(client = %principal.name))]
pub async fn list_messages<R, V, G>(
    State(state): State<Arc<AppState<R, V, G>>>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    let logs = state.repo.list_for_client(&principal.name).await?;
    Ok(Json(logs))
}

// ─────────────────────────────────────────────────────────────────────────────
// API Key Management
// ─────────────────────────────────────────────────────────────────────────────

/// Bootstrap endpoint - creates the first admin API key.
///
/// Only works while no API keys exist. The key belongs to the configured
/// admin name and is returned once.
#[tracing::instrument(skip(state))]
pub async fn bootstrap<R, V, G>(
    State(state): State<Arc<AppState<R, V, G>>>,
) -> Result<impl IntoResponse, ApiError>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    if state.repo.count_api_keys().await? > 0 {
        return Err(LedgerError::Validation(
            "Bootstrap not allowed: API keys already exist. Use an existing key to create new ones."
                .into(),
        )
        .into());
    }

    let (key, raw_key) = state
        .repo
        .issue_api_key(&state.admin_name, Role::Admin)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiKeyResponse {
            api_key: raw_key,
            client: key.client,
            role: key.role,
            message: "First API key created. Save this key securely - it won't be shown again!"
                .into(),
        }),
    ))
}

/// Issue an API key for a client (admin only).
#[tracing::instrument(skip(state), fields(caller = %principal.name))]
pub async fn issue_api_key<R, V, G>(
    State(state): State<Arc<AppState<R, V, G>>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<IssueApiKeyRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    if !principal.is_admin() {
        return Err(LedgerError::Forbidden.into());
    }

    let (key, raw_key) = state.repo.issue_api_key(&req.client, req.role).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiKeyResponse {
            api_key: raw_key,
            client: key.client,
            role: key.role,
            message: "API key created. Save this key securely - it won't be shown again!".into(),
        }),
    ))
}
