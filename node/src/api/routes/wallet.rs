use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{
    ApiResponse, Address, AddressInfo, WalletInfo, BalanceInfo, 
    Transaction, TransactionList, SignRequest, SignResponse, 
    VerifyRequest, VerifyResponse, SendRequest, SendResponse,
    LabelRequest, LabelResponse, AddressRequest, AddressResponse,
    BackupResponse, UTXOList
};
use crate::node::Node;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::collections::HashMap;
use tracing::{debug, info, warn, error};
use utoipa::{IntoParams, ToSchema};

/// Configure wallet API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wallet")
            .route("/info", web::get().to(get_wallet_info))
            .route("/balance", web::get().to(get_wallet_balance))
            .route("/backup", web::post().to(create_backup)),
    );
}

/// Parameters for wallet info request
#[derive(Debug, Deserialize, IntoParams)]
struct WalletInfoParams {
    /// Wallet ID to query (if multiple wallets supported)
    wallet_id: Option<String>,
}

/// Get wallet information
#[utoipa::path(
    get,
    path = "/api/v1/wallet/info",
    params(
        WalletInfoParams
    ),
    responses(
        (status = 200, description = "Wallet information retrieved successfully", body = ApiResponse<WalletInfo>),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn get_wallet_info(
    node: web::Data<Arc<Node>>,
    query: web::Query<WalletInfoParams>,
) -> ApiResult<impl Responder> {
    debug!("Get wallet info: {:?}", query);
    
    // TODO: Implement wallet info retrieval
    let wallet_info = serde_json::json!({
        "status": "active",
        "balance": 0,
        "addresses": 0
    });
    
    Ok(HttpResponse::Ok().json(ApiResponse::success(wallet_info)))
}

/// Parameters for balance query
#[derive(Debug, Deserialize, IntoParams)]
struct BalanceParams {
    /// Minimum confirmations to include in balance
    min_conf: Option<u32>,
    
    /// Whether to include watch-only addresses
    include_watchonly: Option<bool>,
}

/// Get wallet balance information
#[utoipa::path(
    get,
    path = "/api/v1/wallet/balance",
    params(
        BalanceParams
    ),
    responses(
        (status = 200, description = "Balance information retrieved successfully", body = ApiResponse<BalanceInfo>),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn get_wallet_balance(
    node: web::Data<Arc<Node>>,
    query: web::Query<BalanceParams>,
) -> ApiResult<impl Responder> {
    debug!("Get wallet balance: {:?}", query);
    
    // TODO: Implement wallet balance retrieval
    let balance_info = serde_json::json!({
        "confirmed": 0,
        "unconfirmed": 0,
        "total": 0
    });
    
    Ok(HttpResponse::Ok().json(ApiResponse::success(balance_info)))
}

/// Create a wallet backup
#[utoipa::path(
    post,
    path = "/api/v1/wallet/backup",
    responses(
        (status = 200, description = "Backup created successfully", body = ApiResponse<BackupResponse>),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn create_backup(
    node: web::Data<Arc<Node>>,
) -> ApiResult<impl Responder> {
    debug!("Create wallet backup");
    
    // TODO: Implement wallet backup creation
    let backup_response = serde_json::json!({
        "backup_id": "backup_123",
        "created_at": "2024-01-01T00:00:00Z",
        "size": 1024
    });
    
    Ok(HttpResponse::Ok().json(ApiResponse::success(backup_response)))
} 