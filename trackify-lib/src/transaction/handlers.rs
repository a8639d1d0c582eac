use crate::auth::session::Session;
use crate::error::HandlerError;
use crate::flash::{self, FlashMessage};
use crate::transaction::form::AddTransactionForm;
use actix_web::{delete, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use trackify_repo::transaction_repo::{
    Transaction, TransactionRepo, TransactionType, TypeFilter,
};

#[derive(Serialize)]
pub struct AddTransactionPage {
    pub types: [TransactionType; 2],
    pub flash: Option<FlashMessage>,
}

#[derive(Serialize)]
pub struct HistoryPage {
    pub transactions: Vec<Transaction>,
    pub filter: TypeFilter,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub filter: TypeFilter,
}

pub async fn add_transaction_page(req: HttpRequest) -> HttpResponse {
    let flash = FlashMessage::from_request(&req);
    let shown = flash.is_some();
    let page = AddTransactionPage {
        types: TransactionType::ALL,
        flash,
    };
    flash::render_page(&page, shown)
}

#[instrument(skip_all, fields(user_id = session.user_id))]
pub async fn add_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    session: web::ReqData<Session>,
    form: web::Form<AddTransactionForm>,
) -> Result<HttpResponse, HandlerError> {
    let new_transaction = match form.into_inner().validate() {
        Ok(new_transaction) => new_transaction,
        Err(e) => {
            info!(err = %e, "Rejected transaction");
            return Ok(flash::redirect_with_flash(
                "/add",
                FlashMessage::error(e.to_string()),
            ));
        }
    };

    let transaction = transaction_repo
        .create_transaction(session.user_id, new_transaction)
        .await?;
    info!(transaction_id = transaction.id, "Added transaction");

    Ok(flash::redirect_with_flash(
        "/dashboard",
        FlashMessage::success("Transaction added successfully"),
    ))
}

pub async fn history(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    session: web::ReqData<Session>,
    query: web::Query<HistoryQuery>,
) -> Result<impl Responder, HandlerError> {
    let filter = query.into_inner().filter;
    let mut transactions = transaction_repo
        .get_transactions(session.user_id, filter)
        .await?;
    transactions.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(HttpResponse::Ok().json(HistoryPage {
        transactions,
        filter,
    }))
}

#[delete("/delete-transaction/{transaction_id}")]
#[instrument(skip(transaction_repo, session), fields(user_id = session.user_id))]
pub async fn delete_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    session: web::ReqData<Session>,
    transaction_id: web::Path<i64>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .delete_transaction(session.user_id, transaction_id.into_inner())
        .await?;
    info!(transaction_id = transaction.id, "Deleted transaction");
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
