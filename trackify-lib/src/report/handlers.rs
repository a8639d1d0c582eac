use crate::auth::session::Session;
use crate::error::HandlerError;
use crate::flash::{self, FlashMessage};
use crate::report::{category_breakdown, monthly_breakdown, CategoryTotal, MonthlyTotal, Summary};
use actix_web::{web, HttpRequest, HttpResponse};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use trackify_repo::transaction_repo::{Transaction, TransactionRepo, TypeFilter};

#[derive(Serialize)]
pub struct DashboardPage {
    pub username: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub savings: Decimal,
    pub recent: Vec<Transaction>,
    pub flash: Option<FlashMessage>,
}

#[derive(Serialize)]
pub struct AnalyticsPage {
    pub categories: Vec<CategoryTotal>,
    pub monthly: Vec<MonthlyTotal>,
}

pub async fn dashboard(
    req: HttpRequest,
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    session: web::ReqData<Session>,
) -> Result<HttpResponse, HandlerError> {
    let session = session.into_inner();
    let transactions = transaction_repo
        .get_transactions(session.user_id, TypeFilter::All)
        .await?;
    let summary = Summary::from_transactions(&transactions)?;

    let flash = FlashMessage::from_request(&req);
    let shown = flash.is_some();
    let page = DashboardPage {
        username: session.username,
        income: summary.income,
        expenses: summary.expenses,
        balance: summary.balance,
        savings: summary.savings_projection,
        recent: summary.recent,
        flash,
    };
    Ok(flash::render_page(&page, shown))
}

pub async fn analytics(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    session: web::ReqData<Session>,
) -> Result<HttpResponse, HandlerError> {
    let transactions = transaction_repo
        .get_transactions(session.user_id, TypeFilter::All)
        .await?;

    Ok(HttpResponse::Ok().json(AnalyticsPage {
        categories: category_breakdown(&transactions)?,
        monthly: monthly_breakdown(&transactions)?,
    }))
}
