use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::AppResult;

#[derive(Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /notifications/{recipient_id} - newest history records first
pub async fn list_history(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
) -> AppResult<HttpResponse> {
    let recipient_id = path.into_inner();
    let limit = query.limit.clamp(1, 100);

    let records = ctx.history.list_for_recipient(&recipient_id, limit).await?;

    Ok(HttpResponse::Ok().json(records))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/notifications/{recipient_id}").route(web::get().to(list_history)));
}
