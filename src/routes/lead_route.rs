use actix_web::{get, http::header, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    domain::{export::leads_to_csv, lead::LeadRecord},
    services::LeadGenerator,
};

const DEFAULT_COUNT: usize = 5;

#[derive(Deserialize)]
struct GetLeadsQuery {
    query: String,
    #[serde(default = "default_count")]
    count: usize,
}

fn default_count() -> usize {
    DEFAULT_COUNT
}

#[get("")]
async fn get_leads(
    lead_generator: web::Data<LeadGenerator>,
    params: web::Query<GetLeadsQuery>,
) -> HttpResponse {
    match generate(&lead_generator, &params).await {
        Ok(leads) => HttpResponse::Ok().json(leads),
        Err(response) => response,
    }
}

#[get("/export")]
async fn export_leads(
    lead_generator: web::Data<LeadGenerator>,
    params: web::Query<GetLeadsQuery>,
) -> HttpResponse {
    let leads = match generate(&lead_generator, &params).await {
        Ok(leads) => leads,
        Err(response) => return response,
    };

    let file_name = format!("leads_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ))
        .body(leads_to_csv(&leads))
}

async fn generate(
    lead_generator: &LeadGenerator,
    params: &GetLeadsQuery,
) -> Result<Vec<LeadRecord>, HttpResponse> {
    let max_count = lead_generator.settings().max_target_count;
    if params.count == 0 || params.count > max_count {
        return Err(HttpResponse::BadRequest()
            .body(format!("count must be between 1 and {}", max_count)));
    }

    lead_generator
        .generate_leads(&params.query, params.count)
        .await
        .map_err(|e| match e.is_invalid_request() {
            true => HttpResponse::BadRequest().body(e.to_string()),
            false => {
                log::error!("Lead generation failed: {:?}", e);
                HttpResponse::InternalServerError().body("Lead generation failed")
            }
        })
}
