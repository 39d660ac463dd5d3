use actix_web::{get, HttpResponse, Responder};

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().body("Lead generator is up. Try /leads?query=SaaS+companies+in+Denver&count=5")
}
