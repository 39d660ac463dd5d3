use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    routes::{default_route, lead_route},
    services::LeadGenerator,
};

pub fn run(listener: TcpListener, lead_generator: LeadGenerator) -> Result<Server, std::io::Error> {
    let lead_generator = web::Data::new(lead_generator);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(
                web::scope("/leads")
                    .service(lead_route::get_leads)
                    .service(lead_route::export_leads),
            )
            .app_data(lead_generator.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
