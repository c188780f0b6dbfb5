use actix_web::web;

mod health;
mod index;
mod status;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index::index_route)
        .service(status::json_route)
        .service(health::health_route);
}
