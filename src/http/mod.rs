pub mod governance_handler;
pub mod health;


use actix_web::web;

/// Register every HTTP route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(health::health_check));
    governance_handler::configure_routes(cfg);
}
