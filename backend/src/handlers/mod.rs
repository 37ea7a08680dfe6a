use actix_web::web;

pub mod auth;
pub mod chat;
pub mod health;

#[cfg(test)]
pub mod test_support;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health)).service(
        web::scope("/api")
            .configure(auth::configure)
            .configure(chat::configure),
    );
}
