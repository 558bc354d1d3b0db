use actix_web::web;

use crate::ws;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(crate::health::configure)
        .route("/ws", web::get().to(ws::session::upgrade));
}
