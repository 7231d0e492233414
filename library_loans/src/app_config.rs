use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::resource("/loans")
                .route(web::get().to(handlers::list_loans))
                .route(web::post().to(handlers::create_loan)),
        )
        .service(
            web::resource("/loans/{loan_id}").route(web::delete().to(handlers::delete_loan)),
        );
}
