use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(web::resource("/top").route(web::get().to(handlers::get_top_rated)))
        .service(
            web::resource("/ratings")
                .route(web::get().to(handlers::get_all_ratings))
                .route(web::post().to(handlers::create_rating)),
        )
        .service(
            web::resource("/ratings/{book_id}")
                .route(web::get().to(handlers::get_rating))
                .route(web::post().to(handlers::submit_rating_value))
                .route(web::put().to(handlers::update_rating))
                .route(web::delete().to(handlers::delete_rating)),
        );
}
