use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::resource("/books")
                .route(web::get().to(handlers::list_books))
                .route(web::post().to(handlers::add_book)),
        )
        .service(
            web::resource("/books/{book_id}")
                .route(web::get().to(handlers::get_book))
                .route(web::put().to(handlers::update_book))
                .route(web::delete().to(handlers::delete_book)),
        );
}
