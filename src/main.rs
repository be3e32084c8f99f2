use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskdeck::auth::AuthMiddleware;
use taskdeck::config::Config;
use taskdeck::email::{LogMailer, Mailer};
use taskdeck::rate_limit::RateLimiter;
use taskdeck::routes;
use taskdeck::store::{TaskStore, UserStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // One instance of each collaborator per process, handed to the handlers
    // explicitly.
    let user_store = UserStore::new(pool.clone());
    let task_store = TaskStore::new(pool);
    let login_limiter = web::Data::new(RateLimiter::for_login());
    let mailer: web::Data<dyn Mailer> = web::Data::from(Arc::new(LogMailer) as Arc<dyn Mailer>);

    let bind_addr = (config.server_host.clone(), config.server_port);
    log::info!("Starting TaskDeck server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(user_store.clone()))
            .app_data(web::Data::new(task_store.clone()))
            .app_data(login_limiter.clone())
            .app_data(mailer.clone())
            // Registration order is inside-out: auth runs innermost, CORS
            // outermost so preflight requests never hit the bearer check.
            .wrap(AuthMiddleware)
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .service(routes::health::health)
            .configure(routes::config)
    })
    .bind(bind_addr)?
    .run()
    .await
}
