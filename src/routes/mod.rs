pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Wires the full HTTP surface. The `/users/auth` scope and registration are
/// public; `/users/me` and the task routes sit behind the bearer middleware;
/// the lock endpoints are gated by the privileged key inside their handlers.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(
                web::scope("/auth")
                    .service(auth::login)
                    .service(auth::forgot_password)
                    .service(auth::reset_password),
            )
            .service(users::register)
            .service(users::me)
            .service(users::lock)
            .service(users::unlock),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
