#[macro_use]
extern crate rocket;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::FileServer;
use rocket::http::Header;
use rocket::response::content::RawHtml;
use rocket_dyn_templates::Template;

mod boot;
mod db;
mod embed;
mod filter;
mod models;
mod plan;
mod render;
mod routes;

#[cfg(test)]
mod tests;

/// Builder pages reflect live widget state; never let the browser cache
/// them.
pub struct NoCacheApp;

#[rocket::async_trait]
impl Fairing for NoCacheApp {
    fn info(&self) -> Info {
        Info { name: "No-Cache Builder Pages", kind: Kind::Response }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        if req.uri().path().starts_with("/app") {
            res.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/app'>← Widgets</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/app'>← Widgets</a></body></html>".to_string())
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    // Boot check — verify/create directories, validate critical files
    boot::run();

    let pool = db::init_pool().expect("Failed to initialize database pool");
    db::run_migrations(&pool).expect("Failed to run database migrations");
    db::seed_defaults(&pool).expect("Failed to seed defaults");

    rocket::build()
        .manage(pool)
        .attach(Template::fairing())
        .attach(NoCacheApp)
        .mount("/static", FileServer::from("website/static"))
        .mount("/", routes::public::routes())
        .mount("/app", routes::app::routes())
        .mount("/api", routes::api::routes())
        .register("/", catchers![not_found, server_error])
}
