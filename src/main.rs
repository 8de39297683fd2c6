use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use course_team::config::Config;
use course_team::handlers::course_team_handlers::{self, CourseTeamState};
use course_team::services::course_roles::{CourseRoleService, FixtureCourseRoleService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let config = Config::from_env();

    let service: Arc<dyn CourseRoleService> =
        Arc::new(FixtureCourseRoleService::from_file(&config.fixture_path)?);
    let state = web::Data::new(CourseTeamState::new(service, &config));

    // Session encryption key: load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match config.session_key.as_deref() {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+); generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set; generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(web::scope("/api").configure(course_team_handlers::configure))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
