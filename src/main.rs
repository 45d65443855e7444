#[cfg(feature = "ssr")]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    use actix_web::{web, App, HttpServer};
    use confabstracts::api;
    use confabstracts::config::AppConfig;
    use confabstracts::db::Database;
    use leptos::logging::log;
    use std::io::{Error, ErrorKind};

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| Error::new(ErrorKind::InvalidInput, e))?;
    let addr = config.site_addr;

    // Initialize the database
    let db = Database::new(&config.db_path).map_err(|e| Error::new(ErrorKind::Other, e))?;
    db.create_schema()
        .await
        .map_err(|e| Error::new(ErrorKind::Other, e))?; // Ensure the schema is created
    if let Err(e) = db.debug_dump().await {
        log!("[DB] Could not dump database state: {}", e);
    }
    log!("Schema created successfully!");

    let db = web::Data::new(db);
    let config = web::Data::new(config);
    log!("listening on http://{}", &addr);

    // Start the Actix Web server
    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .app_data(config.clone())
            .configure(api::configure)
    })
    .bind(&addr)?
    .run()
    .await
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // no client-side main function
}
