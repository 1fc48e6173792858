use actix_web::{middleware::Logger, web, App, HttpServer};
use tasknest_server::{auth::AuthKeys, config::Config, store::TaskStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let store = TaskStore::open(&config.database_path)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
    let store = web::Data::new(store);
    let keys = web::Data::new(AuthKeys::new(&config.jwt_secret, config.token_ttl_secs));

    log::info!("serving {} on {}", config.database_path, config.bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store.clone())
            .app_data(keys.clone())
            .configure(tasknest_server::configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
