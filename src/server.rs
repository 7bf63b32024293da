use std::future::Future;

use actix_web::dev::Server;
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use futures::channel::oneshot;
use futures::FutureExt;
use log::{error, info};

use crate::codec;
use crate::config::Config;
use crate::counter::TimeWindowCounter;
use crate::error::{Error, Result};
use crate::storage::StateFile;

async fn record_request(counter: web::Data<TimeWindowCounter>) -> HttpResponse {
    let count = counter.record_event();
    HttpResponse::Ok()
        .content_type("text/plain")
        .body(format!("{}\n", count))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    // Every request counts, whatever its method or path.
    cfg.service(web::resource("/{tail:.*}").to(record_request));
}

/// Resolves the first time SIGINT arrives.
pub fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let (tx, rx) = oneshot::channel();
    let mut tx = Some(tx);
    ctrlc::set_handler(move || {
        if let Some(tx) = tx.take() {
            let _ = tx.send(());
        }
    })
    .map_err(Error::Signal)?;
    Ok(rx.map(|_| ()))
}

/// Opens the state file and builds a counter holding the persisted window.
pub fn restore_state(config: &Config) -> Result<(StateFile, web::Data<TimeWindowCounter>)> {
    let state = StateFile::open_or_create(&config.state_file)?;
    let events = codec::decode(&state.load()?)?;
    info!(
        "Restored {} timestamps from {}",
        events.len(),
        state.path().display()
    );

    let counter = TimeWindowCounter::new(config.retention);
    counter.restore(events);
    Ok((state, web::Data::new(counter)))
}

pub fn persist(counter: &TimeWindowCounter, state: &StateFile) -> Result<()> {
    let events = counter.snapshot();
    let bytes = codec::encode(&events)?;
    state.save(&bytes)?;
    info!(
        "Persisted {} timestamps to {}",
        events.len(),
        state.path().display()
    );
    Ok(())
}

fn start_listener(addr: &str, counter: web::Data<TimeWindowCounter>) -> Result<Server> {
    let server = HttpServer::new(move || {
        App::new()
            // enable logger
            .wrap(middleware::Logger::default())
            .app_data(counter.clone())
            .configure(routes)
    })
    .disable_signals()
    .bind(addr)
    .map_err(Error::Listener)?
    .run();

    let running = server.clone();
    actix_rt::spawn(async move {
        if let Err(e) = running.await {
            error!("{}", Error::Listener(e));
        }
    });

    info!("Listening on {}", addr);
    Ok(server)
}

/// Serves until `shutdown` resolves, then drains in-flight requests and
/// writes the window back to the state file.
///
/// A listener that fails to bind is logged and the service keeps waiting
/// for shutdown, so the restored window is still written back.
pub async fn run<F>(config: &Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let (state, counter) = restore_state(config)?;

    let server = match start_listener(&config.listen_addr, counter.clone()) {
        Ok(server) => Some(server),
        Err(e) => {
            error!("{}", e);
            None
        }
    };

    shutdown.await;
    info!("Shutdown requested");

    if let Some(server) = server {
        server.stop(true).await;
    }
    info!(
        "Listener stopped, {} requests in the last {}s",
        counter.count_in_window(),
        counter.retention().num_seconds()
    );

    persist(counter.get_ref(), &state)
}
