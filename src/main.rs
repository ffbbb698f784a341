mod app;
mod assets;
mod audio;
mod blob;
mod config;
mod debug;
mod error;
mod motion;
mod render;
mod toy;
mod tween;

fn main() {
    env_logger::init();
    log::info!("Blob waking up");

    if let Err(e) = app::run() {
        if e.is_fatal() {
            log::error!("Fatal error: {e}");
            std::process::exit(1);
        }
        log::warn!("Exited with error: {e}");
    }
}
