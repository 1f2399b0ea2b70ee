//! Static file server for the generated map page and its data files.

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::anyhow;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::map::export::PAGE_FILENAME;

/// Serves `directory`, answering `/` with the map page.
pub fn create_router(directory: &Path) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(directory.join(PAGE_FILENAME)))
        .fallback_service(ServeDir::new(directory))
}

fn serving_message(addr: SocketAddr, directory: &Path) -> String {
    format!("Serving at http://{}/ from {:?}", addr, directory)
}

pub async fn run_server(directory: PathBuf, addr: SocketAddr) -> anyhow::Result<()> {
    if !directory.is_dir() {
        return Err(anyhow!("{:?} is not a directory", directory));
    }
    let app = create_router(&directory);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("{}", serving_message(listener.local_addr()?, &directory));
    log::debug!("Serving {:?} with index {}", directory, PAGE_FILENAME);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    Ok(())
}

/// Blocking entry point, runs the server until interrupted.
pub fn serve(directory: PathBuf, addr: SocketAddr) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_server(directory, addr))
}
