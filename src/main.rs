mod config;
mod error;
mod flash;
mod helpers;
mod middleware;
mod models;
mod routes;
mod schema;
mod services;

use axum::http::header;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::deadpool::{Hook, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use figment::{providers::Format, Figment};

use services::memory::PostServiceMem;
use services::posts::{PostService, PostServiceDb};
use tera::Tera;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::*;
use tracing_forest::ForestLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::middleware::logging::HttpLoggingExt;
use crate::middleware::method_override::MethodOverrideExt;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: config::Cfg = Figment::new()
        .merge(figment::providers::Json::file("appsettings.json"))
        .merge(figment::providers::Env::prefixed("APP_"))
        .extract()?;

    // initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(ForestLayer::default())
        .init();

    let tera = Tera::new("src/templates/**/*")?;

    let app = match cfg.database_url {
        Some(database_url) => {
            run_migrations(database_url.clone()).await?;

            // create a new connection pool with the default config
            let mgr =
                AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(&database_url);

            info!("Starting DB pool");
            let pool = Pool::builder(mgr)
                .max_size(10)
                .pre_recycle(Hook::async_fn(|conn, metrics| {
                    tracing::trace_span!("dbpool::pre_recycle").in_scope(|| {
                        let c = std::ptr::addr_of!(conn);
                        tracing::trace!(?c, ?metrics, "Pre-recycle");
                        Box::pin(std::future::ready(Ok(())))
                    })
                }))
                .post_create(Hook::async_fn(|conn, metrics| {
                    tracing::trace_span!("dbpool::post_create").in_scope(|| {
                        let c = std::ptr::addr_of!(conn);
                        tracing::trace!(?c, ?metrics, "Post-create");
                        Box::pin(std::future::ready(Ok(())))
                    })
                }))
                .runtime(deadpool::Runtime::Tokio1)
                .build()?;

            app(PostServiceDb::new(pool), tera)
        }
        None => {
            warn!("no database configured, falling back to the in-memory store");
            app(PostServiceMem::new(), tera)
        }
    };

    let addr = cfg.listen_addr;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("starting listening at {}", addr);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn run_migrations(database_url: String) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        use diesel::Connection;
        let mut conn: AsyncConnectionWrapper<diesel_async::AsyncPgConnection> =
            AsyncConnectionWrapper::establish(&database_url)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("running migrations: {e}"))?;
        Ok(())
    })
    .await?
}

fn app<S: PostService>(svc: S, tera: Tera) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/posts") }))
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    header::HeaderValue::from_static("max-age=13420"),
                ))
                .layer(CompressionLayer::new())
                .service(tower_http::services::ServeDir::new("./static/")),
        )
        .nest("/posts", routes::posts::router().with_state((svc, tera)))
        .with_method_override()
        .with_http_logging()
}
