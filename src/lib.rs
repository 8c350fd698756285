#[macro_use]
extern crate rocket;

pub mod auth;
pub mod db;
pub mod error;
pub mod request_logger;
pub mod routes;
pub mod search;

use crate::auth::{PgSessionValidator, SessionState};
use crate::db::JupiterDb;
use crate::request_logger::RequestLogger;
use crate::search::{
    HttpConfig, JobBoardClient, JobSourceConfig, KeywordConfig, KeywordExtractor,
    MonkeyLearnClient, PgFavoritesStore, RetryPolicy, SearchConfig, SearchPipeline,
};
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_db_pools::Database;
use rocket_db_pools::sqlx::PgPool;
use rocket_okapi::{
    openapi_get_routes,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::{Arc, Once};

static LOGGER: Once = Once::new();

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

/// Wire the pipeline's collaborators around one pooled HTTP client.
fn build_search_state(
    pool: PgPool,
    search_config: &SearchConfig,
) -> Result<(SearchPipeline, SessionState), reqwest::Error> {
    let http_config = HttpConfig::from_env();
    let http = http_config.build_client()?;
    let retry = RetryPolicy::from_config(&http_config);

    let keyword_config = KeywordConfig::from_env();
    if keyword_config.api_key.is_empty() {
        log::warn!("KEYWORDS_API_KEY is not set; keyword extraction will return no keywords");
    }

    let source = JobBoardClient::new(http.clone(), JobSourceConfig::from_env(), retry.clone());
    let keyword_service = MonkeyLearnClient::new(http, keyword_config.clone(), retry);
    let extractor = KeywordExtractor::from_config(Arc::new(keyword_service), &keyword_config);

    let pipeline = SearchPipeline::new(
        Arc::new(source),
        extractor,
        Arc::new(PgFavoritesStore::new(pool.clone())),
    )
    .with_degraded_favorites(search_config.degrade_favorites);

    let sessions = SessionState::new(
        search_config.session_cookie_name.clone(),
        Arc::new(PgSessionValidator::new(pool)),
    );

    log::info!(
        "search pipeline ready (keyword batch size {}, up to {} concurrent batches)",
        keyword_config.batch_size,
        keyword_config.max_concurrent_batches
    );

    Ok((pipeline, sessions))
}

pub fn rocket() -> Rocket<Build> {
    init_logger();

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allow_credentials(true)
        .to_cors()
        .expect("Error creating CORS");

    rocket::build()
        .attach(RequestLogger)
        .attach(JupiterDb::init())
        .attach(cors)
        .attach(AdHoc::try_on_ignite(
            "Run Migrations",
            |rocket| async move {
                match JupiterDb::fetch(&rocket) {
                    Some(db) => match MIGRATOR.run(&**db).await {
                        Ok(_) => {
                            log::info!("database migrations successful");
                            Ok(rocket)
                        }
                        Err(e) => {
                            log::error!("database migrations failed: {}", e);
                            Err(rocket)
                        }
                    },
                    None => {
                        log::error!("database pool not available for migrations");
                        Err(rocket)
                    }
                }
            },
        ))
        .attach(AdHoc::try_on_ignite(
            "Search Pipeline",
            |rocket| async move {
                let pool = match JupiterDb::fetch(&rocket) {
                    Some(db) => (**db).clone(),
                    None => {
                        log::error!("database pool not available for search pipeline");
                        return Err(rocket);
                    }
                };

                let search_config = SearchConfig::from_env();
                match build_search_state(pool, &search_config) {
                    Ok((pipeline, sessions)) => Ok(rocket.manage(pipeline).manage(sessions)),
                    Err(err) => {
                        log::error!("failed to build HTTP client for search pipeline: {}", err);
                        Err(rocket)
                    }
                }
            },
        ))
        .mount(
            "/api/v1",
            openapi_get_routes![
                routes::health::health_check,
                routes::search::search_items,
                routes::search::search_items_post,
            ],
        )
        .mount(
            "/api/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../v1/openapi.json".to_owned(),
                ..Default::default()
            }),
        )
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};
    use rocket_db_pools::sqlx::{self, PgPool};

    use crate::auth::SessionState;
    use crate::search::SearchPipeline;

    pub use database::{TestDatabase, TestDatabaseError};

    /// Seeds the tables the search pipeline reads.
    pub struct TestFixtures<'a> {
        pool: &'a PgPool,
    }

    impl<'a> TestFixtures<'a> {
        pub fn new(pool: &'a PgPool) -> Self {
            Self { pool }
        }

        /// Mark `item_id` as saved by `user_id`.
        pub async fn insert_favorite(&self, user_id: &str, item_id: &str) -> Result<(), sqlx::Error> {
            sqlx::query("INSERT INTO favorites (user_id, item_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(item_id)
                .execute(self.pool)
                .await?;
            Ok(())
        }

        /// Store a session for `user_id` expiring after `ttl`; returns the raw token.
        pub async fn insert_session(
            &self,
            user_id: &str,
            ttl: chrono::Duration,
        ) -> Result<String, sqlx::Error> {
            let token = uuid::Uuid::new_v4().simple().to_string();
            sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES ($1, $2, $3)")
                .bind(crate::auth::session_store::hash_token(&token))
                .bind(user_id)
                .bind(chrono::Utc::now() + ttl)
                .execute(self.pool)
                .await?;
            Ok(token)
        }
    }

    pub mod database {
        use log::LevelFilter;
        use rocket_db_pools::sqlx::postgres::{PgConnectOptions, PgPoolOptions};
        use rocket_db_pools::sqlx::{self, ConnectOptions, PgPool};
        use testcontainers_modules::postgres::Postgres;
        use testcontainers_modules::testcontainers::core::error::TestcontainersError;
        use testcontainers_modules::testcontainers::{ContainerAsync, runners::AsyncRunner};
        use thiserror::Error;
        use uuid::Uuid;

        #[derive(Debug, Error)]
        pub enum TestDatabaseError {
            #[error("neither TEST_DATABASE_URL nor TEST_USE_CONTAINERS is set")]
            MissingUrl,
            #[error("database error: {0}")]
            Sqlx(#[from] sqlx::Error),
            #[error("migration error: {0}")]
            Migration(#[from] sqlx::migrate::MigrateError),
            #[error("container error: {0}")]
            Container(#[from] TestcontainersError),
        }

        /// Throwaway database with migrations applied.
        ///
        /// Uses the server at `TEST_DATABASE_URL` when set, otherwise starts a
        /// Postgres container when `TEST_USE_CONTAINERS` is truthy.
        pub struct TestDatabase {
            pool: Option<PgPool>,
            admin_options: PgConnectOptions,
            database_name: String,
            _container: Option<ContainerAsync<Postgres>>,
        }

        impl TestDatabase {
            pub async fn new_from_env() -> Result<Self, TestDatabaseError> {
                if let Ok(url) = std::env::var("TEST_DATABASE_URL") {
                    return Self::provision(&url, None).await;
                }

                let use_containers = std::env::var("TEST_USE_CONTAINERS")
                    .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false);
                if !use_containers {
                    return Err(TestDatabaseError::MissingUrl);
                }

                let container = Postgres::default().start().await?;
                let host = container.get_host().await?.to_string();
                let port = container.get_host_port_ipv4(5432).await?;
                let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);
                Self::provision(&url, Some(container)).await
            }

            async fn provision(
                admin_url: &str,
                container: Option<ContainerAsync<Postgres>>,
            ) -> Result<Self, TestDatabaseError> {
                let base_options: PgConnectOptions = admin_url.parse()?;
                let admin_options = base_options.clone().log_statements(LevelFilter::Off);

                let admin_pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(admin_options.clone())
                    .await?;

                let database_name = format!("jupiter_test_{}", Uuid::new_v4().simple());
                sqlx::query(&format!("CREATE DATABASE \"{}\"", database_name))
                    .execute(&admin_pool)
                    .await?;
                admin_pool.close().await;

                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect_with(admin_options.clone().database(&database_name))
                    .await?;

                crate::MIGRATOR.run(&pool).await?;

                Ok(Self {
                    pool: Some(pool),
                    admin_options,
                    database_name,
                    _container: container,
                })
            }

            pub fn pool(&self) -> &PgPool {
                self.pool.as_ref().expect("test database pool is available")
            }

            pub fn pool_clone(&self) -> PgPool {
                self.pool().clone()
            }

            /// Close the pool and drop the database.
            pub async fn close(mut self) -> Result<(), TestDatabaseError> {
                if let Some(pool) = self.pool.take() {
                    pool.close().await;
                }

                let admin_pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(self.admin_options.clone())
                    .await?;
                sqlx::query(&format!(
                    "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                    self.database_name
                ))
                .execute(&admin_pool)
                .await?;
                admin_pool.close().await;

                Ok(())
            }
        }
    }

    /// Builder for Rocket instances used by route tests.
    #[derive(Default)]
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        pipeline: Option<SearchPipeline>,
        sessions: Option<SessionState>,
    }

    impl TestRocketBuilder {
        /// Random port, logging disabled.
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                ..Self::default()
            }
        }

        /// Mount routes under `/api/v1`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api/v1".to_string(), routes));
            self
        }

        pub fn manage_pipeline(mut self, pipeline: SearchPipeline) -> Self {
            self.pipeline = Some(pipeline);
            self
        }

        pub fn manage_sessions(mut self, sessions: SessionState) -> Self {
            self.sessions = Some(sessions);
            self
        }

        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment);

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            if let Some(pipeline) = self.pipeline {
                rocket = rocket.manage(pipeline);
            }

            if let Some(sessions) = self.sessions {
                rocket = rocket.manage(sessions);
            }

            rocket
        }

        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
