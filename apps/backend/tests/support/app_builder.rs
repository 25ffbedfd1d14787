use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::NormalizePath;
use actix_web::{test, web, App, Error};
use bookshelf::middleware::request_trace::RequestTrace;
use bookshelf::middleware::structured_logger::StructuredLogger;
use bookshelf::middleware::trace_span::TraceSpan;
use bookshelf::routes;
use bookshelf::state::app_state::AppState;
use bookshelf::state::security_config::SecurityConfig;
use bookshelf::AppError;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only";

/// Type alias for route configuration functions
type RouteConfigFn = Box<dyn Fn(&mut web::ServiceConfig) + Send + Sync>;

/// In-memory state signed with [`TEST_SECRET`].
pub fn test_state() -> AppState {
    AppState::in_memory(SecurityConfig::new(TEST_SECRET))
}

/// Builder for creating test Actix service instances
pub struct TestAppBuilder {
    state: AppState,
    route_config: Option<RouteConfigFn>,
}

impl TestAppBuilder {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            route_config: None,
        }
    }

    /// Same routes, scopes and auth guard as `main.rs`.
    pub fn with_prod_routes(mut self) -> Self {
        self.route_config = Some(Box::new(routes::configure) as RouteConfigFn);
        self
    }

    pub fn with_routes<F>(mut self, config_fn: F) -> Self
    where
        F: Fn(&mut web::ServiceConfig) + Send + Sync + 'static,
    {
        self.route_config = Some(Box::new(config_fn) as RouteConfigFn);
        self
    }

    /// Build the test service with the production middleware stack (minus CORS).
    pub async fn build(
        self,
    ) -> Result<impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>, AppError>
    {
        let route_config = self.route_config;
        let data = web::Data::new(self.state);

        let service = test::init_service(
            App::new()
                .wrap(StructuredLogger)
                .wrap(TraceSpan)
                .wrap(RequestTrace)
                .wrap(NormalizePath::trim())
                .app_data(data)
                .configure(move |cfg| {
                    if let Some(config_fn) = &route_config {
                        config_fn(cfg);
                    }
                }),
        )
        .await;

        Ok(service)
    }
}

pub fn create_test_app(state: AppState) -> TestAppBuilder {
    TestAppBuilder::new(state)
}
