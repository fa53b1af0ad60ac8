use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::Config;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::catalog_service::CatalogService;
use crate::domain::services::coupon_service::CouponService;
use crate::domain::services::notification_service::NotificationService;
use crate::domain::services::order_service::OrderService;
use crate::infrastructure::external::cloudinary::{CloudinaryMediaStore, MediaStore};
use crate::infrastructure::external::resend::{Mailer, ResendMailer};
use crate::repository::{
    AdminRepository, CouponRepository, MongoAdminRepository, MongoCouponRepository,
    MongoOrderRepository, MongoProductRepository, MongoPuzzleRepository, MongoSessionRepository,
    OrderRepository, ProductRepository, PuzzleRepository, SessionRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub admin: Arc<dyn AdminRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub coupons: Arc<dyn CouponRepository>,
    pub puzzles: Arc<dyn PuzzleRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    pub fn new(config: Config, db: &mongodb::Database) -> Self {
        let mailer = Arc::new(ResendMailer::new(&config.email));
        let media = Arc::new(CloudinaryMediaStore::new(&config.media));

        Self {
            products: Arc::new(MongoProductRepository::new(db)),
            orders: Arc::new(MongoOrderRepository::new(db)),
            admin: Arc::new(MongoAdminRepository::new(db)),
            sessions: Arc::new(MongoSessionRepository::new(db)),
            coupons: Arc::new(MongoCouponRepository::new(db)),
            puzzles: Arc::new(MongoPuzzleRepository::new(db)),
            mailer,
            media,
            config,
        }
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.admin.clone(), self.sessions.clone())
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.products.clone())
    }

    pub fn order_service(&self) -> OrderService {
        OrderService::new(self.orders.clone(), self.products.clone(), self.coupons.clone())
    }

    pub fn coupon_service(&self) -> CouponService {
        CouponService::new(self.coupons.clone(), self.puzzles.clone())
    }

    pub fn notification_service(&self) -> NotificationService {
        NotificationService::new(self.mailer.clone(), &self.config.email)
    }
}

pub fn create_app(state: AppState) -> Router {
    let app_state = Arc::new(state);

    // API 路由
    let api_routes = Router::new()
        .nest("/auth", api::auth::routes())
        .nest("/products", api::products::routes())
        .nest("/orders", api::orders::routes())
        .nest("/treasure-hunt", api::treasure_hunt::routes())
        .nest("/coupon", api::coupons::routes())
        .nest("/upload", api::upload::routes());

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
