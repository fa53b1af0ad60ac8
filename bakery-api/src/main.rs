use bakery_api::config::Config;
use bakery_api::error::AppError;
use bakery_api::infrastructure::database::mongo::init_mongo;
use bakery_api::logging::init_logging;
use bakery_api::server::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    init_logging(&config)?;

    tracing::info!("Starting bakery API service");

    // 连接数据库并建索引
    let db = init_mongo(&config).await?;

    let state = AppState::new(config.clone(), &db);

    // 配置了 [admin] 段就在启动阶段预置账号
    if let Some(admin) = &config.admin {
        if state
            .auth_service()
            .provision_admin(&admin.username, &admin.password)
            .await?
        {
            tracing::info!("admin account provisioned from configuration");
        }
    }

    // 清理历史过期会话
    let removed = state.auth_service().cleanup_sessions().await?;
    if removed > 0 {
        tracing::info!("removed {} expired sessions", removed);
    }

    let app = create_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", &addr);

    axum::serve(listener, app).await?;
    Ok(())
}
