//! # ArtVault 웹 서버 진입점
//!
//! 작품 공유 서비스의 JSON API와 업로드 이미지를 서빙합니다.
//!
//! 시작 순서:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성과 마이그레이션
//! 4. 업로드 디렉토리 생성, (선택) 데모 데이터 삽입
//! 5. 라우터 구성 후 서버 시작
//! 6. 종료 신호를 받으면 요청을 마무리하고 연결 풀을 닫음

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use anyhow::Result;
use config::Config;
use routes::AppState;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅 초기화 ──
    // RUST_LOG가 없으면 artvault, tower_http, axum을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artvault=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting ArtVault server on {}:{}", config.host, config.port);

    // ── 3단계: 연결 풀 생성과 마이그레이션 ──
    let pool = db::connect(&config.database_url).await?;

    tracing::info!("Running database migrations...");
    db::migrate(&pool).await?;

    // ── 4단계: 업로드 디렉토리, 데모 데이터 ──
    let uploads_path = Path::new(&config.uploads_path);
    if !uploads_path.exists() {
        tokio::fs::create_dir_all(uploads_path).await?;
        tracing::info!("Created uploads directory: {}", config.uploads_path);
    }

    if config.seed_demo_data {
        db::seed::seed_demo_data(&pool).await?;
    }

    // ── 5단계: 라우터 구성, 서버 시작 ──
    let state = AppState::new(pool.clone(), &config);
    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // ── 6단계: 정리 ──
    pool.close().await;
    tracing::info!("Database pool closed, bye");

    Ok(())
}

/// Ctrl+C 또는 SIGTERM을 기다립니다.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                tracing::info!("Received Ctrl+C, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        tracing::info!("Received Ctrl+C, shutting down...");
    }
}
