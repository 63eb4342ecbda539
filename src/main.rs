use actix_web::{web, App, HttpServer};
use chrono::Duration;
use std::io;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;

use governance_core::config::Config;
use governance_core::governance::{ActionDispatcher, EngineSettings, GovernanceEngine, SystemClock};
use governance_core::http::governance_handler::AppState;
use governance_core::middleware::cors_middleware;
use governance_core::models::{ActionKind, Role};
use governance_core::service::{
    CrosschainRegistry, DAppRegistry, ExecutionKeeper, GovernanceService, ParameterStore,
    RoleManager,
};
use governance_core::telemetry::init_telemetry;

/// Wire collaborators, the dispatcher and the engine from configuration
fn build_engine(config: &Config) -> Result<GovernanceEngine, anyhow::Error> {
    let signer_role: Role = config.governance.signer_role.parse()?;
    let proposer_role: Role = config.governance.proposer_role.parse()?;

    let roles = Arc::new(RoleManager::with_protected_roles([signer_role]));
    for account in &config.bootstrap.foundation_managers {
        roles.grant(signer_role, account.clone())?;
    }
    for account in &config.bootstrap.proposers {
        roles.grant(proposer_role, account.clone())?;
    }

    let bridge = Arc::new(CrosschainRegistry::new());
    for chain_id in &config.bootstrap.enabled_chains {
        bridge.enable_chain(*chain_id);
    }

    let dispatcher = ActionDispatcher::builder()
        .register(ActionKind::ManagePermission, roles.clone())
        .register(ActionKind::RegisterDApp, Arc::new(DAppRegistry::new()))
        .register(ActionKind::SetCrosschainToken, bridge)
        .register(ActionKind::SetParameter, Arc::new(ParameterStore::new()))
        .build();

    tracing::info!(kinds = ?dispatcher.kinds(), "Action handlers registered");

    let confirmation_delay = Duration::try_seconds(config.governance.confirmation_delay_secs)
        .ok_or_else(|| anyhow::anyhow!("confirmation delay out of range"))?;
    let settings = EngineSettings {
        signer_role,
        proposer_role,
        confirmation_delay,
    };

    Ok(GovernanceEngine::new(
        roles,
        dispatcher,
        settings,
        Arc::new(SystemClock),
    ))
}

#[tokio::main]
async fn main() -> io::Result<()> {
    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    // Initialize telemetry
    init_telemetry(&config.server.rust_log);

    let engine = Arc::new(build_engine(&config).expect("Failed to build governance engine"));
    tracing::info!(
        signers = engine.signer_set().len(),
        threshold = engine.threshold(),
        delay_secs = config.governance.confirmation_delay_secs,
        "Governance engine ready"
    );

    // Execution keeper
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let keeper = if config.keeper.enabled {
        let keeper = ExecutionKeeper::new(
            engine.clone(),
            std::time::Duration::from_secs(config.keeper.poll_interval_secs),
        );
        Some(tokio::spawn(keeper.run(shutdown_rx)))
    } else {
        None
    };

    tracing::info!("Starting governance server on {}:{}", config.server.host, config.server.port);

    let state = web::Data::new(AppState {
        governance: GovernanceService::new(engine),
    });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors_middleware())
            .wrap(actix_web::middleware::Logger::default())
            .configure(governance_core::http::configure)
    })
    .bind((config.server.host.clone(), config.server.port))?
    .run();

    // Graceful shutdown
    let server_handle = server.handle();
    tokio::spawn(async move {
        signal::ctrl_c().await.expect("Failed to listen for shutdown signal");
        tracing::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    let result = server.await;

    let _ = shutdown_tx.send(true);
    if let Some(keeper) = keeper {
        let _ = keeper.await;
    }

    result
}
