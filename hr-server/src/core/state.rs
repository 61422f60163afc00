use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::JwtService;
use crate::core::{BackgroundTasks, Config, Result, TaskKind};
use crate::gateways::Gateways;
use crate::lifecycle::{Lifecycle, LifecycleSettings};
use crate::reconcile::Reconciler;
use crate::scheduler;
use crate::store::Store;
use crate::sync::IntegrationSync;

/// Server state holding shared handles to every service
///
/// Every field is `Arc`-backed, so cloning is cheap and the whole thing
/// serves directly as axum `State`.
///
/// | Field | Type | Purpose |
/// |-------|------|---------|
/// | config | Config | immutable settings |
/// | store | Store | entity store (redb) |
/// | gateways | Gateways | external system clients |
/// | reconciler | Reconciler | imports and payroll sync |
/// | lifecycle | Lifecycle | hire and fire requests |
/// | integrations | IntegrationSync | ticketing and directory sync |
/// | jwt_service | Arc<JwtService> | token validation |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Store,
    pub gateways: Gateways,
    pub reconciler: Reconciler,
    pub lifecycle: Lifecycle,
    pub integrations: IntegrationSync,
    pub jwt_service: Arc<JwtService>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("gateways", &self.gateways)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// Builds state from an opened store and gateways
    ///
    /// Usually [`initialize()`](Self::initialize) is the entry point; tests use
    /// this to inject an in-memory store. Fails when no signing key is available.
    pub fn new(config: Config, store: Store, gateways: Gateways) -> Result<Self> {
        let settings = LifecycleSettings {
            email_domain: config.email_domain.clone(),
            hr_mailbox: config.hr_mailbox.clone(),
            it_mailbox: config.it_mailbox.clone(),
        };
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone())?);

        Ok(Self {
            reconciler: Reconciler::new(store.clone(), gateways.clone(), &config.email_domain),
            lifecycle: Lifecycle::new(store.clone(), gateways.clone(), settings),
            integrations: IntegrationSync::new(store.clone(), gateways.clone()),
            config,
            store,
            gateways,
            jwt_service,
        })
    }

    /// Initializes server state
    ///
    /// 1. Creates the work directory
    /// 2. Opens the database (`{work_dir}/hr-desk.redb`)
    /// 3. Builds the gateways from configuration
    /// 4. Sets up the JWT signing key
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db_path = config.database_path();
        let store = Store::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Database opened");

        let integrations = &config.integrations;
        tracing::info!(
            ticketing = integrations.ticketing.is_some(),
            directory = integrations.directory.is_some(),
            mail = integrations.mail.is_some(),
            payroll = integrations.payroll.is_some(),
            notify = integrations.notify.is_some(),
            webhook = integrations.payroll_webhook_token.is_some(),
            "Integrations configured"
        );
        let gateways = Gateways::from_config(integrations, config.request_timeout());

        Self::new(config.clone(), store, gateways)
    }

    /// Starts background tasks
    ///
    /// - `due_sweep`: periodically executes due hire and fire requests
    /// - `startup_import`: imports the import directory once, archiving successes
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let interval = Duration::from_secs(self.config.due_sweep_interval_secs.max(1));
        scheduler::register(&mut tasks, self.lifecycle.clone(), interval);

        let import_dir = self.import_dir();
        if import_dir.is_dir() {
            let reconciler = self.reconciler.clone();
            tasks.spawn("startup_import", TaskKind::Warmup, async move {
                match reconciler.import_directory(&import_dir, false, true).await {
                    Ok(reports) => {
                        tracing::info!(target: "import", files = reports.len(), "Startup import finished")
                    }
                    Err(e) => {
                        tracing::error!(target: "import", error = %e, "Startup import failed")
                    }
                }
            });
        }

        tasks.log_summary();
        tasks
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// Directory scanned for JSON imports
    pub fn import_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.import_dir)
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
