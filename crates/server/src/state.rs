use std::sync::Arc;

use valet_core::{
    AuditHandle, AuditStore, Config, Database, DispatchEngine, DispatchStore, GateRegistry,
    GateScorer, SensorStore, SqliteDispatchStore, SqliteGateRegistry, SqliteSensorStore,
    SqliteTicketStore, TicketStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    tickets: Arc<dyn TicketStore>,
    sensors: Arc<dyn SensorStore>,
    gates: Arc<dyn GateRegistry>,
    dispatches: Arc<dyn DispatchStore>,
    engine: DispatchEngine,
    audit: AuditHandle,
    audit_store: Arc<dyn AuditStore>,
}

impl AppState {
    /// Build every store over the shared database and wire the dispatch engine.
    pub fn new(
        config: Config,
        database: Database,
        scorer: Arc<dyn GateScorer>,
        audit: AuditHandle,
        audit_store: Arc<dyn AuditStore>,
    ) -> Self {
        let tickets: Arc<dyn TicketStore> = Arc::new(SqliteTicketStore::new(database.clone()));
        let sensors: Arc<dyn SensorStore> = Arc::new(SqliteSensorStore::new(database.clone()));
        let gates: Arc<dyn GateRegistry> = Arc::new(SqliteGateRegistry::new(database.clone()));
        let dispatches: Arc<dyn DispatchStore> = Arc::new(SqliteDispatchStore::new(database));

        let engine = DispatchEngine::new(
            Arc::clone(&tickets),
            Arc::clone(&sensors),
            Arc::clone(&gates),
            Arc::clone(&dispatches),
            scorer,
            &config.dispatch,
        )
        .with_audit(audit.clone());

        Self {
            config,
            tickets,
            sensors,
            gates,
            dispatches,
            engine,
            audit,
            audit_store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tickets(&self) -> &dyn TicketStore {
        self.tickets.as_ref()
    }

    pub fn sensors(&self) -> &dyn SensorStore {
        self.sensors.as_ref()
    }

    pub fn gates(&self) -> &dyn GateRegistry {
        self.gates.as_ref()
    }

    pub fn dispatches(&self) -> &dyn DispatchStore {
        self.dispatches.as_ref()
    }

    pub fn engine(&self) -> &DispatchEngine {
        &self.engine
    }

    pub fn audit(&self) -> &AuditHandle {
        &self.audit
    }

    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }
}
