pub mod audit;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod gate;
pub mod metrics;
pub mod sensor;
pub mod testing;
pub mod ticket;

pub use audit::{
    create_audit_system, AuditError, AuditEvent, AuditEventEnvelope, AuditFilter, AuditHandle,
    AuditRecord, AuditStore, AuditWriter, SqliteAuditStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    DispatchConfig, GatesConfig, LoggingConfig, ScorerKind, ServerConfig, CONFIG_PATH_ENV,
    DEFAULT_CONFIG_PATH,
};
pub use db::{Database, DatabaseError};
pub use dispatch::{
    create_scorer, CommitOutcome, Dispatch, DispatchEngine, DispatchError, DispatchStore,
    GateScore, GateScorer, InferenceOutcome, RandomScorer, SignalScorer, SqliteDispatchStore,
    StatusUpdate, MAX_SCORE, PENDING_STATUS,
};
pub use gate::{Gate, GateError, GateRegistry, SqliteGateRegistry, DEFAULT_GATES};
pub use sensor::{
    NewObservation, SensorError, SensorObservation, SensorSignals, SensorState, SensorStore,
    SqliteSensorStore,
};
pub use ticket::{
    CreateTicketRequest, SqliteTicketStore, Ticket, TicketError, TicketFilter, TicketStatus,
    TicketStore, Transition,
};
