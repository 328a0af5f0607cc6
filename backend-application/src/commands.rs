pub mod ingest_commands;
pub mod purge_commands;
pub mod retention_commands;
