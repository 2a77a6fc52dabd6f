pub mod authenticate_command;
pub mod command;
pub mod dump_binlog_command;
pub mod ping_command;
pub mod query_command;
pub mod quit_command;
pub mod select_db_command;
