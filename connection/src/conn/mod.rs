pub mod connection;
pub mod connection_options;
pub mod database_family;
pub mod packet_channel;
pub mod query_result;
