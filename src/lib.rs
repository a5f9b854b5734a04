pub mod config;
pub mod data_fetch;
pub mod http_client;
pub mod provider;
pub mod rows;
pub mod state;
pub mod table_export;
