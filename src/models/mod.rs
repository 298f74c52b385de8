pub mod dto;
pub mod envelope;
pub mod record;
pub mod security_log;
