pub mod cmd_format;
pub mod cmd_header;
pub mod cmd_summary;
pub mod cmd_validate;
pub mod common;
