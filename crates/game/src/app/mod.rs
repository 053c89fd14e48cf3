pub(crate) mod bootstrap;
pub(crate) mod commands;
pub(crate) mod config_file;
pub(crate) mod loop_runner;
pub(crate) mod text_view;
