pub mod audio;
pub mod controller;
pub mod dispatcher;
pub mod mode;
pub mod protocol;
pub mod session;
pub mod settings;
pub mod state;
pub mod stream;
pub mod transcript;
pub mod ui;
