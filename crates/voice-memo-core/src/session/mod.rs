mod controller;
mod session_config;
mod session_state;

pub use {
    controller::SessionController, session_config::SessionConfig, session_state::SessionState,
};
