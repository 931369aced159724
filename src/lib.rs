#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod core;
#[cfg(feature = "std")]
pub mod domain;
#[cfg(feature = "std")]
pub mod error;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod presenter;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod retry;
#[cfg(feature = "std")]
pub mod service;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod ui;

pub use crate::core::*;
#[cfg(feature = "std")]
pub use domain::*;
#[cfg(feature = "std")]
pub use error::ClientError;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use presenter::{clear_session, GridId, PanelId, Presenter};
#[cfg(feature = "std")]
pub use retry::RetryPolicy;
#[cfg(feature = "std")]
pub use service::{GameService, HttpGameService, InMemoryService, ScriptedGame};
#[cfg(feature = "std")]
pub use session::{GameSummary, LifecycleState, SessionConfig, SessionController, SharedBoards};
#[cfg(feature = "std")]
pub use ui::TerminalPresenter;
