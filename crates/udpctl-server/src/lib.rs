//! Control interface runtime for udpctl.
//!
//! Wires the layers together: the [`InterfaceManager`] owns the UDP
//! transport and runs the single-threaded receive, validate, dispatch loop;
//! the [`Dispatcher`] routes frames by message id while active; the
//! [`ControlServer`] owns both lifecycles and the audit logs.
//! [`ControlClient`] is the sending side used by tools and tests.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod interface;
pub mod server;

pub use client::ControlClient;
pub use config::{ClientConfig, ReplyTarget, ServerConfig, ThreadMode};
pub use dispatch::{ControlLink, Dispatcher, DispatcherState, Outcome};
pub use error::{Result, ServerError};
pub use interface::{InterfaceManager, StopHandle};
pub use server::{ControlServer, ServerState};
