//! Console Client - encrypted request/response sessions with a dnsdist console
//!
//! ```no_run
//! # async fn run() -> console_client::ConsoleResult<()> {
//! let mut session = console_client::dial_with("127.0.0.1:5199", "FUih6Cj9mNbrHWavhyhUrUhsuWK0pXSXc/d10WeV3h4=").await?;
//! let version = session.command("showVersion()").await?;
//! println!("{}", version);
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handshake;
mod session;

pub use config::*;
pub use error::*;
pub use handshake::*;
pub use session::*;

pub use console_protocol::{DEFAULT_CONSOLE_ADDR, SessionState};
pub use crypto_session::SharedKey;
pub use net_transport::{ConnectionStats, Transport};
