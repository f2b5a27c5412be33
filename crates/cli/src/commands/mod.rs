//! Command implementations.
//!
//! Every command except `login` and `logout` first mounts the controller:
//! read the stored session, verify it, load the first page.

pub mod products;
pub mod session;

use catalog_admin::{AdminConfig, AdminError, AdminState, FileSessionStore, HexClient};
use catalog_admin_core::EmailError;
use thiserror::Error;

/// The controller wired to the real API and the session file.
pub type Controller = AdminState<HexClient, FileSessionStore>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A handler failed; the display is the alert shown to the administrator.
    #[error("{alert}")]
    Failed {
        alert: String,
        #[source]
        source: AdminError,
    },

    /// Controller could not be built.
    #[error(transparent)]
    Admin(#[from] AdminError),

    /// Invalid username.
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] EmailError),

    /// No password given.
    #[error("Password required: pass --password or set CATALOG_PASSWORD")]
    MissingPassword,

    /// No usable stored session.
    #[error("Not signed in; run `catalog-cli login` first")]
    NotSignedIn,

    /// Requested page does not exist.
    #[error("Page {page} is out of range (1-{total_pages})")]
    PageOutOfRange { page: u32, total_pages: u32 },

    /// More `--image`s than free slots.
    #[error("A product holds at most {max} secondary images")]
    TooManyImages { max: usize },

    /// Writing to stdout failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build a signed-out controller from configuration.
fn controller(config: &AdminConfig) -> Result<Controller, CommandError> {
    let api = HexClient::new(&config.api).map_err(AdminError::from)?;
    Ok(AdminState::new(api, FileSessionStore::new(&config.session_file)))
}

/// Build a controller and pick up the stored session.
async fn mounted(config: &AdminConfig) -> Result<Controller, CommandError> {
    let mut state = controller(config)?;
    state.mount().await.map_err(alerted(&mut state))?;
    if !state.is_authenticated() {
        return Err(CommandError::NotSignedIn);
    }
    Ok(state)
}

/// Pair a handler failure with the alert it left on the controller.
fn alerted(state: &mut Controller) -> impl FnOnce(AdminError) -> CommandError + '_ {
    move |source| CommandError::Failed {
        alert: state.take_alert().unwrap_or_else(|| source.user_message()),
        source,
    }
}
