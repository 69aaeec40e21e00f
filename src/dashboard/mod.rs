//! Dashboard state and the polling controller that keeps it fresh

pub mod generations;
pub mod poller;
pub mod state;

pub use generations::{FetchKind, RequestGenerations};
pub use poller::{
    CycleReport, PollingController, ADD_COLDKEY_ERROR, FETCH_ERROR_MESSAGE,
    INVALID_COLDKEY_MESSAGE, INVALID_SUBNET_MESSAGE, REMOVE_COLDKEY_ERROR, SUBNET_UPDATE_ERROR,
};
pub use state::{DashboardState, DashboardSummary, SettingsSnapshot};
