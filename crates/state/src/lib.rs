pub mod account;
pub mod application;
pub mod asset;
pub mod state;

pub use account::{Account, AppLocalState, AssetHolding, MinBalanceParams};
pub use application::{Application, StateSchema};
pub use asset::AssetDefinition;
pub use state::WorldState;
