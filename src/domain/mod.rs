// Domain layer: core simulation types and rules.

pub mod errors;
pub mod state;
pub mod systems;
pub mod tuning;
pub mod world;

pub use errors::UnknownPlayerError;
pub use state::{Coin, CoinSnapshot, CoinId, Player, PlayerId, PlayerInput, PlayerSnapshot};
pub use tuning::ArenaTuning;
pub use world::World;
