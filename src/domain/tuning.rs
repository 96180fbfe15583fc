/// Gameplay tuning for the arena, players and coins.
///
/// Keep this separate from runtime/server configuration (tick rates, delays, buffer sizes).
/// All distances are in arena units; the arena spans `[0, arena_size]` on both axes.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaTuning {
    /// Side length of the square arena.
    pub arena_size: f32,

    /// Displacement per tick along each axis with a held direction.
    pub player_speed: f32,

    /// Side length of the player's square bounding box.
    pub player_size: f32,

    /// Pickup radius of a coin.
    pub coin_radius: f32,

    /// Number of coins alive between ticks.
    pub coin_count: usize,

    /// Minimum distance between a freshly spawned coin and the walls.
    pub coin_spawn_margin: f32,
}

impl ArenaTuning {
    /// Largest coordinate the top-left corner of a player may take on either axis.
    pub fn max_player_coord(&self) -> f32 {
        (self.arena_size - self.player_size).max(0.0)
    }

    /// Distance below which a player's center and a coin's center overlap.
    pub fn pickup_reach(&self) -> f32 {
        self.player_size / 2.0 + self.coin_radius
    }

    /// Where new players appear.
    pub fn spawn_point(&self) -> (f32, f32) {
        let center = (self.arena_size / 2.0).min(self.max_player_coord());
        (center, center)
    }
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            arena_size: 600.0,
            player_speed: 5.0,
            player_size: 20.0,
            coin_radius: 10.0,
            coin_count: 5,
            coin_spawn_margin: 10.0,
        }
    }
}
