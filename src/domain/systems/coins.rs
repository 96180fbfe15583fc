use crate::domain::state::{Coin, Player};
use crate::domain::tuning::ArenaTuning;
use rand::Rng;
use tracing::debug;

/// Creates a coin at a uniform-random position at least `coin_spawn_margin` away from the walls.
pub fn spawn_coin<R: Rng>(cfg: &ArenaTuning, rng: &mut R) -> Coin {
    let span = (cfg.arena_size - 2.0 * cfg.coin_spawn_margin).max(0.0);
    Coin {
        id: uuid::Uuid::new_v4().to_string(),
        x: cfg.coin_spawn_margin + rng.random::<f32>() * span,
        y: cfg.coin_spawn_margin + rng.random::<f32>() * span,
    }
}

/// Resolves player vs coin pickups and respawns every collected coin.
///
/// Players are visited in slice order. For each player the coins are scanned from last to
/// first; a hit scores one point, removes that coin and appends its replacement, so the
/// replacement is out of reach for the current player's scan but visible to every later
/// player in the same pass. Returns the number of pickups.
pub fn tick_coins<R: Rng>(
    players: &mut [Player],
    coins: &mut Vec<Coin>,
    cfg: &ArenaTuning,
    rng: &mut R,
) -> usize {
    let reach = cfg.pickup_reach();
    let mut pickups = 0;

    for p in players.iter_mut() {
        let (cx, cy) = p.center(cfg.player_size);

        for i in (0..coins.len()).rev() {
            let coin = &coins[i];
            let dx = cx - coin.x;
            let dy = cy - coin.y;
            if dx.hypot(dy) < reach {
                p.score += 1;
                let collected = coins.remove(i);
                coins.push(spawn_coin(cfg, rng));
                pickups += 1;

                debug!(
                    player_id = %p.id,
                    coin_id = %collected.id,
                    score = p.score,
                    "coin collected"
                );
            }
        }
    }

    pickups
}
