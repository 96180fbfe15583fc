use crate::domain::state::Player;
use crate::domain::tuning::ArenaTuning;

pub fn tick_player(p: &mut Player, cfg: &ArenaTuning) {
    let (dir_x, dir_y) = p.input.axis();

    // position integrate (fixed displacement per tick, no velocity carried over)
    p.x += dir_x * cfg.player_speed;
    p.y += dir_y * cfg.player_speed;

    clamp_player(p, cfg);
}

fn clamp_player(p: &mut Player, cfg: &ArenaTuning) {
    // Axis-aligned box against a square arena; each axis clamps independently.
    let max = cfg.max_player_coord();
    p.x = p.x.clamp(0.0, max);
    p.y = p.y.clamp(0.0, max);
}
