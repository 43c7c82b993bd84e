//! The match builder (§4.C): a pure function over a queue snapshot that
//! either proposes one ten-player match or changes nothing.

use std::time::Instant;

use crate::config::EngineConfig;
use crate::types::{Match, MatchId, MatchMetrics, PlayerProfile, QueueEntry, Region};

/// Output of a successful `build_match` call: the match itself and the
/// queue identities it consumes. The caller (the tick scheduler) is
/// responsible for actually removing them from the queue store.
#[derive(Debug, Clone)]
pub struct BuiltMatch {
    pub match_: Match,
    pub removed_ids: Vec<String>,
}

/// Attempt to form one match for `region` out of `entries` as of `now`.
/// Mutates nothing; on failure returns `None`.
pub fn build_match(
    entries: &[QueueEntry],
    config: &EngineConfig,
    region: Region,
    now: Instant,
) -> Option<BuiltMatch> {
    if entries.len() < 10 {
        return None;
    }

    let mut best: Option<(f64, f64, Vec<QueueEntry>)> = None;

    for seed in entries {
        let seed_wait_ms = seed.wait_ms(now);
        if !is_region_allowed(&seed.profile, region, seed_wait_ms, config) {
            continue;
        }

        let Some((tight_ten, avg_wait_ms, spread)) = evaluate_seed(entries, seed, config, region, now)
        else {
            continue;
        };

        let better = match &best {
            None => true,
            Some((best_wait, best_spread, _)) => {
                avg_wait_ms > *best_wait || (avg_wait_ms == *best_wait && spread < *best_spread)
            }
        };
        if better {
            best = Some((avg_wait_ms, spread, tight_ten));
        }
    }

    let (avg_wait_ms, _spread, tight_ten) = best?;

    let removed_ids: Vec<String> = tight_ten.iter().map(|e| e.profile.id.clone()).collect();
    let min_skill = tight_ten.iter().map(|e| e.profile.mmr).min().expect("ten entries");
    let max_skill = tight_ten.iter().map(|e| e.profile.mmr).max().expect("ten entries");
    let avg_skill = tight_ten.iter().map(|e| e.profile.mmr as f64).sum::<f64>() / 10.0;

    let players: Vec<PlayerProfile> = tight_ten.into_iter().map(|e| e.profile).collect();
    let players = balance_teams(players);

    let match_ = Match {
        id: MatchId::new(),
        region,
        players,
        metrics: MatchMetrics {
            avg_skill,
            min_skill,
            max_skill,
            avg_wait_ms,
        },
    };

    Some(BuiltMatch { match_, removed_ids })
}

/// For every seed that is region-allowed for `region`, find the tight ten
/// (minimum-spread contiguous window of the eligible set sorted by skill).
/// Returns `None` if the eligible set has fewer than ten members or the
/// tight ten's spread exceeds the seed's relaxed allowance.
fn evaluate_seed(
    entries: &[QueueEntry],
    seed: &QueueEntry,
    config: &EngineConfig,
    region: Region,
    now: Instant,
) -> Option<(Vec<QueueEntry>, f64, f64)> {
    let wait_s = seed.wait_ms(now);
    let relax_secs = ((wait_s - config.min_wait_before_match_ms).max(0) as f64) / 1000.0;

    let skill_window = (config.base_mmr_window as f64 + config.mmr_relax_per_second as f64 * relax_secs)
        .min(config.max_mmr_window as f64);
    let ping_window = (config.max_ping_ms as f64 + config.ping_relax_per_second as f64 * relax_secs)
        .min(config.max_ping_ms_cap as f64);
    let allowed_spread = if wait_s > config.min_wait_before_match_ms {
        (config.max_allowed_mmr_diff as f64 + config.mmr_diff_relax_per_second as f64 * relax_secs)
            .min(config.max_relaxed_mmr_diff as f64)
    } else {
        config.max_allowed_mmr_diff as f64
    };

    let mut eligible: Vec<&QueueEntry> = entries
        .iter()
        .filter(|e| {
            let e_wait_ms = e.wait_ms(now);
            is_region_allowed(&e.profile, region, e_wait_ms, config)
                && ((e.profile.mmr - seed.profile.mmr).abs() as f64) <= skill_window
                && (e.profile.effective_latency(region) as f64) <= ping_window
        })
        .collect();

    if eligible.len() < 10 {
        return None;
    }

    eligible.sort_by_key(|e| e.profile.mmr);

    let mut best_start = 0;
    let mut best_spread = i32::MAX;
    for start in 0..=(eligible.len() - 10) {
        let window = &eligible[start..start + 10];
        let spread = window[9].profile.mmr - window[0].profile.mmr;
        if spread < best_spread {
            best_spread = spread;
            best_start = start;
        }
    }

    if (best_spread as f64) > allowed_spread {
        return None;
    }

    let tight_ten: Vec<QueueEntry> = eligible[best_start..best_start + 10]
        .iter()
        .map(|&e| e.clone())
        .collect();
    let avg_wait_ms =
        tight_ten.iter().map(|e| e.wait_ms(now) as f64).sum::<f64>() / tight_ten.len() as f64;

    Some((tight_ten, avg_wait_ms, best_spread as f64))
}

/// Sort the three regions by ascending effective latency and return the
/// target region's zero-based rank in that order (0 = best, 2 = worst).
fn region_rank(profile: &PlayerProfile, target: Region) -> usize {
    let mut latencies: Vec<(Region, i32)> = Region::TICK_ORDER
        .iter()
        .map(|&r| (r, profile.effective_latency(r)))
        .collect();
    latencies.sort_by_key(|&(_, latency)| latency);
    latencies
        .iter()
        .position(|&(r, _)| r == target)
        .expect("target region present in TICK_ORDER")
}

/// The region-eligibility predicate (§4.C).
fn is_region_allowed(profile: &PlayerProfile, target: Region, wait_ms: i64, config: &EngineConfig) -> bool {
    let rank = region_rank(profile, target);
    if rank == 0 {
        return true;
    }
    if profile.effective_latency(target) < config.good_region_ping_ms {
        return true;
    }
    wait_ms >= rank as i64 * config.cross_region_step_ms
}

/// Deterministic greedy team split: sort by descending skill, assign each
/// player to whichever team has the lower running sum (team A on ties),
/// capping each team at five (§4.C).
fn balance_teams(players: Vec<PlayerProfile>) -> Vec<PlayerProfile> {
    let mut ordered = players;
    ordered.sort_by(|a, b| b.mmr.cmp(&a.mmr));

    let mut team_a: Vec<PlayerProfile> = Vec::with_capacity(5);
    let mut team_b: Vec<PlayerProfile> = Vec::with_capacity(5);
    let mut sum_a: i64 = 0;
    let mut sum_b: i64 = 0;

    for player in ordered {
        let assign_a = if team_a.len() >= 5 {
            false
        } else if team_b.len() >= 5 {
            true
        } else {
            sum_a <= sum_b
        };

        if assign_a {
            sum_a += player.mmr as i64;
            team_a.push(player);
        } else {
            sum_b += player.mmr as i64;
            team_b.push(player);
        }
    }

    team_a.into_iter().chain(team_b).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn profile(id: &str, mmr: i32, region: Region, ping_na: i32, ping_eu: i32, ping_asia: i32) -> PlayerProfile {
        PlayerProfile {
            id: id.to_string(),
            mmr,
            region,
            ping_na,
            ping_eu,
            ping_asia,
            ping_fallback_ms: 0,
        }
    }

    fn entry(profile: PlayerProfile, queued_at: Instant) -> QueueEntry {
        QueueEntry { profile, queued_at }
    }

    fn na_players(n: usize, base_mmr: i32, base_ping: i32, now: Instant) -> Vec<QueueEntry> {
        (0..n)
            .map(|i| {
                entry(
                    profile(&format!("p{i}"), base_mmr + i as i32, Region::Na, base_ping + i as i32, 200, 200),
                    now,
                )
            })
            .collect()
    }

    // S1: queue of 1 NA player; no match.
    #[test]
    fn s1_too_few_players_no_match() {
        let now = Instant::now();
        let entries = na_players(1, 1000, 40, now);
        let config = EngineConfig::default();
        assert!(build_match(&entries, &config, Region::Na, now).is_none());
    }

    // S2: queue of 10 NA players, skills 1000..1009, pings 40..49; one match of all ten.
    #[test]
    fn s2_ten_homogeneous_players_match_all() {
        let now = Instant::now();
        let entries = na_players(10, 1000, 40, now);
        let config = EngineConfig::default();
        let built = build_match(&entries, &config, Region::Na, now).expect("match expected");
        assert_eq!(built.match_.players.len(), 10);
        assert_eq!(built.removed_ids.len(), 10);
        let mut ids: Vec<_> = built.removed_ids.clone();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10, "all ten players must be distinct");
    }

    // S3: 1 seed + 4 near + 5 far skills; no match, queue unchanged.
    #[test]
    fn s3_skill_gap_blocks_match() {
        let now = Instant::now();
        let mut entries = vec![entry(profile("seed", 1000, Region::Na, 40, 200, 200), now)];
        for i in 0..4 {
            entries.push(entry(
                profile(&format!("near{i}"), 1000 + i * 10, Region::Na, 40, 200, 200),
                now,
            ));
        }
        for i in 0..5 {
            entries.push(entry(
                profile(&format!("far{i}"), 2000 + i * 10, Region::Na, 40, 200, 200),
                now,
            ));
        }
        let config = EngineConfig::default();
        assert!(build_match(&entries, &config, Region::Na, now).is_none());
    }

    // S4: one player with ping above an unrelaxed cap is excluded (9 eligible, no match).
    #[test]
    fn s4_ping_cap_excludes_one_player() {
        let now = Instant::now();
        let mut entries: Vec<QueueEntry> = (0..9)
            .map(|i| entry(profile(&format!("p{i}"), 1000 + i, Region::Na, 50, 200, 200), now))
            .collect();
        entries.push(entry(profile("far", 1005, Region::Na, 150, 200, 200), now));

        let config = EngineConfig {
            max_ping_ms: 80,
            ping_relax_per_second: 0,
            max_ping_ms_cap: 80,
            ..EngineConfig::default()
        };
        assert!(build_match(&entries, &config, Region::Na, now).is_none());
    }

    // S5: same as S4 but ping relaxation plus a long wait lets all ten match.
    #[test]
    fn s5_ping_relaxation_admits_all_ten() {
        let now = Instant::now();
        let queued_at = now - Duration::from_secs(10);
        let entries: Vec<QueueEntry> = (0..10)
            .map(|i| entry(profile(&format!("p{i}"), 1000 + i, Region::Na, 150, 200, 200), queued_at))
            .collect();

        let config = EngineConfig {
            max_ping_ms: 80,
            ping_relax_per_second: 10,
            max_ping_ms_cap: 200,
            min_wait_before_match_ms: 0,
            ..EngineConfig::default()
        };
        let built = build_match(&entries, &config, Region::Na, now).expect("match expected");
        assert_eq!(built.match_.players.len(), 10);
    }

    // S6: cross-region entry is free when latency is below good_region_ping_ms.
    #[test]
    fn s6_good_region_ping_allows_immediate_cross_region() {
        let now = Instant::now();
        let entries: Vec<QueueEntry> = (0..10)
            .map(|i| entry(profile(&format!("p{i}"), 1000 + i, Region::Na, 20, 40, 200), now))
            .collect();
        let config = EngineConfig {
            good_region_ping_ms: 60,
            ..EngineConfig::default()
        };
        let built = build_match(&entries, &config, Region::Eu, now).expect("match expected in EU");
        assert_eq!(built.match_.region, Region::Eu);
    }

    // S7: first tick no match; after enough wait, cross-region step admits all.
    #[test]
    fn s7_cross_region_step_requires_wait() {
        let now = Instant::now();
        let entries: Vec<QueueEntry> = (0..10)
            .map(|i| entry(profile(&format!("p{i}"), 1000 + i, Region::Na, 20, 80, 200), now))
            .collect();
        let config = EngineConfig {
            good_region_ping_ms: 50,
            cross_region_step_ms: 20_000,
            ..EngineConfig::default()
        };
        assert!(
            build_match(&entries, &config, Region::Eu, now).is_none(),
            "first tick should not match in EU"
        );

        let waited_at = now - Duration::from_secs(21);
        let waited_entries: Vec<QueueEntry> = (0..10)
            .map(|i| entry(profile(&format!("p{i}"), 1000 + i, Region::Na, 20, 80, 200), waited_at))
            .collect();
        let built = build_match(&waited_entries, &config, Region::Eu, now).expect("match expected after wait");
        assert_eq!(built.match_.region, Region::Eu);
    }

    #[test]
    fn team_balance_bounds_skill_delta() {
        let players: Vec<PlayerProfile> = (0..10)
            .map(|i| profile(&format!("p{i}"), 1000 + i * 37, Region::Na, 40, 200, 200))
            .collect();
        let min = players.iter().map(|p| p.mmr).min().unwrap();
        let max = players.iter().map(|p| p.mmr).max().unwrap();

        let balanced = balance_teams(players);
        let sum_a: i32 = balanced[..5].iter().map(|p| p.mmr).sum();
        let sum_b: i32 = balanced[5..].iter().map(|p| p.mmr).sum();
        assert!((sum_a - sum_b).abs() <= max - min);
    }
}
