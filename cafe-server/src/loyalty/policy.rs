//! Reward Policy
//!
//! Pure functions for reward accrual. The canonical rule: every 5 paid
//! (non-reward) orders earn exactly 1 free reward, and a claim consumes
//! 5 paid orders from future counting. Status is always re-derivable from
//! the ledger; nothing here touches storage.
//!
//! Note: the repository history carried three conflicting formulas
//! (mod-6 auto-free, mod-5, and a stateful claim counter). The stateful
//! claim-based mod-5 rule below is the one in force; the others are gone.

use shared::models::{Order, RewardState, RewardStatus};

/// Paid drinks per reward cycle
pub const CYCLE_LEN: i64 = 5;

/// Derive reward status from the two ledger counts.
///
/// `effective = paid - 5 * redeemed`, clamped to ≥ 0 before the modulo so
/// an over-redeemed ledger can never produce a negative-modulo surprise.
pub fn compute_status(paid_drinks: i64, rewards_redeemed: i64) -> RewardStatus {
    let effective = (paid_drinks - CYCLE_LEN * rewards_redeemed).max(0);
    let progress = effective % CYCLE_LEN;

    let drinks_until_reward = if progress == 0 && effective > 0 {
        0
    } else {
        CYCLE_LEN - progress
    };

    let state = if effective > 0 && progress == 0 {
        RewardState::Ready
    } else if drinks_until_reward == 1 {
        RewardState::Upcoming
    } else {
        RewardState::Progress
    };

    RewardStatus {
        paid_drinks,
        effective_paid_drinks: effective,
        progress,
        drinks_until_reward,
        state,
    }
}

/// Derive reward status straight from a ledger snapshot.
///
/// This is the authoritative derivation: the persisted `rewards_redeemed`
/// counter is only a cache of `count(is_reward)`.
pub fn status_from_ledger(orders: &[Order]) -> RewardStatus {
    let paid = orders.iter().filter(|o| !o.is_reward).count() as i64;
    let redeemed = orders.iter().filter(|o| o.is_reward).count() as i64;
    compute_status(paid, redeemed)
}

/// Count of reward orders in a ledger (the invariant value for the cache)
pub fn rewards_in_ledger(orders: &[Order]) -> i64 {
    orders.iter().filter(|o| o.is_reward).count() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::DrinkCategory;

    /// Helper to create a minimal ledger order for testing
    fn make_order(id: i64, price: f64, is_reward: bool) -> Order {
        Order {
            id,
            customer_id: 1,
            drink_category: DrinkCategory::Mojito,
            item_name: if is_reward {
                "Free Reward".to_string()
            } else {
                format!("Drink {}", id)
            },
            item_id: if is_reward { None } else { Some(100 + id) },
            price: if is_reward { 0.0 } else { price },
            is_reward,
            created_at: 1000 + id,
        }
    }

    fn make_ledger(paid: usize, rewards: usize) -> Vec<Order> {
        let mut orders = Vec::new();
        for i in 0..paid {
            orders.push(make_order(i as i64, 70.0, false));
        }
        for i in 0..rewards {
            orders.push(make_order((paid + i) as i64, 0.0, true));
        }
        orders
    }

    #[test]
    fn test_new_customer_zero_orders() {
        let s = compute_status(0, 0);
        assert_eq!(s.effective_paid_drinks, 0);
        assert_eq!(s.progress, 0);
        assert_eq!(s.drinks_until_reward, 5);
        assert_eq!(s.state, RewardState::Progress);
    }

    #[test]
    fn test_four_paid_drinks_is_upcoming() {
        // Scenario A: 4 purchases → one drink away
        let s = compute_status(4, 0);
        assert_eq!(s.paid_drinks, 4);
        assert_eq!(s.effective_paid_drinks, 4);
        assert_eq!(s.progress, 4);
        assert_eq!(s.drinks_until_reward, 1);
        assert_eq!(s.state, RewardState::Upcoming);
    }

    #[test]
    fn test_five_paid_drinks_is_ready() {
        // Scenario B: 5th purchase completes the cycle
        let s = compute_status(5, 0);
        assert_eq!(s.effective_paid_drinks, 5);
        assert_eq!(s.progress, 0);
        assert_eq!(s.drinks_until_reward, 0);
        assert_eq!(s.state, RewardState::Ready);
    }

    #[test]
    fn test_claim_resets_cycle() {
        // Scenario C: 5 paid + 1 claimed → effective 0, back to progress
        let s = compute_status(5, 1);
        assert_eq!(s.paid_drinks, 5);
        assert_eq!(s.effective_paid_drinks, 0);
        assert_eq!(s.progress, 0);
        assert_eq!(s.drinks_until_reward, 5);
        assert_eq!(s.state, RewardState::Progress);
    }

    #[test]
    fn test_twelve_paid_two_claimed() {
        // Scenario E: 12 paid, 2 claimed → effective 2
        let s = compute_status(12, 2);
        assert_eq!(s.effective_paid_drinks, 2);
        assert_eq!(s.progress, 2);
        assert_eq!(s.drinks_until_reward, 3);
        assert_eq!(s.state, RewardState::Progress);
    }

    #[test]
    fn test_multiple_unclaimed_cycles_stay_ready() {
        // 10 paid, nothing claimed → still a multiple of 5, still ready
        let s = compute_status(10, 0);
        assert_eq!(s.effective_paid_drinks, 10);
        assert_eq!(s.progress, 0);
        assert_eq!(s.state, RewardState::Ready);

        // One claim later there is still a full cycle banked
        let s = compute_status(10, 1);
        assert_eq!(s.effective_paid_drinks, 5);
        assert_eq!(s.state, RewardState::Ready);
    }

    #[test]
    fn test_over_redeemed_ledger_clamps_to_zero() {
        // 3 paid but 1 claimed (shouldn't happen, clamp protects the modulo)
        let s = compute_status(3, 1);
        assert_eq!(s.effective_paid_drinks, 0);
        assert_eq!(s.progress, 0);
        assert_eq!(s.drinks_until_reward, 5);
        assert_eq!(s.state, RewardState::Progress);
    }

    #[test]
    fn test_upcoming_is_exactly_one_away() {
        // Only progress == 4 is upcoming in a 5-drink cycle
        for paid in 0..20 {
            let s = compute_status(paid, 0);
            if paid % 5 == 4 {
                assert_eq!(s.state, RewardState::Upcoming, "paid={}", paid);
            } else {
                assert_ne!(s.state, RewardState::Upcoming, "paid={}", paid);
            }
        }
    }

    #[test]
    fn test_progress_monotonic_between_claims() {
        // With a fixed claim count, progress toward the next reward never
        // decreases as paid drinks accumulate (until the cycle completes).
        let mut last_until = CYCLE_LEN;
        for paid in 1..=4 {
            let s = compute_status(paid, 0);
            assert!(s.drinks_until_reward < last_until);
            last_until = s.drinks_until_reward;
        }
    }

    #[test]
    fn test_state_machine_walk() {
        // progress → upcoming → ready → (claim) → progress
        let mut paid = 0;
        let mut redeemed = 0;

        for _ in 0..3 {
            paid += 1;
            assert_eq!(compute_status(paid, redeemed).state, RewardState::Progress);
        }
        paid += 1; // 4th drink
        assert_eq!(compute_status(paid, redeemed).state, RewardState::Upcoming);
        paid += 1; // 5th drink
        assert_eq!(compute_status(paid, redeemed).state, RewardState::Ready);

        redeemed += 1; // claim
        assert_eq!(compute_status(paid, redeemed).state, RewardState::Progress);

        // Cycle repeats
        for _ in 0..4 {
            paid += 1;
        }
        assert_eq!(compute_status(paid, redeemed).state, RewardState::Upcoming);
        paid += 1;
        assert_eq!(compute_status(paid, redeemed).state, RewardState::Ready);
    }

    #[test]
    fn test_status_from_ledger_counts_only_flags() {
        // 7 paid + 1 reward order → effective 7 - 5 = 2
        let orders = make_ledger(7, 1);
        let s = status_from_ledger(&orders);
        assert_eq!(s.paid_drinks, 7);
        assert_eq!(s.effective_paid_drinks, 2);
        assert_eq!(s.state, RewardState::Progress);
    }

    #[test]
    fn test_status_from_empty_ledger() {
        let s = status_from_ledger(&[]);
        assert_eq!(s.paid_drinks, 0);
        assert_eq!(s.drinks_until_reward, 5);
        assert_eq!(s.state, RewardState::Progress);
    }

    #[test]
    fn test_rewards_in_ledger() {
        let orders = make_ledger(12, 2);
        assert_eq!(rewards_in_ledger(&orders), 2);
        assert_eq!(status_from_ledger(&orders).effective_paid_drinks, 2);
    }
}
