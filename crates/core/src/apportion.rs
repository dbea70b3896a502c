//! Largest-remainder apportionment.
//!
//! Distributes an integer number of seats over weighted items so the seats sum
//! to the requested total exactly. Each item first gets the floor of its
//! proportional share; the seats left over go, one each, to the items with the
//! largest fractional remainders (ties go to the lower index).
//!
//! Shares are computed with integer arithmetic: item `i` has the exact share
//! `total * w[i] / sum(w)`, so its floor and remainder are a plain division
//! and modulus over the same denominator. No floating point rounding can
//! reorder two remainders.

/// Allocate `total` seats proportionally to `weights`.
///
/// Returns one entry per weight. The entries sum to `total`, or to `0` when
/// every weight is zero. The allocator knows nothing about capacity; callers
/// must cap seats at whatever each item can actually supply.
#[must_use]
pub fn allocate(total: usize, weights: &[usize]) -> Vec<usize> {
    let weight_sum: u128 = weights.iter().map(|w| *w as u128).sum();
    if weight_sum == 0 {
        return vec![0; weights.len()];
    }

    let total_wide = total as u128;
    let mut seats = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    for (index, weight) in weights.iter().enumerate() {
        let scaled = total_wide * (*weight as u128);
        seats.push(usize::try_from(scaled / weight_sum).unwrap_or(usize::MAX));
        remainders.push((index, scaled % weight_sum));
    }

    let assigned: usize = seats.iter().sum();
    let shortfall = total.saturating_sub(assigned);

    // `sort_by` is stable, so equal remainders keep ascending index order.
    remainders.sort_by(|a, b| b.1.cmp(&a.1));
    for (index, _) in remainders.into_iter().take(shortfall) {
        seats[index] += 1;
    }

    seats
}
