use std::collections::HashMap;
use std::hash::Hash;

/// Competition ranks ("1224" ranking), largest value first.
///
/// Tied values share the smallest rank of their run and the next distinct
/// value skips ahead by the size of the tie.
pub fn competition_rank_desc(values: &[i32]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    // stable: ties keep input order, which doesn't affect the ranks
    order.sort_by(|&a, &b| values[b].cmp(&values[a]));

    let mut ranks = vec![0u32; values.len()];
    let mut rank = 0u32;
    for (position, &index) in order.iter().enumerate() {
        if position == 0 || values[index] != values[order[position - 1]] {
            rank = position as u32 + 1;
        }
        ranks[index] = rank;
    }
    ranks
}

/// Row indices per group key, each list in input order.
pub fn group_indices<K, I>(keys: I) -> HashMap<K, Vec<usize>>
where
    K: Eq + Hash,
    I: IntoIterator<Item = K>,
{
    let mut groups: HashMap<K, Vec<usize>> = HashMap::new();
    for (index, key) in keys.into_iter().enumerate() {
        groups.entry(key).or_default().push(index);
    }
    groups
}

/// Ranks `values` independently within each group of equal `keys`.
pub fn competition_rank_desc_by<K>(values: &[i32], keys: &[K]) -> Vec<u32>
where
    K: Eq + Hash,
{
    debug_assert_eq!(values.len(), keys.len());
    let mut ranks = vec![0u32; values.len()];
    for indices in group_indices(keys.iter()).into_values() {
        let group_values: Vec<i32> = indices.iter().map(|&i| values[i]).collect();
        for (&index, rank) in indices.iter().zip(competition_rank_desc(&group_values)) {
            ranks[index] = rank;
        }
    }
    ranks
}

/// Size of the group each row belongs to.
pub fn group_sizes<K>(keys: &[K]) -> Vec<u32>
where
    K: Eq + Hash,
{
    let mut sizes = vec![0u32; keys.len()];
    for indices in group_indices(keys.iter()).into_values() {
        let size = indices.len() as u32;
        for index in indices {
            sizes[index] = size;
        }
    }
    sizes
}
