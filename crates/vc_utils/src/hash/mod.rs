//! Provide hash containers, re-exports *hashbrown* and *foldhash*.

// -----------------------------------------------------------------------------
// Modules

mod hasher;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{FixedHashState, FixedHasher};
pub use hasher::{NoOpHashState, NoOpHasher};

/// A [`hashbrown::HashMap`] using [`FixedHashState`] by default.
///
/// Iteration order only depends on the inserted keys, which keeps
/// emitted documents stable between runs.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`] by default.
pub type HashSet<T, S = FixedHashState> = hashbrown::HashSet<T, S>;

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{FixedHashState, HashMap, HashSet};

    #[test]
    fn fixed_state_containers_build_without_a_hasher_argument() {
        let mut map: HashMap<&str, u32> = HashMap::default();
        map.insert("x", 1);
        let mut sized: HashMap<&str, u32> = HashMap::with_capacity_and_hasher(4, FixedHashState);
        sized.insert("x", 1);
        assert!(sized.capacity() >= 4);
        assert_eq!(map, sized);

        let mut set: HashSet<&str> = HashSet::default();
        assert!(set.insert("!!Point"));
        assert!(!set.insert("!!Point"));
    }

    #[test]
    fn iteration_order_is_stable_across_instances() {
        let build = || {
            let mut map: HashMap<alloc::string::String, usize> = HashMap::default();
            for i in 0..32 {
                map.insert(alloc::format!("member{i}"), i);
            }
            map.into_iter().collect::<alloc::vec::Vec<_>>()
        };
        assert_eq!(build(), build());
    }
}
