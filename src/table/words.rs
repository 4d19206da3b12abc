//! Table id generation (spec §4.6): draw a word from a fixed dictionary
//! uniformly at random, retry on collision up to 100 times, then fall back
//! to appending a random integer suffix.

use rand::seq::IndexedRandom;
use rand::Rng;

const WORDS: &[&str] = &[
    "amber", "birch", "cedar", "delta", "ember", "falcon", "garnet", "harbor", "indigo", "juniper",
    "kestrel", "lagoon", "maple", "nimbus", "opal", "prairie", "quartz", "raven", "saffron", "tundra",
    "umbra", "violet", "willow", "xenon", "yarrow", "zephyr", "basalt", "coral", "dune", "ember",
    "fjord", "grove", "heron", "ivory", "jasper", "knoll", "lumen", "meadow", "nettle", "onyx",
    "pebble", "quail", "ridge", "sable", "thistle", "urchin", "vale", "wren", "yew", "zest",
];

const MAX_COLLISION_RETRIES: u32 = 100;

/// `exists` should report whether a candidate id is already in use.
pub fn generate_table_id(mut exists: impl FnMut(&str) -> bool) -> String {
    let mut rng = rand::rng();
    for _ in 0..MAX_COLLISION_RETRIES {
        let word = WORDS.choose(&mut rng).expect("word list is non-empty");
        if !exists(word) {
            return word.to_string();
        }
    }
    let word = WORDS.choose(&mut rng).expect("word list is non-empty");
    let suffix: u32 = rng.random_range(1000..10_000);
    format!("{word}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_suffix_when_all_words_taken() {
        let id = generate_table_id(|_| true);
        assert!(id.contains('-'));
    }

    #[test]
    fn returns_a_bare_word_when_available() {
        let id = generate_table_id(|_| false);
        assert!(WORDS.contains(&id.as_str()));
    }
}
