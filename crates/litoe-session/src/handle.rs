//! Random player handles.

use litoe_protocol::Handle;
use rand::Rng;
use rand::seq::IndexedRandom;

const ADJECTIVES: &[&str] = &[
    "brave", "calm", "eager", "fuzzy", "gentle", "happy", "jolly", "keen", "lucky", "mighty",
    "nimble", "proud", "quick", "quiet", "rapid", "silly", "sly", "swift", "tidy", "witty",
];

const ANIMALS: &[&str] = &[
    "badger", "beaver", "crane", "dingo", "eagle", "ferret", "gecko", "heron", "ibex", "koala",
    "lemur", "lynx", "moose", "otter", "panda", "puffin", "quokka", "raven", "tapir", "walrus",
];

/// Generates a handle of the form `adjective-animal-NN`, e.g. `swift-otter-07`.
///
/// Handles are not guaranteed unique. Call this once per process and keep
/// the result for the lifetime of the client.
pub fn random_handle() -> Handle {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("anonymous");
    let animal = ANIMALS.choose(&mut rng).copied().unwrap_or("player");
    let n: u8 = rng.random_range(0..100);
    Handle::new(format!("{adjective}-{animal}-{n:02}"))
}
