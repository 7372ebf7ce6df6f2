use std::hash::Hash;
use std::marker::PhantomData;

use rand::distr::Distribution;
use rand::Rng;
use rand_distr::Zipf;

use crate::trie_node::rehash;
use crate::HashTrie;

/// Uniform 64-bit values restricted to the bits under `mask`.
///
/// Shrinking the mask concentrates the samples: low masks force duplicate
/// inserts, and masks with gaps between the set bits force hashes that agree
/// chunk after chunk before diverging, which is what drives the deep
/// branch-chain paths.
pub struct MaskedValues {
    pub mask: u64,
}

impl Distribution<u64> for MaskedValues {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.random::<u64>() & self.mask
    }
}

/// Zipf-distributed values over `1..=population`: a few hot values drawn over
/// and over, a long tail drawn rarely.  Exercises the duplicate-insert path
/// far more than uniform sampling does.
pub struct ZipfValues {
    zipf: Zipf<f64>,
}

impl ZipfValues {
    pub fn new(population: u64, exponent: f64) -> Self {
        Self {
            zipf: Zipf::new(population as f64, exponent).expect("valid Zipf parameters"),
        }
    }
}

impl Distribution<u64> for ZipfValues {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        self.zipf.sample(rng) as u64
    }
}

/// Samples a whole trie built from `size` insert attempts drawn from `vd`.
/// The resulting set is smaller than `size` whenever `vd` repeats itself.
pub struct UniformSet<T, D: Distribution<T>> {
    pub size: usize,
    pub vd: D,
    pub ph: PhantomData<T>,
}

impl<T: Hash + Eq + Clone, D: Distribution<T>> Distribution<HashTrie<T>> for UniformSet<T, D> {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> HashTrie<T> {
        let mut set = HashTrie::new();
        for _ in 0..self.size {
            set.insert(self.vd.sample(rng));
        }
        set
    }
}

/// Deterministic well-spread value stream: the i-th value is the mixed
/// counter.  Lets a test replay a workload without carrying an RNG around.
pub fn scrambled(seed: u64) -> impl Iterator<Item = u64> {
    (0u64..).map(move |index| rehash(seed.wrapping_add(index)))
}
