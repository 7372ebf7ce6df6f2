use divan::{black_box, Bencher, Divan};

use hashtrie::{HashTrie, SharedHashTrie};

fn main() {
    let divan = Divan::from_args().sample_count(100);

    divan.main();
}

#[divan::bench(args = [1_000, 10_000, 100_000])]
fn insert_sequential(bencher: Bencher, n: u64) {
    bencher.bench_local(|| {
        let mut set: HashTrie<u64> = HashTrie::new();
        for value in 0..n {
            set.insert(black_box(value));
        }
        set.len()
    });
}

#[divan::bench(args = [1_000, 10_000, 100_000])]
fn find_hit(bencher: Bencher, n: u64) {
    let mut set: HashTrie<u64> = HashTrie::new();
    for value in 0..n {
        set.insert(value);
    }
    bencher.bench_local(|| {
        let mut hits = 0usize;
        for value in 0..n {
            if set.contains(black_box(&value)) {
                hits += 1;
            }
        }
        hits
    });
}

#[divan::bench(args = [1_000, 10_000, 100_000])]
fn find_miss(bencher: Bencher, n: u64) {
    let mut set: HashTrie<u64> = HashTrie::new();
    for value in 0..n {
        set.insert(value);
    }
    bencher.bench_local(|| {
        let mut hits = 0usize;
        for value in n..2 * n {
            if set.contains(black_box(&value)) {
                hits += 1;
            }
        }
        hits
    });
}

#[divan::bench(args = [1_000, 10_000, 100_000])]
fn iterate(bencher: Bencher, n: u64) {
    let mut set: HashTrie<u64> = HashTrie::new();
    for value in 0..n {
        set.insert(value);
    }
    bencher.bench_local(|| set.iter().fold(0u64, |acc, value| acc.wrapping_add(*value)));
}

// Clone is the whole point of the structure: two words and a refcount,
// independent of the set size.
#[divan::bench(args = [1_000, 100_000])]
fn cheap_clone(bencher: Bencher, n: u64) {
    let mut set: HashTrie<u64> = HashTrie::new();
    for value in 0..n {
        set.insert(value);
    }
    bencher.bench_local(|| black_box(set.clone()).len());
}

#[divan::bench(args = [1_000, 10_000])]
fn snapshot_and_commit(bencher: Bencher, n: u64) {
    let shared: SharedHashTrie<u64> = SharedHashTrie::new();
    shared.update_with(|set| {
        for value in 0..n {
            set.insert(value);
        }
    });
    let mut next = n;
    bencher.bench_local(|| {
        shared.update_with(|set| {
            set.insert(black_box(next));
        });
        next += 1;
        shared.len()
    });
}
