use sealstream::{open_bytes, seal_bytes, seal_bytes_parallel, SymmetricKey};

fn make_data(size: usize) -> Vec<u8> {
    // Semi-realistic data: repeating pattern with some entropy
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench(args = [65536, 1048576, 5242880, 20971520])]
fn seal(bencher: divan::Bencher, size: usize) {
    let key = SymmetricKey::generate();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| seal_bytes(divan::black_box(&data), &key).unwrap());
}

#[divan::bench(args = [65536, 1048576, 5242880, 20971520])]
fn seal_parallel(bencher: divan::Bencher, size: usize) {
    let key = SymmetricKey::generate();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| seal_bytes_parallel(divan::black_box(&data), &key).unwrap());
}

#[divan::bench(args = [65536, 1048576, 5242880, 20971520])]
fn open(bencher: divan::Bencher, size: usize) {
    let key = SymmetricKey::generate();
    let container = seal_bytes(&make_data(size), &key).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| open_bytes(divan::black_box(&container), &key).unwrap());
}

fn main() {
    divan::main();
}
