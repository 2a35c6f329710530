use criterion::criterion_main;


criterion_main!(
    decode_packets::benches,
);
