//! Encoding benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mdtgen_wire::{DialoutArgs, Telemetry, TelemetryField};

const TS: u64 = 1_700_000_000_000;

fn peer_rows(count: usize) -> Vec<TelemetryField> {
    (0..count)
        .map(|i| {
            TelemetryField::row(
                vec![
                    TelemetryField::leaf("neighbor-address", format!("10.0.{}.{}", i / 256, i % 256), TS),
                    TelemetryField::leaf("remote-as", 65001u32, TS),
                ],
                vec![
                    TelemetryField::leaf("state", "Established", TS),
                    TelemetryField::leaf("state-code", 6u32, TS),
                    TelemetryField::leaf("prefixes-received", 150u32, TS),
                    TelemetryField::leaf("prefixes-sent", 50u32, TS),
                    TelemetryField::leaf("uptime-seconds", 86_400u64, TS),
                    TelemetryField::leaf("flap-count", 2u32, TS),
                ],
                TS,
            )
        })
        .collect()
}

fn bench_telemetry_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("telemetry_encode");

    for size in [1, 16, 256].iter() {
        let msg = Telemetry {
            node_id: "leaf-101".to_string(),
            subscription_id: "bgp_neighbors".to_string(),
            encoding_path: "Cisco-NX-OS-device:System/bgp-items/inst-items/dom-items/Dom-list/peer-items/Peer-list".to_string(),
            collection_start_time: TS,
            msg_timestamp: TS,
            collection_end_time: TS,
            data_gpbkv: peer_rows(*size),
            ..Default::default()
        };

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("rows_{}", size), |b| {
            b.iter(|| black_box(black_box(&msg).encode()));
        });
    }

    group.finish();
}

fn bench_dialout_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("dialout_frame");

    let payload = Telemetry {
        node_id: "leaf-101".to_string(),
        data_gpbkv: peer_rows(16),
        ..Default::default()
    }
    .encode();

    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("encode", |b| {
        b.iter(|| {
            let frame = DialoutArgs::new(black_box(42), payload.clone());
            black_box(frame.encode())
        });
    });

    let encoded = DialoutArgs::new(42, payload.clone()).encode();
    group.bench_function("decode", |b| {
        b.iter(|| black_box(DialoutArgs::decode(black_box(&encoded)).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_telemetry_encode, bench_dialout_frame);
criterion_main!(benches);
