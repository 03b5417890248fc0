// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for encryption, integrity hashing, and audit logging
// in the strongroom-security crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use strongroom_core::types::{AuditAction, Outcome, UserId};
use strongroom_security::{AuditLog, CipherEngine, MasterKey, digest_hex};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark a full AES-256-GCM encrypt-then-decrypt round trip on a 10 KiB
/// payload, including the per-call nonce draw from the OS RNG.
fn bench_encrypt_decrypt_roundtrip(c: &mut Criterion) {
    let engine = CipherEngine::new(&MasterKey::generate()).expect("build engine");
    let plaintext = vec![0x42u8; 10 * 1024]; // 10 KiB

    c.bench_function("encrypt_decrypt_roundtrip (10 KiB)", |b| {
        b.iter(|| {
            let payload = engine.encrypt(black_box(&plaintext)).expect("encrypt failed");
            let decrypted = engine.decrypt(&payload).expect("decrypt failed");
            assert_eq!(decrypted.len(), plaintext.len());
            black_box(decrypted);
        });
    });
}

/// Benchmark SHA-256 integrity hashing at various document sizes.
///
/// Sizes: 1 KiB, 10 KiB, 100 KiB, 1 MiB -- covering the range from small
/// memos to full scanned documents.
fn bench_integrity_digest(c: &mut Criterion) {
    let sizes: &[(&str, usize)] = &[
        ("1 KiB", 1024),
        ("10 KiB", 10 * 1024),
        ("100 KiB", 100 * 1024),
        ("1 MiB", 1024 * 1024),
    ];

    let mut group = c.benchmark_group("integrity_digest_sha256");
    for &(label, size) in sizes {
        let data = vec![0xABu8; size];
        group.bench_function(label, |b| {
            b.iter(|| {
                let hex = digest_hex(black_box(&data));
                black_box(hex);
            });
        });
    }
    group.finish();
}

/// Benchmark appending an audit record to an in-memory SQLite database.
///
/// Measures steady-state insertion including sequence assignment, not schema
/// creation.
fn bench_audit_append(c: &mut Criterion) {
    c.bench_function("audit_append (in-memory SQLite)", |b| {
        let log = AuditLog::open_in_memory().expect("open in-memory audit log");
        let actor = UserId::new("bench-officer");

        b.iter(|| {
            log.append(
                black_box(&actor),
                black_box(AuditAction::Upload),
                None,
                black_box(Outcome::Success),
                black_box(Some("benchmark entry")),
            )
            .expect("append failed");
        });
    });
}

criterion_group!(
    benches,
    bench_encrypt_decrypt_roundtrip,
    bench_integrity_digest,
    bench_audit_append,
);
criterion_main!(benches);
