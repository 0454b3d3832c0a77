use criterion::{black_box, criterion_group, criterion_main, Criterion};

use known_headers::gen::{plan_for, request_plan};
use known_headers::registry::Direction;
use known_headers::{RequestHeaders, ValueEncoding};

fn bench_matcher_lookup(c: &mut Criterion) {
    let plan = request_plan();

    c.bench_function("find/primary-exact-case", |b| {
        b.iter(|| plan.find(black_box(b"Host")))
    });

    c.bench_function("find/folded-case", |b| {
        b.iter(|| plan.find(black_box(b"aCCePt-eNCodINg")))
    });

    c.bench_function("find/longest-bucket", |b| {
        b.iter(|| plan.find(black_box(b"access-control-request-headers")))
    });

    c.bench_function("find/miss-same-length", |b| {
        // same length as Accept-Encoding, fails on the lead compare
        b.iter(|| plan.find(black_box(b"X-Custom-Header")))
    });

    c.bench_function("find/response-family", |b| {
        let response = plan_for(Direction::Response);
        b.iter(|| response.find(black_box(b"content-language")))
    });
}

fn bench_request_append(c: &mut Criterion) {
    c.bench_function("try_append/known-with-reuse", |b| {
        let mut request = RequestHeaders::new();
        request.try_append(b"User-Agent", b"curl/8.5.0", ValueEncoding::Ascii).unwrap();
        b.iter(|| {
            request.reset_for_reuse();
            request
                .try_append(black_box(b"User-Agent"), black_box(b"curl/8.5.0"), ValueEncoding::Ascii)
                .unwrap();
        })
    });

    c.bench_function("try_hpack_append/static-index", |b| {
        let mut request = RequestHeaders::new();
        b.iter(|| {
            request.reset_for_reuse();
            request
                .try_hpack_append(black_box(38), black_box(b"example.com"), ValueEncoding::Ascii)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_matcher_lookup, bench_request_append);
criterion_main!(benches);
