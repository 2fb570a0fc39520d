use bytes::{Bytes, BytesMut};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use http::Request;
use tokio_util::codec::Decoder;
use webecho::http::{HttpCodec, format_echo_body};
use webecho::create_server;

fn request_with_headers(count: usize) -> Request<Bytes> {
    let mut builder = Request::builder().uri("/bench?query=1");
    // Reverse order so the formatter always has sorting to do
    for i in (0..count).rev() {
        builder = builder.header(format!("x-header-{i:04}"), format!("value-{i}"));
    }
    builder.body(Bytes::new()).unwrap()
}

fn bench_echo_body(c: &mut Criterion) {
    let mut group = c.benchmark_group("echo_body");

    // Test different header counts
    for count in [0, 8, 32, 64] {
        let req = request_with_headers(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("format", count), &req, |b, req| {
            b.iter(|| format_echo_body(black_box(req)));
        });
    }

    group.finish();
}

fn bench_router_dispatch(c: &mut Criterion) {
    let server = create_server("127.0.0.1:0", "bench");
    let router = server.router();

    let mut group = c.benchmark_group("router_dispatch");

    for path in ["/", "/version", "/deep/nested/path"] {
        let req = Request::builder().uri(path).body(Bytes::new()).unwrap();
        group.bench_with_input(BenchmarkId::new("dispatch", path), &req, |b, req| {
            b.iter(|| router.dispatch(black_box(req)));
        });
    }

    group.finish();
}

fn bench_codec_decode(c: &mut Criterion) {
    let raw = "GET /bench HTTP/1.1\r\nHost: localhost\r\nUser-Agent: bench\r\nAccept: */*\r\n\r\n";

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Bytes(raw.len() as u64));
    group.bench_function("decode_request", |b| {
        let mut codec = HttpCodec::new(1024 * 1024);
        b.iter(|| {
            let mut buf = BytesMut::from(black_box(raw));
            codec.decode(&mut buf).unwrap()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_echo_body,
    bench_router_dispatch,
    bench_codec_decode
);
criterion_main!(benches);
