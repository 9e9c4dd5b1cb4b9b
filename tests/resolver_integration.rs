//! End-to-end tests that exercise the Query Handler against a real UDP
//! socket playing the role of upstream, rather than stubbing the transport
//! layer — the fan-out dispatcher holds concrete transports (no trait
//! object), so the most faithful test double is an actual listener.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dnscached::cache::{Cache, Policy};
use dnscached::dns::{DnsClass, DnsMessage, DnsQuestion, DnsRecord, DnsType, Rcode};
use dnscached::resolver::Resolver;
use dnscached::transport::{Dispatcher, Transport, UdpUpstream};
use tokio::net::UdpSocket;

async fn fake_upstream(answer_ip: Ipv4Addr, ttl: u32, rcode: Rcode) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut buf = vec![0u8; 512];
        loop {
            let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                return;
            };
            let Ok(request) = DnsMessage::parse(&buf[..len]) else {
                continue;
            };

            let mut reply = DnsMessage::new_query(request.header.id, request.questions.clone());
            reply.header.qr = true;
            reply.header.rcode = rcode.into();
            if rcode.is_success() {
                let name = request.questions[0].name.clone();
                reply
                    .answers
                    .push(DnsRecord::new_a(name, answer_ip, ttl));
                reply.header.ancount = 1;
            }

            let wire = reply.to_wire().unwrap();
            let _ = socket.send_to(&wire, from).await;
        }
    });

    addr
}

/// Like `fake_upstream`, but delays each reply and counts queries received,
/// so tests can assert how many times the upstream was actually hit.
async fn slow_counting_upstream(
    answer_ip: Ipv4Addr,
    ttl: u32,
    delay: Duration,
) -> (SocketAddr, Arc<AtomicUsize>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let queries = Arc::new(AtomicUsize::new(0));
    let counter = queries.clone();

    tokio::spawn(async move {
        let mut buf = vec![0u8; 512];
        loop {
            let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                return;
            };
            let Ok(request) = DnsMessage::parse(&buf[..len]) else {
                continue;
            };
            counter.fetch_add(1, Ordering::SeqCst);

            tokio::time::sleep(delay).await;

            let mut reply = DnsMessage::new_query(request.header.id, request.questions.clone());
            reply.header.qr = true;
            reply.header.rcode = Rcode::NoError.into();
            let name = request.questions[0].name.clone();
            reply.answers.push(DnsRecord::new_a(name, answer_ip, ttl));
            reply.header.ancount = 1;

            let wire = reply.to_wire().unwrap();
            let _ = socket.send_to(&wire, from).await;
        }
    });

    (addr, queries)
}

fn query(name: &str) -> DnsMessage {
    DnsMessage::new_query(
        99,
        vec![DnsQuestion {
            name: name.to_string(),
            qtype: DnsType::A,
            qclass: DnsClass::In,
        }],
    )
}

#[tokio::test]
async fn cold_miss_then_warm_hit_skips_upstream() {
    let upstream_addr = fake_upstream(Ipv4Addr::new(5, 6, 7, 8), 300, Rcode::NoError).await;
    let dispatcher = Arc::new(Dispatcher::new(vec![Transport::Udp(UdpUpstream::new(
        upstream_addr,
    ))]));
    let cache = Arc::new(Cache::new(10, 0, 60, Policy::Default));
    let resolver = Resolver::new(cache.clone(), dispatcher);

    let first = resolver.handle(&query("example.test.")).await.unwrap();
    assert_eq!(first.rcode(), Rcode::NoError);
    assert_eq!(first.answers.len(), 1);
    assert_eq!(cache.len(), 1);

    // Kill the fake upstream's ability to answer by pointing the cache entry
    // check at a second call: a hit must not need the upstream at all.
    let second = resolver.handle(&query("example.test.")).await.unwrap();
    assert_eq!(second.answers.len(), 1);
    assert_eq!(cache.get_entry("example.test.A.").unwrap().hits, 1);
}

#[tokio::test]
async fn nxdomain_from_upstream_is_relayed_and_not_cached() {
    let upstream_addr = fake_upstream(Ipv4Addr::new(0, 0, 0, 0), 300, Rcode::NameError).await;
    let dispatcher = Arc::new(Dispatcher::new(vec![Transport::Udp(UdpUpstream::new(
        upstream_addr,
    ))]));
    let cache = Arc::new(Cache::new(10, 0, 60, Policy::Default));
    let resolver = Resolver::new(cache.clone(), dispatcher);

    let reply = resolver.handle(&query("nowhere.test.")).await.unwrap();
    assert_eq!(reply.rcode(), Rcode::NameError);
    assert!(reply.answers.is_empty());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn first_upstream_failure_falls_back_to_second() {
    // Port 1 on loopback refuses connections immediately.
    let dead: SocketAddr = "127.0.0.1:1".parse().unwrap();
    let alive = fake_upstream(Ipv4Addr::new(9, 9, 9, 9), 120, Rcode::NoError).await;

    let dispatcher = Arc::new(Dispatcher::new(vec![
        Transport::Udp(UdpUpstream::new(dead)),
        Transport::Udp(UdpUpstream::new(alive)),
    ]));
    let cache = Arc::new(Cache::new(10, 0, 60, Policy::Default));
    let resolver = Resolver::new(cache.clone(), dispatcher);

    let reply = resolver.handle(&query("failover.test.")).await.unwrap();
    assert_eq!(reply.rcode(), Rcode::NoError);
    assert_eq!(reply.answers.len(), 1);
}

#[tokio::test]
async fn multi_question_request_is_passed_through_untouched_by_cache() {
    let upstream_addr = fake_upstream(Ipv4Addr::new(1, 1, 1, 1), 60, Rcode::NoError).await;
    let dispatcher = Arc::new(Dispatcher::new(vec![Transport::Udp(UdpUpstream::new(
        upstream_addr,
    ))]));
    let cache = Arc::new(Cache::new(10, 0, 60, Policy::Default));
    let resolver = Resolver::new(cache.clone(), dispatcher);

    let mut request = query("a.test.");
    request.questions.push(DnsQuestion {
        name: "b.test.".to_string(),
        qtype: DnsType::A,
        qclass: DnsClass::In,
    });
    request.header.qdcount = 2;

    // The fake upstream only ever answers the first question, but the point
    // here is that the cache stays empty for a pass-through query.
    let _ = resolver.handle(&request).await;
    assert!(cache.is_empty());
}

#[tokio::test]
async fn concurrent_misses_on_same_key_coalesce_into_one_upstream_query() {
    let (upstream_addr, queries) =
        slow_counting_upstream(Ipv4Addr::new(2, 2, 2, 2), 300, Duration::from_millis(100)).await;
    let dispatcher = Arc::new(Dispatcher::new(vec![Transport::Udp(UdpUpstream::new(
        upstream_addr,
    ))]));
    let cache = Arc::new(Cache::new(10, 0, 60, Policy::Default));
    let resolver = Arc::new(Resolver::new(cache.clone(), dispatcher));

    let r1 = resolver.clone();
    let r2 = resolver.clone();
    let (first, second) = tokio::join!(
        tokio::spawn(async move { r1.handle(&query("shared.test.")).await.unwrap() }),
        tokio::spawn(async move { r2.handle(&query("shared.test.")).await.unwrap() }),
    );
    let first = first.unwrap();
    let second = second.unwrap();

    assert_eq!(first.rcode(), Rcode::NoError);
    assert_eq!(second.rcode(), Rcode::NoError);
    assert_eq!(first.answers.len(), 1);
    assert_eq!(second.answers.len(), 1);
    assert_eq!(queries.load(Ordering::SeqCst), 1);
}
