//! Reloading, transferring, and refreshing zones.

mod common;

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use rstest::rstest;
use tokio::time::sleep;

use authzone::base::{Rcode, Record, Rtype, Serial};
use authzone::zonemaintenance::{TransferError, TransferPeer, ZoneConfig};
use authzone::zonetree::{LookupResult, Query, Zone};

use common::{load_zone, name, record, records, soa, MockTransport};

const ORIGIN: &str = "example.com.";

fn primary(n: u8) -> SocketAddr {
    SocketAddr::from(([192, 0, 2, n], 53))
}

/// Creates a secondary zone with the given primaries.
fn secondary(
    transport: &Arc<MockTransport>,
    primaries: impl IntoIterator<Item = SocketAddr>,
) -> Zone {
    let config = primaries
        .into_iter()
        .fold(ZoneConfig::new(), |config, addr| {
            config.with_transfer_from(addr)
        });
    Zone::new(name(ORIGIN), "example.com.zone")
        .with_config(config)
        .with_transport(transport.clone())
}

/// Adds the SOA with `serial` and a host record to a zone.
fn populate(zone: &mut Zone, serial: u32) {
    zone.insert(soa(ORIGIN, serial)).unwrap();
    zone.insert(record("host.example.com. 300 IN A 192.0.2.10"))
        .unwrap();
}

fn host_records(addr: &str) -> Vec<Record> {
    records(&format!("host.example.com. 300 IN A {addr}\n"))
}

async fn host_result(zone: &Zone) -> LookupResult {
    let query = Query::new(name("host.example.com."), Rtype::A);
    zone.lookup(&query).await.result()
}

/// Waits for a condition, checking every few milliseconds.
async fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..500 {
        if cond() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    cond()
}

//------------ should_transfer -----------------------------------------------

#[rstest]
#[case::wraps_around(4294967295, 1, true)]
#[case::newer(1, 2, true)]
#[case::older(2, 1, false)]
#[case::same(5, 5, false)]
#[case::half_way(0, 2147483648, false)]
#[tokio::test]
async fn should_transfer_compares_serials(
    #[case] local: u32,
    #[case] remote: u32,
    #[case] expected: bool,
) {
    common::init_logging();
    assert_eq!(Serial(local).precedes(Serial(remote)), expected);

    let transport = Arc::new(MockTransport::new());
    transport.set_serial(primary(1), remote);
    let mut zone = secondary(&transport, [primary(1)]);
    populate(&mut zone, local);
    assert_eq!(zone.should_transfer().await.unwrap(), expected);
}

#[tokio::test]
async fn should_transfer_without_soa() {
    let transport = Arc::new(MockTransport::new());
    transport.set_serial(primary(1), 1);
    let zone = secondary(&transport, [primary(1)]);
    assert!(zone.should_transfer().await.unwrap());
}

#[tokio::test]
async fn should_transfer_tries_all_primaries() {
    let transport = Arc::new(MockTransport::new());
    transport.set_serial(primary(2), 10);
    let mut zone = secondary(&transport, [primary(1), primary(2)]);
    populate(&mut zone, 9);
    assert!(zone.should_transfer().await.unwrap());
    assert_eq!(transport.soa_queries(), 2);
}

#[tokio::test]
async fn should_transfer_errors() {
    let transport = Arc::new(MockTransport::new());
    let zone = secondary(&transport, [primary(1)]);
    assert!(matches!(
        zone.should_transfer().await,
        Err(TransferError::Transport { .. })
    ));

    let zone = Zone::new(name(ORIGIN), "example.com.zone")
        .with_config(ZoneConfig::new().with_transfer_from(primary(1)));
    assert!(matches!(
        zone.should_transfer().await,
        Err(TransferError::NoTransport)
    ));
}

//------------ transfer_in ---------------------------------------------------

#[tokio::test]
async fn transfer_in_publishes_zone() {
    common::init_logging();
    let transport = Arc::new(MockTransport::new());
    transport.serve(primary(1), ORIGIN, 2, host_records("192.0.2.20"));
    let zone = secondary(&transport, [primary(1)]);
    zone.set_expired(true);
    assert_eq!(host_result(&zone).await, LookupResult::ServerFailure);

    zone.transfer_in().await.unwrap();
    assert_eq!(zone.soa_serial(), Some(Serial(2)));
    assert!(!zone.is_expired());
    assert_eq!(host_result(&zone).await, LookupResult::Success);
}

#[tokio::test]
async fn failed_transfer_keeps_zone() {
    common::init_logging();
    let transport = Arc::new(MockTransport::new());
    transport.serve(primary(1), ORIGIN, 2, Vec::new());
    transport.break_transfers(primary(1));
    let mut zone = secondary(&transport, [primary(1)]);
    populate(&mut zone, 1);
    let before = zone.snapshot();

    assert!(matches!(
        zone.transfer_in().await,
        Err(TransferError::Transport { .. })
    ));
    assert_eq!(zone.soa_serial(), Some(Serial(1)));
    assert!(Arc::ptr_eq(&before, &zone.snapshot()));
    assert_eq!(host_result(&zone).await, LookupResult::Success);
}

#[tokio::test]
async fn transfer_in_falls_back_to_next_primary() {
    let transport = Arc::new(MockTransport::new());
    transport.serve(primary(1), ORIGIN, 3, Vec::new());
    transport.break_transfers(primary(1));
    transport.serve(primary(2), ORIGIN, 4, host_records("192.0.2.30"));
    let zone = secondary(&transport, [primary(1), primary(2)]);

    zone.transfer_in().await.unwrap();
    assert_eq!(zone.soa_serial(), Some(Serial(4)));
    assert_eq!(transport.axfrs(), 2);
}

#[tokio::test]
async fn transfer_in_rejects_out_of_zone_data() {
    let transport = Arc::new(MockTransport::new());
    transport.serve(
        primary(1),
        ORIGIN,
        2,
        records("host.example.net. 300 IN A 192.0.2.1\n"),
    );
    let zone = secondary(&transport, [primary(1)]);
    assert!(matches!(
        zone.transfer_in().await,
        Err(TransferError::Zone { .. })
    ));
    assert!(zone.soa().is_none());
}

#[tokio::test]
async fn transfer_in_without_primaries() {
    let zone = Zone::new(name(ORIGIN), "example.com.zone");
    zone.transfer_in().await.unwrap();
    assert!(zone.soa().is_none());
}

#[tokio::test]
async fn secondary_mirrors_primary() {
    let primary_zone = load_zone("example.org.");
    let batches: Vec<Vec<Record>> =
        primary_zone.transfer(None).unwrap().collect().await;

    let transport = Arc::new(MockTransport::new());
    transport.serve_batches(primary(1), 2024010101, batches);
    let zone = Zone::new(name("example.org."), "example.org.zone")
        .with_config(ZoneConfig::new().with_transfer_from(primary(1)))
        .with_transport(transport.clone());
    zone.transfer_in().await.unwrap();

    assert_eq!(zone.soa_serial(), primary_zone.soa_serial());
    assert_eq!(zone.all(), primary_zone.all());

    // An up-to-date requester only gets the SOA.
    let batches: Vec<Vec<Record>> =
        zone.transfer(zone.soa_serial()).unwrap().collect().await;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
    assert_eq!(batches[0][0].rtype(), Rtype::SOA);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lookups_see_complete_zones() {
    let transport = Arc::new(MockTransport::new());
    let mut zone = secondary(&transport, [primary(1)]);
    populate(&mut zone, 1);
    let zone = Arc::new(zone);

    let reader = {
        let zone = zone.clone();
        tokio::spawn(async move {
            for _ in 0..1000 {
                assert_eq!(host_result(&zone).await, LookupResult::Success);
                tokio::task::yield_now().await;
            }
        })
    };
    for serial in 2..50 {
        let addr = format!("192.0.2.{serial}");
        transport.serve(primary(1), ORIGIN, serial, host_records(&addr));
        zone.transfer_in().await.unwrap();
    }
    reader.await.unwrap();
}

//------------ update --------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn update_refreshes_zone() {
    common::init_logging();
    let transport = Arc::new(MockTransport::new());
    let mut zone = secondary(&transport, [primary(1)]);
    populate(&mut zone, 1);
    transport.serve(primary(1), ORIGIN, 2, host_records("192.0.2.20"));
    let zone = Arc::new(zone);

    let task = tokio::spawn({
        let zone = zone.clone();
        async move { zone.update().await }
    });

    // Refresh is ten seconds plus up to five seconds of jitter.
    sleep(Duration::from_secs(16)).await;
    assert_eq!(zone.soa_serial(), Some(Serial(2)));
    assert_eq!(transport.axfrs(), 1);

    // Unchanged serials don’t cause transfers.
    sleep(Duration::from_secs(16)).await;
    assert!(transport.soa_queries() >= 2);
    assert_eq!(transport.axfrs(), 1);

    zone.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn update_expires_and_recovers() {
    common::init_logging();
    let transport = Arc::new(MockTransport::new());
    let mut zone = secondary(&transport, [primary(1)]);
    populate(&mut zone, 1);
    transport.serve(primary(1), ORIGIN, 2, Vec::new());
    transport.break_transfers(primary(1));
    let zone = Arc::new(zone);

    let task = tokio::spawn({
        let zone = zone.clone();
        async move { zone.update().await }
    });

    // Refresh fails at ten seconds, the zone expires at thirty.
    sleep(Duration::from_secs(25)).await;
    assert!(!zone.is_expired());
    sleep(Duration::from_secs(10)).await;
    assert!(zone.is_expired());
    assert_eq!(zone.soa_serial(), Some(Serial(1)));

    // The old data is still there for the caller to decide.
    assert_eq!(host_result(&zone).await, LookupResult::Success);

    // A retry picks up the repaired primary.
    transport.fix_transfers(primary(1));
    sleep(Duration::from_secs(12)).await;
    assert!(!zone.is_expired());
    assert_eq!(zone.soa_serial(), Some(Serial(2)));

    zone.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn update_stops_during_refresh() {
    let transport = Arc::new(MockTransport::new());
    let mut zone = secondary(&transport, [primary(1)]);
    populate(&mut zone, 1);
    transport.silence(primary(1));
    let zone = Arc::new(zone);

    let task = tokio::spawn({
        let zone = zone.clone();
        async move { zone.update().await }
    });

    // The refresh check is stuck waiting for the primary.
    sleep(Duration::from_secs(16)).await;
    assert_eq!(transport.soa_queries(), 1);

    zone.shutdown();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn update_waits_for_soa() {
    let transport = Arc::new(MockTransport::new());
    transport.serve(primary(1), ORIGIN, 5, Vec::new());
    let zone = Arc::new(secondary(&transport, [primary(1)]));

    let task = tokio::spawn({
        let zone = zone.clone();
        async move { zone.update().await }
    });
    sleep(Duration::from_secs(30)).await;
    assert_eq!(transport.soa_queries(), 0);

    zone.transfer_in().await.unwrap();
    sleep(Duration::from_secs(20)).await;
    assert!(transport.soa_queries() > 0);

    zone.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn run_secondary_transfers_first() {
    let transport = Arc::new(MockTransport::new());
    transport.serve(primary(1), ORIGIN, 7, host_records("192.0.2.70"));
    let zone = Arc::new(secondary(&transport, [primary(1)]));

    let task = tokio::spawn({
        let zone = zone.clone();
        async move { zone.run_secondary().await }
    });
    sleep(Duration::from_secs(1)).await;
    assert_eq!(zone.soa_serial(), Some(Serial(7)));
    assert_eq!(host_result(&zone).await, LookupResult::Success);

    zone.shutdown();
    task.await.unwrap();
}

//------------ notify --------------------------------------------------------

#[tokio::test]
async fn notify_retries() {
    common::init_logging();
    let transport = Arc::new(MockTransport::new());
    transport.queue_notify_replies([
        Err("timeout".into()),
        Ok(Rcode::SERVFAIL),
    ]);
    let zone = Zone::new(name(ORIGIN), "example.com.zone")
        .with_config(
            ZoneConfig::new()
                .with_transfer_to(TransferPeer::Any)
                .with_transfer_to(TransferPeer::Addr(primary(9))),
        )
        .with_transport(transport.clone());

    zone.notify();
    assert!(wait_for(|| transport.notified().len() == 3).await);
    assert!(transport.notified().iter().all(|addr| *addr == primary(9)));
}

#[tokio::test]
async fn notify_gives_up() {
    let transport = Arc::new(MockTransport::new());
    transport.queue_notify_replies(
        std::iter::repeat(Ok(Rcode::REFUSED)).take(4),
    );
    let zone = Zone::new(name(ORIGIN), "example.com.zone")
        .with_config(
            ZoneConfig::new().with_transfer_to(TransferPeer::Addr(primary(9))),
        )
        .with_transport(transport.clone());

    zone.notify();
    assert!(wait_for(|| transport.notified().len() == 3).await);
    sleep(Duration::from_millis(50)).await;
    assert_eq!(transport.notified().len(), 3);
}

//------------ reload --------------------------------------------------------

fn zone_text(serial: u32, addr: &str) -> String {
    format!(
        "$ORIGIN example.com.\n\
         $TTL 300\n\
         @    SOA ns1 hostmaster {serial} 10 5 30 300\n\
         \x20    NS  ns1\n\
         ns1  A   192.0.2.1\n\
         host A   {addr}\n"
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reload_picks_up_changes() {
    common::init_logging();
    let dir: PathBuf = std::env::temp_dir()
        .join(format!("authzone-reload-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("example.com.zone");
    fs::write(&path, zone_text(1, "192.0.2.10")).unwrap();

    let transport = Arc::new(MockTransport::new());
    let zone = Zone::parse(
        fs::File::open(&path).unwrap(),
        name(ORIGIN),
        &path,
        None,
    )
    .unwrap()
    .with_config(
        ZoneConfig::new()
            .with_reload_interval(Duration::from_millis(50))
            .with_reload_tick(Duration::from_millis(10))
            .with_transfer_to(TransferPeer::Addr(primary(9))),
    )
    .with_transport(transport.clone());
    let zone = Arc::new(zone);

    let task = tokio::spawn({
        let zone = zone.clone();
        async move { zone.reload().await }
    });

    // Same serial, nothing happens.
    sleep(Duration::from_millis(200)).await;
    assert_eq!(zone.soa_serial(), Some(Serial(1)));
    assert!(transport.notified().is_empty());

    // A new serial is published and announced.
    fs::write(&path, zone_text(2, "192.0.2.20")).unwrap();
    assert!(wait_for(|| zone.soa_serial() == Some(Serial(2))).await);
    assert!(wait_for(|| transport.notified() == vec![primary(9)]).await);

    // A broken file keeps the current content.
    fs::write(&path, "@ SOA broken\n").unwrap();
    sleep(Duration::from_millis(200)).await;
    assert_eq!(zone.soa_serial(), Some(Serial(2)));
    assert_eq!(host_result(&zone).await, LookupResult::Success);

    zone.shutdown();
    task.await.unwrap();
    fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn reload_disabled() {
    let zone = Zone::new(name(ORIGIN), "example.com.zone").with_config(
        ZoneConfig::new().with_reload_interval(Duration::ZERO),
    );
    // Returns right away.
    zone.reload().await;
}
