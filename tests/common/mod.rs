//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::{self, BoxFuture};
use futures_util::{stream, FutureExt, StreamExt};
use parking_lot::Mutex;

use authzone::base::{Name, Rcode, Record, Rtype, Serial};
use authzone::zonefile::Zonefile;
use authzone::zonemaintenance::{
    Reply, TransportError, Upstream, XfrStream, XfrTransport,
};
use authzone::zonetree::Zone;

//------------ Set-up --------------------------------------------------------

/// Installs a log subscriber controlled via `RUST_LOG`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .without_time()
        .try_init()
        .ok();
}

/// Returns the path of a file in the zone test data directory.
pub fn zone_path(file: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "test-data", "zones", file]
        .iter()
        .collect()
}

/// Loads the zone for `origin` from the test data.
pub fn load_zone(origin: &str) -> Zone {
    let path = zone_path(&format!("{}zone", origin));
    let file = File::open(&path).unwrap();
    Zone::parse(file, name(origin), path, None).unwrap()
}

pub fn name(s: &str) -> Name {
    s.parse().unwrap()
}

/// Parses records from zone file text using absolute names.
pub fn records(text: &str) -> Vec<Record> {
    Zonefile::new("test", text)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// Parses a single record.
pub fn record(text: &str) -> Record {
    let mut res = records(text);
    assert_eq!(res.len(), 1);
    res.remove(0)
}

/// Returns the SOA record for a zone with the given serial.
pub fn soa(origin: &str, serial: u32) -> Record {
    record(&format!(
        "{origin} 3600 IN SOA ns1.{origin} hostmaster.{origin} \
         {serial} 10 5 30 300"
    ))
}

//------------ MockTransport -------------------------------------------------

/// A transport serving canned data per primary.
///
/// Primaries without a serial or without zone data are unreachable.
#[derive(Default)]
pub struct MockTransport {
    serials: Mutex<HashMap<SocketAddr, Serial>>,
    zones: Mutex<HashMap<SocketAddr, Vec<Vec<Record>>>>,
    broken: Mutex<HashSet<SocketAddr>>,
    silent: Mutex<HashSet<SocketAddr>>,
    notify_replies: Mutex<VecDeque<Result<Rcode, String>>>,
    notified: Mutex<Vec<SocketAddr>>,
    soa_queries: AtomicUsize,
    axfrs: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `primary` serve a zone with the given serial.
    ///
    /// The zone consists of the SOA, followed by `records`, followed by
    /// the SOA again, each in its own batch.
    pub fn serve(&self, primary: SocketAddr, origin: &str, serial: u32, records: Vec<Record>) {
        let soa = soa(origin, serial);
        let mut batches = vec![vec![soa.clone()]];
        batches.extend(records.into_iter().map(|record| vec![record]));
        batches.push(vec![soa]);
        self.serve_batches(primary, serial, batches);
    }

    /// Makes `primary` serve the given transfer batches.
    pub fn serve_batches(
        &self,
        primary: SocketAddr,
        serial: u32,
        batches: Vec<Vec<Record>>,
    ) {
        self.serials.lock().insert(primary, Serial(serial));
        self.zones.lock().insert(primary, batches);
    }

    /// Changes the serial reported by a SOA query only.
    pub fn set_serial(&self, primary: SocketAddr, serial: u32) {
        self.serials.lock().insert(primary, Serial(serial));
    }

    /// Makes transfers from `primary` fail after the first batch.
    pub fn break_transfers(&self, primary: SocketAddr) {
        self.broken.lock().insert(primary);
    }

    /// Makes transfers from `primary` work again.
    pub fn fix_transfers(&self, primary: SocketAddr) {
        self.broken.lock().remove(&primary);
    }

    /// Makes SOA queries to `primary` never return.
    pub fn silence(&self, primary: SocketAddr) {
        self.silent.lock().insert(primary);
    }

    /// Queues the replies for the next NOTIFYs.
    ///
    /// Once the queue is empty, NOTIFYs are answered with NOERROR.
    pub fn queue_notify_replies(
        &self,
        replies: impl IntoIterator<Item = Result<Rcode, String>>,
    ) {
        self.notify_replies.lock().extend(replies)
    }

    pub fn notified(&self) -> Vec<SocketAddr> {
        self.notified.lock().clone()
    }

    pub fn soa_queries(&self) -> usize {
        self.soa_queries.load(Ordering::SeqCst)
    }

    pub fn axfrs(&self) -> usize {
        self.axfrs.load(Ordering::SeqCst)
    }
}

impl XfrTransport for MockTransport {
    fn query_soa(
        &self,
        primary: SocketAddr,
        apex: Name,
    ) -> BoxFuture<'_, Result<Reply, TransportError>> {
        self.soa_queries.fetch_add(1, Ordering::SeqCst);
        if self.silent.lock().contains(&primary) {
            return future::pending().boxed();
        }
        let res = match self.serials.lock().get(&primary) {
            Some(serial) => Ok(Reply::new(
                Rcode::NOERROR,
                vec![soa(&apex.to_string(), serial.into_int())],
            )),
            None => Err(TransportError::new(format!(
                "{primary} unreachable"
            ))),
        };
        async move { res }.boxed()
    }

    fn axfr(
        &self,
        primary: SocketAddr,
        _apex: Name,
    ) -> BoxFuture<'_, Result<XfrStream, TransportError>> {
        self.axfrs.fetch_add(1, Ordering::SeqCst);
        let batches = self.zones.lock().get(&primary).cloned();
        let broken = self.broken.lock().contains(&primary);
        let res = match batches {
            Some(mut batches) => {
                let mut items: Vec<Result<Vec<Record>, TransportError>> =
                    Vec::new();
                if broken {
                    batches.truncate(1);
                    items.extend(batches.into_iter().map(Ok));
                    items.push(Err(TransportError::new("connection reset")));
                } else {
                    items.extend(batches.into_iter().map(Ok));
                }
                Ok(stream::iter(items).boxed())
            }
            None => {
                Err(TransportError::new(format!("{primary} refused AXFR")))
            }
        };
        async move { res }.boxed()
    }

    fn notify(
        &self,
        target: SocketAddr,
        _apex: Name,
    ) -> BoxFuture<'_, Result<Rcode, TransportError>> {
        self.notified.lock().push(target);
        let res = match self.notify_replies.lock().pop_front() {
            Some(Ok(rcode)) => Ok(rcode),
            Some(Err(msg)) => Err(TransportError::new(msg)),
            None => Ok(Rcode::NOERROR),
        };
        async move { res }.boxed()
    }
}

//------------ MockUpstream --------------------------------------------------

type Answerer =
    dyn Fn(&Name, Rtype) -> Result<Reply, TransportError> + Send + Sync;

/// An upstream resolver answering through a closure.
pub struct MockUpstream {
    answer: Box<Answerer>,
    queries: Mutex<Vec<(Name, Rtype)>>,
}

impl MockUpstream {
    pub fn new(
        answer: impl Fn(&Name, Rtype) -> Result<Reply, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        MockUpstream {
            answer: Box::new(answer),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(Name, Rtype)> {
        self.queries.lock().clone()
    }
}

impl Upstream for MockUpstream {
    fn lookup(
        &self,
        name: Name,
        rtype: Rtype,
    ) -> BoxFuture<'_, Result<Reply, TransportError>> {
        let res = (self.answer)(&name, rtype);
        self.queries.lock().push((name, rtype));
        async move { res }.boxed()
    }
}
