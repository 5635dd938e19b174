//! A single authoritative zone.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{error, warn};

use super::error::ZoneError;
use super::tree::Tree;
use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::record::Record;
use crate::base::serial::Serial;
use crate::rdata::{Soa, ZoneRecordData};
use crate::zonefile::Zonefile;
use crate::zonemaintenance::{Upstream, XfrTransport, ZoneConfig};

//------------ Zone ----------------------------------------------------------

/// A single DNS zone.
///
/// The records of the zone live in a [`ZoneContent`] which is published
/// behind a lock. Lookups take a snapshot of the published content and
/// work on that, so they never see a half-updated zone. Reloading from
/// file and transfers from a primary build a complete new content and then
/// replace the published one. A zone that neither reloads nor has
/// primaries is never replaced and is read without the lock.
///
/// During set-up, records are added via [`insert`][Self::insert] which
/// requires a mutable reference. Once the zone is shared, it is updated
/// only through the maintenance tasks.
pub struct Zone {
    /// The apex of the zone.
    pub(crate) origin: Name,

    /// The published records of the zone.
    content: Published,

    /// Whether a secondary zone has expired.
    expired: AtomicBool,

    /// The maintenance configuration.
    pub(crate) config: ZoneConfig,

    /// The resolver for CNAME targets outside of the zone.
    pub(crate) upstream: Option<Arc<dyn Upstream>>,

    /// The transport for transfers, SOA queries, and NOTIFYs.
    pub(crate) transport: Option<Arc<dyn XfrTransport>>,

    /// The path of the zone file.
    file: ArcSwap<PathBuf>,

    /// The stop signal for the background tasks.
    stop: watch::Sender<bool>,
}

impl Zone {
    /// Creates a new, empty zone.
    pub fn new(origin: Name, file: impl Into<PathBuf>) -> Self {
        let (stop, _) = watch::channel(false);
        Zone {
            origin: origin.to_lowercase(),
            content: Default::default(),
            expired: AtomicBool::new(false),
            config: ZoneConfig::default(),
            upstream: None,
            transport: None,
            file: ArcSwap::from_pointee(file.into()),
            stop,
        }
    }

    /// Sets the maintenance configuration.
    pub fn with_config(mut self, config: ZoneConfig) -> Self {
        let content = self.content.into_inner();
        self.content = if config.is_static() {
            Published::Fixed(content)
        } else {
            Published::Live(RwLock::new(content))
        };
        self.config = config;
        self
    }

    /// Sets the resolver used for CNAME targets outside the zone.
    pub fn with_upstream(mut self, upstream: Arc<dyn Upstream>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    /// Sets the transport used for zone maintenance.
    pub fn with_transport(mut self, transport: Arc<dyn XfrTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Creates a zone from the content of a zone file.
    ///
    /// The name of the file is used for error messages and to resolve
    /// `$INCLUDE` directives relative to the file’s directory.
    ///
    /// If `serial` is given and the zone’s SOA has this serial, returns
    /// [`ZoneError::Unchanged`] without reading the rest of the file.
    pub fn parse(
        source: impl Read,
        origin: Name,
        file: impl Into<PathBuf>,
        serial: Option<Serial>,
    ) -> Result<Self, ZoneError> {
        let file = file.into();
        let mut zone = Zone::new(origin, file.clone());
        let content = ZoneContent::parse(source, &zone.origin, &file, serial)?;
        *zone.content.get_mut() = Arc::new(content);
        Ok(zone)
    }

    /// Returns the apex of the zone.
    pub fn origin(&self) -> &Name {
        &self.origin
    }

    /// Returns the maintenance configuration.
    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Adds a record to the zone.
    pub fn insert(&mut self, record: Record) -> Result<(), ZoneError> {
        Arc::make_mut(self.content.get_mut()).insert(&self.origin, record)
    }

    /// Removes all records of the record’s type at its owner.
    pub fn delete(&mut self, record: &Record) {
        Arc::make_mut(self.content.get_mut()).delete(record)
    }

    /// Returns a snapshot of the currently published content.
    pub fn snapshot(&self) -> Arc<ZoneContent> {
        match &self.content {
            Published::Fixed(content) => content.clone(),
            Published::Live(content) => content.read().clone(),
        }
    }

    /// Replaces the published content.
    pub(crate) fn publish(&self, content: ZoneContent) {
        match &self.content {
            Published::Fixed(_) => {
                error!(
                    "Zone '{}' is neither reloaded nor transferred, \
                     not replacing its content",
                    self.origin
                );
            }
            Published::Live(current) => {
                let content = Arc::new(content);
                *current.write() = content;
            }
        }
    }

    /// Returns whether lookups read the content without locking.
    pub fn is_static(&self) -> bool {
        matches!(self.content, Published::Fixed(_))
    }

    /// Returns the SOA record of the zone if there is one.
    pub fn soa(&self) -> Option<Record> {
        self.snapshot().apex().soa().cloned()
    }

    /// Returns the serial of the zone’s SOA record if there is one.
    pub fn soa_serial(&self) -> Option<Serial> {
        self.snapshot().apex().serial()
    }

    /// Returns all records of the zone.
    ///
    /// The apex records come first, followed by the records of the tree in
    /// canonical order.
    pub fn all(&self) -> Vec<Record> {
        self.snapshot().all().cloned().collect()
    }

    /// Returns the closest existing ancestor of `qname`.
    ///
    /// Falls back to the origin if there is none.
    pub fn closest_encloser(&self, qname: &Name) -> Name {
        self.snapshot().closest_encloser(&self.origin, qname)
    }

    /// Returns the path of the zone file.
    pub fn file(&self) -> Arc<PathBuf> {
        self.file.load_full()
    }

    /// Sets the path of the zone file.
    pub fn set_file(&self, file: impl Into<PathBuf>) {
        self.file.store(Arc::new(file.into()))
    }

    /// Returns whether the zone has expired.
    ///
    /// Only secondary zones that failed to refresh within the SOA expire
    /// time expire. Expired zones should not be used to answer queries.
    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::Relaxed)
    }

    /// Marks the zone as expired or fresh.
    pub fn set_expired(&self, expired: bool) {
        self.expired.store(expired, Ordering::Relaxed)
    }

    /// Returns whether `addr` may transfer the zone.
    pub fn transfer_allowed(&self, addr: std::net::IpAddr) -> bool {
        self.config.transfer_allowed(addr)
    }

    /// Stops the background tasks of the zone.
    pub fn shutdown(&self) {
        self.stop.send_replace(true);
    }

    /// Returns a receiver for the stop signal.
    pub(crate) fn stop_signal(&self) -> watch::Receiver<bool> {
        self.stop.subscribe()
    }
}

//--- Debug

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zone")
            .field("origin", &self.origin)
            .field("file", &self.file())
            .field("expired", &self.is_expired())
            .field("config", &self.config)
            .finish()
    }
}

//------------ Published -----------------------------------------------------

/// The published content of a zone.
enum Published {
    /// Content that only changes during set-up.
    Fixed(Arc<ZoneContent>),

    /// Content replaced by the maintenance tasks.
    Live(RwLock<Arc<ZoneContent>>),
}

impl Published {
    fn get_mut(&mut self) -> &mut Arc<ZoneContent> {
        match self {
            Published::Fixed(content) => content,
            Published::Live(content) => content.get_mut(),
        }
    }

    fn into_inner(self) -> Arc<ZoneContent> {
        match self {
            Published::Fixed(content) => content,
            Published::Live(content) => content.into_inner(),
        }
    }
}

impl Default for Published {
    fn default() -> Self {
        Published::Live(Default::default())
    }
}

//------------ ZoneContent ---------------------------------------------------

/// The records of a zone.
///
/// The apex records are kept separately from all other records which live
/// in the tree.
#[derive(Clone, Debug, Default)]
pub struct ZoneContent {
    tree: Tree,
    apex: Apex,
}

impl ZoneContent {
    /// Creates empty content without an apex.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads zone content from a zone file.
    ///
    /// See [`Zone::parse`] for details. Records outside of the zone are
    /// skipped with a warning.
    pub fn parse(
        mut source: impl Read,
        origin: &Name,
        file: &Path,
        serial: Option<Serial>,
    ) -> Result<Self, ZoneError> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;
        let mut zonefile = Zonefile::new(file.display().to_string(), text);
        zonefile.set_origin(origin.clone());
        if let Some(dir) = file.parent() {
            zonefile.set_include_dir(dir);
        }

        let mut content = ZoneContent::new();
        let mut seen_soa = false;
        for record in zonefile {
            let record = record?;
            if !seen_soa {
                if let Some(soa) = record.data().as_soa() {
                    seen_soa = true;
                    if serial == Some(soa.serial()) {
                        return Err(ZoneError::Unchanged(soa.serial()));
                    }
                }
            }
            match content.insert(origin, record) {
                Err(ZoneError::OutOfZone { owner }) => {
                    warn!(
                        "Skipping record {owner} outside of zone '{origin}' in {}",
                        file.display()
                    );
                }
                res => res?,
            }
        }
        if content.apex.soa.is_none() {
            return Err(ZoneError::MissingSoa {
                origin: origin.clone(),
            });
        }
        Ok(content)
    }

    /// Reads zone content from the file at the given path.
    pub fn load(
        origin: &Name,
        file: &Path,
        serial: Option<Serial>,
    ) -> Result<Self, ZoneError> {
        let source = std::fs::File::open(file).map_err(|err| {
            ZoneError::Io(io::Error::new(
                err.kind(),
                format!("{}: {err}", file.display()),
            ))
        })?;
        Self::parse(source, origin, file, serial)
    }

    /// Returns the tree with all records except the apex.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Returns the apex records.
    pub fn apex(&self) -> &Apex {
        &self.apex
    }

    /// Adds a record to the content of the zone at `origin`.
    ///
    /// Owner and names in the record data are converted to lowercase. The
    /// SOA record, the NS records of the origin, and their signatures go
    /// into the apex, everything else into the tree.
    pub fn insert(
        &mut self,
        origin: &Name,
        record: Record,
    ) -> Result<(), ZoneError> {
        if !record.owner().ends_with(origin) {
            return Err(ZoneError::OutOfZone {
                owner: record.owner().clone(),
            });
        }
        if matches!(record.rtype(), Rtype::NSEC3 | Rtype::NSEC3PARAM) {
            return Err(ZoneError::Unsupported {
                owner: record.owner().clone(),
                rtype: record.rtype(),
            });
        }
        let record = record.to_lowercase();
        let at_origin = record.owner() == origin;
        let slot = match record.data() {
            ZoneRecordData::Soa(_) if at_origin => ApexSlot::Soa,
            ZoneRecordData::Ns(_) if at_origin => ApexSlot::Ns,
            ZoneRecordData::Rrsig(sig) if at_origin => {
                match sig.type_covered() {
                    Rtype::SOA => ApexSlot::SoaSigs,
                    Rtype::NS => ApexSlot::NsSigs,
                    _ => ApexSlot::None,
                }
            }
            _ => ApexSlot::None,
        };
        match slot {
            ApexSlot::Soa => self.apex.soa = Some(record),
            ApexSlot::Ns => push_unique(&mut self.apex.ns, record),
            ApexSlot::SoaSigs => push_unique(&mut self.apex.soa_sigs, record),
            ApexSlot::NsSigs => push_unique(&mut self.apex.ns_sigs, record),
            ApexSlot::None => self.tree.insert(record),
        }
        Ok(())
    }

    /// Removes all records of the record’s type at its owner from the tree.
    pub fn delete(&mut self, record: &Record) {
        self.tree.delete(record)
    }

    /// Returns an iterator over all records, apex first.
    pub fn all(&self) -> impl Iterator<Item = &Record> + '_ {
        self.apex
            .all()
            .chain(self.tree.iter().flat_map(|elem| elem.all()))
    }

    /// Returns the closest existing ancestor of `qname` in the tree.
    ///
    /// Falls back to `origin` if there is none.
    pub fn closest_encloser(&self, origin: &Name, qname: &Name) -> Name {
        let mut name = qname.clone();
        while name.is_below(origin) {
            if self.tree.search(&name).is_some() {
                return name;
            }
            name = match name.parent() {
                Some(parent) => parent,
                None => break,
            };
        }
        origin.clone()
    }
}

fn push_unique(rrs: &mut Vec<Record>, record: Record) {
    if !rrs.iter().any(|item| item.data() == record.data()) {
        rrs.push(record)
    }
}

enum ApexSlot {
    Soa,
    Ns,
    SoaSigs,
    NsSigs,
    None,
}

//------------ Apex ----------------------------------------------------------

/// The records at the apex of a zone.
///
/// These are needed for almost every answer, so they are kept outside of
/// the tree. A secondary zone that hasn’t been transferred yet has an empty
/// apex.
#[derive(Clone, Debug, Default)]
pub struct Apex {
    soa: Option<Record>,
    soa_sigs: Vec<Record>,
    ns: Vec<Record>,
    ns_sigs: Vec<Record>,
}

impl Apex {
    /// Returns the SOA record if there is one.
    pub fn soa(&self) -> Option<&Record> {
        self.soa.as_ref()
    }

    /// Returns the data of the SOA record if there is one.
    pub fn soa_data(&self) -> Option<&Soa> {
        self.soa.as_ref().and_then(|soa| soa.data().as_soa())
    }

    /// Returns the serial of the SOA record if there is one.
    pub fn serial(&self) -> Option<Serial> {
        self.soa_data().map(Soa::serial)
    }

    /// Returns the signatures of the SOA record.
    pub fn soa_sigs(&self) -> &[Record] {
        &self.soa_sigs
    }

    /// Returns the NS records of the origin.
    pub fn ns(&self) -> &[Record] {
        &self.ns
    }

    /// Returns the signatures of the origin’s NS records.
    pub fn ns_sigs(&self) -> &[Record] {
        &self.ns_sigs
    }

    /// Returns the SOA record and, if `dnssec` is true, its signatures.
    pub fn soa_with_sigs(&self, dnssec: bool) -> Vec<Record> {
        let mut res: Vec<_> = self.soa.iter().cloned().collect();
        if dnssec {
            res.extend_from_slice(&self.soa_sigs);
        }
        res
    }

    /// Returns the NS records and, if `dnssec` is true, their signatures.
    pub fn ns_with_sigs(&self, dnssec: bool) -> Vec<Record> {
        let mut res = self.ns.clone();
        if dnssec {
            res.extend_from_slice(&self.ns_sigs);
        }
        res
    }

    /// Returns all apex records.
    pub fn all(&self) -> impl Iterator<Item = &Record> + '_ {
        self.soa
            .iter()
            .chain(self.soa_sigs.iter())
            .chain(self.ns.iter())
            .chain(self.ns_sigs.iter())
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::iana::Class;
    use crate::base::record::Ttl;
    use crate::rdata::{Ns, UnknownRecordData, A};
    use core::time::Duration;

    const ZONE: &str = "\
$TTL 3600
@   IN SOA ns1 hostmaster ( 2024010101 7200 3600 1209600 300 )
    IN NS  ns1
    IN NS  NS2.example.NET.
ns1 IN A   192.0.2.53
WWW IN A   192.0.2.80
";

    fn origin() -> Name {
        "example.org.".parse().unwrap()
    }

    #[test]
    fn parse_classifies_apex() {
        let zone =
            Zone::parse(ZONE.as_bytes(), origin(), "example.org.zone", None)
                .unwrap();
        let content = zone.snapshot();
        assert_eq!(zone.soa_serial(), Some(Serial(2024010101)));
        assert_eq!(content.apex().ns().len(), 2);
        assert_eq!(
            content.apex().ns()[1].data(),
            &ZoneRecordData::Ns(Ns::new("ns2.example.net.".parse().unwrap()))
        );
        assert_eq!(content.tree().len(), 2);
        let www = content
            .tree()
            .search(&"www.example.org.".parse().unwrap())
            .unwrap();
        assert_eq!(www.name().as_slice(), b"\x03www\x07example\x03org\x00");
        assert_eq!(zone.all().len(), 5);
        assert_eq!(zone.all()[0].rtype(), Rtype::SOA);
    }

    #[test]
    fn parse_errors() {
        let err = Zone::parse(
            ZONE.as_bytes(),
            origin(),
            "example.org.zone",
            Some(Serial(2024010101)),
        )
        .unwrap_err();
        assert!(err.is_unchanged());

        let err = Zone::parse(
            "$TTL 60\nwww.example.org. A 192.0.2.1\n".as_bytes(),
            origin(),
            "example.org.zone",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ZoneError::MissingSoa { .. }));

        let err = Zone::parse(
            "$TTL 60\nwww.example.org. A 192.0.2\n".as_bytes(),
            origin(),
            "example.org.zone",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ZoneError::Scan(_)));

        let mut text = String::from(ZONE);
        text.push_str("www.example.com. A 192.0.2.1\n");
        let zone =
            Zone::parse(text.as_bytes(), origin(), "example.org.zone", None)
                .unwrap();
        assert_eq!(zone.snapshot().tree().len(), 2);
    }

    #[test]
    fn insert_and_delete() {
        let mut zone = Zone::new(origin(), "example.org.zone");
        let nsec3 = Record::new(
            "abc.example.org.".parse().unwrap(),
            Class::IN,
            Ttl::HOUR,
            UnknownRecordData::new(Rtype::NSEC3, "1 0 0 - abc A"),
        );
        assert!(matches!(
            zone.insert(nsec3),
            Err(ZoneError::Unsupported { .. })
        ));
        let outside = Record::new(
            "example.com.".parse().unwrap(),
            Class::IN,
            Ttl::HOUR,
            A::from_octets(192, 0, 2, 1),
        );
        assert!(matches!(
            zone.insert(outside),
            Err(ZoneError::OutOfZone { .. })
        ));

        let record = Record::new(
            "Mail.Example.ORG.".parse().unwrap(),
            Class::IN,
            Ttl::HOUR,
            A::from_octets(192, 0, 2, 25),
        );
        let snapshot = zone.snapshot();
        zone.insert(record.clone()).unwrap();
        assert!(snapshot.tree().is_empty());
        assert_eq!(zone.snapshot().tree().len(), 1);
        zone.delete(&record);
        assert!(zone.snapshot().tree().is_empty());
        assert!(zone.soa().is_none());
    }

    #[test]
    fn closest_encloser() {
        let zone =
            Zone::parse(ZONE.as_bytes(), origin(), "example.org.zone", None)
                .unwrap();
        let ce = |name: &str| zone.closest_encloser(&name.parse().unwrap());
        assert_eq!(ce("a.b.www.example.org."), "www.example.org.".parse().unwrap());
        assert_eq!(ce("www.example.org."), "www.example.org.".parse().unwrap());
        assert_eq!(ce("nope.example.org."), origin());
    }

    #[test]
    fn static_zone_is_read_without_lock() {
        let mut zone =
            Zone::parse(ZONE.as_bytes(), origin(), "example.org.zone", None)
                .unwrap();
        assert!(!zone.is_static());

        let config = ZoneConfig::new().with_reload_interval(Duration::ZERO);
        zone = zone.with_config(config.clone());
        assert!(zone.is_static());
        assert_eq!(zone.soa_serial(), Some(Serial(2024010101)));
        assert_eq!(zone.snapshot().tree().len(), 2);

        // Set-up still works, later replacement is refused.
        zone.insert(Record::new(
            "mail.example.org.".parse().unwrap(),
            Class::IN,
            Ttl::HOUR,
            A::from_octets(192, 0, 2, 25),
        ))
        .unwrap();
        assert_eq!(zone.snapshot().tree().len(), 3);
        let before = zone.snapshot();
        zone.publish(ZoneContent::new());
        assert!(Arc::ptr_eq(&before, &zone.snapshot()));

        // Primaries make the zone live again, keeping its content.
        let primary = "192.0.2.1:53".parse().unwrap();
        let zone = zone.with_config(config.with_transfer_from(primary));
        assert!(!zone.is_static());
        assert_eq!(zone.snapshot().tree().len(), 3);
        zone.publish(ZoneContent::new());
        assert!(zone.soa().is_none());
    }

    #[test]
    fn file_and_expired() {
        let zone = Zone::new(origin(), "a.zone");
        assert_eq!(zone.file().as_path(), Path::new("a.zone"));
        zone.set_file("b.zone");
        assert_eq!(zone.file().as_path(), Path::new("b.zone"));
        assert!(!zone.is_expired());
        zone.set_expired(true);
        assert!(zone.is_expired());
    }
}
