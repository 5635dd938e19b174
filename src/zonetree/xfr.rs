//! Providing the zone’s data for outgoing zone transfers.

use tokio_stream::Stream;
use tracing::debug;

use super::zone::Zone;
use crate::base::record::Record;
use crate::base::serial::Serial;
use crate::zonemaintenance::TransferError;

impl Zone {
    /// Returns the zone’s records for a zone transfer.
    ///
    /// The records are produced in batches. The first batch holds the SOA
    /// and NS records of the apex with their signatures, followed by one
    /// batch per owner name in canonical order and a final batch with the
    /// SOA record only.
    ///
    /// If `serial` is the serial of the zone’s SOA, the requester is up to
    /// date and the only batch is the SOA record. This is the response to
    /// an IXFR for the current version.
    pub fn transfer(
        &self,
        serial: Option<Serial>,
    ) -> Result<impl Stream<Item = Vec<Record>> + Send + 'static, TransferError>
    {
        let content = self.snapshot();
        let apex = content.apex();
        let soa = apex.soa().cloned().ok_or(TransferError::NoSoa)?;

        if serial.is_some() && serial == apex.serial() {
            debug!("Zone '{}': transfer requester is up to date", self.origin);
            return Ok(tokio_stream::iter(vec![vec![soa]]));
        }

        let mut batches = Vec::with_capacity(content.tree().len() + 2);
        batches.push(apex.all().cloned().collect());
        batches.extend(
            content
                .tree()
                .iter()
                .map(|elem| elem.all().cloned().collect::<Vec<_>>()),
        );
        batches.push(vec![soa]);
        Ok(tokio_stream::iter(batches))
    }
}

//============ Testing =======================================================
