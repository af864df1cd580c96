//! Lookup orchestration: detect, query, normalize, track, render.

use std::cell::OnceCell;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{TrackerError, TransportError};
use crate::normalize::Normalizer;
use crate::record::{canonical_device_id, ClientRecord};
use crate::render::{MapRenderer, Placement};
use crate::schema::{self, SchemaVersion};
use crate::service::LocationService;
use crate::survey::{CampusHierarchy, ClientCount};
use crate::watchlist::{MoveOutcome, UpsertOutcome, Watchlist, WatchlistStore};

/// Outcome of one successful `lookup_and_track`.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupReport {
    pub device_id: String,
    pub outcome: UpsertOutcome,
    /// The service had no data and a placeholder was tracked instead.
    pub placeholder: bool,
    /// Annotated map, if rendering worked.
    pub map: Option<PathBuf>,
    pub used_default_map: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarantineOutcome {
    Moved,
    /// Not flagged yet; looked up first, then moved.
    LookedUpAndMoved,
    AlreadyQuarantined,
    /// Still absent after one fresh lookup.
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    Removed(Watchlist),
    NotFound,
}

/// One operator session against a location service.
///
/// Owns both watchlists and the schema picked for the session.
pub struct Tracker {
    service: Box<dyn LocationService>,
    renderer: Box<dyn MapRenderer>,
    store: WatchlistStore,
    schema: OnceCell<SchemaVersion>,
}

impl Tracker {
    pub fn new(service: Box<dyn LocationService>, renderer: Box<dyn MapRenderer>) -> Self {
        Self {
            service,
            renderer,
            store: WatchlistStore::new(),
            schema: OnceCell::new(),
        }
    }

    /// Schema for this session, probing the service on first use.
    pub fn schema(&self) -> SchemaVersion {
        *self.schema.get_or_init(|| schema::detect(self.service.as_ref()))
    }

    /// Schema if already detected.
    pub fn detected_schema(&self) -> Option<SchemaVersion> {
        self.schema.get().copied()
    }

    pub fn store(&self) -> &WatchlistStore {
        &self.store
    }

    /// Query the service for `device_id`, track the result and draw its map.
    ///
    /// Only transport failures (and an unsupported schema) fail the call; the
    /// watchlists are untouched in that case. Rendering problems are logged.
    pub fn lookup_and_track(&mut self, device_id: &str) -> Result<LookupReport, TrackerError> {
        let device_id = canonical_device_id(device_id);
        let schema = self.schema();

        let raw = self
            .service
            .query_by_identifier(schema, &device_id)
            .inspect_err(|e| warn!("Lookup of {} failed: {}", device_id, e))?;

        let record = Normalizer::new(schema)
            .normalize_lookup(&raw, &device_id)
            .into_iter()
            .next()
            .ok_or(TrackerError::UnsupportedSchema(schema))?;

        let placeholder = record.is_placeholder();
        let placement_floor = record.floor_image_ref.clone();
        let (x, y) = (record.position_x, record.position_y);
        let tracked_id = record.device_id.clone();

        let outcome = self.store.upsert(record);

        let placement = Placement {
            device_id: &tracked_id,
            floor_image_ref: &placement_floor,
            x,
            y,
        };
        let (map, used_default_map) = match self.renderer.place(&placement) {
            Ok(rendered) => (Some(rendered.path), rendered.used_default_map),
            Err(e) => {
                warn!("Could not render map for {}: {}", tracked_id, e);
                (None, false)
            }
        };

        info!(
            "Tracked {} ({:?}{})",
            tracked_id,
            outcome,
            if placeholder { ", no service data" } else { "" }
        );

        Ok(LookupReport {
            device_id: tracked_id,
            outcome,
            placeholder,
            map,
            used_default_map,
        })
    }

    /// Move a device to the quarantined list, looking it up first if needed.
    ///
    /// At most one lookup is made per call.
    pub fn quarantine(&mut self, device_id: &str) -> Result<QuarantineOutcome, TrackerError> {
        let device_id = canonical_device_id(device_id);
        match self.store.move_to_quarantine(&device_id) {
            MoveOutcome::Moved => return Ok(QuarantineOutcome::Moved),
            MoveOutcome::AlreadyQuarantined => return Ok(QuarantineOutcome::AlreadyQuarantined),
            MoveOutcome::NotFound => {}
        }

        info!("{} is not flagged, looking it up before quarantine", device_id);
        let report = self.lookup_and_track(&device_id)?;
        if report.device_id != device_id {
            warn!("Lookup of {} returned {}", device_id, report.device_id);
        }

        match self.store.move_to_quarantine(&device_id) {
            MoveOutcome::Moved => Ok(QuarantineOutcome::LookedUpAndMoved),
            MoveOutcome::AlreadyQuarantined => Ok(QuarantineOutcome::AlreadyQuarantined),
            MoveOutcome::NotFound => {
                warn!("{} still not on the flagged list after lookup, not quarantined", device_id);
                Ok(QuarantineOutcome::NotFound)
            }
        }
    }

    pub fn purge(&mut self, device_id: &str) -> PurgeOutcome {
        match self.store.purge(device_id) {
            Some((list, _)) => PurgeOutcome::Removed(list),
            None => PurgeOutcome::NotFound,
        }
    }

    pub fn lookup(&self, device_id: &str) -> Option<(Watchlist, &ClientRecord)> {
        self.store.lookup(device_id)
    }

    /// Every client the service sees right now. Does not touch the watchlists.
    pub fn all_clients(&self) -> Result<Vec<ClientRecord>, TransportError> {
        let schema = self.schema();
        let raw = self.service.query_all(schema)?;
        Ok(Normalizer::new(schema).normalize_batch(&raw))
    }

    pub fn client_count(&self) -> Result<ClientCount, TransportError> {
        let schema = self.schema();
        let raw = self.service.client_count(schema)?;
        ClientCount::from_response(schema, &raw).map_err(|e| TransportError::Decode {
            url: format!("/api/location/{}/clients/count", schema.api_segment()),
            reason: e.to_string(),
        })
    }

    pub fn campus_hierarchy(&self) -> Result<CampusHierarchy, TransportError> {
        let raw = self.service.maps_count()?;
        CampusHierarchy::from_response(&raw).map_err(|e| TransportError::Decode {
            url: "/api/config/v1/maps/count".to_string(),
            reason: e.to_string(),
        })
    }
}
