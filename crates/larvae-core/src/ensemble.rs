//! The particle ensemble: one row per larva, stored as parallel columns.
//!
//! Rows are never removed. A deactivated particle keeps its row (and its
//! final recorded state) with [`Status::Inactive`], and every propagator
//! skips it from then on.

use crate::column::Column;
use crate::id::ParticleId;
use crate::outcome::{Deactivation, Outcome, Status};
use crate::stage::DevStage;

/// Initial state for one seeded particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSeed {
    /// Longitude in degrees east.
    pub lon: f64,
    /// Latitude in degrees north.
    pub lat: f64,
    /// Depth in metres, negative below the surface.
    pub z: f64,
    /// Starting development level. Zero for freshly spawned larvae;
    /// reverse-time runs start from an older larva.
    pub dev_level: f64,
}

impl ParticleSeed {
    /// A freshly spawned larva (level 0) at the given position.
    pub fn spawned(lon: f64, lat: f64, z: f64) -> Self {
        Self {
            lon,
            lat,
            z,
            dev_level: 0.0,
        }
    }
}

/// A copy of one row, for inspection and output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Stable identity.
    pub id: ParticleId,
    /// Longitude in degrees east.
    pub lon: f64,
    /// Latitude in degrees north.
    pub lat: f64,
    /// Depth in metres, negative below the surface.
    pub z: f64,
    /// Development level.
    pub dev_level: f64,
    /// Development stage.
    pub dev_stage: DevStage,
    /// Vertical swim velocity in m/s, positive upward.
    pub terminal_velocity: f64,
    /// Latched settlement eligibility.
    pub settlement_eligible: bool,
    /// Active, or the outcome that removed it.
    pub status: Status,
}

/// Structure-of-arrays storage for the whole larva ensemble.
///
/// The environment columns (`temperature`, `seafloor_depth`) hold `NaN`
/// until the engine samples them for the first time.
#[derive(Clone, Debug, Default)]
pub struct Ensemble {
    ids: Vec<ParticleId>,
    lon: Vec<f64>,
    lat: Vec<f64>,
    z: Vec<f64>,
    prev_lon: Vec<f64>,
    prev_lat: Vec<f64>,
    dev_level: Vec<f64>,
    dev_stage: Vec<DevStage>,
    terminal_velocity: Vec<f64>,
    settlement_eligible: Vec<bool>,
    status: Vec<Status>,
    temperature: Vec<f64>,
    seafloor_depth: Vec<f64>,
    next_id: u64,
}

impl Ensemble {
    /// Create an empty ensemble.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one particle and return its identity.
    pub fn seed(&mut self, seed: ParticleSeed) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        self.ids.push(id);
        self.lon.push(seed.lon);
        self.lat.push(seed.lat);
        self.z.push(seed.z);
        self.prev_lon.push(seed.lon);
        self.prev_lat.push(seed.lat);
        self.dev_level.push(seed.dev_level);
        self.dev_stage.push(DevStage::from_level(seed.dev_level));
        self.terminal_velocity.push(0.0);
        self.settlement_eligible.push(false);
        self.status.push(Status::Active);
        self.temperature.push(f64::NAN);
        self.seafloor_depth.push(f64::NAN);
        id
    }

    /// Seed many particles, returning their identities in order.
    pub fn seed_all<I>(&mut self, seeds: I) -> Vec<ParticleId>
    where
        I: IntoIterator<Item = ParticleSeed>,
    {
        seeds.into_iter().map(|s| self.seed(s)).collect()
    }

    /// Total number of rows (active and inactive).
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no particle has ever been seeded.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of particles still being updated.
    pub fn active_count(&self) -> usize {
        self.status.iter().filter(|s| s.is_active()).count()
    }

    /// Row index of a particle.
    pub fn index_of(&self, id: ParticleId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    /// Copy of row `index`.
    pub fn particle(&self, index: usize) -> Option<Particle> {
        if index >= self.len() {
            return None;
        }
        Some(Particle {
            id: self.ids[index],
            lon: self.lon[index],
            lat: self.lat[index],
            z: self.z[index],
            dev_level: self.dev_level[index],
            dev_stage: self.dev_stage[index],
            terminal_velocity: self.terminal_velocity[index],
            settlement_eligible: self.settlement_eligible[index],
            status: self.status[index],
        })
    }

    /// Iterate over copies of every row.
    pub fn particles(&self) -> impl Iterator<Item = Particle> + '_ {
        (0..self.len()).filter_map(|i| self.particle(i))
    }

    /// Read a floating-point column. Returns `None` for the non-numeric
    /// columns ([`Column::DevStage`], [`Column::SettlementEligible`],
    /// [`Column::Status`]).
    pub fn read(&self, column: Column) -> Option<&[f64]> {
        match column {
            Column::Lon => Some(&self.lon),
            Column::Lat => Some(&self.lat),
            Column::Z => Some(&self.z),
            Column::PrevLon => Some(&self.prev_lon),
            Column::PrevLat => Some(&self.prev_lat),
            Column::DevLevel => Some(&self.dev_level),
            Column::TerminalVelocity => Some(&self.terminal_velocity),
            Column::Temperature => Some(&self.temperature),
            Column::SeafloorDepth => Some(&self.seafloor_depth),
            Column::DevStage | Column::SettlementEligible | Column::Status => None,
        }
    }

    /// Particle identities, in row order.
    pub fn ids(&self) -> &[ParticleId] {
        &self.ids
    }

    /// Development stages, in row order.
    pub fn dev_stage(&self) -> &[DevStage] {
        &self.dev_stage
    }

    /// Settlement eligibility flags, in row order.
    pub fn settlement_eligible(&self) -> &[bool] {
        &self.settlement_eligible
    }

    /// Status of every row.
    pub fn status(&self) -> &[Status] {
        &self.status
    }

    /// Split-borrow mutable access to every column.
    ///
    /// Deactivations performed through the returned view are appended to
    /// `deactivations`.
    pub fn columns_mut<'a>(
        &'a mut self,
        deactivations: &'a mut Vec<Deactivation>,
    ) -> ColumnsMut<'a> {
        ColumnsMut {
            ids: &self.ids,
            lon: &mut self.lon,
            lat: &mut self.lat,
            z: &mut self.z,
            prev_lon: &mut self.prev_lon,
            prev_lat: &mut self.prev_lat,
            dev_level: &mut self.dev_level,
            dev_stage: &mut self.dev_stage,
            terminal_velocity: &mut self.terminal_velocity,
            settlement_eligible: &mut self.settlement_eligible,
            temperature: &mut self.temperature,
            seafloor_depth: &mut self.seafloor_depth,
            status: &mut self.status,
            deactivations,
        }
    }
}

/// Mutable view over every ensemble column, handed to propagators.
///
/// Columns are public so a propagator can borrow several at once. Status
/// is private: the only transition is [`deactivate`](Self::deactivate),
/// which refuses to touch a particle twice.
pub struct ColumnsMut<'a> {
    /// Particle identities (read-only).
    pub ids: &'a [ParticleId],
    /// Longitude in degrees east.
    pub lon: &'a mut [f64],
    /// Latitude in degrees north.
    pub lat: &'a mut [f64],
    /// Depth in metres, negative below the surface.
    pub z: &'a mut [f64],
    /// Longitude at the start of the step.
    pub prev_lon: &'a mut [f64],
    /// Latitude at the start of the step.
    pub prev_lat: &'a mut [f64],
    /// Development level.
    pub dev_level: &'a mut [f64],
    /// Development stage.
    pub dev_stage: &'a mut [DevStage],
    /// Vertical swim velocity in m/s, positive upward.
    pub terminal_velocity: &'a mut [f64],
    /// Latched settlement eligibility.
    pub settlement_eligible: &'a mut [bool],
    /// Ambient temperature in degrees Celsius.
    pub temperature: &'a mut [f64],
    /// Local seafloor depth in metres below sea level.
    pub seafloor_depth: &'a mut [f64],
    status: &'a mut [Status],
    deactivations: &'a mut Vec<Deactivation>,
}

impl ColumnsMut<'_> {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the view has no rows.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether row `i` is still active.
    pub fn is_active(&self, i: usize) -> bool {
        self.status[i].is_active()
    }

    /// Status of row `i`.
    pub fn status(&self, i: usize) -> Status {
        self.status[i]
    }

    /// Read a floating-point column, as [`Ensemble::read`] does.
    pub fn read(&self, column: Column) -> Option<&[f64]> {
        match column {
            Column::Lon => Some(&*self.lon),
            Column::Lat => Some(&*self.lat),
            Column::Z => Some(&*self.z),
            Column::PrevLon => Some(&*self.prev_lon),
            Column::PrevLat => Some(&*self.prev_lat),
            Column::DevLevel => Some(&*self.dev_level),
            Column::TerminalVelocity => Some(&*self.terminal_velocity),
            Column::Temperature => Some(&*self.temperature),
            Column::SeafloorDepth => Some(&*self.seafloor_depth),
            Column::DevStage | Column::SettlementEligible | Column::Status => None,
        }
    }

    /// First active particle holding a non-finite value in `column`.
    ///
    /// Always `None` for non-numeric columns.
    pub fn first_non_finite(&self, column: Column) -> Option<ParticleId> {
        let values = self.read(column)?;
        values
            .iter()
            .zip(self.status.iter())
            .zip(self.ids)
            .find(|((v, s), _)| s.is_active() && !v.is_finite())
            .map(|(_, id)| *id)
    }

    /// Whether any row is active.
    pub fn any_active(&self) -> bool {
        self.status.iter().any(|s| s.is_active())
    }

    /// Narrow the view to what a host [`Transport`](crate::Transport) may
    /// touch.
    pub fn transport_view(&mut self) -> TransportView<'_> {
        TransportView {
            ids: self.ids,
            lon: &mut *self.lon,
            lat: &mut *self.lat,
            z: &mut *self.z,
            terminal_velocity: &*self.terminal_velocity,
            status: &*self.status,
        }
    }

    /// Deactivate row `i` with `outcome`.
    ///
    /// Returns `false` (and changes nothing) if the particle was already
    /// inactive.
    pub fn deactivate(&mut self, i: usize, outcome: Outcome) -> bool {
        if !self.status[i].is_active() {
            return false;
        }
        self.status[i] = Status::Inactive(outcome);
        self.deactivations.push(Deactivation {
            id: self.ids[i],
            outcome,
        });
        true
    }
}

/// Positions a host transport may move, plus the read-only swim velocity.
///
/// Development state, eligibility and status are out of reach. Inactive
/// rows are still present, so indices match the ensemble.
pub struct TransportView<'a> {
    /// Particle identities.
    pub ids: &'a [ParticleId],
    /// Longitude in degrees east.
    pub lon: &'a mut [f64],
    /// Latitude in degrees north.
    pub lat: &'a mut [f64],
    /// Depth in metres, negative below the surface.
    pub z: &'a mut [f64],
    /// Vertical swim velocity in m/s, already signed for time direction.
    pub terminal_velocity: &'a [f64],
    status: &'a [Status],
}

impl TransportView<'_> {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the view has no rows.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether row `i` is still active.
    pub fn is_active(&self, i: usize) -> bool {
        self.status[i].is_active()
    }
}
