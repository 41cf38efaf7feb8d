//! Ensemble column identifiers and the [`ColumnSet`] bitset.

use std::fmt;

/// One per-particle column of the [`Ensemble`](crate::Ensemble).
///
/// Propagators declare the columns they read and write in terms of
/// `Column`, which lets the pipeline validator reject stage orders in
/// which a stage would observe a stale value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Column {
    /// Longitude in degrees east.
    Lon = 0,
    /// Latitude in degrees north.
    Lat = 1,
    /// Vertical position in metres, negative below the sea surface.
    Z = 2,
    /// Longitude at the start of the current step.
    PrevLon = 3,
    /// Latitude at the start of the current step.
    PrevLat = 4,
    /// Continuous development clock.
    DevLevel = 5,
    /// Discrete development stage derived from the level.
    DevStage = 6,
    /// Vertical swim velocity in m/s, positive upward.
    TerminalVelocity = 7,
    /// Latched settlement eligibility flag.
    SettlementEligible = 8,
    /// Active or inactive (with outcome).
    Status = 9,
    /// Ambient sea-water temperature in degrees Celsius.
    Temperature = 10,
    /// Local seafloor depth below sea level, in metres (positive).
    SeafloorDepth = 11,
}

impl Column {
    /// Every column, in declaration order.
    pub const ALL: [Column; 12] = [
        Column::Lon,
        Column::Lat,
        Column::Z,
        Column::PrevLon,
        Column::PrevLat,
        Column::DevLevel,
        Column::DevStage,
        Column::TerminalVelocity,
        Column::SettlementEligible,
        Column::Status,
        Column::Temperature,
        Column::SeafloorDepth,
    ];

    /// Short snake_case name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Column::Lon => "lon",
            Column::Lat => "lat",
            Column::Z => "z",
            Column::PrevLon => "prev_lon",
            Column::PrevLat => "prev_lat",
            Column::DevLevel => "dev_level",
            Column::DevStage => "dev_stage",
            Column::TerminalVelocity => "terminal_velocity",
            Column::SettlementEligible => "settlement_eligible",
            Column::Status => "status",
            Column::Temperature => "temperature",
            Column::SeafloorDepth => "seafloor_depth",
        }
    }

    fn bit(self) -> u32 {
        1u32 << (self as u8)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`Column`]s implemented as a fixed-width bitset.
///
/// Used by propagators to declare which columns they read, enabling the
/// pipeline validator to check stage ordering at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColumnSet {
    bits: u32,
}

impl ColumnSet {
    /// Create an empty column set.
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Insert a column into the set.
    pub fn insert(&mut self, column: Column) {
        self.bits |= column.bit();
    }

    /// Check whether the set contains a column.
    pub fn contains(&self, column: Column) -> bool {
        self.bits & column.bit() != 0
    }

    /// Return the union of two sets (`self | other`).
    pub fn union(&self, other: &Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Return the intersection of two sets (`self & other`).
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Return the set difference (`self - other`).
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    /// Check whether `self` is a subset of `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits & !other.bits == 0
    }

    /// Returns `true` if the set contains no columns.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns the number of columns in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterate over the columns in the set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        Column::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        let mut set = Self::empty();
        for column in iter {
            set.insert(column);
        }
        set
    }
}

impl<const N: usize> From<[Column; N]> for ColumnSet {
    fn from(columns: [Column; N]) -> Self {
        columns.into_iter().collect()
    }
}
