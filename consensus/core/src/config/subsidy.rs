use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of entries in the built-in table: one per month until the subsidy reaches zero
pub const SUBSIDY_BY_MONTH_TABLE_SIZE: usize = 360;

/// Deflationary-phase subsidy per month, `floor(1_000_000_000 / 2^(month / 12))`
/// evaluated in double precision until the value reaches zero (inclusive).
/// The `subsidy_table` tool regenerates and checks it.
pub const SUBSIDY_BY_MONTH_TABLE: [u64; SUBSIDY_BY_MONTH_TABLE_SIZE] = [
    1000000000, 943874312, 890898718, 840896415, 793700525, 749153538, 707106781, 667419927, 629960524, 594603557,
    561231024, 529731547, 500000000, 471937156, 445449359, 420448207, 396850262, 374576769, 353553390, 333709963,
    314980262, 297301778, 280615512, 264865773, 250000000, 235968578, 222724679, 210224103, 198425131, 187288384,
    176776695, 166854981, 157490131, 148650889, 140307756, 132432886, 125000000, 117984289, 111362339, 105112051,
    99212565, 93644192, 88388347, 83427490, 78745065, 74325444, 70153878, 66216443, 62500000, 58992144,
    55681169, 52556025, 49606282, 46822096, 44194173, 41713745, 39372532, 37162722, 35076939, 33108221,
    31250000, 29496072, 27840584, 26278012, 24803141, 23411048, 22097086, 20856872, 19686266, 18581361,
    17538469, 16554110, 15625000, 14748036, 13920292, 13139006, 12401570, 11705524, 11048543, 10428436,
    9843133, 9290680, 8769234, 8277055, 7812500, 7374018, 6960146, 6569503, 6200785, 5852762,
    5524271, 5214218, 4921566, 4645340, 4384617, 4138527, 3906250, 3687009, 3480073, 3284751,
    3100392, 2926381, 2762135, 2607109, 2460783, 2322670, 2192308, 2069263, 1953125, 1843504,
    1740036, 1642375, 1550196, 1463190, 1381067, 1303554, 1230391, 1161335, 1096154, 1034631,
    976562, 921752, 870018, 821187, 775098, 731595, 690533, 651777, 615195, 580667,
    548077, 517315, 488281, 460876, 435009, 410593, 387549, 365797, 345266, 325888,
    307597, 290333, 274038, 258657, 244140, 230438, 217504, 205296, 193774, 182898,
    172633, 162944, 153798, 145166, 137019, 129328, 122070, 115219, 108752, 102648,
    96887, 91449, 86316, 81472, 76899, 72583, 68509, 64664, 61035, 57609,
    54376, 51324, 48443, 45724, 43158, 40736, 38449, 36291, 34254, 32332,
    30517, 28804, 27188, 25662, 24221, 22862, 21579, 20368, 19224, 18145,
    17127, 16166, 15258, 14402, 13594, 12831, 12110, 11431, 10789, 10184,
    9612, 9072, 8563, 8083, 7629, 7201, 6797, 6415, 6055, 5715,
    5394, 5092, 4806, 4536, 4281, 4041, 3814, 3600, 3398, 3207,
    3027, 2857, 2697, 2546, 2403, 2268, 2140, 2020, 1907, 1800,
    1699, 1603, 1513, 1428, 1348, 1273, 1201, 1134, 1070, 1010,
    953, 900, 849, 801, 756, 714, 674, 636, 600, 567,
    535, 505, 476, 450, 424, 400, 378, 357, 337, 318,
    300, 283, 267, 252, 238, 225, 212, 200, 189, 178,
    168, 159, 150, 141, 133, 126, 119, 112, 106, 100,
    94, 89, 84, 79, 75, 70, 66, 63, 59, 56,
    53, 50, 47, 44, 42, 39, 37, 35, 33, 31,
    29, 28, 26, 25, 23, 22, 21, 19, 18, 17,
    16, 15, 14, 14, 13, 12, 11, 11, 10, 9,
    9, 8, 8, 7, 7, 7, 6, 6, 5, 5,
    5, 4, 4, 4, 4, 3, 3, 3, 3, 3,
    2, 2, 2, 2, 2, 2, 2, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 0,
];

/// The monthly deflationary subsidy schedule.
///
/// Immutable shared data: clones are cheap and every consumer sees the same
/// table. A table coming from configuration is validated on construction to be
/// non-empty and monotonically non-increasing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct SubsidyTable(Arc<[u64]>);

impl SubsidyTable {
    /// Subsidy of the given deflationary month. Months past the end of the table
    /// get the last entry.
    pub fn subsidy_for_month(&self, month: u64) -> u64 {
        let last = self.0.len() - 1;
        let index = usize::try_from(month).map_or(last, |m| m.min(last));
        self.0[index]
    }

    /// The first entry, i.e. the deflationary phase base subsidy
    pub fn base_subsidy(&self) -> u64 {
        self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }
}

impl Default for SubsidyTable {
    fn default() -> Self {
        Self(Arc::from(&SUBSIDY_BY_MONTH_TABLE[..]))
    }
}

impl TryFrom<Vec<u64>> for SubsidyTable {
    type Error = ConfigError;

    fn try_from(table: Vec<u64>) -> Result<Self, Self::Error> {
        if table.is_empty() {
            return Err(ConfigError::EmptySubsidyTable);
        }
        if let Some(month) = table.windows(2).position(|pair| pair[1] > pair[0]) {
            return Err(ConfigError::SubsidyTableIncreases(month + 1));
        }
        Ok(Self(table.into()))
    }
}

impl From<SubsidyTable> for Vec<u64> {
    fn from(table: SubsidyTable) -> Self {
        table.0.to_vec()
    }
}
