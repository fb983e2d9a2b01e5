//! Design rule constants, in nanometers unless noted otherwise.

use pcell::layout::elements::via::ViaSpec;
use pcgeom::Dims;

/// The manufacturing grid.
pub const GRID: i64 = 5;

pub const MOS_CAP_MIN_LENGTH_UM: f64 = 1.0;
pub const MOS_CAP_MIN_WIDTH_UM: f64 = 1.88;
pub const MIM_CAP_MIN_LENGTH_UM: f64 = 5.0;
pub const MIM_CAP_MIN_WIDTH_UM: f64 = 5.0;
/// The largest accepted length or width. Keeps every derived coordinate
/// well inside the 32-bit range of GDS.
pub const CAP_MAX_LENGTH_UM: f64 = 10_000.0;

pub const POLY_END_CAP: i64 = 520;
pub const COMP_SD_EXTENSION: i64 = 520;
pub const IMPLANT_COMP_ENCLOSURE: i64 = 160;
pub const NWELL_COMP_ENCLOSURE: i64 = 430;
/// N-well enclosure of comp inside a 5/6V dual-gate region.
pub const NWELL_COMP_ENCLOSURE_HV: i64 = 600;
pub const LVPWELL_COMP_ENCLOSURE: i64 = 430;
pub const DNWELL_COMP_ENCLOSURE: i64 = 660;
pub const DNWELL_LVPWELL_ENCLOSURE: i64 = 2_500;
pub const DUALGATE_ENCLOSURE: i64 = 760;

pub const GUARD_RING_SPACING: i64 = 2_500;
pub const GUARD_RING_WIDTH: i64 = 360;

const CONTACT_SIZE: Dims = Dims::square(220);
const CONTACT_SPACING: Dims = Dims::square(280);

/// Contacts in the poly end caps.
pub const POLY_CONTACT: ViaSpec = ViaSpec::new(CONTACT_SIZE, CONTACT_SPACING, Dims::new(70, 150));
/// Contacts in the comp source/drain strips.
pub const COMP_CONTACT: ViaSpec = ViaSpec::new(CONTACT_SIZE, CONTACT_SPACING, Dims::new(150, 70));
/// Contacts centered in the guard ring.
pub const GUARD_RING_CONTACT: ViaSpec = ViaSpec::new(
    CONTACT_SIZE,
    CONTACT_SPACING,
    Dims::square((GUARD_RING_WIDTH - 220) / 2),
);

pub const MIM_BOTTOM_ENCLOSURE: i64 = 600;
pub const MIM_L_MK_WIDTH: i64 = 100;
pub const MIM_VIA: ViaSpec = ViaSpec::new(Dims::square(220), Dims::square(500), Dims::square(400));
