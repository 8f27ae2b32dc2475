//! Body name ↔ NAIF code translation.
//!
//! Names are looked up in the kernel pool first (`NAIF_BODY_NAME` /
//! `NAIF_BODY_CODE`, later entries win), then in the built-in table below.
//! Integer strings are accepted as codes. Matching ignores case and repeated
//! blanks.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{
    constants::NaifId,
    kernels::{pool::KernelPool, text_kernel::PoolValue},
    spkstate_errors::SpkStateError,
};

/// `(code, name)` pairs; the first name listed for a code is its
/// preferred name.
const BUILTIN_BODIES: &[(NaifId, &str)] = &[
    (0, "SOLAR SYSTEM BARYCENTER"),
    (0, "SSB"),
    (0, "SOLAR_SYSTEM_BARYCENTER"),
    (1, "MERCURY BARYCENTER"),
    (2, "VENUS BARYCENTER"),
    (3, "EARTH BARYCENTER"),
    (3, "EMB"),
    (3, "EARTH MOON BARYCENTER"),
    (3, "EARTH-MOON BARYCENTER"),
    (4, "MARS BARYCENTER"),
    (5, "JUPITER BARYCENTER"),
    (6, "SATURN BARYCENTER"),
    (7, "URANUS BARYCENTER"),
    (8, "NEPTUNE BARYCENTER"),
    (9, "PLUTO BARYCENTER"),
    (10, "SUN"),
    (199, "MERCURY"),
    (299, "VENUS"),
    (399, "EARTH"),
    (301, "MOON"),
    (499, "MARS"),
    (401, "PHOBOS"),
    (402, "DEIMOS"),
    (599, "JUPITER"),
    (501, "IO"),
    (502, "EUROPA"),
    (503, "GANYMEDE"),
    (504, "CALLISTO"),
    (699, "SATURN"),
    (601, "MIMAS"),
    (602, "ENCELADUS"),
    (606, "TITAN"),
    (799, "URANUS"),
    (899, "NEPTUNE"),
    (801, "TRITON"),
    (999, "PLUTO"),
    (901, "CHARON"),
    (-170, "JWST"),
    (-170, "JAMES WEBB SPACE TELESCOPE"),
    (-48, "HST"),
    (-48, "HUBBLE SPACE TELESCOPE"),
    (-82, "CASSINI"),
    (-98, "NEW HORIZONS"),
    (-31, "VOYAGER 1"),
    (-32, "VOYAGER 2"),
    (-61, "JUNO"),
    (-74, "MRO"),
    (-74, "MARS RECON ORBITER"),
    (-96, "PARKER SOLAR PROBE"),
    (-96, "SPP"),
    (-123, "GAIA"),
    (-144, "SOLAR ORBITER"),
    (-144, "SOLO"),
    (-28, "JUICE"),
];

static NAME_TO_CODE: Lazy<HashMap<&'static str, NaifId>> =
    Lazy::new(|| BUILTIN_BODIES.iter().map(|&(code, name)| (name, code)).collect());

static CODE_TO_NAME: Lazy<HashMap<NaifId, &'static str>> = Lazy::new(|| {
    let mut names = HashMap::new();
    for &(code, name) in BUILTIN_BODIES {
        names.entry(code).or_insert(name);
    }
    names
});

/// Upper case, trimmed, inner blanks collapsed to one space.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// `(name, code)` pairs defined in the kernel pool, in assignment order.
fn kernel_bodies(pool: &KernelPool) -> Vec<(String, NaifId)> {
    let (Some(names), Some(codes)) = (
        pool.variable("NAIF_BODY_NAME"),
        pool.variable("NAIF_BODY_CODE"),
    ) else {
        return Vec::new();
    };

    names
        .iter()
        .zip(codes)
        .filter_map(|(name, code)| match (name, code) {
            (PoolValue::Text(name), PoolValue::Number(code)) => {
                Some((normalize_name(name), *code as NaifId))
            }
            _ => None,
        })
        .collect()
}

/// NAIF code of a body name.
pub fn bodn2c(pool: &KernelPool, name: &str) -> Option<NaifId> {
    let normalized = normalize_name(name);

    kernel_bodies(pool)
        .into_iter()
        .rev()
        .find(|(kernel_name, _)| *kernel_name == normalized)
        .map(|(_, code)| code)
        .or_else(|| NAME_TO_CODE.get(normalized.as_str()).copied())
        .or_else(|| normalized.parse::<NaifId>().ok())
}

/// Preferred name of a NAIF code.
pub fn bodc2n(pool: &KernelPool, code: NaifId) -> Option<String> {
    kernel_bodies(pool)
        .into_iter()
        .rev()
        .find(|(_, kernel_code)| *kernel_code == code)
        .map(|(name, _)| name)
        .or_else(|| CODE_TO_NAME.get(&code).map(|name| name.to_string()))
}

/// Like [`bodn2c`], with [`SpkStateError::UnknownBody`] for unknown names.
pub fn body_id(pool: &KernelPool, name: &str) -> Result<NaifId, SpkStateError> {
    bodn2c(pool, name).ok_or_else(|| SpkStateError::UnknownBody(name.to_string()))
}

/// Name of a body for messages: its preferred name, or the code itself.
pub fn display_name(pool: &KernelPool, code: NaifId) -> String {
    bodc2n(pool, code).unwrap_or_else(|| code.to_string())
}
