//! # spkstate
//!
//! State vectors of solar system bodies and spacecraft from NAIF kernels.
//!
//! The crate reads binary SPK ephemerides, leapseconds and meta-kernels,
//! converts calendar strings into ephemeris time and evaluates the state of a
//! target relative to an observer:
//!
//! ```no_run
//! use spkstate::{kernels::{KernelPool, KernelSet}, state::spkezr, time::str2et};
//!
//! let mut pool = KernelPool::new();
//! let kernels = KernelSet::furnish(&mut pool, ["naif0012.tls", "de440s.bsp", "jwst_rec.bsp"])?;
//!
//! let et = str2et(&kernels, "2024-12-31")?;
//! let (state, _light_time) = spkezr(&kernels, "JWST", et, "J2000", "NONE", "SUN")?;
//! println!("Position (km): {:?}", state.position);
//!
//! kernels.release()?;
//! # Ok::<(), spkstate::spkstate_errors::SpkStateError>(())
//! ```
//!
//! Supported SPK segment types are 2, 3, 8, 9, 12 and 13. Supported frames
//! are `J2000` and `ECLIPJ2000`.

pub mod bodies;
pub mod constants;
pub mod frames;
pub mod kernels;
pub mod report;
pub mod spkstate_errors;
pub mod state;
pub mod time;
