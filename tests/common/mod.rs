#![allow(dead_code)]

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

/// Leapseconds kernel excerpt, enough for epochs after 2017.
pub const LSK: &str = r"KPL/LSK

Leapseconds kernel used by the tests.

\begindata

DELTET/DELTA_T_A =   32.184
DELTET/K         =    1.657D-3
DELTET/EB        =    1.671D-2
DELTET/M = (  6.239996D0   1.99096871D-7 )

DELTET/DELTA_AT  = ( 10,   @1972-JAN-1
                     35,   @2012-JUL-1
                     36,   @2015-JUL-1
                     37,   @2017-JAN-1 )

\begintext
";

/// ET of 2024-12-31T00:00:00 UTC, up to the 1.7 ms periodic term.
pub const ET_2024_12_31: f64 = 788_875_269.184;

/// Coverage used by the synthetic segments: 2024-01-01 to 2026-01-01 (ET, approx.)
pub const COVERAGE_START: f64 = 757_339_200.0;
pub const COVERAGE_END: f64 = 820_497_600.0;

pub fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

pub fn write_text(dir: &Utf8Path, name: &str, content: &str) -> Utf8PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Position and velocity of a body in uniform linear motion.
#[derive(Debug, Clone, Copy)]
pub struct LinearMotion {
    /// Position (km) at the reference epoch.
    pub position: [f64; 3],
    /// Velocity (km/s).
    pub velocity: [f64; 3],
    /// Reference epoch (ET seconds).
    pub epoch: f64,
}

impl LinearMotion {
    pub fn new(position: [f64; 3], velocity: [f64; 3], epoch: f64) -> Self {
        LinearMotion {
            position,
            velocity,
            epoch,
        }
    }

    pub fn position_at(&self, et: f64) -> [f64; 3] {
        let dt = et - self.epoch;
        [
            self.position[0] + self.velocity[0] * dt,
            self.position[1] + self.velocity[1] * dt,
            self.position[2] + self.velocity[2] * dt,
        ]
    }

    pub fn state_at(&self, et: f64) -> [f64; 6] {
        let [x, y, z] = self.position_at(et);
        let [vx, vy, vz] = self.velocity;
        [x, y, z, vx, vy, vz]
    }
}

struct Segment {
    name: String,
    target: i32,
    center: i32,
    frame: i32,
    data_type: i32,
    start: f64,
    end: f64,
    words: Vec<f64>,
}

/// Builder of little-endian DAF/SPK files.
///
/// Layout: file record, one summary record, one name record, then the
/// segment data starting at word address 385.
#[derive(Default)]
pub struct SpkBuilder {
    segments: Vec<Segment>,
    big_endian: bool,
}

impl SpkBuilder {
    pub fn new() -> Self {
        SpkBuilder::default()
    }

    /// Write the file in `BIG-IEEE` byte order.
    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    /// Add a segment from raw words.
    #[allow(clippy::too_many_arguments)]
    pub fn raw_segment(
        mut self,
        name: &str,
        target: i32,
        center: i32,
        frame: i32,
        data_type: i32,
        start: f64,
        end: f64,
        words: Vec<f64>,
    ) -> Self {
        assert!(self.segments.len() < 25, "one summary record holds 25 SPK summaries");
        self.segments.push(Segment {
            name: name.to_string(),
            target,
            center,
            frame,
            data_type,
            start,
            end,
            words,
        });
        self
    }

    /// Type 2 segment of `records` Chebyshev records describing `motion`.
    pub fn chebyshev_linear(
        self,
        target: i32,
        center: i32,
        frame: i32,
        motion: LinearMotion,
        records: usize,
    ) -> Self {
        let (start, end) = (COVERAGE_START, COVERAGE_END);
        let intlen = (end - start) / records as f64;
        let radius = intlen / 2.0;

        let mut words = Vec::new();
        for i in 0..records {
            let mid = start + intlen * i as f64 + radius;
            let position = motion.position_at(mid);
            words.push(mid);
            words.push(radius);
            for axis in 0..3 {
                words.push(position[axis]);
                words.push(motion.velocity[axis] * radius);
            }
        }
        words.extend([start, intlen, 8.0, records as f64]);

        let name = format!("{target} wrt {center} type 2");
        self.raw_segment(&name, target, center, frame, 2, start, end, words)
    }

    /// Type 9 or 13 segment sampling `motion` at `epochs`.
    pub fn discrete_unequal(
        self,
        data_type: i32,
        target: i32,
        center: i32,
        motion: LinearMotion,
        epochs: &[f64],
        window: usize,
    ) -> Self {
        let mut words: Vec<f64> = epochs.iter().flat_map(|&et| motion.state_at(et)).collect();
        words.extend_from_slice(epochs);
        words.extend((1..=(epochs.len() - 1) / 100).map(|i| epochs[100 * i]));
        words.extend([window as f64 - 1.0, epochs.len() as f64]);

        let name = format!("{target} wrt {center} type {data_type}");
        let (start, end) = (epochs[0], epochs[epochs.len() - 1]);
        self.raw_segment(&name, target, center, 1, data_type, start, end, words)
    }

    /// Type 8 or 12 segment sampling `motion` every `step` seconds.
    #[allow(clippy::too_many_arguments)]
    pub fn discrete_equal(
        self,
        data_type: i32,
        target: i32,
        center: i32,
        motion: LinearMotion,
        start: f64,
        step: f64,
        count: usize,
        window: usize,
    ) -> Self {
        let mut words: Vec<f64> = (0..count)
            .flat_map(|i| motion.state_at(start + step * i as f64))
            .collect();
        words.extend([start, step, window as f64 - 1.0, count as f64]);

        let name = format!("{target} wrt {center} type {data_type}");
        let end = start + step * (count - 1) as f64;
        self.raw_segment(&name, target, center, 1, data_type, start, end, words)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        const RECORD: usize = 1024;
        const FIRST_DATA_ADDRESS: usize = 3 * 128 + 1;

        // Addresses of every segment
        let mut address = FIRST_DATA_ADDRESS;
        let mut ranges = Vec::new();
        for segment in &self.segments {
            ranges.push((address, address + segment.words.len() - 1));
            address += segment.words.len();
        }
        let free = address;

        let big = self.big_endian;
        let int = |value: i32| if big { value.to_be_bytes() } else { value.to_le_bytes() };
        let word = |value: f64| if big { value.to_be_bytes() } else { value.to_le_bytes() };

        let mut bytes = Vec::new();

        // File record
        bytes.extend_from_slice(b"DAF/SPK ");
        bytes.extend_from_slice(&int(2));
        bytes.extend_from_slice(&int(6));
        bytes.extend_from_slice(format!("{:<60}", "synthetic test ephemeris").as_bytes());
        bytes.extend_from_slice(&int(2));
        bytes.extend_from_slice(&int(2));
        bytes.extend_from_slice(&int(free as i32));
        bytes.extend_from_slice(if big { b"BIG-IEEE" } else { b"LTL-IEEE" });
        bytes.resize(RECORD, 0);

        // Summary record
        bytes.extend_from_slice(&word(0.0));
        bytes.extend_from_slice(&word(0.0));
        bytes.extend_from_slice(&word(self.segments.len() as f64));
        for (segment, (begin, end)) in self.segments.iter().zip(&ranges) {
            bytes.extend_from_slice(&word(segment.start));
            bytes.extend_from_slice(&word(segment.end));
            for value in [
                segment.target,
                segment.center,
                segment.frame,
                segment.data_type,
                *begin as i32,
                *end as i32,
            ] {
                bytes.extend_from_slice(&int(value));
            }
        }
        bytes.resize(2 * RECORD, 0);

        // Name record
        for segment in &self.segments {
            bytes.extend_from_slice(format!("{:<40.40}", segment.name).as_bytes());
        }
        bytes.resize(3 * RECORD, b' ');

        // Data
        for segment in &self.segments {
            for value in &segment.words {
                bytes.extend_from_slice(&word(*value));
            }
        }
        let padded = bytes.len().div_ceil(RECORD) * RECORD;
        bytes.resize(padded, 0);

        bytes
    }

    pub fn write(&self, dir: &Utf8Path, name: &str) -> Utf8PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}

/// Planet barycenter, planet and spacecraft in linear motion:
///
/// * 3 (EMB) relative to 0 (SSB) in J2000,
/// * 399 (EARTH) relative to 3 in ECLIPJ2000,
/// * 10 (SUN) relative to 0,
/// * -170 (JWST) relative to 399, type 13.
pub struct SolarSystem {
    pub emb: LinearMotion,
    pub earth: LinearMotion,
    pub sun: LinearMotion,
    pub jwst: LinearMotion,
}

impl SolarSystem {
    pub fn new() -> Self {
        SolarSystem {
            emb: LinearMotion::new([-2.6e7, 1.33e8, 5.77e7], [-29.8, -5.0, -2.2], ET_2024_12_31),
            earth: LinearMotion::new([3000.0, -4000.0, 100.0], [0.01, 0.012, -0.002], ET_2024_12_31),
            sun: LinearMotion::new([-1.0e6, 4.0e5, 2.0e4], [0.004, -0.011, 0.0001], ET_2024_12_31),
            jwst: LinearMotion::new([-1.2e6, 8.0e5, 3.0e5], [-0.3, -0.25, -0.1], ET_2024_12_31),
        }
    }

    pub fn planets(&self) -> SpkBuilder {
        SpkBuilder::new()
            .chebyshev_linear(3, 0, 1, self.emb, 24)
            .chebyshev_linear(399, 3, 17, self.earth, 12)
            .chebyshev_linear(10, 0, 1, self.sun, 6)
    }

    pub fn spacecraft(&self) -> SpkBuilder {
        let epochs: Vec<f64> = (0..250)
            .map(|i| ET_2024_12_31 - 86_400.0 * 30.0 + 21_600.0 * i as f64)
            .collect();
        SpkBuilder::new().discrete_unequal(13, -170, 399, self.jwst, &epochs, 8)
    }

    /// Writes `naif0012.tls`, `de440s.bsp` and `jwst_rec.bsp` into `dir`.
    pub fn write_kernels(&self, dir: &Utf8Path) -> Vec<Utf8PathBuf> {
        vec![
            write_text(dir, "naif0012.tls", LSK),
            self.planets().write(dir, "de440s.bsp"),
            self.spacecraft().write(dir, "jwst_rec.bsp"),
        ]
    }
}
