//! CapGam-derived level-scheme files.
//!
//! Each isotope has a file `{Z}-{A}.bin` holding a three-level nested array
//! of `f64`, every dimension prefixed by its length as a little-endian `u64`:
//!
//! ```text
//! levels[i][0]    = [E_level, ...]
//! levels[i][k>0]  = [E_final, branching, flag]
//! ```
//!
//! Energies are in MeV. The transition flag is stored in keV multiples:
//! 1 keV placed gamma, 2 keV placed conversion electron, -1/-2 keV their
//! unplaced counterparts, -3 keV a continuum level handed to evaporation.

use crate::error::{IoError, Result};
use gammagen_data::IsotopeKey;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Two level energies closer than this (1 eV) are the same level.
pub const LEVEL_TOLERANCE_MEV: f64 = 1e-6;

const FLAG_UNIT_MEV: f64 = 1e-3;
const MAX_DIM: u64 = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionKind {
    Gamma,
    ConversionElectron,
    UnplacedGamma,
    UnplacedElectron,
    Continuum,
    Unknown(f64),
}

impl TransitionKind {
    #[must_use]
    pub fn from_flag(flag_mev: f64) -> Self {
        match (flag_mev / FLAG_UNIT_MEV).round() as i64 {
            1 => TransitionKind::Gamma,
            2 => TransitionKind::ConversionElectron,
            -1 => TransitionKind::UnplacedGamma,
            -2 => TransitionKind::UnplacedElectron,
            -3 => TransitionKind::Continuum,
            _ => TransitionKind::Unknown(flag_mev),
        }
    }

    #[must_use]
    pub fn to_flag(self) -> f64 {
        match self {
            TransitionKind::Gamma => FLAG_UNIT_MEV,
            TransitionKind::ConversionElectron => 2.0 * FLAG_UNIT_MEV,
            TransitionKind::UnplacedGamma => -FLAG_UNIT_MEV,
            TransitionKind::UnplacedElectron => -2.0 * FLAG_UNIT_MEV,
            TransitionKind::Continuum => -3.0 * FLAG_UNIT_MEV,
            TransitionKind::Unknown(flag) => flag,
        }
    }

    /// Placed transitions are the ones the cascade walk may take.
    #[must_use]
    pub fn is_placed(self) -> bool {
        matches!(
            self,
            TransitionKind::Gamma | TransitionKind::ConversionElectron
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub final_level_mev: f64,
    pub branching: f64,
    pub kind: TransitionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub energy_mev: f64,
    pub transitions: Vec<Transition>,
}

impl Level {
    /// A level whose only exit is the statistical continuum.
    #[must_use]
    pub fn is_continuum(&self) -> bool {
        self.transitions.len() == 1 && self.transitions[0].kind == TransitionKind::Continuum
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelScheme {
    pub isotope: IsotopeKey,
    pub levels: Vec<Level>,
}

impl LevelScheme {
    /// File name used for `isotope` inside a data directory.
    #[must_use]
    pub fn file_name(isotope: IsotopeKey) -> String {
        format!("{}-{}.bin", isotope.z, isotope.a)
    }

    pub fn load<P: AsRef<Path>>(path: P, isotope: IsotopeKey) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let file = File::open(path).map_err(|e| IoError::level_data(&label, e.to_string()))?;
        Self::read_from(&mut BufReader::new(file), isotope).map_err(|e| match e {
            IoError::LevelData { reason, .. } => IoError::level_data(&label, reason),
            other => other,
        })
    }

    pub fn read_from<R: Read>(reader: &mut R, isotope: IsotopeKey) -> Result<Self> {
        let n_levels = read_dim(reader)?;
        let mut levels = Vec::with_capacity(n_levels);
        for i in 0..n_levels {
            let n_entries = read_dim(reader)?;
            let mut entries = Vec::with_capacity(n_entries);
            for _ in 0..n_entries {
                let len = read_dim(reader)?;
                let mut values = vec![0.0; len];
                for v in values.iter_mut() {
                    *v = read_f64(reader)?;
                }
                entries.push(values);
            }

            let mut entries = entries.into_iter();
            let energy_mev = entries
                .next()
                .and_then(|header| header.first().copied())
                .ok_or_else(|| IoError::level_data("<stream>", format!("level {i} has no energy")))?;

            let transitions = entries
                .map(|t| {
                    if t.len() < 3 {
                        return Err(IoError::level_data(
                            "<stream>",
                            format!("level {i} has a transition with {} fields", t.len()),
                        ));
                    }
                    Ok(Transition {
                        final_level_mev: t[0],
                        branching: t[1],
                        kind: TransitionKind::from_flag(t[2]),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            levels.push(Level {
                energy_mev,
                transitions,
            });
        }
        Ok(Self { isotope, levels })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_dim(writer, self.levels.len())?;
        for level in &self.levels {
            write_dim(writer, 1 + level.transitions.len())?;
            write_dim(writer, 1)?;
            writer.write_all(&level.energy_mev.to_le_bytes())?;
            for t in &level.transitions {
                write_dim(writer, 3)?;
                for v in [t.final_level_mev, t.branching, t.kind.to_flag()] {
                    writer.write_all(&v.to_le_bytes())?;
                }
            }
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Highest level in the scheme.
    #[must_use]
    pub fn top_level(&self) -> Option<&Level> {
        self.levels
            .iter()
            .max_by(|a, b| a.energy_mev.total_cmp(&b.energy_mev))
    }

    /// Highest level strictly below `energy_mev`.
    #[must_use]
    pub fn highest_level_below(&self, energy_mev: f64) -> Option<&Level> {
        self.levels
            .iter()
            .filter(|l| l.energy_mev < energy_mev)
            .max_by(|a, b| a.energy_mev.total_cmp(&b.energy_mev))
    }

    #[must_use]
    pub fn find_level(&self, energy_mev: f64) -> Option<&Level> {
        self.levels
            .iter()
            .find(|l| (l.energy_mev - energy_mev).abs() < LEVEL_TOLERANCE_MEV)
    }
}

fn read_dim<R: Read>(reader: &mut R) -> Result<usize> {
    let mut buf = [0u8; 8];
    reader
        .read_exact(&mut buf)
        .map_err(|e| IoError::level_data("<stream>", format!("truncated file: {e}")))?;
    let dim = u64::from_le_bytes(buf);
    if dim > MAX_DIM {
        return Err(IoError::level_data(
            "<stream>",
            format!("implausible array length {dim}"),
        ));
    }
    Ok(dim as usize)
}

fn read_f64<R: Read>(reader: &mut R) -> Result<f64> {
    let mut buf = [0u8; 8];
    reader
        .read_exact(&mut buf)
        .map_err(|e| IoError::level_data("<stream>", format!("truncated file: {e}")))?;
    Ok(f64::from_le_bytes(buf))
}

fn write_dim<W: Write>(writer: &mut W, dim: usize) -> Result<()> {
    writer.write_all(&(dim as u64).to_le_bytes())?;
    Ok(())
}
