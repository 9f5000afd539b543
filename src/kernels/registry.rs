//! Runtime selection of kernel variants.
//!
//! Tile extents are compile-time parameters, so every tiled instantiation
//! that can be selected is listed here. The registry is built once by the
//! caller, usually at start-up, and then only read.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::matvec_blocked::matvec_blocked;
use super::matvec_naive::matvec_naive;
use super::matvec_simd::{MAX_INNER_REDUCTION, matvec_simd};
use super::naive_ijk::matmul_naive_ijk;
use super::naive_kij::matmul_naive_kij;
use super::peak::{MAX_FMA_CHAINS, peak_fma};
use super::tiled::{InnerOrder, matmul_tiled_ijk, matmul_tiled_kij};
use super::{FnMatmul, FnMatvec, MatmulFn, MatmulKernel, MatvecFn, MatvecKernel};
use crate::error::{BenchError, Result};

/// Square tile extents instantiated for the tiled kernels.
pub const TILE_SIZES: [usize; 3] = [8, 16, 32];

/// Largest matvec parameter (block size, register count, FMA chains).
pub const MAX_MATVEC_PARAM: usize = 32;

const _: () =
    assert!(MAX_MATVEC_PARAM <= MAX_INNER_REDUCTION && MAX_MATVEC_PARAM <= MAX_FMA_CHAINS);

/// Identifies a matmul kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatmulVariant {
    NaiveIjk,
    NaiveKij,
    /// Square `tile × tile × tile` tiling.
    Tiled { order: InnerOrder, tile: usize },
}

impl fmt::Display for MatmulVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatmulVariant::NaiveIjk => write!(f, "naive-ijk"),
            MatmulVariant::NaiveKij => write!(f, "naive-kij"),
            MatmulVariant::Tiled { order, tile } => {
                write!(f, "tiled-{}-{}", order.as_str(), tile)
            }
        }
    }
}

impl FromStr for MatmulVariant {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || BenchError::UnknownVariant(s.to_string());
        match s {
            "naive-ijk" => return Ok(MatmulVariant::NaiveIjk),
            "naive-kij" => return Ok(MatmulVariant::NaiveKij),
            _ => {}
        }

        let rest = s.strip_prefix("tiled-").ok_or_else(unknown)?;
        let (order, tile) = rest.split_once('-').ok_or_else(unknown)?;
        let order = match order {
            "ijk" => InnerOrder::Ijk,
            "kij" => InnerOrder::Kij,
            _ => return Err(unknown()),
        };
        let tile = tile.parse().map_err(|_| unknown())?;
        Ok(MatmulVariant::Tiled { order, tile })
    }
}

/// Identifies a matvec kernel together with its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatvecVariant {
    /// FMA-only calibration with the given number of chains.
    Peak(usize),
    Naive,
    /// Blocked inner reduction with the given block size.
    Blocked(usize),
    /// Vectorized reduction with the given registers per chunk.
    Simd(usize),
}

impl MatvecVariant {
    /// Maps the numeric `(function, parameter)` selector used by the
    /// command-line driver: 0 peak, 1 naive, 2 blocked, 3 simd. A
    /// parameter of 0 means 1.
    pub fn from_function(function: u32, param: usize) -> Result<Self> {
        let param = param.max(1);
        match function {
            0 => Ok(MatvecVariant::Peak(param)),
            1 => Ok(MatvecVariant::Naive),
            2 => Ok(MatvecVariant::Blocked(param)),
            3 => Ok(MatvecVariant::Simd(param)),
            other => Err(BenchError::UnknownVariant(format!("function {other}"))),
        }
    }

    pub fn function(&self) -> u32 {
        match self {
            MatvecVariant::Peak(_) => 0,
            MatvecVariant::Naive => 1,
            MatvecVariant::Blocked(_) => 2,
            MatvecVariant::Simd(_) => 3,
        }
    }

    pub fn param(&self) -> usize {
        match *self {
            MatvecVariant::Naive => 0,
            MatvecVariant::Peak(p) | MatvecVariant::Blocked(p) | MatvecVariant::Simd(p) => p,
        }
    }
}

impl fmt::Display for MatvecVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatvecVariant::Peak(p) => write!(f, "peak-{p}"),
            MatvecVariant::Naive => write!(f, "naive"),
            MatvecVariant::Blocked(p) => write!(f, "blocked-{p}"),
            MatvecVariant::Simd(p) => write!(f, "simd-{p}"),
        }
    }
}

impl FromStr for MatvecVariant {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || BenchError::UnknownVariant(s.to_string());
        if s == "naive" {
            return Ok(MatvecVariant::Naive);
        }

        let (kind, param) = s.split_once('-').ok_or_else(unknown)?;
        let param = param.parse().map_err(|_| unknown())?;
        match kind {
            "peak" => Ok(MatvecVariant::Peak(param)),
            "blocked" => Ok(MatvecVariant::Blocked(param)),
            "simd" => Ok(MatvecVariant::Simd(param)),
            _ => Err(unknown()),
        }
    }
}

/// Maps variant identifiers to kernel implementations.
#[derive(Default)]
pub struct KernelRegistry {
    matmul: BTreeMap<MatmulVariant, Box<dyn MatmulKernel>>,
    matvec: BTreeMap<MatvecVariant, Box<dyn MatvecKernel>>,
}

impl KernelRegistry {
    /// A registry with no kernels.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every built-in kernel: both naive matmul orders, tiled ijk/kij for
    /// each of [`TILE_SIZES`], and the matvec family for parameters
    /// `1..=MAX_MATVEC_PARAM`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();

        registry.register_fn(MatmulVariant::NaiveIjk, matmul_naive_ijk);
        registry.register_fn(MatmulVariant::NaiveKij, matmul_naive_kij);

        let tiled: [(InnerOrder, usize, MatmulFn); 6] = [
            (InnerOrder::Ijk, 8, matmul_tiled_ijk::<8, 8, 8>),
            (InnerOrder::Ijk, 16, matmul_tiled_ijk::<16, 16, 16>),
            (InnerOrder::Ijk, 32, matmul_tiled_ijk::<32, 32, 32>),
            (InnerOrder::Kij, 8, matmul_tiled_kij::<8, 8, 8>),
            (InnerOrder::Kij, 16, matmul_tiled_kij::<16, 16, 16>),
            (InnerOrder::Kij, 32, matmul_tiled_kij::<32, 32, 32>),
        ];
        for (order, tile, func) in tiled {
            registry.register_fn(MatmulVariant::Tiled { order, tile }, func);
        }

        registry.register_matvec(
            MatvecVariant::Naive,
            Box::new(FnMatvec {
                variant: MatvecVariant::Naive,
                func: |a, b, c, _| matvec_naive(a, b, c),
                param: 0,
            }),
        );
        for p in 1..=MAX_MATVEC_PARAM {
            let parameterized: [(MatvecVariant, MatvecFn); 3] = [
                (MatvecVariant::Peak(p), peak_fma),
                (MatvecVariant::Blocked(p), matvec_blocked),
                (MatvecVariant::Simd(p), matvec_simd),
            ];
            for (variant, func) in parameterized {
                registry.register_matvec(
                    variant,
                    Box::new(FnMatvec {
                        variant,
                        func,
                        param: p,
                    }),
                );
            }
        }

        registry
    }

    fn register_fn(&mut self, variant: MatmulVariant, func: MatmulFn) {
        self.register_matmul(variant, Box::new(FnMatmul { variant, func }));
    }

    /// Adds or replaces a matmul kernel.
    pub fn register_matmul(&mut self, variant: MatmulVariant, kernel: Box<dyn MatmulKernel>) {
        self.matmul.insert(variant, kernel);
    }

    /// Adds or replaces a matvec kernel.
    pub fn register_matvec(&mut self, variant: MatvecVariant, kernel: Box<dyn MatvecKernel>) {
        self.matvec.insert(variant, kernel);
    }

    pub fn matmul(&self, variant: MatmulVariant) -> Result<&dyn MatmulKernel> {
        self.matmul
            .get(&variant)
            .map(|k| k.as_ref())
            .ok_or_else(|| BenchError::UnknownVariant(variant.to_string()))
    }

    pub fn matvec(&self, variant: MatvecVariant) -> Result<&dyn MatvecKernel> {
        self.matvec
            .get(&variant)
            .map(|k| k.as_ref())
            .ok_or_else(|| BenchError::UnknownVariant(variant.to_string()))
    }

    /// Registered matmul variants in a stable order (naive first).
    pub fn matmul_variants(&self) -> impl Iterator<Item = MatmulVariant> + '_ {
        self.matmul.keys().copied()
    }

    pub fn matvec_variants(&self) -> impl Iterator<Item = MatvecVariant> + '_ {
        self.matvec.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_names_round_trip() {
        let registry = KernelRegistry::with_defaults();
        for v in registry.matmul_variants() {
            assert_eq!(v.to_string().parse::<MatmulVariant>().unwrap(), v);
        }
        for v in registry.matvec_variants() {
            assert_eq!(v.to_string().parse::<MatvecVariant>().unwrap(), v);
        }
    }

    #[test]
    fn test_defaults_cover_every_variant() {
        let registry = KernelRegistry::with_defaults();
        assert_eq!(registry.matmul_variants().count(), 2 + 2 * TILE_SIZES.len());
        assert_eq!(registry.matvec_variants().count(), 1 + 3 * MAX_MATVEC_PARAM);

        assert_eq!(
            registry.matmul(MatmulVariant::NaiveIjk).unwrap().name(),
            "naive-ijk"
        );
        assert_eq!(
            registry.matmul_variants().next(),
            Some(MatmulVariant::NaiveIjk)
        );
        let peak = registry.matvec(MatvecVariant::Peak(4)).unwrap();
        assert!(!peak.verifiable());
        assert!(registry.matvec(MatvecVariant::Simd(4)).unwrap().verifiable());
    }

    #[test]
    fn test_unknown_variants() {
        let registry = KernelRegistry::with_defaults();
        let missing = MatmulVariant::Tiled {
            order: InnerOrder::Ijk,
            tile: 12,
        };
        assert_eq!(
            registry.matmul(missing).err(),
            Some(BenchError::UnknownVariant("tiled-ijk-12".into()))
        );
        assert!(registry.matvec(MatvecVariant::Simd(33)).is_err());
        assert!("tiled-xyz-8".parse::<MatmulVariant>().is_err());
        assert!("simd".parse::<MatvecVariant>().is_err());
        assert!("simd-x".parse::<MatvecVariant>().is_err());
    }

    #[test]
    fn test_from_function_selector() {
        assert_eq!(MatvecVariant::from_function(0, 0).unwrap(), MatvecVariant::Peak(1));
        assert_eq!(MatvecVariant::from_function(1, 7).unwrap(), MatvecVariant::Naive);
        assert_eq!(MatvecVariant::from_function(2, 4).unwrap(), MatvecVariant::Blocked(4));
        assert_eq!(MatvecVariant::from_function(3, 2).unwrap(), MatvecVariant::Simd(2));
        assert!(MatvecVariant::from_function(4, 1).is_err());

        let v = MatvecVariant::Simd(2);
        assert_eq!((v.function(), v.param()), (3, 2));
    }
}
