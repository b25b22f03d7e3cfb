//! Synthetic Metro: block-group counts with tunable segregation
//!
//! ## Model
//!
//! A metro-wide profile π over the K bins of a category is drawn from a
//! symmetric Dirichlet(2, …, 2). Each block i then:
//!
//! 1. picks a dominant bin dᵢ with probability π(dᵢ)
//! 2. mixes its profile as qᵢ = (1 - s)·π + s·e(dᵢ)
//! 3. draws a size Nᵢ ~ Poisson(mean_block_size)
//! 4. draws bin counts b(i, j) ~ Poisson(Nᵢ · qᵢ(j))
//!
//! s = 0 leaves every block a noisy copy of the metro (MI near 0);
//! s = 1 puts each block entirely in one bin (MI near H(π)).

use ndarray::Array1;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Dirichlet, Distribution, Poisson};

use crate::config::SyntheticConfig;
use crate::error::{ConfigError, SchemaError};
use crate::table::columns::*;
use crate::table::{int_array, text_array, Frame};

/// Dirichlet concentration shared by every bin
const CONCENTRATION: f64 = 2.0;

/// Generator for one synthetic metro area
#[derive(Debug)]
pub struct SyntheticMetro {
    config: SyntheticConfig,
    /// Metro-wide bin profile π
    profile: Array1<f64>,
    /// Sampler for each block's dominant bin, weighted by π
    dominant: WeightedIndex<f64>,
    rng: StdRng,
}

impl SyntheticMetro {
    /// Create a generator; draws the metro profile immediately
    pub fn new(config: SyntheticConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let profile = Array1::from(match config.category.bins().len() {
            6 => dirichlet::<6>(&mut rng)?,
            8 => dirichlet::<8>(&mut rng)?,
            16 => dirichlet::<16>(&mut rng)?,
            24 => dirichlet::<24>(&mut rng)?,
            k => return Err(ConfigError::Invalid(format!("no bin profile for {} bins", k))),
        });
        let dominant = WeightedIndex::new(profile.iter())
            .map_err(|e| ConfigError::Invalid(format!("bin profile: {}", e)))?;

        Ok(Self { config, profile, dominant, rng })
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Metro-wide bin profile π (sums to 1)
    pub fn profile(&self) -> &Array1<f64> {
        &self.profile
    }

    /// Number of rows [`generate`](Self::generate) produces
    pub fn n_rows(&self) -> usize {
        self.config.n_counties * self.config.blocks_per_county * self.profile.len()
    }

    /// Draw one raw-count frame
    ///
    /// Columns: `block_id, county_id, metro_id, category_group, bin_id, block_count`.
    pub fn generate(&mut self) -> Result<Frame, SchemaError> {
        let bins = self.config.category.bins();
        let label = self.config.category.group_label();
        let metro = self.config.metro_id.clone();
        let s = self.config.segregation;
        let n = self.n_rows();

        let mut block_ids = Vec::with_capacity(n);
        let mut county_ids = Vec::with_capacity(n);
        let mut bin_ids = Vec::with_capacity(n);
        let mut counts = Vec::with_capacity(n);

        for c in 0..self.config.n_counties {
            let county = format!("{}-{:03}", metro, c + 1);
            for b in 0..self.config.blocks_per_county {
                let block = format!("{}-{:04}", county, b + 1);
                let dominant = self.dominant.sample(&mut self.rng);
                let size = poisson(&mut self.rng, self.config.mean_block_size);

                for (j, bin) in bins.iter().enumerate() {
                    let mix = if j == dominant { 1.0 } else { 0.0 };
                    let q = (1.0 - s) * self.profile[j] + s * mix;
                    block_ids.push(block.clone());
                    county_ids.push(county.clone());
                    bin_ids.push(bin.to_string());
                    counts.push(poisson(&mut self.rng, size * q) as i64);
                }
            }
        }

        Frame::from_columns([
            (BLOCK_ID, text_array(block_ids)),
            (COUNTY_ID, text_array(county_ids)),
            (METRO_ID, text_array(vec![metro; n])),
            (CATEGORY_GROUP, text_array(vec![label; n])),
            (BIN_ID, text_array(bin_ids)),
            (BLOCK_COUNT, int_array(counts)),
        ])
    }
}

/// Symmetric Dirichlet draw over `N` bins
fn dirichlet<const N: usize>(rng: &mut StdRng) -> Result<Vec<f64>, ConfigError> {
    let dist = Dirichlet::new([CONCENTRATION; N])
        .map_err(|e| ConfigError::Invalid(format!("dirichlet: {}", e)))?;
    Ok(dist.sample(rng).to_vec())
}

/// Poisson draw; 0 for a non-positive or non-finite rate
fn poisson<R: Rng>(rng: &mut R, lambda: f64) -> f64 {
    if !(lambda.is_finite() && lambda > 0.0) {
        return 0.0;
    }
    match Poisson::new(lambda) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0.0,
    }
}
