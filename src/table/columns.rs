//! Column names shared by every stage.

// Identifiers
pub const BLOCK_ID: &str = "block_id";
pub const COUNTY_ID: &str = "county_id";
pub const METRO_ID: &str = "metro_id";
pub const CATEGORY_GROUP: &str = "category_group";
pub const BIN_ID: &str = "bin_id";

// Counts and totals
pub const BLOCK_COUNT: &str = "block_count";
pub const BLOCK_GROUP_TOTAL: &str = "block_group_total";
pub const COUNTY_BIN_TOTAL: &str = "county_bin_total";
pub const COUNTY_GROUP_TOTAL: &str = "county_group_total";
pub const METRO_BIN_TOTAL: &str = "metro_bin_total";
pub const METRO_GROUP_TOTAL: &str = "metro_group_total";

// Shares written alongside the totals
pub const BLOCK_PCT: &str = "block_pct";
pub const COUNTY_PCT: &str = "county_pct";
pub const METRO_PCT: &str = "metro_pct";

// Divergence terms
pub const P_BLOCK_SHARE: &str = "p_block_share";
pub const P_BLOCK_GIVEN_BIN: &str = "p_block_given_bin";
pub const P_BIN_METRO: &str = "p_bin_metro";
pub const P_BIN_GIVEN_BLOCK: &str = "p_bin_given_block";
pub const LOG_BLOCK: &str = "log_block";
pub const LOG_BIN: &str = "log_bin";
pub const CONTRIBUTION_TO_BLOCK_DKL: &str = "contribution_to_block_dkl";
pub const CONTRIBUTION_TO_BIN_DKL: &str = "contribution_to_bin_dkl";
pub const DKL_BLOCK: &str = "dkl_block";
pub const DKL_BIN: &str = "dkl_bin";

// Summary
pub const MI: &str = "mi";

/// Columns produced by the upstream join
pub const RAW_COUNT_COLUMNS: [&str; 6] =
    [BLOCK_ID, COUNTY_ID, METRO_ID, CATEGORY_GROUP, BIN_ID, BLOCK_COUNT];

/// Columns the divergence calculator requires
pub const DIVERGENCE_INPUT: [&str; 9] = [
    BLOCK_ID,
    COUNTY_ID,
    METRO_ID,
    CATEGORY_GROUP,
    BIN_ID,
    BLOCK_COUNT,
    BLOCK_GROUP_TOTAL,
    METRO_BIN_TOTAL,
    METRO_GROUP_TOTAL,
];

/// Columns the divergence calculator appends, in output order
pub const DIVERGENCE_OUTPUT: [&str; 10] = [
    P_BLOCK_SHARE,
    P_BLOCK_GIVEN_BIN,
    P_BIN_METRO,
    P_BIN_GIVEN_BLOCK,
    LOG_BLOCK,
    LOG_BIN,
    CONTRIBUTION_TO_BLOCK_DKL,
    CONTRIBUTION_TO_BIN_DKL,
    DKL_BLOCK,
    DKL_BIN,
];

/// Columns the mutual-information summarizer requires
pub const SUMMARY_INPUT: [&str; 5] = [BLOCK_ID, CATEGORY_GROUP, METRO_ID, P_BLOCK_SHARE, DKL_BLOCK];
