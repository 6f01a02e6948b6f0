pub mod config;
mod apply;
mod mask;

pub use apply::ChannelNormalizers;
pub use config::{ChannelConfig, NormalizationPlan};
pub use mask::determine_use_mask_for_norm;
