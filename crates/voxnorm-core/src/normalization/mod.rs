pub mod apply;
pub mod registry;
pub mod scheme;

pub use apply::ImageNormalizer;
pub use registry::SchemeRegistry;
pub use scheme::{CtWindow, NormalizationScheme};
