pub mod consts;
pub mod error;
pub mod intensity;
pub mod normalization;
pub mod plan;
