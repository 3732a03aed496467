//! Argument rewriting for the wrapped virt-builder and virt-install tools.

pub mod builder;
pub mod install;
pub mod scan;

pub use builder::{rewrite_builder_args, BuilderRewrite};
pub use install::{has_nic_mapping_args, map_and_rewrite, rewrite_install_args};
