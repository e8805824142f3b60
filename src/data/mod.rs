//! Dataset loading

pub mod libsvm;

pub use libsvm::LibSvmDataset;
