//! Hold graphs built from the reference catalog

mod builder;

pub use builder::{AnnotatedGraph, GraphBuilder, HoldNode};
