//! CPU kernel implementations
//!
//! This module provides low-level compute kernels for CPU operations.
//! Kernels are generic over the output element type and write through raw
//! pointers handed over by the client.

#![allow(unsafe_op_in_unsafe_fn)] // Kernels are already marked unsafe, inner unsafe is redundant

pub mod random_engine;

pub use random_engine::{
    MersenneTables, NormalElement, RandomElement, counter_normal_kernel, counter_uniform_kernel,
    mersenne_init_kernel, mersenne_normal_kernel, mersenne_uniform_kernel,
};
